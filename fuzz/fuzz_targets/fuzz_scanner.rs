#![no_main]

use libfuzzer_sys::fuzz_target;
use girder_core::parser::scanner::{LexGoal, Scanner, TokenKind};

// Feed arbitrary UTF-8 to the scanner under both lexical goals and verify
// the structural token invariants: every scan either errors cleanly or
// yields tokens whose spans are ordered, non-overlapping, and in bounds.
//
// The scanner must never panic, loop forever, or hand back a span that
// reaches outside the source string.
fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    for goal in [LexGoal::Div, LexGoal::RegExp] {
        let mut scanner = Scanner::new(source);
        let mut last_end = 0usize;
        // Bounded so a scanner bug cannot stall the fuzzer.
        for _ in 0..source.len() + 8 {
            match scanner.next_token(goal) {
                Err(_) => break,
                Ok(tok) => {
                    assert!(tok.span.start.offset <= tok.span.end.offset);
                    assert!(tok.span.end.offset <= source.len());
                    assert!(tok.span.start.offset >= last_end);
                    last_end = tok.span.end.offset;
                    if tok.kind == TokenKind::Eof {
                        break;
                    }
                    // Progress: every non-EOF token consumes input.
                    assert!(tok.span.end.offset > tok.span.start.offset);
                }
            }
        }
    }
});
