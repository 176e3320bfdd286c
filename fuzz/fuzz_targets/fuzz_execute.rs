#![no_main]

use libfuzzer_sys::fuzz_target;
use girder_core::Interpreter;

// Execute arbitrary parseable programs. The engine must never panic: every
// outcome is either a value or an in-language throw. Output is swallowed
// so fuzzing runs quietly.
//
// Unbounded recursion is cut off by the interpreter's own call-depth
// limit; scripts that loop forever are the fuzzer's timeout problem, so
// inputs containing iteration keywords are skipped.
fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    if source.contains("while") || source.contains("for") || source.contains("do") {
        return;
    }
    let mut interp = Interpreter::new();
    interp.set_console_sink(Box::new(|_| {}));
    let _ = interp.execute_string(source, None);
});
