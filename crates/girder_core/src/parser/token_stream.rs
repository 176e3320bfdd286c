//! One-token lookahead over the [`Scanner`].
//!
//! The parser never talks to the scanner directly: it peeks and consumes
//! through this buffer, passing the lexical goal in effect at each read. A
//! token buffered under one goal is transparently invalidated and rescanned
//! when the parser peeks under the other goal and the token is
//! goal-sensitive (it begins with `/`). This is what makes constructs like
//! `a = /re/.test(s)` scan correctly without backtracking in the parser.

use crate::error::EngineResult;
use crate::parser::scanner::{LexGoal, Scanner, Span, Token, TokenKind};

/// A buffering token stream with goal-aware single-token lookahead.
pub struct TokenStream<'src> {
    scanner: Scanner<'src>,
    /// The buffered lookahead token and the goal it was scanned under.
    buffered: Option<(Token, LexGoal)>,
}

impl<'src> TokenStream<'src> {
    /// Create a token stream over `source`.
    pub fn new(source: &'src str) -> Self {
        Self {
            scanner: Scanner::new(source),
            buffered: None,
        }
    }

    /// Returns the raw source text covered by `span`.
    pub fn lexeme(&self, span: &Span) -> &'src str {
        self.scanner.lexeme(span)
    }

    /// Returns `true` when the buffered token must be re-scanned to satisfy
    /// a read under `goal`.
    fn needs_rescan(token: &Token, scanned_under: LexGoal, goal: LexGoal) -> bool {
        scanned_under != goal
            && matches!(
                token.kind,
                TokenKind::Slash | TokenKind::SlashEqual | TokenKind::RegExpLiteral
            )
    }

    /// Ensure the lookahead buffer holds a token valid under `goal`.
    fn fill(&mut self, goal: LexGoal) -> EngineResult<()> {
        match self.buffered.take() {
            Some((token, scanned_under)) => {
                if Self::needs_rescan(&token, scanned_under, goal) {
                    let rescanned = self.scanner.rescan(&token, goal)?;
                    self.buffered = Some((rescanned, goal));
                } else {
                    self.buffered = Some((token, scanned_under));
                }
            }
            None => {
                let token = self.scanner.next_token(goal)?;
                self.buffered = Some((token, goal));
            }
        }
        Ok(())
    }

    /// Peek at the next token under `goal` without consuming it.
    pub fn peek(&mut self, goal: LexGoal) -> EngineResult<&Token> {
        self.fill(goal)?;
        Ok(&self.buffered.as_ref().expect("fill buffered a token").0)
    }

    /// Peek at the next token's kind under `goal`.
    pub fn peek_kind(&mut self, goal: LexGoal) -> EngineResult<TokenKind> {
        Ok(self.peek(goal)?.kind)
    }

    /// Consume and return the next token under `goal`.
    pub fn next(&mut self, goal: LexGoal) -> EngineResult<Token> {
        self.fill(goal)?;
        Ok(self.buffered.take().expect("fill buffered a token").0)
    }

    /// Consume the next token if its kind matches, returning it.
    pub fn eat(&mut self, kind: TokenKind, goal: LexGoal) -> EngineResult<Option<Token>> {
        if self.peek_kind(goal)? == kind {
            Ok(Some(self.next(goal)?))
        } else {
            Ok(None)
        }
    }

    /// Returns `true` when a line terminator precedes the next token.
    ///
    /// This is the bit Automatic Semicolon Insertion reads. The peek happens
    /// under [`LexGoal::Div`]; the flag is identical under either goal.
    pub fn had_line_terminator_before_next(&mut self) -> EngineResult<bool> {
        Ok(self.peek(LexGoal::Div)?.had_line_terminator_before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::scanner::TokenValue;

    #[test]
    fn test_peek_does_not_consume() {
        let mut ts = TokenStream::new("a b");
        assert_eq!(ts.peek_kind(LexGoal::Div).unwrap(), TokenKind::Identifier);
        assert_eq!(ts.peek_kind(LexGoal::Div).unwrap(), TokenKind::Identifier);
        let a = ts.next(LexGoal::Div).unwrap();
        assert_eq!(a.str_value(), Some("a"));
        let b = ts.next(LexGoal::Div).unwrap();
        assert_eq!(b.str_value(), Some("b"));
        assert_eq!(ts.next(LexGoal::Div).unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_goal_switch_invalidates_buffered_slash() {
        let mut ts = TokenStream::new("/x/g");
        // Buffer the token under Div: it scans as a slash punctuator.
        assert_eq!(ts.peek_kind(LexGoal::Div).unwrap(), TokenKind::Slash);
        // Re-peek under RegExp: the buffer is invalidated and rescanned.
        let tok = ts.next(LexGoal::RegExp).unwrap();
        assert_eq!(tok.kind, TokenKind::RegExpLiteral);
        assert_eq!(
            tok.value,
            TokenValue::Regex {
                pattern: "x".into(),
                flags: "g".into()
            }
        );
    }

    #[test]
    fn test_goal_switch_invalidates_buffered_regex() {
        let mut ts = TokenStream::new("/=1/ y");
        assert_eq!(
            ts.peek_kind(LexGoal::RegExp).unwrap(),
            TokenKind::RegExpLiteral
        );
        // The parser decided this position continues an expression after
        // all: the regex is invalidated back into a `/=` punctuator.
        assert_eq!(ts.next(LexGoal::Div).unwrap().kind, TokenKind::SlashEqual);
        assert_eq!(
            ts.next(LexGoal::Div).unwrap().number_value(),
            Some(1.0)
        );
        assert_eq!(ts.next(LexGoal::Div).unwrap().kind, TokenKind::Slash);
        assert_eq!(ts.next(LexGoal::Div).unwrap().str_value(), Some("y"));
    }

    #[test]
    fn test_non_slash_tokens_survive_goal_switches() {
        let mut ts = TokenStream::new("( x )");
        assert_eq!(ts.peek_kind(LexGoal::Div).unwrap(), TokenKind::LeftParen);
        assert_eq!(ts.next(LexGoal::RegExp).unwrap().kind, TokenKind::LeftParen);
        assert_eq!(ts.next(LexGoal::RegExp).unwrap().kind, TokenKind::Identifier);
        assert_eq!(ts.next(LexGoal::Div).unwrap().kind, TokenKind::RightParen);
    }

    #[test]
    fn test_line_terminator_flag_via_stream() {
        let mut ts = TokenStream::new("a\nb");
        ts.next(LexGoal::Div).unwrap();
        assert!(ts.had_line_terminator_before_next().unwrap());
        ts.next(LexGoal::Div).unwrap();
        assert!(!ts.had_line_terminator_before_next().unwrap());
    }

    #[test]
    fn test_eat_matches_kind() {
        let mut ts = TokenStream::new("; x");
        assert!(ts.eat(TokenKind::Semicolon, LexGoal::Div).unwrap().is_some());
        assert!(ts.eat(TokenKind::Semicolon, LexGoal::Div).unwrap().is_none());
        assert!(ts.eat(TokenKind::Identifier, LexGoal::Div).unwrap().is_some());
    }
}
