//! Error types for the Girder engine.
//!
//! These cover *host-level* failures only: lexical and syntactic errors
//! raised while turning source text into an AST, I/O failures while reading
//! script files, and internal invariant violations. Errors raised by the
//! evaluated program itself (`throw`, `TypeError` from a bad property write,
//! …) are ECMAScript `Error` objects carried inside Throw completions and
//! never appear here.

use thiserror::Error;

/// The lexical-error categories the scanner can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    /// A string literal ran to end of line or end of input.
    #[error("unterminated string literal")]
    UnterminatedString,

    /// A `/* … */` comment ran to end of input.
    #[error("unterminated block comment")]
    UnterminatedComment,

    /// A regular-expression literal ran to end of line or end of input.
    #[error("unterminated regular expression literal")]
    UnterminatedRegex,

    /// A malformed `\x`, `\u`, or identifier escape sequence.
    #[error("invalid escape sequence")]
    InvalidEscape,

    /// A malformed numeric literal (e.g. `0x` with no digits, `3e`).
    #[error("invalid numeric literal")]
    InvalidNumber,

    /// A character that cannot begin any token.
    #[error("unexpected character")]
    UnexpectedChar,

    /// An octal literal or octal escape sequence in strict-mode code.
    #[error("octal literals are not allowed in strict mode")]
    OctalInStrict,
}

/// All host-level errors the Girder engine can produce.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A lexical error with its source position.
    #[error("SyntaxError: {kind} at line {line}, column {column}")]
    Lex {
        /// What went wrong.
        kind: LexErrorKind,
        /// 1-based source line.
        line: u32,
        /// 1-based source column.
        column: u32,
    },

    /// A syntactic error raised by the parser.
    ///
    /// This is the library's `ParseException`: a human-readable message plus
    /// the position the parser had reached.
    #[error("SyntaxError: {message} ({filename}:{line}:{column})")]
    Parse {
        /// Human-readable description.
        message: String,
        /// Name of the source, `"<anonymous>"` when none was given.
        filename: String,
        /// 1-based source line.
        line: u32,
        /// 1-based source column.
        column: u32,
    },

    /// An I/O failure while reading a script file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An internal engine invariant was violated. Indicates a bug in the
    /// engine, not in the evaluated program.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Returns the `(line, column)` position for positioned errors.
    pub fn position(&self) -> Option<(u32, u32)> {
        match self {
            EngineError::Lex { line, column, .. } | EngineError::Parse { line, column, .. } => {
                Some((*line, *column))
            }
            _ => None,
        }
    }
}

/// Convenient `Result` alias for fallible engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
