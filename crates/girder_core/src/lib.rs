//! `girder_core` — a self-contained parser and tree-walking interpreter for
//! ECMAScript 5.1.
//!
//! # Crate layout
//!
//! - [`error`] — engine error types and the [`EngineResult`] alias.
//! - [`parser`] — scanner, token stream, recursive-descent parser, AST,
//!   canonical printer, and JSON dump.
//! - [`objects`] — the object model: property records, ordinary objects,
//!   function payloads, and the handle-addressed arena.
//! - [`runtime`] — values, references, completions, environments, the §9
//!   conversions, and the [`Interpreter`] itself.
//! - [`intrinsics`] — the §15 built-in library installed on every fresh
//!   global object.
//!
//! # Example
//!
//! ```
//! use girder_core::Interpreter;
//!
//! let mut interp = Interpreter::new();
//! let value = interp
//!     .execute_string("var x = 0; for (var i = 0; i < 10; i++) x += i; x;", None)
//!     .unwrap();
//! assert_eq!(value.as_number(), Some(45.0));
//! ```

/// Engine error types and the [`EngineResult`] alias.
pub mod error;
/// The §15 built-in library.
pub mod intrinsics;
/// The ES5.1 object model.
pub mod objects;
/// ES5.1 front end: scanner, parser, AST, printer, dump.
pub mod parser;
/// Values, environments, and the tree-walking evaluator.
pub mod runtime;

pub use error::{EngineError, EngineResult};
pub use parser::{parse_file, parse_string, Parser};
pub use runtime::completion::Completion;
pub use runtime::value::Value;
pub use runtime::Interpreter;
