//! Ember runtime library
//!
//! A small dynamically-typed language built around a capability-dispatch
//! object model: numeric coercion, higher-order sequence builtins, code
//! execution against arbitrary scope mappings, and lazy ranges.

pub mod ast;
pub mod builtins;
pub mod compiler;
pub mod config;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod object;
pub mod ops;
pub mod parser;
pub mod repl;
pub mod util;

pub use ast::Span;
pub use error::{Error, ErrorKind, Result};
pub use interp::Interpreter;
pub use object::ObjRef;
