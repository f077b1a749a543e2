//! Error-recovering front end for Vesper source.
//!
//! The entry point is [`parse_units`] (or [`parse_unit`] for a single
//! source): lex, parse with recovery, resolve batch-wide names, classify.
//! Parsing is total -- every input yields a [`ParseOutcome`] carrying a
//! partial AST, ordered diagnostics, and an unrecoverable flag, never an
//! `Err`. [`render::render_module`] produces the canonical declaration
//! text and [`diag::render`] the framed error listing.

pub mod ast;
pub mod builder;
pub mod classify;
pub mod diag;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod resolve;
pub mod source;

pub use diag::{Diagnostic, Span};
pub use parser::{parse_unit, parse_units, ParseOutcome};
pub use source::{SourceSet, SourceUnit};
