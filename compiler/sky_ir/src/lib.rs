//! Sky IR - shared data types for the build-file loader.
//!
//! This crate contains the plain data structures every other crate agrees on:
//! - Spans and source locations (with a line index for rendering)
//! - `Label`: the canonical identity of a build or extension file
//! - `FileKind`: build file vs. extension file
//! - Tokens for lexer output
//! - The syntax tree produced by the parser
//!
//! Nothing here performs I/O. Resolving a label to a path on disk is the
//! loader's job, since only the loader knows the repository roots.

pub mod ast;
mod file_kind;
mod label;
mod location;
mod span;
mod token;
pub mod visitor;

pub use ast::{
    Arg, ArgKind, BinaryOp, Expr, ExprKind, FunctionDef, LoadStmt, LoadedSymbol, Param,
    ParamKind, Stmt, StmtKind, UnaryOp,
};
pub use file_kind::FileKind;
pub use label::{Label, LabelError, RepoName};
pub use location::{LineIndex, Location, SourceInfo};
pub use span::Span;
pub use token::{Token, TokenKind, TokenList};
pub use visitor::Visitor;
