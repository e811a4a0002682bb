//! decaf-ast - Decaf abstract syntax tree
//!
//! This crate defines the syntax tree nodes consumed by `decaf-sem`'s
//! two-pass semantic analyzer. Parsing Decaf source text into this tree is
//! out of scope for the workspace; a parser is assumed to hand over a
//! well-formed `TopLevel` (or, in this workspace, a test fixture builds one
//! directly).
//!
//! Nodes carry annotation slots (`Option<TypeId>`, `Option<DefId>`,
//! `Option<ScopeId>`) that start `None` and are filled in by the Namer and
//! Typer passes. Keeping these as plain typed indices rather than embedding
//! `decaf-sem`'s `Type`/`Symbol`/`Scope` values directly means this crate
//! never has to depend on the analyzer crate.

mod ast;

pub use ast::*;
