//! Typed indices bridging the AST and the semantic analyzer.
//!
//! `decaf-ast` nodes carry annotation slots (`Option<TypeId>`, `Option<ScopeId>`,
//! `Option<DefId>`) rather than embedding `decaf-sem`'s `Type`/`Scope` values
//! directly, so that the AST crate never has to depend on the analyzer crate.
//! `decaf-sem` owns the arenas (`IndexVec<TypeId, Type>`, `IndexVec<ScopeId,
//! ScopeData>`) that these indices resolve into.

use crate::define_idx;

define_idx!(TypeId);
define_idx!(ScopeId);
