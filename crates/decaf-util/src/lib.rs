//! decaf-util - Core Utilities and Foundation Types
//!
//! ============================================================================
//! MODULE OVERVIEW
//! ============================================================================
//!
//! This crate provides fundamental utilities and types shared by every stage
//! of the Decaf semantic analyzer: string interning, source spans and file
//! tracking, diagnostic reporting, typed-index arenas, and the generic error
//! types the rest of the workspace builds on.
//!
//! DESIGN PRINCIPLES:
//! ------------------
//! 1. ZERO-COST ABSTRACTIONS
//!    Typed indices and interned symbols compile down to plain integers.
//!
//! 2. TYPE SAFETY
//!    `TypeId`, `ScopeId` and `DefId` are distinct types even though all
//!    three are backed by a `u32`; mixing them up is a compile error rather
//!    than a silent off-by-one arena lookup.
//!
//! 3. ERGONOMICS
//!    APIs favor small builder-style methods (`DiagnosticBuilder`) over
//!    long constructor argument lists.

pub mod def_id;
pub mod diagnostic;
pub mod error;
pub mod ids;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use def_id::{DefId, DefIdGenerator};
pub use diagnostic::{Diagnostic, DiagnosticBuilder, Handler, Level};
pub use error::{DiagnosticError, IndexVecError, SourceMapError, SymbolError};
pub use ids::{ScopeId, TypeId};
pub use index_vec::{Idx, IndexVec};
pub use span::{FileId, Span};
pub use symbol::Symbol;

pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
