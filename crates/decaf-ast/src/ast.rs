//! Decaf AST node definitions.
//!
//! The tree shape mirrors Decaf's grammar directly: a `TopLevel` is a list
//! of `ClassDef`s, each with fields and methods; statements nest blocks;
//! expressions nest sub-expressions. Every node that participates in name
//! resolution or type checking carries one or more `Option<_>` annotation
//! slots, `None` until the corresponding analyzer pass visits it.

use decaf_util::{DefId, ScopeId, Span, Symbol, TypeId};
use serde::{Deserialize, Serialize};

/// A type literal as written in source (a field type, parameter type,
/// return type, or the element type of `new T[n]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeLit {
    Int,
    Bool,
    String,
    Void,
    Class(Symbol, Span),
    Array(Box<TypeLit>, Span),
    Lambda(Box<TypeLit>, Vec<TypeLit>, Span),
}

impl TypeLit {
    pub fn span(&self) -> Option<Span> {
        match self {
            TypeLit::Int | TypeLit::Bool | TypeLit::String | TypeLit::Void => None,
            TypeLit::Class(_, span) => Some(*span),
            TypeLit::Array(_, span) => Some(*span),
            TypeLit::Lambda(_, _, span) => Some(*span),
        }
    }
}

/// The whole program: every class declared at the top level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopLevel {
    pub classes: Vec<ClassDef>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: Symbol,
    pub is_abstract: bool,
    pub extends: Option<Symbol>,
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
    pub span: Span,
    /// Resolved by the Namer; identifies this class's `ClassSymbol`.
    pub def_id: Option<DefId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: Symbol,
    pub ty: TypeLit,
    pub span: Span,
    pub def_id: Option<DefId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: Symbol,
    pub is_static: bool,
    pub is_abstract: bool,
    pub ret_type: TypeLit,
    pub params: Vec<Param>,
    /// `None` for abstract methods.
    pub body: Option<Block>,
    pub span: Span,
    pub def_id: Option<DefId>,
    /// The formal scope opened for this method's parameters.
    pub scope: Option<ScopeId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: Symbol,
    pub ty: TypeLit,
    pub span: Span,
    pub def_id: Option<DefId>,
}

/// A brace-delimited statement sequence. `returns`/`is_close` are computed
/// by the Typer bottom-up: `returns` holds when every control path through
/// the block ends in a `return`, `is_close` additionally requires no path
/// to fall off the end of a loop body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
    pub scope: Option<ScopeId>,
    pub returns: bool,
    pub is_close: bool,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>, span: Span) -> Self {
        Block {
            stmts,
            span,
            scope: None,
            returns: false,
            is_close: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    Block(Block),
    If {
        cond: Expr,
        then_branch: Block,
        else_branch: Option<Block>,
        span: Span,
    },
    While {
        cond: Expr,
        body: Block,
        span: Span,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        update: Option<Box<Stmt>>,
        body: Block,
        span: Span,
    },
    Return {
        value: Option<Expr>,
        span: Span,
    },
    Print {
        args: Vec<Expr>,
        span: Span,
    },
    /// `declared_type: None` means the local was declared with `var`, and
    /// its type is inferred from `init` rather than written explicitly.
    LocalVarDef {
        name: Symbol,
        declared_type: Option<TypeLit>,
        init: Expr,
        span: Span,
        def_id: Option<DefId>,
    },
    Assign {
        target: Expr,
        value: Expr,
        span: Span,
    },
    Break {
        span: Span,
    },
    ExprStmt {
        expr: Expr,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block(b) => b.span,
            Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::For { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Print { span, .. }
            | Stmt::LocalVarDef { span, .. }
            | Stmt::Assign { span, .. }
            | Stmt::Break { span }
            | Stmt::ExprStmt { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

/// The body of a lambda: either a single expression (whose value is the
/// implicit return) or a block that must return explicitly on every path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Block),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lambda {
    pub params: Vec<Param>,
    pub body: LambdaBody,
    pub span: Span,
    pub scope: Option<ScopeId>,
    /// Populated by the Typer in first-reference order as outer-scope
    /// variables are read or written from inside the lambda body.
    pub captures: Vec<DefId>,
    /// Identifies this lambda's `LambdaSymbol`, which carries its inferred
    /// function type (lambdas have no `ty` slot of their own since their
    /// type depends on a join/meet computed across the whole expression).
    pub def_id: Option<DefId>,
}

/// Expressions. Every variant carries its own `span` and a `ty` annotation
/// slot filled in by the Typer (`Type::Error` on failure, never left
/// `None` once typing completes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    IntLit {
        value: i64,
        span: Span,
        ty: Option<TypeId>,
    },
    BoolLit {
        value: bool,
        span: Span,
        ty: Option<TypeId>,
    },
    StringLit {
        value: String,
        span: Span,
        ty: Option<TypeId>,
    },
    NullLit {
        span: Span,
        ty: Option<TypeId>,
    },
    This {
        span: Span,
        ty: Option<TypeId>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
        ty: Option<TypeId>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
        ty: Option<TypeId>,
    },
    NewObject {
        class: Symbol,
        span: Span,
        ty: Option<TypeId>,
        resolved_class: Option<DefId>,
    },
    NewArray {
        elem_type: TypeLit,
        size: Box<Expr>,
        span: Span,
        ty: Option<TypeId>,
    },
    ArrayIndex {
        array: Box<Expr>,
        index: Box<Expr>,
        span: Span,
        ty: Option<TypeId>,
    },
    InstanceOf {
        expr: Box<Expr>,
        class: Symbol,
        span: Span,
        ty: Option<TypeId>,
    },
    Cast {
        class: Symbol,
        expr: Box<Expr>,
        span: Span,
        ty: Option<TypeId>,
    },
    /// A variable, field, class name, or `length` pseudo-field reference.
    ///
    /// `receiver: None` is the no-receiver form (`lookupBefore`-governed
    /// local/field/class lookup); `receiver: Some(_)` is the `expr.name`
    /// form. `is_class_name`/`is_array_length`/`is_member_method_name` are
    /// set by the Typer once the reference's shape is known and are read
    /// back by later passes or pretty-printers, not by the Typer itself.
    VarSel {
        receiver: Option<Box<Expr>>,
        name: Symbol,
        span: Span,
        ty: Option<TypeId>,
        binding: Option<DefId>,
        is_class_name: bool,
        is_array_length: bool,
        is_member_method_name: bool,
    },
    Call {
        receiver: Option<Box<Expr>>,
        method: Symbol,
        args: Vec<Expr>,
        span: Span,
        ty: Option<TypeId>,
        resolved_method: Option<DefId>,
    },
    Lambda(Lambda),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::IntLit { span, .. }
            | Expr::BoolLit { span, .. }
            | Expr::StringLit { span, .. }
            | Expr::NullLit { span, .. }
            | Expr::This { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::NewObject { span, .. }
            | Expr::NewArray { span, .. }
            | Expr::ArrayIndex { span, .. }
            | Expr::InstanceOf { span, .. }
            | Expr::Cast { span, .. }
            | Expr::VarSel { span, .. }
            | Expr::Call { span, .. } => *span,
            Expr::Lambda(lambda) => lambda.span,
        }
    }

    pub fn ty(&self) -> Option<TypeId> {
        match self {
            Expr::IntLit { ty, .. }
            | Expr::BoolLit { ty, .. }
            | Expr::StringLit { ty, .. }
            | Expr::NullLit { ty, .. }
            | Expr::This { ty, .. }
            | Expr::Unary { ty, .. }
            | Expr::Binary { ty, .. }
            | Expr::NewObject { ty, .. }
            | Expr::NewArray { ty, .. }
            | Expr::ArrayIndex { ty, .. }
            | Expr::InstanceOf { ty, .. }
            | Expr::Cast { ty, .. }
            | Expr::VarSel { ty, .. }
            | Expr::Call { ty, .. } => *ty,
            Expr::Lambda(_) => None,
        }
    }

    pub fn set_ty(&mut self, new_ty: TypeId) {
        match self {
            Expr::IntLit { ty, .. }
            | Expr::BoolLit { ty, .. }
            | Expr::StringLit { ty, .. }
            | Expr::NullLit { ty, .. }
            | Expr::This { ty, .. }
            | Expr::Unary { ty, .. }
            | Expr::Binary { ty, .. }
            | Expr::NewObject { ty, .. }
            | Expr::NewArray { ty, .. }
            | Expr::ArrayIndex { ty, .. }
            | Expr::InstanceOf { ty, .. }
            | Expr::Cast { ty, .. }
            | Expr::VarSel { ty, .. }
            | Expr::Call { ty, .. } => *ty = Some(new_ty),
            Expr::Lambda(_) => {}
        }
    }
}
