//! Type checking (§4.E): walks every method body the Namer annotated,
//! assigning a `TypeId` to each expression and resolving every bare or
//! dotted name to the symbol it refers to. Locals are declared here rather
//! than in the Namer, since `var x = x + 1;` must type `x + 1` before `x`
//! itself enters scope — so a `LocalVarDef` only binds its own name to the
//! enclosing scope *after* its initializer has been checked.

use decaf_ast::{
    BinaryOp, Block, Expr, Lambda, LambdaBody, MethodDef, Stmt, TopLevel, UnaryOp,
};
use decaf_util::diagnostic::DiagnosticCode;
use decaf_util::{Diagnostic, DiagnosticBuilder, DefId, Handler, ScopeId, Span, Symbol, TypeId};

use crate::scope::{Conflict, ScopeKind, SymbolData, SymbolTable, VarKind, VarSymbol};
use crate::typelit::resolve_type_lit;
use crate::types::{join, subtype, TypeArena};

fn emit(handler: &Handler, code: DiagnosticCode, span: Span, message: impl Into<String>) {
    let diag: Diagnostic = DiagnosticBuilder::error(message).code(code).span(span).build();
    handler.emit_diagnostic(diag);
}

struct Ctx<'a> {
    symtab: &'a mut SymbolTable,
    arena: &'a mut TypeArena,
    handler: &'a Handler,
}

/// Where a `return`'s value goes: a method's declared return type, or the
/// innermost lambda's collected-return-types list (one fresh `Vec` per
/// nested lambda, never shared with an outer one).
enum ReturnTarget<'a> {
    Method { ret_ty: TypeId },
    Lambda { collected: &'a mut Vec<TypeId> },
}

/// Runs the Typer over every concrete method body in `ast`. Abstract
/// methods have no body and are skipped; their signatures were already
/// checked by the Namer.
pub fn check(ast: &mut TopLevel, symtab: &mut SymbolTable, arena: &mut TypeArena, handler: &Handler) {
    let mut ctx = Ctx { symtab, arena, handler };
    for class in ast.classes.iter_mut() {
        // A class sharing its name with an earlier one never runs through
        // `resolve_members` (namer.rs skips it outright), so it never
        // gets a `def_id` and has no symbol-table entry to type against.
        if class.def_id.is_none() {
            continue;
        }
        for method in class.methods.iter_mut() {
            check_method(method, &mut ctx);
        }
    }
}

fn check_method(method: &mut MethodDef, ctx: &mut Ctx) {
    let Some(body) = method.body.as_mut() else {
        return;
    };
    let def = method.def_id.expect("namer assigns every method a def_id");
    let fn_ty = ctx.symtab.defs.method(def).ty;
    let (ret_ty, _) = ctx
        .arena
        .is_function(fn_ty)
        .expect("a method symbol's type is always a function type");
    log::debug!("checking method '{}'", method.name.as_str());
    let mut target = ReturnTarget::Method { ret_ty };
    check_block(body, ctx, &mut target, 0);
    if ret_ty != ctx.arena.void_id() && !body.is_close {
        emit(
            ctx.handler,
            DiagnosticCode::E_MISSING_RETURN,
            method.span,
            format!("method '{}' does not return on every path", method.name.as_str()),
        );
    }
}

fn check_block(block: &mut Block, ctx: &mut Ctx, ret_target: &mut ReturnTarget, loop_level: u32) {
    let scope = block.scope.expect("namer opens every block's scope");
    for stmt in block.stmts.iter_mut() {
        check_stmt(stmt, scope, ctx, ret_target, loop_level);
    }
    block.returns = block.stmts.last().is_some_and(stmt_returns);
    block.is_close = block.stmts.iter().any(stmt_is_close);
}

/// Whether control falls through this statement having already returned on
/// every path. Only `Block` carries a stored `returns` flag (filled by the
/// recursive `check_block` call that already ran over it); everything else
/// is derived structurally. Loops never count, since their bodies may run
/// zero times.
fn stmt_returns(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Block(b) => b.returns,
        Stmt::If { then_branch, else_branch, .. } => {
            then_branch.returns && else_branch.as_ref().is_some_and(|e| e.returns)
        }
        Stmt::Return { .. } => true,
        _ => false,
    }
}

/// Like `stmt_returns`, but additionally requires no path to fall off the
/// end of an enclosing loop body — used for block-bodied lambdas, where a
/// loop that always returns still "closes" the lambda even though it isn't
/// itself a `return`.
fn stmt_is_close(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Block(b) => b.is_close,
        Stmt::If { then_branch, else_branch, .. } => {
            then_branch.is_close && else_branch.as_ref().is_some_and(|e| e.is_close)
        }
        Stmt::Return { .. } => true,
        _ => false,
    }
}

fn check_stmt(stmt: &mut Stmt, scope: ScopeId, ctx: &mut Ctx, ret_target: &mut ReturnTarget, loop_level: u32) {
    match stmt {
        Stmt::Block(b) => check_block(b, ctx, ret_target, loop_level),
        Stmt::If { cond, then_branch, else_branch, .. } => {
            check_test_expr(cond, scope, ctx);
            check_block(then_branch, ctx, ret_target, loop_level);
            if let Some(eb) = else_branch {
                check_block(eb, ctx, ret_target, loop_level);
            }
        }
        Stmt::While { cond, body, .. } => {
            check_test_expr(cond, scope, ctx);
            check_block(body, ctx, ret_target, loop_level + 1);
        }
        Stmt::For { init, cond, update, body, .. } => {
            if let Some(init) = init {
                check_stmt(init, scope, ctx, ret_target, loop_level);
            }
            if let Some(cond) = cond {
                check_test_expr(cond, scope, ctx);
            }
            if let Some(update) = update {
                check_stmt(update, scope, ctx, ret_target, loop_level);
            }
            check_block(body, ctx, ret_target, loop_level + 1);
        }
        Stmt::Return { value, span } => {
            let actual = match value {
                Some(v) => check_expr(v, scope, ctx, false),
                None => ctx.arena.void_id(),
            };
            match ret_target {
                ReturnTarget::Method { ret_ty } => {
                    if !subtype(ctx.arena, ctx.symtab, actual, *ret_ty) {
                        emit(
                            ctx.handler,
                            DiagnosticCode::E_BAD_RETURN_TYPE,
                            *span,
                            "returned value is not compatible with the method's return type",
                        );
                    }
                }
                ReturnTarget::Lambda { collected } => collected.push(actual),
            }
        }
        Stmt::Print { args, .. } => {
            for a in args.iter_mut() {
                let ty = check_expr(a, scope, ctx, false);
                if !ctx.arena.is_error(ty) && !ctx.arena.is_base(ty) {
                    emit(
                        ctx.handler,
                        DiagnosticCode::E_BAD_PRINT_ARG,
                        a.span(),
                        "Print only accepts int, bool or string arguments",
                    );
                }
            }
        }
        Stmt::LocalVarDef { name, declared_type, init, span, def_id } => {
            let init_ty = check_expr(init, scope, ctx, false);
            let final_ty = match declared_type {
                Some(lit) => {
                    let declared = resolve_type_lit(lit, ctx.arena, ctx.symtab, ctx.handler);
                    if !ctx.arena.is_error(init_ty)
                        && !ctx.arena.is_error(declared)
                        && !subtype(ctx.arena, ctx.symtab, init_ty, declared)
                    {
                        emit(
                            ctx.handler,
                            DiagnosticCode::E_BAD_ASSIGN_TYPE,
                            *span,
                            format!("initializer of '{}' is not compatible with its declared type", name.as_str()),
                        );
                    }
                    declared
                }
                None => {
                    if !ctx.arena.is_error(init_ty) && init_ty == ctx.arena.void_id() {
                        emit(
                            ctx.handler,
                            DiagnosticCode::E_BAD_VAR_TYPE,
                            *span,
                            format!("initializer of 'var {}' must not be void", name.as_str()),
                        );
                        ctx.arena.error_id()
                    } else {
                        init_ty
                    }
                }
            };
            match ctx.symtab.find_conflict(scope, *name) {
                Some(Conflict::SameScope(_)) => {
                    emit(
                        ctx.handler,
                        DiagnosticCode::E_DECL_CONFLICT,
                        *span,
                        format!("variable '{}' is already declared in this scope", name.as_str()),
                    );
                }
                Some(Conflict::Inherited(prev)) => {
                    if matches!(ctx.symtab.defs.get(prev), SymbolData::Var(_)) {
                        emit(
                            ctx.handler,
                            DiagnosticCode::E_OVERRIDING_VAR,
                            *span,
                            format!("'{}' overrides an inherited member variable", name.as_str()),
                        );
                    }
                }
                None => {}
            }
            let var_def = ctx.symtab.defs.declare_var(VarSymbol {
                name: *name,
                span: *span,
                kind: VarKind::Local,
                ty: final_ty,
                owner: None,
            });
            ctx.symtab.declare_in(scope, *name, var_def);
            *def_id = Some(var_def);
        }
        Stmt::Assign { target, value, span } => check_assign(target, value, *span, scope, ctx),
        Stmt::Break { span } => {
            if loop_level == 0 {
                emit(
                    ctx.handler,
                    DiagnosticCode::E_BREAK_OUT_OF_LOOP,
                    *span,
                    "break appears outside any enclosing loop",
                );
            }
        }
        Stmt::ExprStmt { expr, .. } => {
            check_expr(expr, scope, ctx, false);
        }
    }
}

fn check_test_expr(cond: &mut Expr, scope: ScopeId, ctx: &mut Ctx) {
    let ty = check_expr(cond, scope, ctx, false);
    if !ctx.arena.is_error(ty) && ty != ctx.arena.bool_id() {
        emit(
            ctx.handler,
            DiagnosticCode::E_BAD_TEST_EXPR,
            cond.span(),
            "test expression must have type bool",
        );
    }
}

fn check_assign(target: &mut Expr, value: &mut Expr, span: Span, scope: ScopeId, ctx: &mut Ctx) {
    let target_ty = check_expr(target, scope, ctx, false);
    let value_ty = check_expr(value, scope, ctx, false);

    if let Expr::VarSel { receiver: None, name, is_member_method_name, .. } = target {
        if *is_member_method_name {
            emit(
                ctx.handler,
                DiagnosticCode::E_ASSIGN_TO_MEMBER_METHOD,
                span,
                format!("cannot assign value to class member method '{}'", name.as_str()),
            );
        } else if let Some(lambda_scope) = ctx.symtab.enclosing_lambda(scope) {
            if let Some((_, def_scope)) = ctx.symtab.lookup_with_scope(scope, *name) {
                let captured = !is_within_lambda_frame(ctx.symtab, scope, lambda_scope, def_scope)
                    && ctx.symtab.scope(def_scope).kind != ScopeKind::Class;
                if captured {
                    emit(
                        ctx.handler,
                        DiagnosticCode::E_ASSIGN_TO_CAPTURED_VAR,
                        span,
                        format!("cannot assign to '{}', captured from an enclosing scope", name.as_str()),
                    );
                }
            }
        }
    }

    if !ctx.arena.is_error(target_ty)
        && !ctx.arena.is_error(value_ty)
        && !subtype(ctx.arena, ctx.symtab, value_ty, target_ty)
    {
        emit(
            ctx.handler,
            DiagnosticCode::E_BAD_ASSIGN_TYPE,
            span,
            "right-hand side is not compatible with the assignment target's type",
        );
    }
}

/// True when `def_scope` lies inside the frame bounded by `lambda_scope`,
/// walking outward from `from` (a reference point nested inside that
/// lambda's body). A capture is exactly the opposite of this.
fn is_within_lambda_frame(symtab: &SymbolTable, from: ScopeId, lambda_scope: ScopeId, def_scope: ScopeId) -> bool {
    let mut cur = Some(from);
    loop {
        match cur {
            Some(id) if id == def_scope => return true,
            Some(id) if id == lambda_scope => return false,
            Some(id) => cur = symtab.scope(id).parent,
            None => return false,
        }
    }
}

fn current_method_is_static(ctx: &Ctx, scope: ScopeId) -> bool {
    match ctx.symtab.current_method(scope) {
        Some(def) => ctx.symtab.defs.method(def).is_static,
        None => false,
    }
}

fn record_capture_if_needed(ctx: &mut Ctx, scope: ScopeId, def: DefId, def_scope: ScopeId) {
    let Some(lambda_scope) = ctx.symtab.enclosing_lambda(scope) else {
        return;
    };
    if is_within_lambda_frame(ctx.symtab, scope, lambda_scope, def_scope)
        || ctx.symtab.scope(def_scope).kind == ScopeKind::Class
    {
        return;
    }
    let lambda_def = ctx
        .symtab
        .scope(lambda_scope)
        .owner
        .expect("namer links every lambda scope to its LambdaSymbol");
    let lam = ctx.symtab.defs.lambda_mut(lambda_def);
    if !lam.captures.contains(&def) {
        lam.captures.push(def);
    }
}

enum BareResolution {
    Var(DefId, ScopeId),
    Method(DefId),
    Class(DefId),
    None,
}

fn resolve_bare(ctx: &Ctx, scope: ScopeId, name: Symbol) -> BareResolution {
    if let Some((def, def_scope)) = ctx.symtab.lookup_with_scope(scope, name) {
        return match ctx.symtab.defs.get(def) {
            SymbolData::Var(_) => BareResolution::Var(def, def_scope),
            SymbolData::Method(_) => BareResolution::Method(def),
            _ => BareResolution::None,
        };
    }
    match ctx.symtab.lookup_class(name) {
        Some(def) => BareResolution::Class(def),
        None => BareResolution::None,
    }
}

fn this_expr(ctx: &mut Ctx, scope: ScopeId, span: Span) -> Expr {
    let ty = ctx.symtab.current_class(scope).map(|c| ctx.arena.class(c));
    Expr::This { span, ty }
}

struct BareRef {
    ty: TypeId,
    binding: Option<DefId>,
    is_class_name: bool,
    is_member_method_name: bool,
    needs_this: bool,
}

/// Resolves a no-receiver name (`x`, not `e.x`): local/formal/field, then a
/// plain method name, then (only where `allow_class_name` permits it, i.e.
/// as a `Call`/`VarSel` receiver position) a class name.
fn check_bare_reference(ctx: &mut Ctx, scope: ScopeId, name: Symbol, span: Span, allow_class_name: bool) -> BareRef {
    match resolve_bare(ctx, scope, name) {
        BareResolution::Var(def, def_scope) => {
            record_capture_if_needed(ctx, scope, def, def_scope);
            let v = ctx.symtab.defs.var(def).clone();
            if v.kind == VarKind::Field && current_method_is_static(ctx, scope) {
                emit(
                    ctx.handler,
                    DiagnosticCode::E_REF_NON_STATIC,
                    span,
                    format!("cannot reference member variable '{}' from a static method", name.as_str()),
                );
                return BareRef {
                    ty: ctx.arena.error_id(),
                    binding: Some(def),
                    is_class_name: false,
                    is_member_method_name: false,
                    needs_this: false,
                };
            }
            BareRef {
                ty: v.ty,
                binding: Some(def),
                is_class_name: false,
                is_member_method_name: false,
                needs_this: v.kind == VarKind::Field,
            }
        }
        BareResolution::Method(def) => {
            let m = ctx.symtab.defs.method(def).clone();
            if !m.is_static && current_method_is_static(ctx, scope) {
                emit(
                    ctx.handler,
                    DiagnosticCode::E_REF_NON_STATIC,
                    span,
                    format!("cannot reference member method '{}' from a static method", name.as_str()),
                );
                return BareRef {
                    ty: ctx.arena.error_id(),
                    binding: Some(def),
                    is_class_name: false,
                    is_member_method_name: true,
                    needs_this: false,
                };
            }
            BareRef {
                ty: m.ty,
                binding: Some(def),
                is_class_name: false,
                is_member_method_name: true,
                needs_this: !m.is_static,
            }
        }
        BareResolution::Class(def) => {
            if allow_class_name {
                BareRef {
                    ty: ctx.arena.class(def),
                    binding: Some(def),
                    is_class_name: true,
                    is_member_method_name: false,
                    needs_this: false,
                }
            } else {
                emit(ctx.handler, DiagnosticCode::E_UNDECL_VAR, span, format!("'{}' is undeclared", name.as_str()));
                BareRef { ty: ctx.arena.error_id(), binding: None, is_class_name: false, is_member_method_name: false, needs_this: false }
            }
        }
        BareResolution::None => {
            emit(ctx.handler, DiagnosticCode::E_UNDECL_VAR, span, format!("'{}' is undeclared", name.as_str()));
            BareRef { ty: ctx.arena.error_id(), binding: None, is_class_name: false, is_member_method_name: false, needs_this: false }
        }
    }
}

/// Resolves `recv.name` once `recv_ty` is known to be a class type: shared
/// by `VarSel` and `Call` member access (the array `.length` pseudo-field
/// is special-cased by each caller before reaching here).
fn resolve_member(
    ctx: &mut Ctx,
    scope: ScopeId,
    recv_ty: TypeId,
    name: Symbol,
    receiver_is_class_name: bool,
    span: Span,
) -> Option<(TypeId, DefId, bool)> {
    if ctx.arena.is_error(recv_ty) {
        return None;
    }
    let class_def = match ctx.arena.is_class(recv_ty) {
        Some(def) => def,
        None => {
            emit(
                ctx.handler,
                DiagnosticCode::E_FIELD_NOT_FOUND,
                span,
                "member access requires a class-typed receiver",
            );
            return None;
        }
    };
    let class_scope = ctx.symtab.class(class_def).scope;
    match ctx.symtab.lookup(class_scope, name) {
        None => {
            emit(
                ctx.handler,
                DiagnosticCode::E_FIELD_NOT_FOUND,
                span,
                format!(
                    "there is no member '{}' in class '{}'",
                    name.as_str(),
                    ctx.symtab.class(class_def).name.as_str()
                ),
            );
            None
        }
        Some(def) => match ctx.symtab.defs.get(def) {
            SymbolData::Var(v) => {
                let v = v.clone();
                if receiver_is_class_name {
                    emit(
                        ctx.handler,
                        DiagnosticCode::E_NOT_CLASS_FIELD,
                        span,
                        format!("'{}' is not a static member", name.as_str()),
                    );
                    return None;
                }
                let accessible = match (ctx.symtab.current_class(scope), v.owner) {
                    (Some(c), Some(o)) => {
                        let c_ty = ctx.arena.class(c);
                        let o_ty = ctx.arena.class(o);
                        subtype(ctx.arena, ctx.symtab, c_ty, o_ty)
                    }
                    _ => false,
                };
                if !accessible {
                    emit(
                        ctx.handler,
                        DiagnosticCode::E_FIELD_NOT_ACCESS,
                        span,
                        format!("'{}' is not accessible from here", name.as_str()),
                    );
                    return None;
                }
                Some((v.ty, def, false))
            }
            SymbolData::Method(m) => {
                let m = m.clone();
                if receiver_is_class_name && !m.is_static {
                    emit(
                        ctx.handler,
                        DiagnosticCode::E_NOT_CLASS_FIELD,
                        span,
                        format!("'{}' is not a static member", name.as_str()),
                    );
                    return None;
                }
                Some((m.ty, def, true))
            }
            _ => None,
        },
    }
}

fn check_expr(expr: &mut Expr, scope: ScopeId, ctx: &mut Ctx, allow_class_name: bool) -> TypeId {
    let ty = match expr {
        Expr::IntLit { .. } => ctx.arena.int_id(),
        Expr::BoolLit { .. } => ctx.arena.bool_id(),
        Expr::StringLit { .. } => ctx.arena.string_id(),
        Expr::NullLit { .. } => ctx.arena.null_id(),
        Expr::This { span, .. } => match ctx.symtab.current_class(scope) {
            Some(class_def) if !current_method_is_static(ctx, scope) => ctx.arena.class(class_def),
            _ => {
                emit(ctx.handler, DiagnosticCode::E_THIS_IN_STATIC, *span, "'this' cannot be used in a static method");
                ctx.arena.error_id()
            }
        },
        Expr::Unary { op, operand, span, .. } => {
            let oty = check_expr(operand, scope, ctx, false);
            match op {
                UnaryOp::Neg => {
                    if !ctx.arena.is_error(oty) && oty != ctx.arena.int_id() {
                        emit(ctx.handler, DiagnosticCode::E_BAD_UNARY_TYPE, *span, "'-' requires an int operand");
                    }
                    ctx.arena.int_id()
                }
                UnaryOp::Not => {
                    if !ctx.arena.is_error(oty) && oty != ctx.arena.bool_id() {
                        emit(ctx.handler, DiagnosticCode::E_BAD_UNARY_TYPE, *span, "'!' requires a bool operand");
                    }
                    ctx.arena.bool_id()
                }
            }
        }
        Expr::Binary { op, lhs, rhs, span, .. } => {
            let lty = check_expr(lhs, scope, ctx, false);
            let rty = check_expr(rhs, scope, ctx, false);
            check_binary(*op, lty, rty, *span, ctx)
        }
        Expr::NewObject { class, span, resolved_class, .. } => match ctx.symtab.lookup_class(*class) {
            Some(def) => {
                *resolved_class = Some(def);
                if ctx.symtab.class(def).is_abstract {
                    emit(
                        ctx.handler,
                        DiagnosticCode::E_BAD_INSTANTIATE,
                        *span,
                        format!("cannot instantiate abstract class '{}'", class.as_str()),
                    );
                    ctx.arena.error_id()
                } else {
                    ctx.arena.class(def)
                }
            }
            None => {
                emit(ctx.handler, DiagnosticCode::E_CLASS_NOT_FOUND, *span, format!("class '{}' not found", class.as_str()));
                ctx.arena.error_id()
            }
        },
        Expr::NewArray { elem_type, size, span, .. } => {
            let elem_ty = resolve_type_lit(elem_type, ctx.arena, ctx.symtab, ctx.handler);
            let size_ty = check_expr(size, scope, ctx, false);
            if !ctx.arena.is_error(size_ty) && size_ty != ctx.arena.int_id() {
                emit(ctx.handler, DiagnosticCode::E_SUB_NOT_INT, *span, "array size must be int");
            }
            if ctx.arena.is_error(elem_ty) {
                ctx.arena.error_id()
            } else {
                ctx.arena.array(elem_ty)
            }
        }
        Expr::ArrayIndex { array, index, span, .. } => {
            let arr_ty = check_expr(array, scope, ctx, false);
            let idx_ty = check_expr(index, scope, ctx, false);
            if !ctx.arena.is_error(idx_ty) && idx_ty != ctx.arena.int_id() {
                emit(ctx.handler, DiagnosticCode::E_SUB_NOT_INT, *span, "array index must be int");
            }
            match ctx.arena.is_array(arr_ty) {
                Some(elem) => elem,
                None => {
                    if !ctx.arena.is_error(arr_ty) {
                        emit(ctx.handler, DiagnosticCode::E_NOT_ARRAY, *span, "indexed expression is not an array");
                    }
                    ctx.arena.error_id()
                }
            }
        }
        Expr::InstanceOf { expr: inner, class, span, .. } => {
            let inner_ty = check_expr(inner, scope, ctx, false);
            if !ctx.arena.is_error(inner_ty) && ctx.arena.is_class(inner_ty).is_none() {
                emit(ctx.handler, DiagnosticCode::E_NOT_CLASS, *span, "instanceof requires a class-typed expression");
            }
            if ctx.symtab.lookup_class(*class).is_none() {
                emit(ctx.handler, DiagnosticCode::E_CLASS_NOT_FOUND, *span, format!("class '{}' not found", class.as_str()));
            }
            ctx.arena.bool_id()
        }
        Expr::Cast { class, expr: inner, span, .. } => {
            let inner_ty = check_expr(inner, scope, ctx, false);
            if !ctx.arena.is_error(inner_ty) && ctx.arena.is_class(inner_ty).is_none() {
                emit(ctx.handler, DiagnosticCode::E_NOT_CLASS, *span, "cast requires a class-typed expression");
            }
            match ctx.symtab.lookup_class(*class) {
                Some(def) => ctx.arena.class(def),
                None => {
                    emit(ctx.handler, DiagnosticCode::E_CLASS_NOT_FOUND, *span, format!("class '{}' not found", class.as_str()));
                    ctx.arena.error_id()
                }
            }
        }
        Expr::VarSel { receiver, name, span, binding, is_class_name, is_array_length, is_member_method_name, .. } => {
            if receiver.is_none() {
                let bref = check_bare_reference(ctx, scope, *name, *span, allow_class_name);
                *binding = bref.binding;
                *is_class_name = bref.is_class_name;
                *is_member_method_name = bref.is_member_method_name;
                *is_array_length = false;
                if bref.needs_this {
                    let t = this_expr(ctx, scope, *span);
                    *receiver = Some(Box::new(t));
                }
                bref.ty
            } else {
                let recv = receiver.as_mut().unwrap();
                let recv_ty = check_expr(recv, scope, ctx, true);
                let receiver_is_class_name = matches!(recv.as_ref(), Expr::VarSel { is_class_name: true, .. });
                if ctx.arena.is_array(recv_ty).is_some() {
                    if name.eq_str("length") {
                        *is_array_length = true;
                        *binding = None;
                        ctx.arena.int_id()
                    } else {
                        emit(
                            ctx.handler,
                            DiagnosticCode::E_FIELD_NOT_FOUND,
                            *span,
                            format!("no field or method named '{}' on an array", name.as_str()),
                        );
                        *binding = None;
                        ctx.arena.error_id()
                    }
                } else {
                    match resolve_member(ctx, scope, recv_ty, *name, receiver_is_class_name, *span) {
                        Some((ty, def, _)) => {
                            *binding = Some(def);
                            ty
                        }
                        None => {
                            *binding = None;
                            ctx.arena.error_id()
                        }
                    }
                }
            }
        }
        Expr::Call { receiver, method, args, span, resolved_method, .. } => {
            check_call(receiver, *method, args, *span, resolved_method, scope, ctx)
        }
        Expr::Lambda(lambda) => check_lambda(lambda, ctx),
    };
    expr.set_ty(ty);
    ty
}

fn check_binary(op: BinaryOp, lty: TypeId, rty: TypeId, span: Span, ctx: &mut Ctx) -> TypeId {
    use BinaryOp::*;
    let check_operand = |ctx: &Ctx, actual: TypeId, want: TypeId| {
        if !ctx.arena.is_error(actual) && actual != want {
            emit(ctx.handler, DiagnosticCode::E_BAD_BINARY_TYPE, span, "incompatible operand type for binary operator");
        }
    };
    match op {
        Add | Sub | Mul | Div | Mod => {
            check_operand(ctx, lty, ctx.arena.int_id());
            check_operand(ctx, rty, ctx.arena.int_id());
            ctx.arena.int_id()
        }
        Lt | Le | Gt | Ge => {
            check_operand(ctx, lty, ctx.arena.int_id());
            check_operand(ctx, rty, ctx.arena.int_id());
            ctx.arena.bool_id()
        }
        And | Or => {
            check_operand(ctx, lty, ctx.arena.bool_id());
            check_operand(ctx, rty, ctx.arena.bool_id());
            ctx.arena.bool_id()
        }
        Eq | Ne => {
            if !ctx.arena.is_error(lty)
                && !ctx.arena.is_error(rty)
                && !subtype(ctx.arena, ctx.symtab, lty, rty)
                && !subtype(ctx.arena, ctx.symtab, rty, lty)
            {
                emit(ctx.handler, DiagnosticCode::E_BAD_BINARY_TYPE, span, "operands of '==' must have compatible types");
            }
            ctx.arena.bool_id()
        }
    }
}

/// `name` is the callee's name when it's a simple bare or member call — the
/// only forms this grammar's `Call` node can express, since its callee is
/// always a `method: Symbol` rather than an arbitrary expression.
fn finish_call(fn_ty: TypeId, name: Symbol, args: &mut [Expr], span: Span, scope: ScopeId, ctx: &mut Ctx) -> TypeId {
    if ctx.arena.is_error(fn_ty) {
        for a in args.iter_mut() {
            check_expr(a, scope, ctx, false);
        }
        return ctx.arena.error_id();
    }
    let Some((ret, params)) = ctx.arena.is_function(fn_ty).map(|(r, p)| (r, p.to_vec())) else {
        emit(ctx.handler, DiagnosticCode::E_NOT_CALLABLE, span, "callee is not callable");
        for a in args.iter_mut() {
            check_expr(a, scope, ctx, false);
        }
        return ctx.arena.error_id();
    };
    if args.len() != params.len() {
        emit(
            ctx.handler,
            DiagnosticCode::E_BAD_ARG_COUNT,
            span,
            format!("'{}' expects {} argument(s) but {} given", name.as_str(), params.len(), args.len()),
        );
    }
    for (i, a) in args.iter_mut().enumerate() {
        let arg_ty = check_expr(a, scope, ctx, false);
        if let Some(&p) = params.get(i) {
            if !ctx.arena.is_error(arg_ty) && !subtype(ctx.arena, ctx.symtab, arg_ty, p) {
                emit(
                    ctx.handler,
                    DiagnosticCode::E_BAD_ARG_TYPE,
                    a.span(),
                    format!("argument {} has a type incompatible with its parameter", i + 1),
                );
            }
        }
    }
    ret
}

fn check_call(
    receiver: &mut Option<Box<Expr>>,
    method: Symbol,
    args: &mut Vec<Expr>,
    span: Span,
    resolved_method: &mut Option<DefId>,
    scope: ScopeId,
    ctx: &mut Ctx,
) -> TypeId {
    if let Some(recv) = receiver.as_mut() {
        let recv_ty = check_expr(recv, scope, ctx, true);
        if ctx.arena.is_array(recv_ty).is_some() && method.eq_str("length") {
            for a in args.iter_mut() {
                check_expr(a, scope, ctx, false);
            }
            if !args.is_empty() {
                emit(ctx.handler, DiagnosticCode::E_BAD_LENGTH_ARG, span, "'length' takes no arguments");
            }
            *resolved_method = None;
            return ctx.arena.int_id();
        }
        let receiver_is_class_name = matches!(recv.as_ref(), Expr::VarSel { is_class_name: true, .. });
        return match resolve_member(ctx, scope, recv_ty, method, receiver_is_class_name, span) {
            Some((fn_ty, def, _)) => {
                *resolved_method = Some(def);
                finish_call(fn_ty, method, args, span, scope, ctx)
            }
            None => {
                *resolved_method = None;
                for a in args.iter_mut() {
                    check_expr(a, scope, ctx, false);
                }
                ctx.arena.error_id()
            }
        };
    }

    match resolve_bare(ctx, scope, method) {
        BareResolution::Var(def, def_scope) => {
            record_capture_if_needed(ctx, scope, def, def_scope);
            let v = ctx.symtab.defs.var(def).clone();
            if v.kind == VarKind::Field {
                let t = this_expr(ctx, scope, span);
                *receiver = Some(Box::new(t));
            }
            if v.kind == VarKind::Field && current_method_is_static(ctx, scope) {
                emit(
                    ctx.handler,
                    DiagnosticCode::E_REF_NON_STATIC,
                    span,
                    format!("cannot reference member variable '{}' from a static method", method.as_str()),
                );
                *resolved_method = Some(def);
                for a in args.iter_mut() {
                    check_expr(a, scope, ctx, false);
                }
                return ctx.arena.error_id();
            }
            *resolved_method = Some(def);
            finish_call(v.ty, method, args, span, scope, ctx)
        }
        BareResolution::Method(def) => {
            let m = ctx.symtab.defs.method(def).clone();
            if !m.is_static {
                let t = this_expr(ctx, scope, span);
                *receiver = Some(Box::new(t));
            }
            if !m.is_static && current_method_is_static(ctx, scope) {
                emit(
                    ctx.handler,
                    DiagnosticCode::E_REF_NON_STATIC,
                    span,
                    format!("cannot reference member method '{}' from a static method", method.as_str()),
                );
                *resolved_method = Some(def);
                for a in args.iter_mut() {
                    check_expr(a, scope, ctx, false);
                }
                return ctx.arena.error_id();
            }
            *resolved_method = Some(def);
            finish_call(m.ty, method, args, span, scope, ctx)
        }
        _ => {
            emit(ctx.handler, DiagnosticCode::E_UNDECL_VAR, span, format!("'{}' is undeclared", method.as_str()));
            *resolved_method = None;
            for a in args.iter_mut() {
                check_expr(a, scope, ctx, false);
            }
            ctx.arena.error_id()
        }
    }
}

fn check_lambda(lambda: &mut Lambda, ctx: &mut Ctx) -> TypeId {
    let lambda_scope = lambda.scope.expect("namer opens every lambda's scope");
    let lambda_def = lambda.def_id.expect("namer assigns every lambda a def_id");
    let param_tys: Vec<TypeId> = lambda
        .params
        .iter()
        .map(|p| ctx.symtab.defs.var(p.def_id.expect("namer declares lambda params")).ty)
        .collect();
    log::debug!("checking lambda at {:?}", lambda.span);
    let ret_ty = match &mut lambda.body {
        LambdaBody::Expr(e) => check_expr(e, lambda_scope, ctx, false),
        LambdaBody::Block(block) => {
            let mut collected = Vec::new();
            {
                let mut target = ReturnTarget::Lambda { collected: &mut collected };
                check_block(block, ctx, &mut target, 0);
            }
            infer_lambda_return(block, &collected, ctx)
        }
    };
    let fn_ty = ctx.arena.function(ret_ty, param_tys);
    let sym = ctx.symtab.defs.lambda_mut(lambda_def);
    sym.ty = fn_ty;
    lambda.captures = sym.captures.clone();
    fn_ty
}

fn infer_lambda_return(block: &Block, rets: &[TypeId], ctx: &mut Ctx) -> TypeId {
    if rets.is_empty() {
        return ctx.arena.void_id();
    }
    if !block.is_close {
        emit(
            ctx.handler,
            DiagnosticCode::E_MISSING_RETURN,
            block.span,
            "not every path through this lambda returns a value",
        );
    }
    let joined = join(ctx.arena, ctx.symtab, rets);
    if ctx.arena.is_error(joined) {
        emit(
            ctx.handler,
            DiagnosticCode::E_INCOMPAT_RET_TYPE,
            block.span,
            "incompatible return types in blocked expression",
        );
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use decaf_ast::{ClassDef, Param, TopLevel, TypeLit};

    fn sp() -> Span {
        Span::DUMMY
    }

    fn int_lit(v: i64) -> Expr {
        Expr::IntLit { value: v, span: sp(), ty: None }
    }

    fn var_ref(name: &str) -> Expr {
        Expr::VarSel {
            receiver: None,
            name: Symbol::intern(name),
            span: sp(),
            ty: None,
            binding: None,
            is_class_name: false,
            is_array_length: false,
            is_member_method_name: false,
        }
    }

    fn static_void_main(body: Vec<Stmt>) -> MethodDef {
        MethodDef {
            name: Symbol::intern("main"),
            is_static: true,
            is_abstract: false,
            ret_type: TypeLit::Void,
            params: vec![],
            body: Some(Block::new(body, sp())),
            span: sp(),
            def_id: None,
            scope: None,
        }
    }

    fn main_class(main_method: MethodDef) -> TopLevel {
        TopLevel {
            classes: vec![ClassDef {
                name: Symbol::intern("Main"),
                is_abstract: false,
                extends: None,
                fields: vec![],
                methods: vec![main_method],
                span: sp(),
                def_id: None,
            }],
            span: sp(),
        }
    }

    fn run(mut ast: TopLevel) -> (TopLevel, Handler) {
        let mut symtab = SymbolTable::new();
        let mut arena = TypeArena::new();
        let handler = Handler::new();
        let no_cycle = crate::namer::resolve(&mut ast, &mut symtab, &mut arena, &handler);
        assert!(no_cycle, "no inheritance cycle expected in these fixtures");
        check(&mut ast, &mut symtab, &mut arena, &handler);
        (ast, handler)
    }

    #[test]
    fn self_referential_var_init_is_undeclared() {
        // var x = x + 1;
        let stmt = Stmt::LocalVarDef {
            name: Symbol::intern("x"),
            declared_type: None,
            init: Expr::Binary {
                op: BinaryOp::Add,
                lhs: Box::new(var_ref("x")),
                rhs: Box::new(int_lit(1)),
                span: sp(),
                ty: None,
            },
            span: sp(),
            def_id: None,
        };
        let ast = main_class(static_void_main(vec![stmt]));
        let (_, handler) = run(ast);
        assert!(handler.has_errors());
        let diags = handler.diagnostics();
        assert!(diags.iter().any(|d| d.code == Some(DiagnosticCode::E_UNDECL_VAR)));
    }

    #[test]
    fn lambda_with_no_outer_reference_has_empty_capture() {
        // var f = fun(int x) => x + 1;
        let lambda = Lambda {
            params: vec![Param { name: Symbol::intern("x"), ty: TypeLit::Int, span: sp(), def_id: None }],
            body: LambdaBody::Expr(Box::new(Expr::Binary {
                op: BinaryOp::Add,
                lhs: Box::new(var_ref("x")),
                rhs: Box::new(int_lit(1)),
                span: sp(),
                ty: None,
            })),
            span: sp(),
            scope: None,
            captures: vec![],
            def_id: None,
        };
        let stmt = Stmt::LocalVarDef {
            name: Symbol::intern("f"),
            declared_type: None,
            init: Expr::Lambda(lambda),
            span: sp(),
            def_id: None,
        };
        let ast = main_class(static_void_main(vec![stmt]));
        let (ast, handler) = run(ast);
        assert!(!handler.has_errors());
        let Stmt::LocalVarDef { init: Expr::Lambda(lam), .. } = &ast.classes[0].methods[0].body.as_ref().unwrap().stmts[0]
        else {
            panic!("expected a lambda-valued local var def");
        };
        assert!(lam.captures.is_empty());
    }

    #[test]
    fn lambda_assigning_outer_local_is_a_capture_violation() {
        // int y = 0; var f = fun() { y = 1; return y; };
        let y_decl = Stmt::LocalVarDef {
            name: Symbol::intern("y"),
            declared_type: Some(TypeLit::Int),
            init: int_lit(0),
            span: sp(),
            def_id: None,
        };
        let lambda_body = Block::new(
            vec![
                Stmt::Assign { target: var_ref("y"), value: int_lit(1), span: sp() },
                Stmt::Return { value: Some(var_ref("y")), span: sp() },
            ],
            sp(),
        );
        let lambda = Lambda {
            params: vec![],
            body: LambdaBody::Block(lambda_body),
            span: sp(),
            scope: None,
            captures: vec![],
            def_id: None,
        };
        let f_decl = Stmt::LocalVarDef {
            name: Symbol::intern("f"),
            declared_type: None,
            init: Expr::Lambda(lambda),
            span: sp(),
            def_id: None,
        };
        let ast = main_class(static_void_main(vec![y_decl, f_decl]));
        let (ast, handler) = run(ast);
        let diags = handler.diagnostics();
        assert!(diags.iter().any(|d| d.code == Some(DiagnosticCode::E_ASSIGN_TO_CAPTURED_VAR)));
        let Stmt::LocalVarDef { init: Expr::Lambda(lam), .. } = &ast.classes[0].methods[0].body.as_ref().unwrap().stmts[1]
        else {
            panic!("expected a lambda-valued local var def");
        };
        assert_eq!(lam.captures.len(), 1);
    }
}
