//! Name resolution (§4.D): builds the class hierarchy, opens every scope in
//! the program, declares every field/method/param/lambda symbol, and checks
//! everything that can be decided without types flowing through expressions
//! (inheritance cycles, overrides, abstractness, the `Main` entry point).
//!
//! Method/lambda *bodies* only get their scopes opened here; declaring and
//! typing their local variables is the Typer's job (`typer.rs`), since a
//! local's position in the scope depends on when its initializer is typed.

use decaf_ast::{Block, Expr, Lambda, LambdaBody, MethodDef, Stmt, TopLevel};
use decaf_util::diagnostic::DiagnosticCode;
use decaf_util::{Diagnostic, DiagnosticBuilder, Handler, ScopeId, Span, Symbol};

use crate::scope::{
    ClassSymbol, Conflict, LambdaSymbol, MethodSymbol, ScopeKind, SymbolTable, VarKind, VarSymbol,
};
use crate::typelit::resolve_type_lit;
use crate::types::{subtype, TypeArena};

fn emit(handler: &Handler, code: DiagnosticCode, span: Span, message: impl Into<String>) {
    let diag: Diagnostic = DiagnosticBuilder::error(message).code(code).span(span).build();
    handler.emit_diagnostic(diag);
}

/// Runs the full name-resolution algorithm over `ast`, mutating its `def_id`
/// / `scope` annotation slots in place. Returns `false` ("abort further
/// work") when an inheritance cycle was found, mirroring the handler's own
/// `has_errors()` but explicit at the call site since a cycle specifically
/// skips *all* downstream member resolution, not just typing.
pub fn resolve(
    ast: &mut TopLevel,
    symtab: &mut SymbolTable,
    arena: &mut TypeArena,
    handler: &Handler,
) -> bool {
    log::debug!("resolving names for {} top-level classes", ast.classes.len());
    let n = ast.classes.len();
    let mut duplicate = vec![false; n];
    let mut def_id_by_idx = vec![None; n];
    let mut name_map: std::collections::HashMap<Symbol, usize> = std::collections::HashMap::new();

    // Step 1: name -> ClassDef map; duplicates are dropped.
    for (idx, class) in ast.classes.iter_mut().enumerate() {
        if let Some(&_first) = name_map.get(&class.name) {
            duplicate[idx] = true;
            emit(
                handler,
                DiagnosticCode::E_DECL_CONFLICT,
                class.span,
                format!("class '{}' is already defined", class.name.as_str()),
            );
            continue;
        }
        name_map.insert(class.name, idx);
        let def = symtab.defs.alloc_class_placeholder();
        symtab.register_class(class.name, def);
        def_id_by_idx[idx] = Some(def);
        class.def_id = Some(def);
    }

    // Step 2: resolve `extends`.
    let mut parent_idx: Vec<Option<usize>> = vec![None; n];
    for (idx, class) in ast.classes.iter().enumerate() {
        if duplicate[idx] {
            continue;
        }
        if let Some(super_name) = class.extends {
            match name_map.get(&super_name) {
                Some(&p) if !duplicate[p] => parent_idx[idx] = Some(p),
                _ => {
                    emit(
                        handler,
                        DiagnosticCode::E_CLASS_NOT_FOUND,
                        class.span,
                        format!("class '{}' not found", super_name.as_str()),
                    );
                }
            }
        }
    }

    // Step 3: cycle check, timestamp-based DFS.
    let mut gen_stamp: Vec<Option<u32>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut generation: u32 = 0;
    let mut has_cycle = false;
    for start in 0..n {
        if visited[start] || duplicate[start] {
            continue;
        }
        generation += 1;
        let mut cur = Some(start);
        while let Some(c) = cur {
            if visited[c] {
                break;
            }
            if gen_stamp[c] == Some(generation) {
                if !has_cycle {
                    emit(
                        handler,
                        DiagnosticCode::E_BAD_INHERITANCE,
                        ast.classes[c].span,
                        "illegal class inheritance (cycle detected)",
                    );
                }
                has_cycle = true;
                visited[c] = true;
                break;
            }
            gen_stamp[c] = Some(generation);
            visited[c] = true;
            cur = parent_idx[c];
        }
    }

    if has_cycle {
        return false;
    }

    // Step 4: class-symbol construction in topological order (superclass
    // scope before subclass scope), memoized so shared ancestors aren't
    // revisited.
    let mut scope_by_idx: Vec<Option<ScopeId>> = vec![None; n];
    for idx in 0..n {
        if duplicate[idx] {
            continue;
        }
        ensure_class_scope(idx, ast, symtab, arena, &parent_idx, &def_id_by_idx, &mut scope_by_idx);
    }

    // Step 5: member resolution, supers-first.
    for idx in 0..n {
        if duplicate[idx] {
            continue;
        }
        resolve_members(idx, ast, symtab, arena, handler, &parent_idx, &def_id_by_idx, &scope_by_idx);
    }

    // Step 6: locate Main.
    let mut main_count = 0;
    for idx in 0..n {
        if duplicate[idx] {
            continue;
        }
        let def = def_id_by_idx[idx].unwrap();
        let is_main = {
            let class = symtab.class(def);
            !class.is_abstract && class.name.eq_str("Main")
        };
        if is_main {
            let scope = symtab.class(def).scope;
            let has_static_main = symtab.scope(scope).symbols.iter().any(|(name, &member)| {
                name.eq_str("main")
                    && matches!(symtab.defs.get(member), crate::scope::SymbolData::Method(m)
                        if m.is_static && is_nullary_void(arena, m.ty))
            });
            if has_static_main {
                main_count += 1;
                if let crate::scope::SymbolData::Class(c) = symtab.defs.get_mut(def) {
                    c.is_main = true;
                }
            }
        }
    }
    if main_count != 1 {
        emit(
            handler,
            DiagnosticCode::E_NO_MAIN_CLASS,
            ast.span,
            "no legal Main class named 'Main' was found",
        );
    }

    true
}

fn is_nullary_void(arena: &TypeArena, ty: decaf_util::TypeId) -> bool {
    matches!(arena.is_function(ty), Some((ret, args)) if args.is_empty() && ret == arena.void_id())
}

fn ensure_class_scope(
    idx: usize,
    ast: &TopLevel,
    symtab: &mut SymbolTable,
    arena: &mut TypeArena,
    parent_idx: &[Option<usize>],
    def_id_by_idx: &[Option<decaf_util::DefId>],
    scope_by_idx: &mut Vec<Option<ScopeId>>,
) -> ScopeId {
    if let Some(s) = scope_by_idx[idx] {
        return s;
    }
    let parent_scope = parent_idx[idx]
        .map(|p| ensure_class_scope(p, ast, symtab, arena, parent_idx, def_id_by_idx, scope_by_idx));
    let def = def_id_by_idx[idx].unwrap();
    let scope = symtab.open_scope(ScopeKind::Class, parent_scope, Some(def));
    scope_by_idx[idx] = Some(scope);

    let class = &ast.classes[idx];
    let ty = arena.class(def);
    let base = parent_idx[idx].map(|p| def_id_by_idx[p].unwrap());
    symtab.defs.fill_class(
        def,
        ClassSymbol {
            name: class.name,
            span: class.span,
            is_abstract: class.is_abstract,
            ty,
            scope,
            base,
            not_override: Default::default(),
            is_main: false,
            resolved: false,
        },
    );
    scope
}

#[allow(clippy::too_many_arguments)]
fn resolve_members(
    idx: usize,
    ast: &mut TopLevel,
    symtab: &mut SymbolTable,
    arena: &mut TypeArena,
    handler: &Handler,
    parent_idx: &[Option<usize>],
    def_id_by_idx: &[Option<decaf_util::DefId>],
    scope_by_idx: &[Option<ScopeId>],
) {
    let def = def_id_by_idx[idx].unwrap();
    if symtab.class(def).resolved {
        return;
    }
    if let Some(p) = parent_idx[idx] {
        resolve_members(p, ast, symtab, arena, handler, parent_idx, def_id_by_idx, scope_by_idx);
    }

    let scope = scope_by_idx[idx].unwrap();
    let mut not_override = parent_idx[idx]
        .map(|p| symtab.class(def_id_by_idx[p].unwrap()).not_override.clone())
        .unwrap_or_default();

    // Fields.
    let class = &mut ast.classes[idx];
    for field in class.fields.iter_mut() {
        let ty = resolve_type_lit(&field.ty, arena, symtab, handler);
        let ty = if ty == arena.void_id() {
            emit(
                handler,
                DiagnosticCode::E_VOID_FIELD,
                field.span,
                format!("field '{}' must not have type void", field.name.as_str()),
            );
            arena.error_id()
        } else {
            ty
        };
        match symtab.find_conflict(scope, field.name) {
            Some(Conflict::SameScope(_)) => {
                emit(
                    handler,
                    DiagnosticCode::E_DECL_CONFLICT,
                    field.span,
                    format!("member '{}' already defined", field.name.as_str()),
                );
                continue;
            }
            Some(Conflict::Inherited(prev_def)) => {
                let shadows_var = matches!(symtab.defs.get(prev_def), crate::scope::SymbolData::Var(_));
                if shadows_var {
                    emit(
                        handler,
                        DiagnosticCode::E_OVERRIDING_VAR,
                        field.span,
                        format!("'{}' overrides an inherited member variable", field.name.as_str()),
                    );
                } else {
                    emit(
                        handler,
                        DiagnosticCode::E_DECL_CONFLICT,
                        field.span,
                        format!("member '{}' already defined", field.name.as_str()),
                    );
                }
                continue;
            }
            None => {}
        }
        let var_def = symtab.defs.declare_var(VarSymbol {
            name: field.name,
            span: field.span,
            kind: VarKind::Field,
            ty,
            owner: Some(def),
        });
        symtab.declare_in(scope, field.name, var_def);
        field.def_id = Some(var_def);
    }

    // Methods.
    for method in class.methods.iter_mut() {
        declare_method(method, def, scope, symtab, arena, handler, &mut not_override);
    }

    let is_abstract = symtab.class(def).is_abstract;
    if !is_abstract && !not_override.is_empty() {
        emit(
            handler,
            DiagnosticCode::E_NO_ABSTRACT,
            symtab.class(def).span,
            format!(
                "'{}' is not abstract and does not override all abstract methods",
                symtab.class(def).name.as_str()
            ),
        );
    }

    if let crate::scope::SymbolData::Class(c) = symtab.defs.get_mut(def) {
        c.not_override = not_override;
        c.resolved = true;
    }
}

fn declare_method(
    method: &mut MethodDef,
    owner: decaf_util::DefId,
    class_scope: ScopeId,
    symtab: &mut SymbolTable,
    arena: &mut TypeArena,
    handler: &Handler,
    not_override: &mut decaf_util::FxHashMap<Symbol, decaf_util::DefId>,
) {
    let ret_ty = resolve_type_lit(&method.ret_type, arena, symtab, handler);
    let formal_scope = symtab.open_scope(ScopeKind::Formal, Some(class_scope), None);
    let mut param_tys = Vec::with_capacity(method.params.len());
    for param in method.params.iter_mut() {
        let pty = resolve_type_lit(&param.ty, arena, symtab, handler);
        param_tys.push(pty);
        let pdef = symtab.defs.declare_var(VarSymbol {
            name: param.name,
            span: param.span,
            kind: VarKind::Formal,
            ty: pty,
            owner: None,
        });
        symtab.declare_in(formal_scope, param.name, pdef);
        param.def_id = Some(pdef);
    }
    let fn_ty = arena.function(ret_ty, param_tys);

    let existing = symtab.find_conflict(class_scope, method.name);
    let existing_was_none = existing.is_none();
    let mut overrides = None;
    match existing {
        Some(Conflict::SameScope(_)) => {
            emit(
                handler,
                DiagnosticCode::E_DECL_CONFLICT,
                method.span,
                format!("member '{}' already defined", method.name.as_str()),
            );
        }
        Some(Conflict::Inherited(prev_def)) => {
            let prev_is_method = matches!(symtab.defs.get(prev_def), crate::scope::SymbolData::Method(m) if !m.is_static);
            if prev_is_method && !method.is_static {
                let prev = symtab.defs.method(prev_def).clone();
                if method.is_abstract && !prev.is_abstract {
                    emit(
                        handler,
                        DiagnosticCode::E_DECL_CONFLICT,
                        method.span,
                        "an abstract method cannot override a concrete one",
                    );
                } else if !subtype(arena, symtab, fn_ty, prev.ty) {
                    emit(
                        handler,
                        DiagnosticCode::E_BAD_OVERRIDE,
                        method.span,
                        format!(
                            "overriding signature of method '{}' is not compatible",
                            method.name.as_str()
                        ),
                    );
                } else {
                    overrides = Some(prev_def);
                    if method.is_abstract {
                        not_override.insert(method.name, prev_def);
                    } else {
                        not_override.remove(&method.name);
                    }
                }
            } else {
                let shadows_var = matches!(symtab.defs.get(prev_def), crate::scope::SymbolData::Var(_));
                if shadows_var {
                    emit(
                        handler,
                        DiagnosticCode::E_OVERRIDING_VAR,
                        method.span,
                        format!("'{}' overrides an inherited member variable", method.name.as_str()),
                    );
                } else {
                    emit(
                        handler,
                        DiagnosticCode::E_DECL_CONFLICT,
                        method.span,
                        format!("member '{}' already defined", method.name.as_str()),
                    );
                }
            }
        }
        None => {}
    }

    let method_def = symtab.defs.declare_method(MethodSymbol {
        name: method.name,
        span: method.span,
        owner,
        is_static: method.is_static,
        is_abstract: method.is_abstract,
        ty: fn_ty,
        scope: formal_scope,
        overrides,
    });
    symtab.declare_in(class_scope, method.name, method_def);
    method.def_id = Some(method_def);
    method.scope = Some(formal_scope);

    if method.is_abstract && existing_was_none {
        not_override.insert(method.name, method_def);
    }

    if let Some(body) = method.body.as_mut() {
        open_block_scopes(body, formal_scope, symtab, arena, handler);
    }
}

/// Opens scopes for a method/lambda body without declaring any locals —
/// that happens during the Typer's statement walk.
fn open_block_scopes(block: &mut Block, parent: ScopeId, symtab: &mut SymbolTable, arena: &mut TypeArena, handler: &Handler) {
    let scope = symtab.open_scope(ScopeKind::Local, Some(parent), None);
    block.scope = Some(scope);
    for stmt in block.stmts.iter_mut() {
        open_stmt_scopes(stmt, scope, symtab, arena, handler);
    }
}

fn open_stmt_scopes(stmt: &mut Stmt, parent: ScopeId, symtab: &mut SymbolTable, arena: &mut TypeArena, handler: &Handler) {
    match stmt {
        Stmt::Block(b) => open_block_scopes(b, parent, symtab, arena, handler),
        Stmt::If {
            cond,
            then_branch,
            else_branch,
            ..
        } => {
            open_expr_scopes(cond, parent, symtab, arena, handler);
            open_block_scopes(then_branch, parent, symtab, arena, handler);
            if let Some(eb) = else_branch {
                open_block_scopes(eb, parent, symtab, arena, handler);
            }
        }
        Stmt::While { cond, body, .. } => {
            open_expr_scopes(cond, parent, symtab, arena, handler);
            open_block_scopes(body, parent, symtab, arena, handler);
        }
        Stmt::For {
            init,
            cond,
            update,
            body,
            ..
        } => {
            if let Some(init) = init {
                open_stmt_scopes(init, parent, symtab, arena, handler);
            }
            if let Some(cond) = cond {
                open_expr_scopes(cond, parent, symtab, arena, handler);
            }
            if let Some(update) = update {
                open_stmt_scopes(update, parent, symtab, arena, handler);
            }
            open_block_scopes(body, parent, symtab, arena, handler);
        }
        Stmt::Return { value, .. } => {
            if let Some(v) = value {
                open_expr_scopes(v, parent, symtab, arena, handler);
            }
        }
        Stmt::Print { args, .. } => {
            for a in args {
                open_expr_scopes(a, parent, symtab, arena, handler);
            }
        }
        Stmt::LocalVarDef { init, .. } => open_expr_scopes(init, parent, symtab, arena, handler),
        Stmt::Assign { target, value, .. } => {
            open_expr_scopes(target, parent, symtab, arena, handler);
            open_expr_scopes(value, parent, symtab, arena, handler);
        }
        Stmt::Break { .. } => {}
        Stmt::ExprStmt { expr, .. } => open_expr_scopes(expr, parent, symtab, arena, handler),
    }
}

fn open_expr_scopes(expr: &mut Expr, parent: ScopeId, symtab: &mut SymbolTable, arena: &mut TypeArena, handler: &Handler) {
    match expr {
        Expr::Unary { operand, .. } => open_expr_scopes(operand, parent, symtab, arena, handler),
        Expr::Binary { lhs, rhs, .. } => {
            open_expr_scopes(lhs, parent, symtab, arena, handler);
            open_expr_scopes(rhs, parent, symtab, arena, handler);
        }
        Expr::NewArray { size, .. } => open_expr_scopes(size, parent, symtab, arena, handler),
        Expr::ArrayIndex { array, index, .. } => {
            open_expr_scopes(array, parent, symtab, arena, handler);
            open_expr_scopes(index, parent, symtab, arena, handler);
        }
        Expr::InstanceOf { expr, .. } | Expr::Cast { expr, .. } => {
            open_expr_scopes(expr, parent, symtab, arena, handler)
        }
        Expr::VarSel { receiver, .. } => {
            if let Some(r) = receiver {
                open_expr_scopes(r, parent, symtab, arena, handler);
            }
        }
        Expr::Call { receiver, args, .. } => {
            if let Some(r) = receiver {
                open_expr_scopes(r, parent, symtab, arena, handler);
            }
            for a in args {
                open_expr_scopes(a, parent, symtab, arena, handler);
            }
        }
        Expr::Lambda(lambda) => open_lambda_scopes(lambda, parent, symtab, arena, handler),
        Expr::IntLit { .. }
        | Expr::BoolLit { .. }
        | Expr::StringLit { .. }
        | Expr::NullLit { .. }
        | Expr::This { .. }
        | Expr::NewObject { .. } => {}
    }
}

fn open_lambda_scopes(lambda: &mut Lambda, parent: ScopeId, symtab: &mut SymbolTable, arena: &mut TypeArena, handler: &Handler) {
    let lambda_scope = symtab.open_scope(ScopeKind::Lambda, Some(parent), None);
    for param in lambda.params.iter_mut() {
        let pty = resolve_type_lit(&param.ty, arena, symtab, handler);
        let pdef = symtab.defs.declare_var(VarSymbol {
            name: param.name,
            span: param.span,
            kind: VarKind::Formal,
            ty: pty,
            owner: None,
        });
        symtab.declare_in(lambda_scope, param.name, pdef);
        param.def_id = Some(pdef);
    }
    // The lambda's own function type depends on its inferred return type,
    // which the Typer computes from the body; `Error` is a safe placeholder
    // until then (and stays visible as "unresolved" if the Typer never runs).
    let lambda_def = symtab.defs.declare_lambda(LambdaSymbol {
        span: lambda.span,
        ty: arena.error_id(),
        scope: lambda_scope,
        captures: Vec::new(),
    });
    symtab.scope_mut(lambda_scope).owner = Some(lambda_def);
    lambda.scope = Some(lambda_scope);
    lambda.def_id = Some(lambda_def);
    match &mut lambda.body {
        LambdaBody::Expr(e) => open_expr_scopes(e, lambda_scope, symtab, arena, handler),
        LambdaBody::Block(b) => open_block_scopes(b, lambda_scope, symtab, arena, handler),
    }
}
