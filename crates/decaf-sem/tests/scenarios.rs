//! Whole-pipeline scenario tests (§8): each fixture is built directly as a
//! `decaf-ast` tree (no parser in this workspace) and run through
//! `decaf_sem::analyze`, matching the six concrete scenarios.

use decaf_ast::{
    BinaryOp, Block, ClassDef, Expr, FieldDef, Lambda, LambdaBody, MethodDef, Param, Span, Stmt,
    TopLevel, TypeLit,
};
use decaf_sem::analyze;
use decaf_util::diagnostic::DiagnosticCode;
use decaf_util::{Handler, Symbol};

fn sp() -> Span {
    Span::DUMMY
}

fn class(name: &str, extends: Option<&str>, is_abstract: bool, fields: Vec<FieldDef>, methods: Vec<MethodDef>) -> ClassDef {
    ClassDef {
        name: Symbol::intern(name),
        is_abstract,
        extends: extends.map(Symbol::intern),
        fields,
        methods,
        span: sp(),
        def_id: None,
    }
}

fn method(name: &str, is_static: bool, is_abstract: bool, ret_type: TypeLit, params: Vec<Param>, body: Option<Vec<Stmt>>) -> MethodDef {
    MethodDef {
        name: Symbol::intern(name),
        is_static,
        is_abstract,
        ret_type,
        params,
        body: body.map(|stmts| Block::new(stmts, sp())),
        span: sp(),
        def_id: None,
        scope: None,
    }
}

fn empty_main() -> MethodDef {
    method("main", true, false, TypeLit::Void, vec![], Some(vec![]))
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

fn int_lit(v: i64) -> Expr {
    Expr::IntLit { value: v, span: sp(), ty: None }
}

#[test]
fn scenario_1_three_level_inheritance_chain_is_clean() {
    let mut ast = TopLevel {
        classes: vec![
            class("A", None, false, vec![], vec![]),
            class("B", Some("A"), false, vec![], vec![]),
            class("C", Some("B"), false, vec![], vec![]),
            class("Main", None, false, vec![], vec![empty_main()]),
        ],
        span: sp(),
    };
    let handler = Handler::new();
    let result = analyze(&mut ast, &handler);
    assert!(result.typed);
    assert!(!handler.has_errors());

    let dump = decaf_sem::dump_scopes(&result.symtab);
    assert!(dump.contains("CLASS SCOPE OF 'A':"));
    assert!(dump.contains("CLASS SCOPE OF 'B':"));
    assert!(dump.contains("CLASS SCOPE OF 'C':"));
}

#[test]
fn scenario_2_mutual_inheritance_cycle_reports_exactly_one_bad_inheritance() {
    let mut ast = TopLevel {
        classes: vec![
            class("A", Some("B"), false, vec![], vec![]),
            class("B", Some("A"), false, vec![], vec![]),
        ],
        span: sp(),
    };
    let handler = Handler::new();
    let result = analyze(&mut ast, &handler);
    assert!(!result.typed, "typing must be skipped after an inheritance cycle");

    let diags = handler.diagnostics();
    let bad_inheritance_count = diags
        .iter()
        .filter(|d| d.code == Some(DiagnosticCode::E_BAD_INHERITANCE))
        .count();
    assert_eq!(bad_inheritance_count, 1);
}

#[test]
fn scenario_3_unimplemented_abstract_method_reports_no_abstract() {
    let a = class(
        "A",
        None,
        true,
        vec![],
        vec![method("f", false, true, TypeLit::Int, vec![], None)],
    );
    let b = class("B", Some("A"), false, vec![], vec![]);
    let mut ast = TopLevel {
        classes: vec![a, b, class("Main", None, false, vec![], vec![empty_main()])],
        span: sp(),
    };
    let handler = Handler::new();
    let result = analyze(&mut ast, &handler);
    // A namer-stage error skips the typing pass entirely (§4.F).
    assert!(!result.typed);
    assert!(handler.has_errors());

    let diags = handler.diagnostics();
    assert!(diags.iter().any(|d| d.code == Some(DiagnosticCode::E_NO_ABSTRACT)));
}

#[test]
fn scenario_4_self_referential_local_init_is_undeclared() {
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
    let main = method("main", true, false, TypeLit::Void, vec![], Some(vec![stmt]));
    let mut ast = TopLevel {
        classes: vec![class("Main", None, false, vec![], vec![main])],
        span: sp(),
    };
    let handler = Handler::new();
    let result = analyze(&mut ast, &handler);
    assert!(result.typed);
    assert!(handler.has_errors());

    let diags = handler.diagnostics();
    assert!(diags.iter().any(|d| d.code == Some(DiagnosticCode::E_UNDECL_VAR)));
}

#[test]
fn scenario_5_noncapturing_lambda_is_clean_with_empty_capture() {
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
    let f_decl = Stmt::LocalVarDef {
        name: Symbol::intern("f"),
        declared_type: None,
        init: Expr::Lambda(lambda),
        span: sp(),
        def_id: None,
    };
    let call_f = Stmt::Print {
        args: vec![Expr::Call {
            receiver: None,
            method: Symbol::intern("f"),
            args: vec![int_lit(2)],
            span: sp(),
            ty: None,
            resolved_method: None,
        }],
        span: sp(),
    };
    let main = method("main", true, false, TypeLit::Void, vec![], Some(vec![f_decl, call_f]));
    let mut ast = TopLevel {
        classes: vec![class("Main", None, false, vec![], vec![main])],
        span: sp(),
    };
    let handler = Handler::new();
    let result = analyze(&mut ast, &handler);
    assert!(result.typed);
    assert!(!handler.has_errors());

    let Stmt::LocalVarDef { init: Expr::Lambda(lam), .. } = &ast.classes[0].methods[0].body.as_ref().unwrap().stmts[0]
    else {
        panic!("expected a lambda-valued local var def");
    };
    assert!(lam.captures.is_empty());
}

#[test]
fn scenario_6_lambda_assigning_outer_local_is_captured_var_violation() {
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
    let main = method("main", true, false, TypeLit::Void, vec![], Some(vec![y_decl, f_decl]));
    let mut ast = TopLevel {
        classes: vec![class("Main", None, false, vec![], vec![main])],
        span: sp(),
    };
    let handler = Handler::new();
    let result = analyze(&mut ast, &handler);
    assert!(result.typed);
    assert!(handler.has_errors());

    let diags = handler.diagnostics();
    assert!(diags.iter().any(|d| d.code == Some(DiagnosticCode::E_ASSIGN_TO_CAPTURED_VAR)));

    let Stmt::LocalVarDef { init: Expr::Lambda(lam), .. } = &ast.classes[0].methods[0].body.as_ref().unwrap().stmts[1]
    else {
        panic!("expected a lambda-valued local var def");
    };
    assert_eq!(lam.captures.len(), 1);
}

#[test]
fn void_typed_field_is_rejected() {
    let field = FieldDef { name: Symbol::intern("x"), ty: TypeLit::Void, span: sp(), def_id: None };
    let a = class("A", None, false, vec![field], vec![]);
    let mut ast = TopLevel {
        classes: vec![a, class("Main", None, false, vec![], vec![empty_main()])],
        span: sp(),
    };
    let handler = Handler::new();
    analyze(&mut ast, &handler);
    assert!(handler.has_errors());

    let diags = handler.diagnostics();
    assert!(diags.iter().any(|d| d.code == Some(DiagnosticCode::E_VOID_FIELD)));
}

#[test]
fn duplicate_class_with_method_body_reports_conflict_without_panicking() {
    let first = class("A", None, false, vec![], vec![empty_main()]);
    let second = class("A", None, false, vec![], vec![method("g", false, false, TypeLit::Int, vec![], Some(vec![Stmt::Return {
        value: Some(int_lit(1)),
        span: sp(),
    }]))]);
    let mut ast = TopLevel {
        classes: vec![first, second, class("Main", None, false, vec![], vec![empty_main()])],
        span: sp(),
    };
    let handler = Handler::new();
    // The second 'A' never gets a def_id; analyze() must not panic over it.
    analyze(&mut ast, &handler);
    assert!(handler.has_errors());
    let diags = handler.diagnostics();
    assert!(diags.iter().any(|d| d.code == Some(DiagnosticCode::E_DECL_CONFLICT)));
}

#[test]
fn bad_arg_count_message_names_the_callee() {
    let lambda = Lambda {
        params: vec![Param { name: Symbol::intern("x"), ty: TypeLit::Int, span: sp(), def_id: None }],
        body: LambdaBody::Expr(Box::new(var_ref("x"))),
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
    let call_f = Stmt::ExprStmt {
        expr: Expr::Call {
            receiver: None,
            method: Symbol::intern("f"),
            args: vec![],
            span: sp(),
            ty: None,
            resolved_method: None,
        },
        span: sp(),
    };
    let main = method("main", true, false, TypeLit::Void, vec![], Some(vec![f_decl, call_f]));
    let mut ast = TopLevel {
        classes: vec![class("Main", None, false, vec![], vec![main])],
        span: sp(),
    };
    let handler = Handler::new();
    analyze(&mut ast, &handler);
    assert!(handler.has_errors());

    let diags = handler.diagnostics();
    let bad_count = diags
        .iter()
        .find(|d| d.code == Some(DiagnosticCode::E_BAD_ARG_COUNT))
        .expect("expected a BadArgCount diagnostic");
    assert!(bad_count.message.contains('f'));
}
