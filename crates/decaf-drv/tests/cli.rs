//! CLI-boundary tests for `decafc` (§4.H/§8): build small `decaf-ast` fixtures
//! in-process, serialize them the way a real parser would, write them to a
//! temp file, and drive the binary through `assert_cmd`.

use std::io::Write;
use std::path::PathBuf;

use assert_cmd::Command;
use decaf_ast::{Block, ClassDef, Expr, MethodDef, Span, Stmt, TopLevel, TypeLit};
use decaf_util::Symbol;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn decafc() -> Command {
    Command::new(PathBuf::from(env!("CARGO_BIN_EXE_decafc")))
}

fn sp() -> Span {
    Span::DUMMY
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

fn write_ast(ast: &TopLevel) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp AST file");
    let json = serde_json::to_string(ast).expect("serialize fixture AST");
    file.write_all(json.as_bytes()).expect("write fixture AST");
    file
}

#[test]
fn clean_program_exits_zero_and_reports_nothing() {
    let ast = main_class(static_void_main(vec![]));
    let file = write_ast(&ast);

    decafc()
        .arg("--ast")
        .arg(file.path())
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn undeclared_variable_exits_nonzero_with_error_code() {
    let stmt = Stmt::LocalVarDef {
        name: Symbol::intern("x"),
        declared_type: None,
        init: Expr::Binary {
            op: decaf_ast::BinaryOp::Add,
            lhs: Box::new(Expr::VarSel {
                receiver: None,
                name: Symbol::intern("x"),
                span: sp(),
                ty: None,
                binding: None,
                is_class_name: false,
                is_array_length: false,
                is_member_method_name: false,
            }),
            rhs: Box::new(Expr::IntLit { value: 1, span: sp(), ty: None }),
            span: sp(),
            ty: None,
        },
        span: sp(),
        def_id: None,
    };
    let ast = main_class(static_void_main(vec![stmt]));
    let file = write_ast(&ast);

    decafc()
        .arg("--ast")
        .arg(file.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("E3550"));
}

#[test]
fn malformed_json_is_a_contextual_error_not_a_panic() {
    let mut file = NamedTempFile::new().expect("create temp AST file");
    file.write_all(b"{ not valid json").expect("write garbage");

    decafc()
        .arg("--ast")
        .arg(file.path())
        .assert()
        .failure()
        .code(predicate::ne(101))
        .stderr(predicate::str::contains("parsing AST JSON"));
}

#[test]
fn emit_scopes_prints_global_and_class_headers_on_success() {
    let ast = main_class(static_void_main(vec![]));
    let file = write_ast(&ast);

    decafc()
        .arg("--ast")
        .arg(file.path())
        .arg("--emit-scopes")
        .assert()
        .success()
        .stdout(predicate::str::contains("GLOBAL SCOPE:"))
        .stdout(predicate::str::contains("CLASS SCOPE OF 'Main':"));
}

#[test]
fn json_diagnostics_emits_one_json_object_per_line() {
    let stmt = Stmt::Print { args: vec![Expr::VarSel {
        receiver: None,
        name: Symbol::intern("undefined_thing"),
        span: sp(),
        ty: None,
        binding: None,
        is_class_name: false,
        is_array_length: false,
        is_member_method_name: false,
    }], span: sp() };
    let ast = main_class(static_void_main(vec![stmt]));
    let file = write_ast(&ast);

    let output = decafc()
        .arg("--ast")
        .arg(file.path())
        .arg("--json-diagnostics")
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let text = String::from_utf8(output).expect("utf8 stderr");
    let first_line = text.lines().next().expect("at least one diagnostic line");
    let value: serde_json::Value = serde_json::from_str(first_line).expect("valid JSON diagnostic");
    assert_eq!(value["level"], "error");
}
