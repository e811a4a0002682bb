//! Semantic analysis core for Decaf (§2): runs the two-pass analyzer (Namer
//! then Typer) over an already-parsed `TopLevel` AST, populating every
//! `type`/`symbol`/`scope`/`returns`/`isClose`/`capture` annotation slot and
//! filling a `Handler` with diagnostics. The lexer and parser are out of
//! scope; callers (in this workspace, `decaf-drv`) hand in an AST, typically
//! deserialized from JSON since no parser exists here.

pub mod namer;
pub mod scope;
pub mod typelit;
pub mod typer;
pub mod types;

use std::fmt::Write as _;

use decaf_ast::TopLevel;
use decaf_util::Handler;

use scope::{ScopeKind, SymbolTable};
use types::TypeArena;

/// Result of a full analysis run: the populated symbol table and type arena,
/// plus whether the Typer actually ran (it is skipped whenever the Namer
/// reported any error, per §4.F/§7, not only an inheritance cycle).
pub struct AnalysisResult {
    pub symtab: SymbolTable,
    pub arena: TypeArena,
    pub typed: bool,
}

/// Runs the Namer, then the Typer unless the Namer reported any error at all
/// (not only an inheritance cycle — per §4.F, "after name resolution fails
/// the driver skips the typing pass"). Mutates `ast` in place, filling every
/// annotation slot the Typer/Namer own; diagnostics accumulate on `handler`
/// in emission order (§5).
pub fn analyze(ast: &mut TopLevel, handler: &Handler) -> AnalysisResult {
    let mut symtab = SymbolTable::new();
    let mut arena = TypeArena::new();

    log::info!("starting semantic analysis of {} class(es)", ast.classes.len());
    let no_cycle = namer::resolve(ast, &mut symtab, &mut arena, handler);

    let typed = if no_cycle && !handler.has_errors() {
        typer::check(ast, &mut symtab, &mut arena, handler);
        true
    } else {
        log::warn!("skipping type checking after a namer error");
        false
    };

    AnalysisResult { symtab, arena, typed }
}

/// Pretty-prints the scope tree reachable from the global scope, in the
/// fixed indented form described in §6 (`CLASS SCOPE OF 'C':`, `FORMAL SCOPE
/// OF 'm':`, ...). Intended for `decafc --emit-scopes`; exact spacing is an
/// internal convention, not a wire format.
pub fn dump_scopes(symtab: &SymbolTable) -> String {
    let mut children: std::collections::HashMap<decaf_util::ScopeId, Vec<decaf_util::ScopeId>> =
        std::collections::HashMap::new();
    for (id, data) in symtab.scopes.iter_enumerated() {
        if let Some(parent) = data.parent {
            children.entry(parent).or_default().push(id);
        }
    }

    let mut out = String::new();
    write_scope(symtab, &children, symtab.global, 0, &mut out);
    out
}

fn write_scope(
    symtab: &SymbolTable,
    children: &std::collections::HashMap<decaf_util::ScopeId, Vec<decaf_util::ScopeId>>,
    id: decaf_util::ScopeId,
    depth: usize,
    out: &mut String,
) {
    let indent = "    ".repeat(depth);
    let data = symtab.scope(id);
    let header = match data.kind {
        ScopeKind::Global => "GLOBAL SCOPE:".to_string(),
        ScopeKind::Class => {
            let name = data.owner.map(|o| symtab.class(o).name.as_str()).unwrap_or("?");
            format!("CLASS SCOPE OF '{name}':")
        }
        ScopeKind::Formal => {
            let name = data.owner.map(|o| symtab.defs.method(o).name.as_str()).unwrap_or("?");
            format!("FORMAL SCOPE OF '{name}':")
        }
        ScopeKind::Local => "LOCAL SCOPE:".to_string(),
        ScopeKind::Lambda => "LAMBDA SCOPE:".to_string(),
    };
    let _ = writeln!(out, "{indent}{header}");

    for (name, def) in data.symbols.iter() {
        let _ = writeln!(out, "{indent}    {}: {:?}", name.as_str(), def);
    }

    if let Some(kids) = children.get(&id) {
        for &kid in kids {
            write_scope(symtab, children, kid, depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decaf_ast::{ClassDef, MethodDef, Span, TopLevel};

    fn dummy_span() -> Span {
        Span::DUMMY
    }

    fn empty_main() -> TopLevel {
        TopLevel {
            classes: vec![ClassDef {
                name: decaf_util::Symbol::intern("Main"),
                is_abstract: false,
                extends: None,
                fields: vec![],
                methods: vec![MethodDef {
                    name: decaf_util::Symbol::intern("main"),
                    is_static: true,
                    is_abstract: false,
                    ret_type: decaf_ast::TypeLit::Void,
                    params: vec![],
                    body: Some(decaf_ast::Block::new(vec![], dummy_span())),
                    span: dummy_span(),
                    def_id: None,
                    scope: None,
                }],
                span: dummy_span(),
                def_id: None,
            }],
            span: dummy_span(),
        }
    }

    #[test]
    fn analyze_clean_program_reports_no_errors() {
        let mut ast = empty_main();
        let handler = Handler::new();
        let result = analyze(&mut ast, &handler);
        assert!(result.typed);
        assert!(!handler.has_errors());
    }

    #[test]
    fn dump_scopes_includes_global_and_class_headers() {
        let mut ast = empty_main();
        let handler = Handler::new();
        let result = analyze(&mut ast, &handler);
        let dump = dump_scopes(&result.symtab);
        assert!(dump.contains("GLOBAL SCOPE:"));
        assert!(dump.contains("CLASS SCOPE OF 'Main':"));
        assert!(dump.contains("FORMAL SCOPE OF 'main':"));
    }
}
