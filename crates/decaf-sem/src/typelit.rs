//! Resolves a surface `TypeLit` (as written in source) into an interned
//! `TypeId`, reporting the same diagnostics whether it's reached from a
//! field/param/return type (Namer) or a `new T[n]`/lambda param type
//! (Typer). Kept as a standalone function rather than a method on either
//! pass so both can share it without one pass depending on the other.

use decaf_ast::TypeLit;
use decaf_util::diagnostic::DiagnosticCode;
use decaf_util::{Diagnostic, DiagnosticBuilder, Handler, TypeId};

use crate::scope::SymbolTable;
use crate::types::TypeArena;

pub fn resolve_type_lit(
    lit: &TypeLit,
    arena: &mut TypeArena,
    symtab: &SymbolTable,
    handler: &Handler,
) -> TypeId {
    match lit {
        TypeLit::Int => arena.int_id(),
        TypeLit::Bool => arena.bool_id(),
        TypeLit::String => arena.string_id(),
        TypeLit::Void => arena.void_id(),
        TypeLit::Class(name, span) => match symtab.lookup_class(*name) {
            Some(def) => arena.class(def),
            None => {
                emit(
                    handler,
                    DiagnosticCode::E_CLASS_NOT_FOUND,
                    *span,
                    format!("class '{}' not found", name.as_str()),
                );
                arena.error_id()
            }
        },
        TypeLit::Array(elem, span) => {
            let elem_id = resolve_type_lit(elem, arena, symtab, handler);
            if elem_id == arena.void_id() {
                emit(
                    handler,
                    DiagnosticCode::E_BAD_ARR_ELEMENT,
                    *span,
                    "array element type must not be void".to_string(),
                );
                return arena.error_id();
            }
            arena.array(elem_id)
        }
        TypeLit::Lambda(ret, params, span) => {
            let ret_id = resolve_type_lit(ret, arena, symtab, handler);
            let param_ids: Vec<TypeId> = params
                .iter()
                .map(|p| {
                    let id = resolve_type_lit(p, arena, symtab, handler);
                    if id == arena.void_id() {
                        emit(
                            handler,
                            DiagnosticCode::E_VOID_ARGS,
                            p.span().unwrap_or(*span),
                            "arguments in function type must be non-void known type".to_string(),
                        );
                        arena.error_id()
                    } else {
                        id
                    }
                })
                .collect();
            arena.function(ret_id, param_ids)
        }
    }
}

fn emit(handler: &Handler, code: DiagnosticCode, span: decaf_util::Span, message: String) {
    let diag: Diagnostic = DiagnosticBuilder::error(message).code(code).span(span).build();
    handler.emit_diagnostic(diag);
}
