//! The type lattice (§4.A): built-ins, arrays, classes and function types,
//! hash-consed into a single arena so structural equality of arrays and
//! function types reduces to `TypeId` equality.

use decaf_util::{DefId, FxHashMap, IndexVec, TypeId};

use crate::scope::SymbolTable;

/// A type. `Array`/`Function` reference their component types by interned
/// `TypeId` rather than boxing them, so two structurally identical
/// arrays/functions collapse onto the same arena slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Bool,
    String,
    Void,
    /// The type of the `null` literal; subtype of every class type.
    Null,
    /// Sentinel absorbing cascades: both sub- and super-type of everything.
    Error,
    Array(TypeId),
    /// Identified nominally by the owning `ClassSymbol`'s `DefId`.
    Class(DefId),
    Function(TypeId, Vec<TypeId>),
}

/// Hash-consing arena for `Type`s, owned by the analysis context for the
/// lifetime of a single Namer+Typer run.
pub struct TypeArena {
    types: IndexVec<TypeId, Type>,
    interned: FxHashMap<Type, TypeId>,
    int: TypeId,
    bool_: TypeId,
    string: TypeId,
    void: TypeId,
    null: TypeId,
    error: TypeId,
}

impl TypeArena {
    pub fn new() -> Self {
        let mut types = IndexVec::new();
        let mut interned = FxHashMap::default();
        let mut intern_builtin = |types: &mut IndexVec<TypeId, Type>, ty: Type| -> TypeId {
            let id = types.push(ty.clone());
            interned.insert(ty, id);
            id
        };
        let int = intern_builtin(&mut types, Type::Int);
        let bool_ = intern_builtin(&mut types, Type::Bool);
        let string = intern_builtin(&mut types, Type::String);
        let void = intern_builtin(&mut types, Type::Void);
        let null = intern_builtin(&mut types, Type::Null);
        let error = intern_builtin(&mut types, Type::Error);
        TypeArena {
            types,
            interned,
            int,
            bool_,
            string,
            void,
            null,
            error,
        }
    }

    pub fn int_id(&self) -> TypeId {
        self.int
    }
    pub fn bool_id(&self) -> TypeId {
        self.bool_
    }
    pub fn string_id(&self) -> TypeId {
        self.string
    }
    pub fn void_id(&self) -> TypeId {
        self.void
    }
    pub fn null_id(&self) -> TypeId {
        self.null
    }
    pub fn error_id(&self) -> TypeId {
        self.error
    }

    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(&id) = self.interned.get(&ty) {
            return id;
        }
        let id = self.types.push(ty.clone());
        self.interned.insert(ty, id);
        id
    }

    pub fn array(&mut self, elem: TypeId) -> TypeId {
        self.intern(Type::Array(elem))
    }

    pub fn class(&mut self, def: DefId) -> TypeId {
        self.intern(Type::Class(def))
    }

    pub fn function(&mut self, ret: TypeId, args: Vec<TypeId>) -> TypeId {
        self.intern(Type::Function(ret, args))
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id]
    }

    pub fn is_error(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Error)
    }

    pub fn is_class(&self, id: TypeId) -> Option<DefId> {
        match self.get(id) {
            Type::Class(def) => Some(*def),
            _ => None,
        }
    }

    pub fn is_array(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            Type::Array(elem) => Some(*elem),
            _ => None,
        }
    }

    pub fn is_function(&self, id: TypeId) -> Option<(TypeId, &[TypeId])> {
        match self.get(id) {
            Type::Function(ret, args) => Some((*ret, args)),
            _ => None,
        }
    }

    pub fn is_base(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Int | Type::Bool | Type::String)
    }

    /// Human-readable rendering used in diagnostic messages, e.g. `int[]`,
    /// `A`, `(int, bool)->void`.
    pub fn display(&self, symtab: &SymbolTable, id: TypeId) -> String {
        match self.get(id) {
            Type::Int => "int".to_string(),
            Type::Bool => "bool".to_string(),
            Type::String => "string".to_string(),
            Type::Void => "void".to_string(),
            Type::Null => "null".to_string(),
            Type::Error => "error".to_string(),
            Type::Array(elem) => format!("{}[]", self.display(symtab, *elem)),
            Type::Class(def) => symtab.class(*def).name.as_str().to_string(),
            Type::Function(ret, args) => {
                let args: Vec<String> = args.iter().map(|a| self.display(symtab, *a)).collect();
                format!("({})->{}", args.join(", "), self.display(symtab, *ret))
            }
        }
    }
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

/// `t <: u`: `Error` absorbs both directions; `Null` is below every class;
/// classes walk the `super` chain; arrays are invariant (so already covered
/// by the `a == b` fast path below, since hash-consing makes two arrays of
/// the same element type identical `TypeId`s); functions are contravariant
/// in their arguments, covariant in their return.
pub fn subtype(arena: &TypeArena, symtab: &SymbolTable, a: TypeId, b: TypeId) -> bool {
    if a == b {
        return true;
    }
    match (arena.get(a), arena.get(b)) {
        (Type::Error, _) | (_, Type::Error) => true,
        (Type::Null, Type::Class(_)) => true,
        (Type::Class(c1), Type::Class(c2)) => {
            let mut cur = Some(*c1);
            while let Some(id) = cur {
                if id == *c2 {
                    return true;
                }
                cur = symtab.class(id).base;
            }
            false
        }
        (Type::Function(r1, a1), Type::Function(r2, a2)) => {
            a1.len() == a2.len()
                && subtype(arena, symtab, *r1, *r2)
                && a1
                    .iter()
                    .zip(a2.iter())
                    .all(|(x, y)| subtype(arena, symtab, *y, *x))
        }
        _ => false,
    }
}

/// Structural/nominal equality. Thanks to hash-consing this is simply
/// `TypeId` equality for every variant (classes compare nominally by
/// `DefId`, which is exactly what the arena interns on).
pub fn eq(a: TypeId, b: TypeId) -> bool {
    a == b
}

fn non_null_pivot(arena: &TypeArena, items: &[TypeId]) -> Option<Type> {
    items
        .iter()
        .map(|&t| arena.get(t).clone())
        .find(|t| *t != Type::Null)
}

/// Least upper bound of a non-empty list of types (§4.E). `Null` entries are
/// skipped when picking the representative ("pivot") type to recurse on.
pub fn join(arena: &mut TypeArena, symtab: &SymbolTable, items: &[TypeId]) -> TypeId {
    assert!(!items.is_empty(), "join() requires a non-empty type list");
    let pivot = match non_null_pivot(arena, items) {
        Some(p) => p,
        None => return arena.null_id(),
    };
    match pivot {
        Type::Error => arena.error_id(),
        Type::Int | Type::Bool | Type::String | Type::Void | Type::Array(_) => {
            let all_same = items
                .iter()
                .all(|&t| matches!(arena.get(t), Type::Null) || *arena.get(t) == pivot);
            if all_same {
                arena.intern(pivot)
            } else {
                arena.error_id()
            }
        }
        Type::Class(pivot_def) => {
            let mut cur = Some(pivot_def);
            while let Some(def) = cur {
                let candidate = arena.class(def);
                if items.iter().all(|&t| subtype(arena, symtab, t, candidate)) {
                    return candidate;
                }
                cur = symtab.class(def).base;
            }
            arena.error_id()
        }
        Type::Function(_, ref pivot_args) => {
            let funcs: Option<Vec<(TypeId, Vec<TypeId>)>> = items
                .iter()
                .filter(|&&t| !matches!(arena.get(t), Type::Null))
                .map(|&t| match arena.get(t).clone() {
                    Type::Function(r, a) => Some((r, a)),
                    _ => None,
                })
                .collect();
            let Some(funcs) = funcs else {
                return arena.error_id();
            };
            if funcs.iter().any(|(_, a)| a.len() != pivot_args.len()) {
                return arena.error_id();
            }
            let rets: Vec<TypeId> = funcs.iter().map(|(r, _)| *r).collect();
            let ret_join = join(arena, symtab, &rets);
            let mut meet_args = Vec::with_capacity(pivot_args.len());
            for i in 0..pivot_args.len() {
                let col: Vec<TypeId> = funcs.iter().map(|(_, a)| a[i]).collect();
                meet_args.push(meet(arena, symtab, &col));
            }
            arena.function(ret_join, meet_args)
        }
        Type::Null => unreachable!("non_null_pivot never returns Null"),
    }
}

/// Greatest lower bound of a non-empty list of types (§4.E). `Null` is a
/// lower bound of every class and of itself only, so any `Null` among
/// non-class types has no meet (`Error`); among classes the meet is `Null`.
pub fn meet(arena: &mut TypeArena, symtab: &SymbolTable, items: &[TypeId]) -> TypeId {
    assert!(!items.is_empty(), "meet() requires a non-empty type list");
    if items.iter().any(|&t| matches!(arena.get(t), Type::Null)) {
        let all_class_or_null = items
            .iter()
            .all(|&t| matches!(arena.get(t), Type::Null | Type::Class(_)));
        return if all_class_or_null {
            arena.null_id()
        } else {
            arena.error_id()
        };
    }
    let pivot = arena.get(items[0]).clone();
    match pivot {
        Type::Error => arena.error_id(),
        Type::Int | Type::Bool | Type::String | Type::Void | Type::Array(_) => {
            if items.iter().all(|&t| *arena.get(t) == pivot) {
                arena.intern(pivot)
            } else {
                arena.error_id()
            }
        }
        Type::Class(_) => {
            for &cand in items {
                if items.iter().all(|&t| subtype(arena, symtab, cand, t)) {
                    return cand;
                }
            }
            arena.error_id()
        }
        Type::Function(_, ref pivot_args) => {
            let funcs: Option<Vec<(TypeId, Vec<TypeId>)>> = items
                .iter()
                .map(|&t| match arena.get(t).clone() {
                    Type::Function(r, a) => Some((r, a)),
                    _ => None,
                })
                .collect();
            let Some(funcs) = funcs else {
                return arena.error_id();
            };
            if funcs.iter().any(|(_, a)| a.len() != pivot_args.len()) {
                return arena.error_id();
            }
            let rets: Vec<TypeId> = funcs.iter().map(|(r, _)| *r).collect();
            let ret_meet = meet(arena, symtab, &rets);
            let mut join_args = Vec::with_capacity(pivot_args.len());
            for i in 0..pivot_args.len() {
                let col: Vec<TypeId> = funcs.iter().map(|(_, a)| a[i]).collect();
                join_args.push(join(arena, symtab, &col));
            }
            arena.function(ret_meet, join_args)
        }
        Type::Null => unreachable!("filtered out above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{ClassSymbol, ScopeKind, SymbolTable};
    use decaf_util::Span;

    fn declare_class(
        symtab: &mut SymbolTable,
        arena: &mut TypeArena,
        name: &str,
        base: Option<DefId>,
    ) -> DefId {
        let scope = symtab.open_scope(ScopeKind::Class, base.map(|b| symtab.class(b).scope), None);
        let def = symtab.defs.alloc_class_placeholder();
        let ty = arena.class(def);
        symtab.defs.fill_class(
            def,
            ClassSymbol {
                name: decaf_util::Symbol::intern(name),
                span: Span::DUMMY,
                is_abstract: false,
                ty,
                scope,
                base,
                not_override: Default::default(),
                is_main: false,
                resolved: true,
            },
        );
        symtab.register_class(decaf_util::Symbol::intern(name), def);
        def
    }

    #[test]
    fn subtype_is_reflexive_and_transitive() {
        let mut arena = TypeArena::new();
        let mut symtab = SymbolTable::new();
        let a = declare_class(&mut symtab, &mut arena, "A", None);
        let b = declare_class(&mut symtab, &mut arena, "B", Some(a));
        let c = declare_class(&mut symtab, &mut arena, "C", Some(b));
        let ta = arena.class(a);
        let tb = arena.class(b);
        let tc = arena.class(c);
        assert!(subtype(&arena, &symtab, ta, ta));
        assert!(subtype(&arena, &symtab, tc, ta));
        assert!(subtype(&arena, &symtab, tb, ta));
        assert!(!subtype(&arena, &symtab, ta, tc));
    }

    #[test]
    fn error_absorbs_everything() {
        let mut arena = TypeArena::new();
        let symtab = SymbolTable::new();
        let int = arena.int_id();
        let err = arena.error_id();
        assert!(subtype(&arena, &symtab, int, err));
        assert!(subtype(&arena, &symtab, err, int));
    }

    #[test]
    fn null_is_subtype_of_class_only() {
        let mut arena = TypeArena::new();
        let mut symtab = SymbolTable::new();
        let a = declare_class(&mut symtab, &mut arena, "A", None);
        let ta = arena.class(a);
        let null = arena.null_id();
        let int = arena.int_id();
        assert!(subtype(&arena, &symtab, null, ta));
        assert!(!subtype(&arena, &symtab, null, int));
        assert!(!subtype(&arena, &symtab, int, null));
    }

    #[test]
    fn array_is_invariant() {
        let mut arena = TypeArena::new();
        let mut symtab = SymbolTable::new();
        let a = declare_class(&mut symtab, &mut arena, "A", None);
        let b = declare_class(&mut symtab, &mut arena, "B", Some(a));
        let ta = arena.class(a);
        let tb = arena.class(b);
        let arr_a = arena.array(ta);
        let arr_b = arena.array(tb);
        assert!(!subtype(&arena, &symtab, arr_b, arr_a));
        assert!(subtype(&arena, &symtab, arr_a, arr_a));
    }

    #[test]
    fn function_subtyping_is_contra_in_args_co_in_ret() {
        let mut arena = TypeArena::new();
        let mut symtab = SymbolTable::new();
        let a = declare_class(&mut symtab, &mut arena, "A", None);
        let b = declare_class(&mut symtab, &mut arena, "B", Some(a));
        let ta = arena.class(a);
        let tb = arena.class(b);
        // (A)->B <: (B)->A  since B<:A (arg contravariant) and B<:A (ret covariant)
        let narrow = arena.function(tb, vec![ta]);
        let wide = arena.function(ta, vec![tb]);
        assert!(subtype(&arena, &symtab, narrow, wide));
        assert!(!subtype(&arena, &symtab, wide, narrow));
    }

    #[test]
    fn join_of_equal_base_types_is_identity() {
        let mut arena = TypeArena::new();
        let symtab = SymbolTable::new();
        let int = arena.int_id();
        assert_eq!(join(&mut arena, &symtab, &[int, int]), int);
    }

    #[test]
    fn join_of_mismatched_base_types_is_error() {
        let mut arena = TypeArena::new();
        let symtab = SymbolTable::new();
        let int = arena.int_id();
        let b = arena.bool_id();
        assert_eq!(join(&mut arena, &symtab, &[int, b]), arena.error_id());
    }

    #[test]
    fn join_walks_up_to_common_ancestor() {
        let mut arena = TypeArena::new();
        let mut symtab = SymbolTable::new();
        let a = declare_class(&mut symtab, &mut arena, "A", None);
        let b = declare_class(&mut symtab, &mut arena, "B", Some(a));
        let c = declare_class(&mut symtab, &mut arena, "C", Some(a));
        let tb = arena.class(b);
        let tc = arena.class(c);
        let ta = arena.class(a);
        assert_eq!(join(&mut arena, &symtab, &[tb, tc]), ta);
    }

    #[test]
    fn meet_picks_deepest_common_subtype() {
        let mut arena = TypeArena::new();
        let mut symtab = SymbolTable::new();
        let a = declare_class(&mut symtab, &mut arena, "A", None);
        let b = declare_class(&mut symtab, &mut arena, "B", Some(a));
        let ta = arena.class(a);
        let tb = arena.class(b);
        assert_eq!(meet(&mut arena, &symtab, &[ta, tb]), tb);
    }

    #[test]
    fn all_null_join_is_null() {
        let mut arena = TypeArena::new();
        let symtab = SymbolTable::new();
        let null = arena.null_id();
        assert_eq!(join(&mut arena, &symtab, &[null, null]), null);
    }
}
