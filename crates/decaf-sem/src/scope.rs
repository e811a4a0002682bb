//! Symbol and scope model (§4.B/§4.C): a `DefTable` mapping `DefId` to
//! symbol data, and a `ScopeStack` of `ScopeData` nodes chained by a single
//! `parent` pointer that serves double duty as lexical nesting *and*
//! superclass member lookup.

use decaf_util::{DefId, DefIdGenerator, FxHashMap, IndexVec, ScopeId, Span, Symbol, TypeId};
use indexmap::IndexMap;

/// What a scope is for; drives which lookup rules apply inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Class,
    Formal,
    Local,
    Lambda,
}

pub struct ScopeData {
    pub kind: ScopeKind,
    /// For `Class` scopes: the superclass's scope, so member lookup falls
    /// through the inheritance chain. For `Local`/`Formal`/`Lambda` scopes:
    /// the lexically enclosing scope. `None` at the roots.
    pub parent: Option<ScopeId>,
    pub owner: Option<DefId>,
    pub symbols: IndexMap<Symbol, DefId>,
}

impl ScopeData {
    fn new(kind: ScopeKind, parent: Option<ScopeId>, owner: Option<DefId>) -> Self {
        ScopeData {
            kind,
            parent,
            owner,
            symbols: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassSymbol {
    pub name: Symbol,
    pub span: Span,
    pub is_abstract: bool,
    pub ty: TypeId,
    pub scope: ScopeId,
    pub base: Option<DefId>,
    /// Methods declared directly on this class that are *not* overrides of
    /// anything inherited (used by the abstract-method resolution pass to
    /// tell "newly introduced abstract method" apart from "still abstract
    /// because the override never arrived").
    pub not_override: FxHashMap<Symbol, DefId>,
    pub is_main: bool,
    /// False while the class is mid-resolution (cycle sentinel).
    pub resolved: bool,
}

#[derive(Debug, Clone)]
pub struct MethodSymbol {
    pub name: Symbol,
    pub span: Span,
    pub owner: DefId,
    pub is_static: bool,
    pub is_abstract: bool,
    pub ty: TypeId,
    pub scope: ScopeId,
    pub overrides: Option<DefId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Field,
    Formal,
    Local,
}

#[derive(Debug, Clone)]
pub struct VarSymbol {
    pub name: Symbol,
    pub span: Span,
    pub kind: VarKind,
    pub ty: TypeId,
    pub owner: Option<DefId>,
}

#[derive(Debug, Clone)]
pub struct LambdaSymbol {
    pub span: Span,
    pub ty: TypeId,
    pub scope: ScopeId,
    pub captures: Vec<DefId>,
}

pub enum SymbolData {
    Class(ClassSymbol),
    Method(MethodSymbol),
    Var(VarSymbol),
    Lambda(LambdaSymbol),
    /// Placeholder installed while a class is still being resolved, so
    /// self-referential fields (`class A { A a; }`) get a real `DefId`
    /// before the class's own symbol is complete.
    Placeholder,
}

pub struct DefTable {
    gen: DefIdGenerator,
    data: IndexVec<DefId, SymbolData>,
}

impl DefTable {
    pub fn new() -> Self {
        DefTable {
            gen: DefIdGenerator::new(),
            data: IndexVec::new(),
        }
    }

    pub fn alloc_class_placeholder(&mut self) -> DefId {
        let id = self.gen.next();
        let pushed = self.data.push(SymbolData::Placeholder);
        debug_assert_eq!(id, pushed);
        id
    }

    pub fn fill_class(&mut self, id: DefId, sym: ClassSymbol) {
        self.data[id] = SymbolData::Class(sym);
    }

    pub fn declare_method(&mut self, sym: MethodSymbol) -> DefId {
        let id = self.gen.next();
        let pushed = self.data.push(SymbolData::Method(sym));
        debug_assert_eq!(id, pushed);
        id
    }

    pub fn declare_var(&mut self, sym: VarSymbol) -> DefId {
        let id = self.gen.next();
        let pushed = self.data.push(SymbolData::Var(sym));
        debug_assert_eq!(id, pushed);
        id
    }

    pub fn declare_lambda(&mut self, sym: LambdaSymbol) -> DefId {
        let id = self.gen.next();
        let pushed = self.data.push(SymbolData::Lambda(sym));
        debug_assert_eq!(id, pushed);
        id
    }

    pub fn get(&self, id: DefId) -> &SymbolData {
        &self.data[id]
    }

    pub fn get_mut(&mut self, id: DefId) -> &mut SymbolData {
        &mut self.data[id]
    }

    pub fn class(&self, id: DefId) -> &ClassSymbol {
        match &self.data[id] {
            SymbolData::Class(c) => c,
            _ => panic!("DefId {:?} is not a class symbol", id),
        }
    }

    pub fn method(&self, id: DefId) -> &MethodSymbol {
        match &self.data[id] {
            SymbolData::Method(m) => m,
            _ => panic!("DefId {:?} is not a method symbol", id),
        }
    }

    pub fn var(&self, id: DefId) -> &VarSymbol {
        match &self.data[id] {
            SymbolData::Var(v) => v,
            _ => panic!("DefId {:?} is not a var symbol", id),
        }
    }

    pub fn lambda(&self, id: DefId) -> &LambdaSymbol {
        match &self.data[id] {
            SymbolData::Lambda(l) => l,
            _ => panic!("DefId {:?} is not a lambda symbol", id),
        }
    }

    pub fn lambda_mut(&mut self, id: DefId) -> &mut LambdaSymbol {
        match &mut self.data[id] {
            SymbolData::Lambda(l) => l,
            _ => panic!("DefId {:?} is not a lambda symbol", id),
        }
    }
}

impl Default for DefTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns every scope and def in an analysis run, plus the class-name ->
/// DefId map used to resolve `TypeLit::Class` references.
pub struct SymbolTable {
    pub scopes: IndexVec<ScopeId, ScopeData>,
    pub defs: DefTable,
    pub classes: FxHashMap<Symbol, DefId>,
    pub global: ScopeId,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut scopes = IndexVec::new();
        let global = scopes.push(ScopeData::new(ScopeKind::Global, None, None));
        SymbolTable {
            scopes,
            defs: DefTable::new(),
            classes: FxHashMap::default(),
            global,
        }
    }

    pub fn open_scope(
        &mut self,
        kind: ScopeKind,
        parent: Option<ScopeId>,
        owner: Option<DefId>,
    ) -> ScopeId {
        self.scopes.push(ScopeData::new(kind, parent, owner))
    }

    pub fn scope(&self, id: ScopeId) -> &ScopeData {
        &self.scopes[id]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut ScopeData {
        &mut self.scopes[id]
    }

    pub fn class(&self, id: DefId) -> &ClassSymbol {
        self.defs.class(id)
    }

    pub fn register_class(&mut self, name: Symbol, def: DefId) {
        self.classes.insert(name, def);
    }

    pub fn lookup_class(&self, name: Symbol) -> Option<DefId> {
        self.classes.get(&name).copied()
    }

    /// Declare `name -> def` directly in `scope`, without any shadowing
    /// check (callers run `find_conflict` first).
    pub fn declare_in(&mut self, scope: ScopeId, name: Symbol, def: DefId) {
        self.scopes[scope].symbols.insert(name, def);
    }

    /// Plain lookup walking `parent` all the way to the root. Used once a
    /// class's inheritance chain and a statement's enclosing blocks are
    /// both already in place (Typer's VarSel/identifier resolution).
    pub fn lookup(&self, scope: ScopeId, name: Symbol) -> Option<DefId> {
        self.lookup_with_scope(scope, name).map(|(def, _)| def)
    }

    /// Like [`Self::lookup`] but also returns the scope the binding was
    /// found in, so callers (capture analysis) can tell how far outside the
    /// reference point the definition lives.
    pub fn lookup_with_scope(&self, scope: ScopeId, name: Symbol) -> Option<(DefId, ScopeId)> {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            let data = &self.scopes[id];
            if let Some(&def) = data.symbols.get(&name) {
                return Some((def, id));
            }
            cur = data.parent;
        }
        None
    }

    /// Forward-reference-safe lookup used by the Namer while processing a
    /// local var's own initializer: looks in every *enclosing* scope, but
    /// never in `scope` itself, so `var x = x + 1;` cannot see the `x`
    /// it is itself declaring.
    pub fn lookup_before(&self, scope: ScopeId, name: Symbol) -> Option<DefId> {
        let start = self.scopes[scope].parent;
        let mut cur = start;
        while let Some(id) = cur {
            let data = &self.scopes[id];
            if let Some(&def) = data.symbols.get(&name) {
                return Some(def);
            }
            cur = data.parent;
        }
        None
    }

    /// Decides whether declaring `name` in `scope` conflicts with an
    /// existing binding, distinguishing a same-scope redeclaration
    /// (`DeclConflict`) from shadowing an inherited class member
    /// (`OverridingVar`, only meaningful for fields/locals, not methods).
    ///
    /// Only `Class` ancestor scopes are checked past `scope` itself: a local
    /// shadowing an outer block's plain local/formal is ordinary lexical
    /// shadowing and never reported, but shadowing an inherited class
    /// member is.
    pub fn find_conflict(&self, scope: ScopeId, name: Symbol) -> Option<Conflict> {
        if let Some(&def) = self.scopes[scope].symbols.get(&name) {
            return Some(Conflict::SameScope(def));
        }
        let mut cur = self.scopes[scope].parent;
        while let Some(id) = cur {
            let data = &self.scopes[id];
            if data.kind == ScopeKind::Class {
                if let Some(&def) = data.symbols.get(&name) {
                    return Some(Conflict::Inherited(def));
                }
            }
            cur = data.parent;
        }
        None
    }

    /// Walks outward from `scope` to find the nearest enclosing `Class`
    /// scope's owning class, if any.
    pub fn current_class(&self, scope: ScopeId) -> Option<DefId> {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            let data = &self.scopes[id];
            if data.kind == ScopeKind::Class {
                return data.owner;
            }
            cur = data.parent;
        }
        None
    }

    /// Walks outward from `scope` to find the nearest enclosing method's
    /// `Formal` scope owner.
    pub fn current_method(&self, scope: ScopeId) -> Option<DefId> {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            let data = &self.scopes[id];
            if data.kind == ScopeKind::Formal {
                return data.owner;
            }
            cur = data.parent;
        }
        None
    }

    /// Nearest enclosing `Lambda` scope, stopping if a `Formal` scope
    /// (a method boundary) is reached first.
    pub fn enclosing_lambda(&self, scope: ScopeId) -> Option<ScopeId> {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            let data = &self.scopes[id];
            match data.kind {
                ScopeKind::Lambda => return Some(id),
                ScopeKind::Formal => return None,
                _ => {}
            }
            cur = data.parent;
        }
        None
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

pub enum Conflict {
    SameScope(DefId),
    Inherited(DefId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use decaf_util::Idx;

    #[test]
    fn lookup_before_skips_own_scope() {
        let mut symtab = SymbolTable::new();
        let outer = symtab.open_scope(ScopeKind::Local, Some(symtab.global), None);
        let inner = symtab.open_scope(ScopeKind::Local, Some(outer), None);
        let x = Symbol::intern("x");
        let outer_def = symtab.defs.declare_var(VarSymbol {
            name: x,
            span: Span::DUMMY,
            kind: VarKind::Local,
            ty: TypeId::from_usize(0),
            owner: None,
        });
        symtab.declare_in(outer, x, outer_def);
        let inner_def = symtab.defs.declare_var(VarSymbol {
            name: x,
            span: Span::DUMMY,
            kind: VarKind::Local,
            ty: TypeId::from_usize(0),
            owner: None,
        });
        symtab.declare_in(inner, x, inner_def);
        // lookup_before from `inner` must not see inner's own `x`.
        assert_eq!(symtab.lookup_before(inner, x), Some(outer_def));
    }

    #[test]
    fn find_conflict_distinguishes_same_scope_from_inherited() {
        let mut symtab = SymbolTable::new();
        let outer = symtab.open_scope(ScopeKind::Class, Some(symtab.global), None);
        let inner = symtab.open_scope(ScopeKind::Local, Some(outer), None);
        let x = Symbol::intern("x");
        let outer_def = symtab.defs.declare_var(VarSymbol {
            name: x,
            span: Span::DUMMY,
            kind: VarKind::Field,
            ty: TypeId::from_usize(0),
            owner: None,
        });
        symtab.declare_in(outer, x, outer_def);
        assert!(matches!(
            symtab.find_conflict(inner, x),
            Some(Conflict::Inherited(_))
        ));
        let inner_def = symtab.defs.declare_var(VarSymbol {
            name: x,
            span: Span::DUMMY,
            kind: VarKind::Local,
            ty: TypeId::from_usize(0),
            owner: None,
        });
        symtab.declare_in(inner, x, inner_def);
        assert!(matches!(
            symtab.find_conflict(inner, x),
            Some(Conflict::SameScope(_))
        ));
    }
}
