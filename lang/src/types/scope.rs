use rustc_hash::FxHashMap;

use super::ty::Ty;
use crate::lexer::Token;

/// A declaration record in the symbol table
#[derive(Debug, Clone)]
pub enum DeclRecord {
    /// A named type; the primitives are pre-seeded into the outermost scope
    Type { ty: Ty },
    Var {
        ty: Ty,
        initialized: bool,
        declared_at: Token,
        /// Character offset of the declaring `let` token, used to
        /// back-patch the inferred type into the declaration node
        let_index: Option<usize>,
    },
    Fn {
        return_ty: Ty,
        param_tys: Vec<Ty>,
        declared_at: Token,
    },
}

impl DeclRecord {
    /// The declaring token, when the record originates from source
    pub fn declared_at(&self) -> Option<&Token> {
        match self {
            DeclRecord::Type { .. } => None,
            DeclRecord::Var { declared_at, .. } | DeclRecord::Fn { declared_at, .. } => {
                Some(declared_at)
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct Scope {
    declared: FxHashMap<String, DeclRecord>,
}

/// The scope stack. Lookup walks from the innermost scope outward;
/// names are unique within a scope but may shadow outer bindings.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn end(&mut self) {
        self.scopes.pop();
    }

    pub fn declare(&mut self, name: impl Into<String>, record: DeclRecord) {
        if let Some(top) = self.scopes.last_mut() {
            top.declared.insert(name.into(), record);
        }
    }

    /// The nearest binding for the name, innermost scope first
    pub fn lookup(&self, name: &str) -> Option<&DeclRecord> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.declared.get(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut DeclRecord> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.declared.get_mut(name))
    }

    /// A binding in the innermost scope only; used for redeclaration checks
    pub fn declared_in_top(&self, name: &str) -> Option<&DeclRecord> {
        self.scopes
            .last()
            .and_then(|scope| scope.declared.get(name))
    }
}
