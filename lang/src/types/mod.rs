mod infer;
mod scope;
mod ty;


pub use infer::analyze;
pub use scope::{DeclRecord, Scope, ScopeStack};
pub use ty::Ty;
