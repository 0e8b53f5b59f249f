use std::sync::Arc;

use crate::stmt::Stmt;
use crate::types::Var;

/// Function record handed between lowering passes.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimFunc {
    pub name: String,
    pub params: Vec<Var>,
    pub body: Arc<Stmt>,
}

impl PrimFunc {
    pub fn new(name: impl Into<String>, params: Vec<Var>, body: Arc<Stmt>) -> Self {
        Self { name: name.into(), params, body }
    }

    /// New record with a replaced body; every other field is copied.
    pub fn with_body(&self, body: Arc<Stmt>) -> Self {
        Self { name: self.name.clone(), params: self.params.clone(), body }
    }
}
