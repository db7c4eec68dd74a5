//! Typing context: predefined types, variables in scope, native functions
//!
//! A context is never mutated once the checker sees it. Entering a `let`
//! scope produces a new context that shares everything with its parent and
//! adds one binding frame on top.

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{FunctionSig, PredefType, Type};

/// One variable binding, linked to the bindings of the enclosing scope
#[derive(Debug)]
struct Frame {
    name: String,
    ty: Type,
    parent: Option<Arc<Frame>>,
}

#[derive(Debug, Clone, Default)]
pub struct Context {
    predefs: Arc<HashMap<String, PredefType>>,
    functions: Arc<HashMap<String, FunctionSig>>,
    vars: Option<Arc<Frame>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a predefined structured type
    pub fn with_type(mut self, predef: PredefType) -> Self {
        Arc::make_mut(&mut self.predefs).insert(predef.name.clone(), predef);
        self
    }

    /// Pre-bind a host variable
    pub fn with_var(self, name: impl Into<String>, ty: Type) -> Self {
        self.extend(name, ty)
    }

    /// Register a native function signature
    pub fn with_function(mut self, name: impl Into<String>, sig: FunctionSig) -> Self {
        Arc::make_mut(&mut self.functions).insert(name.into(), sig);
        self
    }

    /// A child context with one more variable binding. The parent is untouched.
    pub fn extend(&self, name: impl Into<String>, ty: Type) -> Context {
        Context {
            predefs: Arc::clone(&self.predefs),
            functions: Arc::clone(&self.functions),
            vars: Some(Arc::new(Frame {
                name: name.into(),
                ty,
                parent: self.vars.clone(),
            })),
        }
    }

    pub fn predef(&self, name: &str) -> Option<&PredefType> {
        self.predefs.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionSig> {
        self.functions.get(name)
    }

    /// Innermost binding of `name`
    pub fn var(&self, name: &str) -> Option<&Type> {
        self.frames().find(|frame| frame.name == name).map(|frame| &frame.ty)
    }

    pub fn has_var(&self, name: &str) -> bool {
        self.var(name).is_some()
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn predef_names(&self) -> impl Iterator<Item = &str> {
        self.predefs.keys().map(String::as_str)
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Variable names, innermost scope first
    pub fn var_names(&self) -> impl Iterator<Item = &str> {
        self.frames().map(|frame| frame.name.as_str())
    }

    fn frames(&self) -> impl Iterator<Item = &Frame> {
        std::iter::successors(self.vars.as_deref(), |frame| frame.parent.as_deref())
    }
}
