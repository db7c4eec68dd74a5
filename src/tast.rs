//! Typed Abstract Syntax Tree (TAST)
//!
//! Same shape as [`crate::ast::Expr`], but every node carries its resolved,
//! concrete type. This is what the evaluator consumes.

use std::fmt;

use crate::ast::{BinOp, Ident, Literal};
use crate::types::Type;

/// A typed expression with resolved type information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedExpr {
    pub kind: TypedExprKind,
    pub ty: Type,
}

impl TypedExpr {
    pub fn new(kind: TypedExprKind, ty: Type) -> Self {
        TypedExpr { kind, ty }
    }

    /// Pre-order walk over this node and all of its descendants
    pub fn visit<F: FnMut(&TypedExpr)>(&self, f: &mut F) {
        f(self);
        match &self.kind {
            TypedExprKind::Lit(_) | TypedExprKind::Ref(_) => {}
            TypedExprKind::Getter { target, .. } => target.visit(f),
            TypedExprKind::Call { args, .. } => {
                for arg in args {
                    arg.visit(f);
                }
            }
            TypedExprKind::BinOp { left, right, .. } => {
                left.visit(f);
                right.visit(f);
            }
            TypedExprKind::Block { binding, body } => {
                if let Some(binding) = binding {
                    binding.value.visit(f);
                }
                body.visit(f);
            }
            TypedExprKind::If {
                cond,
                if_true,
                if_false,
            } => {
                cond.visit(f);
                if_true.visit(f);
                if_false.visit(f);
            }
        }
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |_| count += 1);
        count
    }
}

/// Typed let binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedLet {
    pub name: Ident,
    pub value: Box<TypedExpr>,
}

/// Typed expression kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedExprKind {
    Lit(Literal),

    Getter {
        target: Box<TypedExpr>,
        field: Ident,
    },

    /// Native function call, result type already substituted
    Call {
        name: Ident,
        args: Vec<TypedExpr>,
    },

    BinOp {
        left: Box<TypedExpr>,
        op: BinOp,
        right: Box<TypedExpr>,
    },

    Block {
        binding: Option<TypedLet>,
        body: Box<TypedExpr>,
    },

    If {
        cond: Box<TypedExpr>,
        if_true: Box<TypedExpr>,
        if_false: Box<TypedExpr>,
    },

    Ref(Ident),
}

/// Like the untyped rendering, with `: TYPE` after each node
impl fmt::Display for TypedExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypedExprKind::Lit(lit) => write!(f, "{}", lit)?,
            TypedExprKind::Getter { target, field } => write!(f, "{}.{}", target, field)?,
            TypedExprKind::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")?;
            }
            TypedExprKind::BinOp { left, op, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)?
            }
            TypedExprKind::Block { binding, body } => match binding {
                Some(TypedLet { name, value }) => {
                    write!(f, "{{ let {} = {}; {} }}", name, value, body)?
                }
                None => write!(f, "{{ {} }}", body)?,
            },
            TypedExprKind::If {
                cond,
                if_true,
                if_false,
            } => write!(f, "if ({}) then {} else {}", cond, if_true, if_false)?,
            TypedExprKind::Ref(name) => write!(f, "{}", name)?,
        }
        write!(f, ": {}", self.ty)
    }
}
