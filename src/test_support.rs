//! Test support: a representative host context and checking shorthands.
//!
//! The fixture mirrors what a node hands the checker when validating a
//! transfer script: a `Transaction` record bound to `tx`, the chain
//! `height`, and a handful of native functions, some of them generic.

use crate::ast::Expr;
use crate::checker::{Checker, CheckerConfig};
use crate::context::Context;
use crate::errors::CheckError;
use crate::tast::TypedExpr;
use crate::types::{FunctionSig, PredefType, SigType, Type};

// ============================================================================
// Fixture Context
// ============================================================================

/// Context with the transaction record, chain variables and natives
pub fn sample_context() -> Context {
    let bytes = || SigType::from(Type::ByteVector);
    let t = || SigType::param('T');

    Context::new()
        .with_type(PredefType::new(
            "Transaction",
            vec![
                ("type", Type::Long),
                ("id", Type::ByteVector),
                ("fee", Type::Long),
                ("amount", Type::Long),
                ("timestamp", Type::Long),
                ("bodyBytes", Type::ByteVector),
                ("senderPk", Type::ByteVector),
                ("proof0", Type::ByteVector),
                ("attachment", Type::String),
                ("recipient", Type::type_ref("Address")),
            ],
        ))
        .with_type(PredefType::new(
            "Address",
            vec![("bytes", Type::ByteVector), ("chainId", Type::Long)],
        ))
        .with_var("height", Type::Long)
        .with_var("tx", Type::type_ref("Transaction"))
        .with_function(
            "sigVerify",
            FunctionSig::new(vec![bytes(), bytes(), bytes()], Type::Boolean),
        )
        .with_function("size", FunctionSig::new(vec![bytes()], Type::Long))
        .with_function("id", FunctionSig::new(vec![t()], t()))
        .with_function("choose", FunctionSig::new(vec![t(), t()], t()))
        .with_function(
            "first",
            FunctionSig::new(vec![SigType::param('A'), SigType::param('B')], SigType::param('A')),
        )
        .with_function("isDefined", FunctionSig::new(vec![t()], Type::Boolean))
        .with_function("pick", FunctionSig::new(vec![Type::Long.into()], SigType::param('R')))
}

// ============================================================================
// Checking Shorthands
// ============================================================================

/// Check against [`sample_context`]
pub fn typecheck(expr: &Expr) -> Result<TypedExpr, CheckError> {
    crate::check(&sample_context(), expr)
}

/// Check against [`sample_context`], keeping only the root type
pub fn typecheck_type(expr: &Expr) -> Result<Type, CheckError> {
    typecheck(expr).map(|typed| typed.ty)
}

/// Check with a custom nesting limit, bypassing the panic guard
pub fn typecheck_with_depth(expr: &Expr, max_depth: usize) -> Result<TypedExpr, CheckError> {
    let mut checker = Checker::new(CheckerConfig::new().with_max_depth(max_depth));
    checker.check_expr(&sample_context(), expr)
}

// ============================================================================
// Tree Builders
// ============================================================================

/// `depth` nested `+` nodes over long constants, left-leaning
pub fn nested_sum(depth: usize) -> Expr {
    (0..depth).fold(Expr::long(0), |acc, i| {
        Expr::binary(acc, crate::ast::BinOp::Sum, Expr::long(i as i64))
    })
}

/// `let v0 = 0; let v1 = 0; ... body` with `count` bindings
pub fn nested_lets(count: usize, body: Expr) -> Expr {
    (0..count)
        .rev()
        .fold(body, |acc, i| Expr::let_in(format!("v{}", i), Expr::long(0), acc))
}

// ============================================================================
// Typed Tree Assertions
// ============================================================================

/// Every `TypeRef` in the typed tree names a type known to `ctx`.
/// Returns the first offending type name.
pub fn unknown_type_refs(typed: &TypedExpr, ctx: &Context) -> Option<String> {
    let mut missing = None;
    typed.visit(&mut |node| {
        if let Type::TypeRef(name) = &node.ty {
            if missing.is_none() && ctx.predef(name).is_none() {
                missing = Some(name.clone());
            }
        }
    });
    missing
}
