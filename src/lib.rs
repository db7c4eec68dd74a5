//! Keel - static type checker for transaction predicate scripts
//!
//! Takes the untyped tree produced by the parser and a [`Context`] describing
//! host-defined types, pre-bound variables and native functions, and returns
//! the same tree with every node annotated with its type, or the first type
//! error found.

pub mod ast;
pub mod checker;
pub mod context;
pub mod errors;
pub mod tast;
pub mod test_support;
pub mod types;
pub mod unify;

use std::panic::{self, AssertUnwindSafe};

pub use ast::{BinOp, Expr, Literal};
pub use checker::{Checker, CheckerConfig};
pub use context::Context;
pub use errors::CheckError;
pub use tast::{TypedExpr, TypedExprKind};
pub use types::{FunctionSig, PredefType, SigType, Type, TypeParam};

/// Type-check `expr` with the default configuration
pub fn check(ctx: &Context, expr: &Expr) -> Result<TypedExpr, CheckError> {
    check_with_config(&CheckerConfig::default(), ctx, expr)
}

/// Type-check `expr`. A panic inside the checker is reported as
/// [`CheckError::Internal`] rather than unwinding into the caller.
///
/// The span records the script once it is accepted; only then is its
/// nesting known to be within `max_depth`.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(max_depth = config.max_depth, expr = tracing::field::Empty)
)]
pub fn check_with_config(
    config: &CheckerConfig,
    ctx: &Context,
    expr: &Expr,
) -> Result<TypedExpr, CheckError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        Checker::new(config.clone()).check_expr(ctx, expr)
    }));
    let result = outcome.unwrap_or_else(|payload| {
        Err(CheckError::Internal {
            message: panic_message(payload.as_ref()),
        })
    });
    match &result {
        Ok(typed) => {
            tracing::Span::current().record("expr", tracing::field::display(expr));
            tracing::debug!(ty = %typed.ty, "script accepted");
        }
        Err(err) => tracing::debug!(error = %err, "script rejected"),
    }
    result
}

/// Same as [`check`], with the error flattened to its diagnostic message
pub fn check_to_string(ctx: &Context, expr: &Expr) -> Result<TypedExpr, String> {
    check(ctx, expr).map_err(|err| err.to_string())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
