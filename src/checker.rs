//! Single-pass type checker
//!
//! Walks the untyped tree depth-first, left to right, threading the context
//! explicitly and building the typed tree bottom-up. The first error stops
//! the walk.

use crate::ast::{BinOp, Expr, Let, Literal};
use crate::context::Context;
use crate::errors::{find_similar, BindingKind, CheckError, CommonTypeSite, Side};
use crate::tast::{TypedExpr, TypedExprKind, TypedLet};
use crate::types::{FunctionSig, Type};
use crate::unify::{common_type, unify, UnifyError};

/// Maximum edit distance for "did you mean?" hints
const SUGGESTION_DISTANCE: usize = 2;

/// Tunables for a checker run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerConfig {
    /// Deepest expression nesting accepted before giving up
    pub max_depth: usize,
}

impl CheckerConfig {
    /// Checking a tree this deep stays well inside a 2 MiB thread stack,
    /// unoptimized builds included.
    pub const DEFAULT_MAX_DEPTH: usize = 100;

    pub fn new() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Checker {
    config: CheckerConfig,
    /// Current nesting depth
    depth: usize,
}

// One nesting level costs the frames of `check_expr` plus one rule method.
// The rule methods are kept out of line, and anything that formats or logs
// lives in a non-recursive helper, so those frames stay small.
impl Checker {
    pub fn new(config: CheckerConfig) -> Self {
        Self { config, depth: 0 }
    }

    /// Type `expr` in `ctx`
    pub fn check_expr(&mut self, ctx: &Context, expr: &Expr) -> Result<TypedExpr, CheckError> {
        if self.depth >= self.config.max_depth {
            return Err(CheckError::DepthLimitExceeded {
                limit: self.config.max_depth,
            });
        }
        self.depth += 1;
        let result = match expr {
            Expr::Lit(lit) => Ok(literal(lit)),
            Expr::Getter { target, field } => self.check_getter(ctx, target, field),
            Expr::Call { name, args } => self.check_call(ctx, name, args),
            Expr::BinOp { left, op, right } => self.check_binop(ctx, left, *op, right),
            Expr::Block { binding, body } => self.check_block(ctx, binding.as_ref(), body),
            Expr::If {
                cond,
                if_true,
                if_false,
            } => self.check_if(ctx, cond, if_true, if_false),
            Expr::Ref(name) => reference(ctx, name),
        };
        self.depth -= 1;
        result
    }

    #[inline(never)]
    fn check_getter(
        &mut self,
        ctx: &Context,
        target: &Expr,
        field: &str,
    ) -> Result<TypedExpr, CheckError> {
        let target = self.check_expr(ctx, target)?;
        let ty = field_type(ctx, &target.ty, field)?;
        Ok(TypedExpr::new(
            TypedExprKind::Getter {
                target: Box::new(target),
                field: field.to_string(),
            },
            ty,
        ))
    }

    #[inline(never)]
    fn check_call(
        &mut self,
        ctx: &Context,
        name: &str,
        args: &[Expr],
    ) -> Result<TypedExpr, CheckError> {
        let sig = ctx
            .function(name)
            .ok_or_else(|| CheckError::UndefinedFunction {
                name: name.to_string(),
                suggestions: find_similar(name, ctx.function_names(), SUGGESTION_DISTANCE),
            })?;
        if sig.arity() != args.len() {
            return Err(CheckError::ArityMismatch {
                name: name.to_string(),
                expected: sig.arity(),
                found: args.len(),
            });
        }
        let typed_args = args
            .iter()
            .map(|arg| self.check_expr(ctx, arg))
            .collect::<Result<Vec<_>, _>>()?;
        let ty = call_result(ctx, name, sig, &typed_args)?;
        Ok(TypedExpr::new(
            TypedExprKind::Call {
                name: name.to_string(),
                args: typed_args,
            },
            ty,
        ))
    }

    #[inline(never)]
    fn check_binop(
        &mut self,
        ctx: &Context,
        left: &Expr,
        op: BinOp,
        right: &Expr,
    ) -> Result<TypedExpr, CheckError> {
        let left = self.check_expr(ctx, left)?;
        let right = self.check_expr(ctx, right)?;
        let ty = binop_type(op, &left.ty, &right.ty)?;
        Ok(TypedExpr::new(
            TypedExprKind::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            ty,
        ))
    }

    #[inline(never)]
    fn check_block(
        &mut self,
        ctx: &Context,
        binding: Option<&Let>,
        body: &Expr,
    ) -> Result<TypedExpr, CheckError> {
        let Some(Let { name, value }) = binding else {
            let body = self.check_expr(ctx, body)?;
            let ty = body.ty.clone();
            return Ok(TypedExpr::new(
                TypedExprKind::Block {
                    binding: None,
                    body: Box::new(body),
                },
                ty,
            ));
        };
        check_fresh_name(ctx, name)?;
        let value = self.check_expr(ctx, value)?;
        // The child scope lives only for the body
        let inner = bind(ctx, name, &value.ty);
        let body = self.check_expr(&inner, body)?;
        let ty = body.ty.clone();
        Ok(TypedExpr::new(
            TypedExprKind::Block {
                binding: Some(TypedLet {
                    name: name.clone(),
                    value: Box::new(value),
                }),
                body: Box::new(body),
            },
            ty,
        ))
    }

    #[inline(never)]
    fn check_if(
        &mut self,
        ctx: &Context,
        cond: &Expr,
        if_true: &Expr,
        if_false: &Expr,
    ) -> Result<TypedExpr, CheckError> {
        let cond = self.check_expr(ctx, cond)?;
        let if_true = self.check_expr(ctx, if_true)?;
        let if_false = self.check_expr(ctx, if_false)?;
        let ty = if_type(&cond.ty, &if_true.ty, &if_false.ty)?;
        Ok(TypedExpr::new(
            TypedExprKind::If {
                cond: Box::new(cond),
                if_true: Box::new(if_true),
                if_false: Box::new(if_false),
            },
            ty,
        ))
    }
}

fn literal(lit: &Literal) -> TypedExpr {
    let ty = match lit {
        Literal::Long(_) => Type::Long,
        Literal::ByteVector(_) => Type::ByteVector,
        Literal::Str(_) => Type::String,
        Literal::Bool(_) => Type::Boolean,
    };
    TypedExpr::new(TypedExprKind::Lit(lit.clone()), ty)
}

#[inline(never)]
fn reference(ctx: &Context, name: &str) -> Result<TypedExpr, CheckError> {
    let ty = ctx.var(name).ok_or_else(|| CheckError::UndefinedReference {
        name: name.to_string(),
        suggestions: find_similar(name, ctx.var_names(), SUGGESTION_DISTANCE),
    })?;
    let ty = known_type(ctx, ty)?;
    Ok(TypedExpr::new(TypedExprKind::Ref(name.to_string()), ty))
}

/// `ty`, provided any type it names is registered in `ctx`
fn known_type(ctx: &Context, ty: &Type) -> Result<Type, CheckError> {
    match ty {
        Type::TypeRef(name) if ctx.predef(name).is_none() => Err(undefined_type(ctx, name)),
        _ => Ok(ty.clone()),
    }
}

fn undefined_type(ctx: &Context, name: &str) -> CheckError {
    CheckError::UndefinedType {
        name: name.to_string(),
        suggestions: find_similar(name, ctx.predef_names(), SUGGESTION_DISTANCE),
    }
}

/// Type of `field` on a value of type `ty`
#[inline(never)]
fn field_type(ctx: &Context, ty: &Type, field: &str) -> Result<Type, CheckError> {
    let Type::TypeRef(type_name) = ty else {
        return Err(CheckError::FieldOfPrimitive {
            ty: ty.clone(),
            field: field.to_string(),
        });
    };
    let predef = ctx
        .predef(type_name)
        .ok_or_else(|| undefined_type(ctx, type_name))?;
    let field_ty = predef
        .field(field)
        .ok_or_else(|| CheckError::UndefinedField {
            type_name: type_name.clone(),
            field: field.to_string(),
            suggestions: find_similar(field, predef.field_names(), SUGGESTION_DISTANCE),
        })?;
    known_type(ctx, field_ty)
}

/// Instantiate `sig` against the typed arguments and return its result type
#[inline(never)]
fn call_result(
    ctx: &Context,
    name: &str,
    sig: &FunctionSig,
    args: &[TypedExpr],
) -> Result<Type, CheckError> {
    let with_name = |err| call_error(name, err);
    let subst = unify(args.iter().map(|arg| &arg.ty).zip(sig.params.iter())).map_err(with_name)?;
    let ty = subst.resolve(&sig.result).map_err(with_name)?;
    if !subst.is_empty() {
        tracing::debug!(
            func = %name,
            type_args = ?subst.iter().map(|(p, t)| format!("{}={}", p, t)).collect::<Vec<_>>(),
            result = %ty,
            "generic instantiation"
        );
    }
    known_type(ctx, &ty)
}

/// A `let` may not reuse a name already bound as a variable or a function
#[inline(never)]
fn check_fresh_name(ctx: &Context, name: &str) -> Result<(), CheckError> {
    let kind = if ctx.has_var(name) {
        BindingKind::Variable
    } else if ctx.has_function(name) {
        BindingKind::Function
    } else {
        return Ok(());
    };
    Err(CheckError::DuplicateBinding {
        name: name.to_string(),
        kind,
    })
}

#[inline(never)]
fn bind(ctx: &Context, name: &str, ty: &Type) -> Context {
    tracing::debug!(binding = %name, ty = %ty, "let binding");
    ctx.extend(name, ty.clone())
}

/// Result type of an `IF`: the common type of its branches
#[inline(never)]
fn if_type(cond: &Type, if_true: &Type, if_false: &Type) -> Result<Type, CheckError> {
    if *cond != Type::Boolean {
        // Accepted as is; the condition is not constrained
        tracing::debug!(ty = %cond, "non-boolean if condition");
    }
    common_type(if_true, if_false).ok_or_else(|| CheckError::NoCommonType {
        site: CommonTypeSite::IfBranches,
        left: if_true.clone(),
        right: if_false.clone(),
    })
}

/// Attach the called function's name to a unification failure
fn call_error(function: &str, err: UnifyError) -> CheckError {
    let function = function.to_string();
    match err {
        UnifyError::Mismatch {
            position,
            expected,
            found,
        } => CheckError::ArgumentMismatch {
            function,
            position,
            expected,
            found,
        },
        UnifyError::Conflict {
            param,
            bound,
            found,
        } => CheckError::ConflictingTypeParameter {
            function,
            param,
            bound,
            found,
        },
        UnifyError::Unresolved { param } => CheckError::UnresolvedTypeParameter { function, param },
    }
}

/// Result type of `left op right`, given both operand types
fn binop_type(op: BinOp, left: &Type, right: &Type) -> Result<Type, CheckError> {
    let (operand, result) = match op {
        BinOp::Sum => (Type::Long, Type::Long),
        BinOp::Gt | BinOp::Ge => (Type::Long, Type::Boolean),
        BinOp::And | BinOp::Or => (Type::Boolean, Type::Boolean),
        BinOp::Eq => {
            return common_type(left, right)
                .map(|_| Type::Boolean)
                .ok_or_else(|| CheckError::NoCommonType {
                    site: CommonTypeSite::Equality,
                    left: left.clone(),
                    right: right.clone(),
                })
        }
    };
    for (side, found) in [(Side::Left, left), (Side::Right, right)] {
        if *found != operand {
            return Err(CheckError::OperandMismatch {
                op,
                side,
                expected: operand,
                found: found.clone(),
            });
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binop_table() {
        assert_eq!(binop_type(BinOp::Sum, &Type::Long, &Type::Long), Ok(Type::Long));
        assert_eq!(binop_type(BinOp::Ge, &Type::Long, &Type::Long), Ok(Type::Boolean));
        assert_eq!(
            binop_type(BinOp::Or, &Type::Boolean, &Type::Boolean),
            Ok(Type::Boolean)
        );
        assert_eq!(
            binop_type(BinOp::Eq, &Type::String, &Type::String),
            Ok(Type::Boolean)
        );
    }

    #[test]
    fn test_binop_left_operand_reported_first() {
        let err = binop_type(BinOp::And, &Type::Long, &Type::String).unwrap_err();
        assert_eq!(
            err,
            CheckError::OperandMismatch {
                op: BinOp::And,
                side: Side::Left,
                expected: Type::Boolean,
                found: Type::Long,
            }
        );
    }

    #[test]
    fn test_depth_counter_unwinds_after_error() {
        let mut checker = Checker::new(CheckerConfig::new().with_max_depth(4));
        let ctx = Context::new();
        assert!(checker.check_expr(&ctx, &Expr::reference("missing")).is_err());
        assert_eq!(checker.depth, 0);
        assert!(checker.check_expr(&ctx, &Expr::long(1)).is_ok());
    }

    #[test]
    fn test_config_defaults() {
        assert_eq!(CheckerConfig::default().max_depth, 100);
        assert_eq!(CheckerConfig::new().with_max_depth(8).max_depth, 8);
    }
}
