//! Property-based tests for checker soundness
//!
//! These tests verify the quantified properties of the checker:
//! - Literals always type, whatever their value
//! - A let-bound name has its value's type in the body, and may not shadow
//! - Operator rules hold for arbitrary well-typed operands
//! - Generic calls bind placeholders consistently
//! - Checking is deterministic
//! - Accepted trees only carry concrete, known types

use proptest::prelude::*;

use keel::errors::{CheckError, Side};
use keel::test_support::{sample_context, unknown_type_refs};
use keel::unify::common_type;
use keel::{check, BinOp, Context, Expr, FunctionSig, PredefType, Type};

// ============================================================================
// Generators
// ============================================================================

fn arb_literal() -> BoxedStrategy<Expr> {
    prop_oneof![
        any::<i64>().prop_map(Expr::long),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Expr::bytes),
        ".{0,12}".prop_map(Expr::string),
        any::<bool>().prop_map(Expr::bool),
    ]
    .boxed()
}

fn arb_type() -> BoxedStrategy<Type> {
    prop_oneof![
        Just(Type::Long),
        Just(Type::Boolean),
        Just(Type::ByteVector),
        Just(Type::String),
        Just(Type::type_ref("Transaction")),
        Just(Type::type_ref("Address")),
    ]
    .boxed()
}

/// A closed, well-typed expression of type LONG
fn arb_long_expr(depth: u32) -> BoxedStrategy<Expr> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Expr::long),
        Just(Expr::reference("height")),
        Just(Expr::getter(Expr::reference("tx"), "fee")),
        Just(Expr::call("size", vec![Expr::bytes(vec![1, 2])])),
    ];
    leaf.prop_recursive(depth, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Expr::binary(l, BinOp::Sum, r)),
            inner.clone().prop_map(|e| Expr::call("id", vec![e])),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Expr::call("choose", vec![a, b])),
            (arb_bool_leaf(), inner.clone(), inner)
                .prop_map(|(c, t, f)| Expr::if_(c, t, f)),
        ]
    })
    .boxed()
}

fn arb_bool_leaf() -> BoxedStrategy<Expr> {
    prop_oneof![
        any::<bool>().prop_map(Expr::bool),
        Just(Expr::call("isDefined", vec![Expr::reference("tx")])),
        Just(Expr::binary(Expr::reference("height"), BinOp::Gt, Expr::long(0))),
    ]
    .boxed()
}

/// A closed, well-typed expression of type BOOLEAN
fn arb_bool_expr() -> BoxedStrategy<Expr> {
    prop_oneof![
        arb_bool_leaf(),
        (arb_long_expr(2), arb_long_expr(2)).prop_map(|(l, r)| Expr::binary(l, BinOp::Ge, r)),
        (arb_bool_leaf(), arb_bool_leaf()).prop_map(|(l, r)| Expr::binary(l, BinOp::Or, r)),
        (arb_long_expr(2), arb_long_expr(2)).prop_map(|(l, r)| Expr::binary(l, BinOp::Eq, r)),
    ]
    .boxed()
}

/// A name that is not bound in the sample context
fn arb_fresh_name() -> impl Strategy<Value = String> {
    "[a-z]{1,6}".prop_filter("must be unbound", |name| {
        let ctx = sample_context();
        !ctx.has_var(name) && !ctx.has_function(name)
    })
}

fn literal_type(expr: &Expr) -> Type {
    match expr {
        Expr::Lit(keel::Literal::Long(_)) => Type::Long,
        Expr::Lit(keel::Literal::ByteVector(_)) => Type::ByteVector,
        Expr::Lit(keel::Literal::Str(_)) => Type::String,
        Expr::Lit(keel::Literal::Bool(_)) => Type::Boolean,
        other => panic!("not a literal: {}", other),
    }
}

// ============================================================================
// Leaves and Scoping
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every literal checks, with the type fixed by its kind
    #[test]
    fn literals_always_check(lit in arb_literal()) {
        let typed = check(&Context::new(), &lit);
        prop_assert_eq!(typed.map(|t| t.ty), Ok(literal_type(&lit)));
    }

    /// `let name = value; name` has the type of `value`
    #[test]
    fn let_ref_has_value_type(name in arb_fresh_name(), value in arb_long_expr(3)) {
        let ctx = sample_context();
        let expr = Expr::let_in(name.clone(), value.clone(), Expr::reference(name));
        let value_ty = check(&ctx, &value).map(|t| t.ty);
        prop_assert_eq!(value_ty, Ok(Type::Long));
        prop_assert_eq!(check(&ctx, &expr).map(|t| t.ty), Ok(Type::Long));
    }

    /// Reusing a bound variable or function name fails, whatever the value
    #[test]
    fn let_never_shadows(
        name in prop::sample::select(vec!["height", "tx", "size", "sigVerify", "id"]),
        value in arb_literal(),
    ) {
        let expr = Expr::let_in(name, value, Expr::reference(name));
        let is_duplicate = matches!(
            check(&sample_context(), &expr),
            Err(CheckError::DuplicateBinding { .. })
        );
        prop_assert!(is_duplicate);
    }
}

// ============================================================================
// Operators and Calls
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// LONG + BOOLEAN names BOOLEAN as the unexpected second operand
    #[test]
    fn sum_rejects_boolean_right(a in arb_long_expr(2), b in arb_bool_expr()) {
        let err = check(&sample_context(), &Expr::binary(a, BinOp::Sum, b)).unwrap_err();
        prop_assert_eq!(
            err,
            CheckError::OperandMismatch {
                op: BinOp::Sum,
                side: Side::Right,
                expected: Type::Long,
                found: Type::Boolean,
            }
        );
    }

    /// LONG > LONG is BOOLEAN
    #[test]
    fn gt_on_longs_is_boolean(a in arb_long_expr(3), b in arb_long_expr(3)) {
        let ty = check(&sample_context(), &Expr::binary(a, BinOp::Gt, b)).map(|t| t.ty);
        prop_assert_eq!(ty, Ok(Type::Boolean));
    }

    /// Boolean connectives over boolean expressions are boolean
    #[test]
    fn and_or_on_booleans(a in arb_bool_expr(), b in arb_bool_expr(), and in any::<bool>()) {
        let op = if and { BinOp::And } else { BinOp::Or };
        let ty = check(&sample_context(), &Expr::binary(a, op, b)).map(|t| t.ty);
        prop_assert_eq!(ty, Ok(Type::Boolean));
    }

    /// choose('T, 'T) -> 'T succeeds exactly when both arguments agree
    #[test]
    fn generic_call_binds_consistently(a in arb_literal(), b in arb_literal()) {
        let result = check(&sample_context(), &Expr::call("choose", vec![a.clone(), b.clone()]));
        let (ta, tb) = (literal_type(&a), literal_type(&b));
        if ta == tb {
            prop_assert_eq!(result.map(|t| t.ty), Ok(ta));
        } else {
            let is_conflict = matches!(result, Err(CheckError::ConflictingTypeParameter { .. }));
            prop_assert!(is_conflict);
        }
    }

    /// if-branches unify exactly when their types are identical
    #[test]
    fn if_branches_follow_common_type(a in arb_literal(), b in arb_literal()) {
        let result = check(&Context::new(), &Expr::if_(Expr::bool(true), a.clone(), b.clone()));
        let expected = common_type(&literal_type(&a), &literal_type(&b));
        prop_assert_eq!(result.ok().map(|t| t.ty), expected);
    }

    /// The common type is symmetric and reflexive
    #[test]
    fn common_type_symmetric(a in arb_type(), b in arb_type()) {
        prop_assert_eq!(common_type(&a, &b), common_type(&b, &a));
        prop_assert_eq!(common_type(&a, &a), Some(a));
    }
}

// ============================================================================
// Determinism and Invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Checking twice gives identical results
    #[test]
    fn checking_is_deterministic(expr in arb_bool_expr()) {
        let ctx = sample_context();
        let first = check(&ctx, &expr);
        let second = check(&ctx, &expr);
        prop_assert_eq!(format!("{:?}", first), format!("{:?}", second));
    }

    /// Accepted trees carry only types the context knows about
    #[test]
    fn typed_tree_types_are_known(expr in arb_long_expr(4)) {
        let ctx = sample_context();
        let typed = check(&ctx, &expr).unwrap();
        prop_assert_eq!(unknown_type_refs(&typed, &ctx), None);
        prop_assert_eq!(typed.ty, Type::Long);
    }

    /// Whatever the host registers, a name it forgot never reaches the typed tree
    #[test]
    fn unregistered_types_never_escape(
        registered in prop::collection::btree_set("[A-D]", 0..4),
        var_type in "[A-D]",
        field_type in "[A-D]",
    ) {
        let mut ctx = Context::new();
        for name in &registered {
            let fields = vec![("next", Type::type_ref(field_type.clone()))];
            ctx = ctx.with_type(PredefType::new(name.clone(), fields));
        }
        let ctx = ctx
            .with_var("v", Type::type_ref(var_type.clone()))
            .with_function("make", FunctionSig::new(vec![], Type::type_ref(field_type.clone())));
        let scripts = [
            Expr::reference("v"),
            Expr::getter(Expr::reference("v"), "next"),
            Expr::call("make", vec![]),
        ];
        for script in &scripts {
            match check(&ctx, script) {
                Ok(typed) => prop_assert_eq!(unknown_type_refs(&typed, &ctx), None),
                Err(CheckError::UndefinedType { name, .. }) => {
                    prop_assert!(!registered.contains(&name));
                }
                Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            }
        }
    }

    /// An undefined reference on the left is reported before anything on the right
    #[test]
    fn leftmost_error_wins(right in arb_literal()) {
        let expr = Expr::binary(Expr::reference("undefinedName"), BinOp::Sum, Expr::getter(right, "f"));
        let is_left = matches!(
            check(&sample_context(), &expr),
            Err(CheckError::UndefinedReference { ref name, .. }) if name == "undefinedName"
        );
        prop_assert!(is_left);
    }
}
