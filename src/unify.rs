//! Resolution of generic native function signatures
//!
//! Argument types are matched left to right against the declared parameter
//! types, collecting one concrete type per placeholder. The collected
//! substitution is then applied to the declared result type.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::types::{SigType, Type, TypeParam};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnifyError {
    /// Argument `position` (1-based) does not match a concrete parameter type
    #[error("argument {position}: expected {expected}, found {found}")]
    Mismatch {
        position: usize,
        expected: Type,
        found: Type,
    },
    #[error("conflicting type for parameter {param}: {bound} and {found}")]
    Conflict {
        param: TypeParam,
        bound: Type,
        found: Type,
    },
    #[error("unresolved type parameter {param}")]
    Unresolved { param: TypeParam },
}

/// Placeholder assignments collected from a call site
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    map: BTreeMap<TypeParam, Type>,
}

impl Substitution {
    pub fn get(&self, param: TypeParam) -> Option<&Type> {
        self.map.get(&param)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeParam, &Type)> {
        self.map.iter()
    }

    /// Substitute into a declared (result) type
    pub fn resolve(&self, declared: &SigType) -> Result<Type, UnifyError> {
        match declared {
            SigType::Concrete(ty) => Ok(ty.clone()),
            SigType::Param(param) => self
                .map
                .get(param)
                .cloned()
                .ok_or(UnifyError::Unresolved { param: *param }),
        }
    }
}

/// Match `(actual, declared)` pairs, first failure wins
pub fn unify<'a, I>(pairs: I) -> Result<Substitution, UnifyError>
where
    I: IntoIterator<Item = (&'a Type, &'a SigType)>,
{
    let mut subst = Substitution::default();
    for (i, (actual, declared)) in pairs.into_iter().enumerate() {
        match declared {
            SigType::Concrete(expected) => {
                if actual != expected {
                    return Err(UnifyError::Mismatch {
                        position: i + 1,
                        expected: expected.clone(),
                        found: actual.clone(),
                    });
                }
            }
            SigType::Param(param) => match subst.map.get(param) {
                Some(bound) if bound != actual => {
                    return Err(UnifyError::Conflict {
                        param: *param,
                        bound: bound.clone(),
                        found: actual.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    subst.map.insert(*param, actual.clone());
                }
            },
        }
    }
    Ok(subst)
}

/// The type two values are unified to, for `==` operands and `if` branches.
/// Only identical types have one.
pub fn common_type(a: &Type, b: &Type) -> Option<Type> {
    if a == b {
        Some(a.clone())
    } else {
        None
    }
}
