//! Type representation for the checker
//!
//! Concrete types are what typed nodes carry. Placeholders only live inside
//! function signatures and are eliminated by [`crate::unify`] before a typed
//! node is built.

use std::fmt;

/// A concrete type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Type {
    Long,
    Boolean,
    ByteVector,
    String,
    /// Nominal reference to a predefined structured type, resolved by name
    TypeRef(String),
}

impl Type {
    pub fn type_ref(name: impl Into<String>) -> Type {
        Type::TypeRef(name.into())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Long => write!(f, "LONG"),
            Type::Boolean => write!(f, "BOOLEAN"),
            Type::ByteVector => write!(f, "BYTEVECTOR"),
            Type::String => write!(f, "STRING"),
            Type::TypeRef(name) => write!(f, "TYPEREF({})", name),
        }
    }
}

/// A type parameter of a native function signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeParam(pub char);

impl fmt::Display for TypeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}", self.0)
    }
}

/// A type as written in a function signature: concrete, or a placeholder
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SigType {
    Concrete(Type),
    Param(TypeParam),
}

impl SigType {
    pub fn param(name: char) -> SigType {
        SigType::Param(TypeParam(name))
    }
}

impl From<Type> for SigType {
    fn from(ty: Type) -> Self {
        SigType::Concrete(ty)
    }
}

impl From<TypeParam> for SigType {
    fn from(param: TypeParam) -> Self {
        SigType::Param(param)
    }
}

impl fmt::Display for SigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigType::Concrete(ty) => write!(f, "{}", ty),
            SigType::Param(param) => write!(f, "{}", param),
        }
    }
}

/// A structured type supplied by the host: a name and its ordered fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredefType {
    pub name: String,
    pub fields: Vec<(String, Type)>,
}

impl PredefType {
    pub fn new<F: Into<String>>(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = (F, Type)>,
    ) -> Self {
        PredefType {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(field, ty)| (field.into(), ty))
                .collect(),
        }
    }

    /// Look up a field by name, first declaration wins
    pub fn field(&self, name: &str) -> Option<&Type> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, ty)| ty)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(field, _)| field.as_str())
    }
}

/// Signature of a native function: argument types and result type,
/// any of which may be a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSig {
    pub params: Vec<SigType>,
    pub result: SigType,
}

impl FunctionSig {
    pub fn new(params: impl IntoIterator<Item = SigType>, result: impl Into<SigType>) -> Self {
        FunctionSig {
            params: params.into_iter().collect(),
            result: result.into(),
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for FunctionSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ") -> {}", self.result)
    }
}
