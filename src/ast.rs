//! Untyped abstract syntax tree, as handed over by the parser

use std::fmt;

pub type Ident = String;

/// Constant leaves
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Long(i64),
    ByteVector(Vec<u8>),
    Str(String),
    Bool(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Long(n) => write!(f, "{}", n),
            Literal::ByteVector(bytes) => {
                write!(f, "0x")?;
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            Literal::Str(s) => write!(f, "{:?}", s),
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Sum,
    Gt,
    Ge,
    And,
    Or,
    Eq,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Sum => "+",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Eq => "==",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinOp::Sum => "SUM",
            BinOp::Gt => "GT",
            BinOp::Ge => "GE",
            BinOp::And => "AND",
            BinOp::Or => "OR",
            BinOp::Eq => "EQ",
        };
        write!(f, "{}", name)
    }
}

/// `let name = value` at the head of a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Let {
    pub name: Ident,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Constant: 42, 0xdead, "text", true
    Lit(Literal),

    /// Field access: target.field
    Getter { target: Box<Expr>, field: Ident },

    /// Native function call: name(args...)
    Call { name: Ident, args: Vec<Expr> },

    BinOp {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },

    /// Block with an optional leading let binding
    Block {
        binding: Option<Let>,
        body: Box<Expr>,
    },

    If {
        cond: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },

    /// Variable reference
    Ref(Ident),
}

impl Expr {
    pub fn long(n: i64) -> Expr {
        Expr::Lit(Literal::Long(n))
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Expr {
        Expr::Lit(Literal::ByteVector(bytes.into()))
    }

    pub fn string(s: impl Into<String>) -> Expr {
        Expr::Lit(Literal::Str(s.into()))
    }

    pub fn bool(b: bool) -> Expr {
        Expr::Lit(Literal::Bool(b))
    }

    pub fn reference(name: impl Into<Ident>) -> Expr {
        Expr::Ref(name.into())
    }

    pub fn getter(target: Expr, field: impl Into<Ident>) -> Expr {
        Expr::Getter {
            target: Box::new(target),
            field: field.into(),
        }
    }

    pub fn call(name: impl Into<Ident>, args: Vec<Expr>) -> Expr {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    pub fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
        Expr::BinOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Block without a binding
    pub fn block(body: Expr) -> Expr {
        Expr::Block {
            binding: None,
            body: Box::new(body),
        }
    }

    /// `let name = value; body`
    pub fn let_in(name: impl Into<Ident>, value: Expr, body: Expr) -> Expr {
        Expr::Block {
            binding: Some(Let {
                name: name.into(),
                value: Box::new(value),
            }),
            body: Box::new(body),
        }
    }

    pub fn if_(cond: Expr, if_true: Expr, if_false: Expr) -> Expr {
        Expr::If {
            cond: Box::new(cond),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        }
    }
}

/// Compact one-line rendering, used in logs and test failure output
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Lit(lit) => write!(f, "{}", lit),
            Expr::Getter { target, field } => write!(f, "{}.{}", target, field),
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::BinOp { left, op, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::Block { binding, body } => match binding {
                Some(Let { name, value }) => write!(f, "{{ let {} = {}; {} }}", name, value, body),
                None => write!(f, "{{ {} }}", body),
            },
            Expr::If {
                cond,
                if_true,
                if_false,
            } => write!(f, "if ({}) then {} else {}", cond, if_true, if_false),
            Expr::Ref(name) => write!(f, "{}", name),
        }
    }
}
