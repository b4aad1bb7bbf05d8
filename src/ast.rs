use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::environment::{self, Type, Variable};

/// Literal values as stored in the tree. Integer and decimal literals keep
/// full precision; the analyzer narrows them to `i32`/`f64` semantics.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Nil,
    Boolean(bool),
    Integer(BigInt),
    Decimal(BigDecimal),
    Character(char),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    And,
    Or,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::And => "AND",
            BinOp::Or => "OR",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        }
    }
}

/// Expression nodes. The `ty`/`variable`/`function` slots start out empty
/// and are filled in by the analyzer; both backends read them. `index` is
/// the byte offset of the node's operative token (the literal, the name,
/// the operator, or the opening parenthesis), recorded by the parser so
/// the analyzer can position its errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal {
        value: Literal,
        ty: Option<Type>,
        index: usize,
    },
    Group {
        inner: Box<Expr>,
        ty: Option<Type>,
        index: usize,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        ty: Option<Type>,
        index: usize,
    },
    Access {
        receiver: Option<Box<Expr>>,
        name: String,
        variable: Option<Variable>,
        index: usize,
    },
    Function {
        receiver: Option<Box<Expr>>,
        name: String,
        args: Vec<Expr>,
        function: Option<environment::Function>,
        index: usize,
    },
}

impl Expr {
    pub fn literal(value: Literal, index: usize) -> Expr {
        Expr::Literal {
            value,
            ty: None,
            index,
        }
    }

    pub fn group(inner: Expr, index: usize) -> Expr {
        Expr::Group {
            inner: Box::new(inner),
            ty: None,
            index,
        }
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr, index: usize) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            ty: None,
            index,
        }
    }

    pub fn access(receiver: Option<Expr>, name: impl Into<String>, index: usize) -> Expr {
        Expr::Access {
            receiver: receiver.map(Box::new),
            name: name.into(),
            variable: None,
            index,
        }
    }

    pub fn function(
        receiver: Option<Expr>,
        name: impl Into<String>,
        args: Vec<Expr>,
        index: usize,
    ) -> Expr {
        Expr::Function {
            receiver: receiver.map(Box::new),
            name: name.into(),
            args,
            function: None,
            index,
        }
    }

    /// The resolved type, if the analyzer has run. `Access` and `Function`
    /// nodes derive theirs from the bound symbol.
    pub fn ty(&self) -> Option<Type> {
        match self {
            Expr::Literal { ty, .. } | Expr::Group { ty, .. } | Expr::Binary { ty, .. } => *ty,
            Expr::Access { variable, .. } => variable.as_ref().map(|variable| variable.ty),
            Expr::Function { function, .. } => {
                function.as_ref().map(|function| function.return_type)
            }
        }
    }

    /// Byte offset of the node's operative token in the original source.
    pub fn index(&self) -> usize {
        match self {
            Expr::Literal { index, .. }
            | Expr::Group { index, .. }
            | Expr::Binary { index, .. }
            | Expr::Access { index, .. }
            | Expr::Function { index, .. } => *index,
        }
    }
}

/// Statement nodes. `index` is the byte offset of the statement's first
/// token (the keyword, or the leading expression's operative token).
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// An expression evaluated for effect; the analyzer requires a call.
    Expression {
        expr: Expr,
        index: usize,
    },
    Declaration {
        name: String,
        type_name: Option<String>,
        value: Option<Expr>,
        variable: Option<Variable>,
        index: usize,
    },
    Assignment {
        receiver: Expr,
        value: Expr,
        index: usize,
    },
    If {
        condition: Expr,
        then_statements: Vec<Stmt>,
        else_statements: Vec<Stmt>,
        index: usize,
    },
    For {
        name: String,
        iterable: Expr,
        body: Vec<Stmt>,
        index: usize,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
        index: usize,
    },
    Return {
        value: Expr,
        index: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub type_name: Option<String>,
    pub value: Option<Expr>,
    pub variable: Option<Variable>,
    /// Byte offset of the `LET` keyword.
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub parameters: Vec<String>,
    pub parameter_type_names: Vec<Option<String>>,
    pub return_type_name: Option<String>,
    pub statements: Vec<Stmt>,
    pub function: Option<environment::Function>,
    /// Byte offset of the `DEF` keyword.
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Source {
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
}
