use super::{ast::Symbol, types::Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl BinaryOp {
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div
        )
    }

    /// `==` and `!=`, which also accept booleans and arrays.
    pub fn is_equality(&self) -> bool {
        matches!(self, BinaryOp::Equal | BinaryOp::NotEqual)
    }

    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    IntToFloat,
    FloatToInt,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Bool(bool),
    Int(i32),
    Float(f32),
    Str(String),
    Null,
    Call {
        callee: Symbol,
        arguments: Vec<Expression>,
    },
    Variable(Variable),
    New {
        element: Type,
        size: Box<Expression>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// Only ever produced by the type checker.
    Cast {
        kind: CastKind,
        operand: Box<Expression>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExprKind,
    pub ty: Type,
    pub line: i32,
}

impl Expression {
    pub fn new(kind: ExprKind, line: i32) -> Self {
        Expression {
            kind,
            ty: Type::UNDEFINED,
            line,
        }
    }

    /// Turns this node into a `Cast` to `goal` whose operand is the node's
    /// previous contents. Anything holding this node now holds the cast.
    pub fn wrap_in_cast(&mut self, goal: Type, kind: CastKind) {
        let line = self.line;
        let original = std::mem::replace(self, Expression::new(ExprKind::Null, line));

        *self = Expression {
            kind: ExprKind::Cast {
                kind,
                operand: Box::new(original),
            },
            ty: goal,
            line,
        };
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VariableKind {
    Reference(Symbol),
    Array {
        location: Box<Expression>,
        offset: Box<Expression>,
    },
}

/// An assignable location: a named variable or an array element.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub kind: VariableKind,
    pub ty: Type,
    pub line: i32,
}

impl Variable {
    pub fn new(kind: VariableKind, line: i32) -> Self {
        Variable {
            kind,
            ty: Type::UNDEFINED,
            line,
        }
    }
}
