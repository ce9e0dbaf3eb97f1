use super::{
    ast::DeclId,
    expressions::{Expression, Variable},
};

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// A scope: its own local declarations followed by statements.
    Block {
        declarations: Vec<DeclId>,
        statements: Vec<Statement>,
    },
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
    },
    Assign {
        target: Variable,
        value: Expression,
    },
    Delete(Expression),
    Print(Vec<Expression>),
    Return(Option<Expression>),
    Call(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StmtKind,
    pub line: i32,
    /// Set by the type checker when every path through this statement returns.
    pub has_returned: bool,
}

impl Statement {
    pub fn new(kind: StmtKind, line: i32) -> Self {
        Statement {
            kind,
            line,
            has_returned: false,
        }
    }
}
