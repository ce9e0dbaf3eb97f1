use super::{statements::Statement, types::Type};

/// Handle of a [`Declaration`] inside its [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclId(pub usize);

/// Reference from a call or variable to a declaration. The parser only
/// knows names; the type checker replaces them with handles.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Name(String),
    Resolved(DeclId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    Variable {
        is_global: bool,
    },
    Function {
        parameters: Vec<DeclId>,
        body: Option<Box<Statement>>,
    },
    Prototype {
        parameters: Vec<DeclId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub ty: Type,
    pub line: i32,
    pub kind: DeclKind,
}

impl Declaration {
    pub fn variable(name: String, ty: Type, line: i32) -> Self {
        Declaration {
            name,
            ty,
            line,
            kind: DeclKind::Variable { is_global: false },
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind, DeclKind::Variable { .. })
    }

    pub fn is_global(&self) -> bool {
        matches!(self.kind, DeclKind::Variable { is_global: true })
    }

    pub fn is_callable(&self) -> bool {
        !self.is_variable()
    }

    pub fn parameters(&self) -> &[DeclId] {
        match &self.kind {
            DeclKind::Function { parameters, .. } | DeclKind::Prototype { parameters } => {
                parameters
            }
            DeclKind::Variable { .. } => &[],
        }
    }
}

/// A whole compilation unit.
///
/// Every declaration (globals, functions, parameters and block locals)
/// lives in `declarations` and is referred to by [`DeclId`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub declarations: Vec<Declaration>,
    pub top_level: Vec<DeclId>,
    pub strings: Vec<String>,
    pub analyzed: bool,
}

impl Program {
    pub fn add_declaration(&mut self, declaration: Declaration) -> DeclId {
        self.declarations.push(declaration);
        DeclId(self.declarations.len() - 1)
    }

    pub fn declaration(&self, id: DeclId) -> &Declaration {
        &self.declarations[id.0]
    }

    pub fn declaration_mut(&mut self, id: DeclId) -> &mut Declaration {
        &mut self.declarations[id.0]
    }
}
