use crate::{
    ast::ast::{DeclId, DeclKind, Declaration},
    errors::errors::{Error, ErrorImpl},
};

/// Lexically scoped name table.
///
/// Symbols live on a single stack; `blocks` records where each open block
/// starts so that closing a block drops everything declared inside it.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<(String, DeclId)>,
    blocks: Vec<usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    fn block_start(&self) -> usize {
        self.blocks.last().copied().unwrap_or(0)
    }

    /// Declares `name` in the innermost block.
    ///
    /// Redeclaring a name in the same block is an error, except for a
    /// function signature repeated with identical types. A definition that
    /// follows its prototype takes the prototype's place.
    pub fn add(
        &mut self,
        name: &str,
        id: DeclId,
        declarations: &[Declaration],
        line: i32,
    ) -> Result<(), Error> {
        let start = self.block_start();

        for index in (start..self.symbols.len()).rev() {
            let (symbol, existing) = &self.symbols[index];
            if symbol != name {
                continue;
            }

            let existing = &declarations[existing.0];
            let incoming = &declarations[id.0];

            if !same_signature(existing, incoming, declarations) {
                return Err(Error::new(
                    ErrorImpl::DuplicateSymbol {
                        symbol: name.to_string(),
                    },
                    line,
                ));
            }

            if matches!(incoming.kind, DeclKind::Function { .. }) {
                self.symbols[index].1 = id;
            }
            return Ok(());
        }

        self.symbols.push((name.to_string(), id));
        Ok(())
    }

    /// Resolves `name` to its innermost visible declaration.
    pub fn find(&self, name: &str, line: i32) -> Result<DeclId, Error> {
        self.symbols
            .iter()
            .rev()
            .find(|(symbol, _)| symbol == name)
            .map(|(_, id)| *id)
            .ok_or_else(|| {
                Error::new(
                    ErrorImpl::UndeclaredSymbol {
                        symbol: name.to_string(),
                    },
                    line,
                )
            })
    }

    pub fn open_block(&mut self) {
        self.blocks.push(self.symbols.len());
    }

    pub fn close_block(&mut self) {
        let start = self.blocks.pop().unwrap_or(0);
        self.symbols.truncate(start);
    }
}

/// Two function signatures that may coexist: same return and parameter
/// types, and at most one of them has a body.
fn same_signature(a: &Declaration, b: &Declaration, declarations: &[Declaration]) -> bool {
    let both_defined = matches!(a.kind, DeclKind::Function { .. })
        && matches!(b.kind, DeclKind::Function { .. });

    if !a.is_callable() || !b.is_callable() || both_defined || a.ty != b.ty {
        return false;
    }

    a.parameters().len() == b.parameters().len()
        && a
            .parameters()
            .iter()
            .zip(b.parameters())
            .all(|(x, y)| declarations[x.0].ty == declarations[y.0].ty)
}
