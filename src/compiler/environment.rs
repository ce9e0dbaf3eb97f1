use std::collections::BTreeMap;

use inkwell::{
    basic_block::BasicBlock,
    builder::{Builder, BuilderError},
    values::BasicValueEnum,
};

use crate::ast::ast::DeclId;

/// Current SSA value of every local variable at one program point.
///
/// Globals never enter the environment; they are read and written through
/// their module storage. Cloning copies the bindings, not the values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment<'ctx> {
    bindings: BTreeMap<DeclId, BasicValueEnum<'ctx>>,
}

impl<'ctx> Environment<'ctx> {
    pub fn new() -> Self {
        Environment::default()
    }

    pub fn get(&self, id: DeclId) -> Option<BasicValueEnum<'ctx>> {
        self.bindings.get(&id).copied()
    }

    pub fn bind(&mut self, id: DeclId, value: BasicValueEnum<'ctx>) {
        self.bindings.insert(id, value);
    }

    pub fn remove(&mut self, id: DeclId) {
        self.bindings.remove(&id);
    }

    pub fn contains(&self, id: DeclId) -> bool {
        self.bindings.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclId, BasicValueEnum<'ctx>)> + '_ {
        self.bindings.iter().map(|(id, value)| (*id, *value))
    }

    /// Joins two environments flowing into the block the builder is
    /// positioned at.
    ///
    /// A variable bound to the same value on both sides keeps it. A variable
    /// missing on one side counts as still holding its value from `before`.
    /// Every other variable gets a phi with one incoming edge per side.
    pub fn merge(
        builder: &Builder<'ctx>,
        before: &Environment<'ctx>,
        (left, left_block): (&Environment<'ctx>, BasicBlock<'ctx>),
        (right, right_block): (&Environment<'ctx>, BasicBlock<'ctx>),
    ) -> Result<Environment<'ctx>, BuilderError> {
        let mut merged = Environment::new();

        let keys = left.bindings.keys().chain(right.bindings.keys());
        for id in keys.copied() {
            if merged.contains(id) {
                continue;
            }

            let left_value = left.get(id).or_else(|| before.get(id));
            let right_value = right.get(id).or_else(|| before.get(id));

            let (left_value, right_value) = match (left_value, right_value) {
                (Some(l), Some(r)) => (l, r),
                _ => continue,
            };

            if left_value == right_value {
                merged.bind(id, left_value);
                continue;
            }

            let phi = builder.build_phi(left_value.get_type(), "")?;
            phi.add_incoming(&[(&left_value, left_block), (&right_value, right_block)]);
            merged.bind(id, phi.as_basic_value());
        }

        Ok(merged)
    }
}
