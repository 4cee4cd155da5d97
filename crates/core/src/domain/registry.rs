// Registry - ordered list of bindings, the single source of truth

use crate::domain::error::{DomainError, Result};
use crate::domain::{Binding, BindingKey};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered sequence of bindings (insertion order = display order).
///
/// `add` and `replace` refuse to create a second binding with the same
/// `(name, moment)`. A registry deserialized from disk may still carry
/// duplicates; see [`Registry::duplicate_keys`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    bindings: Vec<Binding>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from raw bindings without the uniqueness check
    /// (used when loading persisted state)
    pub fn from_bindings(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn enabled(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter().filter(|b| b.enabled)
    }

    pub fn contains(&self, key: &BindingKey) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &BindingKey) -> Option<&Binding> {
        self.position(key).map(|i| &self.bindings[i])
    }

    /// Append a binding
    ///
    /// # Errors
    /// - `DuplicateBinding` if `(name, moment)` is already present
    /// - `ValidationError` if the binding is malformed
    pub fn add(&mut self, binding: Binding) -> Result<()> {
        binding.validate()?;

        let key = binding.key();
        if self.contains(&key) {
            return Err(DomainError::DuplicateBinding(key));
        }

        self.bindings.push(binding);
        Ok(())
    }

    /// Replace the binding at `key` in place, keeping its position
    ///
    /// The replacement may change the key, as long as it does not collide
    /// with another binding.
    pub fn replace(&mut self, key: &BindingKey, binding: Binding) -> Result<Binding> {
        binding.validate()?;

        let index = self.require(key)?;
        let new_key = binding.key();
        if new_key != *key && self.contains(&new_key) {
            return Err(DomainError::DuplicateBinding(new_key));
        }

        Ok(std::mem::replace(&mut self.bindings[index], binding))
    }

    pub fn remove(&mut self, key: &BindingKey) -> Result<Binding> {
        let index = self.require(key)?;
        Ok(self.bindings.remove(index))
    }

    pub fn set_enabled(&mut self, key: &BindingKey, enabled: bool) -> Result<()> {
        let index = self.require(key)?;
        self.bindings[index].enabled = enabled;
        Ok(())
    }

    /// Flip `enabled` and return the new value
    pub fn toggle(&mut self, key: &BindingKey) -> Result<bool> {
        let index = self.require(key)?;
        let binding = &mut self.bindings[index];
        binding.enabled = !binding.enabled;
        Ok(binding.enabled)
    }

    /// Keys that appear more than once, in first-seen order
    pub fn duplicate_keys(&self) -> Vec<BindingKey> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut duplicates = Vec::new();

        for binding in &self.bindings {
            let key = binding.key();
            if !seen.insert(key.clone()) && reported.insert(key.clone()) {
                duplicates.push(key);
            }
        }

        duplicates
    }

    fn position(&self, key: &BindingKey) -> Option<usize> {
        self.bindings
            .iter()
            .position(|b| b.name == key.name && b.moment == key.moment)
    }

    fn require(&self, key: &BindingKey) -> Result<usize> {
        self.position(key)
            .ok_or_else(|| DomainError::BindingNotFound(key.clone()))
    }
}
