// Collection form node

use crate::node::join_path;
use crate::{FormError, GroupNode, Node, Result, Status, ValueChange};
use intake_validation::{Control, FieldValue, ValidationErrors, ValidatorSet};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Builds a fresh entry for a collection
pub type GroupFactory = Arc<dyn Fn() -> GroupNode + Send + Sync>;

/// Ordered, index-addressed sequence of groups.
///
/// Every entry comes from the factory, so no two entries share state.
/// Removing an entry shifts the following ones down; there are never gaps.
#[derive(Clone)]
pub struct CollectionNode {
    entries: Vec<Node>,
    factory: GroupFactory,
    validators: ValidatorSet,
    errors: Option<ValidationErrors>,
    status: Status,
    dirty: bool,
    touched: bool,
    disabled: bool,
}

impl CollectionNode {
    /// Create an empty collection whose entries come from `factory`
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> GroupNode + Send + Sync + 'static,
    {
        Self {
            entries: Vec::new(),
            factory: Arc::new(factory),
            validators: ValidatorSet::new(),
            errors: None,
            status: Status::Valid,
            dirty: false,
            touched: false,
            disabled: false,
        }
    }

    /// Start with `count` entries. Initial entries do not make the collection dirty.
    pub fn with_entries(mut self, count: usize) -> Self {
        for _ in 0..count {
            self.entries.push(Node::Group((self.factory)()));
        }
        self.update_status();
        self
    }

    /// Attach collection-level validators, builder style
    pub fn with_validators(mut self, validators: impl Into<ValidatorSet>) -> Self {
        self.validators = validators.into();
        self.update_status();
        self
    }

    /// Append a fresh entry and return its index
    pub fn append(&mut self) -> usize {
        let group = (self.factory)();
        self.push(group)
    }

    /// Append a prebuilt entry and return its index
    pub fn push(&mut self, group: GroupNode) -> usize {
        self.entries.push(Node::Group(group));
        self.dirty = true;
        self.update_status();
        self.entries.len() - 1
    }

    /// Remove the entry at `index`, shifting later entries down
    pub fn remove_at(&mut self, index: usize) -> Result<GroupNode> {
        if index >= self.entries.len() {
            return Err(FormError::OutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        let removed = self.entries.remove(index);
        self.dirty = true;
        self.update_status();
        match removed {
            Node::Group(group) => Ok(group),
            _ => Err(FormError::NotAGroup(index.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`
    pub fn at(&self, index: usize) -> Option<&GroupNode> {
        self.entries.get(index).and_then(Node::as_group)
    }

    /// Mutable entry at `index`. Does not recompute the collection status.
    pub fn at_mut(&mut self, index: usize) -> Option<&mut GroupNode> {
        self.entries.get_mut(index).and_then(Node::as_group_mut)
    }

    /// Entries in order
    pub fn entries(&self) -> impl Iterator<Item = &GroupNode> {
        self.entries.iter().filter_map(Node::as_group)
    }

    pub(crate) fn entry_node(&self, segment: &str) -> Option<&Node> {
        segment.parse::<usize>().ok().and_then(|i| self.entries.get(i))
    }

    pub(crate) fn entry_node_mut(&mut self, segment: &str) -> Option<&mut Node> {
        segment.parse::<usize>().ok().and_then(|i| self.entries.get_mut(i))
    }

    pub(crate) fn update_segments<R>(
        &mut self,
        segments: &[&str],
        full: &str,
        f: impl FnOnce(&mut Node) -> Result<R>,
    ) -> Result<R> {
        let (head, rest) = segments
            .split_first()
            .ok_or_else(|| FormError::NotFound(full.to_string()))?;
        let entry = self
            .entry_node_mut(head)
            .ok_or_else(|| FormError::NotFound(full.to_string()))?;
        let result = entry.update_segments(rest, full, f)?;
        self.update_status();
        Ok(result)
    }

    pub(crate) fn check_patch(&self, patch: &Value, path: &str) -> Result<()> {
        let items = patch
            .as_array()
            .ok_or_else(|| FormError::invalid_patch(path, "expected an array"))?;
        for (index, (item, entry)) in items.iter().zip(&self.entries).enumerate() {
            entry.check_patch(item, &join_path(path, &index.to_string()))?;
        }
        Ok(())
    }

    /// Patches existing entries by position; extra items are ignored.
    pub(crate) fn apply_patch(&mut self, patch: &Value, path: &str, changes: &mut Vec<ValueChange>) {
        if let Some(items) = patch.as_array() {
            for (index, (item, entry)) in items.iter().zip(&mut self.entries).enumerate() {
                entry.apply_patch(item, &join_path(path, &index.to_string()), changes);
            }
        }
        self.update_status();
    }

    /// Values of enabled entries, in order
    pub fn value(&self) -> Value {
        Value::Array(
            self.entries
                .iter()
                .filter(|entry| !entry.is_disabled())
                .map(Node::value)
                .collect(),
        )
    }

    /// Values of all entries, in order
    pub fn raw_value(&self) -> Value {
        Value::Array(self.entries.iter().map(Node::raw_value).collect())
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_valid(&self) -> bool {
        self.status == Status::Valid
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    pub fn validators(&self) -> &ValidatorSet {
        &self.validators
    }

    /// Replace collection-level validators. Takes effect on the next revalidation.
    pub fn set_validators(&mut self, validators: impl Into<ValidatorSet>) {
        self.validators = validators.into();
    }

    /// Re-run validation on every entry, then on the collection itself
    pub fn revalidate(&mut self) {
        for entry in &mut self.entries {
            entry.revalidate();
        }
        self.update_status();
    }

    pub(crate) fn update_status(&mut self) {
        if self.disabled {
            self.errors = None;
            self.status = Status::Disabled;
            return;
        }

        self.errors = self.validators.run(&*self).into_option();
        self.status = Status::aggregate(
            self.errors.is_some(),
            self.entries.iter().map(Node::status),
        );
    }

    /// Dirty after an append or removal, or once any entry has changed
    pub fn is_dirty(&self) -> bool {
        self.dirty || self.entries.iter().any(Node::is_dirty)
    }

    pub fn is_pristine(&self) -> bool {
        !self.is_dirty()
    }

    pub fn is_touched(&self) -> bool {
        self.touched || self.entries.iter().any(Node::is_touched)
    }

    pub fn mark_touched(&mut self) {
        self.touched = true;
    }

    pub fn mark_all_touched(&mut self) {
        self.touched = true;
        for entry in &mut self.entries {
            entry.mark_all_touched();
        }
    }

    /// Reset every entry and clear interaction flags. The entry count is kept.
    pub fn reset(&mut self) {
        self.dirty = false;
        self.touched = false;
        for entry in &mut self.entries {
            entry.reset();
        }
        self.update_status();
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn disable(&mut self) {
        self.disabled = true;
        for entry in &mut self.entries {
            entry.disable();
        }
        self.update_status();
    }

    pub fn enable(&mut self) {
        self.disabled = false;
        for entry in &mut self.entries {
            entry.enable();
        }
        self.update_status();
    }
}

impl fmt::Debug for CollectionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionNode")
            .field("entries", &self.entries)
            .field("validators", &self.validators)
            .field("errors", &self.errors)
            .field("status", &self.status)
            .field("dirty", &self.dirty)
            .field("touched", &self.touched)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

impl Control for CollectionNode {
    fn scalar(&self) -> Option<&FieldValue> {
        None
    }

    fn is_pristine(&self) -> bool {
        !self.is_dirty()
    }

    fn child(&self, name: &str) -> Option<&dyn Control> {
        self.entry_node(name).map(|node| node as &dyn Control)
    }
}
