// Group form node

use crate::node::join_path;
use crate::{FieldNode, FormError, Node, Result, Status, ValueChange};
use intake_validation::{Control, FieldValue, ValidationErrors, ValidatorSet};
use serde_json::{Map, Value};

/// Named children in declaration order, plus group-level validators.
///
/// Group validators receive the group itself, so cross-field rules can read
/// any child. They re-run whenever any descendant changes through the
/// path-addressed mutators ([`GroupNode::set_value`], [`GroupNode::patch_value`],
/// [`GroupNode::update_at`] and friends).
///
/// # Examples
///
/// ```
/// use intake_forms::{FieldNode, GroupNode, Status};
/// use intake_validation::validators;
///
/// let mut group = GroupNode::new()
///     .with_control("firstName", FieldNode::with_validators("", vec![validators::required()]))
///     .with_control("zip", FieldNode::new(""));
///
/// assert_eq!(group.status(), Status::Invalid);
/// group.set_value("firstName", "Jack").unwrap();
/// assert_eq!(group.status(), Status::Valid);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GroupNode {
    controls: Vec<(String, Node)>,
    validators: ValidatorSet,
    errors: Option<ValidationErrors>,
    status: Status,
    touched: bool,
    disabled: bool,
}

impl GroupNode {
    /// Create an empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a child, builder style. A child with the same name is replaced.
    pub fn with_control(mut self, name: impl Into<String>, node: impl Into<Node>) -> Self {
        self.add_control(name, node);
        self
    }

    /// Attach group-level validators, builder style
    pub fn with_validators(mut self, validators: impl Into<ValidatorSet>) -> Self {
        self.validators = validators.into();
        self.update_status();
        self
    }

    /// Add or replace a child and recompute the group status
    pub fn add_control(&mut self, name: impl Into<String>, node: impl Into<Node>) {
        let name = name.into();
        let node = node.into();
        match self.controls.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = node,
            None => self.controls.push((name, node)),
        }
        self.update_status();
    }

    /// Remove a child by name
    pub fn remove_control(&mut self, name: &str) -> Option<Node> {
        let index = self.controls.iter().position(|(n, _)| n == name)?;
        let (_, node) = self.controls.remove(index);
        self.update_status();
        Some(node)
    }

    /// Direct child by name
    pub fn control(&self, name: &str) -> Option<&Node> {
        self.controls.iter().find(|(n, _)| n == name).map(|(_, node)| node)
    }

    pub(crate) fn control_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.controls
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    /// Children in declaration order
    pub fn controls(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.controls.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Resolve a dotted path such as `"emailGroup.email"` or `"addresses.0.city"`
    pub fn get(&self, path: &str) -> Result<&Node> {
        let segments: Vec<&str> = path.split('.').collect();
        let (head, rest) = segments
            .split_first()
            .ok_or_else(|| FormError::NotFound(path.to_string()))?;
        self.control(head)
            .ok_or_else(|| FormError::NotFound(path.to_string()))?
            .get_segments(rest, path)
    }

    /// Mutable access to a descendant.
    ///
    /// Changes made through this reference do not recompute ancestors; use
    /// [`GroupNode::update_at`] when status must follow.
    pub fn get_mut(&mut self, path: &str) -> Result<&mut Node> {
        let segments: Vec<&str> = path.split('.').collect();
        let (head, rest) = segments
            .split_first()
            .ok_or_else(|| FormError::NotFound(path.to_string()))?;
        self.control_mut(head)
            .ok_or_else(|| FormError::NotFound(path.to_string()))?
            .get_segments_mut(rest, path)
    }

    /// Resolve a path to a field
    pub fn field(&self, path: &str) -> Result<&FieldNode> {
        self.get(path)?
            .as_field()
            .ok_or_else(|| FormError::NotAField(path.to_string()))
    }

    /// Resolve a path to a group
    pub fn group(&self, path: &str) -> Result<&GroupNode> {
        self.get(path)?
            .as_group()
            .ok_or_else(|| FormError::NotAGroup(path.to_string()))
    }

    /// Resolve a path to a collection
    pub fn collection(&self, path: &str) -> Result<&crate::CollectionNode> {
        self.get(path)?
            .as_collection()
            .ok_or_else(|| FormError::NotACollection(path.to_string()))
    }

    /// Mutate the node at `path`, then recompute every ancestor up to and
    /// including this group.
    pub fn update_at<R>(&mut self, path: &str, f: impl FnOnce(&mut Node) -> Result<R>) -> Result<R> {
        let segments: Vec<&str> = path.split('.').collect();
        self.update_segments(&segments, path, f)
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
        let child = self
            .control_mut(head)
            .ok_or_else(|| FormError::NotFound(full.to_string()))?;
        let result = child.update_segments(rest, full, f)?;
        self.update_status();
        Ok(result)
    }

    /// Set a field's value by path and revalidate everything above it
    pub fn set_value(&mut self, path: &str, value: impl Into<FieldValue>) -> Result<ValueChange> {
        let value = value.into();
        self.update_at(path, |node| {
            let field = node
                .as_field_mut()
                .ok_or_else(|| FormError::NotAField(path.to_string()))?;
            field.set_value(value);
            Ok(ValueChange::new(path, field.value().to_json()))
        })
    }

    /// Mark a node touched by path. Does not revalidate.
    pub fn mark_touched_at(&mut self, path: &str) -> Result<()> {
        self.get_mut(path)?.mark_touched();
        Ok(())
    }

    /// Replace a node's validators by path. Takes effect on the next revalidation.
    pub fn set_validators_at(&mut self, path: &str, validators: impl Into<ValidatorSet>) -> Result<()> {
        self.get_mut(path)?.set_validators(validators.into());
        Ok(())
    }

    /// Re-run validation on the node at `path` and on every ancestor
    pub fn revalidate_at(&mut self, path: &str) -> Result<()> {
        self.update_at(path, |node| {
            node.revalidate();
            Ok(())
        })
    }

    /// Disable the node at `path` and recompute its ancestors
    pub fn disable_at(&mut self, path: &str) -> Result<()> {
        self.update_at(path, |node| {
            node.disable();
            Ok(())
        })
    }

    /// Enable the node at `path` and recompute its ancestors
    pub fn enable_at(&mut self, path: &str) -> Result<()> {
        self.update_at(path, |node| {
            node.enable();
            Ok(())
        })
    }

    /// Merge a partial JSON object into matching descendants.
    ///
    /// Keys without a matching child are ignored and unspecified children
    /// keep their values. The patch is shape-checked before anything is
    /// applied, so a rejected patch leaves the tree untouched.
    pub fn patch_value(&mut self, patch: &Value) -> Result<Vec<ValueChange>> {
        self.check_patch(patch, "")?;
        let mut changes = Vec::new();
        self.apply_patch(patch, "", &mut changes);
        Ok(changes)
    }

    pub(crate) fn check_patch(&self, patch: &Value, path: &str) -> Result<()> {
        let object = patch
            .as_object()
            .ok_or_else(|| FormError::invalid_patch(path, "expected an object"))?;
        for (key, value) in object {
            if let Some(child) = self.control(key) {
                child.check_patch(value, &join_path(path, key))?;
            }
        }
        Ok(())
    }

    pub(crate) fn apply_patch(&mut self, patch: &Value, path: &str, changes: &mut Vec<ValueChange>) {
        if let Some(object) = patch.as_object() {
            for (key, value) in object {
                if let Some(child) = self.control_mut(key) {
                    child.apply_patch(value, &join_path(path, key), changes);
                }
            }
        }
        self.update_status();
    }

    /// Values of enabled children, keyed by name in declaration order
    pub fn value(&self) -> Value {
        let map: Map<String, Value> = self
            .controls
            .iter()
            .filter(|(_, node)| !node.is_disabled())
            .map(|(name, node)| (name.clone(), node.value()))
            .collect();
        Value::Object(map)
    }

    /// Values of all children, including disabled ones
    pub fn raw_value(&self) -> Value {
        let map: Map<String, Value> = self
            .controls
            .iter()
            .map(|(name, node)| (name.clone(), node.raw_value()))
            .collect();
        Value::Object(map)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_valid(&self) -> bool {
        self.status == Status::Valid
    }

    /// Failures of the group-level validators only
    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    pub fn validators(&self) -> &ValidatorSet {
        &self.validators
    }

    /// Replace group-level validators. Takes effect on the next revalidation.
    pub fn set_validators(&mut self, validators: impl Into<ValidatorSet>) {
        self.validators = validators.into();
    }

    /// Re-run validation on every descendant, then on the group itself
    pub fn revalidate(&mut self) {
        for (_, node) in &mut self.controls {
            node.revalidate();
        }
        self.update_status();
    }

    /// Recompute the group from its own validators and current child statuses
    pub(crate) fn update_status(&mut self) {
        if self.disabled {
            self.errors = None;
            self.status = Status::Disabled;
            return;
        }

        self.errors = self.validators.run(&*self).into_option();
        self.status = Status::aggregate(
            self.errors.is_some(),
            self.controls.iter().map(|(_, node)| node.status()),
        );
    }

    /// Dirty once any descendant has been changed
    pub fn is_dirty(&self) -> bool {
        self.controls.iter().any(|(_, node)| node.is_dirty())
    }

    pub fn is_pristine(&self) -> bool {
        !self.is_dirty()
    }

    /// Touched when marked directly or when any descendant is touched
    pub fn is_touched(&self) -> bool {
        self.touched || self.controls.iter().any(|(_, node)| node.is_touched())
    }

    pub fn mark_touched(&mut self) {
        self.touched = true;
    }

    /// Mark the group and every descendant as touched
    pub fn mark_all_touched(&mut self) {
        self.touched = true;
        for (_, node) in &mut self.controls {
            node.mark_all_touched();
        }
    }

    /// Reset every descendant to its initial value and clear interaction flags
    pub fn reset(&mut self) {
        self.touched = false;
        for (_, node) in &mut self.controls {
            node.reset();
        }
        self.update_status();
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Disable the group and all of its descendants
    pub fn disable(&mut self) {
        self.disabled = true;
        for (_, node) in &mut self.controls {
            node.disable();
        }
        self.update_status();
    }

    /// Enable the group and all of its descendants
    pub fn enable(&mut self) {
        self.disabled = false;
        for (_, node) in &mut self.controls {
            node.enable();
        }
        self.update_status();
    }
}

impl Control for GroupNode {
    fn scalar(&self) -> Option<&FieldValue> {
        None
    }

    fn is_pristine(&self) -> bool {
        !self.is_dirty()
    }

    fn child(&self, name: &str) -> Option<&dyn Control> {
        self.control(name).map(|node| node as &dyn Control)
    }
}
