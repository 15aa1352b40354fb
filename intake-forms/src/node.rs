// Polymorphic form node

use crate::{CollectionNode, FieldNode, FormError, GroupNode, Result, Status};
use intake_validation::{Control, FieldValue, ValidationErrors, ValidatorSet};
use serde::Serialize;
use serde_json::Value;

/// Change notification produced by every value mutation.
///
/// `path` is the dotted path from the root group, `value` the new value of
/// the node at that path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueChange {
    pub path: String,
    pub value: Value,
}

impl ValueChange {
    pub fn new(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }

    /// Whether this change happened at `path` or anywhere below it
    pub fn is_within(&self, path: &str) -> bool {
        if path.is_empty() {
            return true;
        }
        match self.path.strip_prefix(path) {
            Some("") => true,
            Some(rest) => rest.starts_with('.'),
            None => false,
        }
    }
}

/// Any node of the form tree
#[derive(Debug, Clone)]
pub enum Node {
    Field(FieldNode),
    Group(GroupNode),
    Collection(CollectionNode),
}

pub(crate) fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", prefix, segment)
    }
}

impl Node {
    /// Short name of the node variant
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Field(_) => "field",
            Node::Group(_) => "group",
            Node::Collection(_) => "collection",
        }
    }

    pub fn as_field(&self) -> Option<&FieldNode> {
        match self {
            Node::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_field_mut(&mut self) -> Option<&mut FieldNode> {
        match self {
            Node::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            Node::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut GroupNode> {
        match self {
            Node::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&CollectionNode> {
        match self {
            Node::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    pub fn as_collection_mut(&mut self) -> Option<&mut CollectionNode> {
        match self {
            Node::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// Value of the node, leaving out disabled descendants
    pub fn value(&self) -> Value {
        match self {
            Node::Field(field) => field.value().to_json(),
            Node::Group(group) => group.value(),
            Node::Collection(collection) => collection.value(),
        }
    }

    /// Value of the node, including disabled descendants
    pub fn raw_value(&self) -> Value {
        match self {
            Node::Field(field) => field.value().to_json(),
            Node::Group(group) => group.raw_value(),
            Node::Collection(collection) => collection.raw_value(),
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Node::Field(field) => field.status(),
            Node::Group(group) => group.status(),
            Node::Collection(collection) => collection.status(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status() == Status::Valid
    }

    /// Own failures of the node, not including children
    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            Node::Field(field) => field.errors(),
            Node::Group(group) => group.errors(),
            Node::Collection(collection) => collection.errors(),
        }
    }

    pub fn validators(&self) -> &ValidatorSet {
        match self {
            Node::Field(field) => field.validators(),
            Node::Group(group) => group.validators(),
            Node::Collection(collection) => collection.validators(),
        }
    }

    /// Replace the validator set. Takes effect on the next revalidation.
    pub fn set_validators(&mut self, validators: ValidatorSet) {
        match self {
            Node::Field(field) => field.set_validators(validators),
            Node::Group(group) => group.set_validators(validators),
            Node::Collection(collection) => collection.set_validators(validators),
        }
    }

    /// Re-run validators on this node and everything below it
    pub fn revalidate(&mut self) {
        match self {
            Node::Field(field) => field.revalidate(),
            Node::Group(group) => group.revalidate(),
            Node::Collection(collection) => collection.revalidate(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        match self {
            Node::Field(field) => field.is_dirty(),
            Node::Group(group) => group.is_dirty(),
            Node::Collection(collection) => collection.is_dirty(),
        }
    }

    pub fn is_pristine(&self) -> bool {
        !self.is_dirty()
    }

    pub fn is_touched(&self) -> bool {
        match self {
            Node::Field(field) => field.is_touched(),
            Node::Group(group) => group.is_touched(),
            Node::Collection(collection) => collection.is_touched(),
        }
    }

    pub fn mark_touched(&mut self) {
        match self {
            Node::Field(field) => field.mark_touched(),
            Node::Group(group) => group.mark_touched(),
            Node::Collection(collection) => collection.mark_touched(),
        }
    }

    /// Mark this node and every descendant as touched
    pub fn mark_all_touched(&mut self) {
        match self {
            Node::Field(field) => field.mark_touched(),
            Node::Group(group) => group.mark_all_touched(),
            Node::Collection(collection) => collection.mark_all_touched(),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Node::Field(field) => field.reset(),
            Node::Group(group) => group.reset(),
            Node::Collection(collection) => collection.reset(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        match self {
            Node::Field(field) => field.is_disabled(),
            Node::Group(group) => group.is_disabled(),
            Node::Collection(collection) => collection.is_disabled(),
        }
    }

    pub fn disable(&mut self) {
        match self {
            Node::Field(field) => field.disable(),
            Node::Group(group) => group.disable(),
            Node::Collection(collection) => collection.disable(),
        }
    }

    pub fn enable(&mut self) {
        match self {
            Node::Field(field) => field.enable(),
            Node::Group(group) => group.enable(),
            Node::Collection(collection) => collection.enable(),
        }
    }

    /// Resolve the remaining path segments below this node
    pub(crate) fn get_segments(&self, segments: &[&str], full: &str) -> Result<&Node> {
        let Some((head, rest)) = segments.split_first() else {
            return Ok(self);
        };
        let child = match self {
            Node::Field(_) => None,
            Node::Group(group) => group.control(head),
            Node::Collection(collection) => collection.entry_node(head),
        };
        child
            .ok_or_else(|| FormError::NotFound(full.to_string()))?
            .get_segments(rest, full)
    }

    pub(crate) fn get_segments_mut(&mut self, segments: &[&str], full: &str) -> Result<&mut Node> {
        let Some((head, rest)) = segments.split_first() else {
            return Ok(self);
        };
        let child = match self {
            Node::Field(_) => None,
            Node::Group(group) => group.control_mut(head),
            Node::Collection(collection) => collection.entry_node_mut(head),
        };
        child
            .ok_or_else(|| FormError::NotFound(full.to_string()))?
            .get_segments_mut(rest, full)
    }

    /// Walk to the node at `segments`, apply `f`, then recompute every
    /// node on the way back up.
    pub(crate) fn update_segments<R>(
        &mut self,
        segments: &[&str],
        full: &str,
        f: impl FnOnce(&mut Node) -> Result<R>,
    ) -> Result<R> {
        if segments.is_empty() {
            return f(self);
        }
        match self {
            Node::Field(_) => Err(FormError::NotFound(full.to_string())),
            Node::Group(group) => group.update_segments(segments, full, f),
            Node::Collection(collection) => collection.update_segments(segments, full, f),
        }
    }

    /// Check that `patch` fits the shape of this node without applying it
    pub(crate) fn check_patch(&self, patch: &Value, path: &str) -> Result<()> {
        match self {
            Node::Field(_) => FieldValue::from_json(patch)
                .map(|_| ())
                .ok_or_else(|| FormError::invalid_patch(path, "expected a scalar value")),
            Node::Group(group) => group.check_patch(patch, path),
            Node::Collection(collection) => collection.check_patch(patch, path),
        }
    }

    /// Apply a shape-checked patch, recording one change per patched field
    pub(crate) fn apply_patch(&mut self, patch: &Value, path: &str, changes: &mut Vec<ValueChange>) {
        match self {
            Node::Field(field) => {
                if let Some(value) = FieldValue::from_json(patch) {
                    field.set_value(value);
                    changes.push(ValueChange::new(path, field.value().to_json()));
                }
            }
            Node::Group(group) => group.apply_patch(patch, path, changes),
            Node::Collection(collection) => collection.apply_patch(patch, path, changes),
        }
    }
}

impl Control for Node {
    fn scalar(&self) -> Option<&FieldValue> {
        self.as_field().map(|field| field.value())
    }

    fn is_pristine(&self) -> bool {
        !self.is_dirty()
    }

    fn child(&self, name: &str) -> Option<&dyn Control> {
        match self {
            Node::Field(_) => None,
            Node::Group(group) => group.control(name).map(|n| n as &dyn Control),
            Node::Collection(collection) => collection.entry_node(name).map(|n| n as &dyn Control),
        }
    }
}

impl From<FieldNode> for Node {
    fn from(field: FieldNode) -> Self {
        Node::Field(field)
    }
}

impl From<GroupNode> for Node {
    fn from(group: GroupNode) -> Self {
        Node::Group(group)
    }
}

impl From<CollectionNode> for Node {
    fn from(collection: CollectionNode) -> Self {
        Node::Collection(collection)
    }
}
