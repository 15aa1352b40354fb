// Reactive revalidation engine

use crate::{Debouncer, GroupNode, Result, ValueChange};
use intake_validation::ValidatorSet;
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Synchronous reaction to a value change.
///
/// Receives the change and the root group so it can reach any sibling.
/// Reactions must be idempotent: running one twice for the same change
/// leaves the tree as running it once does.
pub type Reaction = Box<dyn Fn(&ValueChange, &mut GroupNode) -> Result<()> + Send + Sync>;

/// Handle returned by a watch registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

enum Listener {
    Immediate(Reaction),
    Debounced(Debouncer),
}

struct Watch {
    id: WatchId,
    path: String,
    listener: Listener,
}

/// Path-keyed registry of reactions to value changes.
///
/// A watch on a group path fires for changes anywhere below it; a watch on
/// the empty path covers the whole form. Immediate
/// reactions run inside [`RevalidationEngine::dispatch`], so the tree is
/// consistent when it returns. Debounced watches only poke their
/// [`Debouncer`]; the debounced work runs later on the runtime.
///
/// Changes made by a reaction are not dispatched again.
#[derive(Default)]
pub struct RevalidationEngine {
    watches: Vec<Watch>,
    next_id: u64,
}

impl RevalidationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an immediate reaction for changes at or below `path`
    pub fn watch<F>(&mut self, path: impl Into<String>, reaction: F) -> WatchId
    where
        F: Fn(&ValueChange, &mut GroupNode) -> Result<()> + Send + Sync + 'static,
    {
        self.register(path.into(), Listener::Immediate(Box::new(reaction)))
    }

    /// Register a debounced watch for changes at or below `path`
    pub fn watch_debounced(&mut self, path: impl Into<String>, debouncer: Debouncer) -> WatchId {
        self.register(path.into(), Listener::Debounced(debouncer))
    }

    fn register(&mut self, path: String, listener: Listener) -> WatchId {
        let id = WatchId(self.next_id);
        self.next_id += 1;

        let kind = match listener {
            Listener::Immediate(_) => "immediate",
            Listener::Debounced(_) => "debounced",
        };
        debug!("Registered {} watch {:?} on '{}'", kind, id, path);

        self.watches.push(Watch { id, path, listener });
        id
    }

    /// Remove a watch. Dropping a debounced watch cancels its pending run.
    pub fn unwatch(&mut self, id: WatchId) -> bool {
        let before = self.watches.len();
        self.watches.retain(|watch| watch.id != id);
        self.watches.len() != before
    }

    pub fn len(&self) -> usize {
        self.watches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }

    /// Run every watch whose path covers the change, in registration order.
    ///
    /// Stops at the first failing reaction.
    pub fn dispatch(&self, change: &ValueChange, root: &mut GroupNode) -> Result<()> {
        for watch in &self.watches {
            if !change.is_within(&watch.path) {
                continue;
            }

            match &watch.listener {
                Listener::Immediate(reaction) => {
                    debug!("Dispatching change at '{}' to watch on '{}'", change.path, watch.path);
                    reaction(change, root)?;
                }
                Listener::Debounced(debouncer) => debouncer.trigger(),
            }
        }
        Ok(())
    }

    /// Dispatch a batch of changes in order
    pub fn dispatch_all(&self, changes: &[ValueChange], root: &mut GroupNode) -> Result<()> {
        for change in changes {
            self.dispatch(change, root)?;
        }
        Ok(())
    }
}

impl fmt::Debug for RevalidationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paths: Vec<&str> = self.watches.iter().map(|w| w.path.as_str()).collect();
        f.debug_struct("RevalidationEngine")
            .field("watches", &paths)
            .finish()
    }
}

/// Reaction that attaches `validators` to `dependent` while `predicate`
/// holds for the changed value, and clears them otherwise. The dependent is
/// revalidated and its ancestors recomputed either way.
pub fn toggle_validators<P>(
    dependent: impl Into<String>,
    predicate: P,
    validators: impl Into<ValidatorSet>,
) -> impl Fn(&ValueChange, &mut GroupNode) -> Result<()> + Send + Sync + 'static
where
    P: Fn(&Value) -> bool + Send + Sync + 'static,
{
    let dependent = dependent.into();
    let validators = validators.into();

    move |change: &ValueChange, root: &mut GroupNode| {
        let next = if predicate(&change.value) {
            validators.clone()
        } else {
            ValidatorSet::new()
        };
        root.set_validators_at(&dependent, next)?;
        root.revalidate_at(&dependent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldNode, FormError, Status};
    use intake_validation::validators::required;
    use intake_validation::ErrorKey;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn contact() -> GroupNode {
        GroupNode::new()
            .with_control("phone", FieldNode::new(""))
            .with_control("notification", FieldNode::new("email"))
    }

    fn wants_text(value: &Value) -> bool {
        value.as_str() == Some("text")
    }

    #[test]
    fn test_toggle_attaches_and_clears() {
        let mut root = contact();
        let mut engine = RevalidationEngine::new();
        engine.watch("notification", toggle_validators("phone", wants_text, vec![required()]));

        let change = root.set_value("notification", "text").unwrap();
        engine.dispatch(&change, &mut root).unwrap();
        assert!(root.field("phone").unwrap().has_error(ErrorKey::Required));
        assert_eq!(root.status(), Status::Invalid);

        let change = root.set_value("notification", "email").unwrap();
        engine.dispatch(&change, &mut root).unwrap();
        assert!(root.field("phone").unwrap().errors().is_none());
        assert!(root.field("phone").unwrap().validators().is_empty());
        assert_eq!(root.status(), Status::Valid);
    }

    #[test]
    fn test_toggle_is_idempotent() {
        let mut root = contact();
        let mut engine = RevalidationEngine::new();
        engine.watch("notification", toggle_validators("phone", wants_text, vec![required()]));

        let change = root.set_value("notification", "text").unwrap();
        engine.dispatch(&change, &mut root).unwrap();
        engine.dispatch(&change, &mut root).unwrap();

        let phone = root.field("phone").unwrap();
        assert_eq!(phone.validators().len(), 1);
        assert_eq!(phone.errors().unwrap().len(), 1);
    }

    #[test]
    fn test_group_watch_sees_descendant_changes() {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = hits.clone();

        let mut root = GroupNode::new().with_control(
            "emailGroup",
            GroupNode::new().with_control("email", FieldNode::new("")),
        );
        let mut engine = RevalidationEngine::new();
        engine.watch("emailGroup", move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let change = root.set_value("emailGroup.email", "a@b.com").unwrap();
        engine.dispatch(&change, &mut root).unwrap();
        engine
            .dispatch(&ValueChange::new("emailGroupX", json!(1)), &mut root)
            .unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_root_watch_sees_every_change() {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = hits.clone();

        let mut root = contact();
        let mut engine = RevalidationEngine::new();
        engine.watch("", move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        for (path, value) in [("phone", "1"), ("notification", "text")] {
            let change = root.set_value(path, value).unwrap();
            engine.dispatch(&change, &mut root).unwrap();
        }
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unwatch() {
        let mut engine = RevalidationEngine::new();
        let id = engine.watch("phone", |_, _| Ok(()));
        assert_eq!(engine.len(), 1);
        assert!(engine.unwatch(id));
        assert!(!engine.unwatch(id));
        assert!(engine.is_empty());
    }

    #[test]
    fn test_reaction_error_propagates() {
        let mut root = contact();
        let mut engine = RevalidationEngine::new();
        engine.watch("notification", toggle_validators("missing", wants_text, vec![required()]));

        let change = root.set_value("notification", "text").unwrap();
        assert_eq!(
            engine.dispatch(&change, &mut root).unwrap_err(),
            FormError::NotFound("missing".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_watch_triggers() {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = hits.clone();
        let debouncer = Debouncer::spawn(std::time::Duration::from_millis(100), move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let mut root = contact();
        let mut engine = RevalidationEngine::new();
        engine.watch_debounced("phone", debouncer);

        for digit in ["5", "55", "555"] {
            let change = root.set_value("phone", digit).unwrap();
            engine.dispatch(&change, &mut root).unwrap();
        }
        tokio::time::sleep(std::time::Duration::from_millis(150)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
