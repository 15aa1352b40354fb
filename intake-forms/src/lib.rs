//! Form node tree for the customer intake form
//!
//! A form is a tree of [`Node`]s: [`FieldNode`] leaves, [`GroupNode`]s of
//! named children and [`CollectionNode`]s of index-addressed groups. Every
//! node carries a [`ValidatorSet`](intake_validation::ValidatorSet), its
//! current failures and an aggregated [`Status`].
//!
//! Mutations go through the root group by dotted path and return
//! [`ValueChange`] events. A [`RevalidationEngine`] turns those events into
//! reactions, either immediately or through a [`Debouncer`].
//!
//! # Examples
//!
//! ## Cross-field Rules
//!
//! ```
//! use intake_forms::{FieldNode, GroupNode, Status};
//! use intake_validation::{validators, ErrorKey};
//!
//! let mut form = GroupNode::new().with_control(
//!     "emailGroup",
//!     GroupNode::new()
//!         .with_control("email", FieldNode::new(""))
//!         .with_control("confirmEmail", FieldNode::new(""))
//!         .with_validators(vec![validators::matching("email", "confirmEmail")]),
//! );
//!
//! form.set_value("emailGroup.email", "jack@torchwood.uk").unwrap();
//! form.set_value("emailGroup.confirmEmail", "jack@torchwood.org").unwrap();
//!
//! let group = form.group("emailGroup").unwrap();
//! assert!(group.errors().unwrap().contains(ErrorKey::Match));
//! assert_eq!(form.status(), Status::Invalid);
//! ```
//!
//! ## Conditional Validators
//!
//! ```
//! use intake_forms::{toggle_validators, FieldNode, GroupNode, RevalidationEngine, Status};
//! use intake_validation::validators;
//!
//! let mut form = GroupNode::new()
//!     .with_control("phone", FieldNode::new(""))
//!     .with_control("notification", FieldNode::new("email"));
//!
//! let mut engine = RevalidationEngine::new();
//! engine.watch(
//!     "notification",
//!     toggle_validators("phone", |v| v.as_str() == Some("text"), vec![validators::required()]),
//! );
//!
//! let change = form.set_value("notification", "text").unwrap();
//! engine.dispatch(&change, &mut form).unwrap();
//! assert_eq!(form.status(), Status::Invalid);
//! ```

mod collection;
mod debounce;
mod engine;
mod error;
mod field;
mod group;
mod messages;
mod node;
mod status;

pub use collection::*;
pub use debounce::*;
pub use engine::*;
pub use error::*;
pub use field::*;
pub use group::*;
pub use messages::*;
pub use node::{Node, ValueChange};
pub use status::*;
