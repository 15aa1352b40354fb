// Customer Intake - validation and state engine for a customer intake form
//
// The form tree, validators and configuration live in the member crates; this
// crate assembles the customer schema, wires its reactions and timers, and
// provides the save boundary and logging setup.

//! # Examples
//!
//! ```no_run
//! use customer_intake::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> customer_intake::Result<()> {
//!     let _guard = LogConfig::default().init()?;
//!
//!     let config = FormConfig::load(Some("intake.toml"))?;
//!     let form = CustomerForm::new(config, Arc::new(TracingSink));
//!
//!     form.set_value("firstName", "Jack")?;
//!     form.set_value("notification", Notification::Text)?;
//!     assert_eq!(form.status(), Status::Invalid);
//!
//!     form.save()?;
//!     Ok(())
//! }
//! ```

pub mod customer;
mod error;
mod form;
pub mod logging;
mod sink;

pub use error::{IntakeError, Result};
pub use form::CustomerForm;
pub use sink::{FormSnapshot, RecordingSink, SaveSink, TracingSink};

// Re-export member crates
pub use intake_config;
pub use intake_forms;
pub use intake_validation;

// Prelude for common imports
pub mod prelude {
    pub use crate::customer::{Customer, Notification};
    pub use crate::logging::{LogConfig, LogFormat, LogLevel, LogOutput};
    pub use crate::{
        CustomerForm, FormSnapshot, IntakeError, RecordingSink, SaveSink, TracingSink,
    };
    pub use intake_config::FormConfig;
    pub use intake_forms::{FormError, GroupNode, Node, Status, ValueChange};
    pub use intake_validation::{ErrorKey, FieldValue};
}
