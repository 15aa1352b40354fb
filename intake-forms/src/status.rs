// Node status

use serde::{Deserialize, Serialize};
use std::fmt;

/// Validation status of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// All attached rules pass and no enabled child is invalid
    #[default]
    Valid,
    /// A rule failed on this node or an enabled child is invalid
    Invalid,
    /// Excluded from validation and from its parent's value
    Disabled,
    /// Awaiting an asynchronous rule. No rule in this crate produces it.
    Pending,
}

impl Status {
    /// Fold own failures and child statuses into a parent status.
    ///
    /// Disabled children are ignored.
    pub fn aggregate(own_failed: bool, children: impl IntoIterator<Item = Status>) -> Status {
        if own_failed {
            return Status::Invalid;
        }

        let mut pending = false;
        for status in children {
            match status {
                Status::Invalid => return Status::Invalid,
                Status::Pending => pending = true,
                Status::Valid | Status::Disabled => {}
            }
        }

        if pending { Status::Pending } else { Status::Valid }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Valid => "VALID",
            Status::Invalid => "INVALID",
            Status::Disabled => "DISABLED",
            Status::Pending => "PENDING",
        };
        f.write_str(name)
    }
}
