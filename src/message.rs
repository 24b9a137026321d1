//! The record carried across the bridge.
//!
//! A [`Message`] names an action and carries positional string arguments.
//! For example, the action `"regenerate apprc"` could receive one argument:
//! the name of the app whose apprc file should be regenerated.
//!
//! Nothing is enforced on either field. Empty actions and empty argument
//! lists survive the trip unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default capacity of every bounded queue created by this crate.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// A deferred command: an action plus ordered arguments.
///
/// Serialized as a MessagePack map with named fields. Unknown fields are
/// ignored and a missing `args` decodes as empty, so readers and writers
/// can gain fields independently.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    /// Operation to perform.
    pub action: String,
    /// Positional arguments to the action. Order is preserved.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Message {
    /// Create a message from an action and its arguments.
    pub fn new<A, I, S>(action: A, args: I) -> Self
    where
        A: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            action: action.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a message with no arguments.
    pub fn action_only(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            args: Vec::new(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.action)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
