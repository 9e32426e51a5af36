//! Patient profile.

use serde::{Deserialize, Serialize};

/// Patient identity shown on reports.
///
/// Both fields are opaque: they are stored and displayed verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// Patient display name
    pub name: String,
    /// Contact (usually a phone number)
    pub contact: String,
}

impl Profile {
    pub fn new(name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact: contact.into(),
        }
    }

    /// Check if neither field has been set.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.contact.is_empty()
    }

    /// Name for on-screen display, `---` when unset.
    pub fn display_name(&self) -> &str {
        placeholder(&self.name)
    }

    /// Contact for on-screen display, `---` when unset.
    pub fn display_contact(&self) -> &str {
        placeholder(&self.contact)
    }
}

fn placeholder(value: &str) -> &str {
    if value.trim().is_empty() {
        "---"
    } else {
        value
    }
}
