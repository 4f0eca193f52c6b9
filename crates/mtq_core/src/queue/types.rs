//! Queue status enums and item attributes.

use serde::{Deserialize, Serialize};

/// Well-known item attribute keys.
pub mod attributes {
    /// Run the optimize pass for this item regardless of settings.
    pub const OPTIMIZE: &str = "optimize";
    /// Organize alternate groups when writing.
    pub const ORGANIZE: &str = "organize";
    /// Source is large enough to need 64-bit data offsets.
    pub const DATA_64BIT: &str = "64bit_data";
}

/// Size above which an item is flagged for 64-bit data offsets.
pub const LARGE_FILE_THRESHOLD: u64 = 3_800_000_000;

/// Per-item status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemStatus {
    /// Waiting to be processed.
    #[default]
    Ready,
    /// Being configured by the user; skipped by the runner.
    Editing,
    /// Being processed; the action list is frozen.
    Working,
    Completed,
    Failed,
    Cancelled,
}

impl ItemStatus {
    /// Check whether the state machine allows moving to `next`.
    ///
    /// Leaving a terminal state requires an explicit reset and is not a
    /// transition.
    pub fn can_transition_to(self, next: ItemStatus) -> bool {
        use ItemStatus::*;
        matches!(
            (self, next),
            (Ready, Editing)
                | (Editing, Ready)
                | (Ready, Working)
                | (Working, Completed)
                | (Working, Failed)
                | (Working, Cancelled)
        )
    }

    /// Check if this is a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Check if actions may still be added or removed.
    pub fn is_editable(self) -> bool {
        matches!(self, Self::Ready | Self::Editing)
    }

    /// Get display string for UI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Editing => "Editing",
            Self::Working => "Working",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Numeric code used in the persisted queue.
    pub fn code(self) -> u8 {
        match self {
            Self::Ready => 0,
            Self::Editing => 1,
            Self::Working => 2,
            Self::Completed => 3,
            Self::Failed => 4,
            Self::Cancelled => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Ready,
            1 => Self::Editing,
            2 => Self::Working,
            3 => Self::Completed,
            4 => Self::Failed,
            5 => Self::Cancelled,
            _ => return None,
        })
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate status of the whole queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueueStatus {
    /// No run has happened yet.
    #[default]
    Unknown,
    Working,
    /// The last run finished and every item succeeded.
    Completed,
    /// The last run finished with at least one failed item.
    Failed,
    /// The last run was stopped.
    Cancelled,
}

/// Value stored in an item's attribute bag.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl AttributeValue {
    /// Truthiness used for flag attributes.
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Integer(i) => *i != 0,
            Self::Text(s) => matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ItemStatus::*;

    const ALL: [ItemStatus; 6] = [Ready, Editing, Working, Completed, Failed, Cancelled];

    #[test]
    fn terminal_states_have_no_exits() {
        for from in [Completed, Failed, Cancelled] {
            for to in ALL {
                assert!(!from.can_transition_to(to), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn working_only_from_ready() {
        for from in ALL {
            assert_eq!(from.can_transition_to(Working), from == Ready);
        }
        assert!(Ready.can_transition_to(Editing));
        assert!(Editing.can_transition_to(Ready));
        assert!(!Working.can_transition_to(Ready));
        assert!(!Working.can_transition_to(Editing));
    }

    #[test]
    fn codes_round_trip() {
        for status in ALL {
            assert_eq!(ItemStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(ItemStatus::from_code(42), None);
    }

    #[test]
    fn attribute_truthiness() {
        assert!(AttributeValue::from(true).as_bool());
        assert!(AttributeValue::from(1i64).as_bool());
        assert!(AttributeValue::from("yes").as_bool());
        assert!(!AttributeValue::from("no").as_bool());
    }
}
