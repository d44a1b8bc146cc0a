//! Save-status shown in the editor header

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::fmt;

/// Inputs the header renders from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusFlags {
    pub saving: bool,
    pub dirty: bool,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub failed: bool,
    pub conflict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SaveStatus {
    Ready,
    Typing,
    Saving,
    Saved { at: DateTime<Utc> },
    Failed,
    Conflict,
}

impl SaveStatus {
    pub fn from_flags(flags: StatusFlags) -> Self {
        if flags.conflict {
            SaveStatus::Conflict
        } else if flags.saving {
            SaveStatus::Saving
        } else if flags.dirty && flags.failed {
            SaveStatus::Failed
        } else if flags.dirty {
            SaveStatus::Typing
        } else if let Some(at) = flags.last_saved_at {
            SaveStatus::Saved { at }
        } else {
            SaveStatus::Ready
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, SaveStatus::Saved { .. })
    }
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStatus::Ready => f.write_str("Ready"),
            SaveStatus::Typing => f.write_str("Typing..."),
            SaveStatus::Saving => f.write_str("Saving…"),
            SaveStatus::Saved { at } => {
                write!(f, "Saved • {}", at.with_timezone(&Local).format("%H:%M:%S"))
            }
            SaveStatus::Failed => f.write_str("Save failed"),
            SaveStatus::Conflict => f.write_str("Version conflict"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        let now = Utc::now();

        assert_eq!(SaveStatus::from_flags(StatusFlags::default()), SaveStatus::Ready);

        let saved = StatusFlags {
            last_saved_at: Some(now),
            ..StatusFlags::default()
        };
        assert_eq!(SaveStatus::from_flags(saved), SaveStatus::Saved { at: now });

        let typing = StatusFlags {
            dirty: true,
            ..saved
        };
        assert_eq!(SaveStatus::from_flags(typing), SaveStatus::Typing);

        let failed = StatusFlags {
            failed: true,
            ..typing
        };
        assert_eq!(SaveStatus::from_flags(failed), SaveStatus::Failed);

        let saving = StatusFlags {
            saving: true,
            ..failed
        };
        assert_eq!(SaveStatus::from_flags(saving), SaveStatus::Saving);

        let conflict = StatusFlags {
            conflict: true,
            ..saving
        };
        assert_eq!(SaveStatus::from_flags(conflict), SaveStatus::Conflict);
    }

    #[test]
    fn test_labels() {
        assert_eq!(SaveStatus::Ready.to_string(), "Ready");
        assert_eq!(SaveStatus::Typing.to_string(), "Typing...");
        assert_eq!(SaveStatus::Saving.to_string(), "Saving…");
        assert!(SaveStatus::Saved { at: Utc::now() }
            .to_string()
            .starts_with("Saved • "));
        assert!(!SaveStatus::Failed.is_saved());
    }
}
