//! Event — notifications emitted by a rule edit session.

use serde::{Deserialize, Serialize};

use crate::id::{EventId, RulesetId};
use crate::time::{self, Timestamp};

/// What happened to the rule being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// The rule was edited; `valid` tells whether it can be saved.
    RuleChanged { valid: bool },
    /// The ruleset cannot be edited as a single JSON rule.
    RuleUnsupported,
    /// The rule was stored back into its ruleset.
    RulesetSaved,
}

/// A timestamped notification about a ruleset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub ruleset_id: RulesetId,
    #[serde(flatten)]
    pub kind: EventKind,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(ruleset_id: RulesetId, kind: EventKind) -> Self {
        Self {
            id: EventId::new(),
            ruleset_id,
            kind,
            timestamp: time::now(),
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ruleset = self.ruleset_id;
        match self.kind {
            EventKind::RuleChanged { valid } => {
                write!(f, "rule_changed({ruleset}, valid={valid})")
            }
            EventKind::RuleUnsupported => write!(f, "rule_unsupported({ruleset})"),
            EventKind::RulesetSaved => write!(f, "ruleset_saved({ruleset})"),
        }
    }
}
