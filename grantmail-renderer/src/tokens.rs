//! The five placeholder tokens and their per-record values.

use grantmail_core::types::{EvalReturned, Record};

pub const PARTICIPANT_NAME: &str = "${PARTICIPANT_NAME}";
pub const REVIEWER_NAME: &str = "${REVIEWER_NAME}";
pub const GRANT_NAME: &str = "${GRANT_NAME}";
pub const EVAL_RETURNED: &str = "${EVAL_RETURNED}";
pub const OPERATIONS_MANAGER: &str = "${OPERATIONS_MANAGER}";

/// Every recognized token, in substitution order.
pub const ALL_TOKENS: [&str; 5] = [
    PARTICIPANT_NAME,
    REVIEWER_NAME,
    GRANT_NAME,
    EVAL_RETURNED,
    OPERATIONS_MANAGER,
];

/// Reviewers are assigned after the emails are drafted, so this is never
/// filled from the sheet.
pub const REVIEWER_PLACEHOLDER: &str = "[REVIEWER NAME HERE]";

/// Stand-in for an evaluation that has not come back yet.
pub const EVAL_PENDING: &str = "[RETURN DATE HERE]";

/// Ordered token → replacement pairs for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMap {
    pairs: Vec<(&'static str, String)>,
}

impl TokenMap {
    pub fn for_record(record: &Record, operations_manager: &str) -> Self {
        let eval = match &record.evaluation_returned {
            EvalReturned::Returned(s) => s.clone(),
            EvalReturned::Pending => EVAL_PENDING.to_string(),
        };
        Self {
            pairs: vec![
                (PARTICIPANT_NAME, record.name.0.clone()),
                (REVIEWER_NAME, REVIEWER_PLACEHOLDER.to_string()),
                (GRANT_NAME, record.grant.clone()),
                (EVAL_RETURNED, eval),
                (OPERATIONS_MANAGER, operations_manager.to_string()),
            ],
        }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.pairs.iter().map(|(t, v)| (*t, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
