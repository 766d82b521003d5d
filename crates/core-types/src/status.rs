use serde::{Deserialize, Serialize};

/// The single user-visible status slot.
///
/// Whichever coordinator is active owns it until it settles. Only one error
/// message is held at a time; the last writer wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusState {
    pub busy: bool,
    pub error: Option<String>,
}
