use chrono::{DateTime, Utc};
use serde::Serialize;

/// State of the bounded correction window attached to a review instance.
///
/// Every instance starts `Open` because `locked_at` is set in the future at
/// creation. There is no terminal state: an `Expired` instance stays
/// editable forever through a manager override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    Open,
    Expired,
}

impl WindowState {
    pub fn of(locked_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now < locked_at {
            WindowState::Open
        } else {
            WindowState::Expired
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, WindowState::Open)
    }
}

/// Rejection raised when a write reaches an expired instance without an
/// override. The message names the escalation path deliberately; the UI
/// surfaces it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("update window expired at {locked_at}; ask a manager to resubmit with an override")]
pub struct WindowExpired {
    pub locked_at: DateTime<Utc>,
}

/// Admission rule for a write against an existing instance, evaluated once
/// per submission using the instance's single `locked_at` value.
pub fn admit(
    locked_at: DateTime<Utc>,
    now: DateTime<Utc>,
    manager_override: bool,
) -> Result<WindowState, WindowExpired> {
    let state = WindowState::of(locked_at, now);
    if state.is_open() || manager_override {
        Ok(state)
    } else {
        Err(WindowExpired { locked_at })
    }
}
