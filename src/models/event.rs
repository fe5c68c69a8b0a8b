use std::fmt::Display;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::phase::{compute_phase, Phase};

use super::types::UtcDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: EventId,
    pub name: String,
    #[serde(alias = "opening_time")]
    pub registration_start: UtcDateTime,
    #[serde(alias = "closing_time")]
    pub registration_end: UtcDateTime,
}

impl Event {
    /// `None` when the backend sends a window that ends before it starts.
    pub fn submission_window(&self) -> Option<SubmissionWindow> {
        SubmissionWindow::new(
            self.registration_start.unix_millis(),
            self.registration_end.unix_millis(),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmissionWindow {
    start_millis: i64,
    end_millis: i64,
}

impl SubmissionWindow {
    pub fn new(start_millis: i64, end_millis: i64) -> Option<SubmissionWindow> {
        if start_millis > end_millis {
            return None;
        }

        Some(SubmissionWindow {
            start_millis,
            end_millis,
        })
    }

    pub fn start_millis(&self) -> i64 {
        self.start_millis
    }

    pub fn end_millis(&self) -> i64 {
        self.end_millis
    }

    pub fn phase_at(&self, now_millis: i64) -> Phase {
        compute_phase(now_millis, self.start_millis, self.end_millis)
    }
}
