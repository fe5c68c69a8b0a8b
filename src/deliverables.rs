use tracing::warn;

use crate::{
    api::DeliverableFlagSource,
    models::{types::UtcDateTime, DeliverableFlag, EventId, SubmissionStatus},
};

pub fn get_submission_status_at(
    flag: Option<&DeliverableFlag>,
    now: UtcDateTime,
) -> SubmissionStatus {
    let flag = match flag {
        Some(flag) if flag.is_enabled => flag,
        _ => return SubmissionStatus::Disabled,
    };

    if now < flag.starttime {
        SubmissionStatus::Locked
    } else if now > flag.deadline {
        SubmissionStatus::Closed
    } else {
        SubmissionStatus::Open
    }
}

pub fn get_submission_status(flag: Option<&DeliverableFlag>) -> SubmissionStatus {
    get_submission_status_at(flag, UtcDateTime::now())
}

pub fn can_submit_deliverable_at(flag: Option<&DeliverableFlag>, now: UtcDateTime) -> bool {
    get_submission_status_at(flag, now) == SubmissionStatus::Open
}

pub fn can_submit_deliverable(flag: Option<&DeliverableFlag>) -> bool {
    can_submit_deliverable_at(flag, UtcDateTime::now())
}

#[derive(Clone, Debug, Default)]
pub struct DeliverableFlags {
    flags: Vec<DeliverableFlag>,
}

impl DeliverableFlags {
    pub fn new(flags: Vec<DeliverableFlag>) -> DeliverableFlags {
        DeliverableFlags { flags }
    }

    /// A failed fetch yields an empty set, in which every deliverable is disabled.
    pub async fn fetch<S>(source: &S, event_id: EventId) -> DeliverableFlags
    where
        S: DeliverableFlagSource + ?Sized,
    {
        match source.fetch_deliverable_flags(event_id).await {
            Ok(flags) => DeliverableFlags::new(
                flags
                    .into_iter()
                    .filter(|flag| flag.event_id == event_id)
                    .collect(),
            ),
            Err(err) => {
                warn!("Could not fetch deliverable flags of event {event_id}: {err}");
                DeliverableFlags::default()
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&DeliverableFlag> {
        self.flags.iter().find(|flag| flag.id == id)
    }

    pub fn status_at(&self, id: &str, now: UtcDateTime) -> SubmissionStatus {
        get_submission_status_at(self.get(id), now)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeliverableFlag> {
        self.flags.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
