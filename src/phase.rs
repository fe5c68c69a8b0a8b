use strum::Display;
use time::OffsetDateTime;
use tokio::time::Instant;

use crate::models::types::UtcDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Before,
    During,
    After,
}

pub fn compute_phase(now_millis: i64, start_millis: i64, end_millis: i64) -> Phase {
    if now_millis < start_millis {
        Phase::Before
    } else if now_millis < end_millis {
        Phase::During
    } else {
        Phase::After
    }
}

pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;

    fn now(&self) -> UtcDateTime {
        UtcDateTime::from_unix_millis(self.now_millis()).unwrap_or_else(UtcDateTime::now)
    }
}

/// Wall time sampled once, then advanced with `tokio::time::Instant`.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    anchor_instant: Instant,
    anchor_millis: i64,
}

impl SystemClock {
    pub fn new() -> SystemClock {
        SystemClock::starting_at(UtcDateTime::from(OffsetDateTime::now_utc()).unix_millis())
    }

    pub fn starting_at(unix_millis: i64) -> SystemClock {
        SystemClock {
            anchor_instant: Instant::now(),
            anchor_millis: unix_millis,
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        let elapsed = Instant::now().saturating_duration_since(self.anchor_instant);
        self.anchor_millis + elapsed.as_millis() as i64
    }
}
