//! Live clock reading the system time.

use chrono::{DateTime, Utc};

use crate::ports::clock::Clock;

/// System clock used to stamp cache records and digest manifests.
pub struct LiveClock;

impl Clock for LiveClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
