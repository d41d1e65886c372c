//! Replaying adapter for the Clock port.

use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::cassette::replayer::CassetteReplayer;
use crate::ports::clock::Clock;

/// Replays recorded clock values from a cassette.
pub struct ReplayingClock {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingClock {
    /// Creates a new replaying clock from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl Clock for ReplayingClock {
    /// # Panics
    ///
    /// Panics when the cassette holds no further `clock::now` readings; the
    /// port has no error channel and a replay that runs past its recording
    /// is a broken fixture.
    fn now(&self) -> DateTime<Utc> {
        let output = {
            let mut replayer =
                self.replayer.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            replayer.next_interaction("clock", "now").map(|i| i.output.clone())
        };
        output
            .and_then(|value| serde_json::from_value(value).map_err(|e| e.to_string()))
            .unwrap_or_else(|e| panic!("clock::now replay failed: {e}"))
    }
}
