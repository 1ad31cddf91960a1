//! Test fixtures shared across itemgate crates.
//!
//! These helpers are public so that integration tests in downstream crates
//! can use them; they are not meant for production wiring.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;

use crate::clock::Clock;
use crate::model::Item;

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Creates a clock frozen at 2024-01-01T00:00:00Z.
    #[must_use]
    pub fn at_epoch() -> Self {
        Self::new(fixed_instant())
    }

    /// Moves the clock forward (or backward, for negative durations).
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Sets the clock to an absolute instant.
    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock() = at;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::at_epoch()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// A fixed, well-known instant.
#[must_use]
pub fn fixed_instant() -> DateTime<Utc> {
    Utc.timestamp_opt(1_704_067_200, 0)
        .single()
        .unwrap_or_default()
}

/// Builds an item with both timestamps at [`fixed_instant`].
#[must_use]
pub fn sample_item(id: &str, name: &str) -> Item {
    let at = fixed_instant();
    Item {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        created_at: at,
        updated_at: at,
    }
}

/// A syntactically valid three-segment bearer token whose payload is
/// `{"sub":"<subject>"}`. The signature segment is a placeholder.
#[must_use]
pub fn jwt_for(subject: &str) -> String {
    let payload = serde_json::json!({ "sub": subject }).to_string();
    format!(
        "eyJhbGciOiJub25lIn0.{}.c2lnbmF0dXJl",
        URL_SAFE_NO_PAD.encode(payload)
    )
}
