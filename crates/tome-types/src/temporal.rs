use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Hybrid logical clock timestamp used as a commit's date.
///
/// Wall-clock milliseconds plus a logical counter. Two commits made within
/// the same millisecond still get distinct, ordered dates, which keeps
/// history scans that compare dates total.
///
/// Ordering: `physical_ms` then `logical`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemporalAnchor {
    /// Wall-clock milliseconds since UNIX epoch.
    pub physical_ms: u64,
    /// Tie breaker for events in the same millisecond.
    pub logical: u32,
}

impl TemporalAnchor {
    pub fn new(physical_ms: u64, logical: u32) -> Self {
        Self {
            physical_ms,
            logical,
        }
    }

    /// Anchor for the current wall-clock time.
    pub fn now() -> Self {
        Self::new(wall_clock_ms(), 0)
    }

    pub const fn zero() -> Self {
        Self {
            physical_ms: 0,
            logical: 0,
        }
    }

    /// The current time, moved forward if needed so that it is strictly
    /// after `previous`.
    pub fn successor_of(previous: &Self) -> Self {
        let now_ms = wall_clock_ms();
        if now_ms > previous.physical_ms {
            Self::new(now_ms, 0)
        } else {
            Self::new(previous.physical_ms, previous.logical + 1)
        }
    }

    pub fn is_after(&self, other: &Self) -> bool {
        self > other
    }

    pub fn is_before(&self, other: &Self) -> bool {
        self < other
    }

    /// Whole seconds since UNIX epoch, for formats that only carry seconds.
    pub fn unix_seconds(&self) -> u64 {
        self.physical_ms / 1000
    }
}

fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

impl PartialOrd for TemporalAnchor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TemporalAnchor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.physical_ms
            .cmp(&other.physical_ms)
            .then(self.logical.cmp(&other.logical))
    }
}

impl fmt::Debug for TemporalAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TemporalAnchor({}ms.{})", self.physical_ms, self.logical)
    }
}

impl fmt::Display for TemporalAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.physical_ms, self.logical)
    }
}
