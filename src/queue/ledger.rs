//! Record of alarms already emitted.

use crate::appointment::{Alarm, Appointment};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashSet;

/// Identity of one alarm: its appointment and its instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct AlarmKey {
    uid: String,
    time: DateTime<Utc>,
}

impl AlarmKey {
    pub(crate) fn of(appointment: &Appointment, alarm: &Alarm) -> Self {
        Self {
            uid: appointment.uid.clone(),
            time: alarm.time,
        }
    }
}

/// How long a fired key is kept after the planner stops reporting it.
const RETENTION_DAYS: i64 = 7;

/// In-memory fired-alarm ledger.
///
/// The queue rebuilds its candidates from the planner on every
/// re-evaluation. A planner may keep reporting an alarm for a while after
/// it fired, or report it again after the wall clock is set back. The
/// ledger keeps such alarms from firing twice.
#[derive(Debug)]
pub(crate) struct FiredLedger {
    keys: HashSet<AlarmKey>,
    retention: TimeDelta,
}

impl Default for FiredLedger {
    fn default() -> Self {
        Self::with_retention(TimeDelta::days(RETENTION_DAYS))
    }
}

impl FiredLedger {
    pub(crate) fn with_retention(retention: TimeDelta) -> Self {
        Self {
            keys: HashSet::new(),
            retention,
        }
    }

    /// Record a key. Returns `true` if it was not already recorded.
    pub(crate) fn record_once(&mut self, key: AlarmKey) -> bool {
        self.keys.insert(key)
    }

    pub(crate) fn contains(&self, key: &AlarmKey) -> bool {
        self.keys.contains(key)
    }

    /// Forget keys that the planner no longer reports and whose instant is
    /// more than the retention window before `now`.
    ///
    /// A key still in the snapshot is always kept, whatever its age. An
    /// appointment moved to a new instant gets a new key and fires again.
    pub(crate) fn prune(&mut self, present: &HashSet<AlarmKey>, now: DateTime<Utc>) {
        let Some(cutoff) = now.checked_sub_signed(self.retention) else {
            return;
        };
        self.keys
            .retain(|key| key.time >= cutoff || present.contains(key));
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }
}
