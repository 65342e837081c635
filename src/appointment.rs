//! Appointment and alarm data types.
//!
//! Both are produced by a [`Planner`](crate::planner::Planner) and treated as
//! immutable by the alarm queue, which only copies them into the events it
//! emits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What kind of entry an appointment is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentKind {
    /// A calendar event with reminder alarms.
    #[default]
    Event,
    /// A clock-app alarm (wake-up alarm, timer).
    Alarm,
}

/// A calendar entry with a time span and its alarms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    /// Stable identifier, unique within one planner.
    pub uid: String,
    /// Free-text description.
    pub summary: String,
    /// Event or clock alarm.
    #[serde(default)]
    pub kind: AppointmentKind,
    /// Start instant.
    pub begin: DateTime<Utc>,
    /// End instant.
    pub end: DateTime<Utc>,
    /// Optional location text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Alarms attached to this appointment.
    #[serde(default, rename = "alarm")]
    pub alarms: Vec<Alarm>,
}

impl Appointment {
    /// Create an event spanning `begin..end` with no alarms.
    pub fn new(
        uid: impl Into<String>,
        summary: impl Into<String>,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            uid: uid.into(),
            summary: summary.into(),
            kind: AppointmentKind::Event,
            begin,
            end,
            location: None,
            alarms: Vec::new(),
        }
    }

    /// Attach an alarm.
    #[must_use]
    pub fn with_alarm(mut self, alarm: Alarm) -> Self {
        self.alarms.push(alarm);
        self
    }

    /// Set the appointment kind.
    #[must_use]
    pub fn with_kind(mut self, kind: AppointmentKind) -> Self {
        self.kind = kind;
        self
    }

    /// Returns `true` for clock-app alarms.
    pub fn is_alarm(&self) -> bool {
        self.kind == AppointmentKind::Alarm
    }
}

/// One trigger belonging to an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    /// Absolute trigger instant.
    pub time: DateTime<Utc>,
    /// Human-readable text shown when the alarm fires.
    #[serde(default)]
    pub text: String,
    /// Sound to play, if the alarm carries its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// How long the resulting notification stays actionable.
    ///
    /// `None` leaves the choice to the presentation layer.
    #[serde(
        default,
        rename = "duration_secs",
        with = "duration_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<Duration>,
}

impl Alarm {
    /// Create an alarm at `time` with the given text.
    pub fn new(time: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self {
            time,
            text: text.into(),
            audio_url: None,
            duration: None,
        }
    }

    /// Set the sound reference.
    #[must_use]
    pub fn with_audio_url(mut self, url: impl Into<String>) -> Self {
        self.audio_url = Some(url.into());
        self
    }

    /// Set how long the notification stays actionable.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.as_secs()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let secs = Option::<u64>::deserialize(d)?;
        // Zero means "no explicit duration", as calendar sources encode it.
        Ok(secs.filter(|s| *s > 0).map(Duration::from_secs))
    }
}
