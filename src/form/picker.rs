//! Two-step date/time picker.
//!
//! The date is picked first; choosing one immediately opens the time step
//! based on that date. Dismissing either step leaves the committed value
//! untouched.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Format used to show a committed value.
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Label shown while no value is committed.
pub const EMPTY_LABEL: &str = "Pick a date";

/// Which step of the picker is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PickerStep {
    /// No picker is showing.
    #[default]
    Idle,
    /// The date-only picker is showing.
    Date,
    /// The time-only picker is showing, based on the picked date.
    Time(NaiveDateTime),
}

/// State of the two-step picker. Values are local wall-clock times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateTimeInput {
    /// Current step.
    step: PickerStep,
}

impl DateTimeInput {
    /// Creates an idle picker.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the step currently showing.
    #[inline]
    #[must_use]
    pub const fn step(&self) -> PickerStep {
        self.step
    }

    /// Opens the date step, abandoning any pick in progress.
    #[inline]
    pub fn open(&mut self) {
        self.step = PickerStep::Date;
    }

    /// Handles the date step closing.
    ///
    /// `current` is the value the picker was opened on; its time of day
    /// carries over to the time step. `None` means the step was dismissed,
    /// which aborts the whole pick. Ignored unless the date step is showing.
    pub fn date_picked(&mut self, current: NaiveDateTime, picked: Option<NaiveDate>) {
        if self.step != PickerStep::Date {
            tracing::debug!(step = ?self.step, "ignoring date pick outside the date step");
            return;
        }
        self.step = picked.map_or(PickerStep::Idle, |date| {
            PickerStep::Time(date.and_time(current.time()))
        });
    }

    /// Handles the time step closing.
    ///
    /// Returns the value to commit, or `None` if the step was dismissed or
    /// was not showing.
    pub fn time_picked(&mut self, picked: Option<NaiveTime>) -> Option<NaiveDateTime> {
        let PickerStep::Time(base) = self.step else {
            tracing::debug!(step = ?self.step, "ignoring time pick outside the time step");
            return None;
        };
        self.step = PickerStep::Idle;
        picked.map(|time| base.date().and_time(time))
    }

    /// Closes whatever step is showing without committing.
    #[inline]
    pub fn dismiss(&mut self) {
        self.step = PickerStep::Idle;
    }

    /// Renders a committed value for the field, or [`EMPTY_LABEL`].
    #[must_use]
    pub fn label(value: Option<NaiveDateTime>) -> String {
        value.map_or_else(
            || EMPTY_LABEL.to_owned(),
            |value| value.format(DISPLAY_FORMAT).to_string(),
        )
    }
}
