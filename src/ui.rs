//! The seam between the state machines and whatever presents them.
//!
//! The list view and the add form never print anything themselves. They
//! report user-facing alerts and the form's close event to a [`Host`],
//! which the CLI implements on the terminal and tests implement with a
//! recorder.

/// Title shared by every failure alert.
pub const ERROR_TITLE: &str = "Error";

/// Alert message when the transaction list cannot be loaded.
pub const LOAD_TRANSACTIONS_FAILED: &str = "Could not load transactions..";

/// Alert message when the form's reference data cannot be loaded.
pub const LOAD_STRUCTURE_FAILED: &str = "Error loading form data";

/// Alert message when a new transaction cannot be saved.
pub const SAVE_TRANSACTION_FAILED: &str = "Could not save transaction";

/// A modal message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
}

impl Alert {
    /// Creates an alert titled [`ERROR_TITLE`].
    #[inline]
    #[must_use]
    pub fn error<T: Into<String>>(message: T) -> Self {
        Self {
            title: ERROR_TITLE.to_owned(),
            message: message.into(),
        }
    }
}

/// Colour role of a rendered amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    /// Inflow or non-negative total.
    Success,
    /// Outflow or negative total.
    Warning,
}

/// Receives the user-facing side effects of the list view and the form.
pub trait Host: core::fmt::Debug {
    /// Shows a modal alert.
    fn alert(&self, alert: &Alert);

    /// Called once each time the add form closes, whether by explicit
    /// close or after a successful save.
    fn form_closed(&self);
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording host for unit tests.

    use core::cell::{Cell, RefCell};

    use super::{Alert, Host};

    /// Host that records every alert and close notification.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingHost {
        /// Alerts in the order they were raised.
        pub(crate) alerts: RefCell<Vec<Alert>>,
        /// Number of `form_closed` calls.
        pub(crate) closes: Cell<usize>,
    }

    impl RecordingHost {
        /// Returns the messages of all recorded alerts.
        pub(crate) fn messages(&self) -> Vec<String> {
            self.alerts
                .borrow()
                .iter()
                .map(|alert| alert.message.clone())
                .collect()
        }
    }

    impl Host for RecordingHost {
        fn alert(&self, alert: &Alert) {
            self.alerts.borrow_mut().push(alert.clone());
        }

        fn form_closed(&self) {
            self.closes.set(self.closes.get() + 1);
        }
    }
}
