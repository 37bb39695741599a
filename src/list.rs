//! The grouped transaction list.
//!
//! [`TransactionList`] holds the last successfully loaded snapshot of
//! sections. A failed reload keeps that snapshot and raises one alert.
//! [`SectionHeader`] and [`ItemView`] are the presentation-ready forms of a
//! section and of a single transaction.

use crate::error::Result;
use crate::models::{Section, Transaction, TransactionDetails, TransactionKind};
use crate::money::format_money;
use crate::ui::{Alert, Host, LOAD_TRANSACTIONS_FAILED, Tone};

/// Title shown for every rolling transaction.
pub const ROLL_TITLE: &str = "Rolled";

/// Person names longer than this many characters are shortened.
const PERSON_MAX_CHARS: usize = 15;

/// Characters kept from a shortened person name.
const PERSON_KEPT_CHARS: usize = 12;

/// Snapshot of the grouped transaction list plus its loading flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionList {
    /// Sections of the last successful load, in server order.
    sections: Vec<Section>,
    /// Whether a load is outstanding.
    loading: bool,
}

impl TransactionList {
    /// Creates an empty, idle list.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sections of the last successful load.
    #[inline]
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Returns `true` while a load is outstanding.
    #[inline]
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Marks a load as started.
    #[inline]
    pub fn begin_load(&mut self) {
        tracing::debug!(sections = self.sections.len(), "loading transactions");
        self.loading = true;
    }

    /// Applies the outcome of a load and clears the loading flag.
    ///
    /// On success the sections are replaced. On failure the previous
    /// sections are kept, a diagnostic line is logged and exactly one alert
    /// is raised.
    ///
    /// Returns `true` if the sections were replaced.
    pub fn finish_load<H: Host + ?Sized>(&mut self, result: Result<Vec<Section>>, host: &H) -> bool {
        self.loading = false;
        match result {
            Ok(sections) => {
                tracing::debug!(sections = sections.len(), "transactions loaded");
                self.sections = sections;
                true
            }
            Err(err) => {
                tracing::warn!("Transaction load error: {err}");
                host.alert(&Alert::error(LOAD_TRANSACTIONS_FAILED));
                false
            }
        }
    }
}

/// Rendered header of a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    /// Group label, e.g. a month.
    pub label: String,
    /// Subtotal formatted with [`format_money`].
    pub total: String,
    /// [`Tone::Warning`] for a negative subtotal, else [`Tone::Success`].
    pub tone: Tone,
}

impl From<&Section> for SectionHeader {
    #[inline]
    fn from(section: &Section) -> Self {
        Self {
            label: section.id.clone(),
            total: format_money(section.total),
            tone: if section.total < 0.0_f64 {
                Tone::Warning
            } else {
                Tone::Success
            },
        }
    }
}

/// Rendered row of a single transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    /// Kind the row template was chosen by.
    pub kind: TransactionKind,
    /// Main line: the category, [`ROLL_TITLE`], or `from → to`.
    pub title: String,
    /// Secondary texts shown under the title, possibly none.
    pub subtitles: Vec<String>,
    /// Amount formatted with [`format_money`].
    pub amount: String,
    /// [`Tone::Success`] for a positive amount, else [`Tone::Warning`].
    pub tone: Tone,
}

impl From<&Transaction> for ItemView {
    fn from(transaction: &Transaction) -> Self {
        let (title, subtitles) = match transaction.details.clone() {
            TransactionDetails::Transaction { category, account } => {
                (category.into_inner(), vec![account.into_inner()])
            }
            TransactionDetails::Roll { person, account } => (
                ROLL_TITLE.to_owned(),
                vec![account.into_inner(), shorten_person(person.as_inner())],
            ),
            TransactionDetails::SelfTransfer {
                from_account,
                to_account,
            } => (format!("{from_account} → {to_account}"), Vec::new()),
        };
        Self {
            kind: transaction.kind(),
            title,
            subtitles,
            amount: format_money(transaction.amount),
            tone: if transaction.amount > 0.0_f64 {
                Tone::Success
            } else {
                Tone::Warning
            },
        }
    }
}

/// Shortens a long person name to its first characters plus `...`.
#[must_use]
pub fn shorten_person(name: &str) -> String {
    if name.chars().count() > PERSON_MAX_CHARS {
        let kept: String = name.chars().take(PERSON_KEPT_CHARS).collect();
        format!("{kept}...")
    } else {
        name.to_owned()
    }
}
