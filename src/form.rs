//! The add-transaction form.
//!
//! [`AddForm`] is an event-driven state machine:
//!
//! ```text
//! Closed -> LoadingStructure -> Editing -> Submitting -> Closed   (saved)
//!                                                     -> Editing  (failed)
//! ```
//!
//! It performs no I/O. [`AddForm::open`] and [`AddForm::begin_submit`] hand
//! out request tickets; the driver performs the matching HTTP call and
//! reports the outcome back with the ticket. A ticket issued before the
//! form was closed or reopened no longer matches and its outcome is
//! dropped.

pub mod picker;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::{MoneyAppError, Result, ValidationError};
use crate::models::{
    AccountId, CategoryId, PersonId, Structure, StructureItem, Transaction, TransactionDetails,
    TransactionKind,
};
use crate::money::parse_amount;
use crate::ui::{Alert, Host, LOAD_STRUCTURE_FAILED, SAVE_TRANSACTION_FAILED};

pub use picker::{DateTimeInput, PickerStep};

/// Label of the "nothing selected" picker option.
pub const UNSELECTED_LABEL: &str = "--Select--";

/// Lifecycle state of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormState {
    /// Not shown.
    Closed,
    /// Shown; reference data is being fetched.
    LoadingStructure,
    /// Shown and idle.
    Editing,
    /// A create request is outstanding.
    Submitting,
}

impl core::fmt::Display for FormState {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match *self {
            Self::Closed => "closed",
            Self::LoadingStructure => "loading structure",
            Self::Editing => "editing",
            Self::Submitting => "submitting",
        })
    }
}

/// An input of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Transaction kind picker.
    Type,
    /// Amount text input.
    Amount,
    /// Category picker (`transaction`).
    Category,
    /// Person picker (`roll`).
    Person,
    /// Account picker (`transaction`, `roll`).
    Account,
    /// Source account picker (`self`).
    FromAccount,
    /// Destination account picker (`self`).
    ToAccount,
    /// Comment text input.
    Comment,
    /// Date/time input.
    Time,
}

impl Field {
    /// Returns the label shown above the input.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Type => "Type",
            Self::Amount => "Amount",
            Self::Category => "Category",
            Self::Person => "Person",
            Self::Account => "Account",
            Self::FromAccount => "From Account",
            Self::ToAccount => "To Account",
            Self::Comment => "Comment",
            Self::Time => "Time",
        }
    }

    /// Returns the inputs shown for the given kind, in display order.
    #[must_use]
    pub const fn visible_for(kind: Option<TransactionKind>) -> &'static [Self] {
        match kind {
            None => &[Self::Type, Self::Amount, Self::Comment, Self::Time],
            Some(TransactionKind::Transaction) => &[
                Self::Type,
                Self::Amount,
                Self::Category,
                Self::Account,
                Self::Comment,
                Self::Time,
            ],
            Some(TransactionKind::Roll) => &[
                Self::Type,
                Self::Amount,
                Self::Person,
                Self::Account,
                Self::Comment,
                Self::Time,
            ],
            Some(TransactionKind::SelfTransfer) => &[
                Self::Type,
                Self::Amount,
                Self::FromAccount,
                Self::ToAccount,
                Self::Comment,
                Self::Time,
            ],
        }
    }
}

impl core::fmt::Display for Field {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of a picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerOption {
    /// Text shown to the user.
    pub label: String,
    /// Value selected; empty for the "nothing selected" entry.
    pub value: String,
}

impl PickerOption {
    /// The leading "nothing selected" entry every picker starts with.
    #[inline]
    #[must_use]
    pub fn unselected() -> Self {
        Self {
            label: UNSELECTED_LABEL.to_owned(),
            value: String::new(),
        }
    }
}

/// Current values of every input.
///
/// References for all kinds are kept side by side so switching the type
/// back and forth does not lose what was picked. Only the references of
/// the selected kind ever reach a payload, see [`FormFields::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFields {
    /// Selected kind, if any.
    pub kind: Option<TransactionKind>,
    /// Amount as typed.
    pub amount: String,
    /// Comment as typed.
    pub comment: String,
    /// Committed date and time.
    pub date: Option<DateTime<Utc>>,
    /// Category (`transaction`).
    pub category: Option<CategoryId>,
    /// Account (`transaction`, `roll`).
    pub account: Option<AccountId>,
    /// Source account (`self`).
    pub from_account: Option<AccountId>,
    /// Destination account (`self`).
    pub to_account: Option<AccountId>,
    /// Person (`roll`).
    pub person: Option<PersonId>,
}

impl FormFields {
    /// Returns the initial values: date `now`, everything else empty.
    #[inline]
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            kind: None,
            amount: String::new(),
            comment: String::new(),
            date: Some(now),
            category: None,
            account: None,
            from_account: None,
            to_account: None,
            person: None,
        }
    }

    /// Checks the values and builds the payload they describe.
    ///
    /// Conditions are checked in order: date, amount, kind, then the
    /// references the kind requires. The first failure is reported.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] that applies.
    pub fn validate(&self) -> core::result::Result<Transaction, ValidationError> {
        let date = self.date.ok_or(ValidationError::MissingDate)?;
        if self.amount.is_empty() {
            return Err(ValidationError::MissingAmount);
        }
        let amount = parse_amount(&self.amount)
            .ok_or_else(|| ValidationError::InvalidAmount(self.amount.clone()))?;
        let kind = self.kind.ok_or(ValidationError::MissingKind)?;
        let details = match kind {
            TransactionKind::Transaction => TransactionDetails::transaction(
                required(self.category.as_ref(), Field::Category)?,
                required(self.account.as_ref(), Field::Account)?,
            ),
            TransactionKind::Roll => TransactionDetails::roll(
                required(self.person.as_ref(), Field::Person)?,
                required(self.account.as_ref(), Field::Account)?,
            ),
            TransactionKind::SelfTransfer => TransactionDetails::self_transfer(
                required(self.from_account.as_ref(), Field::FromAccount)?,
                required(self.to_account.as_ref(), Field::ToAccount)?,
            ),
        };
        Ok(Transaction::new(amount, self.comment.clone(), date, details))
    }

    /// Returns `true` if [`FormFields::validate`] would succeed.
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Returns a clone of a non-empty reference, or the missing-field error.
fn required<Id: Clone + AsRef<str>>(
    value: Option<&Id>,
    field: Field,
) -> core::result::Result<Id, ValidationError> {
    value
        .filter(|id| !AsRef::<str>::as_ref(*id).is_empty())
        .cloned()
        .ok_or(ValidationError::MissingField(field))
}

/// Drops the "nothing selected" value.
fn selected<Id: AsRef<str>>(value: Option<Id>) -> Option<Id> {
    value.filter(|id| !id.as_ref().is_empty())
}

/// Builds picker options for a reference list.
fn options_from<Id: AsRef<str>>(items: &[StructureItem<Id>]) -> Vec<PickerOption> {
    core::iter::once(PickerOption::unselected())
        .chain(items.iter().map(|item| PickerOption {
            label: item.name.clone(),
            value: item.id.as_ref().to_owned(),
        }))
        .collect()
}

/// Ticket for an outstanding structure request.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "the ticket must be passed back to `structure_loaded`"]
pub struct StructureRequest {
    /// Form session the request belongs to.
    session: u64,
}

/// Ticket for an outstanding create request.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "the ticket must be passed back to `submit_finished`"]
pub struct SubmitRequest {
    /// Form session the request belongs to.
    session: u64,
}

/// The add-transaction form. See the [module docs](self).
#[derive(Debug)]
pub struct AddForm {
    /// Lifecycle state.
    state: FormState,
    /// Input values.
    fields: FormFields,
    /// Reference data for the pickers; empty until loaded.
    structure: Structure,
    /// Two-step date/time picker.
    date_input: DateTimeInput,
    /// Incremented on every open and close to invalidate old tickets.
    session: u64,
    /// Source of "now" for the date default.
    clock: fn() -> DateTime<Utc>,
}

impl Default for AddForm {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl AddForm {
    /// Creates a closed form using the system clock.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Creates a closed form that reads "now" from `clock`.
    #[inline]
    #[must_use]
    pub fn with_clock(clock: fn() -> DateTime<Utc>) -> Self {
        Self {
            state: FormState::Closed,
            fields: FormFields::new(clock()),
            structure: Structure::default(),
            date_input: DateTimeInput::new(),
            session: 0,
            clock,
        }
    }

    /// Returns the lifecycle state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> FormState {
        self.state
    }

    /// Returns `true` unless the form is closed.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state != FormState::Closed
    }

    /// Returns the current input values.
    #[inline]
    #[must_use]
    pub const fn fields(&self) -> &FormFields {
        &self.fields
    }

    /// Returns the reference data loaded for this session.
    #[inline]
    #[must_use]
    pub const fn structure(&self) -> &Structure {
        &self.structure
    }

    /// Returns the date/time picker.
    #[inline]
    #[must_use]
    pub const fn date_input(&self) -> &DateTimeInput {
        &self.date_input
    }

    /// Opens the form with default values and an empty structure.
    ///
    /// The caller must fetch the structure and report it with
    /// [`AddForm::structure_loaded`].
    ///
    /// # Errors
    ///
    /// Returns [`MoneyAppError::FormState`] if the form is already open.
    pub fn open(&mut self) -> Result<StructureRequest> {
        if self.is_open() {
            return Err(self.state_error("open"));
        }
        self.session = self.session.wrapping_add(1);
        self.fields = FormFields::new((self.clock)());
        self.structure = Structure::default();
        self.date_input = DateTimeInput::new();
        self.state = FormState::LoadingStructure;
        tracing::debug!(session = self.session, "form opened");
        Ok(StructureRequest {
            session: self.session,
        })
    }

    /// Applies the outcome of a structure request.
    ///
    /// On failure an alert is raised and editing continues with empty
    /// pickers. Outcomes for a stale ticket are dropped.
    pub fn structure_loaded<H: Host + ?Sized>(
        &mut self,
        request: StructureRequest,
        result: Result<Structure>,
        host: &H,
    ) {
        if request.session != self.session || self.state != FormState::LoadingStructure {
            tracing::debug!(
                session = request.session,
                current = self.session,
                "discarding stale structure response"
            );
            return;
        }
        match result {
            Ok(structure) => {
                tracing::debug!(
                    categories = structure.categories.len(),
                    accounts = structure.accounts.len(),
                    people = structure.people.len(),
                    "structure loaded"
                );
                self.structure = structure;
            }
            Err(err) => {
                tracing::warn!("Structure data load error: {err}");
                host.alert(&Alert::error(LOAD_STRUCTURE_FAILED));
            }
        }
        self.state = FormState::Editing;
    }

    /// Returns the inputs shown for the selected kind.
    #[inline]
    #[must_use]
    pub const fn visible_fields(&self) -> &'static [Field] {
        Field::visible_for(self.fields.kind)
    }

    /// Returns the options of a picker input, starting with the
    /// "nothing selected" entry. Text inputs have no options.
    #[must_use]
    pub fn options(&self, field: Field) -> Vec<PickerOption> {
        match field {
            Field::Type => core::iter::once(PickerOption::unselected())
                .chain(TransactionKind::ALL.iter().map(|kind| PickerOption {
                    label: kind.label().to_owned(),
                    value: kind.as_str().to_owned(),
                }))
                .collect(),
            Field::Category => options_from(&self.structure.categories),
            Field::Person => options_from(&self.structure.people),
            Field::Account | Field::FromAccount | Field::ToAccount => {
                options_from(&self.structure.accounts)
            }
            Field::Amount | Field::Comment | Field::Time => Vec::new(),
        }
    }

    /// Selects the transaction kind (`None` for "nothing selected").
    ///
    /// # Errors
    ///
    /// Returns [`MoneyAppError::FormState`] unless the form is loading or
    /// editing.
    pub fn set_kind(&mut self, kind: Option<TransactionKind>) -> Result<()> {
        self.ensure_editable("change the type")?;
        self.fields.kind = kind;
        Ok(())
    }

    /// Replaces the amount text.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyAppError::FormState`] unless the form is loading or
    /// editing.
    pub fn set_amount<T: Into<String>>(&mut self, amount: T) -> Result<()> {
        self.ensure_editable("change the amount")?;
        self.fields.amount = amount.into();
        Ok(())
    }

    /// Replaces the comment text.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyAppError::FormState`] unless the form is loading or
    /// editing.
    pub fn set_comment<T: Into<String>>(&mut self, comment: T) -> Result<()> {
        self.ensure_editable("change the comment")?;
        self.fields.comment = comment.into();
        Ok(())
    }

    /// Selects the category. An empty id counts as "nothing selected".
    ///
    /// # Errors
    ///
    /// Returns [`MoneyAppError::FormState`] unless the form is loading or
    /// editing.
    pub fn select_category(&mut self, category: Option<CategoryId>) -> Result<()> {
        self.ensure_editable("select a category")?;
        self.fields.category = selected(category);
        Ok(())
    }

    /// Selects the account. An empty id counts as "nothing selected".
    ///
    /// # Errors
    ///
    /// Returns [`MoneyAppError::FormState`] unless the form is loading or
    /// editing.
    pub fn select_account(&mut self, account: Option<AccountId>) -> Result<()> {
        self.ensure_editable("select an account")?;
        self.fields.account = selected(account);
        Ok(())
    }

    /// Selects the source account of a transfer.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyAppError::FormState`] unless the form is loading or
    /// editing.
    pub fn select_from_account(&mut self, account: Option<AccountId>) -> Result<()> {
        self.ensure_editable("select the source account")?;
        self.fields.from_account = selected(account);
        Ok(())
    }

    /// Selects the destination account of a transfer.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyAppError::FormState`] unless the form is loading or
    /// editing.
    pub fn select_to_account(&mut self, account: Option<AccountId>) -> Result<()> {
        self.ensure_editable("select the destination account")?;
        self.fields.to_account = selected(account);
        Ok(())
    }

    /// Selects the person of a rolling transaction.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyAppError::FormState`] unless the form is loading or
    /// editing.
    pub fn select_person(&mut self, person: Option<PersonId>) -> Result<()> {
        self.ensure_editable("select a person")?;
        self.fields.person = selected(person);
        Ok(())
    }

    /// Opens the date step of the date/time picker.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyAppError::FormState`] unless the form is loading or
    /// editing.
    pub fn open_date_picker(&mut self) -> Result<()> {
        self.ensure_editable("pick a date")?;
        self.date_input.open();
        Ok(())
    }

    /// Reports the date step closing; `None` means it was dismissed.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyAppError::FormState`] unless the form is loading or
    /// editing.
    pub fn pick_date(&mut self, picked: Option<NaiveDate>) -> Result<()> {
        self.ensure_editable("pick a date")?;
        let current = self
            .fields
            .date
            .unwrap_or_else(self.clock)
            .with_timezone(&Local)
            .naive_local();
        self.date_input.date_picked(current, picked);
        Ok(())
    }

    /// Reports the time step closing; `None` means it was dismissed.
    ///
    /// A picked time is combined with the picked date in the local time
    /// zone and committed.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyAppError::FormState`] unless the form is loading or
    /// editing.
    pub fn pick_time(&mut self, picked: Option<NaiveTime>) -> Result<()> {
        self.ensure_editable("pick a time")?;
        let Some(wall_clock) = self.date_input.time_picked(picked) else {
            return Ok(());
        };
        match Local.from_local_datetime(&wall_clock).earliest() {
            Some(local) => self.fields.date = Some(local.with_timezone(&Utc)),
            None => tracing::warn!(%wall_clock, "picked time does not exist in the local time zone"),
        }
        Ok(())
    }

    /// Returns the text shown in the date/time input.
    #[must_use]
    pub fn date_label(&self) -> String {
        DateTimeInput::label(
            self.fields
                .date
                .map(|date| date.with_timezone(&Local).naive_local()),
        )
    }

    /// Returns `true` if the current values would validate.
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.fields.is_ready()
    }

    /// Returns `true` if Save is enabled: the values validate and no
    /// request is outstanding.
    #[inline]
    #[must_use]
    pub fn can_save(&self) -> bool {
        self.state == FormState::Editing && self.is_ready()
    }

    /// Validates the form and moves it to [`FormState::Submitting`].
    ///
    /// Returns the ticket to report the outcome with and the payload to
    /// post.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyAppError::FormState`] if the form is not editing, or
    /// [`MoneyAppError::Validation`] if the values do not validate.
    pub fn begin_submit(&mut self) -> Result<(SubmitRequest, Transaction)> {
        if self.state != FormState::Editing {
            return Err(self.state_error("submit"));
        }
        let payload = self.fields.validate()?;
        self.state = FormState::Submitting;
        tracing::debug!(session = self.session, kind = %payload.kind(), "submitting transaction");
        Ok((
            SubmitRequest {
                session: self.session,
            },
            payload,
        ))
    }

    /// Applies the outcome of a create request.
    ///
    /// On success the fields are reset, the form closes and
    /// [`Host::form_closed`] is called. On failure an alert is raised and
    /// the form returns to editing with every value intact. Outcomes for a
    /// stale ticket are dropped.
    ///
    /// Returns `true` if the transaction was saved and the form closed.
    pub fn submit_finished<H: Host + ?Sized>(
        &mut self,
        request: SubmitRequest,
        result: Result<()>,
        host: &H,
    ) -> bool {
        if request.session != self.session || self.state != FormState::Submitting {
            tracing::debug!(
                session = request.session,
                current = self.session,
                "discarding stale submit response"
            );
            return false;
        }
        match result {
            Ok(()) => {
                tracing::debug!(session = self.session, "transaction saved");
                self.fields = FormFields::new((self.clock)());
                self.state = FormState::Editing;
                self.close(host);
                true
            }
            Err(err) => {
                tracing::warn!("Transaction save error: {err}");
                host.alert(&Alert::error(SAVE_TRANSACTION_FAILED));
                self.state = FormState::Editing;
                false
            }
        }
    }

    /// Closes the form and calls [`Host::form_closed`].
    ///
    /// Outstanding requests are abandoned: their outcomes will be dropped.
    /// The structure is discarded. Closing a closed form does nothing.
    pub fn close<H: Host + ?Sized>(&mut self, host: &H) {
        if !self.is_open() {
            return;
        }
        self.session = self.session.wrapping_add(1);
        self.structure = Structure::default();
        self.date_input.dismiss();
        self.state = FormState::Closed;
        tracing::debug!(session = self.session, "form closed");
        host.form_closed();
    }

    /// Fails unless inputs are interactive (loading or editing).
    fn ensure_editable(&self, action: &'static str) -> Result<()> {
        match self.state {
            FormState::LoadingStructure | FormState::Editing => Ok(()),
            FormState::Closed | FormState::Submitting => Err(self.state_error(action)),
        }
    }

    /// Builds the error for an action refused in the current state.
    const fn state_error(&self, action: &'static str) -> MoneyAppError {
        MoneyAppError::FormState {
            action,
            state: self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::testing::RecordingHost;

    /// Fixed "now" for deterministic defaults.
    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn sample_structure() -> Structure {
        serde_json::from_str(
            r#"{
                "categories": [{"name": "Food", "_id": "c1"}],
                "accounts": [{"name": "HDFC", "_id": "a1"}, {"name": "Cash", "_id": "a2"}],
                "people": [{"name": "Ravi", "_id": "p1"}]
            }"#,
        )
        .unwrap()
    }

    /// Opens a form and loads the sample structure.
    fn editing_form(host: &RecordingHost) -> AddForm {
        let mut form = AddForm::with_clock(fixed_now);
        let request = form.open().unwrap();
        form.structure_loaded(request, Ok(sample_structure()), host);
        assert_eq!(form.state(), FormState::Editing);
        form
    }

    fn fields(kind: TransactionKind) -> FormFields {
        let mut fields = FormFields::new(fixed_now());
        fields.kind = Some(kind);
        fields.amount = "12.5".to_owned();
        fields
    }

    // ── validation ────────────────────────────────────────────────────

    #[test]
    fn defaults_are_not_ready() {
        let defaults = FormFields::new(fixed_now());
        assert_eq!(defaults.validate(), Err(ValidationError::MissingAmount));
        assert_eq!(defaults.date, Some(fixed_now()));
        assert!(defaults.comment.is_empty());
        assert!(defaults.kind.is_none());
    }

    #[test]
    fn missing_date_is_reported_first() {
        let mut values = fields(TransactionKind::Transaction);
        values.date = None;
        values.amount = "abc".to_owned();
        assert_eq!(values.validate(), Err(ValidationError::MissingDate));
    }

    #[test]
    fn non_canonical_amount_is_rejected() {
        let mut values = fields(TransactionKind::Transaction);
        values.amount = "12.50".to_owned();
        assert_eq!(
            values.validate(),
            Err(ValidationError::InvalidAmount("12.50".to_owned()))
        );
    }

    #[test]
    fn missing_kind_is_rejected() {
        let mut values = fields(TransactionKind::Transaction);
        values.kind = None;
        assert_eq!(values.validate(), Err(ValidationError::MissingKind));
    }

    #[test]
    fn transaction_requires_category_and_account() {
        let mut values = fields(TransactionKind::Transaction);
        values.account = Some(AccountId::from("a1"));
        assert_eq!(
            values.validate(),
            Err(ValidationError::MissingField(Field::Category))
        );
        values.category = Some(CategoryId::from("c1"));
        values.account = None;
        assert_eq!(
            values.validate(),
            Err(ValidationError::MissingField(Field::Account))
        );
        values.account = Some(AccountId::from("a1"));
        assert!(values.is_ready());
    }

    #[test]
    fn roll_requires_person_and_account() {
        let mut values = fields(TransactionKind::Roll);
        values.account = Some(AccountId::from("a1"));
        values.category = Some(CategoryId::from("c1"));
        assert_eq!(
            values.validate(),
            Err(ValidationError::MissingField(Field::Person))
        );
        values.person = Some(PersonId::from("p1"));
        assert!(values.is_ready());
    }

    #[test]
    fn self_transfer_requires_both_accounts() {
        let mut values = fields(TransactionKind::SelfTransfer);
        values.from_account = Some(AccountId::from("a1"));
        values.account = Some(AccountId::from("a2"));
        assert_eq!(
            values.validate(),
            Err(ValidationError::MissingField(Field::ToAccount))
        );
        values.to_account = Some(AccountId::from("a2"));
        assert!(values.is_ready());
    }

    #[test]
    fn empty_reference_counts_as_missing() {
        let mut values = fields(TransactionKind::SelfTransfer);
        values.from_account = Some(AccountId::from(""));
        values.to_account = Some(AccountId::from("a2"));
        assert_eq!(
            values.validate(),
            Err(ValidationError::MissingField(Field::FromAccount))
        );
    }

    #[test]
    fn payload_excludes_other_kinds_fields() {
        let mut values = fields(TransactionKind::SelfTransfer);
        values.category = Some(CategoryId::from("c1"));
        values.account = Some(AccountId::from("a1"));
        values.person = Some(PersonId::from("p1"));
        values.from_account = Some(AccountId::from("a1"));
        values.to_account = Some(AccountId::from("a2"));
        values.comment = "move".to_owned();

        let payload = values.validate().unwrap();
        assert_eq!(
            payload.details,
            TransactionDetails::self_transfer(AccountId::from("a1"), AccountId::from("a2"))
        );
        let json = serde_json::to_value(&payload).unwrap();
        let object = json.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["amount", "comment", "date", "fromaccount", "toaccount", "type"]
        );
    }

    #[test]
    fn payload_carries_parsed_amount() {
        let mut values = fields(TransactionKind::Roll);
        values.amount = "-1e-7".to_owned();
        values.person = Some(PersonId::from("p1"));
        values.account = Some(AccountId::from("a2"));
        let payload = values.validate().unwrap();
        assert!((payload.amount + 1e-7).abs() < f64::EPSILON);
        assert_eq!(payload.date, fixed_now());
    }

    // ── visibility and options ────────────────────────────────────────

    #[test]
    fn visible_fields_follow_kind() {
        assert_eq!(
            Field::visible_for(None),
            [Field::Type, Field::Amount, Field::Comment, Field::Time]
        );
        assert!(Field::visible_for(Some(TransactionKind::Roll)).contains(&Field::Person));
        assert!(!Field::visible_for(Some(TransactionKind::Roll)).contains(&Field::Category));
        let transfer = Field::visible_for(Some(TransactionKind::SelfTransfer));
        assert!(transfer.contains(&Field::FromAccount));
        assert!(!transfer.contains(&Field::Account));
    }

    #[test]
    fn options_start_with_unselected() {
        let host = RecordingHost::default();
        let form = editing_form(&host);
        let accounts = form.options(Field::ToAccount);
        assert_eq!(accounts.len(), 3);
        assert_eq!(accounts[0], PickerOption::unselected());
        assert_eq!(accounts[2].label, "Cash");
        assert_eq!(accounts[2].value, "a2");

        let types: Vec<String> = form
            .options(Field::Type)
            .into_iter()
            .map(|option| option.value)
            .collect();
        assert_eq!(types, ["", "transaction", "roll", "self"]);
        assert!(form.options(Field::Comment).is_empty());
    }

    #[test]
    fn options_while_loading_are_only_unselected() {
        let mut form = AddForm::with_clock(fixed_now);
        let _request = form.open().unwrap();
        assert_eq!(form.options(Field::Category), vec![PickerOption::unselected()]);
    }

    // ── lifecycle ─────────────────────────────────────────────────────

    #[test]
    fn open_enters_loading_and_rejects_reopen() {
        let mut form = AddForm::with_clock(fixed_now);
        assert_eq!(form.state(), FormState::Closed);
        let _request = form.open().unwrap();
        assert_eq!(form.state(), FormState::LoadingStructure);
        assert!(matches!(
            form.open(),
            Err(MoneyAppError::FormState {
                action: "open",
                state: FormState::LoadingStructure
            })
        ));
    }

    #[test]
    fn inputs_are_interactive_while_loading() {
        let mut form = AddForm::with_clock(fixed_now);
        let _request = form.open().unwrap();
        form.set_amount("10").unwrap();
        form.set_kind(Some(TransactionKind::Transaction)).unwrap();
        assert_eq!(form.fields().amount, "10");
        assert!(!form.can_save());
    }

    #[test]
    fn inputs_are_rejected_when_closed() {
        let mut form = AddForm::with_clock(fixed_now);
        assert!(form.set_amount("10").is_err());
        assert!(form.open_date_picker().is_err());
    }

    #[test]
    fn structure_failure_alerts_and_keeps_editing() {
        let host = RecordingHost::default();
        let mut form = AddForm::with_clock(fixed_now);
        let request = form.open().unwrap();
        form.structure_loaded(
            request,
            Err(MoneyAppError::Api {
                status: 500,
                message: String::new(),
            }),
            &host,
        );
        assert_eq!(form.state(), FormState::Editing);
        assert_eq!(host.messages(), ["Error loading form data"]);
        assert_eq!(form.structure(), &Structure::default());
    }

    #[test]
    fn stale_structure_response_is_dropped() {
        let host = RecordingHost::default();
        let mut form = AddForm::with_clock(fixed_now);
        let stale = form.open().unwrap();
        form.close(&host);
        let fresh = form.open().unwrap();

        form.structure_loaded(stale, Ok(sample_structure()), &host);
        assert_eq!(form.state(), FormState::LoadingStructure);
        assert!(form.structure().accounts.is_empty());

        form.structure_loaded(fresh, Ok(sample_structure()), &host);
        assert_eq!(form.structure().accounts.len(), 2);
    }

    #[test]
    fn save_enabled_only_when_ready_and_idle() {
        let host = RecordingHost::default();
        let mut form = editing_form(&host);
        assert!(!form.can_save());
        form.set_kind(Some(TransactionKind::Transaction)).unwrap();
        form.set_amount("250").unwrap();
        form.select_category(Some(CategoryId::from("c1"))).unwrap();
        form.select_account(Some(AccountId::from("a1"))).unwrap();
        assert!(form.can_save());

        let (_request, _payload) = form.begin_submit().unwrap();
        assert_eq!(form.state(), FormState::Submitting);
        assert!(!form.can_save());
        assert!(form.set_amount("1").is_err());
        assert!(form.begin_submit().is_err());
    }

    #[test]
    fn begin_submit_rejects_invalid_values() {
        let host = RecordingHost::default();
        let mut form = editing_form(&host);
        form.set_kind(Some(TransactionKind::SelfTransfer)).unwrap();
        form.set_amount("5").unwrap();
        form.select_from_account(Some(AccountId::from("a1"))).unwrap();
        assert!(matches!(
            form.begin_submit(),
            Err(MoneyAppError::Validation(ValidationError::MissingField(
                Field::ToAccount
            )))
        ));
        assert_eq!(form.state(), FormState::Editing);
    }

    #[test]
    fn switching_kind_keeps_hidden_values_out_of_payload() {
        let host = RecordingHost::default();
        let mut form = editing_form(&host);
        form.set_amount("75").unwrap();
        form.set_kind(Some(TransactionKind::Transaction)).unwrap();
        form.select_category(Some(CategoryId::from("c1"))).unwrap();
        form.select_account(Some(AccountId::from("a1"))).unwrap();
        form.set_kind(Some(TransactionKind::Roll)).unwrap();
        form.select_person(Some(PersonId::from("p1"))).unwrap();

        assert_eq!(form.fields().category, Some(CategoryId::from("c1")));
        let (_request, payload) = form.begin_submit().unwrap();
        assert_eq!(
            payload.details,
            TransactionDetails::roll(PersonId::from("p1"), AccountId::from("a1"))
        );
    }

    #[test]
    fn unselecting_clears_reference() {
        let host = RecordingHost::default();
        let mut form = editing_form(&host);
        form.select_account(Some(AccountId::from("a1"))).unwrap();
        form.select_account(Some(AccountId::from(""))).unwrap();
        assert_eq!(form.fields().account, None);
    }

    /// Fills a ready-to-save roll transaction.
    fn fill_roll(form: &mut AddForm) {
        form.set_kind(Some(TransactionKind::Roll)).unwrap();
        form.set_amount("-300").unwrap();
        form.set_comment("lent").unwrap();
        form.select_person(Some(PersonId::from("p1"))).unwrap();
        form.select_account(Some(AccountId::from("a2"))).unwrap();
    }

    #[test]
    fn submit_success_resets_and_closes_once() {
        let host = RecordingHost::default();
        let mut form = editing_form(&host);
        fill_roll(&mut form);
        let (request, _payload) = form.begin_submit().unwrap();

        assert!(form.submit_finished(request, Ok(()), &host));
        assert_eq!(form.state(), FormState::Closed);
        assert_eq!(form.fields(), &FormFields::new(fixed_now()));
        assert_eq!(host.closes.get(), 1);
        assert!(host.messages().is_empty());
    }

    #[test]
    fn submit_failure_keeps_values_and_alerts() {
        let host = RecordingHost::default();
        let mut form = editing_form(&host);
        fill_roll(&mut form);
        let before = form.fields().clone();
        let (request, _payload) = form.begin_submit().unwrap();

        let outcome = form.submit_finished(
            request,
            Err(MoneyAppError::Api {
                status: 500,
                message: "boom".to_owned(),
            }),
            &host,
        );
        assert!(!outcome);
        assert_eq!(form.state(), FormState::Editing);
        assert_eq!(form.fields(), &before);
        assert_eq!(host.messages(), ["Could not save transaction"]);
        assert_eq!(host.closes.get(), 0);
        assert!(form.can_save());
    }

    #[test]
    fn submit_completion_after_close_is_dropped() {
        let host = RecordingHost::default();
        let mut form = editing_form(&host);
        fill_roll(&mut form);
        let (request, _payload) = form.begin_submit().unwrap();
        form.close(&host);
        assert_eq!(host.closes.get(), 1);

        assert!(!form.submit_finished(request, Ok(()), &host));
        assert_eq!(host.closes.get(), 1);
        assert_eq!(form.state(), FormState::Closed);
    }

    #[test]
    fn close_is_idempotent_and_discards_structure() {
        let host = RecordingHost::default();
        let mut form = editing_form(&host);
        form.close(&host);
        form.close(&host);
        assert_eq!(host.closes.get(), 1);
        assert_eq!(form.structure(), &Structure::default());
    }

    #[test]
    fn reopen_starts_from_defaults() {
        let host = RecordingHost::default();
        let mut form = editing_form(&host);
        form.set_amount("42").unwrap();
        form.close(&host);
        let _request = form.open().unwrap();
        assert!(form.fields().amount.is_empty());
    }

    // ── date picking ──────────────────────────────────────────────────

    #[test]
    fn date_then_time_updates_date() {
        let host = RecordingHost::default();
        let mut form = editing_form(&host);
        form.open_date_picker().unwrap();
        form.pick_date(NaiveDate::from_ymd_opt(2024, 2, 1)).unwrap();
        assert!(matches!(form.date_input().step(), PickerStep::Time(_)));
        form.pick_time(NaiveTime::from_hms_opt(9, 30, 0)).unwrap();

        let expected = Local
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2024, 2, 1)
                    .unwrap()
                    .and_hms_opt(9, 30, 0)
                    .unwrap(),
            )
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(form.fields().date, Some(expected));
        assert_eq!(form.date_label(), "2024-02-01 09:30:00");
    }

    #[test]
    fn cancelled_pick_keeps_previous_date() {
        let host = RecordingHost::default();
        let mut form = editing_form(&host);
        form.open_date_picker().unwrap();
        form.pick_date(None).unwrap();
        assert_eq!(form.fields().date, Some(fixed_now()));

        form.open_date_picker().unwrap();
        form.pick_date(NaiveDate::from_ymd_opt(2024, 2, 1)).unwrap();
        form.pick_time(None).unwrap();
        assert_eq!(form.fields().date, Some(fixed_now()));
        assert_eq!(form.date_input().step(), PickerStep::Idle);
    }

    #[test]
    fn date_step_keeps_time_of_day() {
        let host = RecordingHost::default();
        let mut form = editing_form(&host);
        let local_now = fixed_now().with_timezone(&Local).naive_local();
        form.open_date_picker().unwrap();
        form.pick_date(NaiveDate::from_ymd_opt(2024, 2, 1)).unwrap();
        assert_eq!(
            form.date_input().step(),
            PickerStep::Time(
                NaiveDate::from_ymd_opt(2024, 2, 1)
                    .unwrap()
                    .and_time(local_now.time())
            )
        );
    }
}
