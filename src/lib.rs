//! Rust client library for the MoneyApp personal finance API.
//!
//! This crate provides a typed client for a MoneyApp server together with
//! the state machines of its two screens: the grouped transaction list and
//! the add-transaction form. The state machines perform no I/O and report
//! user-facing effects to a [`ui::Host`]; the high-level clients in
//! [`money_app`] drive them over HTTP.
//!
//! # Features
//!
//! - `async` (default): async client on `reqwest`.
//! - `blocking`: blocking client on `reqwest::blocking`.
//! - `env-file`: settings from `.env` files via `dotenvy`.
//! - `cli` (default): the `moneyapp` binary.

#[cfg(any(feature = "async", feature = "blocking"))]
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod list;
#[cfg(any(feature = "async", feature = "blocking"))]
pub mod money_app;
pub mod models;
pub mod money;
pub mod ui;

pub use config::Config;
pub use error::{MoneyAppError, Result, ValidationError};
pub use form::{AddForm, Field, FormFields, FormState};
pub use list::{ItemView, SectionHeader, TransactionList};
#[cfg(feature = "async")]
pub use money_app::MoneyApp;
#[cfg(feature = "blocking")]
pub use money_app::MoneyAppBlocking;
pub use ui::{Alert, Host, Tone};
