//! High-level MoneyApp client.
//!
//! Wires the [`TransactionList`] and [`AddForm`] state machines to the HTTP
//! client: each operation performs the request its transition needs and
//! feeds the outcome back, reporting user-facing effects to a [`Host`].

use crate::form::AddForm;
use crate::list::TransactionList;
use crate::models::{DateTime, Utc};
use crate::ui::Host;

/// Generates a high-level MoneyApp client (async or blocking) with builder.
macro_rules! define_app {
    (
        client_name: $client:ident,
        builder_name: $builder:ident,
        http_client: $http_client:ty,
        client_doc: $client_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder<H: Host> {
            /// Base URL override.
            base_url: Option<String>,
            /// Receiver of alerts and close notifications.
            host: Option<H>,
            /// Source of "now" for the form's date default.
            clock: Option<fn() -> DateTime<Utc>>,
        }

        impl<H: Host> $builder<H> {
            /// Overrides the base URL (useful for testing with a mock server).
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Takes the base URL from a resolved [`Config`].
            #[inline]
            #[must_use]
            pub fn config(mut self, config: &Config) -> Self {
                self.base_url = Some(config.api_url.as_str().to_owned());
                self
            }

            /// Sets the host that presents alerts and form closes.
            #[inline]
            #[must_use]
            pub fn host(mut self, host: H) -> Self {
                self.host = Some(host);
                self
            }

            /// Replaces the clock used for the form's default date.
            #[inline]
            #[must_use]
            pub fn clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
                self.clock = Some(clock);
                self
            }

            /// Builds the high-level client.
            ///
            /// # Errors
            ///
            /// Returns [`MoneyAppError::Config`] if no host was provided.
            /// Returns [`MoneyAppError::InvalidUrl`] if the base URL does not
            /// parse.
            /// Returns [`MoneyAppError::Http`] if the HTTP client fails to build.
            #[inline]
            pub fn build(self) -> Result<$client<H>> {
                let host = self.host.ok_or_else(|| MoneyAppError::Config {
                    key: "host",
                    reason: "a host is required".to_owned(),
                })?;

                let mut http_builder = <$http_client>::builder();
                if let Some(url) = self.base_url {
                    http_builder = http_builder.base_url(url);
                }
                let client = http_builder.build()?;

                Ok($client {
                    client,
                    list: TransactionList::new(),
                    form: self.clock.map_or_else(AddForm::new, AddForm::with_clock),
                    host,
                })
            }
        }

        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client<H: Host> {
            /// Low-level HTTP client.
            client: $http_client,
            /// Grouped transaction list.
            list: TransactionList,
            /// Add-transaction form.
            form: AddForm,
            /// Receiver of user-facing effects.
            host: H,
        }

        impl<H: Host> $client<H> {
            /// Creates a new builder for configuring the client.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder<H> {
                $builder {
                    base_url: None,
                    host: None,
                    clock: None,
                }
            }

            /// Loads (or reloads) the grouped transaction list.
            ///
            /// A failure keeps the previous sections and raises one alert.
            /// Returns `true` if the sections were replaced.
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn refresh(&mut self) -> bool {
                self.list.begin_load();
                let result = self.client.transactions() $( .$await_ext )?;
                self.list.finish_load(result, &self.host)
            }

            /// Opens the add form and loads its reference data.
            ///
            /// A failed structure load raises an alert; the form is editable
            /// either way.
            ///
            /// # Errors
            ///
            /// Returns [`MoneyAppError::FormState`] if the form is already
            /// open.
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn open_form(&mut self) -> Result<()> {
                let request = self.form.open()?;
                let result = self.client.structure() $( .$await_ext )?;
                self.form.structure_loaded(request, result, &self.host);
                Ok(())
            }

            /// Submits the form.
            ///
            /// On success the form resets and closes; the list is not
            /// reloaded. On failure an alert is raised and the form stays
            /// open with its values. Returns `true` if the transaction was
            /// saved.
            ///
            /// # Errors
            ///
            /// Returns [`MoneyAppError::FormState`] if the form is not
            /// editing, or [`MoneyAppError::Validation`] if it is not ready.
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn save(&mut self) -> Result<bool> {
                let (request, payload) = self.form.begin_submit()?;
                let result = self.client.create_transaction(&payload) $( .$await_ext )?;
                Ok(self.form.submit_finished(request, result, &self.host))
            }

            /// Closes the add form without saving.
            #[inline]
            pub fn close_form(&mut self) {
                self.form.close(&self.host);
            }

            /// Returns `true` if the add button should be shown, i.e. the
            /// form is closed.
            #[inline]
            #[must_use]
            pub fn shows_add_button(&self) -> bool {
                !self.form.is_open()
            }

            /// Returns the transaction list.
            #[inline]
            #[must_use]
            pub const fn list(&self) -> &TransactionList {
                &self.list
            }

            /// Returns the add form.
            #[inline]
            #[must_use]
            pub const fn form(&self) -> &AddForm {
                &self.form
            }

            /// Returns the add form for editing its fields.
            #[inline]
            pub const fn form_mut(&mut self) -> &mut AddForm {
                &mut self.form
            }

            /// Returns the host.
            #[inline]
            #[must_use]
            pub const fn host(&self) -> &H {
                &self.host
            }

            /// Returns a reference to the underlying HTTP client.
            #[inline]
            #[must_use]
            pub const fn inner_client(&self) -> &$http_client {
                &self.client
            }
        }
    };
}

// ── Async variant ───────────────────────────────────────────────────────

#[cfg(feature = "async")]
mod async_app {
    //! Async high-level client.

    use super::{AddForm, DateTime, Host, TransactionList, Utc};
    use crate::client::MoneyAppClient;
    use crate::config::Config;
    use crate::error::{MoneyAppError, Result};

    define_app! {
        client_name: MoneyApp,
        builder_name: MoneyAppBuilder,
        http_client: MoneyAppClient,
        client_doc: "High-level async MoneyApp client.\n\nUse [`MoneyApp::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`MoneyApp`] client.",
        async_kw: async,
        await_kw: await,
    }
}

// ── Blocking variant ────────────────────────────────────────────────────

#[cfg(feature = "blocking")]
mod blocking_app {
    //! Blocking high-level client.

    use super::{AddForm, DateTime, Host, TransactionList, Utc};
    use crate::client::MoneyAppBlockingClient;
    use crate::config::Config;
    use crate::error::{MoneyAppError, Result};

    define_app! {
        client_name: MoneyAppBlocking,
        builder_name: MoneyAppBlockingBuilder,
        http_client: MoneyAppBlockingClient,
        client_doc: "High-level blocking MoneyApp client.\n\nUse [`MoneyAppBlocking::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`MoneyAppBlocking`] client.",
    }
}

#[cfg(feature = "async")]
pub use async_app::{MoneyApp, MoneyAppBuilder};
#[cfg(feature = "blocking")]
pub use blocking_app::{MoneyAppBlocking, MoneyAppBlockingBuilder};
