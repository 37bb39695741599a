//! HTTP client for the MoneyApp API.
//!
//! Provides both async and blocking client variants behind feature flags.
//! Every call succeeds only on `200 OK`; any other status becomes
//! [`MoneyAppError::Api`](crate::error::MoneyAppError::Api).

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Grouped transactions (GET) and transaction creation (POST).
const TRANSACTIONS_PATH: &str = "/api/transactions";

/// Reference data for the add form.
const STRUCTURE_PATH: &str = "/api/structure/";

/// Placeholder message when an error body cannot be read.
const UNKNOWN_ERROR: &str = "unknown error";

/// Validates a base URL and strips trailing slashes so paths can be
/// appended directly.
fn normalize_base_url(raw: &str) -> crate::error::Result<String> {
    let _parsed = url::Url::parse(raw)?;
    Ok(raw.trim_end_matches('/').to_owned())
}

/// Generates a MoneyApp client (async or blocking) with builder, methods, and tests.
macro_rules! define_client {
    (
        client_name: $client:ident,
        builder_name: $builder:ident,
        http_type: $http_type:ty,
        response_type: $resp_type:ty,
        client_doc: $client_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
        $(send_bound: $send_bound:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder {
            /// Base URL override.
            base_url: Option<String>,
        }

        impl $builder {
            /// Overrides the base URL (a mock server in tests, a LAN host
            /// in practice).
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Builds the client.
            ///
            /// # Errors
            ///
            /// Returns [`MoneyAppError::InvalidUrl`] if the base URL does not
            /// parse.
            /// Returns [`MoneyAppError::Http`] if the HTTP client fails to build.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub fn build(self) -> Result<$client> {
                let base_url = normalize_base_url(
                    self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
                )?;
                tracing::debug!(base_url = %base_url, "building client");
                let http = <$http_type>::builder().build()?;

                Ok($client { http, base_url })
            }
        }

        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client {
            /// Underlying HTTP client.
            http: $http_type,
            /// API base URL without trailing slash.
            base_url: String,
        }

        impl $client {
            /// Creates a new builder for configuring the client.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder {
                $builder { base_url: None }
            }

            /// Returns the base URL requests are sent to.
            #[inline]
            #[must_use]
            pub fn base_url(&self) -> &str {
                &self.base_url
            }

            /// Fetches the grouped transaction list via
            /// `GET /api/transactions`.
            ///
            /// Entries of unknown type are dropped while decoding.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns
            /// a status other than 200, or the response cannot be
            /// deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn transactions(&self) -> Result<Vec<Section>> {
                tracing::debug!("fetching transactions");
                self.get_json(TRANSACTIONS_PATH) $( .$await_ext )?
            }

            /// Fetches the categories, accounts and people via
            /// `GET /api/structure/`.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns
            /// a status other than 200, or the response cannot be
            /// deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn structure(&self) -> Result<Structure> {
                tracing::debug!("fetching structure");
                self.get_json(STRUCTURE_PATH) $( .$await_ext )?
            }

            /// Creates a transaction via `POST /api/transactions`.
            ///
            /// The response body is ignored.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server
            /// returns a status other than 200.
            #[inline]
            #[tracing::instrument(skip_all, fields(kind = %transaction.kind()))]
            pub $($async_kw)? fn create_transaction(
                &self,
                transaction: &Transaction,
            ) -> Result<()> {
                let body = serde_json::to_vec(transaction)?;
                let url = format!("{}{TRANSACTIONS_PATH}", self.base_url);
                tracing::trace!(url = %url, body_len = body.len(), "sending POST request");
                let response: $resp_type = self
                    .http
                    .post(&url)
                    .header(CONTENT_TYPE, "application/json")
                    .body(body)
                    .send()
                    $( .$await_ext )?
                    ?;
                let _body = Self::check_status(response) $( .$await_ext )? ?;
                Ok(())
            }

            /// Sends a GET request and deserializes the response.
            #[tracing::instrument(skip_all, fields(path = %path))]
            $($async_kw)? fn get_json<Resp: serde::de::DeserializeOwned $(+ $send_bound)?>(
                &self,
                path: &str,
            ) -> Result<Resp> {
                let url = format!("{}{path}", self.base_url);
                tracing::trace!(url = %url, "sending GET request");
                let response: $resp_type = self.http.get(&url).send() $( .$await_ext )? ?;
                let body = Self::check_status(response) $( .$await_ext )? ?;
                tracing::trace!(body_len = body.len(), "parsing response body");
                serde_json::from_str(&body).map_err(MoneyAppError::from)
            }

            /// Returns the body of a `200 OK` response, or the API error
            /// for any other status.
            $($async_kw)? fn check_status(response: $resp_type) -> Result<String> {
                let status = response.status();
                tracing::debug!(status = %status, "received response");
                if status == StatusCode::OK {
                    Ok(response.text() $( .$await_ext )? ?)
                } else {
                    let message = response
                        .text()
                        $( .$await_ext )?
                        .ok()
                        .filter(|body| !body.is_empty())
                        .unwrap_or_else(|| UNKNOWN_ERROR.to_owned());
                    tracing::debug!(status = status.as_u16(), message = %message, "API error");
                    Err(MoneyAppError::Api {
                        status: status.as_u16(),
                        message,
                    })
                }
            }
        }

    };
}

#[cfg(feature = "async")]
mod async_client {
    //! Async HTTP client for the MoneyApp API.

    use reqwest::StatusCode;
    use reqwest::header::CONTENT_TYPE;

    use super::{DEFAULT_BASE_URL, STRUCTURE_PATH, TRANSACTIONS_PATH, UNKNOWN_ERROR, normalize_base_url};
    use crate::error::{MoneyAppError, Result};
    use crate::models::{Section, Structure, Transaction};

    define_client! {
        client_name: MoneyAppClient,
        builder_name: MoneyAppClientBuilder,
        http_type: reqwest::Client,
        response_type: reqwest::Response,
        client_doc: "Async client for the MoneyApp API.\n\nUse [`MoneyAppClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`MoneyAppClient`].",
        async_kw: async,
        await_kw: await,
        send_bound: Send,
    }
}

#[cfg(feature = "blocking")]
mod blocking_client {
    //! Blocking (synchronous) HTTP client for the MoneyApp API.

    use reqwest::StatusCode;
    use reqwest::header::CONTENT_TYPE;

    use super::{DEFAULT_BASE_URL, STRUCTURE_PATH, TRANSACTIONS_PATH, UNKNOWN_ERROR, normalize_base_url};
    use crate::error::{MoneyAppError, Result};
    use crate::models::{Section, Structure, Transaction};

    define_client! {
        client_name: MoneyAppBlockingClient,
        builder_name: MoneyAppBlockingClientBuilder,
        http_type: reqwest::blocking::Client,
        response_type: reqwest::blocking::Response,
        client_doc: "Blocking (synchronous) client for the MoneyApp API.\n\nUse [`MoneyAppBlockingClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`MoneyAppBlockingClient`].",
    }
}

#[cfg(feature = "async")]
pub use async_client::{MoneyAppClient, MoneyAppClientBuilder};
#[cfg(feature = "blocking")]
pub use blocking_client::{MoneyAppBlockingClient, MoneyAppBlockingClientBuilder};

#[cfg(all(test, feature = "async"))]
mod http_tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::MoneyAppError;
    use crate::models::{
        AccountId, DateTime, PersonId, Transaction, TransactionDetails, TransactionKind, Utc,
    };

    fn client_for(server: &MockServer) -> MoneyAppClient {
        MoneyAppClient::builder()
            .base_url(server.uri())
            .build()
            .unwrap()
    }

    fn sections_body() -> serde_json::Value {
        json!([
            {
                "_id": "January 2024",
                "total": -150.5,
                "data": [
                    {
                        "_id": "t1",
                        "type": "transaction",
                        "amount": -200,
                        "comment": "Groceries",
                        "date": "2024-01-15T10:30:00.000Z",
                        "category": "Food",
                        "account": "HDFC"
                    },
                    {
                        "_id": "t2",
                        "type": "refund",
                        "amount": 10,
                        "date": "2024-01-16T10:30:00.000Z"
                    },
                    {
                        "_id": "t3",
                        "type": "roll",
                        "amount": 49.5,
                        "date": "2024-01-17T10:30:00.000Z",
                        "rollperson": "Ravi",
                        "account": "Cash"
                    }
                ]
            }
        ])
    }

    #[tokio::test]
    async fn transactions_drops_unknown_types() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TRANSACTIONS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(sections_body()))
            .expect(1)
            .mount(&server)
            .await;

        let sections = client_for(&server).transactions().await.unwrap();
        assert_eq!(sections.len(), 1);
        let kinds: Vec<TransactionKind> = sections[0].data.iter().map(Transaction::kind).collect();
        assert_eq!(kinds, [TransactionKind::Transaction, TransactionKind::Roll]);
        assert!((sections[0].total + 150.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn transactions_non_200_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TRANSACTIONS_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
            .mount(&server)
            .await;

        let err = client_for(&server).transactions().await.unwrap_err();
        assert!(matches!(
            err,
            MoneyAppError::Api { status: 500, ref message } if message == "db down"
        ));
    }

    #[tokio::test]
    async fn transactions_malformed_body_is_serialization_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TRANSACTIONS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"oops\": true}"))
            .mount(&server)
            .await;

        let err = client_for(&server).transactions().await.unwrap_err();
        assert!(matches!(err, MoneyAppError::Serialization(_)));
    }

    #[tokio::test]
    async fn structure_is_fetched_with_trailing_slash() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/structure/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "categories": [{"name": "Food", "_id": "c1"}],
                "accounts": [{"name": "HDFC", "_id": "a1"}],
                "people": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let structure = client_for(&server).structure().await.unwrap();
        assert_eq!(structure.categories.len(), 1);
        assert_eq!(structure.accounts[0].id, AccountId::from("a1"));
        assert!(structure.people.is_empty());
    }

    #[tokio::test]
    async fn structure_other_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(STRUCTURE_PATH))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let err = client_for(&server).structure().await.unwrap_err();
        assert!(matches!(
            err,
            MoneyAppError::Api { status: 204, ref message } if message == UNKNOWN_ERROR
        ));
    }

    #[tokio::test]
    async fn create_posts_exact_payload() {
        let server = MockServer::start().await;
        let date = DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let transaction = Transaction::new(
            -300.0,
            "lent".to_owned(),
            date,
            TransactionDetails::roll(PersonId::from("p1"), AccountId::from("a2")),
        );
        Mock::given(method("POST"))
            .and(path(TRANSACTIONS_PATH))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "amount": -300.0,
                "comment": "lent",
                "date": "2024-01-15T10:30:00.000Z",
                "type": "roll",
                "rollperson": "p1",
                "account": "a2"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("saved"))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .create_transaction(&transaction)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_201_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TRANSACTIONS_PATH))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;
        let transaction = Transaction::new(
            1.0,
            String::new(),
            Utc::now(),
            TransactionDetails::self_transfer(AccountId::from("a1"), AccountId::from("a2")),
        );

        let err = client_for(&server)
            .create_transaction(&transaction)
            .await
            .unwrap_err();
        assert!(matches!(err, MoneyAppError::Api { status: 201, .. }));
    }

    #[tokio::test]
    async fn connection_refused_is_http_error() {
        let client = MoneyAppClient::builder()
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        let err = client.transactions().await.unwrap_err();
        assert!(matches!(err, MoneyAppError::Http(_)));
    }
}
