//! Asynchronous client SDK for a JSON REST API.
//!
//! # Overview
//! `SdkClient` wraps an injected HTTP transport with bearer-token
//! authentication, a per-call timeout, and translation of every failure into
//! a single `SdkError` carrying an `ErrorKind`.
//!
//! # Design
//! - `EffectiveConfig` is resolved once at construction and only read after.
//! - The transport is a trait object supplied at construction, so tests swap
//!   it for a fake and production uses `ReqwestTransport`.
//! - Requests are built as plain data (`HttpRequest`) before any I/O happens,
//!   which keeps header merging and URL building testable on their own.
//!
//! ```no_run
//! use sdk_core::{ClientConfig, SdkClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SdkClient::new(ClientConfig::new("demo-api-key").timeout_ms(10_000))?;
//! let user = client.get_user(1).await?;
//! println!("{} <{}>", user.name, user.email);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod greeting;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{ApiResponse, CallOptions, Resource, SdkClient};
pub use config::{ClientConfig, EffectiveConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};
pub use error::{ConfigError, ErrorKind, SdkError};
pub use greeting::{greet, Greeting};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use transport::ReqwestTransport;
pub use types::{NewUser, User, UserPatch};
