//! Typed CRUD client for a remote contacts collection.
//!
//! # Overview
//! `ResourceClient<T>` exposes `list`, `create`, `update` and `remove` for
//! one collection of records. Each operation returns a [`Cold`]: a deferred
//! exchange that starts only when subscribed and runs again on every
//! subscription.
//!
//! # Design
//! - `Endpoint` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`. It never touches the network.
//! - `Transport` is the only I/O seam. `ReqwestTransport` talks HTTP,
//!   `MockTransport` replays scripted replies for tests.
//! - `list`/`create` fail their stream on error. `update`/`remove` report
//!   the error to `Diagnostics` and emit it as `Outcome::Failed`.
//! - `Contact` is defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod client;
pub mod config;
pub mod diagnostics;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod mock;
pub mod stream;
pub mod transport;
pub mod types;

pub use client::{ContactClient, Outcome, ResourceClient};
pub use config::ClientConfig;
pub use diagnostics::{Diagnostics, TracingDiagnostics};
pub use endpoint::Endpoint;
pub use error::{ApiError, Normalized};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use stream::{Cold, Subscription};
pub use transport::{ReqwestTransport, Transport};
pub use types::{Contact, Resource};
