//! The typed CRUD client.
//!
//! # Design
//! `ResourceClient` owns an `Endpoint` (addressing, encoding, decoding), a
//! `Transport` (I/O) and a `Diagnostics` sink. Every operation returns a
//! `Cold`: nothing is built or sent until someone subscribes, and each
//! subscription performs its own exchange.
//!
//! Failure handling is deliberately uneven. `list` and `create` let every
//! failure terminate the stream. `update` and `remove` report the failure,
//! normalize it, and deliver it as `Outcome::Failed` on the success path;
//! their streams can never fail.

use std::convert::Infallible;
use std::sync::Arc;

use tracing::debug;

use crate::config::ClientConfig;
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::endpoint::Endpoint;
use crate::error::{ApiError, Normalized};
use crate::http::{HttpRequest, HttpResponse};
use crate::stream::Cold;
use crate::transport::Transport;
use crate::types::{Contact, Resource};

/// What `update` and `remove` emit: the decoded response, or the normalized
/// failure in its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Value(T),
    Failed(Normalized),
}

impl<T> Outcome<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn value(self) -> Option<T> {
        match self {
            Outcome::Value(value) => Some(value),
            Outcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&Normalized> {
        match self {
            Outcome::Value(_) => None,
            Outcome::Failed(failure) => Some(failure),
        }
    }

    pub fn into_result(self) -> Result<T, Normalized> {
        match self {
            Outcome::Value(value) => Ok(value),
            Outcome::Failed(failure) => Err(failure),
        }
    }
}

/// Client for one remote collection of `T` records.
///
/// Cheap to clone; clones share the transport and diagnostics.
pub struct ResourceClient<T: Resource> {
    endpoint: Arc<Endpoint<T>>,
    transport: Arc<dyn Transport>,
    diagnostics: Arc<dyn Diagnostics>,
}

pub type ContactClient = ResourceClient<Contact>;

impl<T: Resource> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            endpoint: Arc::clone(&self.endpoint),
            transport: Arc::clone(&self.transport),
            diagnostics: Arc::clone(&self.diagnostics),
        }
    }
}

impl<T: Resource> ResourceClient<T> {
    pub fn new(transport: Arc<dyn Transport>, config: &ClientConfig) -> Self {
        Self {
            endpoint: Arc::new(Endpoint::new(config)),
            transport,
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn endpoint(&self) -> &Endpoint<T> {
        &self.endpoint
    }

    /// GET the whole collection.
    pub fn list(&self) -> Cold<Vec<T>> {
        self.exchange(|endpoint| Ok(endpoint.build_list()), Endpoint::parse_list)
    }

    /// POST a new record. Failures are not intercepted.
    pub fn create(&self, record: T) -> Cold<T> {
        self.exchange(
            move |endpoint| endpoint.build_create(&record),
            Endpoint::parse_record,
        )
    }

    /// PUT the full record to `{base}/{id}`.
    pub fn update(&self, record: T) -> Cold<Outcome<T>, Infallible> {
        self.intercepted(self.exchange(
            move |endpoint| endpoint.build_update(&record),
            Endpoint::parse_record,
        ))
    }

    /// DELETE `{base}/{id}`. Yields `None` unless the server echoes the record.
    pub fn remove(&self, id: T::Id) -> Cold<Outcome<Option<T>>, Infallible> {
        self.intercepted(self.exchange(
            move |endpoint| Ok(endpoint.build_remove(&id)),
            Endpoint::parse_removed,
        ))
    }

    /// Report `error` to diagnostics and reduce it to the value handed to
    /// subscribers.
    pub fn handle_error(&self, error: ApiError) -> Normalized {
        self.diagnostics.report(&error);
        Normalized::from(error)
    }

    fn exchange<R, B, P>(&self, build: B, parse: P) -> Cold<R>
    where
        R: Send + 'static,
        B: Fn(&Endpoint<T>) -> Result<HttpRequest, ApiError> + Send + Sync + 'static,
        P: Fn(&Endpoint<T>, HttpResponse) -> Result<R, ApiError> + Send + Sync + 'static,
    {
        let client = self.clone();
        let steps = Arc::new((build, parse));
        Cold::new(move || {
            let client = client.clone();
            let steps = Arc::clone(&steps);
            async move {
                let (build, parse) = &*steps;
                client.round_trip(build, parse).await
            }
        })
    }

    async fn round_trip<R, B, P>(&self, build: &B, parse: &P) -> Result<R, ApiError>
    where
        B: Fn(&Endpoint<T>) -> Result<HttpRequest, ApiError>,
        P: Fn(&Endpoint<T>, HttpResponse) -> Result<R, ApiError>,
    {
        let endpoint: &Endpoint<T> = &self.endpoint;
        let request = build(endpoint)?;
        debug!(method = %request.method, path = %request.path, "subscribed");
        let response = self.transport.execute(request).await?;
        parse(endpoint, response)
    }

    fn intercepted<R: Send + 'static>(&self, operation: Cold<R>) -> Cold<Outcome<R>, Infallible> {
        let client = self.clone();
        Cold::new(move || {
            let client = client.clone();
            let attempt = operation.single();
            async move {
                Ok(match attempt.await {
                    Ok(value) => Outcome::Value(value),
                    Err(error) => Outcome::Failed(client.handle_error(error)),
                })
            }
        })
    }
}
