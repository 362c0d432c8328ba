//! Stateless request builder and response parser for one resource collection.
//!
//! # Design
//! `Endpoint` holds only the base address and the write headers, and carries
//! no mutable state between calls. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`. Whoever executes the round-trip in between
//! (normally `ResourceClient` through a `Transport`) never has to know the
//! addressing or decoding rules.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::Resource;

/// Request builder and response parser for the collection of `T` records.
pub struct Endpoint<T> {
    base: String,
    write_headers: Vec<(String, String)>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Endpoint<T> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            write_headers: self.write_headers.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Endpoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("base", &self.base)
            .field("write_headers", &self.write_headers)
            .finish()
    }
}

impl<T: Resource> Endpoint<T> {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base: config.endpoint.trim_end_matches('/').to_string(),
            write_headers: config.headers.clone(),
            _record: PhantomData,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Address of a single record: `{base}/{id}`.
    pub fn record_path(&self, id: &T::Id) -> String {
        format!("{}/{id}", self.base)
    }

    pub fn build_list(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.base.clone(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create(&self, record: &T) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.base.clone(),
            headers: self.write_headers.clone(),
            body: Some(encode(record)?),
        })
    }

    /// Fails with `MissingId` when the record has not been assigned an id.
    pub fn build_update(&self, record: &T) -> Result<HttpRequest, ApiError> {
        let id = record.id().ok_or(ApiError::MissingId)?;
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: self.record_path(id),
            headers: self.write_headers.clone(),
            body: Some(encode(record)?),
        })
    }

    pub fn build_remove(&self, id: &T::Id) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.record_path(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<T>, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    /// Parse the single record returned by `create` or `update`.
    pub fn parse_record(&self, response: HttpResponse) -> Result<T, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    /// Parse a `remove` response. Servers may answer with the deleted record,
    /// with no body, or with some other JSON acknowledgement such as `{}`.
    /// Only a body that is not JSON at all fails.
    pub fn parse_removed(&self, response: HttpResponse) -> Result<Option<T>, ApiError> {
        check_status(&response)?;
        if response.body.trim().is_empty() {
            return Ok(None);
        }
        let value: serde_json::Value = decode(&response.body)?;
        Ok(serde_json::from_value(value).ok())
    }
}

fn encode<T: serde::Serialize>(record: &T) -> Result<String, ApiError> {
    serde_json::to_string(record).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound {
            body: response.body.clone(),
        });
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
