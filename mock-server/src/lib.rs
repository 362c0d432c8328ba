use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, warn};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Body of POST and PUT. A client-supplied `id` is ignored on POST and must
/// match the path on PUT.
#[derive(Deserialize)]
pub struct ContactInput {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ContactInput {
    fn into_contact(self, id: u64) -> Contact {
        Contact {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("contact {0} not found")]
    NotFound(u64),

    #[error("body id {body} does not match path id {path}")]
    IdMismatch { path: u64, body: u64 },
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::IdMismatch { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        warn!(error = %self, "request rejected");
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

pub type Db = Arc<RwLock<BTreeMap<u64, Contact>>>;

/// Router over an empty store.
pub fn app() -> Router {
    app_with(Vec::new())
}

/// Router over a store holding `seed`.
pub fn app_with(seed: impl IntoIterator<Item = Contact>) -> Router {
    let db: Db = Arc::new(RwLock::new(
        seed.into_iter().map(|contact| (contact.id, contact)).collect(),
    ));
    Router::new()
        .route("/api/contacts", get(list_contacts).post(create_contact))
        .route(
            "/api/contacts/{id}",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_contacts(State(db): State<Db>) -> Json<Vec<Contact>> {
    let contacts = db.read().await;
    Json(contacts.values().cloned().collect())
}

async fn create_contact(
    State(db): State<Db>,
    Json(input): Json<ContactInput>,
) -> (StatusCode, Json<Contact>) {
    let mut contacts = db.write().await;
    let id = contacts.keys().next_back().map_or(1, |last| last + 1);
    let contact = input.into_contact(id);
    contacts.insert(id, contact.clone());
    debug!(id, "contact created");
    (StatusCode::CREATED, Json(contact))
}

async fn get_contact(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Contact>, ServerError> {
    let contacts = db.read().await;
    contacts
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(ServerError::NotFound(id))
}

async fn update_contact(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<ContactInput>,
) -> Result<Json<Contact>, ServerError> {
    if let Some(body) = input.id.filter(|body| *body != id) {
        return Err(ServerError::IdMismatch { path: id, body });
    }
    let mut contacts = db.write().await;
    let slot = contacts.get_mut(&id).ok_or(ServerError::NotFound(id))?;
    *slot = input.into_contact(id);
    debug!(id, "contact replaced");
    Ok(Json(slot.clone()))
}

async fn delete_contact(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ServerError> {
    let mut contacts = db.write().await;
    contacts
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(ServerError::NotFound(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_omits_unset_fields() {
        let contact = Contact {
            id: 1,
            name: "Ann".to_string(),
            email: None,
            phone: Some("555-0100".to_string()),
        };
        let json = serde_json::to_value(&contact).unwrap();
        assert_eq!(json, serde_json::json!({"id": 1, "name": "Ann", "phone": "555-0100"}));
    }

    #[test]
    fn input_id_is_optional() {
        let input: ContactInput = serde_json::from_str(r#"{"name":"Ann"}"#).unwrap();
        assert!(input.id.is_none());
        assert_eq!(input.into_contact(4).id, 4);
    }

    #[test]
    fn input_rejects_missing_name() {
        let result: Result<ContactInput, _> = serde_json::from_str(r#"{"id":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn errors_map_to_statuses() {
        assert_eq!(ServerError::NotFound(1).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServerError::IdMismatch { path: 1, body: 2 }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ServerError::NotFound(9).to_string(), "contact 9 not found");
    }
}
