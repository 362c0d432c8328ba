//! Resource records exchanged with the API.
//!
//! # Design
//! The client is generic over `Resource`; it needs nothing from a record
//! beyond serde support and the identifier used to address `update`.
//! `Contact` mirrors the mock-server's schema but is defined independently;
//! integration tests catch any drift between the two crates.

use std::fmt::Display;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A record type the client can list, create, update and remove.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Id: Display + Clone + Send + Sync + 'static;

    /// The server-assigned identifier, if the record has one yet.
    fn id(&self) -> Option<&Self::Id>;
}

/// A single contact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Contact {
    /// A contact with only a name, not yet stored on the server.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: None,
            phone: None,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

impl Resource for Contact {
    type Id = u64;

    fn id(&self) -> Option<&u64> {
        self.id.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_are_omitted() {
        let json = serde_json::to_value(Contact::new("Ann").with_id(7)).unwrap();
        assert_eq!(json, serde_json::json!({"id": 7, "name": "Ann"}));
    }

    #[test]
    fn new_contact_serializes_without_id() {
        let json = serde_json::to_value(Contact::new("Bob").with_email("bob@example.com")).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["email"], "bob@example.com");
    }

    #[test]
    fn missing_optional_fields_deserialize_as_none() {
        let contact: Contact = serde_json::from_str(r#"{"id":3,"name":"Cy"}"#).unwrap();
        assert_eq!(contact.id(), Some(&3));
        assert!(contact.email.is_none());
        assert!(contact.phone.is_none());
    }

    #[test]
    fn name_is_required() {
        let result: Result<Contact, _> = serde_json::from_str(r#"{"id":3}"#);
        assert!(result.is_err());
    }
}
