//! Pet Store data model and local validation.

mod factory;

pub use factory::{updated_variant, PetFactory};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest pet id the backend accepts.
pub const MAX_PET_ID: u64 = 999_999_999;

/// Listing state of a pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    Available,
    Pending,
    Sold,
}

impl PetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PetStatus::Available => "available",
            PetStatus::Pending => "pending",
            PetStatus::Sold => "sold",
        }
    }

    /// The status an update flips to: sold pets go back on sale, everything
    /// else gets sold.
    pub fn toggled(self) -> PetStatus {
        match self {
            PetStatus::Sold => PetStatus::Available,
            PetStatus::Available | PetStatus::Pending => PetStatus::Sold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: u64,
    pub name: String,
}

/// Wire representation of a pet record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: u64,
    pub name: String,
    #[serde(rename = "photoUrls", default)]
    pub photo_urls: Vec<String>,
    pub status: PetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

/// A record failed local validation before it was ever sent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("pet id {id} outside the valid range 1..={max}", max = MAX_PET_ID)]
    IdOutOfRange { id: u64 },
    #[error("pet name must not be empty")]
    EmptyName,
}

/// Check an id against the range the backend accepts.
pub fn validate_pet_id(id: u64) -> Result<(), ModelError> {
    if id == 0 || id > MAX_PET_ID {
        return Err(ModelError::IdOutOfRange { id });
    }
    Ok(())
}

impl Pet {
    /// Validate the record locally the way the backend is supposed to.
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_pet_id(self.id)?;
        if self.name.trim().is_empty() {
            return Err(ModelError::EmptyName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pet(id: u64, name: &str) -> Pet {
        Pet {
            id,
            name: name.to_string(),
            photo_urls: vec!["https://example.com/photos/1.jpg".to_string()],
            status: PetStatus::Available,
            category: None,
            tags: None,
        }
    }

    #[test]
    fn id_boundaries() {
        assert!(validate_pet_id(1).is_ok());
        assert!(validate_pet_id(MAX_PET_ID).is_ok());
        assert_eq!(
            validate_pet_id(0),
            Err(ModelError::IdOutOfRange { id: 0 })
        );
        assert_eq!(
            validate_pet_id(MAX_PET_ID + 1),
            Err(ModelError::IdOutOfRange { id: MAX_PET_ID + 1 })
        );
    }

    #[test]
    fn name_must_not_be_blank() {
        assert!(pet(1, "Buddy").validate().is_ok());
        assert_eq!(pet(1, "").validate(), Err(ModelError::EmptyName));
        assert_eq!(pet(1, "   ").validate(), Err(ModelError::EmptyName));
    }

    #[test]
    fn status_toggle_is_sold_centric() {
        assert_eq!(PetStatus::Available.toggled(), PetStatus::Sold);
        assert_eq!(PetStatus::Pending.toggled(), PetStatus::Sold);
        assert_eq!(PetStatus::Sold.toggled(), PetStatus::Available);
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let p = pet(7, "Buddy");
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["photoUrls"][0], "https://example.com/photos/1.jpg");
        assert_eq!(v["status"], "available");
        assert!(v.get("category").is_none());
    }

    #[test]
    fn deserializes_backend_shape() {
        let json = r#"{
            "id": 42,
            "name": "Lucy",
            "photoUrls": ["https://example.com/photos/42.jpg"],
            "status": "pending",
            "category": {"id": 2, "name": "Cats"},
            "tags": [{"id": 1, "name": "friendly"}]
        }"#;
        let p: Pet = serde_json::from_str(json).unwrap();
        assert_eq!(p.id, 42);
        assert_eq!(p.status, PetStatus::Pending);
        assert_eq!(p.category.as_ref().map(|c| c.name.as_str()), Some("Cats"));
        assert_eq!(p.tags.as_ref().map(|t| t.len()), Some(1));
    }

    #[test]
    fn deserializes_without_photo_urls() {
        let p: Pet = serde_json::from_str(r#"{"id": 1, "name": "Max", "status": "sold"}"#).unwrap();
        assert!(p.photo_urls.is_empty());
    }
}
