//! Generate pet records for test runs.

use std::collections::HashSet;

use rand::Rng;
use serde_json::{Map, Value};

use super::{Category, Pet, PetStatus, Tag, MAX_PET_ID};

const NAMES: [&str; 10] = [
    "Buddy", "Max", "Charlie", "Lucy", "Cooper", "Bailey", "Rocky", "Sadie", "Molly", "Tucker",
];

const CATEGORIES: [(u64, &str); 5] = [
    (1, "Dogs"),
    (2, "Cats"),
    (3, "Birds"),
    (4, "Fish"),
    (5, "Reptiles"),
];

const TAGS: [(u64, &str); 7] = [
    (1, "friendly"),
    (2, "energetic"),
    (3, "calm"),
    (4, "trained"),
    (5, "young"),
    (6, "adult"),
    (7, "senior"),
];

// Ids land well inside the backend's accepted range and away from anything
// a human would have typed in by hand.
const ID_MIN: u64 = 1_000_000;
const ID_MAX: u64 = 9_999_999;

/// Builds pets with ids that never repeat within one run.
#[derive(Debug, Default)]
pub struct PetFactory {
    issued: HashSet<u64>,
}

impl PetFactory {
    pub fn new() -> Self {
        PetFactory::default()
    }

    fn next_id(&mut self) -> u64 {
        let mut rng = rand::thread_rng();
        loop {
            let id = rng.gen_range(ID_MIN..=ID_MAX);
            if self.issued.insert(id) {
                return id;
            }
        }
    }

    /// A fresh, valid pet in the `available` state.
    pub fn pet(&mut self) -> Pet {
        self.pet_with_status(PetStatus::Available)
    }

    pub fn pet_with_status(&mut self, status: PetStatus) -> Pet {
        let id = self.next_id();
        let mut rng = rand::thread_rng();
        let name = NAMES[rng.gen_range(0..NAMES.len())];
        let (cat_id, cat_name) = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
        let (tag_id, tag_name) = TAGS[rng.gen_range(0..TAGS.len())];
        Pet {
            id,
            name: name.to_string(),
            photo_urls: vec![format!("https://example.com/photos/{}.jpg", id)],
            status,
            category: Some(Category {
                id: cat_id,
                name: cat_name.to_string(),
            }),
            tags: Some(vec![Tag {
                id: tag_id,
                name: tag_name.to_string(),
            }]),
        }
    }

    /// A pet the backend must refuse: id zero.
    pub fn pet_with_invalid_id(&mut self) -> Pet {
        let mut pet = self.pet();
        pet.id = 0;
        pet
    }

    /// A pet the backend must refuse: id past the accepted range.
    pub fn pet_with_oversized_id(&mut self) -> Pet {
        let mut pet = self.pet();
        pet.id = MAX_PET_ID + 1;
        pet
    }

    /// A pet the backend must refuse: blank name.
    pub fn pet_with_empty_name(&mut self) -> Pet {
        let mut pet = self.pet();
        pet.name = String::new();
        pet
    }
}

/// Derive the updated form of a pet plus the field values a read-back is
/// expected to show afterwards.
pub fn updated_variant(pet: &Pet) -> (Pet, Map<String, Value>) {
    let mut updated = pet.clone();
    updated.name = format!("Updated {}", pet.name);
    updated.status = pet.status.toggled();
    updated
        .photo_urls
        .push(format!("https://example.com/photos/{}-update.jpg", pet.id));
    updated.tags.get_or_insert_with(Vec::new).push(Tag {
        id: 99,
        name: "updated".to_string(),
    });

    let mut expected = Map::new();
    expected.insert("name".to_string(), Value::String(updated.name.clone()));
    expected.insert(
        "status".to_string(),
        Value::String(updated.status.as_str().to_string()),
    );
    (updated, expected)
}
