//! Cached person lookups.

use std::sync::Arc;

use crate::application::cache::{keys, read_through};
use crate::domain::foundation::PersonId;
use crate::domain::people::Person;
use crate::domain::GymError;
use crate::ports::{Cache, PersonRepository};

/// Most people returned by a name search.
pub const NAME_SEARCH_LIMIT: u32 = 20;

pub struct PeopleQueries {
    people: Arc<dyn PersonRepository>,
    cache: Arc<dyn Cache>,
}

impl PeopleQueries {
    pub fn new(people: Arc<dyn PersonRepository>, cache: Arc<dyn Cache>) -> Self {
        Self { people, cache }
    }

    pub async fn all(&self) -> Result<Vec<Person>, GymError> {
        read_through(self.cache.as_ref(), keys::PEOPLE_ALL, keys::LIST_TTL, || async {
            self.people.list_all().await.map_err(GymError::from)
        })
        .await
    }

    /// Case-insensitive substring search, ordered by name.
    pub async fn by_name(&self, query: &str) -> Result<Vec<Person>, GymError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GymError::validation("name", "name is required"));
        }
        read_through(
            self.cache.as_ref(),
            &keys::people_by_name(query),
            keys::ENTITY_TTL,
            || async {
                self.people
                    .search_by_name(query, NAME_SEARCH_LIMIT)
                    .await
                    .map_err(GymError::from)
            },
        )
        .await
    }

    pub async fn by_id(&self, id: PersonId) -> Result<Person, GymError> {
        read_through(
            self.cache.as_ref(),
            &keys::person_by_id(id),
            keys::ENTITY_TTL,
            || async {
                self.people
                    .find_by_id(id)
                    .await
                    .map_err(GymError::from)?
                    .ok_or_else(|| GymError::PersonNotFound(id.to_string()))
            },
        )
        .await
    }
}
