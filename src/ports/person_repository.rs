//! Person repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PersonId};
use crate::domain::people::{Person, PersonDetails};

/// Repository port for gym members.
#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// Stores a new person and returns the assigned id.
    ///
    /// # Errors
    ///
    /// - `PersonExists` if the phone is already registered
    /// - `DatabaseError` on persistence failure
    async fn save(&self, details: &PersonDetails) -> Result<PersonId, DomainError>;

    /// Replaces name and phone of an existing person.
    ///
    /// # Errors
    ///
    /// - `PersonNotFound` if the id is unknown
    /// - `PersonExists` if the phone belongs to someone else
    async fn update(&self, person: &Person) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `PersonNotFound` if the id is unknown
    /// - `PersonInUse` if the person still owns subscriptions
    async fn delete(&self, id: PersonId) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: PersonId) -> Result<Option<Person>, DomainError>;

    /// Case-insensitive substring search on full name, ordered by name.
    async fn search_by_name(&self, fragment: &str, limit: u32)
        -> Result<Vec<Person>, DomainError>;

    async fn list_all(&self) -> Result<Vec<Person>, DomainError>;
}
