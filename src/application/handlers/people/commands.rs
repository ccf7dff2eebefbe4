//! Person command handlers.
//!
//! A person's name shows up inside cached subscription views and the
//! headcount feeds the statistics, so every mutation clears the people
//! caches, every person-subscription read and the statistics family.

use std::sync::Arc;

use crate::application::cache::{keys, CacheInvalidator, PERSON_SUBSCRIPTION_FAMILY};
use crate::domain::foundation::PersonId;
use crate::domain::people::PersonDetails;
use crate::domain::GymError;
use crate::ports::{Cache, PersonRepository};

async fn invalidate_people(invalidator: &CacheInvalidator) {
    invalidator.delete_prefix(keys::PEOPLE_PREFIX).await;
    invalidator.invalidate(&PERSON_SUBSCRIPTION_FAMILY).await;
    invalidator.statistics().await;
}

/// Command to register a gym member.
#[derive(Debug, Clone)]
pub struct AddPersonCommand {
    pub full_name: String,
    pub phone: String,
}

pub struct AddPersonHandler {
    people: Arc<dyn PersonRepository>,
    invalidator: CacheInvalidator,
}

impl AddPersonHandler {
    pub fn new(people: Arc<dyn PersonRepository>, cache: Arc<dyn Cache>) -> Self {
        Self {
            people,
            invalidator: CacheInvalidator::new(cache),
        }
    }

    /// # Errors
    ///
    /// `PersonExists` when the phone is already registered.
    pub async fn handle(&self, cmd: AddPersonCommand) -> Result<PersonId, GymError> {
        let details = PersonDetails::new(&cmd.full_name, &cmd.phone)?;
        let id = self.people.save(&details).await?;
        tracing::info!(person_id = %id, "Person added");
        invalidate_people(&self.invalidator).await;
        Ok(id)
    }
}

/// Command to replace a member's name and phone.
#[derive(Debug, Clone)]
pub struct UpdatePersonCommand {
    pub id: PersonId,
    pub full_name: String,
    pub phone: String,
}

pub struct UpdatePersonHandler {
    people: Arc<dyn PersonRepository>,
    invalidator: CacheInvalidator,
}

impl UpdatePersonHandler {
    pub fn new(people: Arc<dyn PersonRepository>, cache: Arc<dyn Cache>) -> Self {
        Self {
            people,
            invalidator: CacheInvalidator::new(cache),
        }
    }

    pub async fn handle(&self, cmd: UpdatePersonCommand) -> Result<(), GymError> {
        let person = PersonDetails::new(&cmd.full_name, &cmd.phone)?.into_person(cmd.id);
        self.people.update(&person).await?;
        tracing::info!(person_id = %cmd.id, "Person updated");
        invalidate_people(&self.invalidator).await;
        Ok(())
    }
}

pub struct DeletePersonHandler {
    people: Arc<dyn PersonRepository>,
    invalidator: CacheInvalidator,
}

impl DeletePersonHandler {
    pub fn new(people: Arc<dyn PersonRepository>, cache: Arc<dyn Cache>) -> Self {
        Self {
            people,
            invalidator: CacheInvalidator::new(cache),
        }
    }

    /// # Errors
    ///
    /// `PersonInUse` while the person still owns subscriptions.
    pub async fn handle(&self, id: PersonId) -> Result<(), GymError> {
        self.people.delete(id).await?;
        tracing::info!(person_id = %id, "Person deleted");
        invalidate_people(&self.invalidator).await;
        Ok(())
    }
}
