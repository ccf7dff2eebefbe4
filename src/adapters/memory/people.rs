use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, PersonId};
use crate::domain::people::{Person, PersonDetails};
use crate::ports::PersonRepository;

use super::{person_id_of, person_not_found, InMemoryStore};

fn person_exists(phone: &str) -> DomainError {
    DomainError::new(
        ErrorCode::PersonExists,
        format!("phone {} is already registered", phone),
    )
    .with_detail("phone", phone)
}

#[async_trait]
impl PersonRepository for InMemoryStore {
    async fn save(&self, details: &PersonDetails) -> Result<PersonId, DomainError> {
        let mut state = self.state.write().await;
        if state.people.values().any(|p| p.phone == details.phone()) {
            return Err(person_exists(details.phone()));
        }
        let id = person_id_of(state.next_id())?;
        state
            .people
            .insert(id.as_i64(), details.clone().into_person(id));
        Ok(id)
    }

    async fn update(&self, person: &Person) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state
            .people
            .values()
            .any(|p| p.id != person.id && p.phone == person.phone)
        {
            return Err(person_exists(&person.phone));
        }
        match state.people.get_mut(&person.id.as_i64()) {
            Some(stored) => {
                *stored = person.clone();
                Ok(())
            }
            None => Err(person_not_found(person.id)),
        }
    }

    async fn delete(&self, id: PersonId) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if !state.people.contains_key(&id.as_i64()) {
            return Err(person_not_found(id));
        }
        if state.subscriptions.values().any(|s| s.person_id == id) {
            return Err(DomainError::new(
                ErrorCode::PersonInUse,
                format!("person {} still has subscriptions", id),
            )
            .with_detail("person", id.to_string()));
        }
        state.people.remove(&id.as_i64());
        Ok(())
    }

    async fn find_by_id(&self, id: PersonId) -> Result<Option<Person>, DomainError> {
        Ok(self.state.read().await.people.get(&id.as_i64()).cloned())
    }

    async fn search_by_name(&self, fragment: &str, limit: u32) -> Result<Vec<Person>, DomainError> {
        let needle = fragment.to_lowercase();
        let state = self.state.read().await;
        let mut found: Vec<Person> = state
            .people
            .values()
            .filter(|p| p.full_name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn list_all(&self) -> Result<Vec<Person>, DomainError> {
        let state = self.state.read().await;
        let mut people: Vec<Person> = state.people.values().cloned().collect();
        people.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        Ok(people)
    }
}
