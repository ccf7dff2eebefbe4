//! PostgreSQL implementation of PersonRepository.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, ErrorCode, PersonId};
use crate::domain::people::{Person, PersonDetails};
use crate::ports::PersonRepository;

use super::errors::{
    corrupt, db_error, is_foreign_key_violation, is_unique_violation, person_in_use,
    person_not_found,
};

const PHONE_KEY: &str = "person_phone_key";
const SUBSCRIPTION_PERSON_FKEY: &str = "person_subscriptions_person_id_fkey";

/// PostgreSQL implementation of PersonRepository.
#[derive(Clone)]
pub struct PostgresPersonRepository {
    pool: PgPool,
}

impl PostgresPersonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn person_exists(phone: &str) -> DomainError {
    DomainError::new(
        ErrorCode::PersonExists,
        format!("phone {} is already registered", phone),
    )
    .with_detail("phone", phone)
}

fn row_to_person(row: sqlx::postgres::PgRow) -> Result<Person, DomainError> {
    Ok(Person {
        id: corrupt("person.id", PersonId::new(row.get("id")))?,
        full_name: row.get("full_name"),
        phone: row.get("phone"),
    })
}

#[async_trait]
impl PersonRepository for PostgresPersonRepository {
    async fn save(&self, details: &PersonDetails) -> Result<PersonId, DomainError> {
        let id: i64 =
            sqlx::query_scalar("INSERT INTO person (full_name, phone) VALUES ($1, $2) RETURNING id")
                .bind(details.full_name())
                .bind(details.phone())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e, PHONE_KEY) {
                        person_exists(details.phone())
                    } else {
                        db_error("insert person", e)
                    }
                })?;

        corrupt("person.id", PersonId::new(id))
    }

    async fn update(&self, person: &Person) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE person SET full_name = $2, phone = $3 WHERE id = $1")
            .bind(person.id.as_i64())
            .bind(&person.full_name)
            .bind(&person.phone)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e, PHONE_KEY) {
                    person_exists(&person.phone)
                } else {
                    db_error("update person", e)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(person_not_found(person.id));
        }
        Ok(())
    }

    async fn delete(&self, id: PersonId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM person WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e, SUBSCRIPTION_PERSON_FKEY) {
                    person_in_use(id)
                } else {
                    db_error("delete person", e)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(person_not_found(id));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: PersonId) -> Result<Option<Person>, DomainError> {
        let row = sqlx::query("SELECT id, full_name, phone FROM person WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("fetch person", e))?;

        row.map(row_to_person).transpose()
    }

    async fn search_by_name(&self, fragment: &str, limit: u32) -> Result<Vec<Person>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, full_name, phone
            FROM person
            WHERE full_name ILIKE '%' || $1 || '%'
            ORDER BY full_name, id
            LIMIT $2
            "#,
        )
        .bind(escape_like(fragment))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("search people", e))?;

        rows.into_iter().map(row_to_person).collect()
    }

    async fn list_all(&self) -> Result<Vec<Person>, DomainError> {
        let rows = sqlx::query("SELECT id, full_name, phone FROM person ORDER BY full_name, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list people", e))?;

        rows.into_iter().map(row_to_person).collect()
    }
}

/// Makes `%`, `_` and `\` match literally inside an ILIKE pattern.
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
