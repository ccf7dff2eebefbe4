//! Gym members.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{FieldErrors, PersonId};

/// A registered gym member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub full_name: String,
    pub phone: String,
}

/// Editable member fields, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonDetails {
    full_name: String,
    phone: String,
}

impl PersonDetails {
    pub const MAX_NAME_LEN: usize = 200;

    /// # Errors
    ///
    /// Reports a blank or overlong name. A phone must hold 5 to 15 digits
    /// and nothing besides digits, spaces, `+`, `-`, `(` and `)`.
    pub fn new(full_name: &str, phone: &str) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let full_name = full_name.trim();
        if full_name.is_empty() {
            errors.add("full_name", "full_name is required");
        } else if full_name.chars().count() > Self::MAX_NAME_LEN {
            errors.add("full_name", "full_name is too long");
        }

        let phone = phone.trim();
        let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
        if phone.is_empty() {
            errors.add("phone", "phone is required");
        } else if !phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
            || !(5..=15).contains(&digits)
        {
            errors.add("phone", "phone must contain 5 to 15 digits");
        }

        errors.into_result()?;
        Ok(Self {
            full_name: full_name.to_string(),
            phone: phone.to_string(),
        })
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn into_person(self, id: PersonId) -> Person {
        Person {
            id,
            full_name: self.full_name,
            phone: self.phone,
        }
    }
}
