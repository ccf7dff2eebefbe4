//! Request and response shapes shared by several resources.

use serde::{Deserialize, Serialize};

/// Body of a successful create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse<T> {
    pub id: T,
}

/// Body of a successful update or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `?name=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

/// `?from=&to=`, both `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// `?date=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DayQuery {
    pub date: Option<String>,
}

/// A single count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalResponse {
    pub total: i64,
}

/// A single money amount in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeResponse {
    pub income: i64,
}
