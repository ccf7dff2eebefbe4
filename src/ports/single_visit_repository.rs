//! Single-visit repository port.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::foundation::{DomainError, SingleVisitId};
use crate::domain::statistics::DateRange;
use crate::domain::visits::{SingleVisit, SingleVisitDetails};

/// Repository port for single-visit sales. Lists are ordered by visit date,
/// newest first, then by id.
#[async_trait]
pub trait SingleVisitRepository: Send + Sync {
    async fn save(&self, details: &SingleVisitDetails) -> Result<SingleVisitId, DomainError>;

    /// # Errors
    ///
    /// - `SingleVisitNotFound` if no row was deleted
    async fn delete(&self, id: SingleVisitId) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: SingleVisitId) -> Result<Option<SingleVisit>, DomainError>;

    async fn list_all(&self) -> Result<Vec<SingleVisit>, DomainError>;

    async fn list_by_day(&self, day: NaiveDate) -> Result<Vec<SingleVisit>, DomainError>;

    async fn list_by_period(&self, range: &DateRange) -> Result<Vec<SingleVisit>, DomainError>;
}
