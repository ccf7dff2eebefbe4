use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::foundation::{DomainError, ErrorCode, SingleVisitId};
use crate::domain::statistics::DateRange;
use crate::domain::visits::{SingleVisit, SingleVisitDetails};
use crate::ports::SingleVisitRepository;

use super::InMemoryStore;

fn newest_first(mut visits: Vec<SingleVisit>) -> Vec<SingleVisit> {
    visits.sort_by(|a, b| b.visit_date.cmp(&a.visit_date).then(b.id.cmp(&a.id)));
    visits
}

#[async_trait]
impl SingleVisitRepository for InMemoryStore {
    async fn save(&self, details: &SingleVisitDetails) -> Result<SingleVisitId, DomainError> {
        let mut state = self.state.write().await;
        let id = SingleVisitId::new(state.next_id())
            .map_err(|e| DomainError::database(e.to_string()))?;
        state.visits.insert(
            id.as_i64(),
            SingleVisit {
                id,
                visit_date: details.visit_date,
                final_price: details.final_price,
            },
        );
        Ok(id)
    }

    async fn delete(&self, id: SingleVisitId) -> Result<(), DomainError> {
        match self.state.write().await.visits.remove(&id.as_i64()) {
            Some(_) => Ok(()),
            None => Err(DomainError::new(
                ErrorCode::SingleVisitNotFound,
                format!("single visit {} not found", id),
            )
            .with_detail("id", id.to_string())),
        }
    }

    async fn find_by_id(&self, id: SingleVisitId) -> Result<Option<SingleVisit>, DomainError> {
        Ok(self.state.read().await.visits.get(&id.as_i64()).cloned())
    }

    async fn list_all(&self) -> Result<Vec<SingleVisit>, DomainError> {
        let state = self.state.read().await;
        Ok(newest_first(state.visits.values().cloned().collect()))
    }

    async fn list_by_day(&self, day: NaiveDate) -> Result<Vec<SingleVisit>, DomainError> {
        let state = self.state.read().await;
        Ok(newest_first(
            state
                .visits
                .values()
                .filter(|v| v.visit_date == day)
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_period(&self, range: &DateRange) -> Result<Vec<SingleVisit>, DomainError> {
        let state = self.state.read().await;
        Ok(newest_first(
            state
                .visits
                .values()
                .filter(|v| range.contains(v.visit_date))
                .cloned()
                .collect(),
        ))
    }
}
