use async_trait::async_trait;
use chrono::NaiveDate;

use crate::pagination::{Page, PageRequest};
use crate::search::TourFilter;
use crate::tour::Tour;
use crate::validation::{NewTour, ValidTour};
use crate::TourResult;

/// Repository trait for tour data access
#[async_trait]
pub trait TourRepository: Send + Sync {
    /// Tours matching every predicate of `filter`, ordered by start date, name and id.
    async fn search(&self, filter: &TourFilter, page: PageRequest) -> TourResult<Page<Tour>>;

    /// Inserts the tour, or updates the stored tour with the same external id.
    async fn upsert(&self, tour: &ValidTour) -> TourResult<Tour>;

    /// Validates and then upserts; nothing is written when validation fails.
    async fn save(&self, tour: NewTour) -> TourResult<Tour> {
        let valid = tour.into_valid()?;
        self.upsert(&valid).await
    }

    async fn find_by_external_id(&self, external_id: &str) -> TourResult<Option<Tour>>;

    /// Distinct tour names, ordered by name.
    async fn destination_names(&self) -> TourResult<Vec<String>>;

    /// Distinct day counts, ascending.
    async fn day_counts(&self) -> TourResult<Vec<i32>>;

    /// Distinct start dates, ascending.
    async fn start_dates(&self) -> TourResult<Vec<NaiveDate>>;
}
