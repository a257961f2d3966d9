pub mod tour;
pub mod validation;
pub mod search;
pub mod pagination;
pub mod format;
pub mod repository;

pub use tour::{Availability, Tour, TourStatus};
pub use validation::{NewTour, ValidTour};
pub use search::{Predicate, TourFilter, TourSearchParams};
pub use pagination::{Page, PageRequest, DEFAULT_PER_PAGE};
pub use format::format_date;
pub use repository::TourRepository;

#[derive(Debug, thiserror::Error)]
pub enum TourError {
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("Seed record {external_id} is invalid: {errors}")]
    InvalidSeed {
        external_id: String,
        errors: validator::ValidationErrors,
    },
    #[error("Seed document could not be read: {0}")]
    Seed(String),
    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TourError {
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage(Box::new(err))
    }
}

pub type TourResult<T> = Result<T, TourError>;
