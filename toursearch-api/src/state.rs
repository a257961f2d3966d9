use std::sync::Arc;

use toursearch_core::TourRepository;

use crate::views::Views;

#[derive(Clone)]
pub struct AppState {
    pub tours: Arc<dyn TourRepository>,
    pub views: Arc<Views>,
    pub per_page: u32,
}

impl AppState {
    pub fn new(tours: Arc<dyn TourRepository>, per_page: u32) -> Result<Self, tera::Error> {
        Ok(Self {
            tours,
            views: Arc::new(Views::new()?),
            per_page,
        })
    }
}
