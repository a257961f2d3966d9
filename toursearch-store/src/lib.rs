pub mod app_config;
pub mod database;
pub mod tour_repo;
pub mod memory_repo;
pub mod seed;

pub use database::DbClient;
pub use tour_repo::PostgresTourRepository;
pub use memory_repo::InMemoryTourRepository;
