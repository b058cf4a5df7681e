pub mod catalog;
pub mod db;
pub mod jobs;
pub mod ratings;

pub use catalog::{list_ratings, MAX_PAGE_SIZE};
pub use db::RatingsDb;
pub use jobs::SqliteJobStore;
pub use ratings::SqliteRatingStore;
