//! Ratings Core
//!
//! Shared domain types for analyst rating ingestion and trading-window
//! analysis, plus the collaborator traits the other crates implement.

pub mod error;
pub mod price;
pub mod traits;
pub mod types;

pub use error::*;
pub use price::parse_price;
pub use traits::*;
pub use types::*;
