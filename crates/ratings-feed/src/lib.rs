//! Client for the external analyst-rating feed and the cursor drain built on it.

mod client;
mod pager;

pub use client::{FeedClient, FeedConfig};
pub use pager::FeedPager;
