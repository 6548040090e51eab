//! REST API
//!
//! Routes:
//! - Watchlist snapshots (/api/save-watchlist, /api/load-watchlist, ...)
//! - Blogs and their images (/api/blogs, /api/images/{id})
//! - Static browser pages for every other path

pub mod handlers;
pub mod server;
pub mod types;

pub use server::{router, ApiServer};
