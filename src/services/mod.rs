//! Services Layer
//!
//! Business logic behind the REST handlers. Handlers only extract request
//! data and hand it to a service; services talk to the database.
//!
//! # Services
//!
//! - `WatchlistService` - Snapshot save/load, history, database info
//! - `BlogService` - Blog CRUD and inline image storage

pub mod blog_service;
pub mod watchlist_service;

pub use blog_service::BlogService;
pub use watchlist_service::WatchlistService;
