//! View controller for the network social app.
//!
//! Fetches the feed and profile JSON from the server, keeps a small view
//! model keyed by post and user id, and projects it into HTML fragments on
//! an injected [`Page`]. Likes, follows, edits and new posts go through
//! dedicated requests followed by a localized patch of the affected fragment.

pub mod auth;
pub mod config;
pub mod controller;
pub mod core;
pub mod follow;
pub mod handlers;
pub mod models;
pub mod page;
pub mod posts;
pub mod templates;
pub mod transport;

pub use config::{ClientConfig, Containers, FailurePolicy, PageContext};
pub use controller::{EditTicket, FeedController};
pub use crate::core::errors::ViewError;
pub use handlers::Action;
pub use models::models::{FeedFilter, Post, UserProfile};
pub use page::{MemoryPage, Page};
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
