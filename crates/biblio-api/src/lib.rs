//! # biblio-api
//!
//! HTTP API server for Biblio document discovery.
//!
//! This crate provides the HTTP surface over the discovery core:
//! - `POST /search` — filtered, ranked, highlighted document pages
//! - `POST /search/suggestions` — typeahead fragments
//! - `GET /recommendations` — seeded or preference-only recommendations
//! - Bearer-token authentication middleware
//! - Error-to-status mapping

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

pub use auth::{AuthLayer, Principal, StaticTokenValidator, TokenValidator};
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
