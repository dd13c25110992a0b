//! HTTP layer of the anime catalog service.
//!
//! A thin axum facade: every route performs one storage call, light shape
//! translation, and the existence/validity checks the contract requires.
//! Exposed as a library so integration tests can build the exact router the
//! binary serves.

pub mod config;
pub mod error;
pub mod extract;
pub mod query;
pub mod router;
pub mod routes;
pub mod state;
