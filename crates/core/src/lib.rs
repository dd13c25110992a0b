//! Domain model for the anime catalog: document shapes, sparse-patch
//! semantics, stream resolution, and payload validation.
//!
//! Everything here is backend-agnostic; the storage backends in
//! `anibase-store` and the HTTP layer in `anibase-api` build on these types.

pub mod catalog;
pub mod error;
pub mod pagination;
pub mod types;
pub mod update;
pub mod validation;
