//! Seam traits between the panels and the platform
//!
//! These traits define the interface between panel logic and the
//! network/storage implementations, so every panel also runs on the host
//! against canned data.

pub mod fetch;
pub mod store;

pub use fetch::{Fetch, ServiceError};
pub use store::{PhotoStore, StoreError};
