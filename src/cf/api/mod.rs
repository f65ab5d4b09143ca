//! Cloud Foundry v3 API access
//!
//! This module provides:
//! - An authenticated reqwest client for the v3 (and networking) endpoints
//! - The wire types and request structs shared with the operations layer
//! - The transport error taxonomy, including transient classification

pub mod client;
pub mod error;
pub mod types;

pub use client::{package_source_tree, CfApiClient};
pub use error::{CfApiError, Result};
