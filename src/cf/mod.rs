//! Cloud Foundry platform access: transport client, operations seam,
//! per-target handle caching and transient-failure retry.

pub mod api;
pub mod context;
pub mod ops;
pub mod retry;

pub use api::{CfApiClient, CfApiError};
pub use context::{OperationsCache, TargetContext};
pub use ops::{CloudOperations, HttpCloudOperations, OperationsHandle};
pub use retry::{execute_with_retry, RetryPolicy};
