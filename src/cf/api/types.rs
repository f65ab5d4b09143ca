//! Wire types for the Cloud Foundry v3 API and the request structs used by
//! the operations layer.
//!
//! The deserialized types mirror the subset of the v3 resource shapes this
//! tool reads; the request structs carry exactly the knobs the original
//! deployment flows set (sizing, buildpack pinning, start suppression and
//! staging/startup budgets).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Generic paginated response wrapper (v3 list endpoints)
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    /// Resources on this page
    pub resources: Vec<T>,
    /// Pagination block
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Pagination links
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    /// Total number of results across pages
    pub total_results: u64,
    /// Link to the next page, if any
    #[serde(default)]
    pub next: Option<Link>,
}

/// An href link
#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    /// Absolute URL
    pub href: String,
}

/// An application resource
#[derive(Debug, Clone, Deserialize)]
pub struct AppResource {
    /// Application GUID
    pub guid: String,
    /// Application name
    pub name: String,
    /// STARTED / STOPPED
    pub state: String,
    /// Lifecycle (buildpack vs docker)
    pub lifecycle: Lifecycle,
}

/// Application lifecycle block
#[derive(Debug, Clone, Deserialize)]
pub struct Lifecycle {
    /// "buildpack" or "docker"
    #[serde(rename = "type")]
    pub kind: String,
    /// Lifecycle data
    pub data: LifecycleData,
}

/// Buildpack lifecycle data
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LifecycleData {
    /// Assigned buildpacks (empty when auto-detected and not yet staged)
    #[serde(default)]
    pub buildpacks: Vec<String>,
    /// Root filesystem stack
    #[serde(default)]
    pub stack: Option<String>,
}

/// A process resource (web process carries the sizing)
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessResource {
    /// Process GUID
    pub guid: String,
    /// Process type ("web", "worker", ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Desired instance count
    pub instances: u32,
    /// Memory per instance, MB
    pub memory_in_mb: u32,
    /// Disk per instance, MB
    pub disk_in_mb: u32,
}

/// The app environment as returned by `GET /v3/apps/:guid/env`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppEnvironment {
    /// User-provided environment variables only
    #[serde(default)]
    pub environment_variables: BTreeMap<String, serde_json::Value>,
}

/// An organization resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationResource {
    /// Organization GUID
    pub guid: String,
    /// Organization name
    pub name: String,
}

/// A space resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceResource {
    /// Space GUID
    pub guid: String,
    /// Space name
    pub name: String,
}

/// A route resource
#[derive(Debug, Clone, Deserialize)]
pub struct RouteResource {
    /// Route GUID
    pub guid: String,
    /// Fully qualified URL (host.domain/path)
    pub url: String,
    /// Host part
    #[serde(default)]
    pub host: String,
}

/// A service instance resource
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceInstanceResource {
    /// Service instance GUID
    pub guid: String,
    /// Service instance name
    pub name: String,
    /// "managed" or "user-provided"
    #[serde(rename = "type")]
    pub kind: String,
}

/// A staging build resource
#[derive(Debug, Clone, Deserialize)]
pub struct BuildResource {
    /// Build GUID
    pub guid: String,
    /// STAGING / STAGED / FAILED
    pub state: String,
    /// Error detail when state is FAILED
    #[serde(default)]
    pub error: Option<String>,
    /// Resulting droplet, present once staged
    #[serde(default)]
    pub droplet: Option<DropletRef>,
}

/// Reference to a droplet
#[derive(Debug, Clone, Deserialize)]
pub struct DropletRef {
    /// Droplet GUID
    pub guid: String,
}

/// A package resource (uploaded source bits)
#[derive(Debug, Clone, Deserialize)]
pub struct PackageResource {
    /// Package GUID
    pub guid: String,
    /// AWAITING_UPLOAD / PROCESSING_UPLOAD / READY / FAILED
    pub state: String,
}

/// A container-to-container network policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkPolicy {
    /// Source application GUID
    pub source_guid: String,
    /// Destination application GUID
    pub destination_guid: String,
    /// "tcp" or "udp"
    pub protocol: String,
    /// First port in the allowed range
    pub start_port: u16,
    /// Last port in the allowed range
    pub end_port: u16,
}

/// Raw error body returned by the v3 API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error entries
    #[serde(default)]
    pub errors: Vec<ApiErrorEntry>,
}

/// One error entry in a v3 error body
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEntry {
    /// Numeric CF error code
    #[serde(default)]
    pub code: Option<u32>,
    /// Short title, e.g. "CF-ResourceNotFound"
    #[serde(default)]
    pub title: String,
    /// Human-readable detail
    #[serde(default)]
    pub detail: String,
}

impl ApiErrorResponse {
    /// Best-effort single message out of the error body
    pub fn message(&self) -> String {
        self.errors
            .iter()
            .map(|e| {
                if e.detail.is_empty() {
                    e.title.clone()
                } else {
                    e.detail.clone()
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// =============================================================================
// Request structs consumed by the operations layer
// =============================================================================

/// Parameters for pushing an application from a local source tree
#[derive(Debug, Clone)]
pub struct PushRequest {
    /// Target application name
    pub name: String,
    /// Local directory containing the source tree to upload
    pub source_path: PathBuf,
    /// When true, the app is left stopped after staging
    pub no_start: bool,
    /// Memory per instance, MB
    pub memory_mb: u32,
    /// Disk per instance, MB
    pub disk_mb: u32,
    /// Desired instance count
    pub instances: u32,
    /// Buildpack to pin; `None` lets the platform auto-detect
    pub buildpack: Option<String>,
    /// How long to wait for staging to complete
    pub staging_timeout: Duration,
}

/// Parameters for copying staged source bits between applications
#[derive(Debug, Clone)]
pub struct CopySourceRequest {
    /// Application to copy from
    pub source_name: String,
    /// Application to copy onto
    pub target_name: String,
    /// Restage and restart the target after copying
    pub restart: bool,
    /// Staging wait budget (only consulted when restarting)
    pub staging_timeout: Duration,
    /// Startup wait budget (only consulted when restarting)
    pub startup_timeout: Duration,
}

/// Parameters for scaling an application's web process
#[derive(Debug, Clone)]
pub struct ScaleRequest {
    /// Application name
    pub name: String,
    /// New memory per instance, MB
    pub memory_mb: Option<u32>,
    /// New disk per instance, MB
    pub disk_mb: Option<u32>,
    /// New instance count
    pub instances: Option<u32>,
}

/// Parameters for starting an application
#[derive(Debug, Clone)]
pub struct StartRequest {
    /// Application name
    pub name: String,
    /// Staging wait budget (a stopped app may need restaging)
    pub staging_timeout: Duration,
    /// Startup wait budget
    pub startup_timeout: Duration,
}

/// Descriptive view of one application, assembled from the app resource and
/// its web process. This is what the snapshot service and the tools consume.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDetail {
    /// Application name
    pub name: String,
    /// STARTED / STOPPED
    pub state: String,
    /// Memory per instance, MB
    pub memory_mb: u32,
    /// Disk per instance, MB
    pub disk_mb: u32,
    /// Desired instance count
    pub instances: u32,
    /// Assigned buildpacks
    pub buildpacks: Vec<String>,
    /// Root filesystem stack, when known
    pub stack: Option<String>,
}

/// Summary row for application listings
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationSummary {
    /// Application name
    pub name: String,
    /// STARTED / STOPPED
    pub state: String,
    /// Desired instance count
    pub instances: u32,
    /// Memory per instance, MB
    pub memory_mb: u32,
}
