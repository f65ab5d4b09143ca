//! HTTP client for the Cloud Foundry v3 API
//!
//! Provides authenticated access to a Cloud Foundry foundation. This layer
//! speaks raw v3 resources (GUIDs, packages, builds); the operations layer
//! in `cf::ops` composes these calls into the name-based verbs the rest of
//! the tool uses.

use super::error::{CfApiError, Result};
use super::types::{
    ApiErrorResponse, AppEnvironment, AppResource, BuildResource, NetworkPolicy,
    OrganizationResource, PackageResource, Paginated, ProcessResource, RouteResource,
    ServiceInstanceResource, SpaceResource,
};
use log::{debug, trace};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

/// User agent for API requests
const USER_AGENT: &str = concat!("cf-pulse/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout; long waits (staging, startup) are handled by
/// polling, never by a single long request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Poll interval while waiting on packages, builds and process stats
const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Client for the Cloud Foundry v3 API
pub struct CfApiClient {
    /// HTTP client with configured timeout and headers
    http_client: Client,
    /// Base API URL, e.g. `https://api.sys.example.com`
    api_url: String,
    /// OAuth bearer token
    token: String,
}

impl CfApiClient {
    /// Create a new client for the given API endpoint.
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Self::build(api_url, token, false)
    }

    /// Create a client that accepts self-signed certificates.
    ///
    /// Matches the original's `cf.skipSslValidation` switch for lab
    /// foundations with self-signed endpoints.
    pub fn new_insecure(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Self::build(api_url, token, true)
    }

    fn build(api_url: impl Into<String>, token: impl Into<String>, insecure: bool) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT);
        if insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http_client = builder.build().map_err(CfApiError::HttpError)?;

        let mut api_url = api_url.into();
        while api_url.ends_with('/') {
            api_url.pop();
        }

        Ok(Self {
            http_client,
            api_url,
            token: token.into(),
        })
    }

    /// Get the configured API URL
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_url, path);
        trace!("{} {}", method, url);
        self.http_client
            .request(method, url)
            .bearer_auth(&self.token)
    }

    /// Make an authenticated GET request
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path).send().await?;
        self.handle_response(response).await
    }

    /// Make an authenticated POST request with a JSON body
    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        self.handle_response(response).await
    }

    /// Make an authenticated PATCH request with a JSON body
    async fn patch<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let response = self.request(Method::PATCH, path).json(body).send().await?;
        self.handle_response(response).await
    }

    /// Make an authenticated DELETE request, ignoring the response body
    async fn delete(&self, path: &str) -> Result<()> {
        let response = self.request(Method::DELETE, path).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.error_from(status, response).await)
        }
    }

    /// Handle the HTTP response, converting errors appropriately
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| CfApiError::ParseError(e.to_string()))
        } else {
            Err(self.error_from(status, response).await)
        }
    }

    async fn error_from(&self, status: StatusCode, response: reqwest::Response) -> CfApiError {
        let status_code = status.as_u16();
        let error_body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorResponse>(&error_body)
            .map(|e| e.message())
            .unwrap_or_else(|_| error_body.clone());

        match status_code {
            401 => CfApiError::Unauthorized,
            403 => CfApiError::PermissionDenied(message),
            404 => CfApiError::NotFound(message),
            429 => CfApiError::RateLimited,
            500..=599 => CfApiError::ServerError {
                status: status_code,
                message,
            },
            _ => CfApiError::ApiError {
                status: status_code,
                message,
            },
        }
    }

    // =========================================================================
    // Organizations and spaces
    // =========================================================================

    /// List all organizations visible to the token
    pub async fn list_organizations(&self) -> Result<Vec<OrganizationResource>> {
        let page: Paginated<OrganizationResource> =
            self.get("/v3/organizations?per_page=200").await?;
        Ok(page.resources)
    }

    /// Look up an organization by exact name
    pub async fn organization_by_name(&self, name: &str) -> Result<OrganizationResource> {
        let path = format!("/v3/organizations?names={}", encode(name));
        let page: Paginated<OrganizationResource> = self.get(&path).await?;
        page.resources
            .into_iter()
            .next()
            .ok_or_else(|| CfApiError::NotFound(format!("Organization '{}' not found", name)))
    }

    /// List spaces within an organization
    pub async fn list_spaces(&self, org_guid: &str) -> Result<Vec<SpaceResource>> {
        let path = format!("/v3/spaces?organization_guids={}&per_page=200", org_guid);
        let page: Paginated<SpaceResource> = self.get(&path).await?;
        Ok(page.resources)
    }

    /// Look up a space by exact name within an organization
    pub async fn space_by_name(&self, org_guid: &str, name: &str) -> Result<SpaceResource> {
        let path = format!(
            "/v3/spaces?organization_guids={}&names={}",
            org_guid,
            encode(name)
        );
        let page: Paginated<SpaceResource> = self.get(&path).await?;
        page.resources
            .into_iter()
            .next()
            .ok_or_else(|| CfApiError::NotFound(format!("Space '{}' not found", name)))
    }

    // =========================================================================
    // Applications
    // =========================================================================

    /// List applications in a space
    pub async fn list_apps(&self, space_guid: &str) -> Result<Vec<AppResource>> {
        let path = format!("/v3/apps?space_guids={}&per_page=200", space_guid);
        let page: Paginated<AppResource> = self.get(&path).await?;
        Ok(page.resources)
    }

    /// Look up an application by exact name within a space
    pub async fn app_by_name(&self, space_guid: &str, name: &str) -> Result<AppResource> {
        let path = format!("/v3/apps?space_guids={}&names={}", space_guid, encode(name));
        let page: Paginated<AppResource> = self.get(&path).await?;
        page.resources
            .into_iter()
            .next()
            .ok_or_else(|| CfApiError::NotFound(format!("Application '{}' not found", name)))
    }

    /// Create a stopped application, optionally pinned to buildpacks
    pub async fn create_app(
        &self,
        space_guid: &str,
        name: &str,
        buildpacks: Option<&[String]>,
    ) -> Result<AppResource> {
        let mut body = json!({
            "name": name,
            "relationships": { "space": { "data": { "guid": space_guid } } },
        });
        if let Some(bps) = buildpacks {
            body["lifecycle"] = json!({
                "type": "buildpack",
                "data": { "buildpacks": bps },
            });
        }
        self.post("/v3/apps", &body).await
    }

    /// Delete an application
    pub async fn delete_app(&self, app_guid: &str) -> Result<()> {
        self.delete(&format!("/v3/apps/{}", app_guid)).await
    }

    /// Fetch the web process of an application (carries the sizing)
    pub async fn web_process(&self, app_guid: &str) -> Result<ProcessResource> {
        self.get(&format!("/v3/apps/{}/processes/web", app_guid))
            .await
    }

    /// Scale the web process. Only the provided fields are changed.
    pub async fn scale_web_process(
        &self,
        app_guid: &str,
        memory_mb: Option<u32>,
        disk_mb: Option<u32>,
        instances: Option<u32>,
    ) -> Result<ProcessResource> {
        let mut body = serde_json::Map::new();
        if let Some(m) = memory_mb {
            body.insert("memory_in_mb".into(), json!(m));
        }
        if let Some(d) = disk_mb {
            body.insert("disk_in_mb".into(), json!(d));
        }
        if let Some(i) = instances {
            body.insert("instances".into(), json!(i));
        }
        self.post(
            &format!("/v3/apps/{}/processes/web/actions/scale", app_guid),
            &body,
        )
        .await
    }

    /// Fetch user-provided environment variables
    pub async fn app_environment(&self, app_guid: &str) -> Result<AppEnvironment> {
        self.get(&format!("/v3/apps/{}/environment_variables", app_guid))
            .await
    }

    /// Set a single environment variable, preserving all others
    pub async fn set_environment_variable(
        &self,
        app_guid: &str,
        key: &str,
        value: &str,
    ) -> Result<()> {
        let body = json!({ "var": { key: value } });
        let _: serde_json::Value = self
            .patch(
                &format!("/v3/apps/{}/environment_variables", app_guid),
                &body,
            )
            .await?;
        Ok(())
    }

    /// Issue a start action
    pub async fn start_app(&self, app_guid: &str) -> Result<AppResource> {
        self.post(
            &format!("/v3/apps/{}/actions/start", app_guid),
            &json!({}),
        )
        .await
    }

    /// Issue a stop action
    pub async fn stop_app(&self, app_guid: &str) -> Result<AppResource> {
        self.post(&format!("/v3/apps/{}/actions/stop", app_guid), &json!({}))
            .await
    }

    // =========================================================================
    // Packages, builds, droplets (push and copy plumbing)
    // =========================================================================

    /// Create an empty bits package for an application
    pub async fn create_package(&self, app_guid: &str) -> Result<PackageResource> {
        let body = json!({
            "type": "bits",
            "relationships": { "app": { "data": { "guid": app_guid } } },
        });
        self.post("/v3/packages", &body).await
    }

    /// Copy the most recent READY package of one app onto another.
    ///
    /// This is the v3 equivalent of the classic `copy source` operation:
    /// the target receives the source's staged bits without a fresh upload.
    pub async fn copy_package(
        &self,
        source_package_guid: &str,
        target_app_guid: &str,
    ) -> Result<PackageResource> {
        let body = json!({
            "relationships": { "app": { "data": { "guid": target_app_guid } } },
        });
        self.post(
            &format!("/v3/packages?source_guid={}", source_package_guid),
            &body,
        )
        .await
    }

    /// The most recent READY package of an application
    pub async fn latest_ready_package(&self, app_guid: &str) -> Result<PackageResource> {
        let path = format!(
            "/v3/packages?app_guids={}&states=READY&order_by=-created_at&per_page=1",
            app_guid
        );
        let page: Paginated<PackageResource> = self.get(&path).await?;
        page.resources.into_iter().next().ok_or_else(|| {
            CfApiError::NotFound(format!("No staged package found for app {}", app_guid))
        })
    }

    /// Upload zipped source bits to a package
    pub async fn upload_package_bits(&self, package_guid: &str, bits: Vec<u8>) -> Result<()> {
        let part = reqwest::multipart::Part::bytes(bits)
            .file_name("application.zip")
            .mime_str("application/zip")
            .map_err(CfApiError::HttpError)?;
        let form = reqwest::multipart::Form::new().part("bits", part);

        let response = self
            .request(Method::POST, &format!("/v3/packages/{}/upload", package_guid))
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.error_from(status, response).await)
        }
    }

    /// Wait until a package finishes processing its upload
    pub async fn wait_for_package_ready(
        &self,
        package_guid: &str,
        app_name: &str,
        budget: Duration,
    ) -> Result<PackageResource> {
        let deadline = tokio::time::Instant::now() + budget;
        loop {
            let package: PackageResource =
                self.get(&format!("/v3/packages/{}", package_guid)).await?;
            match package.state.as_str() {
                "READY" => return Ok(package),
                "FAILED" => {
                    return Err(CfApiError::StagingFailed {
                        app: app_name.to_string(),
                        reason: "package upload processing failed".into(),
                    })
                }
                _ => {}
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(CfApiError::WaitTimeout {
                    operation: "package processing",
                    app: app_name.to_string(),
                    seconds: budget.as_secs(),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Kick off a staging build for a package
    pub async fn create_build(&self, package_guid: &str) -> Result<BuildResource> {
        let body = json!({
            "package": { "guid": package_guid },
        });
        self.post("/v3/builds", &body).await
    }

    /// Poll a build until it stages or fails, within the budget
    pub async fn wait_for_build(
        &self,
        build_guid: &str,
        app_name: &str,
        budget: Duration,
    ) -> Result<BuildResource> {
        let deadline = tokio::time::Instant::now() + budget;
        loop {
            let build: BuildResource = self.get(&format!("/v3/builds/{}", build_guid)).await?;
            match build.state.as_str() {
                "STAGED" => return Ok(build),
                "FAILED" => {
                    return Err(CfApiError::StagingFailed {
                        app: app_name.to_string(),
                        reason: build.error.unwrap_or_else(|| "unknown staging error".into()),
                    })
                }
                _ => debug!("staging {}: {}", app_name, build.state),
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(CfApiError::WaitTimeout {
                    operation: "staging",
                    app: app_name.to_string(),
                    seconds: budget.as_secs(),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Assign a staged droplet as the app's current droplet
    pub async fn set_current_droplet(&self, app_guid: &str, droplet_guid: &str) -> Result<()> {
        let body = json!({ "data": { "guid": droplet_guid } });
        let _: serde_json::Value = self
            .patch(
                &format!("/v3/apps/{}/relationships/current_droplet", app_guid),
                &body,
            )
            .await?;
        Ok(())
    }

    /// Poll process stats until every desired instance is RUNNING
    pub async fn wait_for_running(
        &self,
        app_guid: &str,
        app_name: &str,
        budget: Duration,
    ) -> Result<()> {
        #[derive(serde::Deserialize)]
        struct Stats {
            resources: Vec<InstanceStat>,
        }
        #[derive(serde::Deserialize)]
        struct InstanceStat {
            state: String,
        }

        let deadline = tokio::time::Instant::now() + budget;
        loop {
            let stats: Stats = self
                .get(&format!("/v3/apps/{}/processes/web/stats", app_guid))
                .await?;
            let total = stats.resources.len();
            let running = stats
                .resources
                .iter()
                .filter(|s| s.state == "RUNNING")
                .count();
            if total > 0 && running == total {
                return Ok(());
            }
            if stats.resources.iter().any(|s| s.state == "CRASHED") {
                return Err(CfApiError::StagingFailed {
                    app: app_name.to_string(),
                    reason: "one or more instances crashed during startup".into(),
                });
            }
            debug!("startup {}: {}/{} instances running", app_name, running, total);
            if tokio::time::Instant::now() >= deadline {
                return Err(CfApiError::WaitTimeout {
                    operation: "startup",
                    app: app_name.to_string(),
                    seconds: budget.as_secs(),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    // =========================================================================
    // Routes
    // =========================================================================

    /// List routes in a space
    pub async fn list_routes(&self, space_guid: &str) -> Result<Vec<RouteResource>> {
        let path = format!("/v3/routes?space_guids={}&per_page=200", space_guid);
        let page: Paginated<RouteResource> = self.get(&path).await?;
        Ok(page.resources)
    }

    /// The organization's default shared domain
    pub async fn default_domain(&self, org_guid: &str) -> Result<String> {
        #[derive(serde::Deserialize)]
        struct Domain {
            guid: String,
        }
        let domain: Domain = self
            .get(&format!("/v3/organizations/{}/domains/default", org_guid))
            .await?;
        Ok(domain.guid)
    }

    /// Create a route on a domain
    pub async fn create_route(
        &self,
        space_guid: &str,
        domain_guid: &str,
        host: &str,
    ) -> Result<RouteResource> {
        let body = json!({
            "host": host,
            "relationships": {
                "space": { "data": { "guid": space_guid } },
                "domain": { "data": { "guid": domain_guid } },
            },
        });
        self.post("/v3/routes", &body).await
    }

    /// Look up a route by host within a space
    pub async fn route_by_host(&self, space_guid: &str, host: &str) -> Result<RouteResource> {
        let path = format!("/v3/routes?space_guids={}&hosts={}", space_guid, encode(host));
        let page: Paginated<RouteResource> = self.get(&path).await?;
        page.resources
            .into_iter()
            .next()
            .ok_or_else(|| CfApiError::NotFound(format!("Route with host '{}' not found", host)))
    }

    /// Point a route at an application
    pub async fn insert_route_destination(&self, route_guid: &str, app_guid: &str) -> Result<()> {
        let body = json!({
            "destinations": [ { "app": { "guid": app_guid } } ],
        });
        let _: serde_json::Value = self
            .post(&format!("/v3/routes/{}/destinations", route_guid), &body)
            .await?;
        Ok(())
    }

    /// Remove an application from a route's destinations
    pub async fn remove_route_destination(&self, route_guid: &str, app_guid: &str) -> Result<()> {
        #[derive(serde::Deserialize)]
        struct Destinations {
            destinations: Vec<Destination>,
        }
        #[derive(serde::Deserialize)]
        struct Destination {
            guid: String,
            app: DestinationApp,
        }
        #[derive(serde::Deserialize)]
        struct DestinationApp {
            guid: String,
        }

        let destinations: Destinations = self
            .get(&format!("/v3/routes/{}/destinations", route_guid))
            .await?;
        let destination = destinations
            .destinations
            .into_iter()
            .find(|d| d.app.guid == app_guid)
            .ok_or_else(|| {
                CfApiError::NotFound("Route is not mapped to the application".to_string())
            })?;
        self.delete(&format!(
            "/v3/routes/{}/destinations/{}",
            route_guid, destination.guid
        ))
        .await
    }

    // =========================================================================
    // Service instances and bindings
    // =========================================================================

    /// List service instances in a space
    pub async fn list_service_instances(
        &self,
        space_guid: &str,
    ) -> Result<Vec<ServiceInstanceResource>> {
        let path = format!(
            "/v3/service_instances?space_guids={}&per_page=200",
            space_guid
        );
        let page: Paginated<ServiceInstanceResource> = self.get(&path).await?;
        Ok(page.resources)
    }

    /// Look up a service instance by name within a space
    pub async fn service_instance_by_name(
        &self,
        space_guid: &str,
        name: &str,
    ) -> Result<ServiceInstanceResource> {
        let path = format!(
            "/v3/service_instances?space_guids={}&names={}",
            space_guid,
            encode(name)
        );
        let page: Paginated<ServiceInstanceResource> = self.get(&path).await?;
        page.resources.into_iter().next().ok_or_else(|| {
            CfApiError::NotFound(format!("Service instance '{}' not found", name))
        })
    }

    /// Bind a service instance to an application
    pub async fn bind_service(&self, app_guid: &str, service_instance_guid: &str) -> Result<()> {
        let body = json!({
            "type": "app",
            "relationships": {
                "app": { "data": { "guid": app_guid } },
                "service_instance": { "data": { "guid": service_instance_guid } },
            },
        });
        let response = self
            .request(Method::POST, "/v3/service_credential_bindings")
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.error_from(status, response).await)
        }
    }

    /// Remove the binding between a service instance and an application
    pub async fn unbind_service(&self, app_guid: &str, service_instance_guid: &str) -> Result<()> {
        #[derive(serde::Deserialize)]
        struct Binding {
            guid: String,
        }
        let path = format!(
            "/v3/service_credential_bindings?app_guids={}&service_instance_guids={}",
            app_guid, service_instance_guid
        );
        let page: Paginated<Binding> = self.get(&path).await?;
        let binding = page.resources.into_iter().next().ok_or_else(|| {
            CfApiError::NotFound("Service binding not found for application".to_string())
        })?;
        self.delete(&format!("/v3/service_credential_bindings/{}", binding.guid))
            .await
    }

    // =========================================================================
    // Network policies (CF networking API)
    // =========================================================================

    /// List container-to-container policies involving the given apps
    pub async fn list_network_policies(&self, app_guids: &[String]) -> Result<Vec<NetworkPolicy>> {
        let path = if app_guids.is_empty() {
            "/networking/v1/external/policies".to_string()
        } else {
            format!("/networking/v1/external/policies?id={}", app_guids.join(","))
        };
        let body: serde_json::Value = self.get(&path).await?;
        parse_policies(&body)
    }

    /// Add a container-to-container policy
    pub async fn add_network_policy(&self, policy: &NetworkPolicy) -> Result<()> {
        let body = policies_body(policy);
        let response = self
            .request(Method::POST, "/networking/v1/external/policies")
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.error_from(status, response).await)
        }
    }

    /// Remove a container-to-container policy
    pub async fn remove_network_policy(&self, policy: &NetworkPolicy) -> Result<()> {
        let body = policies_body(policy);
        let response = self
            .request(Method::POST, "/networking/v1/external/policies/delete")
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.error_from(status, response).await)
        }
    }
}

/// Body shape shared by the policy create and delete endpoints
fn policies_body(policy: &NetworkPolicy) -> serde_json::Value {
    json!({
        "policies": [ {
            "source": { "id": policy.source_guid },
            "destination": {
                "id": policy.destination_guid,
                "protocol": policy.protocol,
                "ports": { "start": policy.start_port, "end": policy.end_port },
            },
        } ],
    })
}

/// Parse the networking API's policy list shape
fn parse_policies(body: &serde_json::Value) -> Result<Vec<NetworkPolicy>> {
    let list = body
        .get("policies")
        .and_then(|p| p.as_array())
        .ok_or_else(|| CfApiError::ParseError("missing 'policies' array".into()))?;

    let mut policies = Vec::with_capacity(list.len());
    for entry in list {
        let source_guid = entry["source"]["id"].as_str().unwrap_or_default().to_string();
        let destination = &entry["destination"];
        policies.push(NetworkPolicy {
            source_guid,
            destination_guid: destination["id"].as_str().unwrap_or_default().to_string(),
            protocol: destination["protocol"].as_str().unwrap_or("tcp").to_string(),
            start_port: destination["ports"]["start"].as_u64().unwrap_or(0) as u16,
            end_port: destination["ports"]["end"].as_u64().unwrap_or(0) as u16,
        });
    }
    Ok(policies)
}

/// Minimal query-string escaping for names used in filter parameters
fn encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Zip a local source tree into the archive format the bits upload expects.
///
/// Paths inside the archive are relative to `source_dir`, forward-slashed.
pub fn package_source_tree(source_dir: &Path) -> Result<Vec<u8>> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buffer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        for entry in walkdir::WalkDir::new(source_dir)
            .min_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                CfApiError::Io(std::io::Error::other(format!(
                    "failed to walk {}: {}",
                    source_dir.display(),
                    e
                )))
            })?;
            let relative = entry
                .path()
                .strip_prefix(source_dir)
                .map_err(|e| CfApiError::Io(std::io::Error::other(e.to_string())))?;
            let name = relative.to_string_lossy().replace('\\', "/");

            if entry.file_type().is_dir() {
                writer
                    .add_directory(format!("{}/", name), options)
                    .map_err(|e| CfApiError::Io(std::io::Error::other(e.to_string())))?;
            } else {
                writer
                    .start_file(name, options)
                    .map_err(|e| CfApiError::Io(std::io::Error::other(e.to_string())))?;
                let mut file = std::fs::File::open(entry.path())?;
                let mut contents = Vec::new();
                file.read_to_end(&mut contents)?;
                writer.write_all(&contents)?;
            }
        }
        writer
            .finish()
            .map_err(|e| CfApiError::Io(std::io::Error::other(e.to_string())))?;
    }
    Ok(buffer.into_inner())
}
