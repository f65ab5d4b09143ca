//! The operations seam between the tools/pipeline and the platform.
//!
//! `CloudOperations` is the name-based verb set everything above the
//! transport is written against: one implementation speaks the real v3 API,
//! tests substitute a scripted double. A handle implements the verbs for
//! exactly one (organization, space) target; handles are produced and cached
//! by [`crate::cf::context::OperationsCache`].

use async_trait::async_trait;
use log::{debug, info};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::api::types::{
    ApplicationDetail, ApplicationSummary, CopySourceRequest, NetworkPolicy, PushRequest,
    ScaleRequest, StartRequest,
};
use super::api::{package_source_tree, CfApiClient, CfApiError, Result};
use super::context::TargetContext;

/// Name-based platform verbs, bound to one organization/space target.
#[async_trait]
pub trait CloudOperations: Send + Sync {
    /// Descriptive metadata for one application (sizing, state, buildpacks).
    /// Fails with `NotFound` when the app does not exist in the target.
    async fn get_application(&self, name: &str) -> Result<ApplicationDetail>;

    /// All applications in the target space
    async fn list_applications(&self) -> Result<Vec<ApplicationSummary>>;

    /// User-provided environment variables, values normalized to strings
    async fn get_environment(&self, name: &str) -> Result<BTreeMap<String, String>>;

    /// Set one environment variable on an application
    async fn set_environment_variable(&self, name: &str, key: &str, value: &str) -> Result<()>;

    /// Stage (and unless `no_start`, run) an app from a local source tree
    async fn push(&self, request: &PushRequest) -> Result<()>;

    /// Replace the target app's bits with the source app's staged package
    async fn copy_source(&self, request: &CopySourceRequest) -> Result<()>;

    /// Resize an application's web process
    async fn scale(&self, request: &ScaleRequest) -> Result<()>;

    /// Start an application and wait for its instances to run
    async fn start(&self, request: &StartRequest) -> Result<()>;

    /// Stop an application
    async fn stop(&self, name: &str) -> Result<()>;

    /// Stop, then start an application
    async fn restart(&self, request: &StartRequest) -> Result<()>;

    /// Delete an application
    async fn delete_application(&self, name: &str) -> Result<()>;

    /// Names of all organizations visible to the credentials
    async fn list_organizations(&self) -> Result<Vec<String>>;

    /// Names of all spaces in the target organization
    async fn list_spaces(&self) -> Result<Vec<String>>;

    /// Route URLs in the target space
    async fn list_routes(&self) -> Result<Vec<String>>;

    /// Map a route (creating it on the default domain if needed) to an app
    async fn map_route(&self, app_name: &str, host: &str) -> Result<()>;

    /// Unmap a route from an app
    async fn unmap_route(&self, app_name: &str, host: &str) -> Result<()>;

    /// Service instance names in the target space
    async fn list_service_instances(&self) -> Result<Vec<String>>;

    /// Bind a service instance to an application
    async fn bind_service(&self, app_name: &str, service_instance: &str) -> Result<()>;

    /// Remove the binding between a service instance and an application
    async fn unbind_service(&self, app_name: &str, service_instance: &str) -> Result<()>;

    /// Container-to-container policies involving apps in this space
    async fn list_network_policies(&self) -> Result<Vec<NetworkPolicy>>;

    /// Allow direct traffic from one app to another
    async fn add_network_policy(
        &self,
        source_app: &str,
        destination_app: &str,
        protocol: &str,
        start_port: u16,
        end_port: u16,
    ) -> Result<()>;

    /// Remove a direct-traffic policy between two apps
    async fn remove_network_policy(
        &self,
        source_app: &str,
        destination_app: &str,
        protocol: &str,
        start_port: u16,
        end_port: u16,
    ) -> Result<()>;
}

/// Shared handle type produced by the operations cache
pub type OperationsHandle = Arc<dyn CloudOperations>;

/// `CloudOperations` over the real v3 API.
///
/// Construction is cheap wiring; the org and space GUIDs are resolved over
/// the network on first use and memoized for the life of the handle.
pub struct HttpCloudOperations {
    client: Arc<CfApiClient>,
    context: TargetContext,
    guids: OnceCell<(String, String)>,
}

impl HttpCloudOperations {
    /// Bind a client to one organization/space target.
    pub fn new(client: Arc<CfApiClient>, context: TargetContext) -> Self {
        Self {
            client,
            context,
            guids: OnceCell::new(),
        }
    }

    /// The target this handle is bound to
    pub fn context(&self) -> &TargetContext {
        &self.context
    }

    /// (org_guid, space_guid), resolved once per handle
    async fn guids(&self) -> Result<&(String, String)> {
        self.guids
            .get_or_try_init(|| async {
                debug!(
                    "resolving GUIDs for org '{}', space '{}'",
                    self.context.organization, self.context.space
                );
                let org = self
                    .client
                    .organization_by_name(&self.context.organization)
                    .await?;
                let space = self
                    .client
                    .space_by_name(&org.guid, &self.context.space)
                    .await?;
                Ok((org.guid, space.guid))
            })
            .await
    }

    async fn space_guid(&self) -> Result<&str> {
        Ok(&self.guids().await?.1)
    }

    async fn org_guid(&self) -> Result<&str> {
        Ok(&self.guids().await?.0)
    }

    async fn app_guid(&self, name: &str) -> Result<String> {
        let space_guid = self.space_guid().await?;
        Ok(self.client.app_by_name(space_guid, name).await?.guid)
    }

    /// Stage the given package and make its droplet current.
    async fn stage_and_assign(
        &self,
        app_guid: &str,
        package_guid: &str,
        app_name: &str,
        staging_timeout: std::time::Duration,
    ) -> Result<()> {
        let build = self.client.create_build(package_guid).await?;
        let staged = self
            .client
            .wait_for_build(&build.guid, app_name, staging_timeout)
            .await?;
        let droplet = staged.droplet.ok_or_else(|| {
            CfApiError::ParseError(format!("staged build for '{}' carries no droplet", app_name))
        })?;
        self.client.set_current_droplet(app_guid, &droplet.guid).await
    }
}

#[async_trait]
impl CloudOperations for HttpCloudOperations {
    async fn get_application(&self, name: &str) -> Result<ApplicationDetail> {
        let space_guid = self.space_guid().await?;
        let app = self.client.app_by_name(space_guid, name).await?;
        let process = self.client.web_process(&app.guid).await?;
        Ok(ApplicationDetail {
            name: app.name,
            state: app.state,
            memory_mb: process.memory_in_mb,
            disk_mb: process.disk_in_mb,
            instances: process.instances,
            buildpacks: app.lifecycle.data.buildpacks,
            stack: app.lifecycle.data.stack,
        })
    }

    async fn list_applications(&self) -> Result<Vec<ApplicationSummary>> {
        let space_guid = self.space_guid().await?;
        let apps = self.client.list_apps(space_guid).await?;
        let mut summaries = Vec::with_capacity(apps.len());
        for app in apps {
            let process = self.client.web_process(&app.guid).await?;
            summaries.push(ApplicationSummary {
                name: app.name,
                state: app.state,
                instances: process.instances,
                memory_mb: process.memory_in_mb,
            });
        }
        Ok(summaries)
    }

    async fn get_environment(&self, name: &str) -> Result<BTreeMap<String, String>> {
        let app_guid = self.app_guid(name).await?;
        let env = self.client.app_environment(&app_guid).await?;
        Ok(env
            .environment_variables
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect())
    }

    async fn set_environment_variable(&self, name: &str, key: &str, value: &str) -> Result<()> {
        let app_guid = self.app_guid(name).await?;
        self.client
            .set_environment_variable(&app_guid, key, value)
            .await
    }

    async fn push(&self, request: &PushRequest) -> Result<()> {
        let space_guid = self.space_guid().await?.to_string();

        // Reuse the app when pushing over an existing name, create otherwise.
        let app = match self.client.app_by_name(&space_guid, &request.name).await {
            Ok(existing) => existing,
            Err(CfApiError::NotFound(_)) => {
                let pins = request.buildpack.clone().map(|bp| vec![bp]);
                self.client
                    .create_app(&space_guid, &request.name, pins.as_deref())
                    .await?
            }
            Err(e) => return Err(e),
        };

        let source = request.source_path.clone();
        let bits = tokio::task::spawn_blocking(move || package_source_tree(&source))
            .await
            .map_err(|e| CfApiError::Io(std::io::Error::other(e.to_string())))??;
        info!(
            "uploading {} bytes of source bits for '{}'",
            bits.len(),
            request.name
        );

        let package = self.client.create_package(&app.guid).await?;
        self.client.upload_package_bits(&package.guid, bits).await?;
        self.client
            .wait_for_package_ready(&package.guid, &request.name, request.staging_timeout)
            .await?;

        self.stage_and_assign(&app.guid, &package.guid, &request.name, request.staging_timeout)
            .await?;

        self.client
            .scale_web_process(
                &app.guid,
                Some(request.memory_mb),
                Some(request.disk_mb),
                Some(request.instances),
            )
            .await?;

        if !request.no_start {
            self.client.start_app(&app.guid).await?;
            self.client
                .wait_for_running(&app.guid, &request.name, request.staging_timeout)
                .await?;
        }
        Ok(())
    }

    async fn copy_source(&self, request: &CopySourceRequest) -> Result<()> {
        let source_guid = self.app_guid(&request.source_name).await?;
        let target_guid = self.app_guid(&request.target_name).await?;

        let source_package = self.client.latest_ready_package(&source_guid).await?;
        let copied = self
            .client
            .copy_package(&source_package.guid, &target_guid)
            .await?;
        let ready = self
            .client
            .wait_for_package_ready(&copied.guid, &request.target_name, request.staging_timeout)
            .await?;

        self.stage_and_assign(
            &target_guid,
            &ready.guid,
            &request.target_name,
            request.staging_timeout,
        )
        .await?;

        if request.restart {
            self.client.stop_app(&target_guid).await?;
            self.client.start_app(&target_guid).await?;
            self.client
                .wait_for_running(&target_guid, &request.target_name, request.startup_timeout)
                .await?;
        }
        Ok(())
    }

    async fn scale(&self, request: &ScaleRequest) -> Result<()> {
        let app_guid = self.app_guid(&request.name).await?;
        self.client
            .scale_web_process(
                &app_guid,
                request.memory_mb,
                request.disk_mb,
                request.instances,
            )
            .await?;
        Ok(())
    }

    async fn start(&self, request: &StartRequest) -> Result<()> {
        let app_guid = self.app_guid(&request.name).await?;
        self.client.start_app(&app_guid).await?;
        self.client
            .wait_for_running(&app_guid, &request.name, request.startup_timeout)
            .await
    }

    async fn stop(&self, name: &str) -> Result<()> {
        let app_guid = self.app_guid(name).await?;
        self.client.stop_app(&app_guid).await?;
        Ok(())
    }

    async fn restart(&self, request: &StartRequest) -> Result<()> {
        let app_guid = self.app_guid(&request.name).await?;
        self.client.stop_app(&app_guid).await?;
        self.client.start_app(&app_guid).await?;
        self.client
            .wait_for_running(&app_guid, &request.name, request.startup_timeout)
            .await
    }

    async fn delete_application(&self, name: &str) -> Result<()> {
        let app_guid = self.app_guid(name).await?;
        self.client.delete_app(&app_guid).await
    }

    async fn list_organizations(&self) -> Result<Vec<String>> {
        let orgs = self.client.list_organizations().await?;
        Ok(orgs.into_iter().map(|o| o.name).collect())
    }

    async fn list_spaces(&self) -> Result<Vec<String>> {
        let org_guid = self.org_guid().await?;
        let spaces = self.client.list_spaces(org_guid).await?;
        Ok(spaces.into_iter().map(|s| s.name).collect())
    }

    async fn list_routes(&self) -> Result<Vec<String>> {
        let space_guid = self.space_guid().await?;
        let routes = self.client.list_routes(space_guid).await?;
        Ok(routes.into_iter().map(|r| r.url).collect())
    }

    async fn map_route(&self, app_name: &str, host: &str) -> Result<()> {
        let app_guid = self.app_guid(app_name).await?;
        let space_guid = self.space_guid().await?;
        let route = match self.client.route_by_host(space_guid, host).await {
            Ok(route) => route,
            Err(CfApiError::NotFound(_)) => {
                let org_guid = self.org_guid().await?;
                let domain_guid = self.client.default_domain(org_guid).await?;
                self.client.create_route(space_guid, &domain_guid, host).await?
            }
            Err(e) => return Err(e),
        };
        self.client
            .insert_route_destination(&route.guid, &app_guid)
            .await
    }

    async fn unmap_route(&self, app_name: &str, host: &str) -> Result<()> {
        let app_guid = self.app_guid(app_name).await?;
        let space_guid = self.space_guid().await?;
        let route = self.client.route_by_host(space_guid, host).await?;
        self.client
            .remove_route_destination(&route.guid, &app_guid)
            .await
    }

    async fn list_service_instances(&self) -> Result<Vec<String>> {
        let space_guid = self.space_guid().await?;
        let instances = self.client.list_service_instances(space_guid).await?;
        Ok(instances.into_iter().map(|i| i.name).collect())
    }

    async fn bind_service(&self, app_name: &str, service_instance: &str) -> Result<()> {
        let app_guid = self.app_guid(app_name).await?;
        let space_guid = self.space_guid().await?;
        let instance = self
            .client
            .service_instance_by_name(space_guid, service_instance)
            .await?;
        self.client.bind_service(&app_guid, &instance.guid).await
    }

    async fn unbind_service(&self, app_name: &str, service_instance: &str) -> Result<()> {
        let app_guid = self.app_guid(app_name).await?;
        let space_guid = self.space_guid().await?;
        let instance = self
            .client
            .service_instance_by_name(space_guid, service_instance)
            .await?;
        self.client.unbind_service(&app_guid, &instance.guid).await
    }

    async fn list_network_policies(&self) -> Result<Vec<NetworkPolicy>> {
        let space_guid = self.space_guid().await?;
        let apps = self.client.list_apps(space_guid).await?;
        let guids: Vec<String> = apps.into_iter().map(|a| a.guid).collect();
        self.client.list_network_policies(&guids).await
    }

    async fn add_network_policy(
        &self,
        source_app: &str,
        destination_app: &str,
        protocol: &str,
        start_port: u16,
        end_port: u16,
    ) -> Result<()> {
        let policy = NetworkPolicy {
            source_guid: self.app_guid(source_app).await?,
            destination_guid: self.app_guid(destination_app).await?,
            protocol: protocol.to_string(),
            start_port,
            end_port,
        };
        self.client.add_network_policy(&policy).await
    }

    async fn remove_network_policy(
        &self,
        source_app: &str,
        destination_app: &str,
        protocol: &str,
        start_port: u16,
        end_port: u16,
    ) -> Result<()> {
        let policy = NetworkPolicy {
            source_guid: self.app_guid(source_app).await?,
            destination_guid: self.app_guid(destination_app).await?,
            protocol: protocol.to_string(),
            start_port,
            end_port,
        };
        self.client.remove_network_policy(&policy).await
    }
}
