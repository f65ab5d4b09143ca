//! # cf-pulse
//!
//! Day-2 application operations for Cloud Foundry foundations: listing,
//! scaling and restarting applications, managing routes, service bindings
//! and network policies, and cloning applications with their buildpack,
//! sizing and environment preserved.
//!
//! The same operations are exposed two ways:
//!
//! - **CLI**: the `pulse-ctl` binary ([`cli`], [`run_command`])
//! - **Agent tools**: rig `Tool` implementations in [`agent::tools`]
//!
//! Both sit on the [`cf`] layer (API client, the [`cf::CloudOperations`]
//! seam, per-target handle caching, transient-failure retry) and the
//! [`clone`] pipeline.

pub mod agent;
pub mod cf;
pub mod cli;
pub mod clone;
pub mod config;
pub mod error;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{PulseError, Result};

use std::sync::Arc;
use std::time::Duration;

use cf::api::types::{ScaleRequest, StartRequest};
use cf::retry::RetryPolicy;
use cf::{OperationsCache, OperationsHandle, TargetContext};
use cli::{AppsCommand, Commands, NetworkCommand, RoutesCommand, ServicesCommand, TargetCommand};
use clone::ApplicationCloner;

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const STAGING_TIMEOUT: Duration = Duration::from_secs(8 * 60);
const STARTUP_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Execute one CLI command against the operations cache.
///
/// `context` is the explicit org/space from the global flags; `None` means
/// the current default target.
pub async fn run_command(
    command: Commands,
    context: Option<TargetContext>,
    cache: Arc<OperationsCache>,
) -> Result<()> {
    match command {
        Commands::Clone {
            source_app,
            target_app,
        } => {
            let ops = cache.resolve(context.as_ref())?;
            let cloner = ApplicationCloner::new(ops, RetryPolicy::default());
            let report = cloner.clone_application(&source_app, &target_app).await?;
            println!(
                "Cloned '{}' to '{}' (runtime '{}', {}MB memory, {}MB disk, {} instance(s), {} env var(s))",
                report.source_app,
                report.target_app,
                report.runtime,
                report.memory_mb,
                report.disk_mb,
                report.instances,
                report.environment_variables
            );
            Ok(())
        }
        Commands::Apps { command } => {
            run_apps_command(command, cache.resolve(context.as_ref())?).await
        }
        Commands::Target { command } => run_target_command(command, cache).await,
        Commands::Orgs => {
            let ops = cache.resolve(context.as_ref())?;
            for org in ops.list_organizations().await? {
                println!("{}", org);
            }
            Ok(())
        }
        Commands::Spaces => {
            let ops = cache.resolve(context.as_ref())?;
            for space in ops.list_spaces().await? {
                println!("{}", space);
            }
            Ok(())
        }
        Commands::Routes { command } => {
            run_routes_command(command, cache.resolve(context.as_ref())?).await
        }
        Commands::Services { command } => {
            run_services_command(command, cache.resolve(context.as_ref())?).await
        }
        Commands::Network { command } => {
            run_network_command(command, cache.resolve(context.as_ref())?).await
        }
        // Handled in main before the cache exists
        Commands::CheckConfig => Ok(()),
    }
}

async fn run_apps_command(command: AppsCommand, ops: OperationsHandle) -> Result<()> {
    match command {
        AppsCommand::List => {
            let apps = ops.list_applications().await?;
            if apps.is_empty() {
                println!("No applications found");
                return Ok(());
            }
            println!(
                "{:<32} {:<10} {:>9} {:>10}",
                "name", "state", "instances", "memory"
            );
            for app in apps {
                println!(
                    "{:<32} {:<10} {:>9} {:>8}MB",
                    app.name, app.state, app.instances, app.memory_mb
                );
            }
            Ok(())
        }
        AppsCommand::Show { name } => {
            let detail = ops.get_application(&name).await?;
            println!("name:       {}", detail.name);
            println!("state:      {}", detail.state);
            println!("memory:     {}MB", detail.memory_mb);
            println!("disk:       {}MB", detail.disk_mb);
            println!("instances:  {}", detail.instances);
            println!("buildpacks: {}", detail.buildpacks.join(", "));
            if let Some(stack) = detail.stack {
                println!("stack:      {}", stack);
            }
            Ok(())
        }
        AppsCommand::Start { name } => {
            ops.start(&StartRequest {
                name: name.clone(),
                staging_timeout: STAGING_TIMEOUT,
                startup_timeout: STARTUP_TIMEOUT,
            })
            .await?;
            println!("Started '{}'", name);
            Ok(())
        }
        AppsCommand::Stop { name } => {
            ops.stop(&name).await?;
            println!("Stopped '{}'", name);
            Ok(())
        }
        AppsCommand::Restart { name } => {
            ops.restart(&StartRequest {
                name: name.clone(),
                staging_timeout: STAGING_TIMEOUT,
                startup_timeout: STARTUP_TIMEOUT,
            })
            .await?;
            println!("Restarted '{}'", name);
            Ok(())
        }
        AppsCommand::Scale {
            name,
            memory,
            disk,
            instances,
        } => {
            ops.scale(&ScaleRequest {
                name: name.clone(),
                memory_mb: memory,
                disk_mb: disk,
                instances,
            })
            .await?;
            println!("Scaled '{}'", name);
            Ok(())
        }
        AppsCommand::Delete { name } => {
            ops.delete_application(&name).await?;
            println!("Deleted '{}'", name);
            Ok(())
        }
    }
}

async fn run_target_command(command: TargetCommand, cache: Arc<OperationsCache>) -> Result<()> {
    match command {
        TargetCommand::Set {
            organization,
            space,
        } => {
            // Validate the pair before committing: the org must resolve and
            // contain the named space.
            let candidate = TargetContext::new(organization.clone(), space.clone());
            let ops = cache.resolve(Some(&candidate))?;
            let spaces = ops.list_spaces().await?;
            if !spaces.iter().any(|s| s == &space) {
                return Err(PulseError::Config(format!(
                    "space '{}' not found in organization '{}'",
                    space, organization
                )));
            }
            cache.set_default_target(organization, space);
            println!("Target set to {}", cache.current_default());
            Ok(())
        }
        TargetCommand::Show => {
            println!("{}", cache.current_default());
            Ok(())
        }
        TargetCommand::Clear => {
            cache.clear_default_target();
            println!("Target reverted to {}", cache.current_default());
            Ok(())
        }
    }
}

async fn run_routes_command(command: RoutesCommand, ops: OperationsHandle) -> Result<()> {
    match command {
        RoutesCommand::List => {
            for route in ops.list_routes().await? {
                println!("{}", route);
            }
            Ok(())
        }
        RoutesCommand::Map { app, host } => {
            ops.map_route(&app, &host).await?;
            println!("Mapped route '{}' to '{}'", host, app);
            Ok(())
        }
        RoutesCommand::Unmap { app, host } => {
            ops.unmap_route(&app, &host).await?;
            println!("Unmapped route '{}' from '{}'", host, app);
            Ok(())
        }
    }
}

async fn run_services_command(command: ServicesCommand, ops: OperationsHandle) -> Result<()> {
    match command {
        ServicesCommand::List => {
            for service in ops.list_service_instances().await? {
                println!("{}", service);
            }
            Ok(())
        }
        ServicesCommand::Bind { app, service } => {
            ops.bind_service(&app, &service).await?;
            println!("Bound '{}' to '{}'", service, app);
            Ok(())
        }
        ServicesCommand::Unbind { app, service } => {
            ops.unbind_service(&app, &service).await?;
            println!("Unbound '{}' from '{}'", service, app);
            Ok(())
        }
    }
}

async fn run_network_command(command: NetworkCommand, ops: OperationsHandle) -> Result<()> {
    match command {
        NetworkCommand::List => {
            let policies = ops.list_network_policies().await?;
            if policies.is_empty() {
                println!("No network policies found");
                return Ok(());
            }
            for policy in policies {
                println!(
                    "{} -> {} {} {}-{}",
                    policy.source_guid,
                    policy.destination_guid,
                    policy.protocol,
                    policy.start_port,
                    policy.end_port
                );
            }
            Ok(())
        }
        NetworkCommand::Add {
            source_app,
            destination_app,
            port,
            end_port,
            protocol,
        } => {
            let end = end_port.unwrap_or(port);
            ops.add_network_policy(&source_app, &destination_app, &protocol, port, end)
                .await?;
            println!(
                "Allowed {} {}-{} from '{}' to '{}'",
                protocol, port, end, source_app, destination_app
            );
            Ok(())
        }
        NetworkCommand::Remove {
            source_app,
            destination_app,
            port,
            end_port,
            protocol,
        } => {
            let end = end_port.unwrap_or(port);
            ops.remove_network_policy(&source_app, &destination_app, &protocol, port, end)
                .await?;
            println!(
                "Removed {} {}-{} from '{}' to '{}'",
                protocol, port, end, source_app, destination_app
            );
            Ok(())
        }
    }
}
