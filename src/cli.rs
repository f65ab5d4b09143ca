use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pulse-ctl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Operate and clone applications on a Cloud Foundry foundation")]
#[command(
    long_about = "A command-line tool for day-2 application operations on Cloud Foundry: \
                  listing and scaling apps, managing routes and service bindings, and cloning \
                  applications with their buildpack, sizing and environment preserved."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file (default: ~/.cfpulse.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Organization to operate in (overrides the current target)
    #[arg(short, long, global = true)]
    pub org: Option<String>,

    /// Space to operate in (overrides the current target)
    #[arg(short, long, global = true)]
    pub space: Option<String>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clone an application to a new name, preserving buildpack, sizing and env
    Clone {
        /// Application to clone
        #[arg(value_name = "SOURCE_APP")]
        source_app: String,

        /// Name for the new application
        #[arg(value_name = "TARGET_APP")]
        target_app: String,
    },

    /// Application lifecycle operations
    Apps {
        #[command(subcommand)]
        command: AppsCommand,
    },

    /// Manage the default org/space target
    Target {
        #[command(subcommand)]
        command: TargetCommand,
    },

    /// List organizations visible to the configured account
    Orgs,

    /// List spaces in the targeted organization
    Spaces,

    /// Route operations
    Routes {
        #[command(subcommand)]
        command: RoutesCommand,
    },

    /// Service instance operations
    Services {
        #[command(subcommand)]
        command: ServicesCommand,
    },

    /// Container-to-container network policy operations
    Network {
        #[command(subcommand)]
        command: NetworkCommand,
    },

    /// Validate the configuration and report problems
    CheckConfig,
}

#[derive(Subcommand)]
pub enum AppsCommand {
    /// List applications in the targeted space
    List,

    /// Show details of one application
    Show {
        /// Application name
        name: String,
    },

    /// Start an application and wait until it is running
    Start {
        /// Application name
        name: String,
    },

    /// Stop an application
    Stop {
        /// Application name
        name: String,
    },

    /// Restart an application
    Restart {
        /// Application name
        name: String,
    },

    /// Scale an application's memory, disk or instances
    Scale {
        /// Application name
        name: String,

        /// New memory per instance, MB
        #[arg(long)]
        memory: Option<u32>,

        /// New disk per instance, MB
        #[arg(long)]
        disk: Option<u32>,

        /// New instance count
        #[arg(long)]
        instances: Option<u32>,
    },

    /// Delete an application
    Delete {
        /// Application name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum TargetCommand {
    /// Set the default org/space (validated against the platform)
    Set {
        /// Organization name
        organization: String,

        /// Space name
        space: String,
    },

    /// Show the current default target
    Show,

    /// Revert to the configured default target
    Clear,
}

#[derive(Subcommand)]
pub enum RoutesCommand {
    /// List routes in the targeted space
    List,

    /// Map a route (host under the default domain) onto an application
    Map {
        /// Application name
        app: String,

        /// Host part of the route
        host: String,
    },

    /// Unmap a route from an application
    Unmap {
        /// Application name
        app: String,

        /// Host part of the route
        host: String,
    },
}

#[derive(Subcommand)]
pub enum ServicesCommand {
    /// List service instances in the targeted space
    List,

    /// Bind a service instance to an application
    Bind {
        /// Application name
        app: String,

        /// Service instance name
        service: String,
    },

    /// Unbind a service instance from an application
    Unbind {
        /// Application name
        app: String,

        /// Service instance name
        service: String,
    },
}

#[derive(Subcommand)]
pub enum NetworkCommand {
    /// List network policies
    List,

    /// Allow direct traffic between two applications
    Add {
        /// Application the traffic originates from
        source_app: String,

        /// Application the traffic may reach
        destination_app: String,

        /// First port of the allowed range
        #[arg(long)]
        port: u16,

        /// Last port of the allowed range (defaults to --port)
        #[arg(long)]
        end_port: Option<u16>,

        /// Protocol: tcp or udp
        #[arg(long, default_value = "tcp")]
        protocol: String,
    },

    /// Remove a network policy
    Remove {
        /// Application the traffic originates from
        source_app: String,

        /// Application the traffic may reach
        destination_app: String,

        /// First port of the allowed range
        #[arg(long)]
        port: u16,

        /// Last port of the allowed range (defaults to --port)
        #[arg(long)]
        end_port: Option<u16>,

        /// Protocol: tcp or udp
        #[arg(long, default_value = "tcp")]
        protocol: String,
    },
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_command_parses() {
        let cli = Cli::try_parse_from(["pulse-ctl", "clone", "billing-api", "billing-api-canary"])
            .unwrap();
        match cli.command {
            Commands::Clone {
                source_app,
                target_app,
            } => {
                assert_eq!(source_app, "billing-api");
                assert_eq!(target_app, "billing-api-canary");
            }
            _ => panic!("expected clone command"),
        }
    }

    #[test]
    fn test_global_org_space_flags() {
        let cli = Cli::try_parse_from([
            "pulse-ctl", "apps", "list", "--org", "acme", "--space", "prod",
        ])
        .unwrap();
        assert_eq!(cli.org.as_deref(), Some("acme"));
        assert_eq!(cli.space.as_deref(), Some("prod"));
    }

    #[test]
    fn test_scale_flags() {
        let cli = Cli::try_parse_from([
            "pulse-ctl",
            "apps",
            "scale",
            "billing-api",
            "--memory",
            "512",
            "--instances",
            "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Apps {
                command:
                    AppsCommand::Scale {
                        name,
                        memory,
                        disk,
                        instances,
                    },
            } => {
                assert_eq!(name, "billing-api");
                assert_eq!(memory, Some(512));
                assert_eq!(disk, None);
                assert_eq!(instances, Some(2));
            }
            _ => panic!("expected scale command"),
        }
    }

    #[test]
    fn test_network_add_defaults() {
        let cli = Cli::try_parse_from([
            "pulse-ctl", "network", "add", "web", "api", "--port", "8080",
        ])
        .unwrap();
        match cli.command {
            Commands::Network {
                command:
                    NetworkCommand::Add {
                        protocol, end_port, ..
                    },
            } => {
                assert_eq!(protocol, "tcp");
                assert_eq!(end_port, None);
            }
            _ => panic!("expected network add command"),
        }
    }
}
