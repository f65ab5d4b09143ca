use clap::Parser;
use std::process;
use std::sync::Arc;

use cf_pulse::cf::ops::HttpCloudOperations;
use cf_pulse::cf::{CfApiClient, OperationsCache, TargetContext};
use cf_pulse::cli::{Cli, Commands};
use cf_pulse::{config, PulseError};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> cf_pulse::Result<()> {
    let cli = Cli::parse();
    cli.init_logging();

    let cf_config = config::load_config(cli.config.as_deref())?;

    if let Commands::CheckConfig = cli.command {
        return check_config(&cf_config);
    }

    let report = cf_config.validate();
    for warning in &report.warnings {
        log::warn!("{}", warning);
    }
    if let Some(error) = report.errors.first() {
        return Err(PulseError::Config(error.clone()));
    }

    let context = match (cli.org.clone(), cli.space.clone()) {
        (Some(org), Some(space)) => Some(TargetContext::new(org, space)),
        (None, None) => None,
        _ => {
            return Err(PulseError::Config(
                "--org and --space must be provided together".to_string(),
            ))
        }
    };

    let client = if cf_config.skip_tls_validation {
        CfApiClient::new_insecure(&cf_config.api_url, &cf_config.token)?
    } else {
        CfApiClient::new(&cf_config.api_url, &cf_config.token)?
    };
    let client = Arc::new(client);

    let cache = Arc::new(OperationsCache::new(
        cf_config.default_target(),
        move |ctx: &TargetContext| {
            Ok(Arc::new(HttpCloudOperations::new(
                Arc::clone(&client),
                ctx.clone(),
            )) as _)
        },
    ));

    cf_pulse::run_command(cli.command, context, cache).await
}

fn check_config(cf_config: &config::CfConfig) -> cf_pulse::Result<()> {
    let report = cf_config.validate();
    for warning in &report.warnings {
        println!("warning: {}", warning);
    }
    for error in &report.errors {
        println!("error: {}", error);
    }
    if report.is_ok() {
        println!(
            "Configuration OK (api: {}, target: {})",
            cf_config.api_url,
            cf_config.default_target()
        );
        Ok(())
    } else {
        Err(PulseError::Config(
            "configuration is incomplete, see messages above".to_string(),
        ))
    }
}
