mod cli;

use crate::cli::ProxyArguments;
use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, info, trace};
use repgate::config::{Config, ConfigPatch};
use repgate::proxy;

fn yes_no(value: bool) -> &'static str {
    if value { "YES" } else { "NO" }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ProxyArguments::parse();
    pretty_env_logger::env_logger::builder()
        .format_timestamp(None)
        .filter_level(if args.verbose { LevelFilter::Trace } else { LevelFilter::Info })
        .init();

    info!("Starting repgate");
    trace!("Arguments: {:#?}", args);

    let config_path = Config::resolve_config_path(args.config_path.clone());
    let mut config = Config::try_load(&config_path).await?;
    config.apply(ConfigPatch::from(&args));
    config.validate()?;

    info!("=== Proxy Configuration ===");
    info!("TLS Enabled           : {}", yes_no(config.get_tls().is_enabled()));
    info!("Proxy Host            : {}", config.get_host());
    info!("Proxy Port            : {}", config.get_port());
    info!("Print Reputation Body : {}", yes_no(config.should_print_reputation()));
    info!("Reputation Service    : {}", config.get_reputation_service());
    info!("Debug Mode            : {}", yes_no(args.verbose));
    info!("Registered Users      : {}", config.get_users().len());

    proxy::start_proxy_server(&config).await
}
