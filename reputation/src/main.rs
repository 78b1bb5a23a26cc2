use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, info, trace};
use repgate_reputation_lib::config::{DEFAULT_CONFIG_PATH, ReputationConfig, ServicePatch};

#[derive(Debug, Parser)]
#[command(author, version, about = "Keyword-based URL reputation service")]
struct ServiceArguments {
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_PATH, help = "Path to the service configuration file")]
    config_path: String,
    #[arg(short = 'v', long = "verbose", visible_alias = "debug", help = "Enable verbose logging")]
    verbose: bool,
    #[arg(long, help = "Host to bind to")]
    host: Option<String>,
    #[arg(long, help = "Port to listen on")]
    port: Option<u16>,
    #[arg(long = "database", help = "Path to the SQLite cache file")]
    database: Option<String>,
}

impl From<&ServiceArguments> for ServicePatch {
    fn from(args: &ServiceArguments) -> Self {
        Self { host: args.host.clone(), port: args.port, database_path: args.database.clone() }
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    let args = ServiceArguments::parse();
    pretty_env_logger::env_logger::builder()
        .format_timestamp(None)
        .filter_level(if args.verbose { LevelFilter::Trace } else { LevelFilter::Info })
        .init();

    info!("Starting repgate reputation service");
    trace!("Arguments: {:#?}", args);

    let mut config = ReputationConfig::try_load(&args.config_path).await?;
    config.apply(ServicePatch::from(&args));
    config.validate()?;

    info!("Database       : {}", config.database_path);
    info!("Cache TTL      : {} days", config.cache_ttl_days);
    info!("Keywords       : {}", config.keywords.join(", "));

    repgate_reputation_lib::run(config).await
}
