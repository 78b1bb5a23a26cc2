use clap::Parser;
use repgate::config::ConfigPatch;

#[derive(Parser, Debug, Clone)]
#[command(name = "repgate", about, author, version, long_about = None)]
pub struct ProxyArguments {
    #[arg(short = 'c', long = "config", help = "Path to the configuration file")]
    pub(crate) config_path: Option<String>,
    #[arg(short = 'v', long = "verbose", visible_alias = "debug", help = "Enable verbose logging")]
    pub(crate) verbose: bool,
    #[arg(long = "host", help = "Address to listen on")]
    pub(crate) host: Option<String>,
    #[arg(long = "port", help = "Port to listen on")]
    pub(crate) port: Option<u16>,
    #[arg(long = "tls", help = "Terminate TLS on the listener using the configured certificate and key")]
    pub(crate) tls: bool,
    #[arg(long = "cert", help = "PEM certificate chain used with --tls")]
    pub(crate) cert_path: Option<String>,
    #[arg(long = "key", help = "PKCS#8 PEM private key used with --tls")]
    pub(crate) key_path: Option<String>,
    #[arg(long = "reputation-service", help = "Reputation endpoint, e.g. http://127.0.0.1:8081/reputation")]
    pub(crate) reputation_service: Option<String>,
    #[arg(short = 'a', long = "printanswersfromreputation", help = "Log the start of every reputation snippet")]
    pub(crate) print_reputation: bool,
}

impl From<&ProxyArguments> for ConfigPatch {
    fn from(args: &ProxyArguments) -> Self {
        ConfigPatch {
            host: args.host.clone(),
            port: args.port,
            // flags can only switch features on; absent flags leave the file value alone
            tls_enabled: args.tls.then_some(true),
            cert_path: args.cert_path.clone(),
            key_path: args.key_path.clone(),
            reputation_service: args.reputation_service.clone(),
            print_reputation: args.print_reputation.then_some(true),
        }
    }
}
