//! hello-tls
//!
//! Answers every request with a fixed greeting, over plain HTTP or over TLS
//! with a certificate generated in memory at startup.
//!
//! ```text
//!   flags ──▶ ServerConfig ──▶ [secure] generate key + self-signed cert
//!                                  │
//!                                  ▼
//!                              bind listener ──▶ axum router
//!                                                  ├─ /          Hello World!
//!                                                  ├─ /protocol  HTTP/x over (in)secure connection.
//!                                                  └─ *          Hello World!
//! ```

use clap::Parser;

use hello_tls::config::schema::DEFAULT_LISTEN_ADDRESS;
use hello_tls::lifecycle::startup;
use hello_tls::observability::{init_logging, LogFormat};
use hello_tls::ServerConfig;

#[derive(Parser)]
#[command(name = "hello-tls")]
#[command(about = "Hello World HTTP server with optional self-signed TLS", long_about = None)]
struct Cli {
    /// Listening address; `:PORT` listens on every IPv4 interface
    #[arg(short = 'l', long = "listen", default_value = DEFAULT_LISTEN_ADDRESS)]
    listen: String,

    /// Serve using HTTPS (self-signed cert); `-secure` is also accepted
    #[arg(short, long)]
    secure: bool,

    /// Do not advertise HTTP/2 over ALPN
    #[arg(long)]
    no_h2: bool,

    /// Answer /protocol with the greeting instead of the protocol report
    #[arg(long)]
    no_protocol_route: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

impl Cli {
    /// Parse, accepting the single-dash `-secure` spelling as `--secure`.
    fn parse_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self::parse_from(args.into_iter().map(|arg| match arg.as_str() {
            "-secure" => "--secure".to_string(),
            _ => arg,
        }))
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            enable_tls: self.secure,
            listen_address: self.listen.clone(),
            advertise_h2: !self.no_h2,
            enable_protocol_route: !self.no_protocol_route,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args(std::env::args());

    if let Err(e) = init_logging(cli.log_format) {
        eprintln!("failed to initialize logging: {e}");
    }

    let config = cli.server_config();
    tracing::info!(
        listen_address = %config.listen_address,
        secure = config.enable_tls,
        advertise_h2 = config.advertise_h2,
        protocol_route = config.enable_protocol_route,
        "hello-tls v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = startup::run(config).await {
        tracing::error!(error = %e, "Fatal");
        std::process::exit(1);
    }

    tracing::info!("Shutdown complete");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults() {
        let config = Cli::parse_args(args(&["hello-tls"])).server_config();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn single_dash_secure_is_accepted() {
        let cli = Cli::parse_args(args(&["hello-tls", "-secure", "-l", ":8443"]));
        let config = cli.server_config();
        assert!(config.enable_tls);
        assert_eq!(config.listen_address, ":8443");
    }

    #[test]
    fn long_and_short_secure_flags() {
        assert!(Cli::parse_args(args(&["hello-tls", "--secure"])).secure);
        assert!(Cli::parse_args(args(&["hello-tls", "-s"])).secure);
    }

    #[test]
    fn variant_switches() {
        let config = Cli::parse_args(args(&["hello-tls", "--no-h2", "--no-protocol-route"]))
            .server_config();
        assert!(!config.advertise_h2);
        assert!(!config.enable_protocol_route);
    }

    #[test]
    fn listen_help_mentions_ipv4() {
        use clap::CommandFactory;
        let help = Cli::command().render_help().to_string();
        assert!(help.contains("IPv4"), "{help}");
    }
}
