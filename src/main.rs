use brrtguard::cli::{run_cli, Cli};
use brrtguard::logging::{init_logging_with_config, LogConfig};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = LogConfig::from_env();
    if std::env::var("BRRTG_LOG_LEVEL").is_err() {
        config.log_level = "warn".to_string();
        config.format = brrtguard::logging::LogFormat::Pretty;
    }
    let _guard = init_logging_with_config(&config)?;
    run_cli(cli)
}
