//! call-post - Post today's most called tokens to Twitter

use anyhow::Context;
use clap::Parser;
use libcallcast::config::resolve_config_path;
use libcallcast::logging::{LogFormat, LogGuard, LoggingConfig};
use libcallcast::{pipeline, Config, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "call-post")]
#[command(about = "Post the top 3 most called tokens to Twitter", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (defaults to $CALLCAST_CONFIG, then ~/.config/callcast/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fetch, rank and print the post without credentials or posting
    #[arg(long)]
    dry_run: bool,

    /// Log format (text, json, or pretty)
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    let _log_guard = match init_logging(&cli, &config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    match resolve_config_path(cli.config.as_deref()) {
        Some(path) => tracing::debug!("Loaded config from {}", path.display()),
        None => tracing::debug!("No config file found, using defaults"),
    }

    // Run the main logic and handle errors
    if let Err(e) = run(&cli, &config).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn init_logging(cli: &Cli, config: &Config) -> anyhow::Result<LogGuard> {
    let mut logging = LoggingConfig::from_config(&config.logging, cli.verbose);
    if let Some(format) = cli.log_format {
        logging = logging.with_format(format);
    }

    logging.init().with_context(|| match &logging.file {
        Some(path) => format!("Failed to open log file {}", path.display()),
        None => "Failed to initialize logging".to_string(),
    })
}

async fn run(cli: &Cli, config: &Config) -> Result<()> {
    if cli.dry_run {
        tracing::info!("Dry run: nothing will be posted");
        let content = pipeline::preview(config).await?;
        println!("{}", content.main.text);
        if let Some(reply) = content.reply {
            println!("--- reply ---");
            println!("{}", reply.text);
        }
        return Ok(());
    }

    let report = pipeline::run(config).await?;
    tracing::info!(
        "Posted {} tokens as @{} (post {}{})",
        report.tokens_ranked,
        report.identity.username,
        report.post_id,
        report
            .reply_id
            .as_deref()
            .map(|id| format!(", reply {}", id))
            .unwrap_or_default()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "call-post",
            "--config",
            "/tmp/callcast.toml",
            "--dry-run",
            "--log-format",
            "json",
            "-v",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/callcast.toml")));
        assert!(cli.dry_run);
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert!(cli.verbose);
    }

    #[test]
    fn test_invalid_log_format_rejected() {
        let result = Cli::try_parse_from(["call-post", "--log-format", "xml"]);
        assert!(result.is_err());
    }
}
