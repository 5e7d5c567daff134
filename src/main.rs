use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use vbr_sensor::core::{ConnectionError, Orchestrator};
use vbr_sensor::report::{ResultLayout, error_document};
use vbr_sensor::{adapters, config, context, logging};

#[derive(Parser, Serialize)]
#[command(name = "vbr-sensor")]
#[command(about = "PRTG sensor for scheduled Veeam backup jobs", long_about = None)]
struct Cli {
    /// Backup server host name or address
    host: String,

    /// Job name patterns to exclude (case-insensitive substrings)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exclusions: Vec<String>,

    #[serde(skip)]
    #[arg(long)]
    config: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    keep_default_exclusions: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    port: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    insecure: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    layout: Option<ResultLayout>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    simulation: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    verbose: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    json_logs: Option<bool>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let document = match Cli::try_parse() {
        Ok(cli) => run(&cli).await,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => argument_error(&e),
    };

    // PRTG reads the outcome from the document, the exit status stays 0
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", document).context("Failed to write sensor output")?;
    stdout.flush().context("Failed to write sensor output")?;
    Ok(())
}

/// Usage errors are reported in-band too; the full clap message goes to stderr.
fn argument_error(err: &clap::Error) -> String {
    let _ = err.print();

    let rendered = err.to_string();
    let summary = rendered
        .lines()
        .take_while(|line| !line.trim().is_empty())
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ");
    let summary = summary.strip_prefix("error: ").unwrap_or(&summary);

    error_document(&format!("Invalid arguments: {}", summary))
}

async fn run(cli: &Cli) -> String {
    let config = match config::AppConfig::new(cli.config.clone(), Some(cli)) {
        Ok(config) => config,
        Err(e) => return error_document(&format!("Invalid configuration: {}", e)),
    };

    logging::init(logging::LogConfig {
        json: config.json_logs,
        verbose: config.verbose,
    });

    let server = match adapters::get_server(&config) {
        Ok(server) => server,
        Err(e) => {
            let e = ConnectionError::new(config.host.clone(), e);
            tracing::error!(error = %format!("{:#}", e.source), "{}", e);
            return error_document(&e.to_string());
        }
    };

    let ctx = context::AppContext::new(config, server);
    Orchestrator::new(ctx).run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_host_is_reported_in_band() {
        let err = match Cli::try_parse_from(["vbr-sensor"]) {
            Ok(_) => panic!("host is required"),
            Err(e) => e,
        };
        assert!(err.use_stderr());

        let xml = argument_error(&err);
        assert!(xml.starts_with("<PRTG><Error>1</Error><Text>Invalid arguments: "));
        assert!(xml.ends_with("</Text></PRTG>"));
        assert!(xml.contains("HOST"));
        assert!(!xml.contains("<Result>"));
    }

    #[test]
    fn flags_do_not_swallow_exclusions() {
        let cli = Cli::try_parse_from(["vbr-sensor", "vbr01", "--insecure", "archive"]).unwrap();
        assert_eq!(cli.host, "vbr01");
        assert_eq!(cli.insecure, Some(true));
        assert_eq!(cli.exclusions, ["archive"]);
    }
}
