mod cli;

use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use pkgguard::advisory::has_fatal;
use pkgguard::output::formatter;
use pkgguard::{GhsaScanner, GitHubClient, Package, ScanRequest, SecurityScanner};

fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::builder()
        .with_default_directive(cli.verbosity.tracing_level_filter().into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_request(path: &Path) -> Result<ScanRequest> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read scan request from stdin")?;
        buf
    } else {
        if !path.exists() {
            bail!("file not found: {}", path.display());
        }
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };

    serde_json::from_str(&raw)
        .with_context(|| format!("invalid scan request in {}", path.display()))
}

fn build_request(cli: &Cli) -> Result<ScanRequest> {
    let mut request = match &cli.file {
        Some(path) => read_request(path)?,
        None => ScanRequest::default(),
    };

    for raw in &cli.packages {
        let package: Package = raw
            .parse()
            .with_context(|| format!("invalid package argument '{raw}'"))?;
        request.packages.push(package);
    }

    Ok(request)
}

async fn run(cli: Cli) -> Result<()> {
    let request = build_request(&cli)?;

    let client = GitHubClient::new(cli.github_token.clone())?;
    if !client.has_token() {
        warn!("no GitHub token provided; advisory queries are subject to anonymous rate limits");
    }

    let scanner = GhsaScanner::from_client(client);
    let advisories = scanner.scan(request).await?;
    if has_fatal(&advisories) {
        warn!("fatal advisories found; installation should not proceed");
    }

    let mut stdout = std::io::stdout().lock();
    formatter(cli.json)
        .write_results(&advisories, &mut stdout)
        .context("failed to write results")?;

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
