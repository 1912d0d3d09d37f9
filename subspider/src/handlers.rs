use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use subspider_core::console::Console;
use subspider_core::params::{DEFAULT_PARAM_WORDLIST_URL, ParamOptions, execute_param_scan};
use subspider_core::pipeline::{ScanOptions, execute_scan};
use subspider_core::wordlist::{DEFAULT_WORDLIST_URL, WordlistSource};
use tokio::sync::watch;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use url::Url;

// Helper functions for the scan handler

/// Parse a single line of the domains file into a bare hostname
pub fn parse_domain_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    // Tolerate full URLs, only the host matters
    let host = if line.contains("://") {
        match Url::parse(line).ok().and_then(|u| u.host_str().map(String::from)) {
            Some(host) => host,
            None => {
                warn!("Skipping invalid domain '{}'", line);
                return None;
            }
        }
    } else {
        line.to_string()
    };

    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() { None } else { Some(host) }
}

/// Load base domains from a file, keeping the first occurrence of duplicates
pub fn load_domains_from_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read domains file {}", path.display()))?;

    let mut seen = HashSet::new();
    let domains: Vec<String> = content
        .lines()
        .filter_map(parse_domain_line)
        .filter(|domain| seen.insert(domain.clone()))
        .collect();

    if domains.is_empty() {
        bail!("No domains found in {}", path.display());
    }

    Ok(domains)
}

/// Expand a leading `~` in a user supplied path
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref())
}

/// `--wordlist` wins, then `--wordlist-url`, then the given default URL
pub fn wordlist_source_from_matches(args: &ArgMatches, default_url: &str) -> Result<WordlistSource> {
    if let Some(path) = args.get_one::<PathBuf>("wordlist") {
        return Ok(WordlistSource::File(expand_path(path)));
    }
    if let Some(url) = args.get_one::<Url>("wordlist-url") {
        return Ok(WordlistSource::Remote(url.clone()));
    }
    let url = Url::parse(default_url).with_context(|| format!("Invalid wordlist URL {}", default_url))?;
    Ok(WordlistSource::Remote(url))
}

fn console_from_matches(args: &ArgMatches) -> Console {
    Console {
        show_progress_bars: !args.get_flag("no-progress"),
        quiet: args.get_flag("quiet"),
        muted: false,
    }
}

fn timeout_from_matches(args: &ArgMatches) -> Duration {
    Duration::from_secs(*args.get_one::<u64>("timeout").unwrap_or(&5))
}

/// Build scan options from the top-level matches (domains file is read here)
pub fn scan_options_from_matches(args: &ArgMatches) -> Result<ScanOptions> {
    let domains_file = args
        .get_one::<PathBuf>("DOMAINS_FILE")
        .context("A domains file is required")?;
    let domains = load_domains_from_file(&expand_path(domains_file))?;

    let mut options = ScanOptions {
        domains,
        wordlist: wordlist_source_from_matches(args, DEFAULT_WORDLIST_URL)?,
        timeout: timeout_from_matches(args),
        insecure: args.get_flag("insecure"),
        console: console_from_matches(args),
        ..Default::default()
    };

    if let Some(output) = args.get_one::<PathBuf>("output") {
        options.output = expand_path(output);
    }
    options.json_report = args.get_one::<PathBuf>("json").map(|p| expand_path(p));
    if let Some(n) = args.get_one::<usize>("dns-concurrency") {
        options.dns_concurrency = *n;
    }
    if let Some(n) = args.get_one::<usize>("http-concurrency") {
        options.http_concurrency = *n;
    }
    options.nameservers = args
        .get_many::<String>("resolver")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    Ok(options)
}

pub fn param_options_from_matches(args: &ArgMatches) -> Result<ParamOptions> {
    let url = args.get_one::<Url>("url").context("--url is required")?;

    let mut options = ParamOptions::new(url.clone());
    options.wordlist = wordlist_source_from_matches(args, DEFAULT_PARAM_WORDLIST_URL)?;
    options.timeout = timeout_from_matches(args);
    options.insecure = args.get_flag("insecure");
    options.console = console_from_matches(args);
    if let Some(output) = args.get_one::<PathBuf>("output") {
        options.output = expand_path(output);
    }
    if let Some(n) = args.get_one::<usize>("threads") {
        options.concurrency = *n;
    }

    Ok(options)
}

/// Flips to `true` on the first Ctrl-C
pub fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{} Interrupted, finishing in-flight probes...", "!".yellow().bold());
            let _ = tx.send(true);
        }
    });
    rx
}

pub fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,subspider={0},subspider_core={0},subspider_scanner={0}",
            level
        ))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub async fn handle_scan(args: &ArgMatches) -> Result<()> {
    let options = scan_options_from_matches(args)?;
    let outcome = execute_scan(options, Some(shutdown_on_ctrl_c()))
        .await
        .context("Scan failed")?;

    let summary = &outcome.summary;
    println!(
        "\n{} {} candidates, {} resolved, {} probed, {} live",
        "→".blue(),
        summary.candidates.to_string().bright_white(),
        summary.resolved.len().to_string().bright_white(),
        summary.probed.to_string().bright_white(),
        summary.live.len().to_string().green().bold()
    );
    Ok(())
}

pub async fn handle_params(args: &ArgMatches) -> Result<()> {
    let options = param_options_from_matches(args)?;
    let (report, _) = execute_param_scan(options, Some(shutdown_on_ctrl_c()))
        .await
        .context("Parameter scan failed")?;

    println!(
        "\n{} {} parameters tested, {} accepted",
        "→".blue(),
        report.probed.to_string().bright_white(),
        report.accepted.len().to_string().green().bold()
    );
    Ok(())
}

pub fn handle_update() {
    println!(
        "{} subspider does not overwrite its own binary.",
        "ℹ".blue()
    );
    println!(
        "{} Update with: {}",
        "→".blue(),
        "cargo install subspider --force".bright_white()
    );
}
