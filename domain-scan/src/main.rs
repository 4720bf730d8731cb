//! Domain Scan CLI Application
//!
//! Enumerates every domain of a given length over an alphabet, probes each
//! candidate over DNS, WHOIS and TLS, and writes the available, registered
//! and special-status lists to disk.

mod output;
mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use domain_scan_lib::{
    generate_candidates, load_env_config, normalize_suffix, CandidateGenerator, CharsetPattern,
    ConfigManager, DomainScanner, FileConfig, GeneratorConfig, Progress, RegexMode, RetryPolicy,
    ScanConfig, ScanResult,
};
use output::OutputSettings;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for domain-scan
#[derive(Parser, Debug, Default)]
#[command(name = "domain-scan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Enumerate short domain names and classify their registration status")]
#[command(
    long_about = "Enumerate every domain of a given length over an alphabet and classify each one as available, registered or special status using DNS, WHOIS and TLS evidence.\n\nSettings are taken from CLI flags, then DS_* environment variables, then a config file, then built-in defaults."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Length of the domain body (1-63) [default: 3]
    #[arg(short = 'l', long = "length", value_name = "N", help_heading = "Candidates")]
    pub length: Option<usize>,

    /// Domain suffix, e.g. .li [default: .li]
    #[arg(short = 's', long = "suffix", value_name = "SUFFIX", help_heading = "Candidates")]
    pub suffix: Option<String>,

    /// Alphabet: d (digits), D (letters), a (alphanumeric) [default: D]
    #[arg(short = 'p', long = "pattern", value_name = "PATTERN", help_heading = "Candidates")]
    pub pattern: Option<String>,

    /// Regex filter applied to candidates
    #[arg(short = 'r', long = "regex", value_name = "REGEX", help_heading = "Candidates")]
    pub regex: Option<String>,

    /// Regex match mode: full (with suffix) or prefix (body only) [default: full]
    #[arg(long = "regex-mode", value_name = "MODE", help_heading = "Candidates")]
    pub regex_mode: Option<String>,

    /// Print the filtered candidates without probing them
    #[arg(long = "dry-run", help_heading = "Candidates")]
    pub dry_run: bool,

    /// Pause each worker takes between candidates, in milliseconds [default: 1000]
    #[arg(long = "delay", value_name = "MS", help_heading = "Scanning")]
    pub delay: Option<u64>,

    /// Number of concurrent workers (1-100) [default: 10]
    #[arg(short = 'w', long = "workers", value_name = "N", help_heading = "Scanning")]
    pub workers: Option<usize>,

    /// Total WHOIS attempts per candidate (1-5) [default: 3]
    #[arg(long = "whois-retries", value_name = "N", help_heading = "Scanning")]
    pub whois_retries: Option<u32>,

    /// Skip the DNS probe
    #[arg(long = "no-dns", help_heading = "Scanning")]
    pub no_dns: bool,

    /// Skip the WHOIS probe
    #[arg(long = "no-whois", help_heading = "Scanning")]
    pub no_whois: bool,

    /// Skip the TLS certificate probe
    #[arg(long = "no-ssl", help_heading = "Scanning")]
    pub no_ssl: bool,

    /// Also list and save registered domains
    #[arg(long = "show-registered", help_heading = "Output")]
    pub show_registered: bool,

    /// Directory for the result files [default: .]
    #[arg(short = 'o', long = "output-dir", value_name = "DIR", help_heading = "Output")]
    pub output_dir: Option<String>,

    /// Stream one JSON object per result to stdout
    #[arg(short = 'j', long = "json", help_heading = "Output")]
    pub json: bool,

    /// Write available domains into one file per character shape
    #[arg(long = "group-by-shape", value_name = "DIR", help_heading = "Output")]
    pub group_by_shape: Option<PathBuf>,

    /// Use a specific config file instead of discovery
    #[arg(short = 'c', long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Log run lifecycle to stderr
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,

    /// Log per-probe detail to stderr
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,
}

/// Fully resolved run settings.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub generator: GeneratorConfig,
    pub scan: ScanConfig,
    pub output: OutputSettings,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(&args);

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run_domain_scan(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over the flags.
fn init_tracing(args: &Args) {
    let default_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if let Some(workers) = args.workers {
        if workers == 0 || workers > 100 {
            return Err("Workers must be between 1 and 100".to_string());
        }
    }

    if let Some(retries) = args.whois_retries {
        if retries == 0 || retries > RetryPolicy::MAX_ATTEMPTS {
            return Err(format!(
                "WHOIS retries must be between 1 and {}",
                RetryPolicy::MAX_ATTEMPTS
            ));
        }
    }

    if args.dry_run && args.json {
        return Err("Cannot combine --dry-run with --json".to_string());
    }

    if args.no_dns && args.no_whois && args.no_ssl {
        return Err("At least one probe must stay enabled".to_string());
    }

    Ok(())
}

/// Main scanning logic
async fn run_domain_scan(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = build_settings(&args)?;

    // Configuration errors (bad alphabet, length, regex) surface here,
    // before any candidate is produced.
    let candidates = generate_candidates(&settings.generator)?;

    if args.dry_run {
        return print_dry_run(candidates);
    }

    let scanner = DomainScanner::new(settings.scan.clone())?;

    if !args.json {
        ui::print_header(&settings, candidates.total());
    }

    let keyspace = candidates.total();
    let show_registered = settings.output.show_registered;
    let json = args.json;

    let report = scanner
        .scan(candidates, |result: &ScanResult, progress: &Progress| {
            if json {
                match result.to_record().to_json_line() {
                    Ok(line) => println!("{}", line),
                    Err(e) => tracing::warn!(error = %e, "failed to encode result"),
                }
            } else {
                ui::print_result(result, progress, keyspace, show_registered);
            }
        })
        .await?;

    let written = output::write_results(&report, &settings)?;

    if let Some(dir) = &args.group_by_shape {
        let shapes = output::write_shape_groups(dir, &report.available)?;
        tracing::info!(dir = %dir.display(), shapes, "grouped available domains by shape");
    }

    ui::print_summary(&report, &written, show_registered, args.json);

    Ok(())
}

/// Print every candidate to stdout and the count to stderr.
fn print_dry_run(candidates: CandidateGenerator) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut count = 0u64;
    for candidate in candidates {
        writeln!(out, "{}", candidate)?;
        count += 1;
    }
    out.flush()?;
    eprintln!("{} candidates", count);
    Ok(())
}

/// Build settings with proper precedence:
/// 1. CLI arguments (highest)
/// 2. Environment variables (DS_*)
/// 3. Explicit config file (--config or DS_CONFIG), otherwise discovered files
/// 4. Built-in defaults
fn build_settings(args: &Args) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = Settings::default();
    let config_manager = ConfigManager::new(args.verbose);
    let env_config = load_env_config();

    // Step 1: config file
    let explicit_path = args.config.clone().or_else(|| env_config.config.clone());
    let file_config = match &explicit_path {
        Some(path) => {
            tracing::info!(path = %path, "using explicit config file");
            config_manager
                .load_file(path)
                .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
        }
        None => config_manager.discover_and_load()?,
    };
    merge_file_config_into_settings(&mut settings, file_config)?;

    // Step 2: environment
    if let Some(length) = env_config.length {
        settings.generator.length = length;
    }
    if let Some(suffix) = &env_config.suffix {
        settings.generator.suffix = normalize_suffix(suffix);
    }
    if let Some(pattern) = env_config.pattern {
        settings.generator.pattern = pattern;
    }
    if let Some(regex) = &env_config.regex {
        settings.generator.regex_filter = Some(regex.clone());
    }
    if let Some(workers) = env_config.workers {
        settings.scan = settings.scan.clone().with_workers(workers);
    }
    if let Some(delay) = env_config.delay {
        settings.scan = settings.scan.clone().with_delay(Duration::from_millis(delay));
    }

    // Step 3: CLI arguments
    apply_cli_args(&mut settings, args)?;

    Ok(settings)
}

/// Apply file configuration on top of defaults.
fn merge_file_config_into_settings(
    settings: &mut Settings,
    file_config: FileConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(domain) = file_config.domain {
        if let Some(length) = domain.length {
            settings.generator.length = length;
        }
        if let Some(suffix) = domain.suffix {
            settings.generator.suffix = normalize_suffix(&suffix);
        }
        if let Some(pattern) = domain.pattern {
            settings.generator.pattern = pattern.parse::<CharsetPattern>()?;
        }
        if let Some(filter) = domain.regex_filter.filter(|f| !f.is_empty()) {
            settings.generator.regex_filter = Some(filter);
        }
        if let Some(mode) = domain.regex_mode {
            settings.generator.regex_mode = mode.parse::<RegexMode>()?;
        }
    }

    if let Some(scanner) = file_config.scanner {
        if let Some(delay) = scanner.delay {
            settings.scan = settings.scan.clone().with_delay(Duration::from_millis(delay));
        }
        if let Some(workers) = scanner.workers {
            settings.scan = settings.scan.clone().with_workers(workers);
        }
        if let Some(show) = scanner.show_registered {
            settings.output.show_registered = show;
        }
        if let Some(retries) = scanner.whois_retries {
            settings.scan.whois_retry.max_attempts = retries;
        }
        if let Some(methods) = scanner.methods {
            if let Some(dns) = methods.dns_check {
                settings.scan.methods.dns = dns;
            }
            if let Some(whois) = methods.whois_check {
                settings.scan.methods.whois = whois;
            }
            if let Some(ssl) = methods.ssl_check {
                settings.scan.methods.ssl = ssl;
            }
        }
    }

    if let Some(output) = file_config.output {
        settings.output.apply_file_section(output);
    }

    Ok(())
}

/// Apply CLI arguments (highest precedence).
///
/// Only flags the user actually passed override lower layers.
fn apply_cli_args(settings: &mut Settings, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(length) = args.length {
        settings.generator.length = length;
    }
    if let Some(suffix) = &args.suffix {
        settings.generator.suffix = normalize_suffix(suffix);
    }
    if let Some(pattern) = &args.pattern {
        settings.generator.pattern = pattern.parse::<CharsetPattern>()?;
    }
    if let Some(regex) = &args.regex {
        settings.generator.regex_filter = (!regex.is_empty()).then(|| regex.clone());
    }
    if let Some(mode) = &args.regex_mode {
        settings.generator.regex_mode = mode.parse::<RegexMode>()?;
    }

    if let Some(delay) = args.delay {
        settings.scan = settings.scan.clone().with_delay(Duration::from_millis(delay));
    }
    if let Some(workers) = args.workers {
        settings.scan = settings.scan.clone().with_workers(workers);
    }
    if let Some(retries) = args.whois_retries {
        settings.scan.whois_retry.max_attempts = retries;
    }

    // Probe flags only ever disable.
    if args.no_dns {
        settings.scan.methods.dns = false;
    }
    if args.no_whois {
        settings.scan.methods.whois = false;
    }
    if args.no_ssl {
        settings.scan.methods.ssl = false;
    }

    if args.show_registered {
        settings.output.show_registered = true;
    }
    if let Some(dir) = &args.output_dir {
        settings.output.output_dir = PathBuf::from(dir);
    }

    if settings.generator.suffix.is_empty() {
        return Err("Domain suffix cannot be empty".into());
    }

    Ok(())
}
