//! Configuration file parsing and management.
//!
//! This module handles loading scan settings from TOML files and `DS_*`
//! environment variables, and merging configurations with proper precedence
//! rules. Applying the result on top of built-in defaults and CLI flags is
//! left to the caller.

use crate::error::DomainScanError;
use crate::generate::MAX_LENGTH;
use crate::types::{CharsetPattern, RegexMode, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration loaded from TOML files.
///
/// ```toml
/// [domain]
/// length = 3
/// suffix = ".li"
/// pattern = "D"
///
/// [scanner]
/// delay = 1000
/// workers = 10
///
/// [scanner.methods]
/// whois_check = false
///
/// [output]
/// output_dir = "results"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Candidate generation settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<DomainSection>,

    /// Worker pool and probe settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanner: Option<ScannerSection>,

    /// Output file settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputSection>,
}

/// `[domain]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DomainSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,

    /// Alphabet selector: "d", "D" or "a"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex_filter: Option<String>,

    /// "full" or "prefix"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex_mode: Option<String>,
}

/// `[scanner]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ScannerSection {
    /// Per-worker pause between candidates, in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_registered: Option<bool>,

    /// Total WHOIS attempts per candidate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois_retries: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<MethodsSection>,
}

/// `[scanner.methods]` section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct MethodsSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_check: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois_check: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_check: Option<bool>,
}

/// `[output]` section. File names may use `{pattern}`, `{length}` and
/// `{suffix}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_status_file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to log which files were picked up
    pub verbose: bool,
}

impl ConfigManager {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load and validate configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DomainScanError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DomainScanError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DomainScanError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;
        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is lowest, then the home directory, then the current
    /// directory. Values from later files win field by field.
    pub fn discover_and_load(&self) -> Result<FileConfig, DomainScanError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping config file"),
            }
        }

        if self.verbose {
            for path in &loaded_files {
                info!(path = %path.display(), "loaded config file");
            }
        }

        Ok(merged_config)
    }

    /// Looks for configuration files in the current directory.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./domain-scan.toml", "./.domain-scan.toml"]
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Looks for configuration files in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".domain-scan.toml", "domain-scan.toml"]
            .iter()
            .map(|name| Path::new(&home).join(name))
            .find(|path| path.exists())
    }

    /// `$XDG_CONFIG_HOME/domain-scan/config.toml`, falling back to `~/.config`.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("domain-scan").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations; values from `higher` win.
    pub fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            domain: merge_section(lower.domain, higher.domain, |lower, higher| DomainSection {
                length: higher.length.or(lower.length),
                suffix: higher.suffix.or(lower.suffix),
                pattern: higher.pattern.or(lower.pattern),
                regex_filter: higher.regex_filter.or(lower.regex_filter),
                regex_mode: higher.regex_mode.or(lower.regex_mode),
            }),
            scanner: merge_section(lower.scanner, higher.scanner, |lower, higher| {
                ScannerSection {
                    delay: higher.delay.or(lower.delay),
                    workers: higher.workers.or(lower.workers),
                    show_registered: higher.show_registered.or(lower.show_registered),
                    whois_retries: higher.whois_retries.or(lower.whois_retries),
                    methods: merge_section(lower.methods, higher.methods, |lower, higher| {
                        MethodsSection {
                            dns_check: higher.dns_check.or(lower.dns_check),
                            whois_check: higher.whois_check.or(lower.whois_check),
                            ssl_check: higher.ssl_check.or(lower.ssl_check),
                        }
                    }),
                }
            }),
            output: merge_section(lower.output, higher.output, |lower, higher| OutputSection {
                available_file: higher.available_file.or(lower.available_file),
                registered_file: higher.registered_file.or(lower.registered_file),
                special_status_file: higher.special_status_file.or(lower.special_status_file),
                output_dir: higher.output_dir.or(lower.output_dir),
                verbose: higher.verbose.or(lower.verbose),
            }),
        }
    }

    /// Validate a configuration for common issues.
    pub fn validate_config(&self, config: &FileConfig) -> Result<(), DomainScanError> {
        if let Some(domain) = &config.domain {
            if let Some(length) = domain.length {
                if length == 0 || length > MAX_LENGTH {
                    return Err(DomainScanError::config(format!(
                        "Domain length must be between 1 and {}",
                        MAX_LENGTH
                    )));
                }
            }
            if let Some(pattern) = &domain.pattern {
                pattern.parse::<CharsetPattern>()?;
            }
            if let Some(mode) = &domain.regex_mode {
                mode.parse::<RegexMode>()?;
            }
        }

        if let Some(scanner) = &config.scanner {
            if let Some(workers) = scanner.workers {
                if workers == 0 || workers > 100 {
                    return Err(DomainScanError::config(
                        "Workers must be between 1 and 100",
                    ));
                }
            }
            if let Some(retries) = scanner.whois_retries {
                if retries == 0 || retries > RetryPolicy::MAX_ATTEMPTS {
                    return Err(DomainScanError::config(format!(
                        "whois_retries must be between 1 and {}",
                        RetryPolicy::MAX_ATTEMPTS
                    )));
                }
            }
        }

        Ok(())
    }
}

fn merge_section<T>(lower: Option<T>, higher: Option<T>, merge: impl FnOnce(T, T) -> T) -> Option<T> {
    match (lower, higher) {
        (Some(lower), Some(higher)) => Some(merge(lower, higher)),
        (lower, higher) => higher.or(lower),
    }
}

/// Environment variable configuration that mirrors CLI options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub length: Option<usize>,
    pub suffix: Option<String>,
    pub pattern: Option<CharsetPattern>,
    pub regex: Option<String>,
    pub workers: Option<usize>,
    /// Milliseconds
    pub delay: Option<u64>,
    pub config: Option<String>,
}

/// Load configuration from `DS_*` environment variables.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    load_env_config_from(|key| env::var(key).ok())
}

/// Same as [`load_env_config`] with an injectable lookup, for tests.
pub fn load_env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    if let Some(val) = lookup("DS_LENGTH") {
        match val.trim().parse::<usize>() {
            Ok(length) if (1..=MAX_LENGTH).contains(&length) => {
                info!(length, "using DS_LENGTH");
                env_config.length = Some(length);
            }
            _ => warn!(value = %val, "invalid DS_LENGTH, must be 1-{}", MAX_LENGTH),
        }
    }

    if let Some(suffix) = lookup("DS_SUFFIX") {
        if !suffix.trim().is_empty() {
            info!(suffix = %suffix, "using DS_SUFFIX");
            env_config.suffix = Some(suffix.trim().to_string());
        }
    }

    if let Some(val) = lookup("DS_PATTERN") {
        match val.parse::<CharsetPattern>() {
            Ok(pattern) => {
                info!(%pattern, "using DS_PATTERN");
                env_config.pattern = Some(pattern);
            }
            Err(e) => warn!(value = %val, error = %e, "invalid DS_PATTERN"),
        }
    }

    if let Some(regex) = lookup("DS_REGEX") {
        if !regex.is_empty() {
            info!(regex = %regex, "using DS_REGEX");
            env_config.regex = Some(regex);
        }
    }

    if let Some(val) = lookup("DS_WORKERS") {
        match val.trim().parse::<usize>() {
            Ok(workers) if (1..=100).contains(&workers) => {
                info!(workers, "using DS_WORKERS");
                env_config.workers = Some(workers);
            }
            _ => warn!(value = %val, "invalid DS_WORKERS, must be 1-100"),
        }
    }

    if let Some(val) = lookup("DS_DELAY") {
        match val.trim().parse::<u64>() {
            Ok(delay) => {
                info!(delay_ms = delay, "using DS_DELAY");
                env_config.delay = Some(delay);
            }
            Err(_) => warn!(value = %val, "invalid DS_DELAY, expected milliseconds"),
        }
    }

    if let Some(path) = lookup("DS_CONFIG") {
        if !path.trim().is_empty() {
            info!(path = %path, "using DS_CONFIG");
            env_config.config = Some(path);
        }
    }

    env_config
}
