//! Terminal display for domain-scan.
//!
//! Result lines and the summary go to stdout. Uses only the `console` crate.

use console::{pad_str, style, Alignment};
use domain_scan_lib::{Progress, ScanReport, ScanResult, Verdict};

use crate::output::WrittenFiles;
use crate::Settings;

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header at the start of a scan.
pub fn print_header(settings: &Settings, keyspace: u64) {
    let generator = &settings.generator;
    let scan = &settings.scan;

    println!(
        "{} {} {}",
        style("domain-scan").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "- {} x {} over {} ({} candidate{} before filtering)",
            generator.length,
            generator.pattern,
            generator.suffix,
            keyspace,
            if keyspace == 1 { "" } else { "s" }
        ))
        .dim(),
    );

    let mut meta_parts: Vec<String> = Vec::new();
    if let Some(regex) = &generator.regex_filter {
        meta_parts.push(format!("Filter: {} ({})", regex, generator.regex_mode));
    }
    meta_parts.push(format!("Workers: {}", scan.workers));
    meta_parts.push(format!("Delay: {}ms", scan.delay.as_millis()));
    meta_parts.push(format!("Probes: {}", probe_list(settings)));

    println!("{}", style(meta_parts.join(" | ")).dim());
    println!();
}

fn probe_list(settings: &Settings) -> String {
    let methods = settings.scan.methods;
    let enabled: Vec<&str> = [
        (methods.dns, "DNS"),
        (methods.whois, "WHOIS"),
        (methods.ssl, "SSL"),
    ]
    .into_iter()
    .filter_map(|(on, name)| on.then_some(name))
    .collect();
    enabled.join("+")
}

// ── Result line ──────────────────────────────────────────────────────────────

/// Print one result with a `[n/total]` counter.
///
/// Registered lines are only shown when `show_registered` is set.
pub fn print_result(result: &ScanResult, progress: &Progress, total: u64, show_registered: bool) {
    if let Some(line) = format_result(result, progress, total, show_registered) {
        println!("{}", line);
    }
}

fn format_result(
    result: &ScanResult,
    progress: &Progress,
    total: u64,
    show_registered: bool,
) -> Option<String> {
    let padded_domain = pad_str(&result.domain, 24, Alignment::Left, Some(".."));
    let prefix = style(format!("[{}/{}]", progress.processed, total)).dim();

    let status = if let Some(error) = &result.error {
        format!("{}  {}", style("ERROR").yellow(), style(error).dim())
    } else {
        match &result.verdict {
            Verdict::Available => style("AVAILABLE").green().bold().to_string(),
            Verdict::Registered if show_registered => format!(
                "{}  {}",
                style("REGISTERED").red().bold(),
                style(format!("[{}]", result.signature_list())).dim()
            ),
            Verdict::Registered => return None,
            Verdict::SpecialStatus(reason) => format!(
                "{}  {}",
                style("SPECIAL").magenta().bold(),
                style(format!("({})", reason)).dim()
            ),
        }
    };

    Some(format!("  {} {}  {}", prefix, padded_domain, status))
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print totals and the files that were written.
pub fn print_summary(report: &ScanReport, written: &WrittenFiles, show_registered: bool, json: bool) {
    // Keep stdout machine-readable in JSON mode.
    let emit = |line: String| {
        if json {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    };

    emit(format!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    ));
    emit(format!(
        "  {} domain{} checked in {:.1}s  {}  {}  {}  {}  {}  {}  {}  {}",
        style(report.processed).bold(),
        if report.processed == 1 { "" } else { "s" },
        report.duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} available", report.available.len())).green(),
        style("|").dim(),
        style(format!("{} registered", report.registered.len())).red(),
        style("|").dim(),
        style(format!("{} special", report.special.len())).magenta(),
        style("|").dim(),
        style(format!("{} errors", report.errors.len())).yellow(),
    ));

    if !report.is_complete() {
        emit(format!(
            "  {} generated {} candidates but processed {}",
            style("warning:").yellow().bold(),
            report.generated,
            report.processed
        ));
    }

    emit(format!(
        "  Available domains saved to {}",
        style(written.available.display()).cyan()
    ));
    if show_registered {
        if let Some(path) = &written.registered {
            emit(format!(
                "  Registered domains saved to {}",
                style(path.display()).cyan()
            ));
        }
    }
    if let Some(path) = &written.special_status {
        emit(format!(
            "  {} domain{} need manual review, saved to {}",
            report.special_status.len(),
            if report.special_status.len() == 1 { "" } else { "s" },
            style(path.display()).cyan()
        ));
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use domain_scan_lib::Signature;

    fn make_result(domain: &str, verdict: Verdict) -> ScanResult {
        ScanResult {
            domain: domain.to_string(),
            verdict,
            signatures: Vec::new(),
            error: None,
        }
    }

    fn progress(processed: u64) -> Progress {
        Progress {
            processed,
            ..Default::default()
        }
    }

    #[test]
    fn test_available_line() {
        let line = format_result(&make_result("ab.li", Verdict::Available), &progress(3), 8, false)
            .unwrap();
        assert!(line.contains("[3/8]"));
        assert!(line.contains("ab.li"));
        assert!(line.contains("AVAILABLE"));
    }

    #[test]
    fn test_registered_hidden_unless_requested() {
        let mut result = make_result("zz.li", Verdict::Registered);
        result.signatures = vec![Signature::DnsNs, Signature::Whois];

        assert!(format_result(&result, &progress(1), 1, false).is_none());

        let line = format_result(&result, &progress(1), 1, true).unwrap();
        assert!(line.contains("REGISTERED"));
        assert!(line.contains("DNS_NS, WHOIS"));
    }

    #[test]
    fn test_special_and_error_lines() {
        let special = make_result("hh.li", Verdict::SpecialStatus("REDEMPTIONPERIOD".to_string()));
        let line = format_result(&special, &progress(2), 4, false).unwrap();
        assert!(line.contains("SPECIAL"));
        assert!(line.contains("(REDEMPTIONPERIOD)"));

        let mut failed = make_result("xa.li", Verdict::Available);
        failed.error = Some("worker task failed".to_string());
        let line = format_result(&failed, &progress(3), 4, false).unwrap();
        assert!(line.contains("ERROR"));
        assert!(!line.contains("AVAILABLE"));
    }

    #[test]
    fn test_probe_list() {
        let mut settings = Settings::default();
        assert_eq!(probe_list(&settings), "DNS+WHOIS+SSL");
        settings.scan.methods.whois = false;
        assert_eq!(probe_list(&settings), "DNS+SSL");
    }
}
