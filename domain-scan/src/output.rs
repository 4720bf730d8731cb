//! Result files written at the end of a scan.
//!
//! Three lists, one domain per line:
//! - available domains (always written, possibly empty)
//! - registered domains (only with `show_registered`)
//! - special-status domains as `domain<TAB>status` (only when non-empty)

use crate::Settings;
use domain_scan_lib::{group_by_shape, render_file_template, OutputSection, ScanReport};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_AVAILABLE_FILE: &str = "available_domains_{pattern}_{length}_{suffix}.txt";
pub const DEFAULT_REGISTERED_FILE: &str = "registered_domains_{pattern}_{length}_{suffix}.txt";
pub const DEFAULT_SPECIAL_STATUS_FILE: &str =
    "special_status_domains_{pattern}_{length}_{suffix}.txt";

/// Where and under which names result lists are written.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub output_dir: PathBuf,
    pub available_file: String,
    pub registered_file: String,
    pub special_status_file: String,
    pub show_registered: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            available_file: DEFAULT_AVAILABLE_FILE.to_string(),
            registered_file: DEFAULT_REGISTERED_FILE.to_string(),
            special_status_file: DEFAULT_SPECIAL_STATUS_FILE.to_string(),
            show_registered: false,
        }
    }
}

impl OutputSettings {
    pub fn apply_file_section(&mut self, section: OutputSection) {
        if let Some(dir) = section.output_dir {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(name) = section.available_file {
            self.available_file = name;
        }
        if let Some(name) = section.registered_file {
            self.registered_file = name;
        }
        if let Some(name) = section.special_status_file {
            self.special_status_file = name;
        }
    }
}

/// Paths of the files a run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WrittenFiles {
    pub available: PathBuf,
    pub registered: Option<PathBuf>,
    pub special_status: Option<PathBuf>,
}

/// Write the result lists for a finished scan.
pub fn write_results(report: &ScanReport, settings: &Settings) -> io::Result<WrittenFiles> {
    let out = &settings.output;
    let generator = &settings.generator;
    fs::create_dir_all(&out.output_dir)?;

    let path_for = |template: &str| {
        out.output_dir.join(render_file_template(
            template,
            generator.pattern,
            generator.length,
            &generator.suffix,
        ))
    };

    let available = path_for(&out.available_file);
    write_lines(&available, report.available.iter())?;

    let registered = if out.show_registered {
        let path = path_for(&out.registered_file);
        write_lines(&path, report.registered.iter())?;
        Some(path)
    } else {
        None
    };

    let special_status = if report.special_status.is_empty() {
        None
    } else {
        let path = path_for(&out.special_status_file);
        write_lines(
            &path,
            report
                .special_status
                .iter()
                .map(|record| format!("{}\t{}", record.domain, record.status)),
        )?;
        Some(path)
    };

    Ok(WrittenFiles {
        available,
        registered,
        special_status,
    })
}

/// Write available domains into `<dir>/<SHAPE>.txt`, one file per shape.
///
/// Returns the number of shape files written.
pub fn write_shape_groups(dir: &Path, domains: &[String]) -> io::Result<usize> {
    fs::create_dir_all(dir)?;
    let groups = group_by_shape(domains);
    for (shape, members) in &groups {
        write_lines(&dir.join(format!("{}.txt", shape)), members.iter())?;
    }
    Ok(groups.len())
}

fn write_lines<I, S>(path: &Path, lines: I) -> io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut writer = BufWriter::new(fs::File::create(path)?);
    for line in lines {
        writeln!(writer, "{}", line.as_ref())?;
    }
    writer.flush()
}
