use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{BACKUP_DIR, LOW_RES_DIR, SessionConfig};
use crate::downscale::{DownscaleOutcome, downscale};
use crate::fsops;
use crate::media::MediaKind;
use crate::metadata::{DateLookup, lookup_date};
use crate::order::{MediaFile, OrderOptions, SequencedFile, order};
use crate::rewrite::rewrite;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub renamed: usize,
    pub dated: usize,
    pub undated: usize,
    pub downscaled: usize,
    pub low_res_copied: usize,
}

/// One line of a dry-run plan.
#[derive(Debug, Serialize)]
pub struct PlannedRename {
    pub from: PathBuf,
    pub to: PathBuf,
    pub date_key: Option<String>,
}

fn progress_bar(len: usize, label: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "  {label:<10} {{bar:40.green/dark_gray}} {{pos}}/{{len}}  {{msg}}"
            ))?
            .progress_chars("━╸─"),
    );
    Ok(pb)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Refuse to start when a previous run left its folders behind.
pub fn check_preconditions(cfg: &SessionConfig) -> Result<()> {
    for dir in [cfg.backup_dir(), cfg.low_res_dir()] {
        if dir.exists() {
            anyhow::bail!(
                "{} folder already exists. Cannot convert, please remove it!",
                dir.display()
            );
        }
    }
    Ok(())
}

/// Read a creation date for every path (relative to `root`).
///
/// With sorting disabled no file is opened and everything is undated.
pub fn read_dates(root: &Path, paths: Vec<PathBuf>, sort_by_date: bool) -> Result<Vec<MediaFile>> {
    if !sort_by_date {
        return Ok(paths
            .into_iter()
            .map(|p| MediaFile::new(p, None))
            .collect());
    }

    let pb = progress_bar(paths.len(), "Dates")?;
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        pb.set_message(file_label(&path));
        let lookup = lookup_date(&root.join(&path), MediaKind::of(&path));
        if let DateLookup::Inconsistent { container, stream } = &lookup {
            pb.suspend(|| {
                eprintln!(
                    "  {} {}: video creation date metadata is wrong ({container} vs {stream})",
                    style("!").yellow().bold(),
                    path.display()
                );
            });
        }
        files.push(MediaFile {
            original_path: path,
            raw_timestamp: lookup.into_timestamp(),
        });
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(files)
}

fn order_options(cfg: &SessionConfig) -> OrderOptions {
    OrderOptions {
        sort_by_date: cfg.sort_by_date,
        show_date_in_name: cfg.date_in_name,
    }
}

/// Compute the renames a conversion would perform, without touching disk.
pub fn plan(cfg: &SessionConfig) -> Result<Vec<PlannedRename>> {
    let paths = fsops::list_files(&cfg.working_dir, &[BACKUP_DIR, LOW_RES_DIR])?;
    let files = read_dates(&cfg.working_dir, paths, cfg.sort_by_date)?;
    Ok(order(&files, order_options(cfg))
        .into_iter()
        .map(|s| PlannedRename {
            to: rewrite(&s.original_path, &s.new_file_name, Path::new(BACKUP_DIR)),
            from: s.original_path,
            date_key: s.date_key,
        })
        .collect())
}

/// Back up, renumber and optionally downscale the working directory.
pub fn run_conversion(cfg: &SessionConfig) -> Result<ConversionReport> {
    let root = &cfg.working_dir;
    check_preconditions(cfg)?;

    let originals = fsops::list_files(root, &[BACKUP_DIR, LOW_RES_DIR])?;
    if originals.is_empty() {
        anyhow::bail!("No files were detected in {}", root.display());
    }

    println!(
        "  {}  {} files",
        style("Backup").dim(),
        style(originals.len()).green().bold()
    );
    fsops::copy_tree(root, &cfg.backup_dir())?;
    fsops::delete_files(root, &originals)?;

    let backed_up: Vec<PathBuf> = originals
        .iter()
        .map(|rel| Path::new(BACKUP_DIR).join(rel))
        .collect();
    let files = read_dates(root, backed_up, cfg.sort_by_date)?;
    let sequenced = order(&files, order_options(cfg));

    let new_paths = rename_all(root, &sequenced)?;
    let dated = sequenced.iter().filter(|s| s.date_key.is_some()).count();
    let mut report = ConversionReport {
        renamed: new_paths.len(),
        dated,
        undated: sequenced.len() - dated,
        ..ConversionReport::default()
    };

    if cfg.low_res {
        write_low_res(cfg, &new_paths, &mut report)?;
    }

    if !cfg.backup {
        fs::remove_dir_all(cfg.backup_dir())
            .with_context(|| format!("Cannot remove {}", cfg.backup_dir().display()))?;
    }

    Ok(report)
}

/// Copy every backed-up file to its new name. Returns the new relative paths.
fn rename_all(root: &Path, sequenced: &[SequencedFile]) -> Result<Vec<PathBuf>> {
    let pb = progress_bar(sequenced.len(), "Renaming")?;
    let mut new_paths = Vec::with_capacity(sequenced.len());
    for entry in sequenced {
        let new_rel = rewrite(&entry.original_path, &entry.new_file_name, Path::new(BACKUP_DIR));
        pb.set_message(format!(
            "{} → {}",
            file_label(&entry.original_path),
            entry.new_file_name
        ));
        fsops::copy_file(&root.join(&entry.original_path), &root.join(&new_rel))?;
        new_paths.push(new_rel);
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(new_paths)
}

fn write_low_res(cfg: &SessionConfig, new_paths: &[PathBuf], report: &mut ConversionReport) -> Result<()> {
    let low_res_root = cfg.low_res_dir();
    let pb = progress_bar(new_paths.len(), "Low-res")?;
    for rel in new_paths {
        let src = cfg.working_dir.join(rel);
        let dst = low_res_root.join(rel);
        if let Some(parent) = dst.parent() {
            fsops::ensure_dir(parent)?;
        }
        pb.set_message(file_label(rel));

        let outcome = match MediaKind::of(rel) {
            MediaKind::Image => downscale(&src, &dst, &cfg.print)?,
            MediaKind::Video | MediaKind::Other => DownscaleOutcome::Copied,
        };
        match outcome {
            DownscaleOutcome::Downscaled { .. } => report.downscaled += 1,
            DownscaleOutcome::Copied => {
                fsops::copy_file(&src, &dst)?;
                report.low_res_copied += 1;
            }
            DownscaleOutcome::Failed(reason) => {
                pb.suspend(|| {
                    eprintln!(
                        "  {} {}: {reason}, copying instead",
                        style("!").yellow().bold(),
                        rel.display()
                    );
                });
                fsops::copy_file(&src, &dst)?;
                report.low_res_copied += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(())
}

pub fn print_report(report: &ConversionReport, cfg: &SessionConfig) {
    println!();
    println!("  {} Done!", style("✔").green().bold());
    println!();
    println!(
        "  {}  {}",
        style("Renamed").dim(),
        style(report.renamed).green().bold()
    );
    if cfg.sort_by_date {
        println!(
            "  {}  {} dated  ·  {} without date",
            style("Dates").dim(),
            style(report.dated).cyan().bold(),
            style(report.undated).yellow().bold()
        );
    }
    if cfg.low_res {
        println!(
            "  {}  {} downscaled  ·  {} copied  →  {}",
            style("Low-res").dim(),
            style(report.downscaled).cyan().bold(),
            style(report.low_res_copied).white(),
            style(LOW_RES_DIR).white().bold()
        );
    }
    if cfg.backup {
        println!(
            "  {}  originals kept in {}",
            style("Backup").dim(),
            style(BACKUP_DIR).white().bold()
        );
    }
    println!();
}
