mod config;
mod convert;
mod downscale;
mod fsops;
mod media;
mod metadata;
mod order;
mod rewrite;
mod shell;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use config::SessionConfig;

#[derive(Parser)]
#[command(
    name = "photo-renumber",
    about = "Backs up a photo folder, renumbers its files by shooting date and makes print-ready copies"
)]
struct Cli {
    /// Working directory (default: current directory)
    dir: Option<PathBuf>,
    /// Delete the BACKUP folder once the conversion succeeded
    #[arg(long)]
    no_backup: bool,
    /// Number files in folder order instead of by date
    #[arg(long)]
    no_sort: bool,
    /// Leave the date out of generated file names
    #[arg(long)]
    no_date: bool,
    /// Skip the LOWRES print copies
    #[arg(long)]
    no_low_res: bool,
    /// Print the planned renames as JSON and exit without changing anything
    #[arg(long, conflicts_with = "run")]
    plan: bool,
    /// Convert once with these settings, without the interactive menu
    #[arg(long)]
    run: bool,
}

impl Cli {
    fn session_config(&self) -> Result<SessionConfig> {
        let dir = match &self.dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Cannot read current directory")?,
        };
        let mut cfg = SessionConfig::new(dir.clone());
        cfg.set_working_dir(&dir)?;
        cfg.backup = !self.no_backup;
        cfg.sort_by_date = !self.no_sort;
        cfg.date_in_name = !self.no_date;
        cfg.low_res = !self.no_low_res;
        Ok(cfg)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = cli.session_config()?;

    if cli.plan {
        let planned = convert::plan(&cfg)?;
        println!("{}", serde_json::to_string_pretty(&planned)?);
        return Ok(());
    }

    if cli.run {
        let report = convert::run_conversion(&cfg)?;
        convert::print_report(&report, &cfg);
        return Ok(());
    }

    let stdin = std::io::stdin();
    shell::Shell::new(cfg, stdin.lock()).run()
}
