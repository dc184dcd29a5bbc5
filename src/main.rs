use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;
use std::path::PathBuf;
use takeout_sorter::{Config, FsTimestampSetter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the exported media and their .json sidecars
    source_dir: PathBuf,
    /// Print planned moves without touching any file
    #[arg(long)]
    dry_run: bool,
    /// Group media into sorted/<YYYY-MM-DD>/ folders
    #[arg(long)]
    by_date: bool,
    /// Name of the folder receiving media files
    #[arg(long, default_value = takeout_sorter::config::SORTED_DIR_NAME)]
    sorted_dir: String,
    /// Name of the folder receiving sidecar files
    #[arg(long, default_value = takeout_sorter::config::METADATA_DIR_NAME)]
    metadata_dir: String,
    /// Log every file, not only skips and failures
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Config {
        let mut config = Config::new(self.source_dir);
        config.sorted_dir_name = self.sorted_dir;
        config.metadata_dir_name = self.metadata_dir;
        config.by_date = self.by_date;
        config.dry_run = self.dry_run;
        config
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let config = args.into_config();
    let summary = takeout_sorter::run(&config, &FsTimestampSetter)
        .with_context(|| format!("Cannot sort {}", config.source_dir.display()))?;

    info!(
        "Files in {} processed: {} scanned, {} relocated, {} skipped, {} failed",
        config.source_dir.display(),
        summary.scanned,
        summary.relocated,
        summary.skipped(),
        summary.failures.len()
    );

    if !summary.failures.is_empty() {
        println!("Found {} problematic files:", summary.failures.len());
        for failure in &summary.failures {
            println!("  {} - {}", failure.file.display(), failure.error);
        }
        if summary.partial_moves() > 0 {
            println!(
                "\n{} file(s) were only partially moved and need manual reconciliation.",
                summary.partial_moves()
            );
        }
        std::process::exit(1);
    }

    Ok(())
}
