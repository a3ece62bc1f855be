mod classifier;
mod config;
mod finder;
mod omdb;
mod reelsort;
mod renamer;

use crate::config::{Config, Settings};
use crate::reelsort::ReelSort;
use std::env;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(
    name = "reel-sort",
    about = "Find, classify, rename, and move video files."
)]
struct Options {
    /// Source directory to scan for videos
    #[structopt(short, long, parse(from_os_str))]
    source: Option<PathBuf>,

    /// Output directory for series
    #[structopt(long, parse(from_os_str))]
    series_output: Option<PathBuf>,

    /// Output directory for movies
    #[structopt(long, parse(from_os_str))]
    movie_output: Option<PathBuf>,

    /// Only print intended actions without moving files
    #[structopt(long)]
    dry_run: bool,

    /// Move non-video files to a Deleted folder and prune empty directories
    #[structopt(long)]
    clean_up: bool,

    /// Answer yes to the confirmation prompt
    #[structopt(short = "y", long)]
    yes: bool,

    /// Config file with the same keys as the flags above
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Write a sample config file and exit
    #[structopt(long, parse(from_os_str))]
    init_config: Option<PathBuf>,

    /// Silence all diagnostics
    #[structopt(short, long)]
    quiet: bool,

    /// Increase diagnostic verbosity
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u64,
}

fn main() -> anyhow::Result<()> {
    let opts = Options::from_args();

    stderrlog::new()
        .module(module_path!())
        .quiet(opts.quiet)
        .verbosity(opts.verbose as usize + 1)
        .init()?;

    if let Some(path) = &opts.init_config {
        let written = Config::write_sample(path)?;
        println!("Sample config written to {}", written.display());
        return Ok(());
    }

    let file_config = match &opts.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let cli = Settings {
        source: opts.source,
        series_output: opts.series_output,
        movie_output: opts.movie_output,
        dry_run: opts.dry_run,
        clean_up: opts.clean_up,
        assume_yes: opts.yes,
        api_key: env::var("OMDB_API_KEY").ok(),
    };
    let settings = Settings::merge(cli, file_config);

    if settings.is_noop() {
        println!("Files to move");
        println!("{}", reelsort::empty_summary());
        return Ok(());
    }

    let paths = settings.require_paths()?;
    ReelSort::new(paths, &settings).run()
}
