#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::env;

use anyhow::{bail, Result};
use camino::Utf8PathBuf;
use cbz_cover::{
    locate, process_batch, CounterReporter, ProcessOptions, Reporter, VerboseReporter,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[clap(about, author, version)]
pub struct Args {
    /// The archives to process, or a single glob pattern matched from the current directory.
    /// All the cbz files of the current directory are processed when omitted
    pub files: Vec<String>,
    /// Keep the archives' names instead of appending " (FIXED)", replacing the originals
    /// when they are in the output directory
    #[clap(long, action)]
    pub overwrite: bool,
    /// The output directory for the repackaged archives
    #[clap(short, long, default_value = "./")]
    pub output_path: Utf8PathBuf,
    /// Also search the subdirectories for archives
    #[clap(short, long, action)]
    pub recursive: bool,
    /// Print every processing step instead of the counters
    #[clap(short, long, action)]
    pub verbose: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    println!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let Ok(current_dir) = Utf8PathBuf::from_path_buf(env::current_dir()?) else {
        bail!("current dir is not a valid utf-8 path");
    };
    let Ok(scratch_root) = Utf8PathBuf::from_path_buf(env::temp_dir()) else {
        bail!("temp dir is not a valid utf-8 path");
    };

    let archives = locate(&args.files, &current_dir, args.recursive)?;
    println!("Found {} files", archives.len());

    let options = ProcessOptions {
        output_dir: current_dir.join(args.output_path),
        overwrite: args.overwrite,
        scratch_root,
    };

    let mut reporter: Box<dyn Reporter> = if args.verbose {
        Box::new(VerboseReporter)
    } else {
        Box::new(CounterReporter::default())
    };
    process_batch(&archives, &options, reporter.as_mut());

    Ok(())
}
