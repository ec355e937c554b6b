#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub use crate::errors::{Error, Result};
pub use crate::locate::locate;
pub use crate::process::{process_batch, process_file, Outcome, ProcessOptions, RunSummary};
pub use crate::report::{CounterReporter, Reporter, Step, VerboseReporter};

pub mod errors;
pub mod locate;
pub mod metadata;
pub mod process;
pub mod repack;
pub mod report;
pub mod scratch;
