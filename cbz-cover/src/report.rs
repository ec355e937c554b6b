use std::fmt::Display;

use camino::Utf8Path;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    errors::Error,
    process::{Outcome, RunSummary},
};

static COUNTER_TEMPLATE: &str = "[{elapsed_precise}] [{wide_bar}] {pos}/{len} {msg}";

/// Steps an archive goes through while being processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Extracting,
    CheckingMetadata,
    CheckingTitlePage,
    SettingTitlePage,
    Repackaging,
    CleaningUp,
}

impl Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Extracting => "Extracting",
                Self::CheckingMetadata => "Checking for ComicInfo.xml in",
                Self::CheckingTitlePage => "Checking for title page in",
                Self::SettingTitlePage => "Setting title page in",
                Self::Repackaging => "Compressing",
                Self::CleaningUp => "Deleting extracted files of",
            }
        )
    }
}

/// Receives the progress of a batch run
pub trait Reporter {
    fn start(&mut self, _total: usize) {}

    fn step(&mut self, _archive: &Utf8Path, _step: Step) {}

    fn processed(&mut self, archive: &Utf8Path, outcome: Outcome, summary: &RunSummary);

    fn failed(&mut self, archive: &Utf8Path, error: &Error, summary: &RunSummary);

    fn finish(&mut self, summary: &RunSummary);
}

/// Prints every step of every archive
#[derive(Debug, Default)]
pub struct VerboseReporter;

impl Reporter for VerboseReporter {
    fn start(&mut self, total: usize) {
        println!("Processing {total} files");
    }

    fn step(&mut self, archive: &Utf8Path, step: Step) {
        println!("{step} {archive}...");
    }

    fn processed(&mut self, archive: &Utf8Path, outcome: Outcome, summary: &RunSummary) {
        println!("Done processing {archive}: {outcome} ({summary})");
    }

    fn failed(&mut self, archive: &Utf8Path, error: &Error, summary: &RunSummary) {
        eprintln!("Failed processing {archive}: {error} ({summary})");
    }

    fn finish(&mut self, summary: &RunSummary) {
        println!("Done! {summary}");
    }
}

/// Displays the counters on a single line refreshed in place
#[derive(Debug, Default)]
pub struct CounterReporter {
    bar: Option<ProgressBar>,
}

impl Reporter for CounterReporter {
    fn start(&mut self, total: usize) {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(COUNTER_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message(RunSummary::default().to_string());
        self.bar = Some(bar);
    }

    fn processed(&mut self, archive: &Utf8Path, outcome: Outcome, summary: &RunSummary) {
        if let Some(bar) = &self.bar {
            if outcome == Outcome::MissingMetadata {
                bar.println(format!("{archive}: {outcome}"));
            }
            bar.set_message(summary.to_string());
            bar.inc(1);
        }
    }

    fn failed(&mut self, archive: &Utf8Path, error: &Error, summary: &RunSummary) {
        if let Some(bar) = &self.bar {
            bar.println(format!("{archive}: {error}"));
            bar.set_message(summary.to_string());
            bar.inc(1);
        }
    }

    fn finish(&mut self, summary: &RunSummary) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        println!("Done! {summary}");
    }
}
