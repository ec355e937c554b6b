use std::fmt::Display;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

use crate::{
    errors::Result,
    metadata::{has_metadata, has_title_page, image_files, set_title_page},
    repack::repackage,
    report::{Reporter, Step},
    scratch::ScratchDir,
};

/// How an archive ended up once processed without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A front cover has been designated and the archive repackaged
    TitlePageSet,
    /// The archive already had a front cover, it's repackaged unchanged
    TitlePageAlreadyPresent,
    /// No `ComicInfo.xml`, nothing has been written
    MissingMetadata,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::TitlePageSet => "title page set",
                Self::TitlePageAlreadyPresent => "title page already present",
                Self::MissingMetadata => "no ComicInfo.xml found, skipped",
            }
        )
    }
}

/// Counters of a batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub successful: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::TitlePageSet => self.successful += 1,
            Outcome::TitlePageAlreadyPresent => self.skipped += 1,
            Outcome::MissingMetadata => self.failed += 1,
        }
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.successful + self.skipped + self.failed
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "successful: {}, skipped: {}, failed: {}",
            self.successful, self.skipped, self.failed
        )
    }
}

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Where the repackaged archives are written
    pub output_dir: Utf8PathBuf,
    /// Keep the archives' names instead of appending ` (FIXED)`
    pub overwrite: bool,
    /// Directory the scratch directories are created in
    pub scratch_root: Utf8PathBuf,
}

/// Processes every archive in order, a failing archive never stops the batch
pub fn process_batch(
    archives: &[Utf8PathBuf],
    options: &ProcessOptions,
    reporter: &mut dyn Reporter,
) -> RunSummary {
    let mut summary = RunSummary::default();
    reporter.start(archives.len());

    for archive in archives {
        match process_file(archive, options, reporter) {
            Ok(outcome) => {
                debug!("processed {archive}: {outcome}");
                summary.record(outcome);
                reporter.processed(archive, outcome, &summary);
            }
            Err(err) => {
                debug!("failed processing {archive}: {err}");
                summary.record_failure();
                reporter.failed(archive, &err, &summary);
            }
        }
    }

    debug!("processed {} archives", summary.total());
    reporter.finish(&summary);

    summary
}

/// Makes sure `archive` has a front cover and repackages it.
/// The scratch directory is deleted whether processing succeeded or not.
///
/// ## Errors
///
/// Fails if the archive can't be extracted, its metadata can't be read or updated,
/// or the new archive can't be written
pub fn process_file(
    archive: &Utf8Path,
    options: &ProcessOptions,
    reporter: &mut dyn Reporter,
) -> Result<Outcome> {
    reporter.step(archive, Step::Extracting);
    let scratch = ScratchDir::create(archive, &options.scratch_root)?;

    let result = process_scratch(archive, &scratch, options, reporter);

    reporter.step(archive, Step::CleaningUp);
    let scratch_path = scratch.path().to_path_buf();
    if let Err(err) = scratch.cleanup() {
        warn!("couldn't delete {scratch_path}: {err}");
    }

    result
}

fn process_scratch(
    archive: &Utf8Path,
    scratch: &ScratchDir,
    options: &ProcessOptions,
    reporter: &mut dyn Reporter,
) -> Result<Outcome> {
    scratch.unpack(archive)?;

    reporter.step(archive, Step::CheckingMetadata);
    if !has_metadata(scratch.path())? {
        return Ok(Outcome::MissingMetadata);
    }

    let images = image_files(scratch.path())?;

    reporter.step(archive, Step::CheckingTitlePage);
    let outcome = if has_title_page(scratch.path())? {
        Outcome::TitlePageAlreadyPresent
    } else {
        reporter.step(archive, Step::SettingTitlePage);
        set_title_page(scratch.path(), &images)?;
        Outcome::TitlePageSet
    };

    reporter.step(archive, Step::Repackaging);
    let output_path = repackage(scratch, &options.output_dir, options.overwrite)?;
    debug!("repackaged {archive} to {output_path}");

    Ok(outcome)
}
