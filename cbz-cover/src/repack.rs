use std::{collections::HashSet, fs};

use camino::{Utf8Path, Utf8PathBuf};
use cbz::{CbzWrite, CbzWriter};
use tracing::debug;

use crate::{
    errors::{Error, Result},
    locate::find_files,
    scratch::ScratchDir,
};

static FIXED_SUFFIX: &str = " (FIXED)";

/// Path of the repackaged archive, `<name> (FIXED).cbz` unless `overwrite` is set
#[must_use]
pub fn output_path(name: &str, output_dir: &Utf8Path, overwrite: bool) -> Utf8PathBuf {
    if overwrite {
        output_dir.join(format!("{name}.cbz"))
    } else {
        output_dir.join(format!("{name}{FIXED_SUFFIX}.cbz"))
    }
}

/// Packs every file of the scratch directory into a new cbz located in `output_dir`.
/// Subdirectories are flattened, entries are named after the files' names only.
///
/// ## Errors
///
/// Fails if a file can't be read, two files share the same name, or the archive can't be written
pub fn repackage(
    scratch: &ScratchDir,
    output_dir: &Utf8Path,
    overwrite: bool,
) -> Result<Utf8PathBuf> {
    let mut files = find_files(scratch.path(), "*", true)?;
    files.sort();

    let mut names = HashSet::new();
    let mut cbz_writer = CbzWriter::default();
    for file in &files {
        let name = file.file_name().unwrap_or_default();
        if !names.insert(name) {
            return Err(Error::DuplicateEntry(name.to_string()));
        }
        cbz_writer.insert_from_path(file)?;
        debug!("added {file}");
    }
    let cbz_writer_finished = cbz_writer.finish()?;

    fs::create_dir_all(output_dir)?;
    let path = output_path(scratch.name(), output_dir, overwrite);
    debug!("writing cbz file to {path}");
    cbz_writer_finished.write_to_path(&path)?;

    Ok(path)
}
