use std::{fs, io};

use camino::{Utf8Path, Utf8PathBuf};
use cbz::CbzReader;
use tracing::debug;

use crate::errors::{Error, Result};

/// Temporary directory an archive is unpacked into while it's being processed.
///
/// It is named after the archive (without its extension), so processing two archives
/// sharing the same name at the same time isn't supported.
#[derive(Debug)]
pub struct ScratchDir {
    name: String,
    path: Utf8PathBuf,
}

impl ScratchDir {
    /// Creates an empty scratch directory for `archive` under `root`,
    /// deleting the directory left there by a previous run
    ///
    /// ## Errors
    ///
    /// Fails if `archive` has no file name, if a file already uses the directory's name,
    /// or if the directory can't be created
    pub fn create(archive: &Utf8Path, root: &Utf8Path) -> Result<Self> {
        let Some(name) = archive.file_stem() else {
            return Err(Error::NotAFile(archive.to_path_buf()));
        };
        let path = root.join(name);

        if path.is_dir() {
            debug!("removing stale scratch directory {path}");
            fs::remove_dir_all(&path)?;
        } else if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{path} exists and is not a directory"),
            )
            .into());
        }
        fs::create_dir_all(&path)?;

        Ok(Self {
            name: name.to_string(),
            path,
        })
    }

    /// Unpacks the content of `archive` in the scratch directory
    ///
    /// ## Errors
    ///
    /// Fails if `archive` can't be read or isn't a valid zip file
    pub fn unpack(&self, archive: &Utf8Path) -> Result<()> {
        debug!("extracting {archive} to {}", self.path);
        CbzReader::from_path(archive)?.extract_to(&self.path)?;

        Ok(())
    }

    /// The archive name, without extension
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Deletes the scratch directory and everything it contains
    ///
    /// ## Errors
    ///
    /// Fails if the directory can't be removed
    pub fn cleanup(self) -> Result<()> {
        debug!("deleting {}", self.path);
        fs::remove_dir_all(&self.path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_replaces_previous_content() {
        let root = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(root.path()).unwrap();
        let stale = root.join("Series 01");
        fs::create_dir_all(stale.join("old")).unwrap();
        fs::write(stale.join("old/001.jpg"), b"old").unwrap();

        let scratch = ScratchDir::create(Utf8Path::new("some/dir/Series 01.cbz"), root).unwrap();

        assert_eq!(scratch.name(), "Series 01");
        assert_eq!(scratch.path(), stale.as_path());
        assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);

        scratch.cleanup().unwrap();
        assert!(!stale.exists());
    }

    #[test]
    fn test_create_keeps_file_with_same_name() {
        let root = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(root.path()).unwrap();
        let file = root.join("Series 01");
        fs::write(&file, b"unrelated").unwrap();

        let result = ScratchDir::create(Utf8Path::new("Series 01.cbz"), root);

        assert!(matches!(result, Err(Error::IO(_))));
        assert_eq!(fs::read(&file).unwrap(), b"unrelated");
    }

    #[test]
    fn test_name_strips_last_extension_only() {
        let root = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(root.path()).unwrap();

        let scratch = ScratchDir::create(Utf8Path::new("Vol.2.cbz"), root).unwrap();

        assert_eq!(scratch.name(), "Vol.2");
        scratch.cleanup().unwrap();
    }
}
