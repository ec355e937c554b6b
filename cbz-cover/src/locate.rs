use camino::{Utf8Path, Utf8PathBuf};
use glob::{glob, Pattern};
use tracing::{debug, error};

use crate::errors::{Error, Result};

static CBZ_PATTERN: &str = "*.cbz";

/// Resolves the archives to process.
///
/// - no argument: every `.cbz` found in `base_dir`
/// - a single argument containing a wildcard: the files of `base_dir` matching this pattern
/// - otherwise: the arguments themselves, which must be existing files
///
/// `recursive` extends the search to the subdirectories of `base_dir`.
///
/// ## Errors
///
/// Fails if explicit files are combined with `recursive`, if an explicit file doesn't exist,
/// or if the pattern is invalid
pub fn locate(
    args: &[String],
    base_dir: impl AsRef<Utf8Path>,
    recursive: bool,
) -> Result<Vec<Utf8PathBuf>> {
    let base_dir = base_dir.as_ref();

    match args {
        [] => find_files(base_dir, CBZ_PATTERN, recursive),
        [pattern] if is_pattern(pattern) => find_files(base_dir, pattern, recursive),
        files => {
            if recursive {
                return Err(Error::RecursiveWithFiles);
            }

            files
                .iter()
                .map(|file| {
                    let path = Utf8PathBuf::from(file);
                    if path.is_file() {
                        Ok(path)
                    } else {
                        Err(Error::NotAFile(path))
                    }
                })
                .collect()
        }
    }
}

/// Lists the regular files of `dir` matching `pattern`, in subdirectories too if `recursive` is set
///
/// ## Errors
///
/// Fails if the pattern is invalid or a matched path can't be read
pub fn find_files(dir: &Utf8Path, pattern: &str, recursive: bool) -> Result<Vec<Utf8PathBuf>> {
    let glob_expr = if Utf8Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else if recursive {
        format!("{}/**/{pattern}", Pattern::escape(dir.as_str()))
    } else {
        format!("{}/{pattern}", Pattern::escape(dir.as_str()))
    };
    debug!("searching files matching {glob_expr}");

    let mut files = Vec::new();
    for path in glob(&glob_expr)? {
        let path = path?;
        let Some(path) = Utf8Path::from_path(&path) else {
            error!("{path:?} is not a valid utf-8 path");
            continue;
        };
        if path.is_file() {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

fn is_pattern(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pattern() {
        assert!(is_pattern("*.cbz"));
        assert!(is_pattern("Series 0?.cbz"));
        assert!(is_pattern("[ab].cbz"));
        assert!(!is_pattern("Series 01.cbz"));
    }

    #[test]
    fn test_recursive_with_explicit_files_is_rejected() {
        let err = locate(&["Series 01.cbz".to_string()], ".", true).unwrap_err();

        assert!(matches!(err, Error::RecursiveWithFiles));
    }

    #[test]
    fn test_missing_explicit_file_is_rejected() {
        let err = locate(&["/nonexistent/archive.cbz".to_string()], ".", false).unwrap_err();

        assert!(matches!(err, Error::NotAFile(path) if path == "/nonexistent/archive.cbz"));
    }
}
