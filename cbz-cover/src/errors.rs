use std::io;

use camino::Utf8PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("explicit files can't be combined with --recursive, use a glob pattern instead")]
    RecursiveWithFiles,

    #[error("{0} is not a file")]
    NotAFile(Utf8PathBuf),

    #[error("several files are named {0} in the archive")]
    DuplicateEntry(String),

    #[error("IO error {0}")]
    IO(#[from] io::Error),

    #[error("Glob error: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Cbz error: {0}")]
    Cbz(#[from] cbz::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
