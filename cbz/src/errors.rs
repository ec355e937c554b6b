use std::{io, result};

use zip::result::ZipError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error {0}")]
    IO(#[from] io::Error),

    #[error("Zip error {0}")]
    Zip(#[from] ZipError),

    #[error("Xml error {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Cbz file size couldn't be converted")]
    CbzFileSizeConversion,

    #[error("Cbz is too large, it can contain a maximum of {0} files")]
    CbzTooLarge(usize),

    #[error("ComicInfo is malformed: {0}")]
    MalformedComicInfo(String),

    #[error("ComicInfo root element not found")]
    MissingComicInfoRoot,

    #[error("ComicInfo page has an invalid image index {0:?}")]
    InvalidPageIndex(String),
}

pub type Result<T, E = Error> = result::Result<T, E>;
