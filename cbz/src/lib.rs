#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::{
    fs::{self, File},
    io::{self, Cursor, Read, Seek, Write},
    ops::{Deref, DerefMut},
    result,
};

use camino::Utf8Path;
use tracing::debug;
use zip::{read::ZipFile, write::FileOptions, CompressionMethod, ZipArchive, ZipWriter};

pub use crate::comic_info::{page_index, ComicInfo, Page, COMIC_INFO_FILE_NAME};
pub use crate::errors::{Error, Result};

pub mod comic_info;
pub mod errors;

/// We artificially limit the amount of accepted files to 65535 files per Cbz
/// First as it'd be rather impractical for the user to read such enormous Cbz
/// Also, this size has been chosen as it was the limit of the very first zip spec
pub static MAX_FILE_NUMBER: usize = u16::MAX as usize;

/// Extensions of the files considered as pages
pub static IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "tiff"];

#[must_use]
pub fn is_image(path: impl AsRef<Utf8Path>) -> bool {
    path.as_ref()
        .extension()
        .is_some_and(|extension| IMAGE_EXTENSIONS.contains(&extension))
}

pub trait Cbz {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub trait CbzRead: Cbz {
    fn file_names(&self) -> Vec<&str>;

    /// Lookup the file by `name` in Cbz and returns a `CbzFile`
    ///
    /// ## Errors
    ///
    /// Fails if the file doesn't exist or can't be read
    fn read_by_name(&mut self, name: &str) -> Result<CbzFile<'_>>;

    /// Iterate over files present in the Cbz, sorted by name.
    /// If the closure returns an error, this error is returned immediately.
    ///
    /// ## Errors
    ///
    /// Returns an error immediately if the provided closure returns an error
    fn try_for_each<F, E>(&mut self, mut f: F) -> result::Result<(), E>
    where
        F: FnMut(Result<CbzFile<'_>>) -> result::Result<(), E>,
    {
        let mut file_names = self
            .file_names()
            .into_iter()
            .map(Into::into)
            .collect::<Vec<String>>();
        file_names.sort();

        for file_name in file_names {
            f(self.read_by_name(&file_name))?;
        }

        Ok(())
    }
}

pub trait CbzWrite {
    fn size(&self) -> usize;

    /// Inserts `bytes` under `filename`, deflate compressed
    ///
    /// ## Errors
    ///
    /// Same behavior as `insert_from_bytes_slice_with_options`
    fn insert(&mut self, filename: impl Into<String>, bytes: &[u8]) -> Result<()> {
        self.insert_from_bytes_slice_with_options(
            filename,
            bytes,
            FileOptions::default().compression_method(CompressionMethod::Deflated),
        )
    }

    /// Inserts the file located at `path`, the entry is named after the file name only
    ///
    /// ## Errors
    ///
    /// Fails if the file can't be read or if the insertion itself fails
    fn insert_from_path(&mut self, path: impl AsRef<Utf8Path>) -> Result<()> {
        let path = path.as_ref();
        let Some(filename) = path.file_name() else {
            return Err(Error::IO(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{path} has no file name"),
            )));
        };
        let bytes = fs::read(path)?;

        self.insert(filename, &bytes)
    }

    /// This is the method ultimately called to insert the bytes into the Cbz
    ///
    /// ## Errors
    ///
    /// This fails if the Cbz writer can't be written or if it's full (i.e. its size equals `MAX_FILE_NUMBER`)
    fn insert_from_bytes_slice_with_options(
        &mut self,
        filename: impl Into<String>,
        bytes: &[u8],
        file_options: FileOptions,
    ) -> Result<()>;
}

pub struct CbzFile<'a>(ZipFile<'a>);

impl<'a> CbzFile<'a> {
    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn size(&self) -> u64 {
        self.0.size()
    }

    /// Reads the whole file content
    ///
    /// ## Errors
    ///
    /// Fails if file size is too large to fit a `usize` on host machine
    /// or if the content can't be read
    pub fn to_vec(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(
            self.size()
                .try_into()
                .map_err(|_| Error::CbzFileSizeConversion)?,
        );

        self.0.read_to_end(&mut buf)?;

        Ok(buf)
    }
}

impl<'a> Read for CbzFile<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<'a> From<ZipFile<'a>> for CbzFile<'a> {
    fn from(zip_file: ZipFile<'a>) -> Self {
        Self(zip_file)
    }
}

#[derive(Debug)]
pub struct CbzReader<R> {
    archive: ZipArchive<R>,
}

impl<R> CbzReader<R> {
    pub fn new(archive: ZipArchive<R>) -> Self {
        Self { archive }
    }
}

impl<R> CbzReader<R>
where
    R: Read + Seek,
{
    /// Creates `CbzReader` from a `Read`
    ///
    /// ## Errors
    ///
    /// Fails if the underlying `ZipArchive` can't be created
    pub fn from_reader(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;

        Ok(Self::new(archive))
    }

    /// Unpacks every entry of the Cbz under `directory`, keeping the entries' relative paths.
    /// Entries whose path would escape `directory` are rejected.
    ///
    /// ## Errors
    ///
    /// Fails if an entry can't be decompressed or written
    pub fn extract_to(&mut self, directory: impl AsRef<Utf8Path>) -> Result<()> {
        let directory = directory.as_ref();
        debug!("extracting {} files to {directory}", self.len());
        self.archive.extract(directory)?;

        Ok(())
    }
}

impl CbzReader<File> {
    /// Creates `CbzReader` from a path
    ///
    /// ## Errors
    ///
    /// Fails if the file can't be opened or the underlying `ZipArchive` can't be created
    pub fn from_path(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;

        Self::from_reader(file)
    }
}

impl<'b> CbzReader<Cursor<&'b [u8]>> {
    /// Creates `CbzReader` from a bytes slice
    ///
    /// ## Errors
    ///
    /// Fails if the underlying `ZipArchive` can't be created
    pub fn from_bytes_slice(bytes: &'b [u8]) -> Result<Self> {
        let cursor = Cursor::new(bytes);

        Self::from_reader(cursor)
    }
}

impl<R> Cbz for CbzReader<R>
where
    R: Read + Seek,
{
    fn len(&self) -> usize {
        self.archive.len()
    }
}

impl<R> CbzRead for CbzReader<R>
where
    R: Read + Seek,
{
    fn file_names(&self) -> Vec<&str> {
        self.archive.file_names().collect()
    }

    fn read_by_name(&mut self, name: &str) -> Result<CbzFile<'_>> {
        let archive_file = self.archive.by_name(name)?;

        Ok(archive_file.into())
    }
}

impl<R> Deref for CbzReader<R> {
    type Target = ZipArchive<R>;

    fn deref(&self) -> &Self::Target {
        &self.archive
    }
}

impl<R> DerefMut for CbzReader<R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.archive
    }
}

pub struct CbzWriter<W: Write + Seek> {
    archive: ZipWriter<W>,
    size: usize,
}

impl<W> CbzWriter<W>
where
    W: Write + Seek,
{
    pub fn new(archive: ZipWriter<W>) -> Self {
        Self { archive, size: 0 }
    }

    /// Creates a `CbzWriter` from a `Write`
    fn from_writer(writer: W) -> Self {
        let archive = ZipWriter::new(writer);

        Self::new(archive)
    }

    /// Terminates the Cbz archiving, called on drop anyway but error can't be handled
    ///
    /// ## Errors
    ///
    /// Same errors as the underlying `ZipWriter::finish` method
    pub fn finish(&mut self) -> Result<CbzWriterFinished<W>> {
        let writer = self.archive.finish()?;

        Ok(CbzWriterFinished::new(writer))
    }
}

impl Default for CbzWriter<Cursor<Vec<u8>>> {
    fn default() -> Self {
        Self::from_writer(Cursor::new(Vec::new()))
    }
}

impl<W> Cbz for CbzWriter<W>
where
    W: Write + Seek,
{
    fn len(&self) -> usize {
        self.size
    }
}

impl<W> CbzWrite for CbzWriter<W>
where
    W: Write + Seek,
{
    fn size(&self) -> usize {
        self.size
    }

    fn insert_from_bytes_slice_with_options(
        &mut self,
        filename: impl Into<String>,
        bytes: &[u8],
        file_options: FileOptions,
    ) -> Result<()> {
        if self.size >= MAX_FILE_NUMBER {
            return Err(Error::CbzTooLarge(MAX_FILE_NUMBER));
        }

        self.archive.start_file(filename, file_options)?;

        self.archive.write_all(bytes)?;

        self.size += 1;

        Ok(())
    }
}

pub struct CbzWriterFinished<W> {
    writer: W,
}

impl<W> CbzWriterFinished<W> {
    fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<T: AsRef<[u8]>> AsRef<[u8]> for CbzWriterFinished<Cursor<T>> {
    fn as_ref(&self) -> &[u8] {
        self.writer.get_ref().as_ref()
    }
}

impl<W> Deref for CbzWriterFinished<W> {
    type Target = W;

    fn deref(&self) -> &Self::Target {
        &self.writer
    }
}

impl CbzWriterFinished<Cursor<Vec<u8>>> {
    /// Writes self into provided writer
    ///
    /// ## Errors
    ///
    /// Fails on write error
    pub fn write_to(self, mut writer: impl Write) -> Result<()> {
        writer.write_all(&self.writer.into_inner())?;

        Ok(())
    }

    /// Writes self into a File (that will be created) located under the provided path
    ///
    /// ## Errors
    ///
    /// Can fail on file creation or when writing the file content
    pub fn write_to_path(self, path: impl AsRef<Utf8Path>) -> Result<()> {
        let mut file = File::create(path.as_ref())?;

        self.write_to(&mut file)?;

        Ok(())
    }
}
