use camino::{Utf8Path, Utf8PathBuf};
use cbz::{is_image, page_index, ComicInfo, COMIC_INFO_FILE_NAME};
use tracing::debug;

use crate::{errors::Result, locate::find_files};

#[must_use]
pub fn comic_info_path(dir: &Utf8Path) -> Utf8PathBuf {
    dir.join(COMIC_INFO_FILE_NAME)
}

/// Whether a `ComicInfo.xml` file exists anywhere under `dir`
///
/// ## Errors
///
/// Fails if `dir` can't be searched
pub fn has_metadata(dir: &Utf8Path) -> Result<bool> {
    let found = !find_files(dir, COMIC_INFO_FILE_NAME, true)?.is_empty();
    debug!("ComicInfo.xml found in {dir}: {found}");

    Ok(found)
}

/// Whether the `ComicInfo.xml` at the root of `dir` already designates a front cover
///
/// ## Errors
///
/// Fails if the document is missing or malformed
pub fn has_title_page(dir: &Utf8Path) -> Result<bool> {
    let has_front_cover = ComicInfo::open(comic_info_path(dir))?.has_front_cover()?;
    debug!("front cover found in {dir}: {has_front_cover}");

    Ok(has_front_cover)
}

/// All the images under `dir`, sorted by file name
///
/// ## Errors
///
/// Fails if `dir` can't be searched
pub fn image_files(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let mut images = find_files(dir, "*", true)?
        .into_iter()
        .filter(|path| is_image(path))
        .collect::<Vec<_>>();
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!("found {} images in {dir}", images.len());

    Ok(images)
}

/// Designates a front cover in the `ComicInfo.xml` at the root of `dir` and saves it in place
///
/// ## Errors
///
/// Fails if the document can't be read, updated, or written back
pub fn set_title_page(dir: &Utf8Path, image_files: &[Utf8PathBuf]) -> Result<()> {
    let path = comic_info_path(dir);
    let mut comic_info = ComicInfo::open(&path)?;

    let image_indices = image_files
        .iter()
        .map(|image| page_index(image))
        .collect::<Vec<_>>();
    comic_info.set_front_cover(&image_indices)?;
    comic_info.save(&path)?;
    debug!("saved updated {path}");

    Ok(())
}
