use std::{cmp::Ordering, fmt::Display, fs};

use camino::Utf8Path;
use quick_xml::{
    events::{BytesEnd, BytesStart, Event},
    Reader, Writer,
};
use tracing::debug;

use crate::{Error, Result};

/// Name of the metadata document stored at the root of a Cbz
pub static COMIC_INFO_FILE_NAME: &str = "ComicInfo.xml";

static ROOT_TAG: &[u8] = b"ComicInfo";
static PAGES_TAG: &[u8] = b"Pages";
static PAGE_TAG: &[u8] = b"Page";
static IMAGE_ATTRIBUTE: &[u8] = b"Image";
static TYPE_ATTRIBUTE: &[u8] = b"Type";
static FRONT_COVER: &str = "FrontCover";

/// A `Page` element as found in the `Pages` collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub image: Option<String>,
    pub kind: Option<String>,
}

impl Page {
    #[must_use]
    pub fn is_front_cover(&self) -> bool {
        self.kind.as_deref() == Some(FRONT_COVER)
    }
}

/// The `ComicInfo.xml` metadata document.
///
/// The document is kept as the flat list of xml events it was parsed from,
/// so everything that isn't edited is written back as it was read.
#[derive(Debug, Clone)]
pub struct ComicInfo {
    events: Vec<Event<'static>>,
}

impl ComicInfo {
    /// Parses a `ComicInfo` document from a string
    ///
    /// ## Errors
    ///
    /// Fails if the xml is malformed (mismatched or unclosed tags, no root element, several roots)
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml.trim_start_matches('\u{feff}'));
        let mut events = Vec::new();
        let mut depth = 0_usize;
        let mut has_root = false;

        loop {
            let event = reader.read_event()?;
            match &event {
                Event::Eof => break,
                Event::Start(_) | Event::Empty(_) if depth == 0 && has_root => {
                    return Err(Error::MalformedComicInfo(
                        "more than one root element".to_string(),
                    ));
                }
                Event::Start(_) => {
                    depth += 1;
                    has_root = true;
                }
                Event::Empty(_) if depth == 0 => has_root = true,
                Event::End(end) => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        Error::MalformedComicInfo(format!(
                            "unexpected closing tag {}",
                            String::from_utf8_lossy(end.name().as_ref())
                        ))
                    })?;
                }
                _ => {}
            }
            events.push(event.into_owned());
        }

        if depth != 0 {
            return Err(Error::MalformedComicInfo("unclosed element".to_string()));
        }
        if !has_root {
            return Err(Error::MalformedComicInfo("no root element".to_string()));
        }

        Ok(Self { events })
    }

    /// Reads and parses the document located at `path`
    ///
    /// ## Errors
    ///
    /// Fails if the file can't be read or isn't a valid document
    pub fn open(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let xml = fs::read_to_string(path.as_ref())?;

        Self::parse(&xml)
    }

    /// Serializes the document back to xml text
    ///
    /// ## Errors
    ///
    /// Fails if an event can't be written
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        for event in &self.events {
            writer.write_event(event)?;
        }

        String::from_utf8(writer.into_inner())
            .map_err(|err| Error::MalformedComicInfo(err.to_string()))
    }

    /// Writes the document to `path`, replacing any existing content
    ///
    /// ## Errors
    ///
    /// Fails if the document can't be serialized or the file can't be written
    pub fn save(&self, path: impl AsRef<Utf8Path>) -> Result<()> {
        fs::write(path.as_ref(), self.to_xml()?)?;

        Ok(())
    }

    /// All the `Page` elements of the document, in document order
    ///
    /// ## Errors
    ///
    /// Fails if an attribute can't be decoded
    pub fn pages(&self) -> Result<Vec<Page>> {
        self.page_elements()
            .map(|(_, element)| -> Result<Page> {
                Ok(Page {
                    image: attribute(element, IMAGE_ATTRIBUTE)?,
                    kind: attribute(element, TYPE_ATTRIBUTE)?,
                })
            })
            .collect()
    }

    /// ## Errors
    ///
    /// Fails if an attribute can't be decoded
    pub fn has_front_cover(&self) -> Result<bool> {
        Ok(self.pages()?.iter().any(Page::is_front_cover))
    }

    /// Marks a page as the front cover.
    ///
    /// When the document already lists its pages, the page with the lowest image index is used.
    /// Otherwise a `Pages` collection is built from `image_indices`, the first one being the cover.
    ///
    /// ## Errors
    ///
    /// Fails if an existing page index isn't an integer or if the `ComicInfo` element can't be found
    pub fn set_front_cover(&mut self, image_indices: &[String]) -> Result<()> {
        let Some(pages_position) = self.position_of(PAGES_TAG) else {
            debug!("no Pages node found, creating one");
            let root_position = self
                .position_of(ROOT_TAG)
                .ok_or(Error::MissingComicInfoRoot)?;
            return self.insert_children(root_position, pages_events(image_indices));
        };

        let mut indexed_pages = Vec::new();
        for (position, element) in self.page_elements() {
            let image = attribute(element, IMAGE_ATTRIBUTE)?.unwrap_or_default();
            let index =
                PageNumber::parse(&image).ok_or_else(|| Error::InvalidPageIndex(image.clone()))?;
            indexed_pages.push((position, index));
        }

        match indexed_pages.iter().min_by(|(_, a), (_, b)| a.cmp(b)) {
            Some((position, index)) => {
                let position = *position;
                debug!("setting page {index} as front cover");
                self.events[position] = match &self.events[position] {
                    Event::Start(element) => Event::Start(with_front_cover(element)?),
                    Event::Empty(element) => Event::Empty(with_front_cover(element)?),
                    other => other.clone(),
                };
                Ok(())
            }
            None => {
                debug!("Pages node is empty, filling it");
                self.insert_children(pages_position, page_events(image_indices))
            }
        }
    }

    fn page_elements(&self) -> impl Iterator<Item = (usize, &BytesStart<'static>)> {
        self.events
            .iter()
            .enumerate()
            .filter_map(|(position, event)| match event {
                Event::Start(element) | Event::Empty(element)
                    if element.name().as_ref() == PAGE_TAG =>
                {
                    Some((position, element))
                }
                _ => None,
            })
    }

    fn position_of(&self, tag: &[u8]) -> Option<usize> {
        self.events.iter().position(|event| match event {
            Event::Start(element) | Event::Empty(element) => element.name().as_ref() == tag,
            _ => false,
        })
    }

    /// Appends `children` as the last children of the element starting at `position`,
    /// expanding it first if it is an empty element
    fn insert_children(&mut self, position: usize, children: Vec<Event<'static>>) -> Result<()> {
        let empty = match &self.events[position] {
            Event::Empty(element) => Some(element.clone()),
            _ => None,
        };
        let end_position = if let Some(element) = empty {
            let end = element.to_end().into_owned();
            self.events[position] = Event::Start(element);
            self.events.insert(position + 1, Event::End(end));
            position + 1
        } else {
            self.matching_end(position)?
        };

        let tail = self.events.split_off(end_position);
        self.events.extend(children);
        self.events.extend(tail);

        Ok(())
    }

    fn matching_end(&self, start: usize) -> Result<usize> {
        let mut depth = 0_usize;
        for (position, event) in self.events.iter().enumerate().skip(start) {
            match event {
                Event::Start(_) => depth += 1,
                Event::End(_) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(position);
                    }
                }
                _ => {}
            }
        }

        Err(Error::MalformedComicInfo("unclosed element".to_string()))
    }
}

/// A page `Image` index, compared as an integer whatever its length
#[derive(Debug, PartialEq, Eq)]
struct PageNumber {
    negative: bool,
    /// Without leading zeros, empty for 0
    digits: String,
}

impl PageNumber {
    fn parse(image: &str) -> Option<Self> {
        let image = image.trim();
        let (negative, digits) = match image.strip_prefix('-') {
            Some(digits) => (true, digits),
            None => (false, image.strip_prefix('+').unwrap_or(image)),
        };
        if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }

        let digits = digits.trim_start_matches('0');
        Some(Self {
            negative: negative && !digits.is_empty(),
            digits: digits.to_string(),
        })
    }

    fn cmp_magnitude(&self, other: &Self) -> Ordering {
        self.digits
            .len()
            .cmp(&other.digits.len())
            .then_with(|| self.digits.cmp(&other.digits))
    }
}

impl Ord for PageNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.cmp_magnitude(other),
            (true, true) => other.cmp_magnitude(self),
        }
    }
}

impl Display for PageNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.negative, self.digits.is_empty()) {
            (_, true) => write!(f, "0"),
            (true, false) => write!(f, "-{}", self.digits),
            (false, false) => write!(f, "{}", self.digits),
        }
    }
}

impl PartialOrd for PageNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Derives a page index from an image file name: the stem without its leading zeros
///
/// `001.jpg` gives `1`, `000.jpg` gives `0`
#[must_use]
pub fn page_index(file_name: impl AsRef<Utf8Path>) -> String {
    let stem = file_name.as_ref().file_stem().unwrap_or_default();
    let index = stem.trim_start_matches('0');
    if index.is_empty() && !stem.is_empty() {
        "0".to_string()
    } else {
        index.to_string()
    }
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attribute in element.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        if attribute.key.as_ref() == key {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }

    Ok(None)
}

fn with_front_cover(element: &BytesStart<'_>) -> Result<BytesStart<'static>> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let mut updated = BytesStart::new(name);
    let mut replaced = false;

    for attribute in element.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        if attribute.key.as_ref() == TYPE_ATTRIBUTE {
            updated.push_attribute(("Type", FRONT_COVER));
            replaced = true;
        } else {
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value()?;
            updated.push_attribute((key.as_str(), value.as_ref()));
        }
    }
    if !replaced {
        updated.push_attribute(("Type", FRONT_COVER));
    }

    Ok(updated)
}

fn page_events(image_indices: &[String]) -> Vec<Event<'static>> {
    image_indices
        .iter()
        .enumerate()
        .map(|(i, index)| {
            let page = BytesStart::new("Page").with_attributes([("Image", index.as_str())]);
            if i == 0 {
                Event::Empty(page.with_attributes([("Type", FRONT_COVER)]).into_owned())
            } else {
                Event::Empty(page.into_owned())
            }
        })
        .collect()
}

fn pages_events(image_indices: &[String]) -> Vec<Event<'static>> {
    let mut events = vec![Event::Start(BytesStart::new("Pages"))];
    events.extend(page_events(image_indices));
    events.push(Event::End(BytesEnd::new("Pages")));
    events
}
