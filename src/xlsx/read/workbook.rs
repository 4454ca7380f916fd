//! Workbook opening and sheet enumeration.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::common::xml::unescape_xml;
use crate::common::{Error, Result};

use super::shared_strings::parse_shared_strings;
use super::sheet::RowIter;
use super::styles::parse_date_styles;

/// A sheet listed in the workbook part, resolved to its archive member.
struct SheetEntry {
    name: String,
    part: String,
}

/// Reader over an existing XLSX document.
///
/// Opening parses the workbook part, its relationships, the shared string
/// table and the style table up front; worksheet parts are only touched
/// when their rows are requested. Shared strings and styles are optional
/// in the package, so their absence is not an error.
///
/// ```no_run
/// use longan::xlsx::WorkbookReader;
///
/// # fn main() -> longan::Result<()> {
/// let mut reader = WorkbookReader::open("report.xlsx")?;
/// for row in reader.sheet_rows("Sheet1")? {
///     let row = row?;
///     println!("{} cells", row.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct WorkbookReader<R: Read + Seek> {
    archive: ZipArchive<R>,
    sheets: Vec<SheetEntry>,
    shared: Vec<String>,
    date_styles: Vec<bool>,
}

impl WorkbookReader<BufReader<File>> {
    /// Open a document from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl WorkbookReader<Cursor<Vec<u8>>> {
    /// Open a document held in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::new(Cursor::new(bytes))
    }
}

impl<R: Read + Seek> WorkbookReader<R> {
    /// Open a document from any seekable reader.
    pub fn new(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;

        let workbook_xml = read_part(&mut archive, "xl/workbook.xml")?;
        let rels_xml = read_part(&mut archive, "xl/_rels/workbook.xml.rels")?;
        let targets = parse_relationships(rels_xml)?;
        // Sheets whose relationship is missing from the rels part cannot be
        // located in the archive; they are skipped rather than failing the
        // whole open.
        let sheets = parse_workbook_sheets(workbook_xml)?
            .into_iter()
            .filter_map(|(name, rid)| {
                targets.get(&rid).map(|target| SheetEntry {
                    name,
                    part: resolve_part_path(target),
                })
            })
            .collect();

        let shared = match read_part(&mut archive, "xl/sharedStrings.xml") {
            Ok(xml) => parse_shared_strings(xml)?,
            Err(Error::PartNotFound(_)) => Vec::new(),
            Err(err) => return Err(err),
        };
        let date_styles = match read_part(&mut archive, "xl/styles.xml") {
            Ok(xml) => parse_date_styles(xml)?,
            Err(Error::PartNotFound(_)) => Vec::new(),
            Err(err) => return Err(err),
        };

        Ok(Self {
            archive,
            sheets,
            shared,
            date_styles,
        })
    }

    /// Names of the sheets, in workbook order.
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str())
    }

    /// Number of sheets in the workbook.
    #[inline]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Iterate the rows of the named sheet.
    ///
    /// The sheet part is read from the archive whole; rows are decoded
    /// lazily as the iterator advances.
    pub fn sheet_rows(&mut self, name: &str) -> Result<RowIter<'_>> {
        let part = match self.sheets.iter().find(|sheet| sheet.name == name) {
            Some(entry) => entry.part.clone(),
            None => return Err(Error::SheetNotFound(name.to_string())),
        };
        let content = read_part(&mut self.archive, &part)?;
        Ok(RowIter::new(content, &self.shared, &self.date_styles))
    }
}

/// Read a named archive member into a string.
fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Err(Error::PartNotFound(name.to_string())),
        Err(err) => return Err(err.into()),
    };
    let mut content = String::with_capacity(file.size() as usize);
    file.read_to_string(&mut content)?;
    Ok(content)
}

/// Extract `(name, relationship id)` pairs from `xl/workbook.xml`.
fn parse_workbook_sheets(xml: String) -> Result<Vec<(String, String)>> {
    let mut reader = Reader::from_reader(Cursor::new(xml.into_bytes()));
    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"sheet" => {
                let mut name = None;
                let mut rid = None;
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"name" => {
                            let raw = std::str::from_utf8(&attr.value).unwrap_or_default();
                            name = Some(unescape_xml(raw).into_owned());
                        },
                        b"r:id" => {
                            rid = Some(String::from_utf8_lossy(&attr.value).into_owned());
                        },
                        _ => {},
                    }
                }
                if let (Some(name), Some(rid)) = (name, rid) {
                    sheets.push((name, rid));
                }
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }
    Ok(sheets)
}

/// Extract worksheet relationship targets from `xl/_rels/workbook.xml.rels`.
fn parse_relationships(xml: String) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_reader(Cursor::new(xml.into_bytes()));
    let mut buf = Vec::new();
    let mut targets = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                let mut is_worksheet = false;
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"Id" => id = Some(String::from_utf8_lossy(&attr.value).into_owned()),
                        b"Target" => {
                            let raw = std::str::from_utf8(&attr.value).unwrap_or_default();
                            target = Some(unescape_xml(raw).into_owned());
                        },
                        b"Type" => {
                            is_worksheet = attr.value.as_ref().ends_with(b"/worksheet");
                        },
                        _ => {},
                    }
                }
                if is_worksheet {
                    if let (Some(id), Some(target)) = (id, target) {
                        targets.insert(id, target);
                    }
                }
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }
    Ok(targets)
}

/// Resolve a relationship target to an archive member path.
///
/// Targets are relative to `xl/` unless they start with `/`, which makes
/// them package-absolute.
fn resolve_part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    }
}
