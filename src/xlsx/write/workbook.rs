//! Workbook assembly and finalization.
//!
//! The workbook owns the container, the style registry and the optional
//! shared string table. Sheets are written one at a time through
//! [`SheetWriter`]; the style table and the manifest parts are written only
//! at [`Workbook::finish`], because style identifiers keep being handed out
//! until the last row of the last sheet has streamed past.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use smallvec::SmallVec;

use crate::common::xml::escape_xml;
use crate::common::{DocumentProperties, Error, Result};
use crate::style::Style;
use crate::xlsx::container::Container;
use crate::xlsx::write::sheet::SheetWriter;
use crate::xlsx::write::strings::SharedStrings;
use crate::xlsx::write::styles::StyleRegistry;

/// Application name written when the caller does not set one.
const APPLICATION_NAME: &str = "Longan";

/// Longest sheet name the format accepts, in characters.
const MAX_SHEET_NAME_LEN: usize = 31;

const WORKSHEET_HEADER: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main""#,
    r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    "<sheetData>"
);

const ROOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
    r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>"#,
    "</Relationships>"
);

/// Options for creating a workbook.
#[derive(Debug, Clone, Default)]
pub struct WorkbookOptions {
    /// Intern cell text into `xl/sharedStrings.xml` instead of writing
    /// inline strings. Inline strings keep writing strictly single-pass;
    /// the shared table shrinks output when text repeats across rows.
    pub use_shared_strings: bool,
    /// Style for cells with neither their own nor a row style.
    pub default_style: Style,
    /// Properties written into the docProps parts.
    pub properties: DocumentProperties,
}

pub(crate) struct SheetInfo {
    pub(crate) name: String,
}

/// Streaming workbook writer.
///
/// # Example
///
/// ```rust,no_run
/// use longan::sheet::Row;
/// use longan::xlsx::Workbook;
///
/// let mut workbook = Workbook::create("report.xlsx")?;
/// let mut sheet = workbook.new_sheet("Sheet1")?;
/// sheet.write_row(Row::from_values(["region", "units"]))?;
/// sheet.write_row(Row::from_values(["north", "1204"]))?;
/// sheet.finish()?;
/// workbook.finish()?;
/// # Ok::<(), longan::Error>(())
/// ```
pub struct Workbook<W: Write + Seek> {
    pub(crate) container: Container<W>,
    pub(crate) registry: StyleRegistry,
    pub(crate) shared: Option<SharedStrings>,
    pub(crate) default_style: Style,
    properties: DocumentProperties,
    pub(crate) sheets: SmallVec<[SheetInfo; 4]>,
    /// Index of the sheet whose part is currently open
    pub(crate) open_sheet: Option<usize>,
}

impl Workbook<BufWriter<File>> {
    /// Create a workbook writing to a new file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write + Seek> Workbook<W> {
    /// Create a workbook writing to `writer` with default options.
    pub fn new(writer: W) -> Result<Self> {
        Self::new_with_options(writer, WorkbookOptions::default())
    }

    /// Create a workbook with explicit options.
    ///
    /// The default style is validated and registered as identifier 0 here;
    /// an invalid default is rejected before anything is written.
    pub fn new_with_options(writer: W, options: WorkbookOptions) -> Result<Self> {
        let registry = StyleRegistry::new(options.default_style.clone())?;
        Ok(Self {
            container: Container::new(writer),
            registry,
            shared: options.use_shared_strings.then(SharedStrings::new),
            default_style: options.default_style,
            properties: options.properties,
            sheets: SmallVec::new(),
            open_sheet: None,
        })
    }

    /// Number of sheets created so far.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Open a new sheet and return its writer.
    ///
    /// The returned writer borrows the workbook, so the previous sheet must
    /// be out of scope before the next one opens; a sheet that went out of
    /// scope without [`SheetWriter::finish`] is detected here and reported
    /// as [`Error::SheetStillOpen`].
    pub fn new_sheet(&mut self, name: impl Into<String>) -> Result<SheetWriter<'_, W>> {
        let name = name.into();
        if let Some(open) = self.open_sheet {
            return Err(Error::SheetStillOpen(self.sheets[open].name.clone()));
        }
        validate_sheet_name(&name)?;
        // Names differing only in case collide, as spreadsheet applications
        // treat them as the same sheet.
        let lowered = name.to_lowercase();
        if self
            .sheets
            .iter()
            .any(|sheet| sheet.name.to_lowercase() == lowered)
        {
            return Err(Error::DuplicateSheetName(name));
        }

        let index = self.sheets.len();
        let part = format!("xl/worksheets/sheet{}.xml", index + 1);
        self.container.begin_part(&part)?;
        self.container.write(WORKSHEET_HEADER.as_bytes())?;

        self.sheets.push(SheetInfo { name });
        self.open_sheet = Some(index);
        Ok(SheetWriter::new(self, index))
    }

    /// Finalize the workbook and return the inner writer.
    ///
    /// Writes the shared string table (when enabled and non-empty), the
    /// style table, the document properties and the manifest parts, then
    /// seals the container. Consumes the workbook; there is no way to open
    /// a sheet afterwards.
    pub fn finish(mut self) -> Result<W> {
        if let Some(open) = self.open_sheet {
            return Err(Error::SheetStillOpen(self.sheets[open].name.clone()));
        }

        // A workbook with no sheets is not a valid document; give it one.
        if self.sheets.is_empty() {
            let mut sheet = self.new_sheet("Sheet1")?;
            sheet.finish()?;
        }

        let has_shared = self
            .shared
            .as_ref()
            .is_some_and(|shared| !shared.is_empty());
        if has_shared {
            // `has_shared` guarantees the table exists.
            if let Some(shared) = &self.shared {
                let table = shared.write_table()?;
                self.container
                    .write_part("xl/sharedStrings.xml", table.as_bytes())?;
            }
        }

        let stylesheet = self.registry.write_stylesheet()?;
        self.container
            .write_part("xl/styles.xml", stylesheet.as_bytes())?;

        let app = self.app_properties_xml()?;
        self.container.write_part("docProps/app.xml", app.as_bytes())?;
        let core = self.core_properties_xml();
        self.container
            .write_part("docProps/core.xml", core.as_bytes())?;

        let workbook = self.workbook_xml()?;
        self.container
            .write_part("xl/workbook.xml", workbook.as_bytes())?;
        let rels = self.workbook_rels_xml(has_shared)?;
        self.container
            .write_part("xl/_rels/workbook.xml.rels", rels.as_bytes())?;
        self.container.write_part("_rels/.rels", ROOT_RELS.as_bytes())?;
        let types = self.content_types_xml(has_shared)?;
        self.container
            .write_part("[Content_Types].xml", types.as_bytes())?;

        let mut writer = self.container.seal()?;
        writer.flush()?;
        Ok(writer)
    }

    fn workbook_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(512);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );
        xml.push_str("<sheets>");
        for (i, sheet) in self.sheets.iter().enumerate() {
            write!(
                xml,
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape_xml(&sheet.name),
                i + 1,
                i + 1
            )?;
        }
        xml.push_str("</sheets></workbook>");
        Ok(xml)
    }

    fn workbook_rels_xml(&self, has_shared: bool) -> Result<String> {
        let mut xml = String::with_capacity(512);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for i in 0..self.sheets.len() {
            write!(
                xml,
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            )?;
        }
        let styles_id = self.sheets.len() + 1;
        write!(
            xml,
            r#"<Relationship Id="rId{styles_id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#
        )?;
        if has_shared {
            write!(
                xml,
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
                styles_id + 1
            )?;
        }
        xml.push_str("</Relationships>");
        Ok(xml)
    }

    fn content_types_xml(&self, has_shared: bool) -> Result<String> {
        let mut xml = String::with_capacity(768);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        xml.push_str(
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        );
        xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
        xml.push_str(
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
        );
        for i in 0..self.sheets.len() {
            write!(
                xml,
                r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            )?;
        }
        xml.push_str(
            r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        );
        if has_shared {
            xml.push_str(
                r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
            );
        }
        xml.push_str(
            r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
        );
        xml.push_str(
            r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
        );
        xml.push_str("</Types>");
        Ok(xml)
    }

    fn app_properties_xml(&self) -> Result<String> {
        let sheet_count = self.sheets.len();
        let mut sheet_names = String::new();
        for sheet in &self.sheets {
            write!(sheet_names, "<vt:lpstr>{}</vt:lpstr>", escape_xml(&sheet.name))?;
        }
        let application = self
            .properties
            .application
            .as_deref()
            .unwrap_or(APPLICATION_NAME);
        let company = self.properties.company.as_deref().unwrap_or_default();

        Ok(xml_minifier::minified_xml_format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
            <Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"
                xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
                <Application>{}</Application>
                <DocSecurity>0</DocSecurity>
                <ScaleCrop>false</ScaleCrop>
                <HeadingPairs>
                    <vt:vector size="2" baseType="variant">
                        <vt:variant>
                            <vt:lpstr>Worksheets</vt:lpstr>
                        </vt:variant>
                        <vt:variant>
                            <vt:i4>{}</vt:i4>
                        </vt:variant>
                    </vt:vector>
                </HeadingPairs>
                <TitlesOfParts>
                    <vt:vector size="{}" baseType="lpstr">{}</vt:vector>
                </TitlesOfParts>
                <Company>{}</Company>
                <LinksUpToDate>false</LinksUpToDate>
                <SharedDoc>false</SharedDoc>
                <HyperlinksChanged>false</HyperlinksChanged>
                <AppVersion>1.0000</AppVersion>
            </Properties>"#,
            escape_xml(application),
            sheet_count,
            sheet_count,
            sheet_names,
            escape_xml(company)
        ))
    }

    fn core_properties_xml(&self) -> String {
        let now = Utc::now();
        let created = w3cdtf(self.properties.created.unwrap_or(now));
        let modified = w3cdtf(self.properties.modified.unwrap_or(now));
        let creator = self.properties.creator.as_deref().unwrap_or(APPLICATION_NAME);
        let last_modified_by = self
            .properties
            .last_modified_by
            .as_deref()
            .unwrap_or(creator);

        xml_minifier::minified_xml_format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
                <cp:coreProperties
                    xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties"
                    xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/"
                    xmlns:dcmitype="http://purl.org/dc/dcmitype/"
                    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
                    <dc:title>{}</dc:title>
                    <dc:subject>{}</dc:subject>
                    <dc:creator>{}</dc:creator>
                    <cp:keywords>{}</cp:keywords>
                    <dc:description>{}</dc:description>
                    <cp:lastModifiedBy>{}</cp:lastModifiedBy>
                    <cp:category>{}</cp:category>
                    <dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>
                    <dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>
                </cp:coreProperties>"#,
            escape_xml(self.properties.title.as_deref().unwrap_or_default()),
            escape_xml(self.properties.subject.as_deref().unwrap_or_default()),
            escape_xml(creator),
            escape_xml(self.properties.keywords.as_deref().unwrap_or_default()),
            escape_xml(self.properties.description.as_deref().unwrap_or_default()),
            escape_xml(last_modified_by),
            escape_xml(self.properties.category.as_deref().unwrap_or_default()),
            created,
            modified
        )
    }
}

/// Format a timestamp the way the core properties schema expects.
fn w3cdtf(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Check a sheet name against the format's naming rules.
pub(crate) fn validate_sheet_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidSheetName {
            name: name.to_string(),
            reason: "name must not be empty",
        });
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(Error::InvalidSheetName {
            name: name.to_string(),
            reason: "name must not exceed 31 characters",
        });
    }
    if name
        .chars()
        .any(|c| matches!(c, '\\' | '/' | '?' | '*' | ':' | '[' | ']'))
    {
        return Err(Error::InvalidSheetName {
            name: name.to_string(),
            reason: "name must not contain \\ / ? * : [ ]",
        });
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(Error::InvalidSheetName {
            name: name.to_string(),
            reason: "name must not start or end with an apostrophe",
        });
    }
    Ok(())
}
