//! Document properties for generated workbooks.
//!
//! This module provides the property set written into the package's
//! `docProps` parts. All fields are optional; absent values fall back to
//! library defaults at serialization time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workbook document properties.
///
/// Collected by the workbook writer and emitted into the core and extended
/// property parts when the workbook is finalized.
///
/// # Examples
///
/// ```
/// use longan::common::DocumentProperties;
///
/// let props = DocumentProperties {
///     creator: Some("reporting-pipeline".to_string()),
///     title: Some("Q3 sales".to_string()),
///     ..Default::default()
/// };
/// assert!(props.has_data());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentProperties {
    /// Document title
    pub title: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Document author/creator
    pub creator: Option<String>,
    /// Keywords associated with the document
    pub keywords: Option<String>,
    /// Document description/comments
    pub description: Option<String>,
    /// Last person to modify the document
    pub last_modified_by: Option<String>,
    /// Document category
    pub category: Option<String>,
    /// Company/organization
    pub company: Option<String>,
    /// Application that created the document
    pub application: Option<String>,
    /// Creation timestamp; the time of writing when absent
    pub created: Option<DateTime<Utc>>,
    /// Last modification timestamp; the time of writing when absent
    pub modified: Option<DateTime<Utc>>,
}

impl DocumentProperties {
    /// Check if any property is populated.
    pub fn has_data(&self) -> bool {
        self.title.is_some()
            || self.subject.is_some()
            || self.creator.is_some()
            || self.keywords.is_some()
            || self.description.is_some()
            || self.last_modified_by.is_some()
            || self.category.is_some()
            || self.company.is_some()
            || self.application.is_some()
            || self.created.is_some()
            || self.modified.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_data() {
        assert!(!DocumentProperties::default().has_data());
    }

    #[test]
    fn test_populated_has_data() {
        let props = DocumentProperties {
            creator: Some("someone".to_string()),
            ..Default::default()
        };
        assert!(props.has_data());
    }
}
