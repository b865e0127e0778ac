//! The four levels of the content tree.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::requests::{PagePayload, PageSummary};

pub const DEFAULT_SECTION_TITLE: &str = "Nova Seção";
pub const DEFAULT_DOCUMENT_TITLE: &str = "Novo Documento";
pub const DEFAULT_ANNEX_TITLE: &str = "Novo Anexo";

/// Top-level content page, identified by its slug on the public site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Assigned by the store, never changed by the editor
    #[serde(rename = "_id")]
    pub id: String,

    pub title: String,

    pub slug: String,

    #[serde(default)]
    pub sections: Vec<Arc<Section>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Page {
    /// Create a page with no sections (the shape returned by `createPage`)
    pub fn new(id: impl Into<String>, title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            slug: slug.into(),
            sections: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Dashboard listing entry for this page
    pub fn summary(&self) -> PageSummary {
        PageSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            slug: self.slug.clone(),
        }
    }

    /// Body sent on save: identity and timestamps stripped.
    ///
    /// Cheap: sections are shared, not copied.
    pub fn payload(&self) -> PagePayload {
        PagePayload {
            title: self.title.clone(),
            slug: self.slug.clone(),
            sections: self.sections.clone(),
        }
    }

    /// Replace the editable content of this page with `payload`,
    /// keeping id and timestamps.
    pub fn with_payload(&self, payload: PagePayload) -> Page {
        Page {
            id: self.id.clone(),
            title: payload.title,
            slug: payload.slug,
            sections: payload.sections,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Total number of documents across all sections
    pub fn document_count(&self) -> usize {
        self.sections.iter().map(|s| s.documents.len()).sum()
    }
}

/// Section kind tag.
///
/// Only `document-list` exists today. Unknown tags coming from the backend
/// are kept verbatim so a load/save round-trip never rewrites them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SectionKind {
    #[default]
    DocumentList,
    Other(String),
}

impl SectionKind {
    pub fn as_str(&self) -> &str {
        match self {
            SectionKind::DocumentList => "document-list",
            SectionKind::Other(tag) => tag,
        }
    }
}

impl From<String> for SectionKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "document-list" => SectionKind::DocumentList,
            _ => SectionKind::Other(tag),
        }
    }
}

impl From<&str> for SectionKind {
    fn from(tag: &str) -> Self {
        SectionKind::from(tag.to_string())
    }
}

impl From<SectionKind> for String {
    fn from(kind: SectionKind) -> Self {
        match kind {
            SectionKind::DocumentList => "document-list".to_string(),
            SectionKind::Other(tag) => tag,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named grouping of documents within a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub title: String,

    #[serde(rename = "type", default)]
    pub kind: SectionKind,

    #[serde(default)]
    pub documents: Vec<Arc<Document>>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            kind: SectionKind::DocumentList,
            documents: Vec::new(),
        }
    }

    /// Fresh section as created by the "add section" action
    pub fn blank() -> Self {
        Self::new(DEFAULT_SECTION_TITLE)
    }
}

/// Titled resource entry belonging to a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub title: String,

    #[serde(default)]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub annexes: Vec<Arc<Annex>>,
}

impl Document {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            url: url.into(),
            description: None,
            annexes: Vec::new(),
        }
    }

    pub fn blank() -> Self {
        Self {
            description: Some(String::new()),
            ..Self::new(DEFAULT_DOCUMENT_TITLE, "")
        }
    }
}

/// Attachment belonging to a document (leaf of the tree)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annex {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub title: String,

    #[serde(default)]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Annex {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            url: url.into(),
            description: None,
        }
    }

    pub fn blank() -> Self {
        Self {
            description: Some(String::new()),
            ..Self::new(DEFAULT_ANNEX_TITLE, "")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_wire_format() {
        let json = r##"{
            "_id": "p1",
            "title": "Editais",
            "slug": "editais",
            "sections": [
                {
                    "_id": "s1",
                    "title": "Editais UFSJ",
                    "type": "document-list",
                    "documents": [
                        { "title": "Edital 1", "url": "#", "annexes": [ { "title": "Anexo I", "url": "#" } ] }
                    ]
                }
            ],
            "createdAt": "2025-01-10T12:00:00Z"
        }"##;

        let page: Page = serde_json::from_str(json).unwrap();
        assert_eq!(page.id, "p1");
        assert_eq!(page.sections[0].kind, SectionKind::DocumentList);
        assert_eq!(page.sections[0].documents[0].id, None);
        assert_eq!(page.sections[0].documents[0].annexes[0].title, "Anexo I");
        assert!(page.created_at.is_some());
        assert!(page.updated_at.is_none());

        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["_id"], "p1");
        assert_eq!(value["sections"][0]["type"], "document-list");
        assert!(value.get("updatedAt").is_none());
        assert!(value["sections"][0]["documents"][0].get("_id").is_none());
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let json = r#"{ "_id": "p2", "title": "Contato", "slug": "contato" }"#;
        let page: Page = serde_json::from_str(json).unwrap();
        assert!(page.sections.is_empty());

        let section: Section = serde_json::from_str(r#"{ "title": "Legislação" }"#).unwrap();
        assert_eq!(section.kind, SectionKind::DocumentList);
        assert!(section.documents.is_empty());
    }

    #[test]
    fn test_unknown_section_kind_survives_round_trip() {
        let section: Section =
            serde_json::from_str(r#"{ "title": "Links", "type": "link-grid" }"#).unwrap();
        assert_eq!(section.kind, SectionKind::Other("link-grid".to_string()));

        let value = serde_json::to_value(&section).unwrap();
        assert_eq!(value["type"], "link-grid");
    }

    #[test]
    fn test_blank_nodes_have_no_identity() {
        let section = Section::blank();
        assert_eq!(section.title, DEFAULT_SECTION_TITLE);
        assert!(section.id.is_none());

        let document = Document::blank();
        assert_eq!(document.title, DEFAULT_DOCUMENT_TITLE);
        assert_eq!(document.description.as_deref(), Some(""));
        assert!(document.annexes.is_empty());

        let annex = Annex::blank();
        assert_eq!(annex.title, DEFAULT_ANNEX_TITLE);
        assert_eq!(annex.url, "");
    }

    #[test]
    fn test_payload_strips_identity() {
        let mut page = Page::new("p1", "Editais", "editais");
        page.created_at = Some(Utc::now());
        page.sections.push(Arc::new(Section::blank()));

        let payload = page.payload();
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("_id").is_none());
        assert!(value.get("createdAt").is_none());
        assert_eq!(value["sections"].as_array().unwrap().len(), 1);
        assert!(Arc::ptr_eq(&payload.sections[0], &page.sections[0]));
    }

    #[test]
    fn test_with_payload_keeps_identity() {
        let page = Page::new("p1", "Editais", "editais");
        let mut payload = page.payload();
        payload.title = "Editais 2025".to_string();

        let updated = page.with_payload(payload);
        assert_eq!(updated.id, "p1");
        assert_eq!(updated.title, "Editais 2025");
    }
}
