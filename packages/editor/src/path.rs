//! # Tree Paths
//!
//! Typed addresses into the page tree. Each variant can only describe a
//! location that exists in the four-level schema, so a well-typed path is
//! never structurally malformed; it can at most point past the end of a list.
//!
//! The untyped form used by form inputs (`["sections", 0, "title"]` or
//! `sections.0.title`) is accepted through [`Segment`] and converted with
//! the `from_segments` constructors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kinds of node in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Page,
    Section,
    Document,
    Annex,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Page => "page",
            NodeKind::Section => "section",
            NodeKind::Document => "document",
            NodeKind::Annex => "annex",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageField {
    Title,
    Slug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionField {
    Title,
    /// Serialized as `type` on the wire
    Kind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentField {
    Title,
    Url,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnnexField {
    Title,
    Url,
    Description,
}

impl PageField {
    pub fn key(self) -> &'static str {
        match self {
            PageField::Title => "title",
            PageField::Slug => "slug",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "title" => Some(PageField::Title),
            "slug" => Some(PageField::Slug),
            _ => None,
        }
    }
}

impl SectionField {
    pub fn key(self) -> &'static str {
        match self {
            SectionField::Title => "title",
            SectionField::Kind => "type",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "title" => Some(SectionField::Title),
            "type" | "kind" => Some(SectionField::Kind),
            _ => None,
        }
    }
}

impl DocumentField {
    pub fn key(self) -> &'static str {
        match self {
            DocumentField::Title => "title",
            DocumentField::Url => "url",
            DocumentField::Description => "description",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "title" => Some(DocumentField::Title),
            "url" => Some(DocumentField::Url),
            "description" => Some(DocumentField::Description),
            _ => None,
        }
    }
}

impl AnnexField {
    pub fn key(self) -> &'static str {
        match self {
            AnnexField::Title => "title",
            AnnexField::Url => "url",
            AnnexField::Description => "description",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "title" => Some(AnnexField::Title),
            "url" => Some(AnnexField::Url),
            "description" => Some(AnnexField::Description),
            _ => None,
        }
    }
}

/// Address of a node (used for reads)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "camelCase")]
pub enum NodePath {
    Page,
    Section {
        section: usize,
    },
    Document {
        section: usize,
        document: usize,
    },
    Annex {
        section: usize,
        document: usize,
        annex: usize,
    },
}

impl NodePath {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodePath::Page => NodeKind::Page,
            NodePath::Section { .. } => NodeKind::Section,
            NodePath::Document { .. } => NodeKind::Document,
            NodePath::Annex { .. } => NodeKind::Annex,
        }
    }

    /// Position of this node inside its parent list. `None` for the page.
    pub fn as_item(&self) -> Option<ItemPath> {
        match *self {
            NodePath::Page => None,
            NodePath::Section { section } => Some(ListPath::Sections.item(section)),
            NodePath::Document { section, document } => {
                Some(ListPath::Documents { section }.item(document))
            }
            NodePath::Annex {
                section,
                document,
                annex,
            } => Some(ListPath::Annexes { section, document }.item(annex)),
        }
    }

    pub fn from_segments(segments: &[Segment]) -> Result<Self, PathError> {
        match walk(segments)? {
            Walk::Node(node) => Ok(node),
            Walk::List(_) | Walk::Field(..) => Err(PathError::NotANode(render(segments))),
        }
    }
}

/// Address of a scalar field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "camelCase")]
pub enum FieldPath {
    Page {
        field: PageField,
    },
    Section {
        section: usize,
        field: SectionField,
    },
    Document {
        section: usize,
        document: usize,
        field: DocumentField,
    },
    Annex {
        section: usize,
        document: usize,
        annex: usize,
        field: AnnexField,
    },
}

impl FieldPath {
    /// The node that owns this field
    pub fn node(&self) -> NodePath {
        match *self {
            FieldPath::Page { .. } => NodePath::Page,
            FieldPath::Section { section, .. } => NodePath::Section { section },
            FieldPath::Document {
                section, document, ..
            } => NodePath::Document { section, document },
            FieldPath::Annex {
                section,
                document,
                annex,
                ..
            } => NodePath::Annex {
                section,
                document,
                annex,
            },
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            FieldPath::Page { field } => field.key(),
            FieldPath::Section { field, .. } => field.key(),
            FieldPath::Document { field, .. } => field.key(),
            FieldPath::Annex { field, .. } => field.key(),
        }
    }

    /// Whether the field may hold no value at all
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            FieldPath::Document {
                field: DocumentField::Description,
                ..
            } | FieldPath::Annex {
                field: AnnexField::Description,
                ..
            }
        )
    }

    pub fn from_segments(segments: &[Segment]) -> Result<Self, PathError> {
        let (node, key) = match walk(segments)? {
            Walk::Field(node, key) => (node, key),
            Walk::Node(_) | Walk::List(_) => return Err(PathError::NotAField(render(segments))),
        };
        let unknown = || PathError::UnknownField {
            kind: node.kind(),
            field: key.to_string(),
        };

        let path = match node {
            NodePath::Page => FieldPath::Page {
                field: PageField::from_key(key).ok_or_else(unknown)?,
            },
            NodePath::Section { section } => FieldPath::Section {
                section,
                field: SectionField::from_key(key).ok_or_else(unknown)?,
            },
            NodePath::Document { section, document } => FieldPath::Document {
                section,
                document,
                field: DocumentField::from_key(key).ok_or_else(unknown)?,
            },
            NodePath::Annex {
                section,
                document,
                annex,
            } => FieldPath::Annex {
                section,
                document,
                annex,
                field: AnnexField::from_key(key).ok_or_else(unknown)?,
            },
        };
        Ok(path)
    }
}

/// Address of one of the child lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "list", rename_all = "camelCase")]
pub enum ListPath {
    Sections,
    Documents { section: usize },
    Annexes { section: usize, document: usize },
}

impl ListPath {
    pub fn item(self, index: usize) -> ItemPath {
        ItemPath { list: self, index }
    }

    /// Kind of the elements stored in this list
    pub fn child_kind(&self) -> NodeKind {
        match self {
            ListPath::Sections => NodeKind::Section,
            ListPath::Documents { .. } => NodeKind::Document,
            ListPath::Annexes { .. } => NodeKind::Annex,
        }
    }

    /// The node owning this list
    pub fn owner(&self) -> NodePath {
        match *self {
            ListPath::Sections => NodePath::Page,
            ListPath::Documents { section } => NodePath::Section { section },
            ListPath::Annexes { section, document } => NodePath::Document { section, document },
        }
    }

    pub fn from_segments(segments: &[Segment]) -> Result<Self, PathError> {
        match walk(segments)? {
            Walk::List(list) => Ok(list),
            Walk::Node(_) | Walk::Field(..) => Err(PathError::NotAList(render(segments))),
        }
    }
}

/// Address of one element of a child list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemPath {
    #[serde(flatten)]
    pub list: ListPath,
    pub index: usize,
}

impl ItemPath {
    /// Title field of the addressed node; every list element has one
    pub fn title(&self) -> FieldPath {
        match self.list {
            ListPath::Sections => FieldPath::Section {
                section: self.index,
                field: SectionField::Title,
            },
            ListPath::Documents { section } => FieldPath::Document {
                section,
                document: self.index,
                field: DocumentField::Title,
            },
            ListPath::Annexes { section, document } => FieldPath::Annex {
                section,
                document,
                annex: self.index,
                field: AnnexField::Title,
            },
        }
    }

    pub fn node(&self) -> NodePath {
        match self.list {
            ListPath::Sections => NodePath::Section {
                section: self.index,
            },
            ListPath::Documents { section } => NodePath::Document {
                section,
                document: self.index,
            },
            ListPath::Annexes { section, document } => NodePath::Annex {
                section,
                document,
                annex: self.index,
            },
        }
    }

    pub fn from_segments(segments: &[Segment]) -> Result<Self, PathError> {
        match walk(segments)? {
            Walk::Node(node) => node
                .as_item()
                .ok_or_else(|| PathError::NotAnItem(render(segments))),
            Walk::List(_) | Walk::Field(..) => Err(PathError::NotAnItem(render(segments))),
        }
    }
}

/// One step of an untyped path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    Index(usize),
    Key(String),
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Index(index) => write!(f, "{}", index),
            Segment::Key(key) => f.write_str(key),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Path is empty")]
    Empty,

    #[error("Invalid path segment: {0:?}")]
    InvalidSegment(String),

    #[error("Unexpected index {index} after {after:?}")]
    UnexpectedIndex { index: usize, after: String },

    #[error("Expected an index after {list:?}, found {found:?}")]
    ExpectedIndex { list: String, found: String },

    #[error("Unknown {kind} field: {field:?}")]
    UnknownField { kind: NodeKind, field: String },

    #[error("Unexpected segments after field {field:?}")]
    TrailingSegments { field: String },

    #[error("Path {0:?} does not address a field")]
    NotAField(String),

    #[error("Path {0:?} does not address a list")]
    NotAList(String),

    #[error("Path {0:?} does not address a list element")]
    NotAnItem(String),

    #[error("Path {0:?} does not address a node")]
    NotANode(String),
}

/// Split a dotted path (`sections.0.documents[1].title`) into segments
pub fn parse_segments(path: &str) -> Result<Vec<Segment>, PathError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let mut segments = Vec::new();
    for part in path.split('.') {
        let (head, mut rest) = match part.find('[') {
            Some(open) => (&part[..open], &part[open..]),
            None => (part, ""),
        };

        if head.is_empty() && rest.is_empty() {
            return Err(PathError::InvalidSegment(part.to_string()));
        }
        if !head.is_empty() {
            segments.push(parse_segment(head)?);
        }

        while !rest.is_empty() {
            let close = rest
                .find(']')
                .ok_or_else(|| PathError::InvalidSegment(part.to_string()))?;
            let index = rest[1..close]
                .parse::<usize>()
                .map_err(|_| PathError::InvalidSegment(part.to_string()))?;
            segments.push(Segment::Index(index));
            rest = &rest[close + 1..];
            if !rest.is_empty() && !rest.starts_with('[') {
                return Err(PathError::InvalidSegment(part.to_string()));
            }
        }
    }
    Ok(segments)
}

fn parse_segment(raw: &str) -> Result<Segment, PathError> {
    if raw.chars().all(|c| c.is_ascii_digit()) {
        return raw
            .parse::<usize>()
            .map(Segment::Index)
            .map_err(|_| PathError::InvalidSegment(raw.to_string()));
    }
    if raw
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Ok(Segment::Key(raw.to_string()));
    }
    Err(PathError::InvalidSegment(raw.to_string()))
}

fn render(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

enum Walk<'a> {
    Node(NodePath),
    List(ListPath),
    Field(NodePath, &'a str),
}

/// Resolve untyped segments against the fixed schema
fn walk(segments: &[Segment]) -> Result<Walk<'_>, PathError> {
    let mut node = NodePath::Page;
    let mut iter = segments.iter();
    let mut last_key = String::new();

    loop {
        let key = match iter.next() {
            None => return Ok(Walk::Node(node)),
            Some(Segment::Index(index)) => {
                return Err(PathError::UnexpectedIndex {
                    index: *index,
                    after: last_key,
                })
            }
            Some(Segment::Key(key)) => key.as_str(),
        };

        let list = match (node, key) {
            (NodePath::Page, "sections") => Some(ListPath::Sections),
            (NodePath::Section { section }, "documents") => Some(ListPath::Documents { section }),
            (NodePath::Document { section, document }, "annexes") => {
                Some(ListPath::Annexes { section, document })
            }
            _ => None,
        };

        let Some(list) = list else {
            if iter.next().is_some() {
                return Err(PathError::TrailingSegments {
                    field: key.to_string(),
                });
            }
            return Ok(Walk::Field(node, key));
        };

        match iter.next() {
            None => return Ok(Walk::List(list)),
            Some(Segment::Index(index)) => node = list.item(*index).node(),
            Some(Segment::Key(found)) => {
                return Err(PathError::ExpectedIndex {
                    list: key.to_string(),
                    found: found.clone(),
                })
            }
        }
        last_key = key.to_string();
    }
}

macro_rules! impl_from_str {
    ($($ty:ty),*) => {
        $(
            impl FromStr for $ty {
                type Err = PathError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::from_segments(&parse_segments(s)?)
                }
            }
        )*
    };
}

impl_from_str!(NodePath, FieldPath, ListPath, ItemPath);

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_item() {
            None => f.write_str("page"),
            Some(item) => fmt::Display::fmt(&item, f),
        }
    }
}

impl fmt::Display for ListPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListPath::Sections => f.write_str("sections"),
            ListPath::Documents { section } => write!(f, "sections.{}.documents", section),
            ListPath::Annexes { section, document } => {
                write!(f, "sections.{}.documents.{}.annexes", section, document)
            }
        }
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.list, self.index)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node().as_item() {
            None => f.write_str(self.key()),
            Some(item) => write!(f, "{}.{}", item, self.key()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotted_and_bracket_forms() {
        let dotted = parse_segments("sections.0.documents.1.title").unwrap();
        let bracket = parse_segments("sections[0].documents[1].title").unwrap();
        assert_eq!(dotted, bracket);
        assert_eq!(
            dotted,
            vec![
                Segment::from("sections"),
                Segment::from(0),
                Segment::from("documents"),
                Segment::from(1),
                Segment::from("title"),
            ]
        );
    }

    #[test]
    fn test_field_path_from_segments() {
        let path: FieldPath = "sections.0.documents.2.annexes.1.url".parse().unwrap();
        assert_eq!(
            path,
            FieldPath::Annex {
                section: 0,
                document: 2,
                annex: 1,
                field: AnnexField::Url,
            }
        );

        let page_title: FieldPath = "title".parse().unwrap();
        assert_eq!(
            page_title,
            FieldPath::Page {
                field: PageField::Title
            }
        );

        let kind: FieldPath = "sections.3.type".parse().unwrap();
        assert_eq!(
            kind,
            FieldPath::Section {
                section: 3,
                field: SectionField::Kind
            }
        );
    }

    #[test]
    fn test_json_segments() {
        let segments: Vec<Segment> =
            serde_json::from_str(r#"["sections", 0, "documents", 0, "annexes", 1]"#).unwrap();
        let item = ItemPath::from_segments(&segments).unwrap();
        assert_eq!(
            item,
            ListPath::Annexes {
                section: 0,
                document: 0
            }
            .item(1)
        );
    }

    #[test]
    fn test_list_and_item_paths() {
        assert_eq!("sections".parse::<ListPath>().unwrap(), ListPath::Sections);
        assert_eq!(
            "sections.4.documents".parse::<ListPath>().unwrap(),
            ListPath::Documents { section: 4 }
        );
        assert_eq!(
            "sections.1".parse::<ItemPath>().unwrap(),
            ListPath::Sections.item(1)
        );
    }

    #[test]
    fn test_malformed_paths_are_rejected() {
        assert_eq!(parse_segments("").unwrap_err(), PathError::Empty);
        assert!(matches!(
            "sections.title".parse::<FieldPath>().unwrap_err(),
            PathError::ExpectedIndex { .. }
        ));
        assert!(matches!(
            "title.0".parse::<FieldPath>().unwrap_err(),
            PathError::TrailingSegments { .. }
        ));
        assert!(matches!(
            "sections.0.slug".parse::<FieldPath>().unwrap_err(),
            PathError::UnknownField {
                kind: NodeKind::Section,
                ..
            }
        ));
        assert!(matches!(
            "0.title".parse::<FieldPath>().unwrap_err(),
            PathError::UnexpectedIndex { index: 0, .. }
        ));
        assert!(matches!(
            "sections.0".parse::<ListPath>().unwrap_err(),
            PathError::NotAList(_)
        ));
        assert!(matches!(
            "sections".parse::<ItemPath>().unwrap_err(),
            PathError::NotAnItem(_)
        ));
        assert!(matches!(
            "sections[x]".parse::<ItemPath>().unwrap_err(),
            PathError::InvalidSegment(_)
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for raw in [
            "title",
            "sections.0.type",
            "sections.1.documents.2.description",
            "sections.1.documents.2.annexes.0.title",
        ] {
            let path: FieldPath = raw.parse().unwrap();
            assert_eq!(path.to_string(), raw);
        }
        assert_eq!(
            ListPath::Annexes {
                section: 0,
                document: 1
            }
            .to_string(),
            "sections.0.documents.1.annexes"
        );
    }

    #[test]
    fn test_optional_fields() {
        assert!("sections.0.documents.0.description"
            .parse::<FieldPath>()
            .unwrap()
            .is_optional());
        assert!(!"slug".parse::<FieldPath>().unwrap().is_optional());
    }
}
