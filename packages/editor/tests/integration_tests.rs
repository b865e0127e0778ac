//! Integration tests for editor crate

use std::sync::Arc;

use cms_editor::{
    get_field, insert_child, remove_child, set_field, EditSession, FieldPath, ItemPath, ListPath,
    Mutation, MutationError, Node, Segment,
};
use cms_model::{Annex, Document, Page, Section, SectionKind};

fn page_with_two_annexes() -> Page {
    let mut document = Document::new("Edital 01/2025", "https://ufsj.edu.br/edital.pdf");
    document.annexes = vec![
        Arc::new(Annex::new("Anexo I", "https://ufsj.edu.br/anexo1.pdf")),
        Arc::new(Annex::new("Anexo II", "https://ufsj.edu.br/anexo2.pdf")),
    ];

    let mut section = Section::new("Editais");
    section.documents = vec![Arc::new(document)];

    let mut page = Page::new("p1", "Editais", "editais");
    page.sections = vec![Arc::new(section)];
    page
}

#[test]
fn test_insert_section_into_empty_page() {
    let tree = Page::new("p0", "T", "t");
    let new_section = Section {
        id: None,
        title: "Nova Seção".to_string(),
        kind: SectionKind::DocumentList,
        documents: vec![],
    };

    let next = insert_child(&tree, &ListPath::Sections, Node::from(new_section)).unwrap();

    assert_eq!(next.sections.len(), 1);
    assert_eq!(next.sections[0].title, "Nova Seção");
    assert!(tree.sections.is_empty());
}

#[test]
fn test_remove_second_annex() {
    let tree = page_with_two_annexes();
    let segments: Vec<Segment> = vec![
        "sections".into(),
        Segment::Index(0),
        "documents".into(),
        Segment::Index(0),
        "annexes".into(),
        Segment::Index(1),
    ];
    let at = ItemPath::from_segments(&segments).unwrap();

    let next = remove_child(&tree, &at).unwrap();

    let annexes = &next.sections[0].documents[0].annexes;
    assert_eq!(annexes.len(), 1);
    assert_eq!(annexes[0].title, "Anexo I");
    assert!(Arc::ptr_eq(
        &annexes[0],
        &tree.sections[0].documents[0].annexes[0]
    ));
}

#[test]
fn test_set_section_title_keeps_documents() {
    let tree = page_with_two_annexes();
    let path: FieldPath = "sections.0.title".parse().unwrap();

    let next = set_field(&tree, &path, "Nova").unwrap();

    assert_eq!(next.sections[0].title, "Nova");
    assert_eq!(next.sections[0].documents, tree.sections[0].documents);
    assert!(Arc::ptr_eq(
        &next.sections[0].documents[0],
        &tree.sections[0].documents[0]
    ));
}

#[test]
fn test_remove_out_of_range_is_a_structured_error() {
    let tree = page_with_two_annexes();
    let before = tree.clone();
    let at: ItemPath = "sections.0.documents.0.annexes.7".parse().unwrap();

    let err = remove_child(&tree, &at).unwrap_err();

    assert_eq!(
        err,
        MutationError::IndexOutOfRange {
            list: ListPath::Annexes {
                section: 0,
                document: 0
            },
            index: 7,
            len: 2,
        }
    );
    assert_eq!(tree, before);
}

#[test]
fn test_removal_preserves_sibling_order() {
    let mut tree = Page::new("p", "T", "t");
    tree.sections = ["A", "B", "C"]
        .into_iter()
        .map(|title| Arc::new(Section::new(title)))
        .collect();

    let next = remove_child(&tree, &ListPath::Sections.item(1)).unwrap();

    let titles: Vec<&str> = next.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "C"]);
}

#[test]
fn test_editing_session_workflow() {
    let mut session = EditSession::new();
    session.load(page_with_two_annexes());

    session.add_child(ListPath::Documents { section: 0 }).unwrap();
    session
        .set_field(
            "sections.0.documents.1.url".parse().unwrap(),
            "https://ufsj.edu.br/resultado.pdf",
        )
        .unwrap();
    session
        .remove_child("sections.0.documents.0.annexes.0".parse().unwrap())
        .unwrap();

    let page = session.page().unwrap();
    assert_eq!(page.sections[0].documents.len(), 2);
    assert_eq!(page.sections[0].documents[0].annexes.len(), 1);
    assert_eq!(
        get_field(page, &"sections.0.documents.1.title".parse().unwrap())
            .unwrap()
            .as_deref(),
        Some("Novo Documento")
    );

    let payload = serde_json::to_value(session.payload().unwrap()).unwrap();
    assert!(payload.get("_id").is_none());
    assert_eq!(
        payload["sections"][0]["documents"][1]["url"],
        "https://ufsj.edu.br/resultado.pdf"
    );
    assert!(payload["sections"][0]["documents"][1].get("_id").is_none());

    while session.undo().unwrap() {}
    assert_eq!(session.page(), Some(&page_with_two_annexes()));
}

#[test]
fn test_mutation_serialization() {
    let mutation = Mutation::RemoveChild {
        at: "sections.1.documents.3".parse().unwrap(),
    };

    let json = serde_json::to_string(&mutation).unwrap();
    let deserialized: Mutation = serde_json::from_str(&json).unwrap();

    assert_eq!(mutation, deserialized);
}
