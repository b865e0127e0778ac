//! Sample pages used by the in-memory store and the mock backend.

use std::sync::Arc;

use crate::page::{Annex, Document, Page, Section};

pub const SEED_PAGE_IDS: [&str; 2] = ["mock-id-1", "mock-id-2"];

pub fn seed_pages() -> Vec<Page> {
    let first_document = Document {
        id: Some("mock-doc-1".to_string()),
        description: Some(
            "Este é um edital de exemplo para desenvolvimento visual. A URL não funciona em modo offline."
                .to_string(),
        ),
        annexes: vec![
            Arc::new(Annex {
                id: Some("mock-anx-1".to_string()),
                ..Annex::new("Anexo I - Cronograma Falso", "#")
            }),
            Arc::new(Annex {
                id: Some("mock-anx-2".to_string()),
                ..Annex::new("Anexo II - Documentação Falsa", "#")
            }),
        ],
        ..Document::new("Edital Falso nº 1/2025 para Teste Visual", "#")
    };

    let second_document = Document {
        id: Some("mock-doc-2".to_string()),
        description: Some("Descrição para o segundo documento.".to_string()),
        ..Document::new("Outro Documento de Exemplo", "#")
    };

    let editais = Section {
        id: Some("mock-sec-1".to_string()),
        documents: vec![Arc::new(first_document), Arc::new(second_document)],
        ..Section::new("Editais UFSJ (Dados Locais)")
    };

    let legislacao = Section {
        id: Some("mock-sec-2".to_string()),
        ..Section::new("Legislação (Dados Locais)")
    };

    let mut first = Page::new(
        SEED_PAGE_IDS[0],
        "Editais e Legislações (Mock)",
        "editais-e-legislacoes-mock",
    );
    first.sections = vec![Arc::new(editais), Arc::new(legislacao)];

    let second = Page::new(SEED_PAGE_IDS[1], "Página de Contato (Mock)", "contato-mock");

    vec![first, second]
}
