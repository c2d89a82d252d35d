//! Template fill tests against real `.docx` packages built in memory.

use std::io::{Cursor, Read, Write};

use grantmail_core::{
    types::{EvalReturned, ParticipantName, Record},
    MatchMode,
};
use grantmail_renderer::{
    tokens::{ALL_TOKENS, EVAL_PENDING, REVIEWER_PLACEHOLDER},
    DocxTemplate, RenderError, TokenMap,
};
use rstest::rstest;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

fn docx_bytes(body: &str) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    );
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", RELS),
        ("word/document.xml", document.as_str()),
    ] {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn para(text: &str) -> String {
    format!(r#"<w:p><w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#)
}

fn table(cells: &[&str]) -> String {
    let cells: String = cells
        .iter()
        .map(|c| format!("<w:tc><w:tcPr/>{}</w:tc>", para(c)))
        .collect();
    format!("<w:tbl><w:tblPr/><w:tr>{cells}</w:tr></w:tbl>")
}

fn record(eval: EvalReturned) -> Record {
    Record {
        row: 2,
        name: ParticipantName::from("Jane Doe"),
        grant: "G1".into(),
        nda_required: false,
        evaluation_returned: eval,
    }
}

fn all_tokens_body() -> String {
    ALL_TOKENS.iter().map(|t| para(&format!("[{t}]"))).collect()
}

fn document_xml(bytes: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name("word/document.xml").unwrap();
    let mut out = String::new();
    file.read_to_string(&mut out).unwrap();
    out
}

// ---------------------------------------------------------------------------
// Completeness
// ---------------------------------------------------------------------------

#[test]
fn every_token_is_replaced_in_body() {
    let mut doc = DocxTemplate::from_bytes(&docx_bytes(&all_tokens_body())).unwrap();
    let tokens = TokenMap::for_record(&record(EvalReturned::Returned("2024-01-01".into())), "Av");

    let changed = doc.substitute(&tokens, MatchMode::RunLocal).unwrap();
    assert_eq!(changed, 5);
    assert!(doc.remaining_tokens().unwrap().is_empty());
    assert_eq!(
        doc.body_paragraph_texts().unwrap(),
        vec![
            "[Jane Doe]".to_string(),
            format!("[{REVIEWER_PLACEHOLDER}]"),
            "[G1]".to_string(),
            "[2024-01-01]".to_string(),
            "[Av]".to_string(),
        ]
    );
}

#[test]
fn pending_eval_prints_placeholder_literal() {
    let mut doc = DocxTemplate::from_bytes(&docx_bytes(&para("Returned: ${EVAL_RETURNED}"))).unwrap();
    doc.substitute(&TokenMap::for_record(&record(EvalReturned::Pending), "Av"), MatchMode::RunLocal)
        .unwrap();
    assert_eq!(
        doc.body_paragraph_texts().unwrap(),
        vec![format!("Returned: {EVAL_PENDING}")]
    );
}

// ---------------------------------------------------------------------------
// Scoping
// ---------------------------------------------------------------------------

#[test]
fn table_cell_tokens_are_replaced() {
    let body = format!(
        "{}{}",
        para("Intro"),
        table(&["Grant: ${GRANT_NAME}", "Reviewer: ${PARTICIPANT_NAME}"])
    );
    let mut doc = DocxTemplate::from_bytes(&docx_bytes(&body)).unwrap();
    doc.substitute(
        &TokenMap::for_record(&record(EvalReturned::Pending), "Av"),
        MatchMode::RunLocal,
    )
    .unwrap();
    assert_eq!(
        doc.table_cell_texts().unwrap(),
        vec!["Grant: G1".to_string(), "Reviewer: Jane Doe".to_string()]
    );
}

#[test]
fn nested_tables_and_headers_are_out_of_scope() {
    let nested = format!("<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>", para("${GRANT_NAME}"));
    let body = format!("<w:tbl><w:tr><w:tc>{nested}{}</w:tc></w:tr></w:tbl>", para("${GRANT_NAME}"));
    let mut doc = DocxTemplate::from_bytes(&docx_bytes(&body)).unwrap();
    doc.substitute(
        &TokenMap::for_record(&record(EvalReturned::Pending), "Av"),
        MatchMode::RunLocal,
    )
    .unwrap();

    let xml = document_xml(&doc.to_bytes().unwrap());
    assert_eq!(xml.matches("${GRANT_NAME}").count(), 1, "nested cell must be untouched");
    assert_eq!(xml.matches(">G1<").count(), 1);
}

#[rstest]
#[case(MatchMode::RunLocal, false)]
#[case(MatchMode::Reflow, true)]
fn split_token_depends_on_match_mode(#[case] mode: MatchMode, #[case] replaced: bool) {
    let body = r#"<w:p><w:r><w:t>Grant ${GRANT</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>_NAME}</w:t></w:r></w:p>"#;
    let mut doc = DocxTemplate::from_bytes(&docx_bytes(body)).unwrap();
    doc.substitute(&TokenMap::for_record(&record(EvalReturned::Pending), "Av"), mode)
        .unwrap();

    let text = doc.body_paragraph_texts().unwrap().remove(0);
    if replaced {
        assert_eq!(text, "Grant G1");
        assert!(doc.remaining_tokens().unwrap().is_empty());
    } else {
        assert_eq!(text, "Grant ${GRANT_NAME}");
        assert_eq!(doc.remaining_tokens().unwrap(), vec!["${GRANT_NAME}"]);
    }
}

#[rstest]
#[case(MatchMode::RunLocal, false)]
#[case(MatchMode::Reflow, true)]
fn split_token_in_table_cell_depends_on_match_mode(
    #[case] mode: MatchMode,
    #[case] replaced: bool,
) {
    let body = concat!(
        r#"<w:tbl><w:tblPr/><w:tr><w:tc><w:tcPr/>"#,
        r#"<w:p><w:r><w:t xml:space="preserve">Grant ${GRANT</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>_NAME}</w:t></w:r></w:p>"#,
        r#"</w:tc></w:tr></w:tbl>"#,
    );
    let mut doc = DocxTemplate::from_bytes(&docx_bytes(body)).unwrap();
    doc.substitute(&TokenMap::for_record(&record(EvalReturned::Pending), "Av"), mode)
        .unwrap();

    let cells = doc.table_cell_texts().unwrap();
    if replaced {
        assert_eq!(cells, vec!["Grant G1"]);
        assert!(doc.remaining_tokens().unwrap().is_empty());
    } else {
        assert_eq!(cells, vec!["Grant ${GRANT_NAME}"]);
        assert_eq!(doc.remaining_tokens().unwrap(), vec!["${GRANT_NAME}"]);
    }
}

// ---------------------------------------------------------------------------
// Isolation and serialization
// ---------------------------------------------------------------------------

#[test]
fn clones_do_not_share_substitutions() {
    let template = DocxTemplate::from_bytes(&docx_bytes(&para("${PARTICIPANT_NAME}"))).unwrap();

    let mut first = template.clone();
    first
        .substitute(&TokenMap::for_record(&record(EvalReturned::Pending), "Av"), MatchMode::RunLocal)
        .unwrap();

    let mut other = record(EvalReturned::Pending);
    other.name = ParticipantName::from("Sam Lee");
    let mut second = template.clone();
    second
        .substitute(&TokenMap::for_record(&other, "Av"), MatchMode::RunLocal)
        .unwrap();

    assert_eq!(first.body_paragraph_texts().unwrap(), vec!["Jane Doe"]);
    assert_eq!(second.body_paragraph_texts().unwrap(), vec!["Sam Lee"]);
    assert_eq!(template.body_paragraph_texts().unwrap(), vec!["${PARTICIPANT_NAME}"]);
}

#[test]
fn output_is_deterministic_and_reopenable() {
    let bytes = docx_bytes(&all_tokens_body());
    let tokens = TokenMap::for_record(&record(EvalReturned::Returned("2024-01-01".into())), "Av");

    let render = || {
        let mut doc = DocxTemplate::from_bytes(&bytes).unwrap();
        doc.substitute(&tokens, MatchMode::RunLocal).unwrap();
        doc.to_bytes().unwrap()
    };
    let a = render();
    let b = render();
    assert_eq!(a, b, "identical inputs must give identical bytes");

    let reopened = DocxTemplate::from_bytes(&a).unwrap();
    assert!(reopened.remaining_tokens().unwrap().is_empty());
    assert_eq!(reopened.body_paragraph_texts().unwrap()[0], "[Jane Doe]");
}

#[test]
fn untouched_parts_survive_roundtrip() {
    let bytes = docx_bytes(&para("plain"));
    let out = DocxTemplate::from_bytes(&bytes).unwrap().to_bytes().unwrap();

    let mut archive = zip::ZipArchive::new(Cursor::new(out.as_slice())).unwrap();
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    assert_eq!(names, vec!["[Content_Types].xml", "_rels/.rels", "word/document.xml"]);

    let mut rels = String::new();
    archive.by_name("_rels/.rels").unwrap().read_to_string(&mut rels).unwrap();
    assert_eq!(rels, RELS);
    assert_eq!(document_xml(&out), document_xml(&bytes));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn open_missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope.docx");
    let err = DocxTemplate::open(&path).unwrap_err();
    assert!(matches!(err, RenderError::Io { .. }));
    assert!(err.to_string().contains("nope.docx"));
}

#[test]
fn non_zip_is_a_package_error() {
    let err = DocxTemplate::from_bytes(b"plain text, not a docx").unwrap_err();
    assert!(matches!(err, RenderError::Zip(_)), "got: {err}");
}

#[test]
fn package_without_document_part_is_rejected() {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("[Content_Types].xml", SimpleFileOptions::default()).unwrap();
    zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();
    let bytes = zip.finish().unwrap().into_inner();

    let err = DocxTemplate::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, RenderError::MissingPart { .. }));
}
