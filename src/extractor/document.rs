use crate::error::ExtractError;
use regex::Regex;
use std::io::Read;
use std::sync::LazyLock;
use tracing::{debug, warn};

static TEXT_RUN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>").unwrap());

pub const MEDIA_TYPE_TXT: &str = "text/plain";
pub const MEDIA_TYPE_PDF: &str = "application/pdf";
pub const MEDIA_TYPE_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Extract plain text from document bytes according to the declared media type
pub async fn extract_document(bytes: Vec<u8>, media_type: &str) -> Result<String, ExtractError> {
    match media_type {
        MEDIA_TYPE_TXT => extract_txt(bytes),
        MEDIA_TYPE_PDF => {
            tokio::task::spawn_blocking(move || extract_pdf(&bytes))
                .await
                .map_err(|e| ExtractError::Extraction(format!("PDF task failed: {}", e)))?
        }
        MEDIA_TYPE_DOCX => {
            tokio::task::spawn_blocking(move || extract_docx(&bytes))
                .await
                .map_err(|e| ExtractError::Extraction(format!("DOCX task failed: {}", e)))?
        }
        other => Err(ExtractError::UnsupportedFormat(other.to_string())),
    }
}

fn extract_txt(bytes: Vec<u8>) -> Result<String, ExtractError> {
    String::from_utf8(bytes)
        .map_err(|e| ExtractError::Extraction(format!("file is not valid UTF-8: {}", e)))
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    use lopdf::Document;

    // lopdf first; pdf-extract prints warnings to stderr
    let doc = Document::load_mem(bytes)
        .map_err(|e| ExtractError::Extraction(format!("failed to load PDF: {}", e)))?;

    let mut text_content = String::new();

    for page_num in doc.get_pages().keys() {
        if let Ok(page_text) = doc.extract_text(&[*page_num]) {
            text_content.push_str(&page_text);
            text_content.push('\n');
        }
    }

    if text_content.trim().is_empty() {
        warn!("lopdf extracted no text, falling back to pdf-extract");
        match pdf_extract::extract_text_from_mem(bytes) {
            Ok(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            Ok(_) => Err(ExtractError::Extraction(
                "PDF contains no extractable text".to_string(),
            )),
            Err(e) => Err(ExtractError::Extraction(format!(
                "failed to extract PDF text: {}",
                e
            ))),
        }
    } else {
        debug!(chars = text_content.len(), "extracted PDF text via lopdf");
        Ok(text_content.trim().to_string())
    }
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    use zip::ZipArchive;

    let cursor = std::io::Cursor::new(bytes);
    let mut archive = ZipArchive::new(cursor)
        .map_err(|e| ExtractError::Extraction(format!("failed to read DOCX archive: {}", e)))?;

    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Extraction(format!("missing word/document.xml: {}", e)))?
        .read_to_string(&mut document_xml)
        .map_err(|e| ExtractError::Extraction(format!("failed to read document.xml: {}", e)))?;

    Ok(document_xml_to_text(&document_xml))
}

/// Pull the visible text out of a DOCX document.xml body, one line per paragraph
fn document_xml_to_text(xml: &str) -> String {
    let mut text = String::new();

    for paragraph in xml.split("</w:p>") {
        let mut paragraph_text = String::new();
        for capture in TEXT_RUN_PATTERN.captures_iter(paragraph) {
            paragraph_text.push_str(&html_escape::decode_html_entities(&capture[1]));
        }
        if !paragraph_text.trim().is_empty() {
            text.push_str(paragraph_text.trim());
            text.push('\n');
        }
    }

    text.trim().to_string()
}
