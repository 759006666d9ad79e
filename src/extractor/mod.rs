pub mod document;
pub mod web;
pub mod youtube;

pub use document::{extract_document, MEDIA_TYPE_DOCX, MEDIA_TYPE_PDF, MEDIA_TYPE_TXT};
pub use web::fetch_page_text;
pub use youtube::{fetch_transcript, parse_video_id, CaptionTrack};

use crate::config::HttpConfig;
use crate::error::ExtractError;
use std::time::Duration;

/// An input the pipeline can turn into plain text
#[derive(Debug, Clone)]
pub enum ContentSource {
    /// Raw document bytes with their declared media type
    Document { bytes: Vec<u8>, media_type: String },
    /// A web page to fetch and strip down to visible text
    Page { url: String },
    /// A YouTube video to pull a caption transcript from
    Video { link: String },
}

impl ContentSource {
    /// Read a local file into a document source, inferring the media type
    /// from the file extension
    pub fn from_path(path: &std::path::Path) -> Result<Self, ExtractError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ExtractError::UnsupportedFormat(path.display().to_string()))?;
        let media_type = media_type_for_extension(ext)
            .ok_or_else(|| ExtractError::UnsupportedFormat(ext.to_string()))?;
        let bytes = std::fs::read(path)
            .map_err(|e| ExtractError::Extraction(format!("failed to read {}: {}", path.display(), e)))?;

        Ok(Self::Document {
            bytes,
            media_type: media_type.to_string(),
        })
    }
}

/// Run the one extractor matching the source kind
pub async fn extract(
    client: &reqwest::Client,
    source: ContentSource,
) -> Result<String, ExtractError> {
    match source {
        ContentSource::Document { bytes, media_type } => {
            document::extract_document(bytes, &media_type).await
        }
        ContentSource::Page { url } => web::fetch_page_text(client, &url).await,
        ContentSource::Video { link } => youtube::fetch_transcript(client, &link).await,
    }
}

/// Map a file extension to the media type the document extractor understands
pub fn media_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_lowercase().as_str() {
        "txt" | "text" => Some(MEDIA_TYPE_TXT),
        "pdf" => Some(MEDIA_TYPE_PDF),
        "docx" => Some(MEDIA_TYPE_DOCX),
        _ => None,
    }
}

/// Build the HTTP client shared by the network-facing extractors
pub fn http_client(http: &HttpConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(http.user_agent.clone())
        .timeout(Duration::from_secs(http.timeout_secs))
        .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_for_txt() {
        assert_eq!(media_type_for_extension("txt"), Some(MEDIA_TYPE_TXT));
        assert_eq!(media_type_for_extension("TXT"), Some(MEDIA_TYPE_TXT));
        assert_eq!(media_type_for_extension("text"), Some(MEDIA_TYPE_TXT));
    }

    #[test]
    fn test_media_type_for_pdf() {
        assert_eq!(media_type_for_extension("pdf"), Some(MEDIA_TYPE_PDF));
    }

    #[test]
    fn test_media_type_for_docx() {
        assert_eq!(media_type_for_extension("docx"), Some(MEDIA_TYPE_DOCX));
    }

    #[test]
    fn test_media_type_unknown_extension() {
        assert_eq!(media_type_for_extension("png"), None);
        assert_eq!(media_type_for_extension("doc"), None);
    }

    #[tokio::test]
    async fn test_extract_dispatches_document() {
        let client = http_client(&HttpConfig::default());
        let source = ContentSource::Document {
            bytes: b"dispatch me".to_vec(),
            media_type: MEDIA_TYPE_TXT.to_string(),
        };
        let text = extract(&client, source).await.unwrap();
        assert_eq!(text, "dispatch me");
    }

    #[tokio::test]
    async fn test_extract_rejects_unknown_media_type() {
        let client = http_client(&HttpConfig::default());
        let source = ContentSource::Document {
            bytes: vec![1, 2, 3],
            media_type: "application/octet-stream".to_string(),
        };
        let result = extract(&client, source).await;
        assert!(matches!(
            result,
            Err(ExtractError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_source_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "file contents").unwrap();

        match ContentSource::from_path(&path).unwrap() {
            ContentSource::Document { bytes, media_type } => {
                assert_eq!(bytes, b"file contents");
                assert_eq!(media_type, MEDIA_TYPE_TXT);
            }
            other => panic!("expected Document, got {:?}", other),
        }
    }

    #[test]
    fn test_source_from_path_unknown_extension() {
        let result = ContentSource::from_path(std::path::Path::new("/tmp/picture.png"));
        assert!(matches!(result, Err(ExtractError::UnsupportedFormat(_))));
    }
}
