use crate::error::ExtractError;
use scraper::{ElementRef, Html, Node};
use tracing::debug;

/// Fetch a web page and return its visible text
pub async fn fetch_page_text(client: &reqwest::Client, url: &str) -> Result<String, ExtractError> {
    debug!(url, "fetching web page");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ExtractError::transport(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExtractError::http_status(status.as_u16(), url));
    }

    let body = response
        .text()
        .await
        .map_err(|e| ExtractError::transport(url, e))?;

    Ok(visible_text(&body))
}

/// Strip markup from an HTML document, dropping script and style subtrees
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();
    collect_visible(document.root_element(), &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_visible(element: ElementRef, out: &mut String) {
    let tag = element.value().name();
    if tag == "script" || tag == "style" {
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_visible(child_element, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::extractor::http_client;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_visible_text_strips_script_and_style() {
        let html = r#"<html><head>
            <style>body { color: red; }</style>
            <script>console.log("hidden");</script>
        </head><body>
            <h1>Title</h1>
            <p>Visible <b>content</b> here.</p>
            <script>var alsoHidden = 1;</script>
        </body></html>"#;

        let text = visible_text(html);
        assert_eq!(text, "Title Visible content here.");
        assert!(!text.contains("hidden"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_visible_text_collapses_whitespace() {
        let html = "<p>one</p>\n\n  <p>two\n   three</p>";
        assert_eq!(visible_text(html), "one two three");
    }

    #[tokio::test]
    async fn test_fetch_page_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .and(header("user-agent", "Mozilla/5.0"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><p>An article body.</p></body></html>"),
            )
            .mount(&server)
            .await;

        let client = http_client(&HttpConfig::default());
        let text = fetch_page_text(&client, &format!("{}/article", server.uri()))
            .await
            .unwrap();
        assert_eq!(text, "An article body.");
    }

    #[tokio::test]
    async fn test_fetch_page_surfaces_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = http_client(&HttpConfig::default());
        let err = fetch_page_text(&client, &format!("{}/missing", server.uri()))
            .await
            .unwrap_err();
        match err {
            ExtractError::Fetch { status, .. } => assert_eq!(status, Some(404)),
            other => panic!("expected Fetch, got {:?}", other),
        }
    }
}
