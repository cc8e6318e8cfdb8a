use serde::{Deserialize, Serialize};

use crate::{PortalClient, PortalError};

/// JSON body of a portal search request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest<'a> {
    pub newsearch: bool,
    pub query_text: &'a str,
    pub highlight: bool,
    pub return_facets: [&'static str; 1],
    pub return_type: &'static str,
    pub match_pubs: bool,
}

impl<'a> SearchRequest<'a> {
    pub fn new(topic: &'a str) -> Self {
        Self {
            newsearch: true,
            query_text: topic,
            highlight: true,
            return_facets: ["ALL"],
            return_type: "SEARCH",
            match_pubs: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    records: Vec<RawRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    article_title: Option<String>,
    pdf_link: Option<String>,
}

/// A search hit that links to a PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRecord {
    pub title: Option<String>,
    /// Absolute URL of the portal's PDF stub page.
    pub pdf_url: String,
}

/// Parse a search response body into records with absolute PDF links.
///
/// Records without a `pdfLink` are dropped. A response without a `records`
/// array yields no records.
pub fn parse_search_response(body: &str, base_url: &str) -> Result<Vec<SearchRecord>, PortalError> {
    let response: SearchResponse = serde_json::from_str(body)?;
    let base = base_url.trim_end_matches('/');

    Ok(response
        .records
        .into_iter()
        .filter_map(|record| {
            let link = record.pdf_link?;
            let pdf_url = if link.starts_with("http://") || link.starts_with("https://") {
                link
            } else {
                format!("{base}{link}")
            };
            Some(SearchRecord {
                title: record.article_title,
                pdf_url,
            })
        })
        .collect())
}

impl PortalClient {
    /// Search the portal for `topic`.
    ///
    /// The home page is fetched first so the session carries the cookies the
    /// search endpoint expects.
    pub async fn search(&self, topic: &str) -> Result<Vec<SearchRecord>, PortalError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(PortalError::EmptyTopic);
        }

        let home = self.http().get(self.url("/Xplore/home.jsp")).send().await?;
        tracing::debug!(status = %home.status(), "loaded portal home page");

        let url = self.url("/rest/search");
        let resp = self
            .http()
            .post(&url)
            .json(&SearchRequest::new(topic))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(PortalError::HttpStatus {
                url,
                status: resp.status().as_u16(),
            });
        }

        let body = resp.text().await?;
        let mut records = parse_search_response(&body, &self.options().base_url)?;
        if let Some(max) = self.options().max_records {
            records.truncate(max);
        }

        tracing::info!(topic, records = records.len(), "portal search complete");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_portal_shape() {
        let value = serde_json::to_value(SearchRequest::new("graph neural networks")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "newsearch": true,
                "queryText": "graph neural networks",
                "highlight": true,
                "returnFacets": ["ALL"],
                "returnType": "SEARCH",
                "matchPubs": true,
            })
        );
    }

    #[test]
    fn records_get_absolute_links() {
        let body = r#"{
            "records": [
                {"articleTitle": "First", "pdfLink": "/stamp/stamp.jsp?tp=&arnumber=101"},
                {"articleTitle": "No PDF"},
                {"pdfLink": "https://mirror.example.org/stamp.jsp?arnumber=7"}
            ],
            "totalRecords": 3
        }"#;
        let records = parse_search_response(body, "https://ieeexplore.ieee.org/").unwrap();
        assert_eq!(
            records,
            vec![
                SearchRecord {
                    title: Some("First".to_string()),
                    pdf_url: "https://ieeexplore.ieee.org/stamp/stamp.jsp?tp=&arnumber=101"
                        .to_string(),
                },
                SearchRecord {
                    title: None,
                    pdf_url: "https://mirror.example.org/stamp.jsp?arnumber=7".to_string(),
                },
            ]
        );
    }

    #[test]
    fn missing_records_means_no_results() {
        let records = parse_search_response(r#"{"error": "none"}"#, "https://x").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn non_json_body_is_a_decode_error() {
        let err = parse_search_response("<html>blocked</html>", "https://x").unwrap_err();
        assert!(matches!(err, PortalError::Decode(_)));
    }

    #[tokio::test]
    async fn blank_topic_is_rejected_before_any_request() {
        let client = PortalClient::new(crate::ClientOptions {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(
            client.search("   ").await,
            Err(PortalError::EmptyTopic)
        ));
    }
}
