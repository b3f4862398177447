//! DuckDuckGoSearch - web search through the DuckDuckGo instant answer API.
//!
//! No API key is required. The API returns an abstract for well-known
//! topics plus lists of related topics; both are flattened into snippet/URL
//! pairs.

use crate::http::{error_from_response, map_transport_error};
use async_trait::async_trait;
use hext_core::agent::WebSearch;
use hext_core::config::SearchConfig;
use hext_core::error::{HextError, Result};
use hext_core::search::SourceCitation;
use reqwest::Client;
use serde::Deserialize;

const SERVICE: &str = "Web search";

#[derive(Clone)]
pub struct DuckDuckGoSearch {
    client: Client,
    url: String,
}

impl DuckDuckGoSearch {
    pub fn new(client: Client, config: &SearchConfig) -> Self {
        Self {
            client,
            url: config.url.clone(),
        }
    }
}

#[async_trait]
impl WebSearch for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SourceCitation>> {
        tracing::debug!("[DuckDuckGoSearch] Query: {}", query);

        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|err| map_transport_error(SERVICE, err))?;

        if !response.status().is_success() {
            return Err(error_from_response(SERVICE, response).await);
        }

        // Served as application/x-javascript, so parse the text ourselves.
        let body = response
            .text()
            .await
            .map_err(|err| map_transport_error(SERVICE, err))?;
        let answer: InstantAnswer = serde_json::from_str(&body).map_err(|err| {
            HextError::unexpected(format!("Failed to parse search response: {err}"))
        })?;

        let hits = answer.into_citations(max_results);
        tracing::debug!("[DuckDuckGoSearch] {} result(s)", hits.len());
        Ok(hits)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(default)]
    results: Vec<Topic>,
    #[serde(default)]
    related_topics: Vec<Topic>,
}

/// Either a leaf (`Text` + `FirstURL`) or a named group of nested topics.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Topic {
    #[serde(default)]
    text: Option<String>,
    #[serde(rename = "FirstURL", default)]
    first_url: Option<String>,
    #[serde(default)]
    topics: Vec<Topic>,
}

impl Topic {
    fn flatten_into(self, out: &mut Vec<SourceCitation>) {
        if let Some(text) = self.text.filter(|t| !t.trim().is_empty()) {
            out.push(SourceCitation::new(
                text.trim(),
                self.first_url.unwrap_or_default(),
            ));
        }
        for topic in self.topics {
            topic.flatten_into(out);
        }
    }
}

impl InstantAnswer {
    fn into_citations(self, max_results: usize) -> Vec<SourceCitation> {
        let mut citations = Vec::new();

        if !self.abstract_text.trim().is_empty() {
            citations.push(SourceCitation::new(
                self.abstract_text.trim(),
                self.abstract_url,
            ));
        }
        for topic in self.results.into_iter().chain(self.related_topics) {
            topic.flatten_into(&mut citations);
        }

        citations.truncate(max_results);
        citations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample() -> serde_json::Value {
        json!({
            "AbstractText": "Managua es la capital de Nicaragua.",
            "AbstractURL": "https://es.wikipedia.org/wiki/Managua",
            "Results": [],
            "RelatedTopics": [
                {"Text": "Clima de Managua - tropical", "FirstURL": "https://duckduckgo.com/Clima_Managua"},
                {
                    "Name": "Geografía",
                    "Topics": [
                        {"Text": "Lago Xolotlán", "FirstURL": "https://duckduckgo.com/Xolotlan"},
                        {"Text": "", "FirstURL": "https://duckduckgo.com/empty"}
                    ]
                }
            ]
        })
    }

    #[test]
    fn test_flattens_abstract_and_nested_topics() {
        let answer: InstantAnswer = serde_json::from_value(sample()).unwrap();
        let hits = answer.into_citations(10);

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].snippet, "Managua es la capital de Nicaragua.");
        assert_eq!(hits[0].url, "https://es.wikipedia.org/wiki/Managua");
        assert_eq!(hits[2].snippet, "Lago Xolotlán");
    }

    #[test]
    fn test_truncates_to_max_results() {
        let answer: InstantAnswer = serde_json::from_value(sample()).unwrap();
        assert_eq!(answer.into_citations(2).len(), 2);
    }

    #[test]
    fn test_empty_answer() {
        let answer: InstantAnswer = serde_json::from_str("{}").unwrap();
        assert!(answer.into_citations(3).is_empty());
    }

    #[tokio::test]
    async fn test_search_sends_instant_answer_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "clima actual en Managua"))
            .and(query_param("format", "json"))
            .and(query_param("no_html", "1"))
            .and(query_param("skip_disambig", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(sample().to_string(), "application/x-javascript"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = SearchConfig {
            url: server.uri(),
            ..SearchConfig::default()
        };
        let hits = DuckDuckGoSearch::new(Client::new(), &config)
            .search("clima actual en Managua", 3)
            .await
            .unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[1].url, "https://duckduckgo.com/Clima_Managua");
    }

    #[tokio::test]
    async fn test_search_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = SearchConfig {
            url: server.uri(),
            ..SearchConfig::default()
        };
        let result = DuckDuckGoSearch::new(Client::new(), &config)
            .search("clima", 3)
            .await;
        assert!(matches!(result, Err(HextError::Api { status: 500, .. })));
    }
}
