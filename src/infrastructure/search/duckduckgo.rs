//! DuckDuckGo search over the HTML results page

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::domain::search::{SearchProvider, SearchResult};
use crate::domain::DomainError;
use crate::infrastructure::llm::HttpClientTrait;

/// Endpoint serving results without JavaScript
pub const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";

const DEFAULT_SOURCE: &str = "DuckDuckGo Search";

/// Search provider scraping DuckDuckGo's HTML results page
#[derive(Debug)]
pub struct DuckDuckGoSearch<C: HttpClientTrait> {
    client: C,
    endpoint: String,
}

impl<C: HttpClientTrait> DuckDuckGoSearch<C> {
    pub fn new(client: C) -> Self {
        Self::with_endpoint(client, DUCKDUCKGO_HTML_URL)
    }

    pub fn with_endpoint(client: C, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    fn selector(css: &str) -> Result<Selector, DomainError> {
        Selector::parse(css)
            .map_err(|e| DomainError::internal(format!("Invalid selector '{}': {}", css, e)))
    }

    fn element_text(element: ElementRef<'_>) -> String {
        element
            .text()
            .collect::<Vec<_>>()
            .join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Extract `(snippet, title)` hits from a results page
    fn parse_results(html: &str, max_results: usize) -> Result<Vec<SearchResult>, DomainError> {
        let result_selector = Self::selector(".result")?;
        let title_selector = Self::selector(".result__a")?;
        let snippet_selector = Self::selector(".result__snippet")?;

        let document = Html::parse_document(html);

        let results = document
            .select(&result_selector)
            .filter_map(|result| {
                let snippet = result
                    .select(&snippet_selector)
                    .next()
                    .map(Self::element_text)
                    .filter(|s| !s.is_empty())?;

                let source = result
                    .select(&title_selector)
                    .next()
                    .map(Self::element_text)
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

                Some(SearchResult::new(snippet, source))
            })
            .take(max_results)
            .collect();

        Ok(results)
    }
}

#[async_trait]
impl<C: HttpClientTrait + 'static> SearchProvider for DuckDuckGoSearch<C> {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, DomainError> {
        let body = self
            .client
            .get_text(&self.endpoint, vec![("q", query)])
            .await
            .map_err(|e| DomainError::search(e.to_string()))?;

        let results = Self::parse_results(&body, max_results)?;
        debug!(query, count = results.len(), "DuckDuckGo search finished");

        Ok(results)
    }

    fn provider_name(&self) -> &'static str {
        "duckduckgo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::MockHttpClient;

    const PAGE: &str = r#"
        <html><body>
          <div class="result">
            <h2><a class="result__a" href="https://www.canlii.org/a">Void and Voidable   Contracts</a></h2>
            <a class="result__snippet">A <b>void</b> contract has no legal effect.</a>
          </div>
          <div class="result">
            <a class="result__snippet">Voidable contracts may be rescinded by one party.</a>
          </div>
          <div class="result">
            <h2><a class="result__a" href="https://laws.justice.gc.ca">No snippet here</a></h2>
          </div>
          <div class="result">
            <h2><a class="result__a">Third</a></h2>
            <a class="result__snippet">Misrepresentation can make a contract voidable.</a>
          </div>
        </body></html>
    "#;

    #[tokio::test]
    async fn test_parses_results_page() {
        let client = MockHttpClient::new().with_text_response(DUCKDUCKGO_HTML_URL, PAGE);
        let search = DuckDuckGoSearch::new(client);

        let results = search.search("void contract", 5).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].content, "A void contract has no legal effect.");
        assert_eq!(results[0].source, "Void and Voidable Contracts");
        assert_eq!(results[1].source, "DuckDuckGo Search");
        assert_eq!(results[2].source, "Third");
    }

    #[tokio::test]
    async fn test_respects_max_results() {
        let client = MockHttpClient::new().with_text_response(DUCKDUCKGO_HTML_URL, PAGE);
        let search = DuckDuckGoSearch::new(client);

        let results = search.search("void contract", 1).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_sends_query_parameter() {
        let client = MockHttpClient::new().with_text_response("http://search.test/html", "<html></html>");
        let search = DuckDuckGoSearch::with_endpoint(client, "http://search.test/html");

        let results = search.search("tort site:canlii.org", 5).await.unwrap();
        assert!(results.is_empty());

        let requests = search.client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].query,
            vec![("q".to_string(), "tort site:canlii.org".to_string())]
        );
    }

    #[tokio::test]
    async fn test_http_failure_is_search_error() {
        let client = MockHttpClient::new().with_error(DUCKDUCKGO_HTML_URL, "HTTP 503");
        let search = DuckDuckGoSearch::new(client);

        let error = search.search("tort", 5).await.unwrap_err();
        assert!(matches!(error, DomainError::Search { .. }));
    }
}
