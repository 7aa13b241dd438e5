use crate::acquire::{BrowserPageSource, HttpPageSource, PageSource};
use crate::error::SearchError;
use crate::extract::filter::retain_from;
use crate::extract::{ExtractOptions, ResultRecord, extract_html, parse_floor};
use eureka_common::AcquisitionMode;
use eureka_config::EurekaConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub limit: usize,
    /// Optional `YYYY-MM-DD` (or loose day-first) floor; malformed values are ignored.
    pub date_from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub count: usize,
    pub results: Vec<ResultRecord>,
}

impl SearchResponse {
    pub fn new(results: Vec<ResultRecord>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}

/// The query operation: acquire a results page, extract, filter, truncate.
#[derive(Clone)]
pub struct EurekaSearch {
    source: Arc<dyn PageSource>,
    extract: ExtractOptions,
}

impl EurekaSearch {
    pub fn new(source: Arc<dyn PageSource>, extract: ExtractOptions) -> Self {
        Self { source, extract }
    }

    /// Build the page source selected by `search.mode`.
    pub fn from_config(cfg: &EurekaConfig) -> Result<Self, SearchError> {
        let source: Arc<dyn PageSource> = match cfg.search.mode {
            AcquisitionMode::Http => Arc::new(HttpPageSource::from_config(&cfg.search)?),
            AcquisitionMode::Browser => Arc::new(BrowserPageSource::from_config(&cfg.search)?),
        };
        Ok(Self::new(source, ExtractOptions::from(&cfg.extract)))
    }

    pub async fn search(&self, req: &SearchRequest) -> Result<SearchResponse, SearchError> {
        let started = Instant::now();
        let floor = parse_floor(req.date_from.as_deref());
        info!(
            target: "search",
            query = %req.query,
            limit = req.limit,
            date_from = ?floor.map(|d| d.to_string()),
            "search.start"
        );

        let capture = self.source.acquire(&req.query).await?;

        // With a floor, every candidate up to the anchor ceiling is extracted
        // so the floor runs before the caller's limit.
        let internal_limit = match floor {
            Some(_) => self.extract.max_anchors.max(req.limit),
            None => req.limit,
        };
        let extracted = extract_html(&capture.html, Some(&capture.url), internal_limit, &self.extract);
        let extracted_count = extracted.len();

        let mut results = retain_from(extracted, floor);
        results.truncate(req.limit);

        info!(
            target: "search",
            query = %req.query,
            extracted = extracted_count,
            returned = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search.done"
        );
        Ok(SearchResponse::new(results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::PageCapture;
    use url::Url;

    struct Fixed(String);

    #[async_trait::async_trait]
    impl PageSource for Fixed {
        async fn acquire(&self, _query: &str) -> Result<PageCapture, SearchError> {
            Ok(PageCapture {
                url: Url::parse("https://eureka.mf.gov.pl/informacje/wyszukiwanie").unwrap(),
                html: self.0.clone(),
            })
        }
    }

    struct Failing;

    #[async_trait::async_trait]
    impl PageSource for Failing {
        async fn acquire(&self, _query: &str) -> Result<PageCapture, SearchError> {
            Err(SearchError::NoResults { timeout_secs: 20 })
        }
    }

    const DATED: &str = r#"
        <ul>
          <li><a href="/informacje/podglad/1">A</a> 01.12.2023</li>
          <li><a href="/informacje/podglad/2">B</a> 01.02.2024</li>
          <li><a href="/informacje/podglad/3">C</a> 01.03.2024</li>
        </ul>"#;

    fn request(limit: usize, date_from: Option<&str>) -> SearchRequest {
        SearchRequest {
            query: "fundacja rodzinna".into(),
            limit,
            date_from: date_from.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn floor_applies_before_final_limit() {
        let search = EurekaSearch::new(Arc::new(Fixed(DATED.into())), ExtractOptions::default());
        let resp = search.search(&request(2, Some("2024-01-01"))).await.unwrap();
        let dates: Vec<String> = resp
            .results
            .iter()
            .map(|r| r.date.unwrap().to_string())
            .collect();
        assert_eq!(dates, vec!["2024-02-01", "2024-03-01"]);
        assert_eq!(resp.count, 2);
    }

    #[tokio::test]
    async fn floor_reaches_records_behind_many_rejects() {
        let mut html = String::from("<ul>");
        for i in 0..6 {
            html.push_str(&format!(
                r#"<li><a href="/informacje/podglad/{i}">stara {i}</a> 01.12.2023</li>"#
            ));
        }
        for i in 0..4 {
            html.push_str(&format!(r#"<li><a href="/informacje/podglad/b{i}">bez daty {i}</a></li>"#));
        }
        html.push_str(r#"<li><a href="/informacje/podglad/n1">nowa 1</a> 01.02.2024</li>"#);
        html.push_str(r#"<li><a href="/informacje/podglad/n2">nowa 2</a> 01.03.2024</li>"#);
        html.push_str("</ul>");

        let search = EurekaSearch::new(Arc::new(Fixed(html)), ExtractOptions::default());
        let resp = search.search(&request(2, Some("2024-01-01"))).await.unwrap();
        let titles: Vec<&str> = resp.results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["nowa 1", "nowa 2"]);
    }

    #[tokio::test]
    async fn without_floor_limit_is_plain_truncation() {
        let search = EurekaSearch::new(Arc::new(Fixed(DATED.into())), ExtractOptions::default());
        let resp = search.search(&request(2, None)).await.unwrap();
        let titles: Vec<&str> = resp.results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn malformed_floor_is_ignored() {
        let search = EurekaSearch::new(Arc::new(Fixed(DATED.into())), ExtractOptions::default());
        let resp = search.search(&request(5, Some("jutro"))).await.unwrap();
        assert_eq!(resp.count, 3);
    }

    #[tokio::test]
    async fn acquisition_errors_propagate() {
        let search = EurekaSearch::new(Arc::new(Failing), ExtractOptions::default());
        let err = search.search(&request(5, None)).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn empty_page_is_an_empty_list() {
        let search = EurekaSearch::new(Arc::new(Fixed("<p>Brak wyników</p>".into())), ExtractOptions::default());
        let resp = search.search(&request(5, None)).await.unwrap();
        assert_eq!(resp, SearchResponse::new(vec![]));
    }

    #[test]
    fn config_selects_source() {
        let mut cfg = EurekaConfig::default();
        assert!(EurekaSearch::from_config(&cfg).is_ok());
        cfg.search.url_template = "https://eureka.mf.gov.pl/".into();
        assert!(matches!(
            EurekaSearch::from_config(&cfg).err(),
            Some(SearchError::Template(_))
        ));
    }
}
