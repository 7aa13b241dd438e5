use eureka_web::extract::{
    DEFAULT_TITLE, ExtractOptions, ResultRecord, apply_date_floor, extract_html,
};
use eureka_web::acquire::{PageCapture, PageSource};
use eureka_web::{EurekaSearch, SearchError, SearchRequest};
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

const FIXTURE: &str = include_str!("fixtures/wyniki.html");

fn base() -> Url {
    Url::parse("https://eureka.mf.gov.pl/informacje/wyszukiwanie?q=fundacja+rodzinna").unwrap()
}

fn run(html: &str, limit: usize) -> Vec<ResultRecord> {
    extract_html(html, Some(&base()), limit, &ExtractOptions::default())
}

fn dates(records: &[ResultRecord]) -> Vec<Option<String>> {
    records.iter().map(|r| r.date.map(|d| d.to_string())).collect()
}

#[test]
fn fixture_page_yields_normalized_records() {
    let out = run(FIXTURE, 10);
    let urls: Vec<&str> = out.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://eureka.mf.gov.pl/informacje/podglad/612345",
            "https://eureka.mf.gov.pl/informacje/podglad/612346",
            "https://eureka.mf.gov.pl/informacje/podglad/612400",
            "https://eureka.mf.gov.pl/archiwum/Interpretacja-8812",
        ]
    );

    assert_eq!(out[0].title, "Fundacja rodzinna a podatek dochodowy");
    assert_eq!(out[1].title, DEFAULT_TITLE);
    assert_eq!(
        dates(&out),
        vec![
            Some("2023-03-05".to_string()),
            Some("2024-02-01".to_string()),
            Some("2022-11-17".to_string()),
            None,
        ]
    );
    assert!(
        out[0]
            .snippet
            .as_deref()
            .unwrap()
            .starts_with("Fundacja rodzinna a podatek dochodowy Interpretacja indywidualna")
    );
    assert_eq!(out[3].snippet.as_deref(), Some("Archiwalna interpretacja"));
}

#[test]
fn extraction_is_deterministic() {
    let first = serde_json::to_string(&run(FIXTURE, 10)).unwrap();
    for _ in 0..5 {
        assert_eq!(serde_json::to_string(&run(FIXTURE, 10)).unwrap(), first);
    }
}

#[test]
fn urls_are_pairwise_distinct_and_limit_holds() {
    for limit in 1..=6 {
        let out = run(FIXTURE, limit);
        assert!(out.len() <= limit);
        assert_eq!(out.len(), limit.min(4));
        let unique: HashSet<&str> = out.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(unique.len(), out.len());
    }
}

#[test]
fn duplicate_and_foreign_links_scenario() {
    let html = r#"
        <div><a href="/informacje/podglad/1">A</a></div>
        <div><a href="/informacje/podglad/1">A-dup</a></div>
        <div><a href="/other">B</a></div>
        <div><a href="/informacje/podglad/2">C</a></div>"#;
    let out = run(html, 5);
    let got: Vec<(&str, &str)> = out.iter().map(|r| (r.url.as_str(), r.title.as_str())).collect();
    assert_eq!(
        got,
        vec![
            ("https://eureka.mf.gov.pl/informacje/podglad/1", "A"),
            ("https://eureka.mf.gov.pl/informacje/podglad/2", "C"),
        ]
    );
}

#[test]
fn context_date_scenario() {
    let html = r#"<p><a href="/informacje/podglad/5">Tytuł</a>
        Interpretacja z dnia 05.03.2023 dotyczy...</p>"#;
    let out = run(html, 5);
    assert_eq!(out[0].date.map(|d| d.to_string()).as_deref(), Some("2023-03-05"));
    assert_eq!(
        out[0].snippet.as_deref(),
        Some("Tytuł Interpretacja z dnia 05.03.2023 dotyczy...")
    );
}

#[test]
fn id_survives_reworded_context() {
    let before = r#"<p><a href="/informacje/podglad/9">X</a> 2024-05-01 stary opis</p>"#;
    let after = r#"<p><a href="/informacje/podglad/9">X zmieniony</a> nowy opis z 2024-05-01</p>"#;
    assert_eq!(run(before, 1)[0].id, run(after, 1)[0].id);
}

#[test]
fn date_floor_keeps_order_and_drops_undated() {
    let out = apply_date_floor(run(FIXTURE, 10), Some("2023-01-01"));
    assert_eq!(
        dates(&out),
        vec![Some("2023-03-05".to_string()), Some("2024-02-01".to_string())]
    );
}

#[test]
fn malformed_markup_does_not_abort() {
    let html = r#"<div><a href="/informacje/podglad/1">A<div><a href=/informacje/podglad/2>B
        <li><a href="   ">interpretacja bez adresu</a><a href="/informacje/podglad/3">C"#;
    let out = run(html, 10);
    let urls: Vec<&str> = out.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls.first(),
        Some(&"https://eureka.mf.gov.pl/informacje/podglad/1")
    );
    assert!(urls.contains(&"https://eureka.mf.gov.pl/informacje/podglad/3"));
}

#[test]
fn relative_links_match_once_resolved() {
    let html = r#"
        <div><a href="podglad/7">Siódma</a> 2024-01-15</div>
        <div><a href="pomoc">Pomoc</a></div>"#;
    let page = Url::parse("https://eureka.mf.gov.pl/informacje/wyszukiwanie").unwrap();
    let out = extract_html(html, Some(&page), 5, &ExtractOptions::default());
    let urls: Vec<&str> = out.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["https://eureka.mf.gov.pl/informacje/podglad/7"]);
}

#[test]
fn head_links_never_become_records() {
    let html = r#"<html><head>
        <base href="https://eureka.mf.gov.pl/informacje/podglad/">
        <link rel="canonical" href="https://eureka.mf.gov.pl/informacje/wyszukiwanie?q=interpretacja">
        <link rel="stylesheet" href="/static/interpretacje.css">
        </head><body><p><a href="15">Piętnasta</a></p></body></html>"#;
    let out = run(html, 10);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].url, "https://eureka.mf.gov.pl/informacje/podglad/15");
    assert!(out.iter().all(|r| r.title != DEFAULT_TITLE));
}

struct StaticPage(String);

#[async_trait::async_trait]
impl PageSource for StaticPage {
    async fn acquire(&self, _query: &str) -> Result<PageCapture, SearchError> {
        Ok(PageCapture {
            url: base(),
            html: self.0.clone(),
        })
    }
}

#[tokio::test]
async fn floor_is_applied_before_the_limit() {
    let mut html = String::from("<ul>");
    for i in 0..8 {
        html.push_str(&format!(
            r#"<li><a href="/informacje/podglad/{i}">Stara {i}</a> 01.12.2023</li>"#
        ));
    }
    html.push_str(r#"<li><a href="/informacje/podglad/bez">Bez daty</a></li>"#);
    html.push_str(r#"<li><a href="/informacje/podglad/n1">Nowa 1</a> 01.02.2024</li>"#);
    html.push_str(r#"<li><a href="/informacje/podglad/n2">Nowa 2</a> 2024-03-01</li>"#);
    html.push_str("</ul>");

    let search = EurekaSearch::new(Arc::new(StaticPage(html)), ExtractOptions::default());
    let resp = search
        .search(&SearchRequest {
            query: "fundacja rodzinna".into(),
            limit: 2,
            date_from: Some("2024-01-01".into()),
        })
        .await
        .unwrap();

    assert_eq!(resp.count, 2);
    let titles: Vec<&str> = resp.results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Nowa 1", "Nowa 2"]);
}
