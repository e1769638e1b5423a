use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wikirank::{api, Config, HtmlParser, InMemoryFetcher, NullArtifactStore, RankingService};

fn page(body: &str, link: &str) -> String {
    format!(r#"<html><body><p>{}</p><a href="{}">x</a></body></html>"#, body, link)
}

fn service() -> Arc<RankingService> {
    let fetcher = InMemoryFetcher::new()
        .with_page("/wiki/Doc_A", "Doc A - Wikipedia", &page("the cat sat", "/wiki/Doc_B"))
        .with_page("/wiki/Doc_B", "Doc B - Wikipedia", &page("the dog sat", "/wiki/Doc_A"));
    let config = Config {
        seed: "/wiki/Doc_A".to_string(),
        ..Config::default()
    };
    Arc::new(RankingService::new(
        config,
        Arc::new(fetcher),
        Arc::new(HtmlParser::default()),
        Arc::new(NullArtifactStore),
    ))
}

async fn loaded_app() -> Router {
    let service = service();
    service.load().await.unwrap();
    api::create_router(service)
}

async fn post_search(app: Router, body: Value) -> (StatusCode, Value) {
    let req = Request::post("/search")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let app = loaded_app().await;

    let (status, json) = post_search(app, json!({ "query": "Cat", "mode": "basic" })).await;
    assert_eq!(status, StatusCode::OK);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"], "Doc_A");
    assert_eq!(results[0]["link"], "/wiki/Doc_A");
    assert_eq!(results[0]["score"].as_f64(), Some(1.0));
    assert_eq!(results[0]["pageRank"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn advanced_mode_reports_page_rank() {
    let app = loaded_app().await;

    let (status, json) = post_search(app, json!({ "query": "dog", "mode": "advanced" })).await;
    assert_eq!(status, StatusCode::OK);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results[0]["name"], "Doc_B");
    assert_eq!(results[0]["pageRank"].as_f64(), Some(1.0));
}

#[tokio::test]
async fn limit_truncates_after_ranking() {
    let app = loaded_app().await;

    let (status, json) =
        post_search(app, json!({ "query": "sat", "mode": "medium", "limit": 1 })).await;
    assert_eq!(status, StatusCode::OK);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"], "Doc_A");
}

#[tokio::test]
async fn validation_errors_are_bad_requests() {
    let app = loaded_app().await;

    let (status, json) = post_search(app.clone(), json!({ "query": "the cat", "mode": "basic" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Query must contain only one word.");

    let (status, json) = post_search(app.clone(), json!({ "query": "cat", "mode": "fuzzy" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Search mode fuzzy is missing or not supported.");

    let (status, json) = post_search(app, json!({ "mode": "medium" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Query is missing.");
}

#[tokio::test]
async fn queries_before_load_are_unavailable() {
    let app = api::create_router(service());

    let (status, _) = post_search(app.clone(), json!({ "query": "cat" })).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let req = Request::get("/health").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "LOADING");
}

#[tokio::test]
async fn stats_reflect_loaded_corpus() {
    let app = loaded_app().await;

    let req = Request::get("/stats").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["loaded"], true);
    assert_eq!(json["total_documents"], 2);
    assert_eq!(json["total_links"], 2);
}

async fn read_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn failed_load_is_reported() {
    let config = Config {
        seed: "/wiki/Missing".to_string(),
        ..Config::default()
    };
    let service = Arc::new(RankingService::new(
        config,
        Arc::new(InMemoryFetcher::new()),
        Arc::new(HtmlParser::default()),
        Arc::new(NullArtifactStore),
    ));
    assert!(service.load().await.is_err());
    let app = api::create_router(service);

    let req = Request::get("/health").body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = read_json(resp).await;
    assert_eq!(json["status"], "FAILED");
    assert!(json["error"].as_str().unwrap().contains("/wiki/Missing"));

    let (status, json) = post_search(app, json!({ "query": "cat" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = json["error"].as_str().unwrap();
    assert!(error.starts_with("Search index failed to load: Crawl failed"));
}

#[tokio::test]
async fn malformed_bodies_get_json_errors() {
    let app = loaded_app().await;

    let (status, json) = post_search(app.clone(), json!({ "query": "cat", "mode": 5 })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("mode"));

    let req = Request::post("/search")
        .body(Body::from(json!({ "query": "cat" }).to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(read_json(resp).await["error"].is_string());

    let req = Request::post("/search")
        .header("content-type", "application/json")
        .body(Body::from("{\"query\": "))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(read_json(resp).await["error"].is_string());
}
