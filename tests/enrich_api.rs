use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use company_enricher::{
    api::routes::create_router,
    config::Config,
    pipeline::Pipeline,
    AppState,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    addr: SocketAddr,
    scrape: MockServer,
    model: MockServer,
    http: reqwest::Client,
}

impl Harness {
    async fn start() -> Self {
        let scrape = MockServer::start().await;
        let model = MockServer::start().await;

        let config = Config::from_lookup(|key| match key {
            "FIRECRAWL_API_KEY" => Some("fc-test".to_string()),
            "AI_GATEWAY_API_KEY" => Some("ai-test".to_string()),
            "FIRECRAWL_BASE_URL" => Some(scrape.uri()),
            "AI_GATEWAY_BASE_URL" => Some(model.uri()),
            "HTTP_TIMEOUT_SECS" => Some("5".to_string()),
            _ => None,
        })
        .unwrap();

        let state = AppState {
            pipeline: Arc::new(Pipeline::new(&config).unwrap()),
        };
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });

        Self {
            addr,
            scrape,
            model,
            http: reqwest::Client::new(),
        }
    }

    async fn enrich(&self, body: Value) -> (u16, Value) {
        let response = self
            .http
            .post(format!("http://{}/api/enrich", self.addr))
            .json(&body)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }
}

fn enrichment() -> Value {
    json!({
        "summary": "Acme builds reusable rockets for small satellites.",
        "what_they_do": ["Launch services", "Satellite integration", "Mission planning"],
        "keywords": ["space", "launch", "aerospace", "hardware", "b2b"],
        "signals": [
            { "signal": "Careers page", "detected": true, "details": "Hiring engineers" },
            { "signal": "Pricing page", "detected": true }
        ],
        "sources": ["https://acme.com/about", "https://acme.com/pricing", "https://acme.com/careers"]
    })
}

fn tool_reply(arguments: &Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "tool_calls": [{
                    "type": "function",
                    "function": { "name": "enrich_company", "arguments": arguments.to_string() }
                }]
            }
        }]
    }))
}

/// 50 links: three same-origin topic pages spread among noise.
fn primary_links() -> Vec<String> {
    let mut links: Vec<String> = (0..47).map(|i| format!("https://acme.com/item/{}", i)).collect();
    links.insert(5, "https://acme.com/about".to_string());
    links.insert(20, "https://twitter.com/acme/about".to_string());
    links.insert(30, "https://acme.com/pricing".to_string());
    links.insert(45, "https://acme.com/careers".to_string());
    links.truncate(50);
    links
}

async fn mount_primary(harness: &Harness, content: &str, links: Vec<String>) {
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({ "url": "https://acme.com", "onlyMainContent": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "markdown": content, "links": links }
        })))
        .expect(1)
        .mount(&harness.scrape)
        .await;
}

async fn mount_subpage(harness: &Harness, url: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({ "url": url, "onlyMainContent": true })))
        .respond_with(response)
        .expect(1)
        .mount(&harness.scrape)
        .await;
}

fn page(markdown: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": { "markdown": markdown } }))
}

#[tokio::test]
async fn scenario_a_full_enrichment() {
    let harness = Harness::start().await;
    mount_primary(&harness, "Acme home page", primary_links()).await;
    // The slowest subpage is first; it must still come first in the corpus
    mount_subpage(&harness, "https://acme.com/about", page("ABOUT-TEXT").set_delay(Duration::from_millis(150))).await;
    mount_subpage(&harness, "https://acme.com/pricing", page("PRICING-TEXT")).await;
    mount_subpage(&harness, "https://acme.com/careers", page("CAREERS-TEXT")).await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Acme home page"))
        .and(body_string_contains("https://acme.com/item/0"))
        .respond_with(tool_reply(&enrichment()))
        .expect(1)
        .mount(&harness.model)
        .await;

    let (status, body) = harness.enrich(json!({ "website": "acme.com" })).await;

    assert_eq!(status, 200);
    assert_eq!(body, json!({ "success": true, "data": enrichment() }));

    let requests = harness.model.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let user_message = sent["messages"][1]["content"].as_str().unwrap();
    let about = user_message.find("--- PAGE: https://acme.com/about ---").unwrap();
    let pricing = user_message.find("--- PAGE: https://acme.com/pricing ---").unwrap();
    let careers = user_message.find("--- PAGE: https://acme.com/careers ---").unwrap();
    assert!(user_message.find("Acme home page").unwrap() < about);
    assert!(about < pricing && pricing < careers);
    assert!(user_message.contains("Website: https://acme.com"));
    assert_eq!(sent["tool_choice"]["function"]["name"], "enrich_company");
}

#[tokio::test]
async fn scenario_b_empty_website_is_rejected_before_io() {
    let harness = Harness::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&harness.scrape).await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&harness.model).await;

    let (status, body) = harness.enrich(json!({ "website": "" })).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "website is required" }));

    let (status, _) = harness.enrich(json!({})).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn scenario_c_primary_scrape_failure() {
    let harness = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&harness.scrape)
        .await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&harness.model).await;

    let (status, body) = harness.enrich(json!({ "website": "acme.com" })).await;

    assert_eq!(status, 502);
    assert_eq!(body, json!({ "error": "Failed to scrape website (503)" }));
}

#[tokio::test]
async fn scenario_d_all_subpages_fail() {
    let harness = Harness::start().await;
    let links = vec![
        "https://acme.com/about".to_string(),
        "https://acme.com/blog".to_string(),
        "https://acme.com/jobs".to_string(),
        "https://acme.com/team".to_string(),
        "https://acme.com/docs".to_string(),
    ];
    mount_primary(&harness, "PRIMARY-ONLY", links).await;
    for url in ["https://acme.com/about", "https://acme.com/blog", "https://acme.com/jobs", "https://acme.com/team"] {
        mount_subpage(&harness, url, ResponseTemplate::new(500)).await;
    }

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("PRIMARY-ONLY"))
        .respond_with(tool_reply(&enrichment()))
        .expect(1)
        .mount(&harness.model)
        .await;

    let (status, body) = harness.enrich(json!({ "website": "https://acme.com" })).await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], json!(true));

    let requests = harness.model.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let user_message = sent["messages"][1]["content"].as_str().unwrap();
    assert!(!user_message.contains("--- PAGE:"));
}

#[tokio::test]
async fn scenario_e_rate_limited_is_not_retried() {
    let harness = Harness::start().await;
    mount_primary(&harness, "Acme", Vec::new()).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&harness.model)
        .await;

    let (status, body) = harness.enrich(json!({ "website": "acme.com" })).await;

    assert_eq!(status, 429);
    assert_eq!(body, json!({ "error": "Rate limit exceeded. Please try again later." }));
}

#[tokio::test]
async fn schema_violation_maps_to_bad_gateway() {
    let harness = Harness::start().await;
    mount_primary(&harness, "Acme", Vec::new()).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Acme makes rockets." } }]
        })))
        .expect(1)
        .mount(&harness.model)
        .await;

    let (status, body) = harness.enrich(json!({ "website": "acme.com" })).await;

    assert_eq!(status, 502);
    assert_eq!(body, json!({ "error": "AI did not return structured data" }));
}

#[tokio::test]
async fn malformed_body_is_invalid_input() {
    let harness = Harness::start().await;
    let response = harness
        .http
        .post(format!("http://{}/api/enrich", harness.addr))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn preflight_is_answered_permissively() {
    let harness = Harness::start().await;
    let response = harness
        .http
        .request(reqwest::Method::OPTIONS, format!("http://{}/api/enrich", harness.addr))
        .header("origin", "https://app.example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type, authorization")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
    assert!(response.headers().contains_key("access-control-allow-methods"));
}
