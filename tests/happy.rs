use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, TimeZone, Utc};
use repo_insight_app::Args;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MAX_PAGE_SIZE: usize = 100;
const REPO_URL: &str = "https%3A%2F%2Fgithub.com%2Facme%2Fwidgets%2Ftree%2Fmain";

fn app(server: &MockServer, max_commit_pages: Option<u32>) -> Router {
    let args = Args {
        listen: "127.0.0.1:0".parse().unwrap(),
        api_url: server.uri(),
        user_agent: "repo-insight-tests".to_string(),
        request_timeout: Some(5),
        max_commit_pages,
    };
    repo_insight_app::router(repo_insight_app::insight(&args).unwrap())
}

async fn post(app: &Router, route: &str, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(route)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn repo_info() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets"))
        .and(header("Accept", "application/vnd.github+json"))
        .and(header("User-Agent", "repo-insight-tests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "widgets",
            "full_name": "acme/widgets",
            "stargazers_count": 1234,
            "html_url": "https://github.com/acme/widgets"
        })))
        .expect(2)
        .mount(&server)
        .await;
    let app = app(&server, None);

    let (status, first) = post(&app, "/get_repo_info", format!("repo_url={}", REPO_URL)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        first,
        json!({
            "name": "widgets",
            "description": "no description",
            "stars": 1234,
            "url": "https://github.com/acme/widgets"
        })
    );

    let (_, second) = post(&app, "/get_repo_info", format!("repo_url={}", REPO_URL)).await;
    assert_eq!(first, second, "Unchanged upstream state should give identical answers");
}

#[tokio::test]
async fn input_errors() {
    let server = MockServer::start().await;
    let app = app(&server, None);

    for route in ["/get_repo_info", "/search_commits", "/get_issues_stats", "/get_commit_frequency"] {
        let (status, body) = post(&app, route, String::new()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", route);
        assert_eq!(body, json!({ "error": "Repository URL is required" }));

        let (status, body) = post(&app, route, "repo_url=https%3A%2F%2Fgithub.com%2Facme".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", route);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid repository URL"));
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn body_without_form_content_type_is_missing_input() {
    let server = MockServer::start().await;
    let app = app(&server, None);

    for route in ["/get_repo_info", "/search_commits", "/get_issues_stats", "/get_commit_frequency"] {
        let request = Request::builder().method("POST").uri(route).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", route);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Repository URL is required" }));
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn upstream_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/broken"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/odd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "odd" })))
        .mount(&server)
        .await;
    let app = app(&server, None);

    let (status, body) = post(&app, "/get_repo_info", "repo_url=https://github.com/acme/missing".into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Not Found" }));

    let (status, body) = post(&app, "/get_repo_info", "repo_url=https://github.com/acme/broken".into()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch data" }));

    let (status, body) = post(&app, "/get_repo_info", "repo_url=https://github.com/acme/odd".into()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("Error: "));
}

fn commit_json(index: usize, date: &str) -> Value {
    json!({
        "sha": format!("{:040x}", index),
        "html_url": format!("https://github.com/acme/widgets/commit/{:040x}", index),
        "commit": {
            "message": format!("change {}", index),
            "author": { "name": "Ada", "date": date },
            "committer": { "name": "GitHub", "date": date }
        }
    })
}

#[tokio::test]
async fn search_commits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/commits"))
        .and(query_param("q", "repo:acme/widgets fix bug"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "items": [commit_json(1, "2024-01-15T10:00:00Z")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/commits"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            commit_json(2, "2024-01-16T10:00:00Z"),
            { "sha": "abc", "commit": {} }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    let app = app(&server, None);

    let (status, body) = post(
        &app,
        "/search_commits",
        format!("repo_url={}&search_phrase=fix+bug", REPO_URL),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "commits": [{
            "sha": "0000000",
            "message": "change 1",
            "author": "Ada",
            "date": "2024-01-15 10:00:00",
            "url": format!("https://github.com/acme/widgets/commit/{:040x}", 1)
        }]})
    );

    let (status, body) = post(&app, "/search_commits", format!("repo_url={}&search_phrase=", REPO_URL)).await;
    assert_eq!(status, StatusCode::OK);
    let commits = body["commits"].as_array().unwrap();
    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0]["date"], "2024-01-16 10:00:00");
    assert_eq!(
        commits[1],
        json!({ "sha": "abc", "message": "", "author": "unknown", "date": "", "url": "" })
    );
}

#[tokio::test]
async fn issues_stats() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/issues"))
        .and(query_param("state", "open"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "labels": [{ "name": "bug" }] },
            { "labels": [{ "name": "feature" }], "pull_request": { "url": "https://api.github.com/pulls/2" } }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/issues"))
        .and(query_param("state", "closed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "labels": [] }])))
        .mount(&server)
        .await;
    let app = app(&server, None);

    let (status, body) = post(&app, "/get_issues_stats", format!("repo_url={}", REPO_URL)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "labels": {
            "bug": { "open": 1, "closed": 0 },
            "no label": { "open": 0, "closed": 1 }
        }})
    );
}

#[tokio::test]
async fn issues_stats_fail_with_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/issues"))
        .and(query_param("state", "open"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/issues"))
        .and(query_param("state", "closed"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let app = app(&server, None);

    let (status, body) = post(&app, "/get_issues_stats", format!("repo_url={}", REPO_URL)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch data" }));
}

/// Mounts `commit_count` daily commits starting 2024-01-01, newest page first like GitHub,
/// followed by an empty page.
async fn mock_history(server: &MockServer, commit_count: usize) {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let commits: Vec<Value> = (0..commit_count)
        .rev()
        .map(|day| commit_json(day, &(start + Duration::days(day as i64)).to_rfc3339()))
        .collect();
    let pages: Vec<&[Value]> = commits.chunks(MAX_PAGE_SIZE).collect();
    for page in 0..=pages.len() {
        let body = pages.get(page).map(|page| page.to_vec()).unwrap_or_default();
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/commits"))
            .and(query_param("page", format!("{}", page + 1)))
            .and(query_param("per_page", format!("{}", MAX_PAGE_SIZE)))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(body)))
            .expect(1)
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn commit_frequency_by_month() {
    let server = MockServer::start().await;
    // 2024-01-01 ..= 2024-09-06
    mock_history(&server, 250).await;
    let app = app(&server, None);

    let (status, body) = post(
        &app,
        "/get_commit_frequency",
        format!(
            "repo_url={}&group_by=month&date_from=2024-02-01&date_to=2024-03-31T23%3A59%3A59Z",
            REPO_URL
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "2024-02": 29, "2024-03": 31 }));
}

#[tokio::test]
async fn commit_frequency_conserves_counts() {
    let server = MockServer::start().await;
    mock_history(&server, 250).await;
    let app = app(&server, None);

    let (status, body) = post(
        &app,
        "/get_commit_frequency",
        format!("repo_url={}&group_by=week&date_from=not+a+date", REPO_URL),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let histogram = body.as_object().unwrap();
    let total: u64 = histogram.values().map(|count| count.as_u64().unwrap()).sum();
    assert_eq!(total, 250, "Unparsable bound should fall back to the full range");
    assert_eq!(histogram.keys().next().map(String::as_str), Some("2024-W01"));
    let keys: Vec<&String> = histogram.keys().collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[tokio::test]
async fn commit_frequency_page_ceiling() {
    let server = MockServer::start().await;
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let page: Vec<Value> = (0..MAX_PAGE_SIZE)
        .map(|minute| commit_json(minute, &(start + Duration::minutes(minute as i64)).to_rfc3339()))
        .collect();
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/commits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(page)))
        .expect(3)
        .mount(&server)
        .await;
    let app = app(&server, Some(3));

    let (status, body) = post(&app, "/get_commit_frequency", format!("repo_url={}&group_by=year", REPO_URL)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "2024": 300 }));
}

#[tokio::test]
async fn commit_frequency_aborts_on_failed_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/commits"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([commit_json(1, "2024-01-15T10:00:00Z")])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/commits"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Git Repository is empty." })))
        .mount(&server)
        .await;
    let app = app(&server, None);

    let (status, body) = post(&app, "/get_commit_frequency", format!("repo_url={}", REPO_URL)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Git Repository is empty." }));
}

#[tokio::test]
async fn index_page() {
    let server = MockServer::start().await;
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app(&server, None).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("/get_commit_frequency"));
}
