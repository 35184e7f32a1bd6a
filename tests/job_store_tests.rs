//! Exercises the Job Store's REST command layer, including the year-based
//! deduplication `append_result` is required to provide.

use release_year_quiz::models::song::ResolvedSource;
use release_year_quiz::models::{JobStatus, ProcessedSong};
use release_year_quiz::services::JobStore;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn processed(year: &str) -> ProcessedSong {
    ProcessedSong {
        artist: "A".to_string(),
        title: "B".to_string(),
        spotify_url: "u".to_string(),
        current_release_date: "2000".to_string(),
        release_year: year.to_string(),
        release_month: "N/A".to_string(),
        release_day: "N/A".to_string(),
        source: ResolvedSource::Streaming,
        source_url: None,
        error: None,
    }
}

async fn respond_result(server: &MockServer, contains: &str, result: serde_json::Value) {
    Mock::given(method("POST"))
        .and(body_string_contains(contains))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "result": result })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn init_job_seeds_status_and_first_year() {
    let server = MockServer::start().await;
    respond_result(&server, "\"SET\"", serde_json::json!("OK")).await;
    respond_result(&server, "\"DEL\"", serde_json::json!(1)).await;
    respond_result(&server, "\"SADD\"", serde_json::json!(1)).await;
    respond_result(&server, "\"EXPIRE\"", serde_json::json!(1)).await;

    let store = JobStore::new(server.uri(), "token".to_string());
    store.init_job("job-1", "1994").await.unwrap();
}

#[tokio::test]
async fn append_result_skips_duplicate_years() {
    let server = MockServer::start().await;

    // First SADD call for a given year succeeds (new member); every
    // subsequent call for the same year reports it already present.
    respond_result(&server, "\"SADD\"", serde_json::json!(0)).await;
    Mock::given(method("POST"))
        .and(body_string_contains("\"SADD\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "result": 1 })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    respond_result(&server, "\"RPUSH\"", serde_json::json!(1)).await;
    respond_result(&server, "\"EXPIRE\"", serde_json::json!(1)).await;

    let store = JobStore::new(server.uri(), "token".to_string());

    let first = store.append_result("job-2", &processed("1971")).await.unwrap();
    let second = store.append_result("job-2", &processed("1971")).await.unwrap();

    assert!(first);
    assert!(!second);
}

#[tokio::test]
async fn get_status_parses_known_statuses() {
    let server = MockServer::start().await;
    respond_result(&server, "\"GET\"", serde_json::json!("processing")).await;

    let store = JobStore::new(server.uri(), "token".to_string());
    let status = store.get_status("job-3").await.unwrap();

    assert_eq!(status, Some(JobStatus::Processing));
}

#[tokio::test]
async fn list_results_deserializes_stored_entries() {
    let server = MockServer::start().await;
    let entry = serde_json::to_string(&processed("1971")).unwrap();
    respond_result(&server, "\"LRANGE\"", serde_json::json!([entry])).await;

    let store = JobStore::new(server.uri(), "token".to_string());
    let results = store.list_results("job-4", 0).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].release_year, "1971");
}
