//! Integration tests for the batched fetch pipeline, against a mock registry
use arca_registry::{limiter, EntrezClient, FetchError, FetchMode, RecordFetcher};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Minimal flat-file entry accepted by the record parser
fn gb_entry(accession: &str) -> String {
    format!(
        "LOCUS       {acc}                 8 bp    DNA     linear   VRT 01-JAN-2022\n\
         DEFINITION  test record.\n\
         ACCESSION   {acc}\n\
         VERSION     {acc}.1\n\
         ORIGIN\n\
        \x20       1 acgtacgt\n\
         //\n",
        acc = accession
    )
}

fn fetcher_for(server: &MockServer) -> RecordFetcher {
    let client = EntrezClient::new(server.uri(), limiter::unthrottled()).unwrap();
    RecordFetcher::new(client).with_cooldown(Duration::ZERO)
}

fn accessions(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_batch_ceiling_fails_before_any_network_interaction() {
    let server = MockServer::start().await;
    let fetcher = fetcher_for(&server).with_limits(1500, 300);

    let many: Vec<String> = (0..1501).map(|i| format!("AB{:05}", i)).collect();
    let err = fetcher
        .fetch(&many, None, FetchMode::Strict)
        .await
        .unwrap_err();

    match err {
        FetchError::AccessionLimitExceeded { requested, max } => {
            assert_eq!(requested, 1501);
            assert_eq!(max, 1500);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_accessions_are_deduplicated_before_dispatch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", "A1,A2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("{}{}", gb_entry("A1"), gb_entry("A2"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let records = fetcher
        .fetch(&accessions(&["A1", "A1", "A2", "A1"]), None, FetchMode::Strict)
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].accession, "A1");
    assert_eq!(records[1].accession, "A2");
}

#[tokio::test]
async fn test_requests_are_split_into_fixed_size_batches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(gb_entry("A1")))
        .expect(3)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server).with_limits(1500, 2);
    let records = fetcher
        .fetch(
            &accessions(&["A1", "A2", "A3", "A4", "A5"]),
            None,
            FetchMode::Lenient,
        )
        .await
        .unwrap();

    // one (identical) record per batch response
    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn test_missing_accessions_fail_in_strict_mode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(gb_entry("A1")))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let err = fetcher
        .fetch(&accessions(&["A1", "A2"]), None, FetchMode::Strict)
        .await
        .unwrap_err();

    match err {
        FetchError::InsufficientData { missing } => assert_eq!(missing, vec!["A2"]),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_accessions_pass_in_lenient_mode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(gb_entry("A1")))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let records = fetcher
        .fetch(&accessions(&["A1", "A2"]), None, FetchMode::Lenient)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].accession, "A1");
}

#[tokio::test]
async fn test_bad_request_status_classifies_as_insufficient_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let err = fetcher
        .fetch(&accessions(&["A1", "A2"]), None, FetchMode::Strict)
        .await
        .unwrap_err();

    match err {
        FetchError::InsufficientData { missing } => assert_eq!(missing, vec!["A1", "A2"]),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_classifies_as_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let err = fetcher
        .fetch(&accessions(&["A1"]), None, FetchMode::Strict)
        .await
        .unwrap_err();

    match err {
        FetchError::RegistryConnection { accessions, term } => {
            assert_eq!(accessions, vec!["A1"]);
            assert_eq!(term, None);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_search_count_above_ceiling_fails_before_data_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "esearchresult": {"count": "2000", "webenv": "W1", "querykey": "1"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server).with_limits(1500, 300);
    let err = fetcher
        .fetch(&[], Some("Poeciliidae COI"), FetchMode::Strict)
        .await
        .unwrap_err();

    match err {
        FetchError::AccessionLimitExceeded { requested, max } => {
            assert_eq!(requested, 2000);
            assert_eq!(max, 1500);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_search_results_are_paginated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "esearchresult": {"count": "3", "webenv": "W1", "querykey": "1"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("WebEnv", "W1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(gb_entry("S1")))
        .expect(2)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server).with_limits(1500, 2);
    let records = fetcher
        .fetch(&[], Some("Poeciliidae COI"), FetchMode::Lenient)
        .await
        .unwrap();

    // one (identical) record per page response
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_empty_query_is_rejected() {
    let server = MockServer::start().await;
    let fetcher = fetcher_for(&server);

    let err = fetcher.fetch(&[], None, FetchMode::Strict).await.unwrap_err();
    assert!(matches!(err, FetchError::EmptyQuery));

    // a blank search term does not count as a query either
    let err = fetcher
        .fetch(&[], Some("   "), FetchMode::Strict)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::EmptyQuery));
}

#[tokio::test]
async fn test_deadline_aborts_slow_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(gb_entry("A1"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let err = fetcher
        .fetch_with_deadline(
            &accessions(&["A1"]),
            None,
            FetchMode::Strict,
            Duration::from_millis(50),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::DeadlineExceeded(_)));
}
