//! Full stack (config, HTTP transport, query client, view models, export)
//! against a wiremock backend.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

use crate::{
    client::{AnalyticsService, QueryClient},
    config::AnalyticsConfig,
    export::{DirectorySink, ExportFormat, export_to},
    query::{QueryBuilder, QueryInput},
    reshape::retention_curve,
    view::{EventExplorer, ExplorerFilters},
};

fn config_for(server: &MockServer) -> AnalyticsConfig {
    AnalyticsConfig::from_str(&format!(
        r#"
        [api]
        base_url = "{}"

        [api.retry]
        max_retries = 2
        initial_delay_ms = 10
        max_delay_ms = 20
        jitter = 0.0
        "#,
        server.uri()
    ))
    .unwrap()
}

fn service_for(server: &MockServer) -> AnalyticsService {
    let config = config_for(server);
    let client = QueryClient::from_config(&config).unwrap();
    AnalyticsService::new(client, QueryBuilder::new(&config.defaults))
}

fn events_page(ids: &[&str], total: u64) -> Value {
    json!({
        "events": ids.iter().map(|id| json!({
            "id": id,
            "created_at": "2025-06-02T08:00:00Z",
            "companyName": "Acme",
            "type": "api_call",
            "content": "GET",
            "attribute": "read",
            "user": "alice",
            "endpoint": "/v1/items",
            "value": 1
        })).collect::<Vec<_>>(),
        "pagination": {
            "currentPage": 1, "totalPages": 1, "totalItems": total,
            "pageSize": 10, "hasNext": false, "hasPrev": false
        }
    })
}

#[tokio::test]
async fn test_concurrent_identical_requests_share_one_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/events"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(events_page(&["e1"], 1))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&server);
    let params = service.builder().build(&QueryInput::default());

    let (a, b) = tokio::join!(service.search_events(&params), service.search_events(&params));

    assert_eq!(a.data, b.data);
    assert_eq!(a.data.map(|r| r.events.len()), Some(1));
}

#[tokio::test]
async fn test_default_range_and_canonical_companies_on_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/events"))
        .and(query_param("startDate", "2025-06-01"))
        .and(query_param("endDate", "2025-07-22"))
        .and(query_param("companies", "Acme,Globex"))
        .and(query_param("page", "1"))
        .and(query_param("pageSize", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_page(&[], 0)))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&server);
    let params = service.builder().build(&QueryInput {
        companies: vec!["Globex".into(), "Acme".into()],
        ..Default::default()
    });

    let state = service.search_events(&params).await;
    assert!(state.is_success(), "unexpected state: {state:?}");
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/metrics"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "code": "INTERNAL", "message": "database unavailable" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&server);
    let filters = service.builder().filters(&QueryInput::default());
    let state = service.metrics(&filters).await;

    assert_eq!(state.data, None);
    assert_eq!(
        state.error.as_deref(),
        Some("Failed to fetch dashboard data: database unavailable")
    );
}

#[tokio::test]
async fn test_company_chart_sorted_and_filtered() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/trends/multi-company"))
        .and(query_param("companies", "Acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "timestamp": "2025-06-03", "Acme": 5, "Globex": 1 },
                { "timestamp": "2025-06-01", "Acme": 2 },
                { "timestamp": "2025-06-02", "Acme": 3, "Globex": 4 }
            ],
            "timeframe": "daily",
            "totalPoints": 3
        })))
        .mount(&server)
        .await;

    let service = service_for(&server);
    let params = service.builder().trends(
        &QueryInput {
            companies: vec!["Acme".into()],
            ..Default::default()
        },
        None,
        &[],
    );
    let chart = service.company_chart(&params).await.data.unwrap();

    let order: Vec<&str> = chart.rows.iter().map(|r| r.timestamp.as_str()).collect();
    assert_eq!(order, vec!["2025-06-01", "2025-06-02", "2025-06-03"]);
    assert_eq!(chart.totals.len(), 1);
    assert_eq!(chart.totals[0].name, "Acme");
    assert_eq!(chart.totals[0].value, 10.0);
}

#[tokio::test]
async fn test_retention_curve_from_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analytics/retention"))
        .and(query_param("cohortPeriod", "weekly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cohorts": [
                { "cohortDate": "2025-06-01", "totalUsers": 10, "retentionData": [
                    { "days": 1, "retentionRate": 80.0, "activeUsers": 8, "totalUsers": 10 },
                    { "days": 7, "retentionRate": 50.0, "activeUsers": 5, "totalUsers": 10 }
                ]},
                { "cohortDate": "2025-06-08", "totalUsers": 10, "retentionData": [
                    { "days": 1, "retentionRate": 90.0, "activeUsers": 9, "totalUsers": 10 }
                ]}
            ],
            "timePeriods": [1, 7],
            "totalCohorts": 2,
            "averageRetention": 73.3
        })))
        .mount(&server)
        .await;

    let service = service_for(&server);
    let params = service.builder().retention(
        &QueryInput::default(),
        None,
        Some(crate::query::CohortPeriod::Weekly),
        None,
    );
    let response = service.retention(&params).await.data.unwrap();
    let rows = retention_curve(&response.cohorts);

    assert_eq!(rows.iter().map(|r| r.days).collect::<Vec<_>>(), vec![1, 7]);
    assert_eq!(rows[0].rates.len(), 2);
    assert_eq!(rows[1].rates.len(), 1);
    assert_eq!(rows[1].rates["2025-06-01"], 50.0);
}

#[tokio::test]
async fn test_explorer_export_writes_csv() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_page(&["e1", "e2"], 2)))
        .mount(&server)
        .await;

    let explorer = EventExplorer::new(service_for(&server), Duration::from_millis(300));
    assert!(
        explorer
            .set_filters(ExplorerFilters {
                start_date: "2025-06-01".parse().ok(),
                end_date: "2025-07-22".parse().ok(),
                companies: vec!["Acme".into(), "Globex".into()],
            })
            .await
    );

    let tmp = tempfile::tempdir().unwrap();
    let sink = DirectorySink::new(tmp.path());
    let now = Utc.with_ymd_and_hms(2025, 7, 22, 14, 5, 9).unwrap();
    let artifact = export_to(&sink, &explorer.export_bundle(), ExportFormat::Csv, now, None)
        .await
        .unwrap();

    assert!(
        artifact
            .filename
            .contains("2025-06-01-to-2025-07-22-2-companies")
    );
    let written = std::fs::read_to_string(tmp.path().join(&artifact.filename)).unwrap();
    assert_eq!(written.lines().count(), 3);
    assert!(written.starts_with("\"ID\",\"Created At\""));
}
