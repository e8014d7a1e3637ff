//! End-to-end report fetching against a mock API.

use std::time::Duration;

use chrono::NaiveDate;
use ercot_lib::{
    AuthConfig, ClientConfig, Credentials, CsvFormatter, DateRange, ErcotError, ReportClient,
    ReportQuery, ReportRegistry, TimeSlot,
};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

async fn client(server: &MockServer) -> ReportClient {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id_token": "tok" })))
        .mount(server)
        .await;

    let auth = AuthConfig {
        token_url: format!("{}/token", server.uri()),
        ..Default::default()
    };
    let config = ClientConfig {
        max_retries: 1,
        base_delay_ms: 0,
        page_delay: Duration::ZERO,
        ..Default::default()
    };
    ReportClient::connect_with(Credentials::new("user", "pass", "key"), auth, config)
        .await
        .unwrap()
}

async fn mount_report(server: &MockServer, report_path: &str, pages: &[Value]) {
    Mock::given(method("GET"))
        .and(path(report_path))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_meta": { "totalPages": pages.len() },
            "data": []
        })))
        .mount(server)
        .await;

    for (i, data) in pages.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path(report_path))
            .and(query_param("page", (i + 1).to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_meta": { "totalPages": pages.len() },
                "data": data
            })))
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_hub_report_normalizes_with_average() {
    let server = MockServer::start().await;
    let mut client = client(&server).await;
    let report = ReportRegistry::global()
        .get("rtm-spp-hub")
        .unwrap()
        .clone()
        .with_url(format!("{}/rtm", server.uri()));

    mount_report(
        &server,
        "/rtm",
        &[
            json!([
                ["2024-01-01", 1, 1, "HB_WEST", "HU", 10.0, false],
                ["2024-01-01", 1, 1, "LZ_WEST", "LZ", 99.0, false],
                ["2024-01-01", 1, 1, "HB_NORTH", "HU", 30.0, false]
            ]),
            json!([
                ["2024-01-01", 1, 2, "HB_WEST", "HU", 14.0, false],
                ["2024-01-01", 1, 1, "HB_WEST", "HU", 55.0, false]
            ]),
        ],
    )
    .await;

    let table = client
        .fetch_report(&report, &ReportQuery::day(day()))
        .await
        .unwrap();
    let grid = table.as_grid().unwrap();

    assert_eq!(grid.row_count(), 96);
    let names: Vec<&str> = grid.column_names().collect();
    assert_eq!(names, ["HB_WEST", "HB_NORTH", "HB_HUBAVG"]);

    let first = TimeSlot::new(day(), 0, 0);
    let second = TimeSlot::new(day(), 0, 15);
    assert_eq!(grid.value(&first, "HB_WEST"), Some(10.0));
    assert_eq!(grid.value(&first, "HB_HUBAVG"), Some(20.0));
    assert_eq!(grid.value(&second, "HB_HUBAVG"), Some(14.0));
    assert_eq!(grid.value(&TimeSlot::new(day(), 5, 0), "HB_HUBAVG"), None);
}

#[tokio::test]
async fn test_hub_average_requested_as_entity_round_trips() {
    let server = MockServer::start().await;
    let mut client = client(&server).await;
    let report = ReportRegistry::global()
        .get("rtm-spp-hub")
        .unwrap()
        .clone()
        .with_url(format!("{}/rtm", server.uri()));

    mount_report(
        &server,
        "/rtm",
        &[json!([
            ["2024-01-01", 1, 1, "HB_WEST", "HU", 10.0, false],
            ["2024-01-01", 1, 1, "HB_NORTH", "HU", "NaN", false]
        ])],
    )
    .await;

    let table = client
        .fetch_report(&report, &ReportQuery::day(day()).with_entity("HB_HUBAVG"))
        .await
        .unwrap();
    let grid = table.as_grid().unwrap();
    let names: Vec<&str> = grid.column_names().collect();
    assert_eq!(names, ["HB_WEST", "HB_NORTH", "HB_HUBAVG"]);
    assert_eq!(grid.value(&TimeSlot::new(day(), 0, 0), "HB_HUBAVG"), Some(10.0));

    let mut output = Vec::new();
    table.write(&CsvFormatter::new(), &mut output).unwrap();
    let text = String::from_utf8(output).unwrap();
    assert!(text.starts_with("Date,HE,Interval,HB_WEST,HB_NORTH,HB_HUBAVG\n"));
    assert!(text.contains("2024-01-01,0,0,10,,10\n"));

    let read = CsvFormatter::new().read_table(text.as_bytes()).unwrap();
    assert_eq!(Some(&read), table.as_grid());
}

#[tokio::test]
async fn test_grid_report_written_as_csv_reads_back() {
    let server = MockServer::start().await;
    let mut client = client(&server).await;
    let report = ReportRegistry::global()
        .get("dam-spp")
        .unwrap()
        .clone()
        .with_url(format!("{}/dam", server.uri()));

    let rows: Vec<Value> = (1..=24)
        .filter(|he| *he != 17)
        .map(|he| json!(["2024-01-01", format!("{he:02}:00"), "HB_WEST", f64::from(he) / 4.0, false]))
        .collect();
    mount_report(&server, "/dam", &[json!(rows)]).await;

    let table = client
        .fetch_report(&report, &ReportQuery::day(day()).with_entity("HB_WEST"))
        .await
        .unwrap();

    let mut output = Vec::new();
    table.write(&CsvFormatter::new(), &mut output).unwrap();
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("2024-01-01,16,\n"));

    let read = CsvFormatter::new().read_table(text.as_bytes()).unwrap();
    assert_eq!(Some(&read), table.as_grid());
}

#[tokio::test]
async fn test_flat_report_is_sorted() {
    let server = MockServer::start().await;
    let mut client = client(&server).await;
    let report = ReportRegistry::global()
        .get("dam-system-lambda")
        .unwrap()
        .clone()
        .with_url(format!("{}/lambda", server.uri()));

    mount_report(
        &server,
        "/lambda",
        &[json!([
            ["2024-01-01", "02:00", 21.0, false],
            ["2024-01-01", "01:00", 20.0, false]
        ])],
    )
    .await;

    let table = client
        .fetch_report(&report, &ReportQuery::day(day()))
        .await
        .unwrap();
    let records = table.as_records().unwrap();
    assert_eq!(records.columns(), ["Date", "HE", "System Lambda"]);
    let lambdas: Vec<f64> = records
        .column("System Lambda")
        .unwrap()
        .filter_map(ercot_lib::Cell::as_f64)
        .collect();
    assert_eq!(lambdas, [20.0, 21.0]);
}

#[tokio::test]
async fn test_unknown_report_id() {
    let server = MockServer::start().await;
    let mut client = client(&server).await;
    let query = ReportQuery::range(DateRange::between(day(), day()));
    let err = client
        .fetch_report_by_id("no-such-report", &query)
        .await
        .unwrap_err();
    assert!(matches!(err, ErcotError::UnknownReport(_)));
}

#[tokio::test]
async fn test_schema_change_surfaces_as_error() {
    let server = MockServer::start().await;
    let mut client = client(&server).await;
    let report = ReportRegistry::global()
        .get("dam-lmp")
        .unwrap()
        .clone()
        .with_url(format!("{}/lmp", server.uri()));

    mount_report(&server, "/lmp", &[json!([["2024-01-01", "01:00", "BUS1", 10.0]])]).await;

    let err = client
        .fetch_report(&report, &ReportQuery::day(day()))
        .await
        .unwrap_err();
    assert!(matches!(err, ErcotError::Schema(_)));
}
