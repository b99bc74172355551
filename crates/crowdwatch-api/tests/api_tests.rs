//! Integration tests for the Crowdwatch API endpoints.
//!
//! Tests start a real server on an ephemeral loopback port and talk to it
//! over raw TCP, so they cover the accept loop, request parsing, routing,
//! the store, and the response envelope end to end.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;

use crowdwatch_api::{spawn_server, MetricsStore, ServerConfig, StoreConfig};
use crowdwatch_types::{Priority, Recommendation, RecommendationId, ZoneId, ZoneMetric};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const NOT_FOUND: &str = r#"{"error":"Not Found","message":"The requested endpoint does not exist"}"#;

struct RawResponse {
    status_line: String,
    headers: Vec<String>,
    body: String,
}

impl RawResponse {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }

    fn header(&self, name: &str) -> Option<&str> {
        let prefix = format!("{name}: ");
        self.headers
            .iter()
            .find_map(|h| h.strip_prefix(prefix.as_str()))
    }
}

fn loopback_config(max_connections: usize) -> ServerConfig {
    ServerConfig {
        host: String::from("127.0.0.1"),
        port: 0,
        backlog: 128,
        max_connections,
    }
}

fn start(store: MetricsStore, max_connections: usize) -> SocketAddr {
    let server = spawn_server(&loopback_config(max_connections), Arc::new(store)).unwrap();
    server.local_addr
}

async fn start_seeded() -> SocketAddr {
    let store = MetricsStore::default();
    store.initialize().await.unwrap();
    start(store, 0)
}

async fn send_raw(addr: SocketAddr, request: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();
    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await.unwrap();
    String::from_utf8(reply).unwrap()
}

async fn get(addr: SocketAddr, path: &str) -> RawResponse {
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n");
    parse_response(&send_raw(addr, request.as_bytes()).await)
}

fn parse_response(raw: &str) -> RawResponse {
    let (head, body) = raw.split_once("\r\n\r\n").unwrap();
    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap().to_owned();
    RawResponse {
        status_line,
        headers: lines.map(str::to_owned).collect(),
        body: body.to_owned(),
    }
}

fn metric(zone: &str, people_count: u32, density: f64, trend: f64, timestamp: i64) -> ZoneMetric {
    ZoneMetric {
        zone_id: ZoneId::parse(zone).unwrap(),
        people_count,
        density,
        trend,
        timestamp,
    }
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_health() {
    let addr = start_seeded().await;
    let response = get(addr, "/api/v1/health").await;

    assert_eq!(response.status_line, "HTTP/1.1 200 OK");
    assert!(response.body.contains(r#""status":"healthy""#));
    let json = response.json();
    assert_eq!(json["service"], "api-server");
    assert_eq!(json["version"], "1.0.0");
    assert!(json["timestamp"].is_i64());
}

#[tokio::test]
async fn test_envelope_headers() {
    let addr = start_seeded().await;
    let response = get(addr, "/api/v1/health").await;

    assert_eq!(response.header("Content-Type"), Some("application/json"));
    assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
    assert_eq!(response.header("Connection"), Some("close"));
    let length: usize = response.header("Content-Length").unwrap().parse().unwrap();
    assert_eq!(length, response.body.len());
}

#[tokio::test]
async fn test_zone_metrics_exact_body() {
    let store = MetricsStore::default();
    store
        .initialize_with(
            vec![metric("zone-entrance-1", 42, 0.028, 0.15, 1_700_000_000)],
            Vec::new(),
        )
        .await
        .unwrap();
    let addr = start(store, 0);

    let response = get(addr, "/api/v1/zone/zone-entrance-1/metrics").await;
    assert_eq!(response.status_line, "HTTP/1.1 200 OK");
    assert_eq!(
        response.body,
        r#"{"zone_id":"zone-entrance-1","metrics":[{"timestamp":1700000000,"people_count":42,"density":0.028,"trend":0.15}]}"#
    );
}

#[tokio::test]
async fn test_zone_metrics_only_matching_zone_in_order() {
    let store = MetricsStore::default();
    store
        .initialize_with(
            vec![
                metric("zone-a", 1, 0.001, 0.0, 10),
                metric("zone-b", 2, 0.002, 0.0, 11),
                metric("zone-a", 3, 0.003, 0.0, 12),
                metric("zone-A", 4, 0.004, 0.0, 13),
            ],
            Vec::new(),
        )
        .await
        .unwrap();
    let addr = start(store, 0);

    let json = get(addr, "/api/v1/zone/zone-a/metrics").await.json();
    let timestamps: Vec<i64> = json["metrics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["timestamp"].as_i64().unwrap())
        .collect();
    assert_eq!(timestamps, vec![10, 12]);
}

#[tokio::test]
async fn test_unknown_zone_is_empty_200() {
    let addr = start_seeded().await;
    let response = get(addr, "/api/v1/zone/unknown-zone/metrics").await;

    assert_eq!(response.status_line, "HTTP/1.1 200 OK");
    assert_eq!(response.body, r#"{"zone_id":"unknown-zone","metrics":[]}"#);

    // Other endpoints are unaffected.
    assert_eq!(get(addr, "/api/v1/heatmap").await.status_line, "HTTP/1.1 200 OK");
    assert_eq!(
        get(addr, "/api/v1/recommendations").await.status_line,
        "HTTP/1.1 200 OK"
    );
}

#[tokio::test]
async fn test_heatmap() {
    let addr = start_seeded().await;
    let json = get(addr, "/api/v1/heatmap").await.json();

    let tiles = json["heatmap"].as_array().unwrap();
    assert_eq!(tiles.len(), 4);
    assert!(json["timestamp"].is_i64());
}

#[tokio::test]
async fn test_recommendations_count_and_order() {
    let recs: Vec<Recommendation> = ["rec-b", "rec-a", "rec-c"]
        .iter()
        .map(|id| Recommendation {
            id: RecommendationId::new(*id),
            zone_id: ZoneId::parse("zone-gate-b").unwrap(),
            kind: String::from("reroute_staff"),
            priority: Priority::Medium,
            message: String::from("Send \"two\" stewards"),
            people_count: 10,
            threshold: 0.25,
            trend: 0.1,
            density: 0.05,
            staff_count: 2,
            timestamp: 5,
        })
        .collect();
    let store = MetricsStore::default();
    store.initialize_with(Vec::new(), recs).await.unwrap();
    let addr = start(store, 0);

    let json = get(addr, "/api/v1/recommendations").await.json();
    let items = json.as_array().unwrap();
    let ids: Vec<&str> = items.iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["rec-b", "rec-a", "rec-c"]);
    assert_eq!(json[0]["message"], "Send \"two\" stewards");
    assert_eq!(json[0]["type"], "reroute_staff");
    assert_eq!(json[0]["priority"], "medium");
    assert_eq!(json[0]["staff_count"], 2);
}

#[tokio::test]
async fn test_unknown_route_404() {
    let addr = start_seeded().await;
    let response = get(addr, "/api/v1/unknown").await;

    assert_eq!(response.status_line, "HTTP/1.1 404 Not Found");
    assert_eq!(response.body, NOT_FOUND);
}

#[tokio::test]
async fn test_trailing_slash_and_query_are_404() {
    let addr = start_seeded().await;
    for path in [
        "/api/v1/health/",
        "/api/v1/health?full=1",
        "/api/v1/zone/zone-entrance-1/metrics/",
        "/api/v1/zone/zone-entrance-1/metrics?limit=1",
    ] {
        let response = get(addr, path).await;
        assert_eq!(response.status_line, "HTTP/1.1 404 Not Found", "path {path}");
        assert_eq!(response.body, NOT_FOUND);
    }
}

#[tokio::test]
async fn test_malformed_request_line_400() {
    let addr = start_seeded().await;
    let response = parse_response(&send_raw(addr, b"NONSENSE\r\n\r\n").await);

    assert_eq!(response.status_line, "HTTP/1.1 400 Bad Request");
    assert_eq!(response.json()["error"], "Bad Request");
}

#[tokio::test]
async fn test_client_disconnect_gets_no_response() {
    let addr = start_seeded().await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.shutdown().await.unwrap();
    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await.unwrap();
    assert!(reply.is_empty());

    // The server keeps accepting after a disconnect.
    assert_eq!(get(addr, "/api/v1/health").await.status_line, "HTTP/1.1 200 OK");
}

#[tokio::test]
async fn test_one_request_per_connection() {
    let addr = start_seeded().await;
    let pipelined = b"GET /api/v1/health HTTP/1.1\r\n\r\nGET /api/v1/heatmap HTTP/1.1\r\n\r\n";
    let reply = send_raw(addr, pipelined).await;

    assert_eq!(reply.matches("HTTP/1.1 ").count(), 1);
    assert!(reply.contains(r#""status":"healthy""#));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_identical_bodies() {
    let store = MetricsStore::new(StoreConfig::default());
    store
        .initialize_with(
            vec![
                metric("zone-hot", 10, 0.010, 0.10, 1),
                metric("zone-cold", 1, 0.001, -0.10, 2),
                metric("zone-hot", 20, 0.020, 0.20, 3),
            ],
            Vec::new(),
        )
        .await
        .unwrap();
    let addr = start(store, 0);

    let tasks: Vec<_> = (0..64)
        .map(|_| tokio::spawn(async move { get(addr, "/api/v1/zone/zone-hot/metrics").await.body }))
        .collect();

    let mut bodies = Vec::with_capacity(tasks.len());
    for task in tasks {
        bodies.push(task.await.unwrap());
    }

    let expected = concat!(
        r#"{"zone_id":"zone-hot","metrics":["#,
        r#"{"timestamp":1,"people_count":10,"density":0.010,"trend":0.10},"#,
        r#"{"timestamp":3,"people_count":20,"density":0.020,"trend":0.20}]}"#
    );
    assert!(bodies.iter().all(|b| b == expected));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reads_during_appends() {
    let store = Arc::new(MetricsStore::default());
    store.initialize_with(Vec::new(), Vec::new()).await.unwrap();
    let server = spawn_server(&loopback_config(0), Arc::clone(&store)).unwrap();
    let addr = server.local_addr;

    let writer = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            for i in 0..32_u32 {
                store
                    .record_metric(metric("zone-live", i, 0.5, 0.25, i64::from(i)))
                    .await
                    .unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..32)
        .map(|_| tokio::spawn(async move { get(addr, "/api/v1/zone/zone-live/metrics").await.json() }))
        .collect();

    writer.await.unwrap();
    for reader in readers {
        let json = reader.await.unwrap();
        // Every sample is complete and samples arrive in insertion order.
        let counts: Vec<u64> = json["metrics"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| {
                assert_eq!(m["density"].as_f64(), Some(0.5));
                m["people_count"].as_u64().unwrap()
            })
            .collect();
        let expected: Vec<u64> = (0..32).take(counts.len()).collect();
        assert_eq!(counts, expected);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_connection_cap_still_serves_everyone() {
    let store = MetricsStore::default();
    store.initialize().await.unwrap();
    let addr = start(store, 2);

    let tasks: Vec<_> = (0..16)
        .map(|_| tokio::spawn(async move { get(addr, "/api/v1/health").await.status_line }))
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), "HTTP/1.1 200 OK");
    }
}

#[tokio::test]
async fn test_idle_client_does_not_block_others() {
    let store = MetricsStore::default();
    store.initialize().await.unwrap();
    let addr = start(store, 0);

    // Connected but never sends anything.
    let _idle = TcpStream::connect(addr).await.unwrap();

    let response = get(addr, "/api/v1/recommendations").await;
    assert_eq!(response.status_line, "HTTP/1.1 200 OK");
}
