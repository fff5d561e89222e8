/// Log sink tests.
///
/// Installs the process-wide logger with a JSONL file sink at debug level,
/// runs scoring requests through `proxy::handle`, and checks the file. Kept
/// in its own test binary because the logger can only be installed once per
/// process.
use std::path::PathBuf;
use std::thread;

use agrifinance::config::schema::LoggingConfig;
use agrifinance::logging;
use agrifinance::proxy::{self, ProxyOptions, UpstreamClient};
use serde_json::Value;
use tiny_http::{Response, Server, StatusCode};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Start a fake scoring service answering every request with `status` and `body`.
fn fake_upstream(status: u16, body: &'static str) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();

    thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let mut sink = String::new();
            let _ = request.as_reader().read_to_string(&mut sink);
            let _ = request.respond(Response::from_string(body).with_status_code(StatusCode(status)));
        }
    });

    format!("http://{addr}/")
}

fn log_path() -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "agrifinance-proxy-log-{}.jsonl",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

// ---------------------------------------------------------------------------
// Field values stay out of the log
// ---------------------------------------------------------------------------

#[test]
fn proxy_log_never_contains_field_values() {
    let path = log_path();
    logging::init(&LoggingConfig {
        level: "debug".to_string(),
        file_enabled: true,
        path: path.display().to_string(),
    });

    let ok = UpstreamClient::new(fake_upstream(200, r#"{"agri_score": 680}"#));
    let reply = proxy::handle(
        r#"{
            "region": "tigray",
            "latitude": 13.4967,
            "longitude": 39.4753,
            "land_area": 311.125,
            "crop_type": "sorghum",
            "yield_estimation_year": 2027
        }"#,
        &ok,
        ProxyOptions::default(),
    );
    assert_eq!(reply.status, 200);

    let reply = proxy::handle(
        r#"{
            "region": "tigray",
            "latitude": "north-ish",
            "longitude": 39.4753,
            "land_area": 311.125,
            "crop_type": "sorghum",
            "yield_estimation_year": 2027
        }"#,
        &ok,
        ProxyOptions::default(),
    );
    assert_eq!(reply.status, 500);

    let failing = UpstreamClient::new(fake_upstream(503, ""));
    let reply = proxy::handle(
        r#"{
            "region": "tigray",
            "latitude": 13.4967,
            "longitude": 39.4753,
            "land_area": 311.125,
            "crop_type": "sorghum",
            "yield_estimation_year": 2027
        }"#,
        &failing,
        ProxyOptions::default(),
    );
    assert_eq!(reply.status, 500);

    let content = std::fs::read_to_string(&path).unwrap();
    let messages: Vec<String> = content
        .lines()
        .map(|line| {
            let record: Value = serde_json::from_str(line).unwrap();
            record["message"].as_str().unwrap().to_string()
        })
        .collect();

    // Each request left a trace
    assert!(messages.iter().any(|m| m.starts_with("forwarding scoring request via GET")));
    assert!(messages.iter().any(|m| m.starts_with("scoring service answered 200")));
    assert!(messages.iter().any(|m| m.ends_with("field=latitude")));
    assert!(messages.iter().any(|m| m.contains("status code 503")));

    for message in &messages {
        for value in ["tigray", "sorghum", "north-ish", "13.4967", "39.4753", "311.125"] {
            assert!(!message.contains(value), "log leaked {value}: {message}");
        }
    }

    let _ = std::fs::remove_file(&path);
}
