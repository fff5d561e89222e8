/// Dashboard view tests.
///
/// Exercises the reducer, the score view and `ProxyClient` end to end. The
/// proxy side is a local `tiny_http` server on an ephemeral port that either
/// runs the real `proxy::handle` against a fake scoring service, or answers
/// with a canned status.
use std::thread;
use std::time::Duration;

use agrifinance::dashboard::score::{self, AMBER, GREEN, RED};
use agrifinance::dashboard::{
    Action, Band, DashboardState, FormField, ProxyClient, Region, ScoreResult, ScoreView,
    RequestToken, Status, SubmitError, reduce, submit_once,
};
use agrifinance::proxy::{self, ProxyOptions, UpstreamClient};
use tiny_http::{Header, Response, Server, StatusCode};

// ---------------------------------------------------------------------------
// Fake peers
// ---------------------------------------------------------------------------

fn json_header() -> Header {
    Header::from_bytes("Content-Type", "application/json").unwrap()
}

/// Start a server answering every request with `status` and `body`.
fn canned_server(status: u16, body: &'static str) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();

    thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let mut sink = String::new();
            let _ = request.as_reader().read_to_string(&mut sink);
            let response = Response::from_string(body)
                .with_status_code(StatusCode(status))
                .with_header(json_header());
            let _ = request.respond(response);
        }
    });

    format!("http://{addr}")
}

/// Start a proxy running `proxy::handle` in front of `upstream_url`.
fn proxy_server(upstream_url: String) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let client = UpstreamClient::new(upstream_url);

    thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            let reply = proxy::handle(&body, &client, ProxyOptions::default());
            let response = Response::from_string(reply.body.to_string())
                .with_status_code(StatusCode(reply.status))
                .with_header(json_header());
            let _ = request.respond(response);
        }
    });

    format!("http://{addr}")
}

fn complete(
    state: DashboardState,
    token: RequestToken,
    outcome: Result<ScoreResult, SubmitError>,
) -> DashboardState {
    reduce(state, Action::Completed { token, outcome }).0
}

// ---------------------------------------------------------------------------
// Submission round trips
// ---------------------------------------------------------------------------

#[test]
fn score_680_shows_excellent_potential() {
    let upstream = canned_server(200, r#"{"agri_score": 680}"#);
    let client = ProxyClient::new(&proxy_server(format!("{upstream}/")));

    let state = submit_once(DashboardState::default(), &client);
    assert!(!state.loading);
    assert!(state.success());
    assert_eq!(state.error(), None);
    assert_eq!(state.raw_score, 680.0);
    assert!((state.score - 80.0).abs() < 1e-9);

    let view = state.view();
    assert_eq!(view.raw_display, "680");
    assert_eq!(view.percentage_display, "80.0");
    assert_eq!(view.color, GREEN);
    assert_eq!(view.band, Band::Excellent);
    assert_eq!(view.label, "Excellent Potential");
    assert_eq!(view.description, "High yield and investment return expected");
}

#[test]
fn edited_form_still_scores() {
    let upstream = canned_server(200, r#"{"agri_score": 425}"#);
    let client = ProxyClient::new(&proxy_server(format!("{upstream}/")));

    let (state, _) = reduce(
        DashboardState::default(),
        Action::Edit(FormField::Region(Region::Amhara)),
    );
    let (state, _) = reduce(state, Action::Edit(FormField::LandArea(0.5)));
    let state = submit_once(state, &client);

    assert!(state.success());
    assert_eq!(state.view().band, Band::Moderate);
    assert_eq!(state.form.region, Region::Amhara);
}

#[test]
fn network_failure_shows_error_and_zeroes_scores() {
    let client = ProxyClient::new("http://127.0.0.1:9");

    let mut state = DashboardState::default();
    state.raw_score = 700.0;
    state.score = 82.35;
    let state = submit_once(state, &client);

    assert!(!state.loading);
    assert!(!state.success());
    assert!(state.error().is_some_and(|m| !m.is_empty()));
    assert_eq!(state.raw_score, 0.0);
    assert_eq!(state.score, 0.0);
    assert_eq!(state.view().label, "No Data");
}

#[test]
fn slow_proxy_hits_client_timeout() {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    thread::spawn(move || {
        for request in server.incoming_requests() {
            thread::sleep(Duration::from_millis(1500));
            let _ = request.respond(Response::from_string(r#"{"agri_score": 680}"#));
        }
    });

    let client =
        ProxyClient::new(&format!("http://{addr}")).with_timeout(Duration::from_millis(200));
    let state = submit_once(DashboardState::default(), &client);

    assert!(!state.loading);
    assert!(state.error().is_some_and(|m| !m.is_empty()));
    assert_eq!(state.raw_score, 0.0);
}

#[test]
fn proxy_500_surfaces_status_text() {
    let proxy = canned_server(500, r#"{"error": "Request failed with status code 502"}"#);
    let client = ProxyClient::new(&proxy);

    let state = submit_once(DashboardState::default(), &client);
    assert_eq!(
        state.error(),
        Some("Server returned 500: Internal Server Error")
    );
    assert!(matches!(state.status, Status::Error(_)));
}

#[test]
fn upstream_failure_through_real_proxy_is_error_banner() {
    let upstream = canned_server(503, "{}");
    let client = ProxyClient::new(&proxy_server(format!("{upstream}/")));

    let state = submit_once(DashboardState::default(), &client);
    assert_eq!(
        state.error(),
        Some("Server returned 500: Internal Server Error")
    );
    assert_eq!(state.raw_score, 0.0);
}

// ---------------------------------------------------------------------------
// Overlapping submissions
// ---------------------------------------------------------------------------

#[test]
fn overlapping_submissions_latest_completes_last() {
    let (state, first) = reduce(DashboardState::default(), Action::Submit);
    let (state, second) = reduce(state, Action::Submit);
    let (first, second) = (first.unwrap(), second.unwrap());

    let state = complete(state, first, Ok(ScoreResult { agri_score: 200.0 }));
    assert!(state.loading);
    assert_eq!(state.raw_score, 0.0);

    let state = complete(state, second, Ok(ScoreResult { agri_score: 680.0 }));
    assert!(!state.loading);
    assert_eq!(state.raw_score, 680.0);
    assert!(state.success());
}

#[test]
fn overlapping_submissions_latest_completes_first() {
    let (state, first) = reduce(DashboardState::default(), Action::Submit);
    let (state, second) = reduce(state, Action::Submit);
    let (first, second) = (first.unwrap(), second.unwrap());

    let state = complete(state, second, Ok(ScoreResult { agri_score: 680.0 }));
    assert!(!state.loading);
    assert_eq!(state.raw_score, 680.0);

    // The stale failure must not overwrite the latest result
    let state = complete(
        state,
        first,
        Err(SubmitError::Transport("connection reset".to_string())),
    );
    assert!(!state.loading);
    assert!(state.success());
    assert_eq!(state.raw_score, 680.0);
}

// ---------------------------------------------------------------------------
// Bands
// ---------------------------------------------------------------------------

#[test]
fn bands_are_total_and_exclusive() {
    let cases = [
        (-10.0, Band::NoData, RED),
        (0.0, Band::NoData, RED),
        (0.01, Band::Limited, RED),
        (39.99, Band::Limited, RED),
        (40.0, Band::Moderate, AMBER),
        (69.99, Band::Moderate, AMBER),
        (70.0, Band::Excellent, GREEN),
        (150.0, Band::Excellent, GREEN),
        (f64::NAN, Band::NoData, RED),
    ];
    for (pct, band, color) in cases {
        assert_eq!(Band::for_percentage(pct), band, "band for {pct}");
        assert_eq!(score::gauge_color(pct), color, "color for {pct}");
    }
}

#[test]
fn percentage_is_not_clamped() {
    let view = ScoreView::from_raw(1700.0);
    assert!((view.percentage - 200.0).abs() < 1e-9);
    assert_eq!(view.band, Band::Excellent);
}
