/// Integration tests for the backend client and the streaming AI client
/// against a local `tiny_http` fixture server.
///
/// Each test spins a one-shot server on `127.0.0.1:0`, hands the observed
/// request back over a channel, and asserts on both sides: what the client
/// sent, and what it made of the response. Mock-mode behavior is covered
/// by unit tests next to the client itself.
use std::sync::mpsc::{self, Receiver};
use std::thread;

use tempfile::TempDir;
use tiny_http::{Header, Response, Server};

use szk::ai::client::{ChatMessage, SilraClient};
use szk::ai::stream::read_stream;
use szk::api::ApiClient;
use szk::config::schema::{AiConfig, SzkConfig};
use szk::session::SessionStore;

/// What the fixture server saw for one request.
struct Observed {
    path: String,
    authorization: Option<String>,
    body: String,
}

/// Serve exactly one request, answering with `status` and `body`, and
/// report what arrived.
fn serve_one(status: u16, content_type: &str, body: &str) -> (String, Receiver<Observed>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let reply = body.to_string();
    let content_type = content_type.to_string();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let mut request = server.recv().unwrap();

        let mut body = String::new();
        let _ = request.as_reader().read_to_string(&mut body);
        let observed = Observed {
            path: request.url().to_string(),
            authorization: request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Authorization"))
                .map(|h| h.value.as_str().to_string()),
            body,
        };
        tx.send(observed).unwrap();

        let header = format!("Content-Type: {content_type}")
            .parse::<Header>()
            .unwrap();
        let _ = request.respond(
            Response::from_string(reply)
                .with_header(header)
                .with_status_code(status),
        );
    });

    (format!("http://{addr}"), rx)
}

fn client_for(base_url: &str, dir: &TempDir) -> ApiClient {
    let mut cfg = SzkConfig::default();
    cfg.backend.base_url = base_url.to_string();
    cfg.backend.timeout_ms = 2_000;
    ApiClient::new(&cfg, SessionStore::in_dir(dir.path()))
}

// ---------------------------------------------------------------------------
// Backend client
// ---------------------------------------------------------------------------

#[test]
fn bearer_token_rides_on_authorized_requests() {
    let (base, rx) = serve_one(
        200,
        "application/json",
        r#"{"email":"admin@songzike.cn","is_admin":1,"shop_id":null}"#,
    );

    let dir = TempDir::new().unwrap();
    let store = SessionStore::in_dir(dir.path());
    store.store_token("tok-123").unwrap();

    let api = client_for(&base, &dir);
    let user = api.current_user().unwrap();
    assert!(user.admin());

    let observed = rx.recv().unwrap();
    assert_eq!(observed.path, "/api/me");
    assert_eq!(observed.authorization.as_deref(), Some("Bearer tok-123"));
}

#[test]
fn unauthorized_response_clears_the_stored_token() {
    let (base, _rx) = serve_one(
        401,
        "application/json",
        r#"{"detail":"Could not validate credentials"}"#,
    );

    let dir = TempDir::new().unwrap();
    let store = SessionStore::in_dir(dir.path());
    store.store_token("stale-token").unwrap();

    let api = client_for(&base, &dir);
    let err = api.current_user().unwrap_err();

    assert!(
        err.to_string().contains("session expired"),
        "unexpected error: {err:#}"
    );
    assert_eq!(store.token(), None);
}

#[test]
fn backend_error_detail_surfaces_in_the_message() {
    let (base, _rx) = serve_one(
        400,
        "application/json",
        r#"{"detail":"count must be between 1 and 10000"}"#,
    );

    let dir = TempDir::new().unwrap();
    let api = client_for(&base, &dir);
    let err = api.batch_encode("shop-a", 50, "").unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("HTTP 400"), "unexpected error: {message}");
    assert!(
        message.contains("count must be between"),
        "unexpected error: {message}"
    );
}

// ---------------------------------------------------------------------------
// Streaming AI client end to end
// ---------------------------------------------------------------------------

#[test]
fn sse_response_streams_deltas_in_order() {
    let sse = "data: {\"choices\":[{\"delta\":{\"content\":\"第一\"}}]}\n\
               data: {\"choices\":[{\"delta\":{\"content\":\"段\"}}]}\n\
               data: [DONE]\n";
    let (base, rx) = serve_one(200, "text/event-stream", sse);

    let ai = AiConfig {
        api_url: base,
        api_key: "test-key".into(),
        ..AiConfig::default()
    };
    let client = SilraClient::from_config(&ai);
    let reader = client
        .chat_stream(&[ChatMessage::user("写一段评价")])
        .unwrap();

    let mut deltas = Vec::new();
    let transcript = read_stream(reader, |d| deltas.push(d.to_string())).unwrap();
    assert_eq!(transcript, "第一段");
    assert_eq!(deltas, ["第一", "段"]);

    let observed = rx.recv().unwrap();
    assert_eq!(observed.authorization.as_deref(), Some("Bearer test-key"));
    assert!(observed.body.contains("\"stream\":true"));
    assert!(observed.body.contains("写一段评价"));
}
