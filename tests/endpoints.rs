use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::os::unix::ffi::OsStrExt;
use std::sync::Arc;
use std::time::Duration;

use diag_server::config::{AppState, Config};
use diag_server::diag::{ProcessStart, SystemResolver};
use diag_server::server;
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Notify;

struct TestServer {
    addr: SocketAddr,
    shutdown: Arc<Notify>,
    client: reqwest::Client,
}

impl TestServer {
    async fn start(config: Config) -> Self {
        let listener = server::create_reusable_listener("127.0.0.1:0".parse().unwrap())
            .expect("failed to bind test listener");
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(AppState::new(
            config,
            ProcessStart::now(),
            SystemResolver::from_system_conf(),
        ));
        let shutdown = Arc::new(Notify::new());
        tokio::spawn(server::run_server(listener, state, Arc::clone(&shutdown)));

        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .unwrap();
        Self {
            addr,
            shutdown,
            client,
        }
    }

    async fn with_defaults() -> Self {
        let mut config = Config::default();
        config.logging.access_log = false;
        Self::start(config).await
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, String) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status();
        (status, resp.text().await.unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.notify_one();
    }
}

#[tokio::test]
async fn echo_returns_body_unchanged() {
    let server = TestServer::with_defaults().await;
    let payload: Vec<u8> = (0..=255u8).cycle().take(200_000).collect();

    let resp = server
        .client
        .post(server.url("/echo"))
        .body(payload.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.bytes().await.unwrap().to_vec(), payload);
}

#[tokio::test]
async fn slow_chunked_echo_outlives_read_timeout() {
    let mut config = Config::default();
    config.logging.access_log = false;
    config.performance.read_timeout = 1;
    let server = TestServer::start(config).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(
            b"POST /echo HTTP/1.1\r\nHost: test\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
        )
        .await
        .unwrap();
    for _ in 0..4 {
        stream.write_all(b"5\r\nhello\r\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(700)).await;
    }
    stream.write_all(b"0\r\n\r\n").await.unwrap();

    let mut raw = Vec::new();
    tokio::time::timeout(Duration::from_secs(10), stream.read_to_end(&mut raw))
        .await
        .expect("response should finish")
        .unwrap();
    let response = String::from_utf8_lossy(&raw);

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert_eq!(response.matches("hello").count(), 4, "{response}");
    assert!(response.ends_with("0\r\n\r\n"), "{response}");
}

#[tokio::test]
async fn echo_empty_body() {
    let server = TestServer::with_defaults().await;
    let resp = server.client.post(server.url("/echo")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn echo_mirrors_content_type() {
    let server = TestServer::with_defaults().await;
    let resp = server
        .client
        .put(server.url("/echo"))
        .header("content-type", "application/x-probe")
        .body("ping")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["content-type"], "application/x-probe");
    assert_eq!(resp.text().await.unwrap(), "ping");
}

#[tokio::test]
async fn echoheaders_renders_every_header() {
    let server = TestServer::with_defaults().await;
    let resp = server
        .client
        .get(server.url("/echoheaders"))
        .header("x-probe", "one")
        .header("x-multi", "a")
        .header("x-multi", "b")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    let lines: HashSet<&str> = body.lines().collect();

    assert!(lines.contains("X-Probe=[one]"), "{body}");
    assert!(lines.contains("X-Multi=[a b]"), "{body}");
    assert!(!lines.iter().any(|l| l.to_ascii_lowercase().starts_with("host=")), "{body}");
    assert!(lines.iter().all(|l| l.contains("=[") && l.ends_with(']')));
}

#[tokio::test]
async fn root_and_hostname_match() {
    let server = TestServer::with_defaults().await;
    let (status, root) = server.get("/").await;
    assert_eq!(status, StatusCode::OK);
    let (_, hostname) = server.get("/hostname").await;
    assert_eq!(root, hostname);
    assert!(hostname.ends_with('\n'));
    assert_eq!(hostname.lines().count(), 1);
}

#[tokio::test]
async fn any_method_reaches_endpoint() {
    let server = TestServer::with_defaults().await;
    let (_, expected) = server.get("/hostname").await;
    for method in [reqwest::Method::POST, reqwest::Method::DELETE, reqwest::Method::PATCH] {
        let resp = server
            .client
            .request(method, server.url("/hostname"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.text().await.unwrap(), expected);
    }
}

#[tokio::test]
async fn env_lists_process_environment() {
    let server = TestServer::with_defaults().await;
    let resp = server.client.get(server.url("/env")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.bytes().await.unwrap();

    let mut expected = Vec::new();
    for (key, value) in std::env::vars_os() {
        expected.extend_from_slice(key.as_bytes());
        expected.push(b'=');
        expected.extend_from_slice(value.as_bytes());
        expected.push(b'\n');
    }
    assert_eq!(body.to_vec(), expected);
}

#[tokio::test]
async fn ip_lists_addresses() {
    let server = TestServer::with_defaults().await;
    let (status, body) = server.get("/ip").await;
    assert_eq!(status, StatusCode::OK);
    for line in body.lines().filter(|l| !l.is_empty()) {
        assert!(
            line.parse::<IpAddr>().is_ok() || line.starts_with("Error: "),
            "unexpected line {line:?}"
        );
    }
}

#[tokio::test]
async fn fqdn_is_ok_and_stable() {
    let server = TestServer::with_defaults().await;
    let (status, first) = server.get("/fqdn").await;
    assert_eq!(status, StatusCode::OK);
    assert!(first.ends_with('\n'));
    assert!(!first.trim().is_empty());
    assert!(!first.trim_end().ends_with('.'));

    let (_, second) = server.get("/fqdn").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn healthz_reports_uptime() {
    let server = TestServer::with_defaults().await;
    let (status, body) = server.get("/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("Uptime "), "{body}");
    assert!(body.ends_with("\nOK\n"), "{body}");
}

#[tokio::test]
async fn healthz_fail_before_threshold() {
    let mut config = Config::default();
    config.logging.access_log = false;
    config.probes.fail_after_secs = 3600.0;
    let server = TestServer::start(config).await;

    let (status, body) = server.get("/healthz-fail").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("still OK, "), "{body}");
    assert!(body.contains(" seconds before failing\nUptime "), "{body}");
}

#[tokio::test]
async fn healthz_fail_after_threshold() {
    let mut config = Config::default();
    config.logging.access_log = false;
    config.probes.fail_after_secs = 0.0;
    let server = TestServer::start(config).await;

    for _ in 0..3 {
        let (status, body) = server.get("/healthz-fail").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.starts_with("failed since "), "{body}");
    }
}

#[tokio::test]
async fn exit_with_non_numeric_code_is_not_found() {
    let server = TestServer::with_defaults().await;
    let (status, _) = server.get("/exit/abc").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // still serving
    let (status, _) = server.get("/healthz").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn exit_code_out_of_range_is_rejected() {
    let server = TestServer::with_defaults().await;
    let (status, body) = server.get("/exit/99999999999").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("out of range"));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let server = TestServer::with_defaults().await;
    let (status, _) = server.get("/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn trailing_slash_redirects() {
    let server = TestServer::with_defaults().await;
    let resp = server
        .client
        .get(server.url("/echoheaders/?x=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(resp.headers()["location"], "/echoheaders?x=1");
}

#[tokio::test]
async fn disabled_probes_are_not_found() {
    let mut config = Config::default();
    config.logging.access_log = false;
    config.probes.healthz = false;
    config.probes.healthz_fail = false;
    config.probes.exit = false;
    let server = TestServer::start(config).await;

    for path in ["/healthz", "/healthz-fail", "/exit/0"] {
        let (status, _) = server.get(path).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn concurrent_requests_are_served() {
    let server = Arc::new(TestServer::with_defaults().await);
    let mut tasks = Vec::new();
    for i in 0..16 {
        let server = Arc::clone(&server);
        tasks.push(tokio::spawn(async move {
            let body = format!("request-{i}");
            let resp = server
                .client
                .post(server.url("/echo"))
                .body(body.clone())
                .send()
                .await
                .unwrap();
            assert_eq!(resp.text().await.unwrap(), body);
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
}
