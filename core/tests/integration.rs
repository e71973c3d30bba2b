//! Client behavior against the live mock collector.
//!
//! # Design
//! Starts the mock collector on a random port in a background thread, then
//! drives `HecClient` over real HTTP. Status classification is covered by the
//! unit tests; these tests check that the wire format, headers and transport
//! agree with a server.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use hec_core::{CollectorSettings, Event, HecClient, HecError, Protocol, Settings};
use mock_hec::{Collector, CollectorOptions, Mode, Received};

const TOKEN: &str = "8c1e7a52-5a1b-4f0e-9d6c-2f4b3a1e0d99";

fn start(options: CollectorOptions) -> (SocketAddr, Received) {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let collector = Collector::new(options);
    let received = collector.received();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_hec::run(listener, collector).await
        })
        .unwrap();
    });

    (addr, received)
}

fn start_mode(mode: Mode) -> (SocketAddr, Received) {
    let mut options = CollectorOptions::new(TOKEN);
    options.mode = mode;
    start(options)
}

fn settings(addr: SocketAddr, token: &str) -> CollectorSettings {
    let mut settings = CollectorSettings::new(addr.ip().to_string(), token);
    settings.protocol = Protocol::Http;
    settings.port = addr.port();
    settings.timeout = Duration::from_secs(5);
    settings
}

#[test]
fn connect_then_send() {
    hec_core::logging::init_test();
    let mut options = CollectorOptions::new(TOKEN);
    options.ack = true;
    let (addr, received) = start(options);

    let client = HecClient::connect(&settings(addr, TOKEN)).unwrap();
    assert_eq!(
        client.endpoints().event,
        format!("http://{addr}/services/collector/event")
    );

    let resp = client.send(&Event::new("hello").with_field("a", "b")).unwrap();
    assert_eq!(resp.code, 0);
    assert_eq!(resp.text, "Success");
    assert_eq!(resp.ack_id, Some(0));

    let resp = client
        .send(
            &Event::new("second")
                .with_new_channel()
                .with_source_type("_json")
                .with_timestamp(1_700_000_000),
        )
        .unwrap();
    assert_eq!(resp.ack_id, Some(1));

    let events = received.blocking_read();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], serde_json::json!({ "event": "hello", "fields": { "a": "b" } }));
    assert_eq!(events[1]["sourcetype"], "_json");
    assert_eq!(events[1]["time"], 1_700_000_000u64);
}

#[test]
fn wrong_token() {
    let (addr, _) = start_mode(Mode::Healthy);
    let settings = settings(addr, "not-the-token");

    let err = HecClient::connect(&settings).unwrap_err();
    assert!(matches!(err, HecError::InvalidToken { .. }), "{err}");

    let err = HecClient::new(&settings).send(&Event::new("x")).unwrap_err();
    assert!(
        matches!(err, HecError::RemoteRejected { status: 403, ref text, .. } if text == "Invalid token"),
        "{err}"
    );
}

#[test]
fn queues_full() {
    let (addr, _) = start_mode(Mode::QueuesFull);
    let settings = settings(addr, TOKEN);

    let err = HecClient::connect(&settings).unwrap_err();
    assert!(matches!(err, HecError::QueueFull { .. }), "{err}");

    let err = HecClient::new(&settings).send(&Event::new("x")).unwrap_err();
    assert!(matches!(err, HecError::RemoteRejected { status: 503, .. }), "{err}");
}

#[test]
fn plain_text_200_is_not_healthy() {
    let (addr, _) = start_mode(Mode::Garbage);
    let client = HecClient::new(&settings(addr, TOKEN));

    let err = client.health_check().unwrap_err();
    assert!(matches!(err, HecError::MalformedResponse { ref body, .. } if body == "oops"), "{err}");

    let err = client.send(&Event::new("x")).unwrap_err();
    assert!(matches!(err, HecError::MalformedResponse { ref body, .. } if body == "oops"), "{err}");
}

#[test]
fn blank_event_is_rejected() {
    let (addr, received) = start_mode(Mode::Healthy);
    let client = HecClient::new(&settings(addr, TOKEN));

    let err = client.send(&Event::new("")).unwrap_err();
    match err {
        HecError::RemoteRejected { status, text, .. } => {
            assert_eq!(status, 400);
            assert_eq!(text, "Event field cannot be blank");
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = client.send(&Event::new("x").with_channel("not-a-guid")).unwrap_err();
    assert!(matches!(err, HecError::RemoteRejected { status: 400, .. }));
    assert!(received.blocking_read().is_empty());
}

#[test]
fn nothing_listening_is_a_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = HecClient::new(&settings(addr, TOKEN));

    let err = client.health_check().unwrap_err();
    assert!(matches!(err, HecError::Transport { .. }), "{err}");
    assert!(err.to_string().contains("/services/collector/health"));
}

#[test]
fn silent_server_times_out() {
    // Accepted by the kernel backlog but never answered.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let mut settings = settings(addr, TOKEN);
    settings.timeout = Duration::from_secs(1);
    let client = HecClient::new(&settings);

    let started = Instant::now();
    let err = client.send(&Event::new("x")).unwrap_err();
    assert!(matches!(err, HecError::Transport { .. }), "{err}");
    assert!(started.elapsed() < Duration::from_secs(10));
    drop(listener);
}

#[test]
fn concurrent_sends_share_one_client() {
    let (addr, received) = start_mode(Mode::Healthy);
    let client = HecClient::connect(&settings(addr, TOKEN)).unwrap();

    std::thread::scope(|s| {
        for t in 0..4 {
            let client = &client;
            s.spawn(move || {
                for i in 0..5 {
                    let event = Event::new(format!("thread {t} event {i}"));
                    client.send(&event).unwrap();
                }
            });
        }
    });

    assert_eq!(received.blocking_read().len(), 20);
}

#[test]
fn settings_file_to_accepted_event() {
    let (addr, received) = start_mode(Mode::Healthy);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".splunk.hec.yaml");
    let yaml = format!(
        "log_level: 5\ncollector:\n  proto: http\n  host: {}\n  port: {}\n  token: {TOKEN}\n",
        addr.ip(),
        addr.port()
    );
    std::fs::write(&path, yaml).unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.file, path);
    assert_eq!(settings.log_level, tracing::Level::DEBUG);

    let client = HecClient::connect(&settings.collector).unwrap();
    client.send(&Event::new("from file")).unwrap();
    assert_eq!(received.blocking_read()[0]["event"], "from file");
}
