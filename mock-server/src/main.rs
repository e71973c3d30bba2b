use mock_hec::{Collector, CollectorOptions, Mode};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "8088".to_string());
    let token = std::env::var("HEC_TOKEN")
        .unwrap_or_else(|_| "00000000-0000-0000-0000-000000000000".to_string());
    let mode = std::env::var("HEC_MODE")
        .ok()
        .and_then(|m| Mode::parse(&m))
        .unwrap_or_default();

    let mut options = CollectorOptions::new(token);
    options.mode = mode;
    options.ack = std::env::var_os("HEC_ACK").is_some();

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("mock collector listening on {addr} ({mode:?})");
    mock_hec::run(listener, Collector::new(options)).await
}
