//! Shared helpers for the integration tests

use product_parser::config::{Config, EngineConfig};
use product_parser::crawler::{ParseEvent, Product};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with a short batch budget
pub fn create_test_config(batch_size: usize, batch_timeout_ms: u64) -> Config {
    let mut config = Config::default();
    config.engine = EngineConfig {
        batch_size,
        batch_timeout_secs: 20,
        batch_timeout_ms: Some(batch_timeout_ms),
    };
    config.http.request_timeout_secs = 5;
    config.http.connect_timeout_secs = 2;
    config
}

/// Renders a product page laid out the way the default extractor expects
pub fn product_page(id: &str, name: &str, price: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{name}</title></head>
<body>
    <div class="shouhinmei"><span>{id}</span></div>
    <h1 class="shouhin_name">{name}</h1>
    <p>Price: <span class="price">{price}</span> yen</p>
</body>
</html>"#
    )
}

/// Mounts an HTML page at `page_path`
pub async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Mounts an HTML page that is served only after `delay`
pub async fn mount_slow_page(server: &MockServer, page_path: &str, body: String, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html")
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Collects products until the finished event, giving up after a generous deadline
///
/// Returns the products and whether the finished event arrived.
pub async fn collect_run(rx: &mut UnboundedReceiver<ParseEvent>) -> (Vec<Product>, bool) {
    let mut products = Vec::new();
    loop {
        match tokio::time::timeout(Duration::from_secs(15), rx.recv()).await {
            Ok(Some(ParseEvent::ProductParsed(product))) => products.push(product),
            Ok(Some(ParseEvent::ParsingFinished)) => return (products, true),
            Ok(None) | Err(_) => return (products, false),
        }
    }
}
