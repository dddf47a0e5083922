//! Runs whose products flow into the output sinks

use crate::common::{collect_run, create_test_config, mount_page, product_page};
use product_parser::config::{OutputConfig, SinkKind};
use product_parser::crawler::{ChannelListener, RunController};
use product_parser::links::FileLinkSource;
use product_parser::output::{open_sink, SinkListener};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::MockServer;

#[tokio::test]
async fn test_run_writes_csv_file() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let temp_dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/item/1", product_page("4471", "Widget", "1,234")).await;

    let links_path = temp_dir.path().join("links.txt");
    std::fs::write(&links_path, format!("\n{}/item/1\n\n", base_url)).unwrap();

    let csv_path = temp_dir.path().join("products.csv");
    let sink = open_sink(&OutputConfig {
        sink: SinkKind::File,
        path: csv_path.display().to_string(),
    })
    .unwrap();

    let controller = RunController::new(&create_test_config(10, 5000)).unwrap();
    let (listener, mut rx) = ChannelListener::new();
    controller.subscribe(Arc::new(SinkListener::new(sink)));
    controller.subscribe(Arc::new(listener));

    controller.start(&FileLinkSource::new(&links_path));
    let (products, finished) = collect_run(&mut rx).await;
    assert!(finished);
    assert_eq!(products.len(), 1);

    let content = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(content, "Id,Name,Price\n4471,Widget,\"1,234\"\n");
}

#[tokio::test]
async fn test_run_writes_database_rows() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let temp_dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/a", product_page("1", "Pen", "120")).await;
    mount_page(&mock_server, "/b", product_page("2", "Ink", "1,080")).await;

    let db_path = temp_dir.path().join("products.db");
    let sink = open_sink(&OutputConfig {
        sink: SinkKind::Database,
        path: db_path.display().to_string(),
    })
    .unwrap();

    let controller = RunController::new(&create_test_config(1, 5000)).unwrap();
    let (listener, mut rx) = ChannelListener::new();
    controller.subscribe(Arc::new(SinkListener::new(sink)));
    controller.subscribe(Arc::new(listener));

    let links = vec![format!("{}/a", base_url), format!("{}/b", base_url)];
    controller.start(&links);
    let (_, finished) = collect_run(&mut rx).await;
    assert!(finished);

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let mut stmt = conn
        .prepare("SELECT id, name, price FROM products ORDER BY id")
        .unwrap();
    let rows: Vec<(i64, String, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap()
        .map(|row| row.unwrap())
        .collect();

    assert_eq!(
        rows,
        vec![
            (1, "Pen".to_string(), "120".to_string()),
            (2, "Ink".to_string(), "1,080".to_string()),
        ]
    );
}
