//! End-to-end parsing runs against a mock shop

use crate::common::{collect_run, create_test_config, mount_page, mount_slow_page, product_page};
use product_parser::crawler::{ChannelListener, RunController, StartOutcome};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_full_run_mixed_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/item/1", product_page("4471", "Widget", "1,234")).await;
    mount_page(&mock_server, "/item/2", product_page("No. 88", "Mug", "700")).await;

    // Page without a price element
    mount_page(
        &mock_server,
        "/item/3",
        r#"<div class="shouhinmei"><span>9</span></div><h1 class="shouhin_name">Lamp</h1>"#
            .to_string(),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/item/4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let links = vec![
        format!("{}/item/1", base_url),
        format!("{}/item/2", base_url),
        format!("{}/item/3", base_url),
        format!("{}/item/4", base_url),
        "not a url".to_string(),
    ];

    let controller = RunController::new(&create_test_config(10, 5000)).unwrap();
    let (listener, mut rx) = ChannelListener::new();
    controller.subscribe(Arc::new(listener));

    assert_eq!(controller.start(&links), StartOutcome::Started { links: 5 });

    let (mut products, finished) = collect_run(&mut rx).await;
    assert!(finished, "run should signal completion");
    assert_eq!(products.len(), 2);
    assert_eq!(controller.success_count(), 2);
    assert!(!controller.is_running());

    products.sort_by_key(|p| p.id());
    assert_eq!(products[0].to_string(), "88,Mug,\"700\"");
    assert_eq!(products[1].to_string(), "4471,Widget,\"1,234\"");
}

#[tokio::test]
async fn test_invalid_addresses_issue_no_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let links = vec![
        "".to_string(),
        "ftp://example.com/item".to_string(),
        "://broken".to_string(),
    ];

    let controller = RunController::new(&create_test_config(10, 5000)).unwrap();
    let (listener, mut rx) = ChannelListener::new();
    controller.subscribe(Arc::new(listener));

    controller.start(&links);
    let (products, finished) = collect_run(&mut rx).await;

    assert!(finished);
    assert!(products.is_empty());
    assert_eq!(controller.success_count(), 0);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_many_links_run_in_batches() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let mut links = Vec::new();
    for i in 1..=25 {
        let page_path = format!("/item/{}", i);
        mount_page(
            &mock_server,
            &page_path,
            product_page(&i.to_string(), &format!("Item {}", i), "100"),
        )
        .await;
        links.push(format!("{}{}", base_url, page_path));
    }

    let controller = RunController::new(&create_test_config(10, 5000)).unwrap();
    let (listener, mut rx) = ChannelListener::new();
    controller.subscribe(Arc::new(listener));

    assert_eq!(controller.start(&links), StartOutcome::Started { links: 25 });

    let (products, finished) = collect_run(&mut rx).await;
    assert!(finished);
    assert_eq!(products.len(), 25);
    assert_eq!(controller.success_count(), 25);

    let mut ids: Vec<u64> = products.iter().map(|p| p.id()).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=25).collect::<Vec<u64>>());
}

#[tokio::test]
async fn test_batch_timeout_excludes_late_results() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/fast", product_page("1", "Fast", "10")).await;
    mount_slow_page(
        &mock_server,
        "/slow",
        product_page("2", "Slow", "20"),
        Duration::from_millis(1500),
    )
    .await;

    let links = vec![format!("{}/fast", base_url), format!("{}/slow", base_url)];

    let controller = RunController::new(&create_test_config(10, 300)).unwrap();
    let (listener, mut rx) = ChannelListener::new();
    controller.subscribe(Arc::new(listener));

    controller.start(&links);
    let (products, finished) = collect_run(&mut rx).await;

    assert!(finished);
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name(), "Fast");

    // The slow page completes after the run closed and is discarded
    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(controller.success_count(), 1);
}

#[tokio::test]
async fn test_start_rejected_while_run_in_progress() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_slow_page(
        &mock_server,
        "/item/1",
        product_page("1", "Kettle", "3,980"),
        Duration::from_millis(300),
    )
    .await;

    let links = vec![format!("{}/item/1", base_url)];

    let controller = RunController::new(&create_test_config(10, 5000)).unwrap();
    let (listener, mut rx) = ChannelListener::new();
    controller.subscribe(Arc::new(listener));

    assert_eq!(controller.start(&links), StartOutcome::Started { links: 1 });
    assert_eq!(controller.start(&links), StartOutcome::Rejected);

    let (products, finished) = collect_run(&mut rx).await;
    assert!(finished);
    assert_eq!(products.len(), 1);

    // Only the first run fetched the page
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);

    // A new run is accepted once the first has finished
    assert_eq!(controller.start(&links), StartOutcome::Started { links: 1 });
    let (products, finished) = collect_run(&mut rx).await;
    assert!(finished);
    assert_eq!(products.len(), 1);
}
