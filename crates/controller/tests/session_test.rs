use std::sync::Arc;
use std::time::Duration;

use kel_console_client::{ConsoleApiClient, HttpMethod};
use kel_console_controller::{
    ActiveView, ConsoleSession, FilterSeed, FixedConfirmation, MainView, MonitorSub, OpsSub,
    RefreshTarget,
};
use kel_console_core::ConsoleConfig;
use kel_console_testing_utils::{list_body, stats_body, MockTransport, TaskSummaryBuilder};
use serde_json::json;

fn session(transport: &MockTransport) -> ConsoleSession {
    let client = ConsoleApiClient::new(Arc::new(transport.clone()));
    ConsoleSession::new(client, &ConsoleConfig::default())
}

#[tokio::test]
async fn test_sub_state_restored_on_return() {
    let transport = MockTransport::new();
    let session = session(&transport);

    session
        .navigate_to(MainView::Ops, Some(OpsSub::TableExport.into()))
        .await;
    session.navigate_to(MainView::Monitor, None).await;
    let state = session.navigate_to(MainView::Ops, None).await;

    assert_eq!(state.active(), ActiveView::Ops(OpsSub::TableExport));
    assert_eq!(state.monitor_sub, MonitorSub::Overview);
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_idle_tick_issues_no_request() {
    let transport = MockTransport::new();
    let session = session(&transport);

    session
        .navigate_to(MainView::Ops, Some(OpsSub::Execute.into()))
        .await;
    assert!(session.tick().await.is_none());
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_overview_tick_loads_stats_and_recent() {
    let transport = MockTransport::new();
    transport
        .respond_json(HttpMethod::Get, "/api/tasks/stats", stats_body(3, 1, 2, 0))
        .respond_json(
            HttpMethod::Get,
            "/api/tasks",
            list_body(vec![TaskSummaryBuilder::new().to_json()], 1),
        );
    let session = session(&transport);
    let mut events = session.subscribe();

    session.tick().await.unwrap().await.unwrap();

    let event = events.recv().await.unwrap();
    assert_eq!(event.target, RefreshTarget::Overview);
    assert!(event.success);
    assert_eq!(session.services().tasks.stats().await.total, 3);
    assert_eq!(session.services().tasks.recent_tasks().await.len(), 1);
}

#[tokio::test]
async fn test_background_failure_is_not_surfaced() {
    let transport = MockTransport::new();
    transport.respond_error(HttpMethod::Get, "/api/tasks", 500, "服务不可用");
    let session = session(&transport);
    let mut events = session.subscribe();

    session
        .navigate_to(MainView::Monitor, Some(MonitorSub::TaskList.into()))
        .await;
    session.tick().await.unwrap().await.unwrap();

    let event = events.recv().await.unwrap();
    assert_eq!(event.target, RefreshTarget::TaskList);
    assert!(!event.success);
    assert!(session.services().tasks.current_page().await.items.is_empty());
}

#[tokio::test]
async fn test_overview_partial_failure_reports_failed_tick() {
    let transport = MockTransport::new();
    transport
        .respond_json(HttpMethod::Get, "/api/tasks/stats", stats_body(3, 1, 2, 0))
        .respond_error(HttpMethod::Get, "/api/tasks/stats", 500, "统计服务不可用")
        .respond_json(
            HttpMethod::Get,
            "/api/tasks",
            list_body(vec![TaskSummaryBuilder::new().to_json()], 1),
        );
    let session = session(&transport);
    let mut events = session.subscribe();

    session.tick().await.unwrap().await.unwrap();
    assert!(events.recv().await.unwrap().success);

    session.tick().await.unwrap().await.unwrap();
    let event = events.recv().await.unwrap();
    assert_eq!(event.target, RefreshTarget::Overview);
    assert!(!event.success);
    // 统计保留上次结果，最近任务照常更新
    assert_eq!(session.services().tasks.stats().await.total, 3);
    assert_eq!(session.services().tasks.recent_tasks().await.len(), 1);
    assert_eq!(
        transport.requests_to(HttpMethod::Get, "/api/tasks").len(),
        2
    );
}

#[tokio::test]
async fn test_foreground_refresh_surfaces_failure() {
    let transport = MockTransport::new();
    transport.respond_error(HttpMethod::Get, "/api/jobs/configs", 500, "配置读取失败");
    let session = session(&transport);

    session.navigate_to(MainView::Config, None).await;
    let err = session.refresh_now().await.unwrap_err();
    assert_eq!(err.message(), "配置读取失败");
}

#[tokio::test]
async fn test_route_seeds_filter_without_request() {
    let transport = MockTransport::new();
    let session = session(&transport);

    let seed = session
        .apply_route("#monitor/taskList?jobCode=daily_orders")
        .await
        .unwrap();

    assert_eq!(
        seed,
        FilterSeed::TaskList {
            job_code: "daily_orders".to_string()
        }
    );
    assert_eq!(
        session.view_state().await.active(),
        ActiveView::Monitor(MonitorSub::TaskList)
    );
    assert_eq!(
        session.services().tasks.filter().await.job_code(),
        Some("daily_orders")
    );
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_unmatched_route_keeps_defaults() {
    let transport = MockTransport::new();
    let session = session(&transport);

    assert!(session.apply_route("#ops/tableExport").await.is_none());
    assert!(session.apply_route("#monitor/taskList").await.is_none());
    assert!(session.view_state().await.is_overview());
}

#[tokio::test]
async fn test_navigate_with_filter_refreshes_target() {
    let transport = MockTransport::new();
    transport.respond_json(
        HttpMethod::Get,
        "/api/tasks",
        list_body(vec![TaskSummaryBuilder::new().with_job_code("orders").to_json()], 1),
    );
    let session = session(&transport);

    session
        .navigate_with_filter(MainView::Monitor, Some(MonitorSub::TaskList.into()), "orders")
        .await
        .unwrap();

    let request = transport.last_request().unwrap();
    assert_eq!(request.query_value("jobCode"), Some("orders"));
    assert_eq!(session.services().tasks.current_page().await.total, 1);
}

#[tokio::test]
async fn test_execute_seed_preselects_config_key() {
    let transport = MockTransport::new();
    let session = session(&transport);

    session
        .navigate_with_filter(MainView::Ops, Some(OpsSub::Execute.into()), "orders")
        .await
        .unwrap();

    assert_eq!(
        session.services().triggers.preselected().await.as_deref(),
        Some("orders")
    );
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_delete_from_task_list_skips_stats() {
    let transport = MockTransport::new();
    transport
        .respond(HttpMethod::Delete, "/api/tasks/5", 200, "{}")
        .respond_json(HttpMethod::Get, "/api/tasks", list_body(vec![], 0))
        .respond_json(HttpMethod::Get, "/api/tasks/stats", json!({"total": 0}));
    let session = session(&transport);

    session
        .navigate_to(MainView::Monitor, Some(MonitorSub::TaskList.into()))
        .await;
    session
        .delete_task(5, &FixedConfirmation(true))
        .await
        .unwrap();

    assert!(transport
        .requests_to(HttpMethod::Get, "/api/tasks/stats")
        .is_empty());
}

#[tokio::test]
async fn test_mount_and_unmount() {
    let transport = MockTransport::new();
    transport
        .respond_json(HttpMethod::Get, "/api/tasks/stats", stats_body(0, 0, 0, 0))
        .respond_json(HttpMethod::Get, "/api/tasks", list_body(vec![], 0));
    let mut session = session(&transport);
    let mut events = session.subscribe();

    session.mount();
    assert!(session.is_mounted());

    // 首次触发立即发生
    let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.target, RefreshTarget::Overview);

    session.unmount();
    assert!(!session.is_mounted());
}
