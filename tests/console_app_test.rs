use std::io::Write;
use std::sync::Arc;

use kel_console::app::Application;
use kel_console::cli::{
    Commands, ConfigActions, ConfigCommands, DiskActions, DiskCommands, JobActions, JobCommands,
    TableActions, TableCommands, TaskActions, TaskCommands,
};
use kel_console::common::{load_config, StartupConfig};
use kel_console_client::{ConsoleApiClient, HttpMethod};
use kel_console_controller::{RefreshEvent, RefreshTarget};
use kel_console_core::ConsoleConfig;
use kel_console_testing_utils::{
    config_list_body, disk_body, list_body, stats_body, trigger_body, MockTransport,
    TaskSummaryBuilder,
};
use serde_json::json;

fn app(transport: &MockTransport) -> Application {
    let client = ConsoleApiClient::new(Arc::new(transport.clone()));
    Application::with_client(ConsoleConfig::default(), client)
}

fn tasks(action: TaskActions) -> Commands {
    Commands::Tasks(TaskCommands { action })
}

#[tokio::test]
async fn test_stats_command() {
    let transport = MockTransport::new();
    transport.respond_json(HttpMethod::Get, "/api/tasks/stats", stats_body(12, 2, 9, 1));

    let output = app(&transport)
        .execute(Commands::Stats { days: Some(7) })
        .await
        .unwrap();

    assert!(output.contains("总数 12"));
    assert_eq!(
        transport.last_request().unwrap().query_value("days"),
        Some("7")
    );
}

#[tokio::test]
async fn test_task_list_with_filter_and_page() {
    let transport = MockTransport::new();
    transport.respond_json(
        HttpMethod::Get,
        "/api/tasks",
        list_body(
            vec![TaskSummaryBuilder::new().with_job_code("daily_orders").to_json()],
            41,
        ),
    );

    let output = app(&transport)
        .execute(tasks(TaskActions::List {
            job: Some("daily_orders".to_string()),
            status: Some("failed".to_string()),
            page: 2,
        }))
        .await
        .unwrap();

    let request = transport.last_request().unwrap();
    assert_eq!(request.query_value("jobCode"), Some("daily_orders"));
    assert_eq!(request.query_value("status"), Some("FAILED"));
    assert_eq!(request.query_value("page"), Some("2"));
    assert!(output.contains("第 3/3 页，共 41 条"));
}

#[tokio::test]
async fn test_task_list_rejects_unknown_status() {
    let transport = MockTransport::new();

    let result = app(&transport)
        .execute(tasks(TaskActions::List {
            job: None,
            status: Some("PAUSED".to_string()),
            page: 0,
        }))
        .await;

    assert!(result.is_err());
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_task_get_renders_absent_progress() {
    let transport = MockTransport::new();
    transport
        .respond_json(
            HttpMethod::Get,
            "/api/tasks/5",
            TaskSummaryBuilder::new().with_id(5).with_error("源表不存在").to_json(),
        )
        .respond(HttpMethod::Get, "/api/tasks/5/progress", 404, "")
        .respond(HttpMethod::Get, "/api/tasks/5/statistics", 404, "");

    let output = app(&transport)
        .execute(tasks(TaskActions::Get { task_id: 5 }))
        .await
        .unwrap();

    assert!(output.contains("进度: 暂无"));
    assert!(output.contains("错误信息: 源表不存在"));
}

#[tokio::test]
async fn test_forced_delete_skips_prompt() {
    let transport = MockTransport::new();
    transport
        .respond(HttpMethod::Delete, "/api/tasks/5", 200, "{}")
        .respond_json(HttpMethod::Get, "/api/tasks", list_body(vec![], 0))
        .respond_json(HttpMethod::Get, "/api/tasks/stats", stats_body(0, 0, 0, 0));

    let output = app(&transport)
        .execute(tasks(TaskActions::Delete {
            task_id: 5,
            force: true,
        }))
        .await
        .unwrap();

    assert_eq!(output, "任务删除成功: 5");
}

#[tokio::test]
async fn test_failed_trigger_is_command_error() {
    let transport = MockTransport::new();
    transport.respond_error(HttpMethod::Post, "/api/jobs/orders/extract", 400, "作业配置不存在");

    let err = app(&transport)
        .execute(Commands::Jobs(JobCommands {
            action: JobActions::Extract {
                config_key: "orders".to_string(),
            },
        }))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("作业配置不存在"));
}

#[tokio::test]
async fn test_table_export_command() {
    let transport = MockTransport::new();
    transport
        .respond_json(
            HttpMethod::Post,
            "/api/jobs/orders/tables/t_order/export",
            trigger_body(30, "20240301_002", "表级卸载已触发"),
        )
        .respond_json(HttpMethod::Get, "/api/manual-exports", list_body(vec![], 0));

    let output = app(&transport)
        .execute(Commands::Tables(TableCommands {
            action: TableActions::Export {
                config_key: "orders".to_string(),
                table: "t_order".to_string(),
                mode: None,
            },
        }))
        .await
        .unwrap();

    assert!(output.contains("任务ID: 30"));
    assert!(!transport.requests()[0].has_query("mode"));
}

#[tokio::test]
async fn test_config_create_from_file() {
    let transport = MockTransport::new();
    transport
        .respond(HttpMethod::Post, "/api/jobs/configs", 200, "{}")
        .respond_json(HttpMethod::Get, "/api/jobs/configs", config_list_body(&["orders"]));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "job:\n  name: orders\n").unwrap();

    let output = app(&transport)
        .execute(Commands::Configs(ConfigCommands {
            action: ConfigActions::Create {
                key: None,
                file: file.path().to_string_lossy().to_string(),
            },
        }))
        .await
        .unwrap();

    assert_eq!(output, "配置创建成功");
    let body = transport.requests()[0].body.clone().unwrap();
    assert_eq!(body["configKey"], "");
    assert_eq!(body["contentYaml"], "job:\n  name: orders\n");
}

#[tokio::test]
async fn test_config_delete_global_rejected() {
    let transport = MockTransport::new();

    let result = app(&transport)
        .execute(Commands::Configs(ConfigCommands {
            action: ConfigActions::Delete {
                config_key: "__global__".to_string(),
                force: true,
            },
        }))
        .await;

    assert!(result.is_err());
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_disk_check_uses_default_path() {
    let transport = MockTransport::new();
    transport.respond_json(HttpMethod::Get, "/api/system/disk-space", disk_body("/data", 42.0));

    let output = app(&transport)
        .execute(Commands::Disk(DiskCommands {
            action: DiskActions::Check { path: None },
        }))
        .await
        .unwrap();

    assert!(output.starts_with("磁盘 /data"));
    assert_eq!(
        transport.last_request().unwrap().query_value("path"),
        Some("/data")
    );
}

#[tokio::test]
async fn test_render_snapshot_marks_failed_refresh() {
    let transport = MockTransport::new();
    transport.respond_json(
        HttpMethod::Get,
        "/api/tasks/stats",
        json!({"total": 1, "running": 1, "success": 0, "failed": 0}),
    );
    let app = app(&transport);
    app.session().services().tasks.load_stats(None).await;

    let failed = RefreshEvent {
        target: RefreshTarget::Overview,
        success: false,
    };
    let text = app.render_snapshot(&failed).await;
    assert!(text.starts_with("== monitor/overview (刷新失败，显示上次数据) =="));
    assert!(text.contains("总数 1"));
}

#[test]
fn test_cli_overrides_config_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
        file,
        "[api]\nbase_url = \"http://kel.internal:9000\"\n\n[logging]\nlevel = \"debug\"\n"
    )
    .unwrap();

    let config = load_config(&StartupConfig {
        config_path: Some(file.path().to_string_lossy().to_string()),
        api_url: Some("http://127.0.0.1:18080".to_string()),
        log_level: None,
        log_format: Some("json".to_string()),
    })
    .unwrap();

    assert_eq!(config.api.base_url, "http://127.0.0.1:18080");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
}

#[test]
fn test_missing_config_file_is_error() {
    let result = load_config(&StartupConfig {
        config_path: Some("/nonexistent/console.toml".to_string()),
        ..Default::default()
    });
    assert!(result.is_err());
}
