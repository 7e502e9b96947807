//! 终端文本渲染
//!
//! 全部函数只生成字符串，输出由调用方负责。

use kel_console_controller::{DiskReport, ManifestView, TaskDetail, TriggerOutcome};
use kel_console_domain::{
    format_bytes, format_date_time, format_duration, format_percentage, JobConfigEntry,
    ManualExportRecord, Pagination, TaskStatistics, TaskStats, TaskSummary,
};

const NONE: &str = "-";

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(NONE)
}

pub fn render_stats(stats: &TaskStats) -> String {
    format!(
        "任务统计: 总数 {}  运行中 {}  成功 {}  失败 {}",
        stats.total, stats.running, stats.success, stats.failed
    )
}

pub fn render_task_table(tasks: &[TaskSummary]) -> String {
    let mut lines = vec![
        format!(
            "{:<8} {:<24} {:<18} {:<8} {:<20} {:<12}",
            "ID", "作业", "批次", "状态", "开始时间", "耗时"
        ),
        "-".repeat(96),
    ];

    if tasks.is_empty() {
        lines.push("暂无任务".to_string());
    }

    for task in tasks {
        lines.push(format!(
            "{:<8} {:<24} {:<18} {:<8} {:<20} {:<12}",
            task.id,
            task.job_code,
            or_dash(task.batch_number.as_deref()),
            task.status.label(),
            format_date_time(task.start_time),
            format_duration(task.duration_seconds()),
        ));
    }

    lines.join("\n")
}

pub fn render_pagination(pagination: &Pagination) -> String {
    format!(
        "第 {}/{} 页，共 {} 条",
        pagination.page + 1,
        pagination.total_pages().max(1),
        pagination.total
    )
}

pub fn render_task_detail(detail: &TaskDetail) -> String {
    let task = &detail.task;
    let mut lines = vec![
        "任务详情:".to_string(),
        format!("  ID: {}", task.id),
        format!("  作业: {}", task.job_code),
        format!("  批次: {}", or_dash(task.batch_number.as_deref())),
        format!("  节点: {}", or_dash(task.node_name.as_deref())),
        format!("  状态: {}", task.status.label()),
        format!("  当前阶段: {}", or_dash(task.current_stage.as_deref())),
        format!("  开始时间: {}", format_date_time(task.start_time)),
        format!("  结束时间: {}", format_date_time(task.end_time)),
        format!("  耗时: {}", format_duration(task.duration_seconds())),
    ];

    if let Some(message) = task.error_message.as_deref().filter(|m| !m.is_empty()) {
        lines.push(format!("  错误信息: {message}"));
    }

    match &detail.progress {
        Some(progress) => {
            lines.push(format!(
                "  进度: {}  阶段: {}",
                format_percentage(progress.percent()),
                or_dash(progress.current_stage.as_deref())
            ));
            if let Some(remaining) = progress.estimated_remaining_seconds {
                lines.push(format!("  预计剩余: {}", format_duration(Some(remaining))));
            }
        }
        None => lines.push("  进度: 暂无".to_string()),
    }

    match &detail.statistics {
        Some(statistics) => lines.push(render_statistics(statistics)),
        None => lines.push("  统计: 暂无".to_string()),
    }

    let log = detail.execution_log();
    if !log.is_empty() {
        lines.push("  执行日志:".to_string());
        for entry in log {
            lines.push(format!(
                "    {} [{}] {} {}",
                format_date_time(entry.timestamp),
                or_dash(entry.level.as_deref()),
                or_dash(entry.stage.as_deref()),
                entry.message
            ));
        }
    }

    lines.join("\n")
}

fn render_statistics(statistics: &TaskStatistics) -> String {
    let mut lines = vec![
        "  统计:".to_string(),
        format!(
            "    表数 {}  行数 {}  文件数 {}  文件大小 {}",
            statistics.total_tables.unwrap_or(0),
            statistics.total_rows.unwrap_or(0),
            statistics.total_files.unwrap_or(0),
            format_bytes(statistics.total_file_size),
        ),
    ];
    if let Some(ratio) = statistics.compression_ratio {
        lines.push(format!(
            "    压缩 {} -> {} (压缩率 {})",
            format_bytes(statistics.original_size),
            format_bytes(statistics.compressed_size),
            format_percentage(ratio * 100.0)
        ));
    }
    for stage in &statistics.stage_metrics {
        let duration = stage.duration_ms.map(|ms| ms / 1000);
        lines.push(format!(
            "    阶段 {:<12} {:<10} {}",
            stage.stage_name,
            or_dash(stage.status.as_deref()),
            format_duration(duration)
        ));
    }
    lines.join("\n")
}

pub fn render_manifest(view: &ManifestView) -> String {
    let Some(manifest) = &view.manifest else {
        return format!("任务 {} 的清单尚未生成", view.task_id);
    };

    let mut lines = vec![
        format!("任务 {} 的清单:", view.task_id),
        format!("  版本: {}", or_dash(manifest.version.as_deref())),
        format!("  作业: {}", or_dash(manifest.job_name.as_deref())),
        format!("  批次: {}", or_dash(manifest.batch_number.as_deref())),
        format!(
            "  文件: {} 个，共 {}",
            manifest.files.len(),
            format_bytes(Some(manifest.total_file_size()))
        ),
    ];
    for file in &manifest.files {
        lines.push(format!(
            "    {:<40} {:>12} {}",
            file.name,
            format_bytes(file.size),
            or_dash(file.sm3.as_deref())
        ));
    }
    if !manifest.splits.is_empty() {
        lines.push(format!("  分卷: {} 个", manifest.splits.len()));
    }
    lines.join("\n")
}

pub fn render_trigger_outcome(outcome: &TriggerOutcome) -> String {
    match outcome {
        TriggerOutcome::Started {
            task_id,
            batch_number,
            message,
            manual_export_id,
        } => {
            let mut text = format!("✓ {message}");
            if let Some(id) = task_id {
                text.push_str(&format!("\n  任务ID: {id}"));
            }
            if let Some(batch) = batch_number {
                text.push_str(&format!("\n  批次号: {batch}"));
            }
            if let Some(id) = manual_export_id {
                text.push_str(&format!("\n  手工导出ID: {id}"));
            }
            text
        }
        TriggerOutcome::Failed { message } => format!("✗ {message}"),
    }
}

pub fn render_manual_exports(records: &[ManualExportRecord], pagination: &Pagination) -> String {
    let mut lines = vec![
        format!(
            "{:<6} {:<6} {:<20} {:<24} {:<10} {:<20}",
            "ID", "类型", "作业", "表", "状态", "申请时间"
        ),
        "-".repeat(90),
    ];
    for record in records {
        lines.push(format!(
            "{:<6} {:<6} {:<20} {:<24} {:<10} {:<20}",
            record.id,
            record.kind.label(),
            record.job_code,
            record.table_name,
            or_dash(record.status.as_deref()),
            format_date_time(record.requested_at),
        ));
    }
    lines.push(render_pagination(pagination));
    lines.join("\n")
}

pub fn render_config_entries(entries: &[JobConfigEntry]) -> String {
    let mut lines = vec![
        format!("{:<32} {:<20}", "配置键", "更新时间"),
        "-".repeat(54),
    ];
    for entry in entries {
        lines.push(format!(
            "{:<32} {:<20}",
            entry.config_key,
            format_date_time(entry.updated_at)
        ));
    }
    lines.join("\n")
}

pub fn render_disk_report(report: &DiskReport) -> String {
    let info = &report.info;
    format!(
        "磁盘 {}: 已用 {:.2} GB / 共 {:.2} GB ({})，可用 {:.2} GB [{}]",
        info.path,
        info.used_space_gb,
        info.total_space_gb,
        format_percentage(info.used_percentage),
        info.usable_space_gb,
        report.level.label()
    )
}
