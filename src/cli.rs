use clap::{Args, Parser, Subcommand, ValueEnum};
use kel_console_client::ConfigKeyScope;

/// 控制台命令行入口
#[derive(Parser, Debug)]
#[command(name = "kel-console")]
#[command(version = "1.0.0")]
#[command(about = "KEL 卸载/加载作业平台 - 运维控制台")]
#[command(long_about = "提供任务监控、作业触发、表级卸载/加载、作业配置管理与磁盘检查的命令行接口")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API服务器基础URL，覆盖配置文件
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// 配置文件路径
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// 日志级别
    #[arg(short = 'l', long, global = true, value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: Option<String>,

    /// 日志格式
    #[arg(long, global = true, value_parser = ["json", "pretty", "text"])]
    pub log_format: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 持续监控：挂载会话并按当前视图定时刷新，Ctrl+C 退出
    Watch {
        /// 启动路由，如 '#monitor/taskList?jobCode=daily_orders'
        #[arg(long)]
        route: Option<String>,
        /// 概览统计的天数窗口
        #[arg(long)]
        days: Option<u32>,
    },
    /// 任务统计
    Stats {
        #[arg(long)]
        days: Option<u32>,
    },
    /// 任务查询与管理
    Tasks(TaskCommands),
    /// 作业级触发
    Jobs(JobCommands),
    /// 表级卸载与加载
    Tables(TableCommands),
    /// 作业配置管理
    Configs(ConfigCommands),
    /// 磁盘空间
    Disk(DiskCommands),
}

#[derive(Args, Debug)]
pub struct TaskCommands {
    #[command(subcommand)]
    pub action: TaskActions,
}

#[derive(Subcommand, Debug)]
pub enum TaskActions {
    /// 分页列出任务
    List {
        /// 按作业编码过滤
        #[arg(short, long)]
        job: Option<String>,
        /// 按状态过滤 (RUNNING/SUCCESS/FAILED/CANCELLED)
        #[arg(short, long)]
        status: Option<String>,
        /// 页码，从 0 开始
        #[arg(short, long, default_value = "0")]
        page: u32,
    },
    /// 最近任务
    Recent {
        #[arg(long)]
        days: Option<u32>,
    },
    /// 任务详情（含进度与统计）
    Get { task_id: i64 },
    /// 任务产物清单
    Manifest { task_id: i64 },
    /// 删除任务
    Delete {
        task_id: i64,
        /// 强制删除 (不询问确认)
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct JobCommands {
    #[command(subcommand)]
    pub action: JobActions,
}

#[derive(Subcommand, Debug)]
pub enum JobActions {
    /// 触发卸载作业
    Extract { config_key: String },
    /// 触发加载作业
    Load {
        config_key: String,
        /// 源批次号，为空时由服务端选择
        #[arg(long)]
        source_batch: Option<String>,
    },
    /// 列出配置键
    Keys {
        #[arg(long, value_enum, default_value_t = KeyScope::All)]
        scope: KeyScope,
    },
    /// 列出作业配置中的表
    Tables { config_key: String },
}

#[derive(Args, Debug)]
pub struct TableCommands {
    #[command(subcommand)]
    pub action: TableActions,
}

#[derive(Subcommand, Debug)]
pub enum TableActions {
    /// 表级卸载
    Export {
        config_key: String,
        table: String,
        /// 卸载模式
        #[arg(long)]
        mode: Option<String>,
    },
    /// 表级加载
    Load {
        config_key: String,
        table: String,
        #[arg(long)]
        source_batch: Option<String>,
    },
    /// 手工导出历史
    History {
        #[arg(short, long, default_value = "0")]
        page: u32,
    },
}

#[derive(Args, Debug)]
pub struct ConfigCommands {
    #[command(subcommand)]
    pub action: ConfigActions,
}

#[derive(Subcommand, Debug)]
pub enum ConfigActions {
    /// 列出作业配置
    List,
    /// 列出配置键
    Keys,
    /// 查看配置 YAML
    Get { config_key: String },
    /// 从 YAML 文件创建配置
    Create {
        /// 配置键，留空时由服务端从 job.name 推导
        #[arg(short, long)]
        key: Option<String>,
        #[arg(short, long)]
        file: String,
    },
    /// 用 YAML 文件更新配置
    Update {
        config_key: String,
        #[arg(short, long)]
        file: String,
    },
    /// 删除配置
    Delete {
        config_key: String,
        #[arg(short, long)]
        force: bool,
    },
    /// 从服务端目录导入全部配置
    Import,
    /// 配置说明文档
    Spec,
}

#[derive(Args, Debug)]
pub struct DiskCommands {
    #[command(subcommand)]
    pub action: DiskActions,
}

#[derive(Subcommand, Debug)]
pub enum DiskActions {
    /// 检查路径所在磁盘的使用率，缺省使用配置中的路径
    Check { path: Option<String> },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope {
    All,
    TableExport,
    TableLoad,
}

impl From<KeyScope> for ConfigKeyScope {
    fn from(scope: KeyScope) -> Self {
        match scope {
            KeyScope::All => ConfigKeyScope::All,
            KeyScope::TableExport => ConfigKeyScope::TableExport,
            KeyScope::TableLoad => ConfigKeyScope::TableLoad,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "kel-console",
            "tasks",
            "list",
            "--job",
            "orders",
            "--api-url",
            "http://kel:9000",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://kel:9000"));
        match cli.command {
            Commands::Tasks(TaskCommands {
                action: TaskActions::List { job, status, page },
            }) => {
                assert_eq!(job.as_deref(), Some("orders"));
                assert_eq!(status, None);
                assert_eq!(page, 0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_key_scope_value() {
        let cli =
            Cli::try_parse_from(["kel-console", "jobs", "keys", "--scope", "table-load"]).unwrap();
        match cli.command {
            Commands::Jobs(JobCommands {
                action: JobActions::Keys { scope },
            }) => assert_eq!(ConfigKeyScope::from(scope), ConfigKeyScope::TableLoad),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        assert!(Cli::try_parse_from(["kel-console", "stats", "--log-format", "xml"]).is_err());
    }
}
