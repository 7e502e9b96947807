//! 导航状态机
//!
//! 主视图与各自的子视图分别保存。离开某个主视图再回来时，子视图保持上次的值。
//! 状态机没有终止状态，也不拒绝任何转换。

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MainView {
    #[default]
    Monitor,
    Config,
    Ops,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonitorSub {
    #[default]
    Overview,
    TaskList,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpsSub {
    #[default]
    Execute,
    TableExport,
    TableLoad,
}

/// 导航时指定的子视图
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubView {
    Monitor(MonitorSub),
    Ops(OpsSub),
}

impl From<MonitorSub> for SubView {
    fn from(sub: MonitorSub) -> Self {
        SubView::Monitor(sub)
    }
}

impl From<OpsSub> for SubView {
    fn from(sub: OpsSub) -> Self {
        SubView::Ops(sub)
    }
}

/// 当前处于激活状态的叶子视图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActiveView {
    Monitor(MonitorSub),
    Config,
    Ops(OpsSub),
}

impl fmt::Display for ActiveView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveView::Monitor(MonitorSub::Overview) => f.write_str("monitor/overview"),
            ActiveView::Monitor(MonitorSub::TaskList) => f.write_str("monitor/taskList"),
            ActiveView::Config => f.write_str("config"),
            ActiveView::Ops(OpsSub::Execute) => f.write_str("ops/execute"),
            ActiveView::Ops(OpsSub::TableExport) => f.write_str("ops/tableExport"),
            ActiveView::Ops(OpsSub::TableLoad) => f.write_str("ops/tableLoad"),
        }
    }
}

/// 定时刷新在当前视图下应刷新的内容
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshTarget {
    /// 统计汇总与最近任务
    Overview,
    TaskList,
    ManualExports,
    Configs,
    Idle,
}

impl RefreshTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshTarget::Overview => "overview",
            RefreshTarget::TaskList => "task_list",
            RefreshTarget::ManualExports => "manual_exports",
            RefreshTarget::Configs => "configs",
            RefreshTarget::Idle => "idle",
        }
    }
}

impl fmt::Display for RefreshTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 跨视图跳转时携带的过滤种子，由会话应用到对应服务
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSeed {
    /// 任务列表按作业过滤，页码回到 0
    TaskList { job_code: String },
    /// 配置视图聚焦到某个配置键
    Config { config_key: String },
    /// 执行表单预填配置键
    Execute { config_key: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    pub current_view: MainView,
    pub monitor_sub: MonitorSub,
    pub ops_sub: OpsSub,
}

impl ViewState {
    pub fn active(&self) -> ActiveView {
        match self.current_view {
            MainView::Monitor => ActiveView::Monitor(self.monitor_sub),
            MainView::Config => ActiveView::Config,
            MainView::Ops => ActiveView::Ops(self.ops_sub),
        }
    }

    pub fn refresh_target(&self) -> RefreshTarget {
        match self.active() {
            ActiveView::Monitor(MonitorSub::Overview) => RefreshTarget::Overview,
            ActiveView::Monitor(MonitorSub::TaskList) => RefreshTarget::TaskList,
            ActiveView::Ops(OpsSub::TableExport) => RefreshTarget::ManualExports,
            ActiveView::Config => RefreshTarget::Configs,
            ActiveView::Ops(OpsSub::Execute) | ActiveView::Ops(OpsSub::TableLoad) => {
                RefreshTarget::Idle
            }
        }
    }

    pub fn is_overview(&self) -> bool {
        self.active() == ActiveView::Monitor(MonitorSub::Overview)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewStateMachine {
    state: ViewState,
}

impl ViewStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn navigate_to(&mut self, main: MainView, sub: Option<SubView>) -> ViewState {
        self.state.current_view = main;
        match sub {
            Some(SubView::Monitor(sub)) => self.state.monitor_sub = sub,
            Some(SubView::Ops(sub)) => self.state.ops_sub = sub,
            None => {}
        }
        self.state
    }

    pub fn navigate_with_filter(
        &mut self,
        main: MainView,
        sub: Option<SubView>,
        job_code: &str,
    ) -> FilterSeed {
        self.navigate_to(main, sub);
        let job_code = job_code.trim().to_string();
        match main {
            MainView::Monitor => FilterSeed::TaskList { job_code },
            MainView::Config => FilterSeed::Config {
                config_key: job_code,
            },
            MainView::Ops => FilterSeed::Execute {
                config_key: job_code,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_monitor_overview() {
        let machine = ViewStateMachine::new();
        assert_eq!(
            machine.state().active(),
            ActiveView::Monitor(MonitorSub::Overview)
        );
        assert_eq!(machine.state().refresh_target(), RefreshTarget::Overview);
    }

    #[test]
    fn test_sub_view_restored_after_leaving() {
        let mut machine = ViewStateMachine::new();
        machine.navigate_to(MainView::Ops, Some(OpsSub::TableExport.into()));
        machine.navigate_to(MainView::Monitor, None);
        let state = machine.navigate_to(MainView::Ops, None);

        assert_eq!(state.ops_sub, OpsSub::TableExport);
        assert_eq!(state.active(), ActiveView::Ops(OpsSub::TableExport));
    }

    #[test]
    fn test_monitor_sub_kept_while_in_ops() {
        let mut machine = ViewStateMachine::new();
        machine.navigate_to(MainView::Monitor, Some(MonitorSub::TaskList.into()));
        let state = machine.navigate_to(MainView::Ops, Some(OpsSub::TableLoad.into()));
        assert_eq!(state.monitor_sub, MonitorSub::TaskList);
        assert_eq!(state.refresh_target(), RefreshTarget::Idle);
    }

    #[test]
    fn test_refresh_targets() {
        let mut machine = ViewStateMachine::new();
        let cases = [
            (MainView::Monitor, Some(MonitorSub::TaskList.into()), RefreshTarget::TaskList),
            (MainView::Config, None, RefreshTarget::Configs),
            (MainView::Ops, Some(OpsSub::TableExport.into()), RefreshTarget::ManualExports),
            (MainView::Ops, Some(OpsSub::Execute.into()), RefreshTarget::Idle),
        ];
        for (main, sub, expected) in cases {
            assert_eq!(machine.navigate_to(main, sub).refresh_target(), expected);
        }
    }

    #[test]
    fn test_navigate_with_filter_seeds() {
        let mut machine = ViewStateMachine::new();
        let seed = machine.navigate_with_filter(
            MainView::Monitor,
            Some(MonitorSub::TaskList.into()),
            " orders ",
        );
        assert_eq!(
            seed,
            FilterSeed::TaskList {
                job_code: "orders".to_string()
            }
        );

        let seed = machine.navigate_with_filter(MainView::Config, None, "orders");
        assert!(matches!(seed, FilterSeed::Config { .. }));
        assert_eq!(machine.state().current_view, MainView::Config);
    }

    #[test]
    fn test_active_view_display() {
        assert_eq!(ActiveView::Ops(OpsSub::TableExport).to_string(), "ops/tableExport");
    }
}
