//! 启动时解析一次 URL 片段，形如 `#monitor/taskList?jobCode=orders`
//!
//! 只在带有 `jobCode` 参数时产生跳转，之后不再监听片段变化。

use tracing::debug;

use crate::view_state::{FilterSeed, MainView, MonitorSub, OpsSub, SubView, ViewStateMachine};

/// 解析得到的导航意图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteIntent {
    pub main: MainView,
    pub sub: Option<SubView>,
    pub job_code: String,
}

/// 按顺序匹配的路径前缀
const ROUTES: [(&str, MainView, Option<SubView>); 3] = [
    (
        "monitor/taskList",
        MainView::Monitor,
        Some(SubView::Monitor(MonitorSub::TaskList)),
    ),
    ("config", MainView::Config, None),
    (
        "ops/execute",
        MainView::Ops,
        Some(SubView::Ops(OpsSub::Execute)),
    ),
];

pub struct HashRouter;

impl HashRouter {
    pub fn parse(fragment: &str) -> Option<RouteIntent> {
        let fragment = fragment.trim().trim_start_matches('#');
        let (path, query) = fragment.split_once('?')?;

        let (_, main, sub) = ROUTES
            .iter()
            .find(|(prefix, _, _)| path.starts_with(prefix))?;

        let job_code = url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "jobCode")
            .map(|(_, value)| value.into_owned())?;

        Some(RouteIntent {
            main: *main,
            sub: *sub,
            job_code,
        })
    }

    /// 解析并应用到状态机；无法识别的片段不做任何事
    pub fn apply(fragment: &str, machine: &mut ViewStateMachine) -> Option<FilterSeed> {
        match Self::parse(fragment) {
            Some(intent) => {
                debug!("启动路由: {:?}", intent);
                Some(machine.navigate_with_filter(intent.main, intent.sub, &intent.job_code))
            }
            None => {
                debug!("启动路由无匹配，保持默认视图: {}", fragment);
                None
            }
        }
    }
}
