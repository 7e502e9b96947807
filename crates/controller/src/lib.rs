//! KEL 控制台的视图状态与业务编排
//!
//! 导航状态机、启动路由、定时刷新调度与各个服务。控制器自身不做任何输出，
//! 渲染由调用方根据各服务持有的状态完成。

pub mod confirm;
pub mod polling;
pub mod router;
pub mod services;
pub mod session;
pub mod view_state;

pub use confirm::{Confirmation, Deletion, FixedConfirmation};
pub use polling::{PollingScheduler, RefreshEvent, RefreshHandler};
pub use router::{HashRouter, RouteIntent};
pub use services::*;
pub use session::ConsoleSession;
pub use view_state::{
    ActiveView, FilterSeed, MainView, MonitorSub, OpsSub, RefreshTarget, SubView, ViewState,
    ViewStateMachine,
};
