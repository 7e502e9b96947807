/// 删除前的人工确认
pub trait Confirmation: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// 固定答复，命令行 `--force` 与测试使用
#[derive(Debug, Clone, Copy)]
pub struct FixedConfirmation(pub bool);

impl Confirmation for FixedConfirmation {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    /// 操作员取消，未发出请求
    Cancelled,
}
