use kel_console_client::{ConfigKeyScope, ConsoleApiClient};
use kel_console_core::{ConsoleError, ConsoleResult};
use kel_console_domain::{required_text, ConfigKey, JobConfigEntry};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::confirm::{Confirmation, Deletion};

const YAML_REQUIRED: &str = "配置内容不能为空";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    /// 配置键可编辑，留空由服务端生成
    Create,
    /// 配置键固定
    Edit,
}

/// 配置编辑表单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEditor {
    pub mode: EditorMode,
    pub config_key: String,
    pub content_yaml: String,
}

impl ConfigEditor {
    pub fn key_editable(&self) -> bool {
        self.mode == EditorMode::Create
    }
}

#[derive(Debug, Default)]
struct ConfigState {
    entries: Vec<JobConfigEntry>,
    focused: Option<String>,
    editor: Option<ConfigEditor>,
}

/// 作业配置的查询与增删改
pub struct JobConfigService {
    client: ConsoleApiClient,
    state: RwLock<ConfigState>,
}

impl JobConfigService {
    pub fn new(client: ConsoleApiClient) -> Self {
        Self {
            client,
            state: RwLock::new(ConfigState::default()),
        }
    }

    pub async fn list(&self) -> ConsoleResult<Vec<String>> {
        self.client
            .config_keys(ConfigKeyScope::All)
            .await
            .inspect_err(|e| error!("加载配置键列表失败: {}", e))
    }

    /// 配置管理页使用的完整列表，同时更新持有的状态
    pub async fn list_detailed(&self) -> ConsoleResult<Vec<JobConfigEntry>> {
        let entries = self.client.list_configs().await?;
        self.state.write().await.entries = entries.clone();
        Ok(entries)
    }

    pub async fn read(&self, config_key: &str) -> ConsoleResult<String> {
        let key = ConfigKey::parse("configKey", config_key)?;
        self.client
            .read_config(&key)
            .await
            .inspect_err(|e| error!("加载配置失败: {}", e))
    }

    pub async fn create(&self, config_key: Option<&str>, content_yaml: &str) -> ConsoleResult<()> {
        required_text("contentYaml", content_yaml, YAML_REQUIRED)?;
        let key = match config_key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(raw) => Some(ConfigKey::parse("configKey", raw)?),
            None => None,
        };

        self.client
            .create_config(key.as_ref(), content_yaml)
            .await
            .inspect_err(|e| error!("保存配置失败: {}", e))?;
        info!("配置已创建: {}", key.as_ref().map(ConfigKey::as_str).unwrap_or("<由服务端生成>"));
        self.refresh_after_change().await;
        Ok(())
    }

    pub async fn update(&self, config_key: &str, content_yaml: &str) -> ConsoleResult<()> {
        let key = ConfigKey::parse("configKey", config_key)?;
        required_text("contentYaml", content_yaml, YAML_REQUIRED)?;

        self.client
            .update_config(&key, content_yaml)
            .await
            .inspect_err(|e| error!("保存配置失败: {}", e))?;
        info!("配置已更新: {}", key);
        self.refresh_after_change().await;
        Ok(())
    }

    /// 保留的全局配置键在本地直接拒绝，不发请求也不询问确认
    pub async fn delete(
        &self,
        config_key: &str,
        confirmation: &dyn Confirmation,
    ) -> ConsoleResult<Deletion> {
        let key = ConfigKey::parse("configKey", config_key)?;
        if key.is_global() {
            return Err(ConsoleError::validation(
                "configKey",
                format!("不能删除全局配置 {key}"),
            ));
        }
        if !confirmation.confirm(&format!("确定要删除配置 {key} 吗？")) {
            return Ok(Deletion::Cancelled);
        }

        self.client
            .delete_config(&key)
            .await
            .inspect_err(|e| error!("删除配置失败: {}", e))?;
        info!("配置已删除: {}", key);
        self.refresh_after_change().await;
        Ok(Deletion::Deleted)
    }

    /// 服务端返回的提示原样透传
    pub async fn import_all(&self) -> ConsoleResult<String> {
        let response = self
            .client
            .import_configs()
            .await
            .inspect_err(|e| error!("导入配置失败: {}", e))?;
        info!("配置导入完成: {}", response.message);
        Ok(response.message)
    }

    /// 配置说明文档的 Markdown 原文
    pub async fn fetch_spec_document(&self) -> ConsoleResult<String> {
        self.client
            .spec_document()
            .await
            .inspect_err(|e| error!("加载配置说明失败: {}", e))
    }

    pub async fn open_create(&self) -> ConfigEditor {
        let editor = ConfigEditor {
            mode: EditorMode::Create,
            config_key: String::new(),
            content_yaml: String::new(),
        };
        self.state.write().await.editor = Some(editor.clone());
        editor
    }

    pub async fn open_edit(&self, config_key: &str) -> ConsoleResult<ConfigEditor> {
        let key = ConfigKey::parse("configKey", config_key)?;
        let content_yaml = self.read(key.as_str()).await?;
        let editor = ConfigEditor {
            mode: EditorMode::Edit,
            config_key: key.to_string(),
            content_yaml,
        };
        self.state.write().await.editor = Some(editor.clone());
        Ok(editor)
    }

    /// 编辑模式下配置键不可修改，传入的 `config_key` 被忽略
    pub async fn edit_form(&self, config_key: Option<&str>, content_yaml: &str) -> ConsoleResult<()> {
        let mut state = self.state.write().await;
        let editor = state
            .editor
            .as_mut()
            .ok_or_else(|| ConsoleError::validation("editor", "配置编辑表单未打开"))?;
        if let (EditorMode::Create, Some(key)) = (editor.mode, config_key) {
            editor.config_key = key.to_string();
        }
        editor.content_yaml = content_yaml.to_string();
        Ok(())
    }

    /// 按表单模式分派到创建或更新，成功后关闭表单
    pub async fn save(&self) -> ConsoleResult<()> {
        let editor = self
            .state
            .read()
            .await
            .editor
            .clone()
            .ok_or_else(|| ConsoleError::validation("editor", "配置编辑表单未打开"))?;

        match editor.mode {
            EditorMode::Create => {
                self.create(Some(&editor.config_key), &editor.content_yaml)
                    .await?
            }
            EditorMode::Edit => {
                self.update(&editor.config_key, &editor.content_yaml)
                    .await?
            }
        }
        self.state.write().await.editor = None;
        Ok(())
    }

    pub async fn close_editor(&self) {
        self.state.write().await.editor = None;
    }

    pub async fn editor(&self) -> Option<ConfigEditor> {
        self.state.read().await.editor.clone()
    }

    pub async fn focus(&self, config_key: &str) {
        let key = config_key.trim();
        self.state.write().await.focused = (!key.is_empty()).then(|| key.to_string());
    }

    pub async fn focused(&self) -> Option<String> {
        self.state.read().await.focused.clone()
    }

    pub async fn entries(&self) -> Vec<JobConfigEntry> {
        self.state.read().await.entries.clone()
    }

    async fn refresh_after_change(&self) {
        if let Err(e) = self.list_detailed().await {
            warn!("刷新配置列表失败: {}", e);
        }
    }
}
