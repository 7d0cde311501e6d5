use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 默认存根上限：4 MiB。
pub const DEFAULT_MAX_STUB_SIZE: usize = 4 * 1024 * 1024;

/// 端点宿主配置。
///
/// # 契约说明（What）
/// - `max_stub_size`：单个请求存根的字节上限，超出时在解码前直接以故障拒绝；
/// - `enforce_deadlines`：是否在传输边界以调用上下文的取消/截止状态竞争分发 Future；
///   关闭后处理器仍能读取上下文，只是宿主不再代为中止。
///
/// 缺省字段取默认值，允许只写需要覆盖的键：
///
/// ```toml
/// max_stub_size = 65536
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub max_stub_size: usize,
    pub enforce_deadlines: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_stub_size: DEFAULT_MAX_STUB_SIZE,
            enforce_deadlines: true,
        }
    }
}

impl HostConfig {
    /// 从 TOML 文本加载配置。
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: HostConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_stub_size == 0 {
            return Err(ConfigError::Invalid {
                field: "max_stub_size",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }
}

/// 配置加载失败。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse host config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid host config field `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
