use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// 振假名指令名的默认前缀，生成 `@Ruby1`、`@Ruby2`……
pub const DEFAULT_RUBY_TAG_PREFIX: &str = "@Ruby";

/// KAR 解析选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
pub struct KarParsingOptions {
    /// 为 `true` 时，无法定位或存在歧义的振假名指令只记录为警告并被跳过；
    /// 默认为 `false`，此时解析直接失败。
    #[serde(default)]
    pub skip_unresolved_ruby: bool,
}

/// KAR 生成选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct KarGenerationOptions {
    /// 振假名指令名前缀，序号从 1 开始追加在其后。
    pub ruby_tag_prefix: String,
    /// 是否把相邻、文本相同且相对计时相同的振假名合并为一条指令。
    pub merge_adjacent_ruby: bool,
}

impl Default for KarGenerationOptions {
    fn default() -> Self {
        Self {
            ruby_tag_prefix: DEFAULT_RUBY_TAG_PREFIX.to_string(),
            merge_adjacent_ruby: true,
        }
    }
}

/// 可以从 TOML 加载的完整配置。
///
/// ```toml
/// [parsing]
/// skip_unresolved_ruby = true
///
/// [generation]
/// ruby_tag_prefix = "@Ruby"
/// merge_adjacent_ruby = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KarConfig {
    #[serde(default)]
    pub parsing: KarParsingOptions,
    #[serde(default)]
    pub generation: KarGenerationOptions,
}

impl KarConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConvertError> {
        Ok(toml::from_str(content)?)
    }
}
