use std::fmt;

use thiserror::Error;

/// 定义 KAR 歌词解析与生成过程中可能发生的各种错误。
#[derive(Error, Debug)]
pub enum ConvertError {
    /// 时间标签不符合 `[mm:ss.cc]` / `[mm:ss:cc]` 格式。
    #[error("无效的时间标签: '{0}'")]
    MalformedTimestamp(String),
    /// 出现了 `[` 但直到行尾都没有对应的 `]`。
    #[error("时间标签未闭合 (位置 {position}): '{text}'")]
    UnterminatedTimestamp {
        /// 出错的原始文本
        text: String,
        /// 未闭合的 `[` 所在的字符位置
        position: usize,
    },
    /// 振假名指令行缺少 `name=` 前缀或逗号分隔的字段数量不对。
    #[error("无效的振假名指令 '{line}': {reason}")]
    MalformedDirective {
        /// 出错的指令行
        line: String,
        /// 具体原因
        reason: String,
    },
    /// 没有任何歌词行的片段能满足指令的约束。
    #[error("找不到振假名 '{ruby_text}' 对应的原文 '{parent_text}'")]
    RubyTargetNotFound {
        /// 指令中的原文
        parent_text: String,
        /// 指令中的振假名
        ruby_text: String,
    },
    /// 有多个片段同时满足指令的约束。
    #[error("振假名 '{ruby_text}' 对应的原文 '{parent_text}' 有 {candidates} 个候选位置")]
    AmbiguousRubyTarget {
        /// 指令中的原文
        parent_text: String,
        /// 指令中的振假名
        ruby_text: String,
        /// 满足条件的候选数量
        candidates: usize,
    },
    /// 时间标签随位置增加而倒退。
    #[error("时间标签不是单调递增的: {0}")]
    NonMonotonicTimeTags(String),
    /// 振假名的字符范围超出了所属歌词行。
    #[error("无效的振假名: {0}")]
    InvalidRubyTag(String),
    /// 内部逻辑错误或未明确分类的错误。
    #[error("错误: {0}")]
    Internal(String),
    /// 字符串格式化错误。
    #[error("格式错误: {0}")]
    Format(#[from] fmt::Error),
    /// 配置文件解析错误。
    #[error("配置解析失败: {0}")]
    Config(#[from] toml::de::Error),
}

impl From<ConvertError> for std::io::Error {
    fn from(err: ConvertError) -> Self {
        Self::other(err)
    }
}
