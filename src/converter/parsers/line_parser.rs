//! # 单行解析器
//!
//! 文件中的每一物理行要么是基础歌词行，要么是振假名指令行。
//! 每种行语法实现 [`SingleLineParser`]，按优先级注册后依次尝试。

use crate::converter::parsers::ruby_directive::{
    generate_ruby_directive, is_ruby_directive_line, parse_ruby_directive,
};
use crate::converter::parsers::timed_text::{generate_timed_text, parse_timed_text};
use crate::error::ConvertError;
use crate::model::lyric::{Lyric, RubyDirective};

/// 一行解析后的内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KarLine {
    /// 基础歌词行（此时尚未挂载振假名）
    Lyric(Lyric),
    /// 振假名指令行
    Ruby(RubyDirective),
}

/// 单行语法的编解码能力。
pub trait SingleLineParser: Send + Sync {
    /// 该解析器能否解析这一行
    fn can_decode(&self, line: &str) -> bool;

    fn decode(&self, line: &str) -> Result<KarLine, ConvertError>;

    /// 该解析器能否生成这一内容
    fn can_encode(&self, line: &KarLine) -> bool;

    fn encode(&self, line: &KarLine) -> Result<String, ConvertError>;
}

/// 振假名指令行 `@RubyN=...`
#[derive(Debug, Default, Clone, Copy)]
pub struct RubyDirectiveLineParser;

impl SingleLineParser for RubyDirectiveLineParser {
    fn can_decode(&self, line: &str) -> bool {
        is_ruby_directive_line(line)
    }

    fn decode(&self, line: &str) -> Result<KarLine, ConvertError> {
        parse_ruby_directive(line).map(KarLine::Ruby)
    }

    fn can_encode(&self, line: &KarLine) -> bool {
        matches!(line, KarLine::Ruby(_))
    }

    fn encode(&self, line: &KarLine) -> Result<String, ConvertError> {
        match line {
            KarLine::Ruby(directive) => generate_ruby_directive(directive),
            KarLine::Lyric(_) => Err(unsupported_line()),
        }
    }
}

/// 逐字时间标签歌词行。任何非空行都可以作为歌词行，因此应排在最后。
#[derive(Debug, Default, Clone, Copy)]
pub struct LyricLineParser;

impl SingleLineParser for LyricLineParser {
    fn can_decode(&self, line: &str) -> bool {
        !line.trim().is_empty()
    }

    fn decode(&self, line: &str) -> Result<KarLine, ConvertError> {
        let (text, time_tags) = parse_timed_text(line)?;
        Ok(KarLine::Lyric(Lyric {
            text,
            time_tags,
            ruby_tags: Vec::new(),
        }))
    }

    fn can_encode(&self, line: &KarLine) -> bool {
        matches!(line, KarLine::Lyric(_))
    }

    fn encode(&self, line: &KarLine) -> Result<String, ConvertError> {
        match line {
            KarLine::Lyric(lyric) => generate_timed_text(&lyric.text, &lyric.time_tags),
            KarLine::Ruby(_) => Err(unsupported_line()),
        }
    }
}

fn unsupported_line() -> ConvertError {
    ConvertError::Internal("该解析器不支持此类型的行".to_string())
}

/// 按优先级排列的默认解析器列表：振假名指令优先，歌词行兜底。
#[must_use]
pub fn default_line_parsers() -> Vec<Box<dyn SingleLineParser>> {
    vec![Box::new(RubyDirectiveLineParser), Box::new(LyricLineParser)]
}

/// 交给第一个能处理该行的解析器解码。没有解析器接受时返回 `None`。
pub fn decode_line(
    parsers: &[Box<dyn SingleLineParser>],
    line: &str,
) -> Option<Result<KarLine, ConvertError>> {
    parsers
        .iter()
        .find(|parser| parser.can_decode(line))
        .map(|parser| parser.decode(line))
}

/// 交给第一个能处理该内容的解析器编码。没有解析器接受时返回 `None`。
pub fn encode_line(
    parsers: &[Box<dyn SingleLineParser>],
    line: &KarLine,
) -> Option<Result<String, ConvertError>> {
    parsers
        .iter()
        .find(|parser| parser.can_encode(line))
        .map(|parser| parser.encode(line))
}
