//! # 振假名指令
//!
//! 形如 `@Ruby1=島,し[00:00.50]ま,[00:02.00],[00:03.00]` 的指令行：
//! 原文、振假名（可带相对时间标签）、可选的开始时间和结束时间。

use regex::Regex;
use std::fmt::Write;
use std::sync::LazyLock;

use crate::converter::parsers::timed_text::{generate_timed_text, parse_timed_text};
use crate::converter::utils::{format_time_tag, parse_time_tag};
use crate::error::ConvertError;
use crate::model::lyric::RubyDirective;

/// 用于判断一行是否为振假名指令
static RUBY_DIRECTIVE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@[^=\s]+=").expect("编译 RUBY_DIRECTIVE_REGEX 失败"));

/// 判断一行是否为振假名指令行。
#[must_use]
pub fn is_ruby_directive_line(line: &str) -> bool {
    RUBY_DIRECTIVE_REGEX.is_match(line)
}

fn malformed(line: &str, reason: &str) -> ConvertError {
    ConvertError::MalformedDirective {
        line: line.to_string(),
        reason: reason.to_string(),
    }
}

/// 解析一行振假名指令。
///
/// 振假名内的时间标签是相对于指令开始时间的时长，保持相对值返回；
/// 开始、结束时间是绝对时间，字段为空表示开放边界。
pub fn parse_ruby_directive(line: &str) -> Result<RubyDirective, ConvertError> {
    let (name, body) = line
        .split_once('=')
        .ok_or_else(|| malformed(line, "缺少 '='"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(malformed(line, "指令名为空"));
    }

    let fields: Vec<&str> = body.split(',').collect();
    if !(2..=4).contains(&fields.len()) {
        return Err(malformed(
            line,
            &format!("需要 2 到 4 个逗号分隔的字段，实际为 {}", fields.len()),
        ));
    }

    let parent_text = fields[0];
    if parent_text.is_empty() {
        return Err(malformed(line, "原文为空"));
    }

    let (ruby_text, ruby_time_tags) = parse_timed_text(fields[1])?;
    if ruby_text.is_empty() {
        return Err(malformed(line, "振假名为空"));
    }

    let parse_bound = |field: Option<&&str>| -> Result<Option<u64>, ConvertError> {
        match field.map(|f| f.trim()) {
            Some(token) if !token.is_empty() => parse_time_tag(token).map(Some),
            _ => Ok(None),
        }
    };

    Ok(RubyDirective {
        name: name.to_string(),
        parent_text: parent_text.to_string(),
        ruby_text,
        ruby_time_tags,
        start_time: parse_bound(fields.get(2))?,
        end_time: parse_bound(fields.get(3))?,
    })
}

/// 生成一行振假名指令。
///
/// 有任一边界时写出开始字段（可能为空），只有存在结束时间时才写出结束字段。
pub fn generate_ruby_directive(directive: &RubyDirective) -> Result<String, ConvertError> {
    let mut output = format!(
        "{}={},{}",
        directive.name,
        directive.parent_text,
        generate_timed_text(&directive.ruby_text, &directive.ruby_time_tags)?
    );

    if directive.has_time_range() {
        output.push(',');
        if let Some(start_time) = directive.start_time {
            output.push_str(&format_time_tag(start_time));
        }
    }
    if let Some(end_time) = directive.end_time {
        write!(output, ",{}", format_time_tag(end_time))?;
    }

    Ok(output)
}
