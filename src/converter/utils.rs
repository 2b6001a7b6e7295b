//! 时间标签的解析与格式化。
//!
//! 同一套语法既用于绝对时间也用于相对时长，如何解释由调用方决定。

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ConvertError;

/// 匹配一个完整的时间标签，分隔符可以是 `.` 或 `:`
static TIME_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(?P<minutes>\d{2,}):(?P<seconds>\d{2})[.:](?P<centiseconds>\d{2})]$")
        .expect("编译 TIME_TAG_REGEX 失败")
});

/// 将 `[mm:ss.cc]` 或 `[mm:ss:cc]` 形式的时间标签解析为毫秒。
pub fn parse_time_tag(token: &str) -> Result<u64, ConvertError> {
    let caps = TIME_TAG_REGEX
        .captures(token)
        .ok_or_else(|| ConvertError::MalformedTimestamp(token.to_string()))?;

    let field = |name: &str| -> Result<u64, ConvertError> {
        caps[name]
            .parse::<u64>()
            .map_err(|_| ConvertError::MalformedTimestamp(token.to_string()))
    };

    let minutes = field("minutes")?;
    let seconds = field("seconds")?;
    let centiseconds = field("centiseconds")?;

    minutes
        .checked_mul(60)
        .and_then(|total| total.checked_add(seconds))
        .and_then(|total| total.checked_mul(1000))
        .and_then(|total| total.checked_add(centiseconds * 10))
        .ok_or_else(|| ConvertError::MalformedTimestamp(token.to_string()))
}

/// 将毫秒格式化为 `[mm:ss.cc]`，不足一厘秒的部分被截断。
#[must_use]
pub fn format_time_tag(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let centiseconds = (ms % 1000) / 10;
    format!("[{minutes:02}:{seconds:02}.{centiseconds:02}]")
}
