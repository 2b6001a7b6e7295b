//! # 逐字时间标签文本
//!
//! `[00:01.00]島[00:02.00]` 这种“时间标签 + 字符”交替出现的写法，
//! 与 (纯文本, 时间标签表) 之间的互相转换。

use std::fmt::Write;

use tracing::warn;

use crate::converter::utils::{format_time_tag, parse_time_tag};
use crate::error::ConvertError;
use crate::model::text_index::TextIndex;
use crate::model::time_tags::TimeTags;

/// 将带时间标签的文本拆分为纯文本和时间标签表。
///
/// 紧贴在字符前的时间标签记为该字符的 `Start`，
/// 行尾多出的时间标签记为最后一个字符的 `End`。
pub fn parse_timed_text(line: &str) -> Result<(String, TimeTags), ConvertError> {
    let chars: Vec<char> = line.chars().collect();
    let mut text = String::with_capacity(line.len());
    let mut time_tags = TimeTags::new();
    let mut char_count = 0usize;
    let mut pending_time: Option<u64> = None;

    let mut cursor = 0;
    while cursor < chars.len() {
        let c = chars[cursor];
        if c == '[' {
            let close_offset = chars[cursor..]
                .iter()
                .position(|&ch| ch == ']')
                .ok_or_else(|| ConvertError::UnterminatedTimestamp {
                    text: line.to_string(),
                    position: cursor,
                })?;
            let token: String = chars[cursor..=cursor + close_offset].iter().collect();
            let time = parse_time_tag(&token)?;
            if let Some(previous) = pending_time.replace(time) {
                warn!(
                    "[KAR 解析] '{}' 中连续出现时间标签，{}ms 被 {}ms 覆盖",
                    line, previous, time
                );
            }
            cursor += close_offset + 1;
            continue;
        }

        if let Some(time) = pending_time.take() {
            time_tags.insert(TextIndex::start(char_count), Some(time));
        }
        text.push(c);
        char_count += 1;
        cursor += 1;
    }

    if let Some(time) = pending_time {
        if char_count == 0 {
            warn!("[KAR 解析] '{}' 只有时间标签没有文本，已忽略", line);
        } else {
            time_tags.insert(TextIndex::end(char_count - 1), Some(time));
        }
    }

    if !time_tags.is_monotonic() {
        warn!("[KAR 解析] '{}' 的时间标签不是单调递增的", line);
    }

    Ok((text, time_tags))
}

/// 将纯文本和时间标签表合成为带时间标签的文本。
///
/// 只输出各字符的 `Start` 与最后一个字符的 `End`，没有时间的条目不输出。
pub fn generate_timed_text(text: &str, time_tags: &TimeTags) -> Result<String, ConvertError> {
    let mut output = String::with_capacity(text.len() + time_tags.len() * 10);
    let mut last_index = None;

    for (index, c) in text.chars().enumerate() {
        if let Some(time) = time_tags.start_time_of(index) {
            write!(output, "{}", format_time_tag(time))?;
        }
        output.push(c);
        last_index = Some(index);
    }

    if let Some(last_index) = last_index
        && let Some(time) = time_tags.get(&TextIndex::end(last_index))
    {
        write!(output, "{}", format_time_tag(time))?;
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timed_text() {
        let (text, time_tags) =
            parse_timed_text("[00:17:97]帰[00:18:37]り[00:18:55]道[00:18:94]は[00:19:22]").unwrap();

        assert_eq!(text, "帰り道は");
        assert_eq!(
            time_tags,
            TimeTags::from([
                (TextIndex::start(0), 17970),
                (TextIndex::start(1), 18370),
                (TextIndex::start(2), 18550),
                (TextIndex::start(3), 18940),
                (TextIndex::end(3), 19220),
            ])
        );
    }

    #[test]
    fn test_characters_without_tag_have_no_entry() {
        let (text, time_tags) = parse_timed_text("し[00:00:50]ま").unwrap();
        assert_eq!(text, "しま");
        assert_eq!(time_tags, TimeTags::from([(TextIndex::start(1), 500)]));
        assert!(!time_tags.contains(&TextIndex::start(0)));

        let (text, time_tags) = parse_timed_text("カラオケ").unwrap();
        assert_eq!(text, "カラオケ");
        assert!(time_tags.is_empty());
    }

    #[test]
    fn test_unterminated_timestamp() {
        let result = parse_timed_text("[00:01.00]島[00:02.00");
        assert!(matches!(
            result,
            Err(ConvertError::UnterminatedTimestamp { position: 11, .. })
        ));
    }

    #[test]
    fn test_malformed_timestamp_inside_brackets() {
        let result = parse_timed_text("[0:1]島");
        assert!(matches!(result, Err(ConvertError::MalformedTimestamp(_))));
    }

    #[test]
    fn test_generate_timed_text() {
        let time_tags = TimeTags::from([
            (TextIndex::start(0), 17970),
            (TextIndex::start(1), 18370),
            (TextIndex::start(2), 18550),
            (TextIndex::start(3), 18940),
            (TextIndex::end(3), 19220),
        ]);
        assert_eq!(
            generate_timed_text("帰り道は", &time_tags).unwrap(),
            "[00:17.97]帰[00:18.37]り[00:18.55]道[00:18.94]は[00:19.22]"
        );
    }

    #[test]
    fn test_generate_skips_internal_end_and_missing_values() {
        let mut time_tags = TimeTags::from([
            (TextIndex::start(0), 1000),
            (TextIndex::end(0), 1500),
            (TextIndex::start(1), 2000),
        ]);
        time_tags.insert(TextIndex::start(2), None);
        assert_eq!(
            generate_timed_text("abc", &time_tags).unwrap(),
            "[00:01.00]a[00:02.00]bc"
        );
        assert_eq!(generate_timed_text("", &time_tags).unwrap(), "");
    }

    #[test]
    fn test_round_trip() {
        let cases = [
            "[00:01.00]島[00:02.00]島[00:03.00]島[00:04.00]",
            "カ[00:01.50]ラオケ",
            "plain text",
            "[00:00.00]a",
        ];
        for line in cases {
            let (text, time_tags) = parse_timed_text(line).unwrap();
            assert_eq!(generate_timed_text(&text, &time_tags).unwrap(), line);
        }
    }
}
