//! # KAR 格式生成器
//!
//! 先输出所有歌词行，有振假名时再空一行，逐条输出振假名指令。

use tracing::{trace, warn};

use crate::converter::config::KarGenerationOptions;
use crate::converter::parsers::line_parser::{
    KarLine, SingleLineParser, default_line_parsers, encode_line,
};
use crate::converter::processors::ruby_grouping::{RubyGroup, group_ruby_tags};
use crate::error::ConvertError;
use crate::model::lyric::{RubyDirective, Song};

/// KAR 生成的主入口函数。
pub fn generate_kar(song: &Song, options: &KarGenerationOptions) -> Result<String, ConvertError> {
    let parsers = default_line_parsers();
    let (song_start, song_end) = song.time_range();
    let single_line = song.lyrics.len() == 1;
    let song_is_timed = song.is_timed();

    let mut lyric_lines: Vec<String> = Vec::with_capacity(song.lyrics.len());
    let mut directive_lines: Vec<String> = Vec::new();

    for (line_index, lyric) in song.lyrics.iter().enumerate() {
        lyric.time_tags.check_monotonic()?;
        for ruby in &lyric.ruby_tags {
            ruby.time_tags.check_monotonic()?;
        }

        lyric_lines.push(encode(&parsers, &KarLine::Lyric(lyric.clone()))?);

        for group in group_ruby_tags(lyric, options.merge_adjacent_ruby)? {
            if song_is_timed && !single_line && group.start_time.is_none() {
                warn!(
                    "[KAR 生成] 第 {} 行的振假名 '{}' 没有计时，重新解析时可能定位到别的行",
                    line_index + 1,
                    group.ruby_text
                );
            }

            let name = format!("{}{}", options.ruby_tag_prefix, directive_lines.len() + 1);
            let directive = to_directive(name, group, song_start, song_end, single_line);
            trace!("[KAR 生成] 振假名指令: {:?}", directive);
            directive_lines.push(encode(&parsers, &KarLine::Ruby(directive))?);
        }
    }

    if !directive_lines.is_empty() {
        lyric_lines.push(String::new());
        lyric_lines.append(&mut directive_lines);
    }

    Ok(lyric_lines.join("\n"))
}

/// 使用默认选项生成。
pub fn generate_kar_song(song: &Song) -> Result<String, ConvertError> {
    generate_kar(song, &KarGenerationOptions::default())
}

fn encode(
    parsers: &[Box<dyn SingleLineParser>],
    line: &KarLine,
) -> Result<String, ConvertError> {
    encode_line(parsers, line)
        .unwrap_or_else(|| Err(ConvertError::Internal("没有可以生成该行的解析器".to_string())))
}

/// 把一组振假名转成指令。与整首歌的边界相同的时间会被省略。
///
/// 单行歌曲中，两个边界都省略的指令会按位置定位，只覆盖一处原文，
/// 因此合并了多个成员的组必须保留开始时间。
fn to_directive(
    name: String,
    group: RubyGroup,
    song_start: Option<u64>,
    song_end: Option<u64>,
    single_line: bool,
) -> RubyDirective {
    let start_time = group.start_time.filter(|&t| Some(t) != song_start);
    let end_time = group.end_time.filter(|&t| Some(t) != song_end);

    let start_time = if single_line
        && group.member_count > 1
        && start_time.is_none()
        && end_time.is_none()
    {
        group.start_time
    } else {
        start_time
    };

    RubyDirective {
        name,
        parent_text: group.parent_text,
        ruby_text: group.ruby_text,
        ruby_time_tags: group.relative_time_tags,
        start_time,
        end_time,
    }
}
