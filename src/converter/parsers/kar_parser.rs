//! # KAR 格式解析器
//!
//! 先逐行解析出歌词行与振假名指令，所有歌词行就绪后再按声明顺序定位振假名。
//! 指令可以出现在空行之后，也可以直接跟在歌词行后面。

use tracing::{debug, warn};

use crate::converter::config::KarParsingOptions;
use crate::converter::parsers::line_parser::{KarLine, decode_line, default_line_parsers};
use crate::converter::processors::ruby_span_resolver::RubySpanResolver;
use crate::error::ConvertError;
use crate::model::lyric::{Lyric, RubyDirective, Song};

/// 解析结果：歌曲本身和解析过程中产生的警告。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedKarData {
    pub song: Song,
    pub warnings: Vec<String>,
}

/// 解析 KAR 格式内容。
pub fn parse_kar(content: &str, options: &KarParsingOptions) -> Result<ParsedKarData, ConvertError> {
    let parsers = default_line_parsers();
    let mut lyrics: Vec<Lyric> = Vec::new();
    let mut directives: Vec<(usize, RubyDirective)> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    for (line_num, line_str) in content.lines().enumerate() {
        let trimmed_line = line_str.trim();
        if trimmed_line.is_empty() {
            continue;
        }

        let Some(decoded) = decode_line(&parsers, trimmed_line) else {
            continue;
        };
        match decoded.inspect_err(|e| warn!("[KAR 解析] 行 {}: {}", line_num + 1, e))? {
            KarLine::Lyric(lyric) => lyrics.push(lyric),
            KarLine::Ruby(directive) => directives.push((line_num + 1, directive)),
        }
    }

    let resolved = {
        let mut resolver = RubySpanResolver::new(&lyrics);
        let mut resolved = Vec::with_capacity(directives.len());
        for (line_num, directive) in &directives {
            match resolver.resolve(directive) {
                Ok(result) => resolved.push(result),
                Err(
                    e @ (ConvertError::RubyTargetNotFound { .. }
                    | ConvertError::AmbiguousRubyTarget { .. }),
                ) if options.skip_unresolved_ruby => {
                    warn!("[KAR 解析] 行 {}: {}，已跳过", line_num, e);
                    warnings.push(format!("行 {line_num}: {e}"));
                }
                Err(e) => {
                    warn!("[KAR 解析] 行 {}: {}", line_num, e);
                    return Err(e);
                }
            }
        }
        resolved
    };

    for result in resolved {
        lyrics[result.lyric_index].ruby_tags.extend(result.ruby_tags);
    }
    for lyric in &mut lyrics {
        lyric.ruby_tags.sort_by_key(|ruby| ruby.start_char_index);
    }

    debug!(
        "[KAR 解析] 共 {} 行歌词，{} 条振假名指令",
        lyrics.len(),
        directives.len()
    );

    Ok(ParsedKarData {
        song: Song { lyrics },
        warnings,
    })
}

/// 使用默认选项解析，只返回歌曲。
pub fn parse_kar_song(content: &str) -> Result<Song, ConvertError> {
    parse_kar(content, &KarParsingOptions::default()).map(|parsed| parsed.song)
}
