//! # 振假名定位
//!
//! 把振假名指令（原文 + 可选的时间范围）落到某一行歌词的具体字符上。
//!
//! - 没有时间范围，且整首歌只有一行或完全没有计时：按出现顺序定位，
//!   同一原文的指令依次对应原文从左到右（跨行）的各次出现。
//! - 其他情况按时间定位：开始时间缺省为候选行的最早时间，结束时间缺省为该行的最晚时间，
//!   目标范围必须从某次出现开始、由连续重复的原文组成，并且首尾时间与之完全一致。
//!   一个范围包含多次重复时，每次重复各生成一个振假名。

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::ConvertError;
use crate::model::lyric::{Lyric, RubyDirective, RubyTag};

/// 一条指令的定位结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRuby {
    /// 振假名所属的歌词行
    pub lyric_index: usize,
    /// 生成的振假名。原文与振假名相同的指令不会生成任何振假名，此时为空
    pub ruby_tags: Vec<RubyTag>,
}

/// 按声明顺序逐条定位振假名指令。
///
/// 按出现顺序定位时会记录每个原文已经消耗的出现次数，所以同一首歌的指令
/// 必须用同一个实例、按文件中的顺序处理。
pub struct RubySpanResolver<'a> {
    lyrics: &'a [Lyric],
    line_chars: Vec<Vec<char>>,
    positional_fallback: bool,
    consumed_occurrences: HashMap<String, usize>,
}

impl<'a> RubySpanResolver<'a> {
    #[must_use]
    pub fn new(lyrics: &'a [Lyric]) -> Self {
        let is_timed = lyrics.iter().any(|lyric| lyric.time_tags.has_time());
        Self {
            lyrics,
            line_chars: lyrics.iter().map(|lyric| lyric.text.chars().collect()).collect(),
            positional_fallback: lyrics.len() == 1 || !is_timed,
            consumed_occurrences: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, directive: &RubyDirective) -> Result<ResolvedRuby, ConvertError> {
        let parent_chars: Vec<char> = directive.parent_text.chars().collect();

        let (lyric_index, occurrence_starts) =
            if !directive.has_time_range() && self.positional_fallback {
                self.resolve_by_position(directive, &parent_chars)?
            } else {
                self.resolve_by_time(directive, &parent_chars)?
            };

        if directive.ruby_text == directive.parent_text {
            debug!(
                "[振假名定位] {} 的振假名与原文 '{}' 相同，已忽略",
                directive.name, directive.parent_text
            );
            return Ok(ResolvedRuby {
                lyric_index,
                ruby_tags: Vec::new(),
            });
        }

        let lyric = &self.lyrics[lyric_index];
        let ruby_tags = occurrence_starts
            .into_iter()
            .map(|start_char_index| {
                let base_time = lyric.time_tags.start_time_of(start_char_index);
                if base_time.is_none() && !directive.ruby_time_tags.is_empty() {
                    warn!(
                        "[振假名定位] {} 所在位置没有开始时间，振假名时间标签按 0 为基准换算",
                        directive.name
                    );
                }
                RubyTag {
                    text: directive.ruby_text.clone(),
                    time_tags: directive.ruby_time_tags.shifted_by(base_time.unwrap_or(0)),
                    start_char_index,
                    end_char_index: start_char_index + parent_chars.len() - 1,
                }
            })
            .collect();

        Ok(ResolvedRuby {
            lyric_index,
            ruby_tags,
        })
    }

    fn resolve_by_position(
        &mut self,
        directive: &RubyDirective,
        parent_chars: &[char],
    ) -> Result<(usize, Vec<usize>), ConvertError> {
        let consumed = self
            .consumed_occurrences
            .entry(directive.parent_text.clone())
            .or_insert(0);

        let target = self
            .line_chars
            .iter()
            .enumerate()
            .flat_map(|(lyric_index, chars)| {
                find_occurrences(chars, parent_chars)
                    .into_iter()
                    .map(move |offset| (lyric_index, offset))
            })
            .nth(*consumed)
            .ok_or_else(|| not_found(directive))?;

        *consumed += 1;
        debug!(
            "[振假名定位] {} 按出现顺序定位到第 {} 行第 {} 个字符",
            directive.name,
            target.0 + 1,
            target.1
        );
        Ok((target.0, vec![target.1]))
    }

    fn resolve_by_time(
        &self,
        directive: &RubyDirective,
        parent_chars: &[char],
    ) -> Result<(usize, Vec<usize>), ConvertError> {
        let mut candidates: Vec<(usize, Vec<usize>)> = Vec::new();
        for (lyric_index, chars) in self.line_chars.iter().enumerate() {
            let time_tags = &self.lyrics[lyric_index].time_tags;
            let (Some(start_time), Some(end_time)) = (
                directive.start_time.or_else(|| time_tags.min_time()),
                directive.end_time.or_else(|| time_tags.max_time()),
            ) else {
                continue;
            };

            for offset in find_occurrences(chars, parent_chars) {
                if time_tags.start_time_of(offset) != Some(start_time) {
                    continue;
                }

                let mut members = Vec::new();
                let mut position = offset;
                while chars
                    .get(position..position + parent_chars.len())
                    .is_some_and(|window| window == parent_chars)
                {
                    members.push(position);
                    let last_char = position + parent_chars.len() - 1;
                    if time_tags.end_time_of(last_char) == Some(end_time) {
                        candidates.push((lyric_index, members));
                        break;
                    }
                    position += parent_chars.len();
                }
            }
        }

        match candidates.len() {
            0 => Err(not_found(directive)),
            1 => {
                let (lyric_index, members) = candidates.remove(0);
                debug!(
                    "[振假名定位] {} 按时间定位到第 {} 行第 {} 个字符，共 {} 处",
                    directive.name,
                    lyric_index + 1,
                    members[0],
                    members.len()
                );
                Ok((lyric_index, members))
            }
            count => Err(ConvertError::AmbiguousRubyTarget {
                parent_text: directive.parent_text.clone(),
                ruby_text: directive.ruby_text.clone(),
                candidates: count,
            }),
        }
    }
}

fn not_found(directive: &RubyDirective) -> ConvertError {
    ConvertError::RubyTargetNotFound {
        parent_text: directive.parent_text.clone(),
        ruby_text: directive.ruby_text.clone(),
    }
}

/// 原文在文本中所有出现位置的字符下标（允许重叠）。
fn find_occurrences(text: &[char], pattern: &[char]) -> Vec<usize> {
    if pattern.is_empty() || pattern.len() > text.len() {
        return Vec::new();
    }
    text.windows(pattern.len())
        .enumerate()
        .filter(|(_, window)| *window == pattern)
        .map(|(offset, _)| offset)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::parsers::ruby_directive::parse_ruby_directive;
    use crate::converter::parsers::timed_text::parse_timed_text;
    use crate::model::text_index::TextIndex;
    use crate::model::time_tags::TimeTags;

    fn lyric(line: &str) -> Lyric {
        let (text, time_tags) = parse_timed_text(line).unwrap();
        Lyric {
            text,
            time_tags,
            ruby_tags: Vec::new(),
        }
    }

    fn resolve_all(lyrics: &[Lyric], directives: &[&str]) -> Vec<Result<ResolvedRuby, ConvertError>> {
        let mut resolver = RubySpanResolver::new(lyrics);
        directives
            .iter()
            .map(|line| resolver.resolve(&parse_ruby_directive(line).unwrap()))
            .collect()
    }

    #[test]
    fn test_resolve_by_time_range_on_repeated_characters() {
        let lyrics = [lyric("[00:01:00]島[00:02:00]島[00:03:00]島[00:04:00]")];
        let results = resolve_all(
            &lyrics,
            &[
                "@Ruby1=島,しま,,[00:02:00]",
                "@Ruby2=島,じま,[00:02:00],[00:03:00]",
                "@Ruby3=島,とう,[00:03:00]",
            ],
        );

        let spans: Vec<(usize, usize, String)> = results
            .into_iter()
            .map(|r| {
                let tag = r.unwrap().ruby_tags.remove(0);
                (tag.start_char_index, tag.end_char_index, tag.text)
            })
            .collect();
        assert_eq!(
            spans,
            vec![
                (0, 0, "しま".to_string()),
                (1, 1, "じま".to_string()),
                (2, 2, "とう".to_string()),
            ]
        );
    }

    #[test]
    fn test_relative_ruby_time_becomes_absolute() {
        let lyrics = [lyric("[00:01:00]島[00:02:00]島[00:03:00]島[00:04:00]")];
        let results = resolve_all(&lyrics, &["@Ruby2=島,じ[00:00:50]ま,[00:02:00],[00:03:00]"]);
        let resolved = results.into_iter().next().unwrap().unwrap();
        assert_eq!(
            resolved.ruby_tags[0].time_tags,
            TimeTags::from([(TextIndex::start(1), 2500)])
        );
    }

    #[test]
    fn test_merged_range_expands_to_each_repetition() {
        let lyrics = [lyric(
            "[00:01.00]島[00:02.00]島[00:03.00]島[00:04.00]島[00:05.00]",
        )];
        let results = resolve_all(&lyrics, &["@Ruby2=島,し[00:00.50]ま,[00:02.00],[00:04.00]"]);
        let resolved = results.into_iter().next().unwrap().unwrap();

        assert_eq!(resolved.ruby_tags.len(), 2);
        assert_eq!(resolved.ruby_tags[0].start_char_index, 1);
        assert_eq!(
            resolved.ruby_tags[0].time_tags,
            TimeTags::from([(TextIndex::start(1), 2500)])
        );
        assert_eq!(resolved.ruby_tags[1].start_char_index, 2);
        assert_eq!(
            resolved.ruby_tags[1].time_tags,
            TimeTags::from([(TextIndex::start(1), 3500)])
        );
    }

    #[test]
    fn test_positional_resolution_without_timing() {
        let lyrics = [lyric("カラオケ")];
        let results = resolve_all(
            &lyrics,
            &["@Ruby1=カ,か", "@Ruby2=ラ,ら", "@Ruby3=オ,お", "@Ruby4=ケ,け"],
        );
        let starts: Vec<usize> = results
            .into_iter()
            .map(|r| r.unwrap().ruby_tags[0].start_char_index)
            .collect();
        assert_eq!(starts, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_positional_resolution_consumes_occurrences_in_order() {
        let lyrics = [lyric("島と島"), lyric("島")];
        let results = resolve_all(
            &lyrics,
            &["@Ruby1=島,しま", "@Ruby2=島,じま", "@Ruby3=島,とう", "@Ruby4=島,しま"],
        );
        let targets: Vec<(usize, usize)> = results[..3]
            .iter()
            .map(|r| {
                let resolved = r.as_ref().unwrap();
                (resolved.lyric_index, resolved.ruby_tags[0].start_char_index)
            })
            .collect();
        assert_eq!(targets, vec![(0, 0), (0, 2), (1, 0)]);
        assert!(matches!(
            results[3],
            Err(ConvertError::RubyTargetNotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_across_lines_by_time() {
        let lyrics = [
            lyric("[00:01:00]島[00:02:00]"),
            lyric("[00:03:00]島[00:04:00]"),
            lyric("[00:05:00]島[00:06:00]"),
        ];
        let results = resolve_all(
            &lyrics,
            &[
                "@Ruby1=島,しま,,[00:02:00]",
                "@Ruby2=島,じま,[00:03:00],[00:04:00]",
                "@Ruby3=島,とう,[00:05:00]",
            ],
        );
        let lines: Vec<usize> = results
            .into_iter()
            .map(|r| r.unwrap().lyric_index)
            .collect();
        assert_eq!(lines, vec![0, 1, 2]);
    }

    #[test]
    fn test_open_bounds_come_from_the_candidate_line() {
        let lyrics = [
            lyric("[00:01.00]島[00:02.00]"),
            lyric("[00:03.00]山[00:04.00]"),
            lyric("[00:05.00]川[00:06.00]"),
        ];
        let results = resolve_all(
            &lyrics,
            &[
                "@Ruby1=山,やま",
                "@Ruby2=山,さん,,[00:04.00]",
                "@Ruby3=山,ざん,[00:03.00]",
            ],
        );
        for result in results {
            let resolved = result.unwrap();
            assert_eq!(resolved.lyric_index, 1);
            assert_eq!(resolved.ruby_tags[0].start_char_index, 0);
            assert_eq!(resolved.ruby_tags[0].end_char_index, 0);
        }
    }

    #[test]
    fn test_untimed_lines_are_skipped_by_time() {
        let lyrics = [lyric("山"), lyric("[00:03.00]山[00:04.00]")];
        let results = resolve_all(&lyrics, &["@Ruby1=山,やま"]);
        let resolved = results.into_iter().next().unwrap().unwrap();
        assert_eq!(resolved.lyric_index, 1);
    }

    #[test]
    fn test_degenerate_ruby_is_dropped() {
        let lyrics = [lyric("[00:01:00]島[00:02:00]")];
        let results = resolve_all(&lyrics, &["@Ruby1=島,島"]);
        let resolved = results.into_iter().next().unwrap().unwrap();
        assert_eq!(resolved.lyric_index, 0);
        assert!(resolved.ruby_tags.is_empty());
    }

    #[test]
    fn test_target_not_found() {
        let lyrics = [lyric("[00:01:00]島[00:02:00]島[00:03:00]")];
        let results = resolve_all(
            &lyrics,
            &["@Ruby1=山,やま", "@Ruby2=島,しま,[00:01:50],[00:02:00]"],
        );
        for result in results {
            assert!(matches!(result, Err(ConvertError::RubyTargetNotFound { .. })));
        }
    }

    #[test]
    fn test_ambiguous_target_across_lines() {
        let lyrics = [
            lyric("[00:01:00]島[00:02:00]"),
            lyric("[00:01:00]島[00:02:00]"),
        ];
        let results = resolve_all(&lyrics, &["@Ruby1=島,しま,[00:01:00],[00:02:00]"]);
        assert!(matches!(
            results[0],
            Err(ConvertError::AmbiguousRubyTarget { candidates: 2, .. })
        ));
    }

    #[test]
    fn test_find_occurrences() {
        let text: Vec<char> = "あああ".chars().collect();
        assert_eq!(find_occurrences(&text, &['あ', 'あ']), vec![0, 1]);
        assert!(find_occurrences(&text, &[]).is_empty());
        assert!(find_occurrences(&['あ'], &['あ', 'あ']).is_empty());
    }
}
