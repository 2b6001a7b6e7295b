//! # 振假名合并
//!
//! 生成时把相邻、文本相同、相对计时也相同的振假名合并成一条指令。
//! 只和紧挨着的前一个成员比较：计时模式相同但中间隔着别的振假名时不会合并。

use crate::error::ConvertError;
use crate::model::lyric::{Lyric, RubyTag};
use crate::model::time_tags::TimeTags;

/// 将被输出为一条指令的一组振假名。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubyGroup {
    /// 单个成员覆盖的原文
    pub parent_text: String,
    pub ruby_text: String,
    /// 相对于各成员自身开始时间的计时模式
    pub relative_time_tags: TimeTags,
    /// 第一个成员的起始字符下标
    pub start_char_index: usize,
    /// 最后一个成员的结束字符下标
    pub end_char_index: usize,
    pub member_count: usize,
    /// 第一个成员在歌词行上的开始时间
    pub start_time: Option<u64>,
    /// 最后一个成员在歌词行上的结束时间
    pub end_time: Option<u64>,
}

/// 按起始位置扫描一行的振假名并分组。
///
/// 歌词行完全没有计时，或 `merge_adjacent` 为 `false` 时，每个振假名单独成组。
pub fn group_ruby_tags(lyric: &Lyric, merge_adjacent: bool) -> Result<Vec<RubyGroup>, ConvertError> {
    let mut ruby_tags: Vec<&RubyTag> = lyric.ruby_tags.iter().collect();
    ruby_tags.sort_by_key(|ruby| ruby.start_char_index);

    let can_merge = merge_adjacent && lyric.time_tags.has_time();
    let mut groups: Vec<RubyGroup> = Vec::with_capacity(ruby_tags.len());

    for ruby in ruby_tags {
        let parent_text = lyric
            .text_in_range(ruby.start_char_index, ruby.end_char_index)
            .ok_or_else(|| {
                ConvertError::InvalidRubyTag(format!(
                    "'{}' 的范围 [{}, {}] 超出了歌词 '{}'",
                    ruby.text, ruby.start_char_index, ruby.end_char_index, lyric.text
                ))
            })?;

        let start_time = lyric.time_tags.start_time_of(ruby.start_char_index);
        let end_time = lyric.time_tags.end_time_of(ruby.end_char_index);
        let relative_time_tags = match start_time {
            Some(reference) => ruby.time_tags.relative_to(reference).ok_or_else(|| {
                ConvertError::InvalidRubyTag(format!(
                    "'{}' 的时间标签早于原文 '{}' 的开始时间 {}ms",
                    ruby.text, parent_text, reference
                ))
            })?,
            None => ruby.time_tags.clone(),
        };

        if can_merge
            && let Some(group) = groups.last_mut()
            && ruby.start_char_index == group.end_char_index + 1
            && ruby.text == group.ruby_text
            && parent_text == group.parent_text
            && relative_time_tags == group.relative_time_tags
        {
            group.end_char_index = ruby.end_char_index;
            group.member_count += 1;
            group.end_time = end_time;
            continue;
        }

        groups.push(RubyGroup {
            parent_text,
            ruby_text: ruby.text.clone(),
            relative_time_tags,
            start_char_index: ruby.start_char_index,
            end_char_index: ruby.end_char_index,
            member_count: 1,
            start_time,
            end_time,
        });
    }

    Ok(groups)
}
