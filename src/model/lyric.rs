use crate::model::time_tags::TimeTags;

/// 覆盖在基础歌词若干连续字符上的振假名。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RubyTag {
    /// 振假名文本
    pub text: String,
    /// 振假名自身的时间标签，键是振假名文本内的下标，值是绝对时间（毫秒）
    pub time_tags: TimeTags,
    /// 覆盖范围的起始字符下标（含）
    pub start_char_index: usize,
    /// 覆盖范围的结束字符下标（含）
    pub end_char_index: usize,
}

/// 一行基础歌词。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lyric {
    pub text: String,
    pub time_tags: TimeTags,
    pub ruby_tags: Vec<RubyTag>,
}

impl Lyric {
    /// 按字符取出 `[start, end]` 范围内的原文。
    #[must_use]
    pub fn text_in_range(&self, start_char_index: usize, end_char_index: usize) -> Option<String> {
        if start_char_index > end_char_index {
            return None;
        }
        let chars: Vec<char> = self.text.chars().collect();
        chars
            .get(start_char_index..=end_char_index)
            .map(|slice| slice.iter().collect())
    }
}

/// 一首歌：按物理行排列的歌词。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Song {
    pub lyrics: Vec<Lyric>,
}

impl Song {
    /// 是否有任何一行带有时间。
    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.lyrics.iter().any(|lyric| lyric.time_tags.has_time())
    }

    /// 整首歌的时间范围（所有行时间标签的最小值与最大值）。
    ///
    /// 生成时与之相同的开始/结束时间会被省略。
    #[must_use]
    pub fn time_range(&self) -> (Option<u64>, Option<u64>) {
        let min = self
            .lyrics
            .iter()
            .filter_map(|lyric| lyric.time_tags.min_time())
            .min();
        let max = self
            .lyrics
            .iter()
            .filter_map(|lyric| lyric.time_tags.max_time())
            .max();
        (min, max)
    }
}

/// 一条振假名指令，即 `name=原文,振假名[,开始][,结束]`。
///
/// 只在解析与生成过程中短暂存在，解析后会被解析为 [`RubyTag`]。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RubyDirective {
    /// 指令名，例如 `@Ruby1`
    pub name: String,
    pub parent_text: String,
    pub ruby_text: String,
    /// 振假名内的时间标签，值是相对于指令开始时间的时长
    pub ruby_time_tags: TimeTags,
    /// 目标范围的开始时间，`None` 表示开放下界
    pub start_time: Option<u64>,
    /// 目标范围的结束时间，`None` 表示开放上界
    pub end_time: Option<u64>,
}

impl RubyDirective {
    #[must_use]
    pub const fn has_time_range(&self) -> bool {
        self.start_time.is_some() || self.end_time.is_some()
    }
}
