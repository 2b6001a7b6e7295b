//! # 时间标签表
//!
//! 基础歌词行与振假名共用的计时结构：从文本位置映射到可选的毫秒值。

use std::collections::BTreeMap;

use crate::error::ConvertError;
use crate::model::text_index::TextIndex;

/// 有序的时间标签表。
///
/// 值为 `None` 表示该位置存在但还没有确定时间。
/// 有值的条目应随位置递增而单调不减，违反时属于调用方错误，
/// [`TimeTags::try_from_entries`] 会拒绝这样的输入。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeTags {
    tags: BTreeMap<TextIndex, Option<u64>>,
}

impl TimeTags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 从条目构建时间标签表，并校验时间轴的单调性。
    pub fn try_from_entries(
        entries: impl IntoIterator<Item = (TextIndex, Option<u64>)>,
    ) -> Result<Self, ConvertError> {
        let time_tags = Self {
            tags: entries.into_iter().collect(),
        };
        time_tags.check_monotonic()?;
        Ok(time_tags)
    }

    /// 插入或覆盖一个条目，返回旧值。
    pub fn insert(&mut self, index: TextIndex, time: Option<u64>) -> Option<Option<u64>> {
        self.tags.insert(index, time)
    }

    /// 获取某个位置上的时间。位置不存在或没有时间时都返回 `None`。
    #[must_use]
    pub fn get(&self, index: &TextIndex) -> Option<u64> {
        self.tags.get(index).copied().flatten()
    }

    #[must_use]
    pub fn contains(&self, index: &TextIndex) -> bool {
        self.tags.contains_key(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TextIndex, &Option<u64>)> {
        self.tags.iter()
    }

    /// 只遍历有时间的条目，按位置顺序。
    pub fn times(&self) -> impl Iterator<Item = u64> + '_ {
        self.tags.values().filter_map(|time| *time)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// 是否存在至少一个有值的时间标签。
    #[must_use]
    pub fn has_time(&self) -> bool {
        self.times().next().is_some()
    }

    #[must_use]
    pub fn min_time(&self) -> Option<u64> {
        self.times().min()
    }

    #[must_use]
    pub fn max_time(&self) -> Option<u64> {
        self.times().max()
    }

    /// 第 `index` 个字符开始的时间。
    #[must_use]
    pub fn start_time_of(&self, index: usize) -> Option<u64> {
        self.get(&TextIndex::start(index))
    }

    /// 第 `index` 个字符结束的时间。
    ///
    /// 优先取 `End(index)`，没有时取下一个字符的 `Start`。
    #[must_use]
    pub fn end_time_of(&self, index: usize) -> Option<u64> {
        self.get(&TextIndex::end(index))
            .or_else(|| self.start_time_of(index + 1))
    }

    /// 把所有时间加上 `offset`，用于把相对时长换算为绝对时间。
    ///
    /// 超出 `u64` 范围的结果取 `u64::MAX`。
    #[must_use]
    pub fn shifted_by(&self, offset: u64) -> Self {
        Self {
            tags: self
                .tags
                .iter()
                .map(|(index, time)| (*index, time.map(|t| t.saturating_add(offset))))
                .collect(),
        }
    }

    /// 把所有时间减去 `reference`，得到相对于它的时长。
    ///
    /// 任何时间早于 `reference` 时返回 `None`。
    #[must_use]
    pub fn relative_to(&self, reference: u64) -> Option<Self> {
        let mut tags = BTreeMap::new();
        for (index, time) in &self.tags {
            let relative = match time {
                Some(t) => Some(t.checked_sub(reference)?),
                None => None,
            };
            tags.insert(*index, relative);
        }
        Some(Self { tags })
    }

    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        self.times()
            .try_fold(0u64, |previous, current| {
                (current >= previous).then_some(current)
            })
            .is_some()
    }

    pub fn check_monotonic(&self) -> Result<(), ConvertError> {
        let mut previous: Option<(TextIndex, u64)> = None;
        for (index, time) in &self.tags {
            let Some(time) = *time else { continue };
            if let Some((previous_index, previous_time)) = previous
                && time < previous_time
            {
                return Err(ConvertError::NonMonotonicTimeTags(format!(
                    "位置 {index} 的时间 {time}ms 早于位置 {previous_index} 的 {previous_time}ms"
                )));
            }
            previous = Some((*index, time));
        }
        Ok(())
    }
}

impl FromIterator<(TextIndex, Option<u64>)> for TimeTags {
    /// 不做单调性校验，需要校验时使用 [`TimeTags::try_from_entries`]。
    fn from_iter<T: IntoIterator<Item = (TextIndex, Option<u64>)>>(iter: T) -> Self {
        Self {
            tags: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[(TextIndex, u64); N]> for TimeTags {
    fn from(entries: [(TextIndex, u64); N]) -> Self {
        entries
            .into_iter()
            .map(|(index, time)| (index, Some(time)))
            .collect()
    }
}
