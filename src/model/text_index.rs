use std::fmt;

/// 时间标签挂在字符的开头还是结尾。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum IndexState {
    /// 字符开始发声的时刻
    #[default]
    Start,
    /// 字符（或片段）结束的时刻
    End,
}

/// 文本中的一个位置：字符下标加上锚点。
///
/// 排序规则为先比较字符下标，下标相同时 `Start` 排在 `End` 之前，
/// 因此 `BTreeMap<TextIndex, _>` 的遍历顺序就是时间轴顺序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextIndex {
    /// 字符下标（按 Unicode 标量值计数）
    pub index: usize,
    /// 锚点
    pub state: IndexState,
}

impl TextIndex {
    #[must_use]
    pub const fn new(index: usize, state: IndexState) -> Self {
        Self { index, state }
    }

    #[must_use]
    pub const fn start(index: usize) -> Self {
        Self::new(index, IndexState::Start)
    }

    #[must_use]
    pub const fn end(index: usize) -> Self {
        Self::new(index, IndexState::End)
    }
}

impl fmt::Display for TextIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            IndexState::Start => write!(f, "{}", self.index),
            IndexState::End => write!(f, "{}(end)", self.index),
        }
    }
}
