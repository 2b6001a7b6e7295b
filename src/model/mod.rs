pub mod lyric;
pub mod text_index;
pub mod time_tags;
