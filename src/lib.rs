pub mod converter;
pub mod error;
pub mod logger;
pub mod model;

pub use converter::config::*;
pub use converter::generators::kar_generator::{generate_kar, generate_kar_song};
pub use converter::parsers::kar_parser::{ParsedKarData, parse_kar, parse_kar_song};
pub use error::*;
pub use model::lyric::*;
pub use model::text_index::*;
pub use model::time_tags::*;
