pub mod kar_parser;
pub mod line_parser;
pub mod ruby_directive;
pub mod timed_text;
