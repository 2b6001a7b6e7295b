pub mod config;
pub mod generators;
pub mod parsers;
pub mod processors;
pub mod utils;
