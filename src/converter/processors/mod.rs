pub mod ruby_grouping;
pub mod ruby_span_resolver;
