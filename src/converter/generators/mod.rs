pub mod kar_generator;
