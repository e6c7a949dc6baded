pub mod backend;
pub mod config;
pub mod file_adapter;
pub mod parsers;
