pub mod csv_parser;
pub mod field_map;
pub mod template;
