pub mod memory_repo;
pub mod rest_repo;
