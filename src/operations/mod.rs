pub mod add;
pub mod browse;
pub mod export;
pub mod import;
pub mod remove;
pub mod search_by_category;
pub mod summary;
