pub mod category;
pub mod transaction;
