pub mod category_handler;

pub use category_handler::{get_category, list_categories};
