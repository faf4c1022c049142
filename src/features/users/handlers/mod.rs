pub mod user_handler;

pub use user_handler::{delete_user, get_user, register, search_users, set_roles, update_user};
