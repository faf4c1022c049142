mod user;

pub use user::{RoleType, User, UserRole, UserType};
