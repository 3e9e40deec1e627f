pub mod prelude;

pub mod admin_sessions;
pub mod admin_users;
pub mod articles;
