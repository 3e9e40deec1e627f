pub use super::admin_sessions::Entity as AdminSessions;
pub use super::admin_users::Entity as AdminUsers;
pub use super::articles::Entity as Articles;
