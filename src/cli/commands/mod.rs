mod init;
mod list;
mod password;
mod sessions;

pub use init::cmd_init;
pub use list::cmd_list_articles;
pub use password::cmd_set_password;
pub use sessions::cmd_cleanup_sessions;
