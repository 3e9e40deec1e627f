pub mod article;
pub mod user;

pub use article::{Article, ArticleChanges, ArticleQuery, NewArticle};
pub use user::{AdminUser, Session};
