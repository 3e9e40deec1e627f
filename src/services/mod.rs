pub mod article_service;
pub mod article_service_impl;
pub use article_service::{ArticleError, ArticleService};
pub use article_service_impl::SeaOrmArticleService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult};
pub use auth_service_impl::SeaOrmAuthService;

pub mod password;
pub use password::{Argon2Hasher, PasswordHasher};

pub mod image;
pub use image::{ImageService, StoredImage, UploadError};

pub mod scheduler;
pub use scheduler::Scheduler;
