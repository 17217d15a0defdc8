//! Configuration module

mod site;

pub use site::DatabaseConfig;
pub use site::EmailConfig;
pub use site::SiteConfig;
pub use site::{ENV_DATABASE_KEY, ENV_DATABASE_URL, ENV_EMAIL_KEY, ENV_EMAIL_SERVER};
