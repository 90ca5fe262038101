use std::env;
use std::path::PathBuf;

/// Credentials for the administrator account created on first boot
#[derive(Clone)]
pub struct AdminConfig {
    pub username: String,
    pub email: String,
    /// When unset a random password is generated and written to `password_file`
    pub password: Option<String>,
    pub password_file: PathBuf,
}

impl AdminConfig {
    pub fn from_env() -> Self {
        Self {
            username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@restobar.local".to_string()),
            password: env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty()),
            password_file: env::var("ADMIN_PASSWORD_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("admin-password.txt")),
        }
    }
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("password_file", &self.password_file)
            .finish()
    }
}
