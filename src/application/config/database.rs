use std::env;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| url_from_parts()),
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }

    /// Database URL with the password masked, safe for logs
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.database_url.split_once("://") else {
            return self.database_url.clone();
        };
        let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());
        let (authority, tail) = rest.split_at(authority_end);

        match authority.rsplit_once('@') {
            Some((credentials, host)) => match credentials.split_once(':') {
                Some((user, _)) => format!("{}://{}:***@{}{}", scheme, user, host, tail),
                None => self.database_url.clone(),
            },
            None => self.database_url.clone(),
        }
    }
}

/// Build a connection URL from the individual `DB_*` variables
fn url_from_parts() -> String {
    let dialect = env::var("DB_DIALECT").unwrap_or_else(|_| "postgres".to_string());
    let name = env::var("DB_NAME").unwrap_or_else(|_| "restobar".to_string());

    if dialect == "sqlite" {
        return format!("sqlite://{}.db?mode=rwc", name);
    }

    let default_port = if dialect == "mysql" { "3306" } else { "5432" };
    let host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("DB_PORT").unwrap_or_else(|_| default_port.to_string());
    let user = env::var("DB_USER").unwrap_or_else(|_| "restobar".to_string());
    let password = env::var("DB_PASSWORD").unwrap_or_default();

    server_url(&dialect, &user, &password, &host, &port, &name)
}

/// Credentials are percent-encoded so `@`, `:` and `/` survive URL parsing
fn server_url(dialect: &str, user: &str, password: &str, host: &str, port: &str, name: &str) -> String {
    let user = urlencoding::encode(user);
    if password.is_empty() {
        format!("{}://{}@{}:{}/{}", dialect, user, host, port, name)
    } else {
        let password = urlencoding::encode(password);
        format!("{}://{}:{}@{}:{}/{}", dialect, user, password, host, port, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_url_masks_password() {
        let config = DatabaseConfig {
            database_url: "postgres://restobar:hunter2@db:5432/restobar".to_string(),
            max_connections: 10,
        };
        assert_eq!(config.redacted_url(), "postgres://restobar:***@db:5432/restobar");
    }

    #[test]
    fn test_redacted_url_without_credentials() {
        let config = DatabaseConfig {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
        };
        assert_eq!(config.redacted_url(), "sqlite::memory:");
    }

    #[test]
    fn test_server_url_encodes_credentials() {
        let url = server_url("postgres", "caja@local", "p@ss:w/rd", "db", "5432", "restobar");
        assert_eq!(url, "postgres://caja%40local:p%40ss%3Aw%2Frd@db:5432/restobar");
    }

    #[test]
    fn test_server_url_without_password() {
        let url = server_url("mysql", "restobar", "", "localhost", "3306", "restobar");
        assert_eq!(url, "mysql://restobar@localhost:3306/restobar");
    }

    #[test]
    fn test_redacted_url_with_raw_at_in_password() {
        let config = DatabaseConfig {
            database_url: "postgres://restobar:p@ss@db:5432/restobar".to_string(),
            max_connections: 10,
        };
        assert_eq!(config.redacted_url(), "postgres://restobar:***@db:5432/restobar");
    }

    #[test]
    fn test_redacted_url_ignores_at_after_host() {
        let config = DatabaseConfig {
            database_url: "postgres://restobar:hunter2@db/restobar?application_name=a@b".to_string(),
            max_connections: 10,
        };
        assert_eq!(
            config.redacted_url(),
            "postgres://restobar:***@db/restobar?application_name=a@b"
        );
    }

    #[test]
    fn test_redacted_url_of_built_url_hides_encoded_password() {
        let config = DatabaseConfig {
            database_url: server_url("postgres", "restobar", "p@ss:w/rd", "db", "5432", "restobar"),
            max_connections: 10,
        };
        let redacted = config.redacted_url();
        assert_eq!(redacted, "postgres://restobar:***@db:5432/restobar");
        assert!(!redacted.contains("p%40ss"));
    }
}
