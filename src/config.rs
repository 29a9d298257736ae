use std::env;

pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub mongodb_uri: String,
    pub database_name: String,
    /// Interpolated into confirmation-email links and sender addresses.
    pub domain_name: String,
    pub smtp_host: String,
    pub smtp_username: String,
    pub smtp_password: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            mongodb_uri: env::var("MONGODB_URI").expect("MONGODB_URI must be set"),
            database_name: env::var("DATABASE_NAME").unwrap_or_else(|_| "tasknest".to_string()),
            domain_name: env::var("DOMAIN_NAME").expect("DOMAIN_NAME must be set"),
            smtp_host: env::var("SMTP_HOST").expect("SMTP_HOST must be set"),
            smtp_username: env::var("SMTP_USERNAME").expect("SMTP_USERNAME must be set"),
            smtp_password: env::var("SMTP_PASSWORD").expect("SMTP_PASSWORD must be set"),
        }
    }
}
