use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Token authentication settings.
///
/// The access and refresh secrets are distinct on purpose: leaking one
/// key must not allow forging the other token kind.
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    /// Access token lifetime in seconds (default config ships 3600).
    pub access_token_expiry: i64,
    /// Signed refresh token lifetime in seconds (default config ships 14400).
    pub refresh_token_expiry: i64,
    /// Lifetime of the `refresh_token` cookie in seconds. Shipped as 3600,
    /// shorter than `refresh_token_expiry`; the browser drops the cookie
    /// before the signed token would expire. Kept as its own knob so the
    /// two windows can be aligned by configuration alone.
    pub refresh_cookie_ttl: i64,
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .build()?;
    settings.try_deserialize::<Settings>()
}
