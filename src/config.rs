use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub client_origins: Vec<String>,
    // Firebase project that issues ID tokens and owns the FCM sender
    pub firebase_project_id: String,
    // Path to the service-account JSON; push is disabled without it
    pub firebase_service_account: Option<String>,
    pub rating_recompute_interval_secs: u64,
}

impl Config {
    pub fn init() -> anyhow::Result<Config> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let firebase_project_id =
            std::env::var("FIREBASE_PROJECT_ID").context("FIREBASE_PROJECT_ID must be set")?;

        let firebase_service_account = std::env::var("FIREBASE_SERVICE_ACCOUNT")
            .ok()
            .filter(|path| !path.trim().is_empty());

        let port = parse_or("PORT", 5000)?;
        let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", 10)?;
        let rating_recompute_interval_secs = parse_or("RATING_RECOMPUTE_INTERVAL_SECS", 3600)?;

        let client_origins = std::env::var("CLIENT_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());
        let client_origins = split_origins(&client_origins);

        Ok(Config {
            database_url,
            database_max_connections,
            port,
            client_origins,
            firebase_project_id,
            firebase_service_account,
            rating_recompute_interval_secs,
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} must be a valid number", key)),
        _ => Ok(default),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Config {
        Config {
            database_url: "postgres://localhost/skillswap_test".to_string(),
            database_max_connections: 1,
            port: 0,
            client_origins: vec!["http://localhost:5173".to_string()],
            firebase_project_id: "skillswap-test".to_string(),
            firebase_service_account: None,
            rating_recompute_interval_secs: 3600,
        }
    }
}
