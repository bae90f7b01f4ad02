use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub quizzes_collection: String,
    pub results_collection: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub tick_interval_secs: u32,
    pub session_idle_ttl_secs: u64,
    pub mongo_max_pool_size: u32,
    pub mongo_min_pool_size: u32,
    pub mongo_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "quiz-sessions-local".to_string()),
            quizzes_collection: env::var("QUIZZES_COLLECTION")
                .unwrap_or_else(|_| "quizzes".to_string()),
            results_collection: env::var("RESULTS_COLLECTION")
                .unwrap_or_else(|_| "quizResults".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            tick_interval_secs: env::var("TICK_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            session_idle_ttl_secs: parse_env("SESSION_IDLE_TTL_SECS", 1800),
            mongo_max_pool_size: parse_env("MONGO_MAX_POOL_SIZE", 10),
            mongo_min_pool_size: parse_env("MONGO_MIN_POOL_SIZE", 2),
            mongo_timeout_secs: parse_env("MONGO_TIMEOUT_SECS", 5),
        }
    }

    /// `None` when `TICK_INTERVAL_SECS=0`: ticks are then delivered through the tick endpoint.
    pub fn tick_interval(&self) -> Option<Duration> {
        (self.tick_interval_secs > 0).then(|| Duration::from_secs(u64::from(self.tick_interval_secs)))
    }

    /// How long a session may sit unstarted before it is swept. `None` when set to 0.
    pub fn session_idle_ttl(&self) -> Option<Duration> {
        (self.session_idle_ttl_secs > 0).then(|| Duration::from_secs(self.session_idle_ttl_secs))
    }

    pub fn mongo_timeout(&self) -> Duration {
        Duration::from_secs(self.mongo_timeout_secs)
    }

    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "quiz-sessions-test".to_string(),
            quizzes_collection: "quizzes".to_string(),
            results_collection: "quizResults".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            tick_interval_secs: 1,
            session_idle_ttl_secs: 1800,
            mongo_max_pool_size: 10,
            mongo_min_pool_size: 2,
            mongo_timeout_secs: 5,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_with_defaults() {
        let config = Config::from_env();

        // Should use env vars if set, or fall back to defaults
        assert!(!config.mongo_conn_string.is_empty());
        assert!(!config.mongo_db_name.is_empty());
        assert!(!config.results_collection.is_empty());
    }

    #[test]
    fn test_test_config() {
        let config = Config::test_config();

        assert_eq!(config.mongo_db_name, "quiz-sessions-test");
        assert_eq!(config.results_collection, "quizResults");
        assert_eq!(config.tick_interval(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_zero_tick_interval_disables_internal_timer() {
        let config = Config {
            tick_interval_secs: 0,
            ..Config::test_config()
        };

        assert_eq!(config.tick_interval(), None);
    }

    #[test]
    fn test_idle_ttl_and_pool_settings() {
        let config = Config::test_config();
        assert_eq!(config.session_idle_ttl(), Some(Duration::from_secs(1800)));
        assert_eq!(config.mongo_timeout(), Duration::from_secs(5));
        assert!(config.mongo_min_pool_size <= config.mongo_max_pool_size);

        let config = Config {
            session_idle_ttl_secs: 0,
            ..Config::test_config()
        };
        assert_eq!(config.session_idle_ttl(), None);
    }

    #[test]
    fn test_parse_env_falls_back_on_missing_or_bad_values() {
        assert_eq!(parse_env("QUIZ_SESSION_TEST_UNSET_KEY", 7u32), 7);
    }
}
