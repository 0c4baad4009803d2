//! 数据库基础设施

use sqlx::{
    postgres::{PgPool, PgPoolOptions},
    Error,
};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;

pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    pub async fn new(database_url: &str, config: &DatabaseConfig) -> Result<Self, Error> {
        info!("连接数据库: {}", redact(database_url));

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub fn into_pool(self) -> PgPool {
        self.pool
    }
}

/// 日志里隐藏连接串中的密码
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let credentials = &url[scheme_end + 3..at];
            match credentials.split_once(':') {
                Some((user, _)) => format!("{}{}:***{}", &url[..scheme_end + 3], user, &url[at..]),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::redact;

    #[test]
    fn password_is_hidden() {
        assert_eq!(
            redact("postgres://admin:s3cret@db:5432/stockroom"),
            "postgres://admin:***@db:5432/stockroom"
        );
        assert_eq!(redact("postgres://db/stockroom"), "postgres://db/stockroom");
    }
}
