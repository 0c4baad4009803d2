use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use stockroom::{
    config::{load_config, Config},
    core::clock::{SharedClock, SystemClock},
    infrastructure::{
        logger,
        media::CloudinaryHost,
        store::{MemoryStore, SharedStore},
    },
    router, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("加载配置失败")?;
    let _guard = logger::init(&config.logging)?;

    info!("启动 Stockroom v{}", env!("CARGO_PKG_VERSION"));

    let clock: SharedClock = Arc::new(SystemClock);
    let store = build_store(&config, clock.clone()).await?;
    let media = CloudinaryHost::from_config(&config.media, clock.clone())
        .context("初始化图片托管客户端失败")?;

    let state = AppState::new(&config, store, media, clock);
    let app = router(state, &config.http);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("无法绑定到 {}", addr))?;

    info!("🚀 服务运行在 http://{}", listener.local_addr()?);
    info!("📖 可用端点:");
    info!("   GET    /health");
    info!("   GET    /api/dashboard?range=7d|30d");
    info!("   GET    /api/products              POST /api/products");
    info!("   GET    /api/products/:id          PUT/DELETE /api/products/:id");
    info!("   POST   /api/products/:id/sell");
    info!("   GET    /api/sales                 POST /api/sales");
    info!("   POST   /api/upload");
    info!("   GET    /api/auth/session          POST /api/auth/refresh");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("服务已停止");
    Ok(())
}

/// 配置了数据库地址时使用 PostgreSQL，否则使用内存存储
async fn build_store(config: &Config, clock: SharedClock) -> anyhow::Result<SharedStore> {
    if let Some(url) = &config.database.url {
        return connect_postgres(url, config, clock).await;
    }

    let store = MemoryStore::new(clock);
    match &config.database.seed_path {
        Some(path) => {
            store
                .seed_from_file(path)
                .with_context(|| format!("导入种子数据失败: {}", path.display()))?;
        }
        None => warn!("使用内存存储，重启后数据会丢失"),
    }

    info!("存储后端: memory");
    Ok(Arc::new(store))
}

#[cfg(feature = "postgres")]
async fn connect_postgres(
    url: &str,
    config: &Config,
    clock: SharedClock,
) -> anyhow::Result<SharedStore> {
    use stockroom::infrastructure::{database::DatabaseManager, store::PgStore};

    let db = DatabaseManager::new(url, &config.database)
        .await
        .context("连接数据库失败")?;
    let store = PgStore::new(db.into_pool(), clock);
    store.create_tables().await?;
    info!("存储后端: postgres");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn connect_postgres(
    _url: &str,
    _config: &Config,
    _clock: SharedClock,
) -> anyhow::Result<SharedStore> {
    anyhow::bail!("配置了 database.url，但编译时未启用 postgres 特性")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("无法监听退出信号: {}", e);
        std::future::pending::<()>().await;
    }
    info!("收到退出信号，正在关闭...");
}
