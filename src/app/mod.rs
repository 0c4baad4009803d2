//! 应用层：路由与各业务模块

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::app::{
    analytics::service::DashboardService, auth::service::SessionKeys,
    products::service::ProductService, sales::service::SaleService,
};
use crate::config::{Config, HttpConfig};
use crate::core::{clock::SharedClock, middleware::request_logging_middleware};
use crate::infrastructure::{media::SharedMediaHost, store::SharedStore};

pub mod analytics;
pub mod auth;
pub mod health;
pub mod normalize;
pub mod products;
pub mod sales;
pub mod upload;

/// 所有处理器共享的状态
#[derive(Clone)]
pub struct AppState {
    pub products: ProductService,
    pub sales: SaleService,
    pub dashboard: DashboardService,
    pub media: SharedMediaHost,
    pub sessions: SessionKeys,
    pub clock: SharedClock,
    pub store: SharedStore,
}

impl AppState {
    pub fn new(
        config: &Config,
        store: SharedStore,
        media: SharedMediaHost,
        clock: SharedClock,
    ) -> Self {
        Self {
            products: ProductService::new(store.clone(), clock.clone()),
            sales: SaleService::new(
                store.clone(),
                clock.clone(),
                config.analytics.sales_lookback_days,
            ),
            dashboard: DashboardService::new(
                store.clone(),
                clock.clone(),
                config.analytics.clone(),
            ),
            media,
            sessions: SessionKeys::new(&config.auth.session_secret, config.auth.session_ttl_minutes),
            clock,
            store,
        }
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(analytics::handler::get_dashboard))
        .route(
            "/products",
            get(products::handler::list_products).post(products::handler::create_product),
        )
        .route(
            "/products/:id",
            get(products::handler::get_product)
                .put(products::handler::update_product)
                .delete(products::handler::delete_product),
        )
        .route("/products/:id/sell", post(products::handler::sell_product))
        .route(
            "/sales",
            get(sales::handler::list_sales).post(sales::handler::record_sale),
        )
        .route("/upload", post(upload::handler::upload_image))
        .route("/auth/session", get(auth::handler::get_session))
        .route("/auth/refresh", post(auth::handler::refresh_session))
}

/// 构建完整路由；`/api` 下的处理器各自通过 `Identity` 要求登录
pub fn router(state: AppState, http: &HttpConfig) -> Router {
    let cors = if http.cors_allow_any {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(TimeoutLayer::new(Duration::from_secs(http.timeout_seconds))),
        )
        .layer(DefaultBodyLimit::max(http.body_limit_bytes))
        .with_state(state)
}
