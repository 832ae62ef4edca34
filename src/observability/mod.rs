//! 可观测性模块
//!
//! 提供 Prometheus 文本格式指标和健康检查。

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::storage::SessionStore;

// ===== Simple Metrics (using atomics for zero-dep implementation) =====

/// 简单应用指标
#[derive(Clone, Default)]
pub struct AppMetrics {
    pub sessions_created_total: Arc<AtomicU64>,
    pub questions_total: Arc<AtomicU64>,
    pub upstream_failures_total: Arc<AtomicU64>,
    pub upstream_latency_sum_ms: Arc<AtomicU64>,
}

impl AppMetrics {
    /// 记录会话创建
    pub fn record_session_created(&self) {
        self.sessions_created_total.fetch_add(1, Ordering::SeqCst);
    }

    /// 记录一次提问及其上游耗时
    pub fn record_question(&self, duration_ms: u64, failed: bool) {
        self.questions_total.fetch_add(1, Ordering::SeqCst);
        self.upstream_latency_sum_ms
            .fetch_add(duration_ms, Ordering::SeqCst);
        if failed {
            self.upstream_failures_total.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// 生成 Prometheus 格式指标
    pub fn gather(&self, sessions_live: usize, sessions_with_image: usize) -> String {
        format!(
            r#"# HELP sessions_created_total Total sessions created
# TYPE sessions_created_total counter
sessions_created_total {}
# HELP sessions_live Live sessions in the store
# TYPE sessions_live gauge
sessions_live {}
# HELP sessions_with_image Live sessions with a calendar image attached
# TYPE sessions_with_image gauge
sessions_with_image {}
# HELP questions_total Total questions asked
# TYPE questions_total counter
questions_total {}
# HELP upstream_failures_total Total upstream model failures
# TYPE upstream_failures_total counter
upstream_failures_total {}
# HELP upstream_latency_seconds Upstream call latency in seconds
# TYPE upstream_latency_seconds histogram
upstream_latency_seconds_sum {}
upstream_latency_seconds_count {}
"#,
            self.sessions_created_total.load(Ordering::SeqCst),
            sessions_live,
            sessions_with_image,
            self.questions_total.load(Ordering::SeqCst),
            self.upstream_failures_total.load(Ordering::SeqCst),
            self.upstream_latency_sum_ms.load(Ordering::SeqCst) as f64 / 1000.0,
            self.questions_total.load(Ordering::SeqCst),
        )
    }
}

// ===== Health Check =====

/// 健康检查状态
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// 服务状态
    pub status: String,
    /// 版本号
    pub version: String,
    /// 启动以来的秒数
    pub uptime_seconds: i64,
    /// 当前时间
    pub timestamp: DateTime<Utc>,
}

/// 可观测性状态
pub struct ObservabilityState {
    /// 版本号
    pub version: String,
    /// 启动时间
    pub started_at: DateTime<Utc>,
    /// 指标
    pub metrics: AppMetrics,
    /// 会话存储（用于 gauge 读数）
    pub store: Arc<dyn SessionStore>,
}

impl ObservabilityState {
    /// 创建可观测性状态
    pub fn new(version: String, metrics: AppMetrics, store: Arc<dyn SessionStore>) -> Self {
        Self {
            version,
            started_at: Utc::now(),
            metrics,
            store,
        }
    }
}

async fn health_handler(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    let now = Utc::now();
    Json(HealthStatus {
        status: "ok".to_string(),
        version: state.version.clone(),
        uptime_seconds: (now - state.started_at).num_seconds(),
        timestamp: now,
    })
}

async fn metrics_handler(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    state
        .metrics
        .gather(state.store.count(), state.store.active_count())
}

/// 创建可观测性路由
pub fn create_observability_router(state: Arc<ObservabilityState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
