use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

use crate::{config::AppConfig, handlers, middleware as app_middleware, proxy};
use wicket_accesslog::{
    AccessLogStage, DynSink, MemorySink, PostgresSink, spawn_drain_workers,
};
use wicket_auth::IdentityGate;

pub struct WicketServer {
    addr: SocketAddr,
    app: Router,
    access_log: Arc<AccessLogStage>,
    sink: DynSink,
}

/// Build the gateway application from configuration.
///
/// Constructs the two stages (identity gate, access-log stage with its
/// background drain workers) and wires them around the upstream forwarder.
/// Must run inside a tokio runtime (the drain workers are spawned here).
pub fn build_app(cfg: &AppConfig) -> anyhow::Result<(Router, Arc<AccessLogStage>, DynSink)> {
    let client = reqwest::Client::new();

    let gate = Arc::new(IdentityGate::with_client(&cfg.auth, client.clone())?);

    let sink: DynSink = match &cfg.access_log.postgres {
        Some(pg) => {
            tracing::info!(pool_size = pg.pool_size, "access log sink: PostgreSQL");
            Arc::new(PostgresSink::connect_lazy(pg)?)
        }
        None => {
            tracing::warn!("no access log sink configured, batches stay in memory");
            Arc::new(MemorySink::new())
        }
    };
    let drain = spawn_drain_workers(Arc::clone(&sink), cfg.access_log.workers);
    let stage = Arc::new(AccessLogStage::new(cfg.access_log.high_water_mark, drain));

    let app = build_app_with(cfg, gate, Arc::clone(&stage), client);
    Ok((app, stage, sink))
}

/// Build the router around injected stage components.
///
/// Separated from [`build_app`] so tests can supply their own gate, stage,
/// and sink.
pub fn build_app_with(
    cfg: &AppConfig,
    gate: Arc<IdentityGate>,
    stage: Arc<AccessLogStage>,
    client: reqwest::Client,
) -> Router {
    let auth_state = app_middleware::AuthState {
        gate,
        enabled: cfg.auth.enabled,
        protected_prefixes: Arc::new(cfg.auth.protected_prefixes.clone()),
    };
    let access_log_state = app_middleware::AccessLogState { stage };
    let proxy_state = proxy::ProxyState::new(client, &cfg.upstream.url, cfg.upstream.timeout);

    // Execution order per request: trace -> request id -> access log (every
    // request) -> authentication (protected prefixes) -> local route or
    // upstream forwarder.
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .fallback(proxy::forward)
        .with_state(proxy_state)
        .layer(middleware::from_fn_with_state(
            auth_state,
            app_middleware::authentication,
        ))
        .layer(middleware::from_fn_with_state(
            access_log_state,
            app_middleware::access_log,
        ))
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
                let req_id = req
                    .extensions()
                    .get::<axum::http::HeaderValue>()
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                tracing::info_span!(
                    "http.request",
                    http.method = %req.method(),
                    http.target = %req.uri(),
                    request_id = %req_id
                )
            }),
        )
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn build(self) -> anyhow::Result<WicketServer> {
        let (app, access_log, sink) = build_app(&self.config)?;

        Ok(WicketServer {
            addr: self.addr,
            app,
            access_log,
            sink,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WicketServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(
            listener,
            self.app
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        // Shrink the accepted loss window: persist whatever is still
        // buffered before the runtime is torn down. Batches already queued
        // with the background workers stay best-effort.
        flush_access_log(&self.access_log, &self.sink).await;
        Ok(())
    }
}

/// Write the remaining buffered records directly to the sink, awaiting the
/// insert instead of racing the drain workers against shutdown.
async fn flush_access_log(stage: &AccessLogStage, sink: &DynSink) {
    let batch = stage.drain_now();
    if batch.is_empty() {
        return;
    }
    let rows = batch.len();
    if let Err(e) = sink.insert_batch(&batch).await {
        tracing::warn!(rows, error = %e, "failed to persist final access log batch");
    } else {
        tracing::info!(rows, "final access log batch persisted");
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_flush_persists_the_remaining_buffer_synchronously() {
        let memory = Arc::new(MemorySink::new());
        let sink: DynSink = memory.clone();
        let drain = spawn_drain_workers(Arc::clone(&sink), 1);
        let stage = AccessLogStage::new(100, drain);

        stage.record("10.0.0.1", "/a");
        stage.record("10.0.0.1", "/b");
        stage.record("10.0.0.1", "/c");

        // Once the flush returns, the rows are in the sink. No polling.
        flush_access_log(&stage, &sink).await;
        assert_eq!(memory.len(), 3);
        assert_eq!(stage.buffered(), 0);

        // An empty buffer flushes to nothing, not an empty write.
        flush_access_log(&stage, &sink).await;
        assert_eq!(memory.len(), 3);
    }
}
