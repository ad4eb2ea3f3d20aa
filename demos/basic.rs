//! # Example: basic
//!
//! A supervisor running a ticker and an HTTP health endpoint until Ctrl-C.
//!
//! ## Flow
//! ```text
//! main
//!  ├─► cancel_on_shutdown_signal(ctx)
//!  └─► Supervisor::start(ctx)
//!        ├─► ticker  (AppFn, logs every second)
//!        └─► health  (HttpServer on 127.0.0.1:8080)
//! Ctrl-C ─► ctx.cancel() ─► both terminate ─► log drained ─► exit
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic
//! curl http://127.0.0.1:8080/health
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tokio_util::sync::CancellationToken;

use appvisor::{AppFn, AppRef, Application, Config, HttpServer, Level, Supervisor, logging};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let level: Level = std::env::var("APPVISOR_LOG")
        .ok()
        .map(|s| s.parse::<Level>())
        .transpose()?
        .unwrap_or_default();

    let ticker: AppRef = AppFn::arc("ticker", |ctx: CancellationToken| async move {
        let mut n = 0u64;
        loop {
            tokio::select! {
                _ = ctx.cancelled() => break,
                _ = tokio::time::sleep(Duration::from_secs(1)) => {
                    n += 1;
                    logging::debug(format_args!("tick {n}"));
                }
            }
        }
    });

    let addr: SocketAddr = "127.0.0.1:8080".parse()?;
    let router = Router::new().route("/health", get(|| async { "ok" }));
    let health: AppRef = std::sync::Arc::new(HttpServer::new("health", addr, router));

    let sup = Supervisor::new(Config::with_level(level), vec![ticker, health]);

    let ctx = CancellationToken::new();
    appvisor::cancel_on_shutdown_signal(ctx.clone());

    sup.start(ctx)?.await;
    Ok(())
}
