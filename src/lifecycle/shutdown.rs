//! 优雅停机

use std::future::Future;
use std::io;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

/// 等待 Ctrl+C 或 SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// 启动 HTTP 服务，收到系统停机信号后进入优雅停机
pub async fn serve(listener: TcpListener, app: Router, grace: Duration) -> io::Result<()> {
    serve_until(listener, app, grace, shutdown_signal()).await
}

/// 启动 HTTP 服务直到 `signal` 完成
///
/// 信号到达后停止接受新连接，最多等待 `grace` 让进行中的请求结束，
/// 超时后直接放弃剩余请求。
pub async fn serve_until<F>(
    listener: TcpListener,
    app: Router,
    grace: Duration,
    signal: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        res = &mut server => return flatten(res),
        _ = signal => {}
    }

    info!(grace_secs = grace.as_secs(), "shutdown signal received, draining in-flight requests");
    let _ = stop_tx.send(());

    match tokio::time::timeout(grace, &mut server).await {
        Ok(res) => {
            info!("HTTP server stopped");
            flatten(res)
        }
        Err(_) => {
            warn!("in-flight requests did not finish within the grace window, forcing shutdown");
            server.abort();
            Ok(())
        }
    }
}

fn flatten(res: Result<io::Result<()>, tokio::task::JoinError>) -> io::Result<()> {
    match res {
        Ok(inner) => inner,
        Err(e) => Err(io::Error::other(e)),
    }
}
