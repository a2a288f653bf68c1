use apigw::{
    AppState,
    config::{Config, PROD_ENV},
    infrastructure::AuthClient,
    lifecycle, logging,
    router::create_router,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志，输出格式只看 LOG_ENV
    dotenv::dotenv().ok();
    logging::init_tracing(std::env::var("LOG_ENV").is_ok_and(|v| v == PROD_ENV));

    // 加载配置
    let config = Config::from_env().map_err(|e| {
        tracing::error!(error = %e, "failed to load configuration");
        e
    })?;

    tracing::info!(
        env = %config.env,
        service = %config.service_name,
        version = env!("CARGO_PKG_VERSION"),
        "starting API gateway"
    );
    tracing::info!(?config, "loaded configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 连接认证服务
    let auth = AuthClient::connect(
        &config.auth_addr,
        config.auth_connect_timeout(),
        config.auth_timeout(),
    )
    .await
    .map_err(|e| {
        tracing::error!(addr = %config.auth_addr, error = %e, "failed to connect to auth service");
        e
    })?;
    tracing::info!(addr = %config.auth_addr, "connected to auth service");

    let addr = config.listen_addr();
    let grace = config.shutdown_timeout();

    let state = AppState::new(config, auth);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!(%addr, error = %e, "failed to bind");
        e
    })?;
    tracing::info!("Server listening on {}", addr);

    lifecycle::serve(listener, app, grace).await?;

    tracing::info!("server exited");
    Ok(())
}
