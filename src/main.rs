use bookview::api::{ApiServer, AppState};
use bookview::channel::websocket::WebSocketChannel;
use bookview::channel::{Channel, CommandSender, ConnectionHandle};
use bookview::config::{Config, LogFormat};
use bookview::engine::{BookEngine, SharedEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env());
    match config.log_format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.init(),
    }

    tracing::info!(
        "bookview starting: venue {} every {:?}, API on port {}",
        config.venue_url,
        config.summary_interval,
        config.api_port
    );

    let engine = SharedEngine::new(BookEngine::new(
        config.history_capacity,
        config.event_log_capacity,
    ));
    let conn = ConnectionHandle::new();
    let (commands, outbound) = CommandSender::new(conn.clone());

    // ── 1. Spawn the venue channel ─────────────────────────────────
    let channel: Box<dyn Channel> = Box::new(WebSocketChannel::new(&config));
    {
        let engine = engine.clone();
        let conn = conn.clone();
        tokio::spawn(async move {
            let name = channel.name();
            if let Err(e) = channel.run(engine, conn, outbound).await {
                tracing::error!("[{name}] channel stopped: {e}");
            }
        });
    }

    // ── 2. Periodic metrics log ────────────────────────────────────
    {
        let engine = engine.clone();
        let conn = conn.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(5));
            loop {
                interval.tick().await;
                match engine.read(|e| e.metrics()) {
                    Some(m) => tracing::info!(
                        "[{:?}] bid={} ask={} spread={} mid={} bidVol={} askVol={} vol={:.2}",
                        conn.state(),
                        m.best_bid,
                        m.best_ask,
                        m.spread,
                        m.mid_price,
                        m.total_bid_volume,
                        m.total_ask_volume,
                        m.volatility
                    ),
                    None => tracing::info!("[{:?}] no metrics available", conn.state()),
                }
            }
        });
    }

    // ── 3. Serve the read API until Ctrl+C ─────────────────────────
    let server = ApiServer::new(AppState {
        engine,
        conn,
        commands,
        view: config.view,
    });

    tokio::select! {
        result = server.run(&config) => result?,
        _ = tokio::signal::ctrl_c() => {}
    }

    tracing::info!("Shutting down...");
    Ok(())
}
