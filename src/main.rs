mod api;
mod config;
mod error;
mod monitor;
mod store;
mod ui;

use api::binance::ws;
use config::Settings;
use env_logger::Builder;
use log::{info, LevelFilter};
use std::error::Error;
use std::io::Write;
use std::sync::Arc;
use ui::alerts::ConsoleAlertSink;
use ui::menu::{Menu, STOP_HINT};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // Configure logger
    Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module("levelwatch", LevelFilter::Info)
        .parse_env("LEVELWATCH_LOG")
        .format(|buf, record| {
            let ts = chrono::Local::now().format("%H:%M:%S%.3f");
            writeln!(
                buf,
                "[{} {:<5} {}] {}",
                ts,
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr) // Keep logs separate from the menu
        .write_style(env_logger::WriteStyle::Auto)
        .init();

    let settings = Settings::from_env();
    info!("Starting levelwatch for {}...", settings.symbol);

    let levels = store::load_or_empty(&settings.levels_file).into_shared();
    let (sampler, feed_handle) =
        ws::spawn_ticker_feed(&settings.symbol, settings.reconnect_delay, settings.stale_after);
    let sink = Arc::new(ConsoleAlertSink::stdout(STOP_HINT));

    let mut menu = Menu::new(
        tokio::io::BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
        levels,
        Arc::new(sampler),
        sink,
        settings,
    );
    let result = menu.run().await;

    feed_handle.abort();

    result?;
    info!("Shutdown complete");
    Ok(())
}
