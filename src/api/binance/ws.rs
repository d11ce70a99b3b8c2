use crate::api::sampler::Sampler;
use crate::error::{LevelWatchError, Result};
use crate::monitor::session::Reading;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite;

const BINANCE_WS_URL: &str = "wss://stream.binance.com:9443";

#[derive(Debug, Serialize, Deserialize)]
struct TickerData {
    stream: String,
    data: TickerDataInner,
}

#[derive(Debug, Serialize, Deserialize)]
struct TickerDataInner {
    #[serde(rename = "E")]
    event_time: i64,
    #[serde(rename = "s")]
    symbol: String,
    #[serde(rename = "c")]
    last_price: String,
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    reading: Reading,
    received: Instant,
}

pub fn ticker_url(symbol: &str) -> String {
    format!(
        "{}/stream?streams={}@ticker",
        BINANCE_WS_URL,
        symbol.to_lowercase()
    )
}

/// Parses one combined-stream ticker message into a reading.
pub fn parse_ticker(text: &str) -> Result<Reading> {
    let ticker: TickerData = serde_json::from_str(text)?;
    let value = ticker.data.last_price.parse::<f64>().map_err(|e| {
        LevelWatchError::InvalidInput(format!(
            "price '{}' for {}: {}",
            ticker.data.last_price, ticker.data.symbol, e
        ))
    })?;
    if !value.is_finite() || value <= 0.0 {
        return Err(LevelWatchError::InvalidInput(format!(
            "price {} for {} is not usable",
            value, ticker.data.symbol
        )));
    }
    let timestamp: DateTime<Utc> =
        DateTime::<Utc>::from_timestamp_millis(ticker.data.event_time).unwrap_or_else(Utc::now);
    Ok(Reading::new(timestamp, value))
}

/// Sampler backed by the latest value of a ticker feed.
#[derive(Clone)]
pub struct TickerSampler {
    latest: watch::Receiver<Option<Sample>>,
    stale_after: Duration,
}

impl TickerSampler {
    fn from_channel(latest: watch::Receiver<Option<Sample>>, stale_after: Duration) -> Self {
        Self {
            latest,
            stale_after,
        }
    }
}

#[async_trait]
impl Sampler for TickerSampler {
    async fn read(&self) -> Result<Reading> {
        let mut latest = self.latest.clone();
        let ready = latest.wait_for(Option::is_some).await.map(|sample| *sample);
        let sample = match ready {
            Ok(Some(sample)) => sample,
            _ => {
                return Err(LevelWatchError::SamplerUnavailable(
                    "ticker feed has stopped".into(),
                ))
            }
        };

        let age = sample.received.elapsed();
        if age > self.stale_after {
            return Err(LevelWatchError::SamplerUnavailable(format!(
                "last ticker is {}s old",
                age.as_secs()
            )));
        }
        Ok(sample.reading)
    }
}

/// Spawns a task that keeps a Binance ticker subscription open for `symbol`,
/// reconnecting after `reconnect_delay` on failure. The task ends once every
/// clone of the returned sampler is dropped.
pub fn spawn_ticker_feed(
    symbol: &str,
    reconnect_delay: Duration,
    stale_after: Duration,
) -> (TickerSampler, JoinHandle<()>) {
    let (sender, receiver) = watch::channel(None);
    let url = ticker_url(symbol);
    let handle = tokio::spawn(run_feed(url, sender, reconnect_delay));
    (TickerSampler::from_channel(receiver, stale_after), handle)
}

async fn run_feed(url: String, sender: watch::Sender<Option<Sample>>, reconnect_delay: Duration) {
    loop {
        match stream_ticker(&url, &sender).await {
            Ok(()) => info!("Ticker stream ended"),
            Err(e) => error!("Ticker stream failed: {}", e),
        }
        if sender.is_closed() {
            break;
        }
        warn!("Reconnecting to ticker stream in {:?}", reconnect_delay);
        tokio::select! {
            _ = sender.closed() => break,
            _ = tokio::time::sleep(reconnect_delay) => {}
        }
    }
    debug!("Ticker feed shut down");
}

async fn stream_ticker(url: &str, sender: &watch::Sender<Option<Sample>>) -> Result<()> {
    info!("Connecting to Binance WebSocket: {}", url);
    let (mut ws_stream, _) = connect_async(url).await?;
    info!("Successfully connected to WebSocket");

    loop {
        let message = tokio::select! {
            _ = sender.closed() => return Ok(()),
            message = ws_stream.next() => message,
        };
        match message {
            Some(Ok(tungstenite::protocol::Message::Text(text))) => match parse_ticker(&text) {
                Ok(reading) => {
                    debug!("Ticker price {}", reading.value);
                    sender.send_replace(Some(Sample {
                        reading,
                        received: Instant::now(),
                    }));
                }
                Err(e) => warn!("Failed to parse ticker data: {}", e),
            },
            Some(Ok(tungstenite::protocol::Message::Close(_))) | None => {
                info!("WebSocket connection closed");
                return Ok(());
            }
            Some(Ok(_)) => {} // tungstenite answers pings itself
            Some(Err(e)) => return Err(e.into()),
        }
    }
}
