mod aggregator;
mod config;
mod errors;
mod logging;
mod models;
mod notify;
mod poll;
mod sources;
#[cfg(test)]
mod test_server;
mod tracker;

use config::Config;
use notify::{Alert, Dispatcher, EmailNotifier, Notifier, TelegramNotifier};
use poll::PollLoop;
use sources::{FundingSource, PriceChangeSource};
use tokio_util::sync::CancellationToken;
use tracker::NotifiedSet;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let _log_guard = logging::init(&config.log)?;

    // ── 1. Notification channels ───────────────────────────────────
    let mut channels: Vec<Box<dyn Notifier>> = Vec::new();

    match &config.smtp {
        Some(smtp) => match EmailNotifier::new(smtp) {
            Ok(email) => channels.push(Box::new(email)),
            Err(e) => tracing::error!("[email] disabled: {}", e),
        },
        None => tracing::warn!("[email] disabled: SMTP_USERNAME, EMAIL_PASSWORD and EMAIL_TO are required"),
    }

    match &config.telegram {
        Some(tg) => match TelegramNotifier::new(tg) {
            Ok(telegram) => channels.push(Box::new(telegram)),
            Err(e) => tracing::error!("[telegram] disabled: {}", e),
        },
        None => tracing::warn!("[telegram] disabled: TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID are required"),
    }

    let dispatcher = Dispatcher::new(channels);

    // ── 2. Listing sources sharing one HTTP client ─────────────────
    let client = sources::build_client(&config.http)?;
    let funding = FundingSource::new(client.clone(), &config.http)?;
    let pchange = PriceChangeSource::new(client, &config.http);

    tracing::info!(
        "pumpwatch starting: channels {:?}, interval {}s, policy {:?}",
        dispatcher.channel_names(),
        config.poll_interval.as_secs(),
        config.policy
    );

    // ── 3. Startup notice, once ────────────────────────────────────
    match dispatcher.dispatch(&Alert::startup()).await {
        0 => tracing::warn!("Startup notification reached no channel"),
        n => tracing::info!("Startup notification sent via {} channel(s)", n),
    }

    // ── 4. Stop on Ctrl+C ──────────────────────────────────────────
    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutting down...");
        signal_token.cancel();
    });

    // ── 5. Poll until told to stop ─────────────────────────────────
    let mut poll_loop = PollLoop::new(
        Box::new(funding),
        Box::new(pchange),
        dispatcher,
        NotifiedSet::new(config.policy),
        config.poll_interval,
    );
    poll_loop.run(shutdown).await;

    Ok(())
}
