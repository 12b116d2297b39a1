mod events;
mod session;
mod worker;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use session::GameSession;
use std::sync::Arc;
use std::time::Duration;
use terra_collectibles::CollectibleKind;
use terra_config::{GameConfig, ServiceConfig};
use terra_core::SystemClock;
use terra_observability::{init, log_startup, ObservabilityConfig};
use terra_storage::InMemoryRegionStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, MissedTickBehavior};
use worker::Worker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env("terra-worker");
    let obs_config = ObservabilityConfig {
        service_name: config.service_name.clone(),
        environment: config.environment.to_string(),
        log_level: config.log_level.clone(),
        metrics_addr: config.metrics_addr.clone(),
    };
    let handle = init(&obs_config);
    log_startup(&handle, &obs_config.environment);

    let game = GameConfig::from_env();
    let territory = game.load_territory()?;
    tracing::info!(
        territory = territory.name(),
        area_m2 = territory.area_m2(),
        player_id = %game.player_id,
        team = %game.team,
        "session starting"
    );

    let session = GameSession::new(
        &game,
        territory,
        Arc::new(SystemClock),
        SmallRng::from_entropy(),
    );
    let store = Arc::new(InMemoryRegionStore::new());
    let mut worker = Worker::new(session, store, tokio::io::stdout());
    worker.refresh_regions().await?;

    let mut feed = BufReader::new(tokio::io::stdin());
    let mut line = Vec::new();
    let mut gift_tick = ticker(game.gift_boxes.spawn_interval_ms);
    let mut tree_tick = ticker(game.christmas_trees.spawn_interval_ms);
    let mut sweep_tick = ticker(game.expiry_sweep_ms);
    let mut hud_tick = ticker(game.hud_interval_ms);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            read = feed.read_until(b'\n', &mut line) => {
                if read? == 0 {
                    tracing::info!("location feed closed");
                    break;
                }
                worker.handle_bytes(&line).await?;
                line.clear();
            }
            _ = gift_tick.tick() => worker.spawn(CollectibleKind::GiftBox).await?,
            _ = tree_tick.tick() => worker.spawn(CollectibleKind::ChristmasTree).await?,
            _ = sweep_tick.tick() => worker.sweep(),
            _ = hud_tick.tick() => worker.emit_hud().await?,
            result = &mut shutdown => {
                if let Err(err) = result {
                    tracing::error!("failed to install ctrl-c handler: {}", err);
                }
                break;
            }
        }
    }

    worker.emit_hud().await?;
    tracing::info!("terra worker stopped");
    Ok(())
}

fn ticker(period_ms: u64) -> tokio::time::Interval {
    let mut ticker = interval(Duration::from_millis(period_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
