use crate::events::WorkerEvent;
use crate::session::{FixOutcome, GameSession, PendingCapture};
use metrics::{counter, gauge};
use std::sync::Arc;
use terra_collectibles::CollectibleKind;
use terra_geo::LocationFix;
use terra_observability::names;
use terra_storage::RegionRepository;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

pub struct Worker<W> {
    session: GameSession,
    store: Arc<dyn RegionRepository>,
    out: W,
}

impl<W> Worker<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(session: GameSession, store: Arc<dyn RegionRepository>, out: W) -> Self {
        Self {
            session,
            store,
            out,
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }

    pub async fn handle_bytes(&mut self, raw: &[u8]) -> anyhow::Result<()> {
        match std::str::from_utf8(raw) {
            Ok(line) => self.handle_line(line).await,
            Err(err) => {
                counter!(names::FIXES).increment(1);
                warn!(error = %err, "skipping location line that is not utf-8");
                counter!(names::FIXES_IGNORED).increment(1);
                Ok(())
            }
        }
    }

    pub async fn handle_line(&mut self, line: &str) -> anyhow::Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        counter!(names::FIXES).increment(1);
        let fix: LocationFix = match serde_json::from_str(line) {
            Ok(fix) => fix,
            Err(err) => {
                warn!(error = %err, "skipping malformed location line");
                counter!(names::FIXES_IGNORED).increment(1);
                return Ok(());
            }
        };
        self.handle_fix(&fix).await
    }

    pub async fn handle_fix(&mut self, fix: &LocationFix) -> anyhow::Result<()> {
        let FixOutcome {
            accepted,
            capture,
            capture_error,
            collected,
            hold,
            ..
        } = self.session.handle_fix(fix);
        if !accepted {
            counter!(names::FIXES_IGNORED).increment(1);
            return Ok(());
        }

        if capture_error.is_some() {
            counter!(names::CAPTURE_FAILURES).increment(1);
        }
        if let Some(capture) = capture {
            self.commit(capture).await?;
        }

        for item in collected {
            counter!(names::COLLECTIBLES_COLLECTED, "kind" => item.kind.as_str()).increment(1);
            let event = WorkerEvent::Collected {
                player_id: self.session.player_id(),
                team: self.session.team(),
                item,
            };
            self.emit(&event).await?;
        }

        if hold.updated {
            debug!(points_added = hold.points_added, "hold points awarded");
        }
        Ok(())
    }

    // Store first; a failed insert leaves the path for the next fix to retry.
    async fn commit(&mut self, capture: PendingCapture) -> anyhow::Result<()> {
        let PendingCapture { mode, region } = capture;
        let record = match region.to_record() {
            Ok(record) => record,
            Err(err) => {
                warn!(region_id = %region.id, error = %err, "region could not be encoded");
                counter!(names::CAPTURE_FAILURES).increment(1);
                return Ok(());
            }
        };
        if let Err(err) = self.store.insert(record).await {
            warn!(region_id = %region.id, error = %err, "region store rejected capture");
            counter!(names::CAPTURE_FAILURES).increment(1);
            return Ok(());
        }

        self.session.commit_capture();
        counter!(names::CAPTURES, "mode" => mode.as_str()).increment(1);
        info!(
            region_id = %region.id,
            mode = mode.as_str(),
            area_m2 = region.area_m2,
            "capture committed"
        );
        self.emit(&WorkerEvent::capture(mode, &region)).await?;
        self.refresh_regions().await
    }

    pub async fn refresh_regions(&mut self) -> anyhow::Result<()> {
        let all = self.store.list_all().await?;
        let live = self.store.list_active(self.session.now_ms()).await?;
        gauge!(names::REGIONS_LIVE).set(live.len() as f64);
        self.session.set_regions(all);
        Ok(())
    }

    pub async fn spawn(&mut self, kind: CollectibleKind) -> anyhow::Result<()> {
        let Some(item) = self.session.spawn(kind) else {
            return Ok(());
        };
        counter!(names::COLLECTIBLES_SPAWNED, "kind" => kind.as_str()).increment(1);
        self.emit(&WorkerEvent::Spawned { item }).await
    }

    pub fn sweep(&mut self) {
        for (kind, removed) in self.session.sweep_expired() {
            if removed > 0 {
                counter!(names::COLLECTIBLES_EXPIRED, "kind" => kind.as_str())
                    .increment(removed as u64);
            }
        }
    }

    pub async fn emit_hud(&mut self) -> anyhow::Result<()> {
        let hud = self.session.hud();
        self.emit(&WorkerEvent::Hud(hud)).await
    }

    async fn emit(&mut self, event: &WorkerEvent) -> anyhow::Result<()> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        self.out.write_all(&line).await?;
        self.out.flush().await?;
        Ok(())
    }
}
