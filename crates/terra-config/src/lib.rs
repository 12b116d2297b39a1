use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fmt, fs};
use terra_capture::{CaptureRules, HoldRules};
use terra_collectibles::SpawnRules;
use terra_core::{PlayerId, Team};
use terra_geo::{GeoJsonFeature, GeoJsonPolygon, Territory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Local,
    Dev,
    Test,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_env(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "local" => Self::Local,
            "dev" | "development" => Self::Dev,
            "test" | "testing" => Self::Test,
            "staging" => Self::Staging,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Local => "local",
            Self::Dev => "dev",
            Self::Test => "test",
            Self::Staging => "staging",
            Self::Prod => "prod",
        };
        write!(f, "{}", value)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigError {
    pub message: String,
}

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
    pub environment: Environment,
    pub metrics_addr: Option<String>,
    pub log_level: String,
}

impl ServiceConfig {
    pub fn from_env(default_service_name: &str) -> Self {
        Self::from_lookup(default_service_name, |key| env::var(key).ok())
    }

    pub fn from_lookup<F>(default_service_name: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            service_name: text(&lookup, "TERRA_SERVICE_NAME", default_service_name),
            environment: Environment::from_env(&text(&lookup, "TERRA_ENV", "local")),
            metrics_addr: lookup("TERRA_METRICS_ADDR").filter(|value| !value.trim().is_empty()),
            log_level: text(&lookup, "TERRA_LOG_LEVEL", "info"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub player_id: PlayerId,
    pub team: Team,
    pub territory_path: Option<PathBuf>,
    pub capture: CaptureRules,
    pub hold: HoldRules,
    pub gift_boxes: SpawnRules,
    pub christmas_trees: SpawnRules,
    pub region_lock_ms: u64,
    pub hud_interval_ms: u64,
    pub expiry_sweep_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl GameConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let capture_defaults = CaptureRules::default();
        let capture = CaptureRules {
            angle_threshold_deg: parsed(
                &lookup,
                "TERRA_CAPTURE_ANGLE_THRESHOLD_DEG",
                capture_defaults.angle_threshold_deg,
            ),
            min_angle_duration_ms: parsed(
                &lookup,
                "TERRA_CAPTURE_MIN_ANGLE_DURATION_MS",
                capture_defaults.min_angle_duration_ms,
            ),
            retention_ms: parsed(
                &lookup,
                "TERRA_CAPTURE_RETENTION_MS",
                capture_defaults.retention_ms,
            ),
            loop_close_distance_m: parsed(
                &lookup,
                "TERRA_CAPTURE_LOOP_CLOSE_DISTANCE_M",
                capture_defaults.loop_close_distance_m,
            ),
            min_loop_points: parsed(
                &lookup,
                "TERRA_CAPTURE_MIN_LOOP_POINTS",
                capture_defaults.min_loop_points,
            ),
            min_loop_duration_ms: parsed(
                &lookup,
                "TERRA_CAPTURE_MIN_LOOP_DURATION_MS",
                capture_defaults.min_loop_duration_ms,
            ),
            min_loop_area_m2: parsed(
                &lookup,
                "TERRA_CAPTURE_MIN_LOOP_AREA_M2",
                capture_defaults.min_loop_area_m2,
            ),
        };

        let hold_defaults = HoldRules::default();
        let hold = HoldRules {
            interval_ms: parsed(&lookup, "TERRA_HOLD_INTERVAL_MS", hold_defaults.interval_ms),
            points_per_interval: parsed(
                &lookup,
                "TERRA_HOLD_POINTS_PER_INTERVAL",
                hold_defaults.points_per_interval,
            ),
        };

        Self {
            player_id: lookup("TERRA_PLAYER_ID")
                .and_then(|value| value.parse().ok())
                .unwrap_or_default(),
            team: parsed(&lookup, "TERRA_PLAYER_TEAM", Team::Red),
            territory_path: lookup("TERRA_TERRITORY_PATH")
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
            capture,
            hold,
            gift_boxes: spawn_rules(&lookup, "TERRA_GIFT", SpawnRules::gift_box()),
            christmas_trees: spawn_rules(&lookup, "TERRA_TREE", SpawnRules::christmas_tree()),
            region_lock_ms: parsed(&lookup, "TERRA_REGION_LOCK_MS", 30 * 60 * 1000),
            hud_interval_ms: parsed(&lookup, "TERRA_HUD_INTERVAL_MS", 1_000),
            expiry_sweep_ms: parsed(&lookup, "TERRA_EXPIRY_SWEEP_MS", 5_000),
        }
    }

    pub fn load_territory(&self) -> Result<Territory, ConfigError> {
        match &self.territory_path {
            Some(path) => load_territory(path),
            None => Ok(Territory::college_campus()),
        }
    }
}

pub fn load_territory(path: &Path) -> Result<Territory, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|err| ConfigError::new(format!("read {}: {err}", path.display())))?;
    parse_territory(&raw)
        .map_err(|err| ConfigError::new(format!("territory {}: {}", path.display(), err.message)))
}

pub fn parse_territory(raw: &str) -> Result<Territory, ConfigError> {
    if let Ok(feature) = serde_json::from_str::<GeoJsonFeature>(raw) {
        return feature
            .to_territory()
            .map_err(|err| ConfigError::new(err.to_string()));
    }
    let polygon: GeoJsonPolygon =
        serde_json::from_str(raw).map_err(|err| ConfigError::new(err.to_string()))?;
    let boundary = polygon
        .to_polygon()
        .map_err(|err| ConfigError::new(err.to_string()))?;
    Ok(Territory::new("Territory", boundary))
}

fn spawn_rules<F>(lookup: &F, prefix: &str, defaults: SpawnRules) -> SpawnRules
where
    F: Fn(&str) -> Option<String>,
{
    SpawnRules {
        max_active: parsed(lookup, &format!("{prefix}_MAX_ACTIVE"), defaults.max_active),
        min_separation_m: parsed(
            lookup,
            &format!("{prefix}_MIN_SEPARATION_M"),
            defaults.min_separation_m,
        ),
        collection_radius_m: parsed(
            lookup,
            &format!("{prefix}_COLLECTION_RADIUS_M"),
            defaults.collection_radius_m,
        ),
        lifetime_ms: parsed(lookup, &format!("{prefix}_LIFETIME_MS"), defaults.lifetime_ms),
        spawn_interval_ms: parsed(
            lookup,
            &format!("{prefix}_SPAWN_INTERVAL_MS"),
            defaults.spawn_interval_ms,
        ),
        max_placement_attempts: parsed(
            lookup,
            &format!("{prefix}_MAX_PLACEMENT_ATTEMPTS"),
            defaults.max_placement_attempts,
        ),
    }
}

fn text<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}
