use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::footprint::{SensorPointing, DEFAULT_RAY_SAMPLES};
use crate::intervals::ExtractorPolicy;
use crate::orbital::separation_time_for_distance;
use crate::overlay::Keepout;
use crate::predict::{EventSearch, GroundStation, PredictError, SatelliteTable};
use crate::raster::RasterConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid {field}: {message}")]
    Invalid { field: String, message: String },
    #[error("Satellite setup failed: {0}")]
    Satellites(#[from] PredictError),
}

impl ConfigError {
    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub station: StationConfig,
    pub tle_dir: PathBuf,
    #[serde(default)]
    pub satellites: Vec<SatelliteConfig>,
    #[serde(default)]
    pub followers: Vec<FollowerConfig>,
    #[serde(default)]
    pub raster: RasterConfig,
    #[serde(default)]
    pub footprint: FootprintConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub intervals: ExtractorPolicy,
    #[serde(default)]
    pub sky_chart: SkyChartConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
    #[serde(default)]
    pub min_elevation_deg: f64,
}

impl StationConfig {
    pub fn ground_station(&self) -> Result<GroundStation, ConfigError> {
        let mut station = GroundStation::from_coordinates(&self.coordinates, Some(self.altitude_m))
            .ok_or_else(|| {
                ConfigError::invalid(
                    "station.coordinates",
                    format!("expected \"lat, lon\" in degrees, got {:?}", self.coordinates),
                )
            })?;
        station.min_elevation_deg = self.min_elevation_deg;
        Ok(station)
    }
}

/// Per-satellite display settings
#[derive(Debug, Clone, Deserialize)]
pub struct SatelliteConfig {
    pub id: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub sensor: Option<SensorPointing>,
}

/// A virtual satellite trailing `leader`. Exactly one of `separation` (a
/// duration such as `"5m"`) or `distance_km` is set.
#[derive(Debug, Clone, Deserialize)]
pub struct FollowerConfig {
    pub leader: String,
    pub name: String,
    #[serde(default)]
    pub separation: Option<String>,
    #[serde(default)]
    pub distance_km: Option<f64>,
}

impl FollowerConfig {
    pub fn separation_s(&self, leader_period_s: f64) -> Result<f64, ConfigError> {
        match (&self.separation, self.distance_km) {
            (Some(text), None) => {
                let d = parse_duration(text)
                    .map_err(|e| ConfigError::invalid(format!("followers.{}.separation", self.name), e))?;
                Ok(d.num_milliseconds() as f64 / 1000.0)
            }
            (None, Some(km)) => Ok(separation_time_for_distance(leader_period_s, km)),
            _ => Err(ConfigError::invalid(
                format!("followers.{}", self.name),
                "set exactly one of separation or distance_km",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FootprintConfig {
    #[serde(default = "default_ray_samples")]
    pub ray_samples: usize,
}

fn default_ray_samples() -> usize {
    DEFAULT_RAY_SAMPLES
}

impl Default for FootprintConfig {
    fn default() -> Self {
        Self {
            ray_samples: DEFAULT_RAY_SAMPLES,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Coarse scan step of the rise/set search
    #[serde(default = "default_step")]
    pub step: String,
    /// Search length when no end time is given
    #[serde(default = "default_window")]
    pub window: String,
    /// Sampling step of the sunlit/eclipse search
    #[serde(default = "default_lighting_step")]
    pub lighting_step: String,
    /// Passes culminating below this are dropped
    #[serde(default)]
    pub min_peak_elevation_deg: f64,
}

fn default_step() -> String {
    "60s".to_string()
}

fn default_window() -> String {
    "1day".to_string()
}

fn default_lighting_step() -> String {
    "30s".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            step: default_step(),
            window: default_window(),
            lighting_step: default_lighting_step(),
            min_peak_elevation_deg: 0.0,
        }
    }
}

impl SearchConfig {
    pub fn step(&self) -> Result<Duration, ConfigError> {
        positive_duration("search.step", &self.step)
    }

    pub fn window(&self) -> Result<Duration, ConfigError> {
        positive_duration("search.window", &self.window)
    }

    pub fn lighting_step(&self) -> Result<Duration, ConfigError> {
        positive_duration("search.lighting_step", &self.lighting_step)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkyChartConfig {
    #[serde(default)]
    pub keepouts: Vec<Keepout>,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value that has a range, so later stages can trust them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let station = self.station.ground_station()?;
        if !(-90.0..90.0).contains(&station.min_elevation_deg) {
            return Err(ConfigError::invalid(
                "station.min_elevation_deg",
                "must be in [-90, 90)",
            ));
        }
        if self.raster.samples < 2 {
            return Err(ConfigError::invalid("raster.samples", "need at least 2"));
        }
        if self.footprint.ray_samples == 0 {
            return Err(ConfigError::invalid("footprint.ray_samples", "must be positive"));
        }
        self.search.step()?;
        self.search.window()?;
        self.search.lighting_step()?;

        for sat in &self.satellites {
            if let Some(sensor) = &sat.sensor {
                sensor.validate().map_err(|e| {
                    ConfigError::invalid(format!("satellites.{}.sensor", sat.id), e.to_string())
                })?;
            }
        }
        for follower in &self.followers {
            // Period only scales a distance; any positive value checks the shape
            follower.separation_s(1.0)?;
        }
        for keepout in &self.sky_chart.keepouts {
            if !(keepout.radius_deg > 0.0 && keepout.radius_deg <= 180.0) {
                return Err(ConfigError::invalid(
                    "sky_chart.keepouts.radius_deg",
                    format!("{} is outside (0, 180]", keepout.radius_deg),
                ));
            }
        }
        Ok(())
    }

    pub fn event_search(&self) -> Result<EventSearch, ConfigError> {
        Ok(EventSearch::new(
            self.search.step()?,
            self.station.min_elevation_deg,
        ))
    }

    /// Loads the TLE directory and adds the configured followers.
    pub fn load_satellites(&self) -> Result<SatelliteTable, ConfigError> {
        let mut table = SatelliteTable::new(self.event_search()?);
        table.load_dir(&self.tle_dir)?;
        for follower in &self.followers {
            let period = table.get(&follower.leader)?.element_set.period_s();
            let separation = follower.separation_s(period)?;
            table.add_follower(&follower.leader, &follower.name, separation)?;
        }
        Ok(table)
    }

    pub fn satellite(&self, id: &str) -> Option<&SatelliteConfig> {
        self.satellites.iter().find(|s| s.id == id)
    }
}

fn positive_duration(field: &str, text: &str) -> Result<Duration, ConfigError> {
    let d = parse_duration(text).map_err(|e| ConfigError::invalid(field, e))?;
    if d <= Duration::zero() {
        return Err(ConfigError::invalid(field, "must be positive"));
    }
    Ok(d)
}

pub fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim())
        .map_err(|e| e.to_string())
        .and_then(|d| Duration::from_std(d).map_err(|e| e.to_string()))
}

/// Parses `now`, `now+90m`, `now-1h`, an RFC3339 timestamp, or an RFC3339
/// timestamp with an offset such as `2024-05-01T10:00:00Z + 10m`.
pub fn parse_time(s: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, String> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("now") {
        let rest = rest.trim();
        if rest.is_empty() {
            return Ok(now);
        }
        return Ok(now + signed_duration(rest)?);
    }

    // Absolute with offset: 2026-01-12T10:00:00Z - 10s
    if let Some(idx) = s.rfind(['+', '-']) {
        if idx > 10 {
            if let Ok(base) = DateTime::parse_from_rfc3339(s[..idx].trim()) {
                return Ok(base.with_timezone(&Utc) + signed_duration(&s[idx..])?);
            }
        }
    }

    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}

fn signed_duration(s: &str) -> Result<Duration, String> {
    let (neg, rest) = match s.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let dur = parse_duration(rest)?;
    Ok(if neg { -dur } else { dur })
}
