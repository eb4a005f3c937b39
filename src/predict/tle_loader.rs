use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use crate::orbital::{follower, with_valid_checksum, ElementSet};
use crate::predict::error::PredictError;
use crate::predict::events::EventSearch;
use crate::predict::propagation::propagate_state;
use crate::predict::types::{SatelliteInfo, StateVector};

pub struct SatelliteEntry {
    pub info: SatelliteInfo,
    pub element_set: ElementSet,
    pub elements: Elements,
    pub constants: Constants,
}

impl SatelliteEntry {
    /// SGP4 receives a copy of the lines with the checksums recomputed, so
    /// synthesized follower sets propagate like real ones.
    pub fn new(element_set: ElementSet, source: &str) -> Result<Self, PredictError> {
        let invalid = |message: String| PredictError::InvalidTle {
            file: source.to_string(),
            message,
        };
        let line1 = with_valid_checksum(element_set.line1());
        let line2 = with_valid_checksum(element_set.line2());
        let elements = Elements::from_tle(
            element_set.name().map(str::to_string),
            line1.as_bytes(),
            line2.as_bytes(),
        )
        .map_err(|e| invalid(e.to_string()))?;
        let constants = Constants::from_elements(&elements).map_err(|e| invalid(e.to_string()))?;

        let name = element_set
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("NORAD {}", elements.norad_id));

        Ok(Self {
            info: SatelliteInfo {
                name,
                norad_id: elements.norad_id as u32,
                tle_source: source.to_string(),
            },
            element_set,
            elements,
            constants,
        })
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn state_at(&self, timestamp: DateTime<Utc>) -> Result<StateVector, PredictError> {
        propagate_state(&self.elements, &self.constants, timestamp)
    }
}

/// Satellites keyed by name.
pub struct SatelliteTable {
    satellites: BTreeMap<String, SatelliteEntry>,
    search: EventSearch,
}

impl Default for SatelliteTable {
    fn default() -> Self {
        Self::new(EventSearch::default())
    }
}

impl SatelliteTable {
    pub fn new(search: EventSearch) -> Self {
        Self {
            satellites: BTreeMap::new(),
            search,
        }
    }

    pub fn search(&self) -> EventSearch {
        self.search
    }

    /// Load all `.tle` and `.txt` files in `dir`. Files that fail to parse
    /// are skipped with a warning.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, PredictError> {
        if !dir.exists() {
            return Err(PredictError::DirectoryNotFound(dir.display().to_string()));
        }

        let mut loaded = 0;
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_tle = path
                .extension()
                .is_some_and(|ext| ext == "tle" || ext == "txt");
            if path.is_file() && is_tle {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            match self.load_file(&path) {
                Ok(count) => loaded += count,
                Err(e) => {
                    log::warn!("Failed to parse TLE file {}: {}", path.display(), e);
                }
            }
        }

        log::info!("Loaded {} satellites from {}", loaded, dir.display());
        Ok(loaded)
    }

    /// Parse a single TLE file (may contain multiple satellites)
    pub fn load_file(&mut self, path: &Path) -> Result<usize, PredictError> {
        let content = fs::read_to_string(path)?;
        let filename = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        self.load_text(&content, &filename)
    }

    pub fn load_text(&mut self, content: &str, source: &str) -> Result<usize, PredictError> {
        let mut entries = Vec::new();
        for (name, line1, line2) in parse_multi_tle(content) {
            let element_set = ElementSet::new(name, line1, line2)?;
            entries.push(SatelliteEntry::new(element_set, source)?);
        }

        let count = entries.len();
        for entry in entries {
            if self.satellites.contains_key(entry.name()) {
                log::warn!("Replacing satellite {} from {}", entry.name(), source);
            }
            self.satellites.insert(entry.name().to_string(), entry);
        }
        Ok(count)
    }

    pub fn insert(&mut self, entry: SatelliteEntry) -> Result<(), PredictError> {
        if self.satellites.contains_key(entry.name()) {
            return Err(PredictError::DuplicateSatellite(entry.name().to_string()));
        }
        self.satellites.insert(entry.name().to_string(), entry);
        Ok(())
    }

    /// Adds a virtual satellite trailing `leader` by `separation_s` seconds.
    pub fn add_follower(
        &mut self,
        leader: &str,
        name: &str,
        separation_s: f64,
    ) -> Result<&SatelliteEntry, PredictError> {
        let leader = self.get(leader)?;
        let element_set = follower(&leader.element_set, name, separation_s)?;
        let entry = SatelliteEntry::new(element_set, &format!("follower of {}", leader.name()))?;
        log::debug!(
            "Follower {} trails {} by {:.1} s",
            name,
            leader.name(),
            separation_s
        );
        self.insert(entry)?;
        self.get(name)
    }

    /// Look up by name, then by NORAD id.
    pub fn get(&self, id: &str) -> Result<&SatelliteEntry, PredictError> {
        if let Some(entry) = self.satellites.get(id) {
            return Ok(entry);
        }
        id.trim()
            .parse::<u32>()
            .ok()
            .and_then(|norad| {
                self.satellites
                    .values()
                    .find(|entry| entry.info.norad_id == norad)
            })
            .ok_or_else(|| PredictError::UnknownSatellite(id.to_string()))
    }

    pub fn names(&self) -> Vec<String> {
        self.satellites.keys().cloned().collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &SatelliteEntry> {
        self.satellites.values()
    }

    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }
}

/// Parse multi-satellite TLE content
fn parse_multi_tle(content: &str) -> Vec<(Option<String>, String, String)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            // 2-line TLE (no name)
            result.push((None, lines[i].to_string(), lines[i + 1].to_string()));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            // 3-line TLE (with name)
            result.push((
                Some(lines[i].trim_start_matches("0 ").to_string()),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
            i += 3;
        } else {
            log::debug!("Skipping unrecognised TLE line: {}", lines[i]);
            i += 1;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::propagation::gmst;
    use crate::test_support::{iss_epoch, iss_table, ISS, ISS_NAME};

    #[test]
    fn test_parse_multi_tle() {
        let two_line = ISS.lines().skip(1).collect::<Vec<_>>().join("\n");
        let content = format!("{}\n\n{}\ntrailing junk\n", two_line, ISS);
        let parsed = parse_multi_tle(&content);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].0, None);
        assert_eq!(parsed[1].0.as_deref(), Some(ISS_NAME));
    }

    #[test]
    fn test_lookup_by_name_and_norad() {
        let table = iss_table();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(ISS_NAME).unwrap().info.norad_id, 25544);
        assert_eq!(table.get("25544").unwrap().name(), ISS_NAME);
        assert!(matches!(
            table.get("HUBBLE"),
            Err(PredictError::UnknownSatellite(_))
        ));
    }

    #[test]
    fn test_unnamed_entry_gets_norad_name() {
        let mut table = SatelliteTable::default();
        let two_line = ISS.lines().skip(1).collect::<Vec<_>>().join("\n");
        table.load_text(&two_line, "test").unwrap();
        assert!(table.get("NORAD 25544").is_ok());
    }

    #[test]
    fn test_state_at_epoch_is_in_low_orbit() {
        let table = iss_table();
        let entry = table.get(ISS_NAME).unwrap();
        let epoch = iss_epoch();
        let state = entry.state_at(epoch).unwrap();
        let r = state.position_teme.norm();
        assert!((6600.0..6900.0).contains(&r), "radius {}", r);
        let v = state.velocity_teme.norm();
        assert!((7.4..7.9).contains(&v), "speed {}", v);
        assert!((state.position_ecef.norm() - r).abs() < 1e-6);
        assert!(gmst(epoch).is_finite());
    }

    #[test]
    fn test_follower_trails_leader() {
        let mut table = iss_table();
        let period = table.get(ISS_NAME).unwrap().element_set.period_s();
        table.add_follower(ISS_NAME, "CHASER", 300.0).unwrap();

        let epoch = iss_epoch();
        let chaser = table.get("CHASER").unwrap().state_at(epoch).unwrap();
        let leader_earlier = table
            .get(ISS_NAME)
            .unwrap()
            .state_at(epoch - chrono::Duration::seconds(300))
            .unwrap();
        // Same orbit, same place 300 s later: km level agreement
        let gap = chaser.position_teme.distance(leader_earlier.position_teme);
        assert!(gap < 30.0, "gap {} km over period {}", gap, period);

        assert!(matches!(
            table.add_follower(ISS_NAME, "CHASER", 600.0),
            Err(PredictError::DuplicateSatellite(_))
        ));
        assert!(table.add_follower("NOPE", "X", 1.0).is_err());
    }

    #[test]
    fn test_load_dir_missing() {
        let mut table = SatelliteTable::default();
        assert!(matches!(
            table.load_dir(Path::new("/definitely/not/here")),
            Err(PredictError::DirectoryNotFound(_))
        ));
    }
}
