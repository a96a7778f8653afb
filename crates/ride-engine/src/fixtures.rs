//! Ride fixtures loaded at startup.
//!
//! ```json
//! [
//!   { "name": "Python", "coordinates": { "latitude": 51.6498, "longitude": 5.0437 },
//!     "cycle_duration_secs": 90 }
//! ]
//! ```

use std::path::Path;
use std::time::Duration;

use ride_types::{Coordinates, RideId};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::ride::RideDefinition;

/// One ride as written in the fixture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideFixture {
    /// Stable identifier; generated when absent.
    #[serde(default)]
    pub id: Option<Uuid>,

    pub name: String,

    pub coordinates: Coordinates,

    #[serde(default)]
    pub cycle_duration_secs: Option<u64>,
}

impl RideFixture {
    pub fn into_definition(self, default_cycle: Duration) -> RideDefinition {
        RideDefinition {
            id: self.id.map(RideId::from_uuid).unwrap_or_else(RideId::generate),
            name: self.name,
            location: self.coordinates,
            cycle_duration: self
                .cycle_duration_secs
                .map(Duration::from_secs)
                .unwrap_or(default_cycle),
        }
    }
}

/// Parse a JSON fixture list.
pub fn parse_fixtures(json: &str, default_cycle: Duration) -> EngineResult<Vec<RideDefinition>> {
    let fixtures: Vec<RideFixture> =
        serde_json::from_str(json).map_err(|e| EngineError::Fixture(e.to_string()))?;

    Ok(fixtures
        .into_iter()
        .map(|f| f.into_definition(default_cycle))
        .collect())
}

/// Read and parse a JSON fixture file.
pub fn load_fixtures(path: &Path, default_cycle: Duration) -> EngineResult<Vec<RideDefinition>> {
    debug!(path = %path.display(), "Loading ride fixtures");
    let json = std::fs::read_to_string(path)
        .map_err(|e| EngineError::Fixture(format!("{}: {}", path.display(), e)))?;
    parse_fixtures(&json, default_cycle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FIXTURES: &str = r#"[
        { "id": "6f1c1a52-98a4-4a0c-9f4a-7d1f0f3b1c11", "name": "Python",
          "coordinates": { "latitude": 51.6498, "longitude": 5.0437 }, "cycle_duration_secs": 90 },
        { "name": "Carnaval Festival",
          "coordinates": { "latitude": 51.6512, "longitude": 5.0481 } }
    ]"#;

    #[test]
    fn test_parse_fixtures() {
        let rides = parse_fixtures(FIXTURES, Duration::from_secs(120)).unwrap();
        assert_eq!(rides.len(), 2);

        assert_eq!(
            rides[0].id.as_uuid().to_string(),
            "6f1c1a52-98a4-4a0c-9f4a-7d1f0f3b1c11"
        );
        assert_eq!(rides[0].cycle_duration, Duration::from_secs(90));
        assert_eq!(rides[1].name, "Carnaval Festival");
        assert_eq!(rides[1].cycle_duration, Duration::from_secs(120));
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse_fixtures("{ not json", Duration::from_secs(60)),
            Err(EngineError::Fixture(_))
        ));
    }

    #[test]
    fn test_load_fixtures_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIXTURES.as_bytes()).unwrap();

        let rides = load_fixtures(file.path(), Duration::from_secs(60)).unwrap();
        assert_eq!(rides.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_fixtures(Path::new("/nonexistent/rides.json"), Duration::from_secs(60));
        assert!(matches!(result, Err(EngineError::Fixture(_))));
    }
}
