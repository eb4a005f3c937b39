use chrono::{DateTime, Utc};

use crate::predict::{GroundStation, SatelliteTable};

pub(crate) const ISS: &str = "ISS (ZARYA)
1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927
2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

pub(crate) const ISS_NAME: &str = "ISS (ZARYA)";

/// Epoch of the ISS element set above
pub(crate) fn iss_epoch() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2008-09-20T12:25:40Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub(crate) fn iss_table() -> SatelliteTable {
    let mut table = SatelliteTable::default();
    table.load_text(ISS, "test").unwrap();
    table
}

pub(crate) fn munich() -> GroundStation {
    GroundStation::from_coordinates("48.15, 11.57", Some(520.0)).unwrap()
}
