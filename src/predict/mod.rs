mod bodies;
mod ephemeris;
mod error;
mod events;
mod ground_station;
mod pass_finder;
mod propagation;
mod tle_loader;
mod types;

pub use bodies::{
    illuminated_fraction, is_sunlit, julian_date, moon_phase_deg, moon_position, sun_position,
    BodyPosition, AU_KM, MOON_RADIUS_KM, SUN_RADIUS_KM,
};
pub use ephemeris::Ephemeris;
pub use error::PredictError;
pub use events::{EventSearch, DEFAULT_COARSE_STEP_SECONDS};
pub use ground_station::GroundStation;
pub use pass_finder::{access_windows, lighting, predict_passes};
pub use propagation::{
    ecef_to_enu, ecef_to_teme_position, gmst, look_angles, propagate_state,
    teme_to_ecef_position, teme_to_ecef_velocity, EARTH_ROTATION_RAD_S,
};
pub use tle_loader::{SatelliteEntry, SatelliteTable};
pub use types::{Lighting, LookAngles, Pass, SatelliteInfo, SatelliteWindows, StateVector};
