mod elements;
mod error;
mod plane;

pub use elements::{
    circular_semi_major_axis_km, circular_speed_km_s, distance_for_separation_time, follower,
    separation_time_for_distance, shift_mean_anomaly, tle_checksum, with_valid_checksum,
    ElementSet, MEAN_ANOMALY_COLUMNS, MEAN_MOTION_COLUMNS, MU_EARTH_KM3_S2, SECONDS_PER_DAY,
    TLE_LINE_WIDTH,
};
pub use error::ElementSetError;
pub use plane::{beta_angle, build_orbital_frame, in_plane_sun_angle, project_onto_orbital_plane};
