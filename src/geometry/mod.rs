mod error;
mod frame;
mod spherical;
mod vector;

pub use error::GeometryError;
pub use frame::{axis_angle_matrix, build_orthonormal_frame, rotate_about_axis, Frame};
pub use spherical::{
    archav, great_circle_distance, hav, horizon_central_angle, limb_half_angle,
    sensor_ground_radius, LonLat, EARTH_RADIUS_KM,
};
pub use vector::{
    angle_offset_vector, cart_to_spherical, spherical_to_cart, SphericalPoint, Vector3,
};
