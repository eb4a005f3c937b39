use serde::Serialize;

use crate::context::SimulationContext;
use crate::geometry::{Frame, Vector3};
use crate::orbital::{beta_angle, build_orbital_frame, in_plane_sun_angle, project_onto_orbital_plane};
use crate::predict::{is_sunlit, sun_position, Ephemeris, PredictError};

/// Sun geometry relative to one orbit plane. Vectors are inertial unit
/// vectors.
#[derive(Debug, Clone, Serialize)]
pub struct BetaView {
    pub satellite: String,
    pub frame: Frame,
    pub sun_direction: Vector3,
    pub projected_sun: Vector3,
    pub beta_deg: f64,
    /// Sun projection measured from the satellite direction along the orbit
    pub in_plane_sun_deg: f64,
    pub sunlit: bool,
}

pub fn compute_beta(ctx: &SimulationContext, id: &str) -> Result<BetaView, PredictError> {
    let now = ctx.current_time;
    let state = ctx.satellites.state_vector(id, now)?;
    let frame = build_orbital_frame(state.position_teme, state.velocity_teme)?;
    let sun = sun_position(now).position;
    let sun_direction = sun.unit()?;
    let h = frame.z_hat();

    Ok(BetaView {
        satellite: id.to_string(),
        frame,
        sun_direction,
        projected_sun: project_onto_orbital_plane(sun_direction, h),
        beta_deg: beta_angle(sun_direction, h).to_degrees(),
        in_plane_sun_deg: in_plane_sun_angle(sun_direction, &frame).to_degrees(),
        sunlit: is_sunlit(state.position_teme, sun),
    })
}
