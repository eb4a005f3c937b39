//! Display adapters. Each one reads a [`SimulationContext`] and returns a
//! serializable result for the front end to draw; none of them hold state.
//!
//! [`SimulationContext`]: crate::context::SimulationContext

mod beta;
mod ground_map;
mod polar;
mod sky_chart;

pub use beta::{compute_beta, BetaView};
pub use ground_map::{GroundMap, GroundMapLayer, MapRequest, SensorView, DEFAULT_TRACK_SAMPLES};
pub use polar::{polar_plot_coords, xy_to_altaz, PolarPlot, PolarTrack};
pub use sky_chart::{Body, Keepout, KeepoutCenter, SkyChart, SkyChartView, SkyPosition};
