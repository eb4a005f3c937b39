mod projector;

pub use projector::{
    intersect_sphere, Footprint, FootprintProjector, SensorPointing, DEFAULT_RAY_SAMPLES,
};
