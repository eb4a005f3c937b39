use crate::geometry::{build_orthonormal_frame, Frame, GeometryError, Vector3};

/// Frame aligned with a body's orbit: x̂ toward the body, ẑ along the
/// angular momentum, ŷ completing the right-handed set.
pub fn build_orbital_frame(position: Vector3, velocity: Vector3) -> Result<Frame, GeometryError> {
    build_orthonormal_frame(position, position.cross(velocity))
}

/// Component of the unit `sun` direction lying in the plane normal to the
/// unit angular momentum `h`.
pub fn project_onto_orbital_plane(sun: Vector3, h: Vector3) -> Vector3 {
    sun - h * sun.dot(h)
}

/// Angle between the orbital plane and the sun direction, radians.
pub fn beta_angle(sun: Vector3, h: Vector3) -> f64 {
    sun.dot(h)
        .atan2(project_onto_orbital_plane(sun, h).norm())
}

/// Angle of the in-plane sun projection measured from x̂ toward ŷ, radians.
pub fn in_plane_sun_angle(sun: Vector3, frame: &Frame) -> f64 {
    let projected = frame.apply(project_onto_orbital_plane(sun, frame.z_hat()));
    projected.y.atan2(projected.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn leo() -> Frame {
        // Circular equatorial orbit, satellite on +x moving toward +y
        build_orbital_frame(Vector3::new(7000.0, 0.0, 0.0), Vector3::new(0.0, 7.5, 0.0)).unwrap()
    }

    #[test]
    fn test_orbital_frame_axes() {
        let frame = leo();
        assert!(frame.x_hat().distance(Vector3::new(1.0, 0.0, 0.0)) < 1e-12);
        assert!(frame.y_hat().distance(Vector3::new(0.0, 1.0, 0.0)) < 1e-12);
        assert!(frame.z_hat().distance(Vector3::new(0.0, 0.0, 1.0)) < 1e-12);
    }

    #[test]
    fn test_radial_velocity_is_degenerate() {
        let err = build_orbital_frame(Vector3::new(7000.0, 0.0, 0.0), Vector3::new(3.0, 0.0, 0.0));
        assert_eq!(err, Err(GeometryError::DegenerateFrame));
    }

    #[test]
    fn test_projection_removes_normal_component() {
        let h = Vector3::new(0.0, 0.0, 1.0);
        let sun = Vector3::new(1.0, 1.0, 1.0).unit().unwrap();
        let p = project_onto_orbital_plane(sun, h);
        assert!(p.dot(h).abs() < 1e-12);
        assert!((p.x - sun.x).abs() < 1e-12);
    }

    #[test]
    fn test_beta_angle_extremes() {
        let h = leo().z_hat();
        assert!(beta_angle(Vector3::new(0.0, 1.0, 0.0), h).abs() < 1e-12);
        assert!((beta_angle(h, h) - FRAC_PI_2).abs() < 1e-12);
        assert!((beta_angle(-h, h) + FRAC_PI_2).abs() < 1e-12);

        // Off-axis unit normal whose self dot product rounds below one
        let tilted = Vector3::new(1.0, 2.0, 3.0).unit().unwrap();
        assert!((beta_angle(tilted, tilted) - FRAC_PI_2).abs() < 1e-12);
        assert!((beta_angle(-tilted, tilted) + FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_in_plane_angle() {
        let frame = leo();
        let sun = Vector3::new(0.0, 1.0, 1.0).unit().unwrap();
        assert!((in_plane_sun_angle(sun, &frame) - FRAC_PI_2).abs() < 1e-12);
        let behind = Vector3::new(-1.0, 0.0, 0.2).unit().unwrap();
        assert!((in_plane_sun_angle(behind, &frame).abs() - std::f64::consts::PI).abs() < 1e-12);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn component() -> impl Strategy<Value = f64> {
            -5.0e4..5.0e4_f64
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(1000))]

            #[test]
            fn test_orbital_frame_orthonormal(
                rx in component(), ry in component(), rz in component(),
                vx in -10.0..10.0_f64, vy in -10.0..10.0_f64, vz in -10.0..10.0_f64,
            ) {
                let r = Vector3::new(rx, ry, rz);
                let v = Vector3::new(vx, vy, vz);
                // Keep away from radial or zero motion
                prop_assume!(r.norm() > 1.0 && v.norm() > 1e-3);
                prop_assume!(r.cross(v).norm() > 1e-6 * r.norm() * v.norm());

                let frame = build_orbital_frame(r, v)?;
                let [x, y, z] = [frame.x_hat(), frame.y_hat(), frame.z_hat()];
                for (a, b) in [(x, y), (y, z), (z, x)] {
                    prop_assert!(a.dot(b).abs() < 1e-9, "dot {}", a.dot(b));
                }
                for axis in [x, y, z] {
                    prop_assert!((axis.norm() - 1.0).abs() < 1e-9);
                }
                prop_assert!(x.cross(y).distance(z) < 1e-9);
            }
        }
    }
}
