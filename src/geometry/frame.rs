use serde::Serialize;

use super::error::GeometryError;
use super::vector::Vector3;

/// Orthonormal right-handed basis stored as row vectors `{x̂, ŷ, ẑ}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frame {
    rows: [Vector3; 3],
}

impl Frame {
    pub fn x_hat(&self) -> Vector3 {
        self.rows[0]
    }

    pub fn y_hat(&self) -> Vector3 {
        self.rows[1]
    }

    pub fn z_hat(&self) -> Vector3 {
        self.rows[2]
    }

    pub fn rows(&self) -> [[f64; 3]; 3] {
        [
            self.rows[0].to_array(),
            self.rows[1].to_array(),
            self.rows[2].to_array(),
        ]
    }

    /// Re-express a parent-frame vector in this frame.
    pub fn apply(&self, v: Vector3) -> Vector3 {
        Vector3::new(self.rows[0].dot(v), self.rows[1].dot(v), self.rows[2].dot(v))
    }

    /// Inverse of [`Frame::apply`].
    pub fn unapply(&self, v: Vector3) -> Vector3 {
        self.rows[0] * v.x + self.rows[1] * v.y + self.rows[2] * v.z
    }

    pub fn is_orthonormal(&self, tol: f64) -> bool {
        let [x, y, z] = self.rows;
        let unit = |v: Vector3| (v.norm() - 1.0).abs() < tol;
        unit(x)
            && unit(y)
            && unit(z)
            && x.dot(y).abs() < tol
            && y.dot(z).abs() < tol
            && z.dot(x).abs() < tol
            && x.cross(y).distance(z) < tol
    }
}

/// Builds `{x̂, ŷ, ẑ}` from an x seed and a z seed.
///
/// The z seed is made orthogonal to x̂ before normalizing, so seeds only need
/// to be non-parallel.
pub fn build_orthonormal_frame(x_seed: Vector3, z_seed: Vector3) -> Result<Frame, GeometryError> {
    let x_hat = x_seed.unit().map_err(|_| GeometryError::DegenerateFrame)?;
    let z_perp = z_seed - x_hat * z_seed.dot(x_hat);
    if z_perp.norm() <= 1e-12 * z_seed.norm() {
        return Err(GeometryError::DegenerateFrame);
    }
    let z_hat = z_perp.unit().map_err(|_| GeometryError::DegenerateFrame)?;
    let y_hat = z_hat.cross(x_hat);
    Ok(Frame {
        rows: [x_hat, y_hat, z_hat],
    })
}

/// Rodrigues rotation matrix for a unit `axis` and an angle in radians.
pub fn axis_angle_matrix(axis: Vector3, angle: f64) -> [[f64; 3]; 3] {
    let Vector3 {
        x: ux,
        y: uy,
        z: uz,
    } = axis;
    let (st, ct) = angle.sin_cos();
    let omc = 1.0 - ct;
    [
        [ct + ux * ux * omc, ux * uy * omc - uz * st, ux * uz * omc + uy * st],
        [uy * ux * omc + uz * st, ct + uy * uy * omc, uy * uz * omc - ux * st],
        [uz * ux * omc - uy * st, uz * uy * omc + ux * st, ct + uz * uz * omc],
    ]
}

pub fn rotate_about_axis(v: Vector3, axis: Vector3, angle: f64) -> Vector3 {
    let m = axis_angle_matrix(axis, angle);
    Vector3::new(
        m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
        m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
        m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
    )
}
