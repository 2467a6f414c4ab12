use glam::{DMat4, DVec3};

/// Look-at camera frame: eye position, target point and up direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAt {
    pub eye: DVec3,
    pub center: DVec3,
    pub up: DVec3,
}

impl LookAt {
    pub fn new(eye: DVec3, center: DVec3, up: DVec3) -> Self {
        Self { eye, center, up }
    }

    /// Right-handed view matrix (world -> eye space)
    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_at_rh(self.eye, self.center, self.up)
    }

    pub fn look_vector(&self) -> DVec3 {
        self.center - self.eye
    }

    pub fn distance(&self) -> f64 {
        self.look_vector().length()
    }

    /// Apply an affine transform to the whole frame, renormalizing `up`
    pub fn transform(&mut self, matrix: &DMat4) {
        let eye = matrix.transform_point3(self.eye);
        self.up = (matrix.transform_point3(self.eye + self.up) - eye).normalize();
        self.center = matrix.transform_point3(self.center);
        self.eye = eye;
    }
}

impl Default for LookAt {
    fn default() -> Self {
        Self {
            eye: DVec3::ZERO,
            center: DVec3::NEG_Y,
            up: DVec3::Z,
        }
    }
}
