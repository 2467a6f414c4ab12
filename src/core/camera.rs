use glam::{DMat4, DVec3};

use crate::math::{LookAt, RenderArea};
use crate::traits::CameraController;

/// How the camera's view transform is stored
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewMatrix {
    /// Editable eye/center/up frame
    LookAt(LookAt),
    /// Opaque world -> eye matrix with no look-at form
    Matrix(DMat4),
}

impl ViewMatrix {
    pub fn matrix(&self) -> DMat4 {
        match self {
            ViewMatrix::LookAt(look_at) => look_at.view_matrix(),
            ViewMatrix::Matrix(matrix) => *matrix,
        }
    }
}

/// Perspective projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perspective {
    /// Vertical field of view in radians
    pub fov_y: f64,
    pub near: f64,
    pub far: f64,
}

impl Perspective {
    pub fn new(fov_y: f64, near: f64, far: f64) -> Self {
        Self { fov_y, near, far }
    }

    pub fn matrix(&self, aspect_ratio: f64) -> DMat4 {
        DMat4::perspective_rh(self.fov_y, aspect_ratio.max(f64::EPSILON), self.near, self.far)
    }
}

impl Default for Perspective {
    fn default() -> Self {
        Self::new(30f64.to_radians(), 1.0, 1.0e8)
    }
}

/// Camera with a view transform, projection and the viewport it renders into
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub view: ViewMatrix,
    pub projection: Perspective,
    pub render_area: RenderArea,
}

impl Camera {
    pub fn new(view: ViewMatrix, projection: Perspective, render_area: RenderArea) -> Self {
        Self {
            view,
            projection,
            render_area,
        }
    }

    pub fn from_look_at(look_at: LookAt, render_area: RenderArea) -> Self {
        Self::new(ViewMatrix::LookAt(look_at), Perspective::default(), render_area)
    }

    /// Look-at capability; `None` when the view is an opaque matrix
    pub fn look_at(&self) -> Option<&LookAt> {
        match &self.view {
            ViewMatrix::LookAt(look_at) => Some(look_at),
            ViewMatrix::Matrix(_) => None,
        }
    }

    pub fn look_at_mut(&mut self) -> Option<&mut LookAt> {
        match &mut self.view {
            ViewMatrix::LookAt(look_at) => Some(look_at),
            ViewMatrix::Matrix(_) => None,
        }
    }

    /// Look-at frame, replacing an opaque matrix view with a default look-at first
    pub fn look_at_or_insert_default(&mut self) -> &mut LookAt {
        if let ViewMatrix::Matrix(_) = self.view {
            self.view = ViewMatrix::LookAt(LookAt::default());
        }
        match &mut self.view {
            ViewMatrix::LookAt(look_at) => look_at,
            ViewMatrix::Matrix(_) => unreachable!("matrix view replaced above"),
        }
    }

    pub fn render_area(&self) -> RenderArea {
        self.render_area
    }

    pub fn set_render_area(&mut self, render_area: RenderArea) {
        self.render_area = render_area;
    }

    pub fn projection_matrix(&self) -> DMat4 {
        self.projection.matrix(self.render_area.aspect_ratio())
    }
}

impl CameraController for Camera {
    fn view_matrix(&self) -> DMat4 {
        self.view.matrix()
    }

    fn position(&self) -> DVec3 {
        self.view.matrix().inverse().transform_point3(DVec3::ZERO)
    }

    fn forward(&self) -> DVec3 {
        self.view
            .matrix()
            .inverse()
            .transform_vector3(DVec3::NEG_Z)
            .normalize()
    }
}
