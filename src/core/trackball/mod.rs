//! Globe trackball camera controller.
//!
//! Pointer drags pick a motion mode (rotate, pan or zoom) and record a per-frame delta.
//! Every frame event then applies that delta, scaled by elapsed time, to the camera's
//! look-at frame, which is kept pinned to the surface of an ellipsoidal globe.

pub mod clamp;
pub mod coords;
pub mod motion;

use std::sync::Arc;
use std::time::Instant;

use glam::{DMat4, DVec2, DVec3};
use log::{debug, trace, warn};

use crate::config::TrackballSettings;
use crate::core::camera::{Camera, ViewMatrix};
use crate::core::events::{
    ButtonMask, ButtonPressEvent, ButtonReleaseEvent, FrameEvent, KeyPressEvent, MoveEvent,
    ScrollWheelEvent,
};
use crate::math::{EllipsoidModel, LookAt, RenderArea};
use crate::traits::{CameraController, InputHandler};

pub use clamp::clamp_to_globe;
pub use coords::{ndc, trackball_coordinate, PointerSample};

/// Which motion a held button drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    #[default]
    Inactive,
    Rotate,
    Pan,
    Zoom,
}

impl UpdateMode {
    /// Primary wins over secondary, which wins over tertiary
    pub fn from_mask(mask: ButtonMask) -> Self {
        if mask.contains(ButtonMask::PRIMARY) {
            UpdateMode::Rotate
        } else if mask.contains(ButtonMask::SECONDARY) {
            UpdateMode::Pan
        } else if mask.contains(ButtonMask::TERTIARY) {
            UpdateMode::Zoom
        } else {
            UpdateMode::Inactive
        }
    }
}

/// Motion recorded by the last pointer move, expressed per 1/60 s.
///
/// Frame events do NOT consume this: the same delta is applied again on every frame until
/// a button press/release or a new pointer move replaces it. Holding a button still after
/// dragging therefore keeps the camera coasting at the last drag speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingMotion {
    pub rotate_angle: f64,
    pub rotate_axis: DVec3,
    pub pan: DVec2,
    pub zoom_rate: f64,
}

impl PendingMotion {
    pub fn clear(&mut self) {
        self.rotate_angle = 0.0;
        self.pan = DVec2::ZERO;
        self.zoom_rate = 0.0;
    }
}

impl Default for PendingMotion {
    fn default() -> Self {
        Self {
            rotate_angle: 0.0,
            rotate_axis: DVec3::X,
            pan: DVec2::ZERO,
            zoom_rate: 0.0,
        }
    }
}

/// Camera controller that orbits, pans and zooms around an ellipsoidal globe
pub struct GlobeTrackball {
    camera: Camera,
    ellipsoid: Option<Arc<dyn EllipsoidModel>>,
    settings: TrackballSettings,
    home: LookAt,
    mode: UpdateMode,
    pending: PendingMotion,
    previous: PointerSample,
    has_focus: bool,
    last_pointer_within_render_area: bool,
    previous_frame_time: Option<Instant>,
}

impl GlobeTrackball {
    /// Take control of `camera`. Passing `None` for the ellipsoid gives flat panning and no clamping.
    ///
    /// A camera whose view is a plain matrix has no look-at frame to drive; it is replaced by
    /// a default look-at.
    pub fn new(
        camera: Camera,
        ellipsoid: Option<Arc<dyn EllipsoidModel>>,
        settings: TrackballSettings,
    ) -> Self {
        let mut trackball = Self {
            camera,
            ellipsoid,
            settings,
            home: LookAt::default(),
            mode: UpdateMode::Inactive,
            pending: PendingMotion::default(),
            previous: PointerSample::default(),
            has_focus: false,
            last_pointer_within_render_area: false,
            previous_frame_time: None,
        };

        trackball.look_at_mut();
        trackball.clamp_to_globe();
        trackball.home = trackball.look_at();
        debug!("trackball home {:?}", trackball.home);
        trackball
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn settings(&self) -> &TrackballSettings {
        &self.settings
    }

    pub fn ellipsoid(&self) -> Option<&dyn EllipsoidModel> {
        self.ellipsoid.as_deref()
    }

    pub fn mode(&self) -> UpdateMode {
        self.mode
    }

    pub fn pending(&self) -> &PendingMotion {
        &self.pending
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn home_look_at(&self) -> LookAt {
        self.home
    }

    pub fn set_home(&mut self, look_at: LookAt) {
        self.home = look_at;
    }

    pub fn render_area(&self) -> RenderArea {
        self.camera.render_area()
    }

    /// Current look-at frame; the default frame if the camera was given a plain matrix view
    pub fn look_at(&self) -> LookAt {
        self.camera.look_at().copied().unwrap_or_else(fallback_look_at)
    }

    fn look_at_mut(&mut self) -> &mut LookAt {
        if self.camera.look_at().is_none() {
            self.camera.view = ViewMatrix::LookAt(fallback_look_at());
        }
        self.camera.look_at_or_insert_default()
    }

    /// Restore the pose captured at construction (or via `set_home`)
    pub fn home(&mut self) {
        let home = self.home;
        *self.look_at_mut() = home;
    }

    /// Replace the whole frame, e.g. to fly to a location
    pub fn set_look_at(&mut self, look_at: LookAt) {
        *self.look_at_mut() = look_at;
        self.clamp_to_globe();
    }

    /// Re-pin the center to the globe surface and enforce the minimum eye altitude
    pub fn clamp_to_globe(&mut self) {
        let Some(ellipsoid) = self.ellipsoid.clone() else {
            return;
        };
        let minimum_altitude = self.settings.minimum_altitude;
        clamp::clamp_to_globe(self.look_at_mut(), ellipsoid.as_ref(), minimum_altitude);
    }

    /// Orbit about the look-at center; `axis` is in eye space
    pub fn rotate(&mut self, angle: f64, axis: DVec3) {
        motion::rotate(self.look_at_mut(), angle, axis);
        self.clamp_to_globe();
    }

    /// Move the eye `ratio` of the way towards the center
    pub fn zoom(&mut self, ratio: f64) {
        motion::zoom(self.look_at_mut(), ratio);
        self.clamp_to_globe();
    }

    /// Pan by an NDC delta; across the globe when an ellipsoid is set, otherwise in the view plane
    pub fn pan(&mut self, delta: DVec2) {
        let pan_scale = self.settings.pan_scale;
        match self.ellipsoid.as_ref().map(|e| e.radius_equator()) {
            Some(radius_equator) => {
                if motion::pan_globe(self.look_at_mut(), delta, pan_scale, radius_equator) {
                    self.clamp_to_globe();
                }
            }
            None => motion::pan_flat(self.look_at_mut(), delta, pan_scale),
        }
    }

    fn within_render_area(&self, x: i32, y: i32) -> bool {
        self.camera.render_area().contains(x, y)
    }

    fn sample(&self, x: i32, y: i32) -> PointerSample {
        PointerSample::at(x, y, self.camera.render_area())
    }

    fn integrate(&mut self, dt: f64) {
        let scale = dt * self.settings.frame_rate_normalization;
        match self.mode {
            UpdateMode::Zoom if self.pending.zoom_rate != 0.0 => {
                self.zoom(self.pending.zoom_rate * scale);
            }
            UpdateMode::Pan if self.pending.pan != DVec2::ZERO => {
                self.pan(self.pending.pan * scale);
            }
            UpdateMode::Rotate if self.pending.rotate_angle != 0.0 => {
                self.rotate(self.pending.rotate_angle * scale, self.pending.rotate_axis);
            }
            _ => {}
        }
    }
}

fn fallback_look_at() -> LookAt {
    warn!("camera view is not a look-at frame, substituting a default look-at");
    LookAt::default()
}

impl InputHandler for GlobeTrackball {
    fn button_press(&mut self, event: &mut ButtonPressEvent) {
        let pointer = &mut event.pointer;
        self.previous = self.sample(pointer.x, pointer.y);

        if pointer.handled {
            return;
        }

        self.has_focus = self.within_render_area(pointer.x, pointer.y);
        self.last_pointer_within_render_area = self.has_focus;
        self.mode = UpdateMode::from_mask(pointer.mask);

        if self.has_focus {
            pointer.handled = true;
        }

        self.pending.clear();
        trace!("button press {:?} -> {:?}, focus {}", pointer.mask, self.mode, self.has_focus);
    }

    fn button_release(&mut self, event: &mut ButtonReleaseEvent) {
        let pointer = &event.pointer;
        self.previous = self.sample(pointer.x, pointer.y);

        self.last_pointer_within_render_area = self.within_render_area(pointer.x, pointer.y);
        self.has_focus = false;
        self.mode = UpdateMode::Inactive;
        self.pending.clear();
    }

    fn pointer_move(&mut self, event: &mut MoveEvent) {
        let pointer = &mut event.pointer;
        self.last_pointer_within_render_area = self.within_render_area(pointer.x, pointer.y);

        if pointer.handled || !self.has_focus {
            return;
        }

        let current = self.sample(pointer.x, pointer.y);

        if pointer.mask.contains(ButtonMask::PRIMARY) {
            pointer.handled = true;

            let xp = current.tbc.normalize().cross(self.previous.tbc.normalize());
            let xp_len = xp.length();
            if xp_len > 0.0 {
                self.pending.rotate_angle = xp_len.min(1.0).asin();
                self.pending.rotate_axis = xp / xp_len;
            } else {
                self.pending.rotate_angle = 0.0;
            }
        } else if pointer.mask.contains(ButtonMask::SECONDARY) {
            pointer.handled = true;

            self.pending.pan = current.ndc - self.previous.ndc;
        } else if pointer.mask.contains(ButtonMask::TERTIARY) {
            pointer.handled = true;

            let delta = current.ndc - self.previous.ndc;
            if delta.y != 0.0 {
                self.pending.zoom_rate = self.settings.drag_zoom_scale * delta.y;
            }
        }

        self.previous = current;
    }

    fn scroll_wheel(&mut self, event: &mut ScrollWheelEvent) {
        if event.handled {
            return;
        }

        event.handled = true;
        self.zoom(event.delta.y * self.settings.scroll_zoom_scale);
    }

    fn key_press(&mut self, event: &mut KeyPressEvent) {
        if event.handled || !self.last_pointer_within_render_area {
            return;
        }

        if event.key == self.settings.home_key {
            event.handled = true;
            debug!("home key pressed, resetting camera");
            self.home();
        }
    }

    fn frame(&mut self, event: &mut FrameEvent) {
        if let Some(previous) = self.previous_frame_time {
            let dt = event.time.saturating_duration_since(previous).as_secs_f64();
            self.integrate(dt);
        }

        self.previous_frame_time = Some(event.time);
    }
}

impl CameraController for GlobeTrackball {
    fn view_matrix(&self) -> DMat4 {
        self.camera.view_matrix()
    }

    fn position(&self) -> DVec3 {
        self.look_at().eye
    }

    fn forward(&self) -> DVec3 {
        self.look_at().look_vector().normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Ellipsoid;
    use std::time::Duration;

    fn flat_trackball() -> GlobeTrackball {
        let camera = Camera::from_look_at(
            LookAt::new(DVec3::new(0.0, 0.0, 10.0), DVec3::ZERO, DVec3::Y),
            RenderArea::from_size(800, 600),
        );
        GlobeTrackball::new(camera, None, TrackballSettings::default())
    }

    #[test]
    fn test_mode_priority() {
        assert_eq!(UpdateMode::from_mask(ButtonMask::PRIMARY | ButtonMask::SECONDARY), UpdateMode::Rotate);
        assert_eq!(UpdateMode::from_mask(ButtonMask::SECONDARY | ButtonMask::TERTIARY), UpdateMode::Pan);
        assert_eq!(UpdateMode::from_mask(ButtonMask::TERTIARY), UpdateMode::Zoom);
        assert_eq!(UpdateMode::from_mask(ButtonMask::NONE), UpdateMode::Inactive);
    }

    #[test]
    fn test_matrix_camera_gets_default_look_at() {
        let camera = Camera::new(
            ViewMatrix::Matrix(DMat4::IDENTITY),
            Default::default(),
            RenderArea::from_size(100, 100),
        );
        let trackball = GlobeTrackball::new(camera, None, TrackballSettings::default());
        assert_eq!(trackball.camera().look_at(), Some(&LookAt::default()));
    }

    #[test]
    fn test_matrix_view_set_later_is_replaced_on_next_motion() {
        let mut trackball = flat_trackball();
        trackball.camera_mut().view = ViewMatrix::Matrix(DMat4::IDENTITY);

        assert_eq!(trackball.look_at(), LookAt::default());
        assert_eq!(trackball.camera().look_at(), None);

        trackball.zoom(0.5);
        let mut expected = LookAt::default();
        motion::zoom(&mut expected, 0.5);
        assert_eq!(trackball.camera().look_at(), Some(&expected));
        assert_eq!(trackball.look_at(), expected);
    }

    #[test]
    fn test_handled_press_keeps_mode() {
        let mut trackball = flat_trackball();
        let mut press = ButtonPressEvent::new(400, 300, ButtonMask::PRIMARY, 1);
        press.pointer.handled = true;
        trackball.button_press(&mut press);
        assert_eq!(trackball.mode(), UpdateMode::Inactive);
        assert!(!trackball.has_focus());
    }

    #[test]
    fn test_release_never_marks_handled() {
        let mut trackball = flat_trackball();
        trackball.button_press(&mut ButtonPressEvent::new(400, 300, ButtonMask::PRIMARY, 1));
        let mut release = ButtonReleaseEvent::new(400, 300, ButtonMask::NONE, 1);
        trackball.button_release(&mut release);
        assert!(!release.pointer.handled);
        assert_eq!(trackball.mode(), UpdateMode::Inactive);
        assert!(!trackball.has_focus());
    }

    #[test]
    fn test_first_frame_only_seeds_time() {
        let mut trackball = flat_trackball();
        trackball.button_press(&mut ButtonPressEvent::new(400, 300, ButtonMask::SECONDARY, 2));
        trackball.pointer_move(&mut MoveEvent::new(440, 300, ButtonMask::SECONDARY));
        let before = trackball.look_at();

        trackball.frame(&mut FrameEvent::new(0, Instant::now()));
        assert_eq!(trackball.look_at(), before);
    }

    #[test]
    fn test_globe_construction_clamps() {
        let wgs84 = Arc::new(Ellipsoid::wgs84());
        let camera = Camera::from_look_at(
            LookAt::new(DVec3::new(0.0, 0.0, 10.0), DVec3::ZERO, DVec3::Y),
            RenderArea::from_size(800, 600),
        );
        let trackball = GlobeTrackball::new(camera, Some(wgs84.clone()), TrackballSettings::default());
        let look_at = trackball.look_at();
        assert!(wgs84.to_geodetic(look_at.center).altitude.abs() < 1e-6);
        assert!(wgs84.to_geodetic(look_at.eye).altitude >= 1.0 - 1e-6);
        assert_eq!(trackball.home_look_at(), look_at);
    }

    #[test]
    fn test_negative_time_step_is_ignored() {
        let mut trackball = flat_trackball();
        trackball.button_press(&mut ButtonPressEvent::new(400, 300, ButtonMask::TERTIARY, 3));
        trackball.pointer_move(&mut MoveEvent::new(400, 330, ButtonMask::TERTIARY));
        let t0 = Instant::now() + Duration::from_secs(1);
        trackball.frame(&mut FrameEvent::new(0, t0));
        let before = trackball.look_at();
        trackball.frame(&mut FrameEvent::new(1, t0 - Duration::from_millis(16)));
        assert_eq!(trackball.look_at(), before);
    }
}
