//! Contracts consumed from the rendering engine and the XR host.
//!
//! The tour core never touches GPU state or WebXR objects directly; these
//! traits are the whole surface it needs from those collaborators.

use foundation::math::{Quat, Vec3};
use nav::RigidTransform;
use stage::{MarkerSpec, Ray, TooltipSpec};
use streaming::{AssetKey, TextureHandle};

/// Asynchronous fetch+decode of panorama/icon images.
///
/// `begin_fetch` must return immediately; the host delivers the outcome
/// later through `TourEngine::texture_loaded` / `texture_failed`. The engine
/// reserves the cache slot *before* calling this, so the host never sees the
/// same key twice.
pub trait TextureFetcher {
    fn begin_fetch(&mut self, key: &AssetKey, uri: &str);
}

/// The rendering collaborator: meshes, camera, overlay, tooltip, lasers.
pub trait RenderHost {
    /// Tear down the previous scene's panorama mesh + markers and build the
    /// new ones. Called exactly once per scene entry, mid-fade.
    fn show_scene(&mut self, panorama: TextureHandle, markers: &[MarkerSpec]);

    /// Alpha of the fade overlay. The overlay quad is camera-locked: the
    /// host re-pins it to the camera pose every frame while alpha > 0 so it
    /// stays full-screen under head movement.
    fn set_overlay_alpha(&mut self, alpha: f64);

    fn set_camera(&mut self, orientation: Quat);

    /// Orbit-drag look-at target, re-derived on mode switches.
    fn set_orbit_target(&mut self, target: Vec3);

    /// `None` hides the floating label.
    fn set_tooltip(&mut self, tooltip: Option<&TooltipSpec>);

    /// Laser feedback for one controller; `None` hides that laser.
    fn set_laser(&mut self, controller: usize, length: Option<f64>);

    /// Apply a marker's icon texture once its load lands. Markers with no
    /// icon (or a failed one) render with the default sprite.
    fn set_marker_icon(&mut self, marker: usize, texture: TextureHandle);

    /// Deterministic screen-to-world mapping through the camera for the
    /// last pointer position (normalized device coordinates).
    fn pointer_ray(&self, x_ndc: f64, y_ndc: f64) -> Option<Ray>;

    /// Pixel width of label text in the tooltip font, for word wrapping.
    fn measure_text(&self, text: &str) -> f64;
}

/// The WebXR session collaborator.
pub trait XrHost {
    /// Construct and install an offset reference space from the given rigid
    /// transform. This is how scene entry re-orients the virtual world under
    /// a stationary physical user.
    fn request_reference_space(&mut self, transform: RigidTransform);
}

/// Per-frame snapshot of one tracked controller.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ControllerPose {
    pub position: Vec3,
    pub orientation: Quat,
    /// Polled trigger state from the XR gamepad object; the fallback for
    /// controllers whose select events don't fire reliably.
    pub trigger_pressed: bool,
}
