use foundation::math::{Orientation, Quat, Vec3};
use graph::{Hotspot, Scene};

/// The three mutually exclusive camera-orientation sources.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OrientationMode {
    /// Mouse/touch drag orbit.
    Orbit,
    /// Phone gyroscope / device-orientation sensors.
    DeviceSensor,
    /// Headset tracking; host-driven, never user-toggled.
    Vr,
}

/// Position + rotation pair handed to the XR host when constructing an
/// offset reference space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RigidTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

/// Host-visible consequences of a mode switch.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ModeChange {
    pub previous: OrientationMode,
    pub entered: OrientationMode,
    /// For `Orbit`: the look-at target re-derived from the captured camera
    /// orientation, so enabling orbit causes no visible snap.
    pub orbit_target: Option<Vec3>,
}

/// What the engine must do to realize a scene's entry orientation.
///
/// A physical headset's tracking origin can't be moved by writing to the
/// camera transform, so in VR the *virtual world* is re-oriented under the
/// stationary user via a new offset reference space instead.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EntryAction {
    SetCamera(Quat),
    RebaseReferenceSpace(RigidTransform),
}

/// Owns which orientation source is live and the last-known camera pose.
///
/// Single-writer rule: only the active mode's updates reach the camera
/// quaternion; `submit_orientation` from the other two sources is dropped.
#[derive(Debug)]
pub struct OrientationArbiter {
    mode: OrientationMode,
    camera: Quat,
    camera_position: Vec3,
    /// Distance at which the orbit look-at target is re-derived.
    orbit_distance: f64,
    saved_before_vr: Option<(OrientationMode, Quat)>,
}

impl OrientationArbiter {
    pub fn new() -> Self {
        Self {
            mode: OrientationMode::Orbit,
            camera: Quat::IDENTITY,
            camera_position: Vec3::ZERO,
            orbit_distance: 1.0,
            saved_before_vr: None,
        }
    }

    pub fn mode(&self) -> OrientationMode {
        self.mode
    }

    pub fn camera(&self) -> Quat {
        self.camera
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera_position
    }

    pub fn set_camera_position(&mut self, position: Vec3) {
        self.camera_position = position;
    }

    /// Per-frame orientation write from one of the three sources. Returns
    /// whether the write was accepted (i.e. `source` is the active mode).
    pub fn submit_orientation(&mut self, source: OrientationMode, orientation: Quat) -> bool {
        if source != self.mode {
            return false;
        }
        self.camera = orientation.normalized();
        true
    }

    /// Switch the active source. The outgoing source's last camera pose is
    /// already captured in `camera`, so the incoming source starts from it.
    pub fn set_mode(&mut self, mode: OrientationMode) -> ModeChange {
        let previous = self.mode;
        self.mode = mode;
        ModeChange {
            previous,
            entered: mode,
            orbit_target: (mode == OrientationMode::Orbit).then(|| self.orbit_look_target()),
        }
    }

    fn orbit_look_target(&self) -> Vec3 {
        self.camera_position + self.camera.forward().scale(self.orbit_distance)
    }

    /// Host signal: an immersive session became active. Tracking takes over
    /// and the on-screen orbit/sensor toggle should be hidden.
    pub fn vr_session_started(&mut self) -> ModeChange {
        self.saved_before_vr = Some((self.mode, self.camera));
        self.set_mode(OrientationMode::Vr)
    }

    /// Host signal: the immersive session ended. Restores the mode that was
    /// active immediately before the session, and the orientation captured
    /// just before it began.
    pub fn vr_session_ended(&mut self) -> ModeChange {
        match self.saved_before_vr.take() {
            Some((mode, camera)) => {
                self.camera = camera;
                self.set_mode(mode)
            }
            None => self.set_mode(self.mode),
        }
    }

    pub fn vr_active(&self) -> bool {
        self.mode == OrientationMode::Vr
    }

    /// The orientation to assume when entering `scene`.
    ///
    /// Arriving through a hotspot: its explicit override wins; otherwise a
    /// hotspot with an explicit position yields `yaw = atan2(x, z)` of that
    /// position (the viewer looks back roughly the way they came), pitch and
    /// roll level. Without arrival data the scene's authored entry applies.
    pub fn resolve_entry_orientation(
        &self,
        scene: &Scene,
        arrived_via: Option<&Hotspot>,
    ) -> Orientation {
        if let Some(hotspot) = arrived_via {
            if let Some(entry) = hotspot.entry_override {
                return entry;
            }
            if let Some(p) = hotspot.position {
                return Orientation::new(p.x.atan2(p.z), 0.0, 0.0);
            }
        }
        scene.entry
    }

    /// Realize an entry orientation for the current mode.
    ///
    /// Outside VR the camera quaternion is simply rewritten. In VR the
    /// returned rigid transform combines the current position with
    /// `q_offset = q_target * inverse(q_current)`; applying it as an offset
    /// reference space maps the user's current physical heading onto the
    /// desired virtual one. Re-issued on every scene entry while a session
    /// is active.
    pub fn enter_scene(&mut self, entry: Orientation) -> EntryAction {
        let q_target = Quat::from_orientation(entry);
        if self.mode == OrientationMode::Vr {
            let offset = q_target.mul(self.camera.inverse()).normalized();
            EntryAction::RebaseReferenceSpace(RigidTransform {
                position: self.camera_position,
                rotation: offset,
            })
        } else {
            self.camera = q_target;
            EntryAction::SetCamera(q_target)
        }
    }
}

impl Default for OrientationArbiter {
    fn default() -> Self {
        Self::new()
    }
}
