use foundation::math::{Quat, Vec3};
use graph::{GraphLoadError, Hotspot, SceneGraph, SceneId, SceneSource};
use history::HistoryStore;
use nav::{
    EntryAction, FadeConfig, OrientationArbiter, OrientationMode, TransitionController,
    TransitionTick,
};
use runtime::event_bus::{Event, EventBus};
use runtime::frame::Frame;
use stage::{
    LabelConfig, LayoutConfig, MarkerSpec, PickConfig, PickHit, Ray, controller_ray, label_bitmap,
    laser_length, pick, pick_pointer, place, tooltip_at,
};
use streaming::{AssetCache, AssetKey, AssetState, Ensure, Preloader, TextureHandle};

use crate::hosts::{ControllerPose, RenderHost, TextureFetcher, XrHost};

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
    pub fade: FadeConfig,
    pub pick: PickConfig,
    pub label: LabelConfig,
}

/// Composition root of the tour viewer's navigation core.
///
/// Owns the scene graph, asset cache, transition machine, orientation
/// arbiter, and picking state; talks to the rendering engine, texture
/// loader, XR session, and history storage only through the host traits.
/// Driven by the host's animation-frame callback via `tick`.
pub struct TourEngine {
    cfg: EngineConfig,
    source: Box<dyn SceneSource>,
    render: Box<dyn RenderHost>,
    fetcher: Box<dyn TextureFetcher>,
    xr: Box<dyn XrHost>,
    history: Box<dyn HistoryStore>,

    cache: AssetCache,
    preloader: Preloader,
    transition: TransitionController,
    arbiter: OrientationArbiter,
    bus: EventBus,
    frame: Frame,

    graph: Option<SceneGraph>,
    current: Option<SceneId>,
    markers: Vec<MarkerSpec>,
    /// Per-marker flag, true once its icon texture was applied (or it has
    /// none, or the load failed and the marker stays icon-less).
    icon_applied: Vec<bool>,
    /// Hotspot used to leave the previous scene, consumed at swap time to
    /// resolve the entry orientation.
    arrival: Option<Hotspot>,

    pointer: Option<(f64, f64)>,
    controller_rays: Vec<Ray>,
    trigger_latch: Vec<bool>,

    ready: bool,
    root_failure_reported: bool,
    on_ready: Option<Box<dyn FnOnce()>>,
}

impl TourEngine {
    pub fn new(
        source: Box<dyn SceneSource>,
        render: Box<dyn RenderHost>,
        fetcher: Box<dyn TextureFetcher>,
        xr: Box<dyn XrHost>,
        history: Box<dyn HistoryStore>,
        cfg: EngineConfig,
    ) -> Self {
        Self {
            cfg,
            source,
            render,
            fetcher,
            xr,
            history,
            cache: AssetCache::new(),
            preloader: Preloader::new(),
            transition: TransitionController::new(cfg.fade),
            arbiter: OrientationArbiter::new(),
            bus: EventBus::new(),
            frame: Frame::start(),
            graph: None,
            current: None,
            markers: Vec::new(),
            icon_applied: Vec::new(),
            arrival: None,
            pointer: None,
            controller_rays: Vec::new(),
            trigger_latch: Vec::new(),
            ready: false,
            root_failure_reported: false,
            on_ready: None,
        }
    }

    /// Load the tour graph and kick off the root panorama fetch. The first
    /// scene is displayed (and `on_ready` fires) once that texture lands.
    pub fn start(&mut self, root: SceneId) -> Result<(), GraphLoadError> {
        let graph = graph::load(self.source.as_mut(), root.clone(), &mut self.bus, self.frame)?;
        self.graph = Some(graph);
        self.ensure_panorama_fetch(&root);
        Ok(())
    }

    /// Register the loading-screen dismissal callback. Fires immediately if
    /// the first scene is already up.
    pub fn on_ready(&mut self, callback: impl FnOnce() + 'static) {
        if self.ready {
            callback();
        } else {
            self.on_ready = Some(Box::new(callback));
        }
    }

    pub fn ready(&self) -> bool {
        self.ready
    }

    pub fn current_scene(&self) -> Option<&SceneId> {
        self.current.as_ref()
    }

    pub fn markers(&self) -> &[MarkerSpec] {
        &self.markers
    }

    pub fn orientation_mode(&self) -> OrientationMode {
        self.arbiter.mode()
    }

    pub fn transition_idle(&self) -> bool {
        self.transition.is_idle()
    }

    /// Structured events since the last drain, for the host console.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.bus.drain()
    }

    /// One animation frame. Never blocks: pending assets just hold the
    /// overlay opaque until they resolve.
    pub fn tick(&mut self, dt_s: f64) {
        self.frame = self.frame.advance(dt_s);

        if !self.ready {
            self.try_show_first_scene();
        }

        match self.transition.tick(dt_s) {
            TransitionTick::FadeOutComplete { target } | TransitionTick::Holding { target } => {
                self.try_swap(&target);
            }
            _ => {}
        }
        self.render.set_overlay_alpha(self.transition.overlay_alpha());

        let fetches = self.preloader.tick(&mut self.cache);
        for fetch in fetches {
            self.fetcher.begin_fetch(&fetch.key, &fetch.uri);
        }
        self.apply_ready_icons();

        // Desktop hover pick; in VR the controller rays own the tooltip.
        if !self.arbiter.vr_active() {
            let hit = match self.pointer {
                Some((x, y)) => pick_pointer(x, y, &self.markers, self.cfg.pick, |x, y| {
                    self.render.pointer_ray(x, y)
                }),
                None => None,
            };
            self.apply_tooltip(hit);
        }
    }

    // ---- input ----

    pub fn pointer_moved(&mut self, x_ndc: f64, y_ndc: f64) {
        self.pointer = Some((x_ndc, y_ndc));
    }

    pub fn pointer_pressed(&mut self) {
        let Some((x, y)) = self.pointer else { return };
        let hit = pick_pointer(x, y, &self.markers, self.cfg.pick, |x, y| {
            self.render.pointer_ray(x, y)
        });
        if let Some(hit) = hit {
            self.activate_marker(hit.marker);
        }
    }

    /// Per-frame controller update: lasers, VR tooltip, and the polled
    /// trigger fallback for controllers whose select events don't fire.
    pub fn controller_frame(&mut self, poses: &[ControllerPose]) {
        self.trigger_latch.resize(poses.len(), false);
        self.controller_rays.clear();

        let mut best_hit: Option<PickHit> = None;
        for (i, pose) in poses.iter().enumerate() {
            let ray = controller_ray(pose.position, pose.orientation);
            let hit = pick(ray, &self.markers, self.cfg.pick);
            self.render
                .set_laser(i, Some(laser_length(hit.as_ref(), self.cfg.pick)));
            self.controller_rays.push(ray);

            if let Some(hit) = hit {
                let closer = best_hit.map(|b| hit.distance < b.distance).unwrap_or(true);
                if closer {
                    best_hit = Some(hit);
                }
            }

            let was_pressed = self.trigger_latch[i];
            self.trigger_latch[i] = pose.trigger_pressed;
            if pose.trigger_pressed && !was_pressed {
                if let Some(hit) = hit {
                    self.activate_marker(hit.marker);
                }
            }
        }

        if self.arbiter.vr_active() {
            self.apply_tooltip(best_hit);
        }
    }

    /// A controller's `select` event fired; re-pick along its last ray.
    pub fn controller_select(&mut self, controller: usize) {
        let Some(ray) = self.controller_rays.get(controller).copied() else {
            return;
        };
        if let Some(hit) = pick(ray, &self.markers, self.cfg.pick) {
            self.activate_marker(hit.marker);
        }
    }

    // ---- orientation ----

    /// Per-frame orientation from one of the three sources. Writes from the
    /// two inactive sources are dropped by the arbiter.
    pub fn submit_orientation(&mut self, source: OrientationMode, orientation: Quat) {
        let accepted = self.arbiter.submit_orientation(source, orientation);
        // In VR the camera is tracked by the host and read-only here.
        if accepted && source != OrientationMode::Vr {
            self.render.set_camera(orientation);
        }
    }

    pub fn set_camera_position(&mut self, position: Vec3) {
        self.arbiter.set_camera_position(position);
    }

    /// The UI chrome's orbit/sensor toggle. VR mode is host-driven and never
    /// reachable from here.
    pub fn toggle_orientation_mode(&mut self) {
        if self.arbiter.vr_active() {
            self.bus
                .warn(self.frame, "orientation", "mode toggle ignored during VR session");
            return;
        }
        let next = match self.arbiter.mode() {
            OrientationMode::Orbit => OrientationMode::DeviceSensor,
            _ => OrientationMode::Orbit,
        };
        let change = self.arbiter.set_mode(next);
        if let Some(target) = change.orbit_target {
            self.render.set_orbit_target(target);
        }
    }

    pub fn vr_session_started(&mut self) {
        self.arbiter.vr_session_started();
        self.bus.info(self.frame, "orientation", "VR session started");
    }

    pub fn vr_session_ended(&mut self) {
        let change = self.arbiter.vr_session_ended();
        self.render.set_camera(self.arbiter.camera());
        if let Some(target) = change.orbit_target {
            self.render.set_orbit_target(target);
        }
        for i in 0..self.trigger_latch.len() {
            self.render.set_laser(i, None);
        }
        self.trigger_latch.clear();
        self.controller_rays.clear();
        self.bus.info(self.frame, "orientation", "VR session ended");
    }

    // ---- host completion delivery ----

    pub fn texture_loaded(&mut self, key: &AssetKey, handle: TextureHandle) {
        if let Err(e) = self.cache.fulfill(key, handle) {
            self.bus.warn(self.frame, "asset", e.to_string());
        }
    }

    pub fn texture_failed(&mut self, key: &AssetKey, message: &str) {
        self.bus
            .warn(self.frame, "asset", format!("{key} failed: {message}"));
        if let Err(e) = self.cache.fail(key, message) {
            self.bus.warn(self.frame, "asset", e.to_string());
        }
    }

    // ---- internals ----

    fn activate_marker(&mut self, index: usize) {
        let Some(marker) = self.markers.get(index) else {
            return;
        };
        // Inert hotspot: hover/label only, activation is a no-op.
        let Some(target) = marker.target.clone() else {
            return;
        };
        let Some(graph) = self.graph.as_ref() else {
            return;
        };
        if !graph.contains(&target) {
            self.bus.warn(
                self.frame,
                "navigate",
                format!("hotspot targets unloaded scene {target}"),
            );
            return;
        }
        // First-wins: a second activation during a transition is dropped.
        if !self.transition.request_navigate(target.clone()) {
            return;
        }
        self.arrival = self
            .current
            .as_ref()
            .and_then(|cur| self.graph.as_ref()?.get(cur))
            .and_then(|scene| scene.hotspots.get(index))
            .cloned();
        self.ensure_panorama_fetch(&target);
    }

    fn ensure_panorama_fetch(&mut self, id: &SceneId) {
        let Some(uri) = self
            .graph
            .as_ref()
            .and_then(|g| g.get(id))
            .map(|s| s.panorama_uri.clone())
        else {
            return;
        };
        let key = AssetKey::Panorama(id.clone());
        if self.cache.ensure(&key) == Ensure::Issued {
            self.fetcher.begin_fetch(&key, &uri);
        }
    }

    fn try_show_first_scene(&mut self) {
        let Some(root) = self.graph.as_ref().map(|g| g.root().clone()) else {
            return;
        };
        let key = AssetKey::Panorama(root.clone());
        match self.cache.state(&key) {
            Some(AssetState::Ready(handle)) => {
                let handle = *handle;
                self.enter_scene(&root, None, handle);
                self.ready = true;
                if let Some(callback) = self.on_ready.take() {
                    callback();
                }
            }
            Some(AssetState::Failed(message)) => {
                if !self.root_failure_reported {
                    let message = message.clone();
                    self.root_failure_reported = true;
                    self.bus.error(
                        self.frame,
                        "navigate",
                        format!("first scene {root} unavailable: {message}"),
                    );
                }
            }
            _ => {}
        }
    }

    /// Fade-out is complete; swap as soon as the target texture resolves.
    /// A failed load aborts the transition back over the current scene.
    fn try_swap(&mut self, target: &SceneId) {
        let key = AssetKey::Panorama(target.clone());
        match self.cache.state(&key) {
            Some(AssetState::Ready(handle)) => {
                let handle = *handle;
                let via = self.arrival.take();
                self.enter_scene(target, via, handle);
                self.transition.begin_fade_in();
            }
            Some(AssetState::Pending) => {}
            Some(AssetState::Failed(message)) => {
                let message = message.clone();
                self.bus.error(
                    self.frame,
                    "navigate",
                    format!("navigation to {target} aborted: {message}"),
                );
                self.arrival = None;
                self.transition.abort();
            }
            None => self.ensure_panorama_fetch(target),
        }
    }

    fn enter_scene(&mut self, id: &SceneId, arrived_via: Option<Hotspot>, panorama: TextureHandle) {
        let Some(graph) = self.graph.as_ref() else {
            return;
        };
        let Some(scene) = graph.get(id) else {
            self.bus
                .warn(self.frame, "navigate", format!("scene {id} missing at swap"));
            return;
        };

        let markers = place(scene, self.cfg.layout);
        let entry = self
            .arbiter
            .resolve_entry_orientation(scene, arrived_via.as_ref());
        match self.arbiter.enter_scene(entry) {
            EntryAction::SetCamera(q) => self.render.set_camera(q),
            EntryAction::RebaseReferenceSpace(rigid) => self.xr.request_reference_space(rigid),
        }

        self.render.show_scene(panorama, &markers);
        self.render.set_tooltip(None);
        self.markers = markers;
        self.current = Some(id.clone());

        self.icon_applied = self.markers.iter().map(|m| m.icon.is_none()).collect();
        for marker in &self.markers {
            let Some(uri) = &marker.icon else { continue };
            let key = AssetKey::Icon(uri.clone());
            if self.cache.ensure(&key) == Ensure::Issued {
                self.fetcher.begin_fetch(&key, uri);
            }
        }

        if let Err(e) = self.history.append(id.as_str()) {
            self.bus.warn(self.frame, "history", e.to_string());
        }

        if let Some(graph) = self.graph.as_ref() {
            self.preloader.schedule(graph, id);
        }
    }

    /// Stamp icon textures onto markers as their loads land. A failed icon
    /// leaves the marker icon-less; the scene itself is unaffected.
    fn apply_ready_icons(&mut self) {
        for (i, marker) in self.markers.iter().enumerate() {
            if self.icon_applied[i] {
                continue;
            }
            let Some(uri) = &marker.icon else { continue };
            match self.cache.state(&AssetKey::Icon(uri.clone())) {
                Some(AssetState::Ready(handle)) => {
                    self.render.set_marker_icon(i, *handle);
                    self.icon_applied[i] = true;
                }
                Some(AssetState::Failed(_)) => self.icon_applied[i] = true,
                _ => {}
            }
        }
    }

    fn apply_tooltip(&mut self, hit: Option<PickHit>) {
        match hit.and_then(|h| self.markers.get(h.marker)) {
            None => self.render.set_tooltip(None),
            Some(marker) => {
                let bitmap = label_bitmap(&marker.label, marker.gradient, self.cfg.label, |s| {
                    self.render.measure_text(s)
                });
                let tooltip = tooltip_at(bitmap, marker.position, self.cfg.label);
                self.render.set_tooltip(Some(&tooltip));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::math::Orientation;
    use graph::{HotspotRecord, RawSceneId, SceneRecord, SourceError};
    use history::HistoryError;
    use nav::RigidTransform;
    use runtime::event_bus::Severity;
    use stage::TooltipSpec;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    #[derive(Default)]
    struct HostState {
        fetches: Vec<AssetKey>,
        shown: Vec<(TextureHandle, Vec<String>)>,
        overlay: f64,
        cameras: Vec<Quat>,
        orbit_targets: Vec<Vec3>,
        tooltip: Option<String>,
        lasers: Vec<(usize, Option<f64>)>,
        marker_icons: Vec<(usize, TextureHandle)>,
        pointer_ray: Option<Ray>,
        rebased: Vec<RigidTransform>,
        visited: Vec<String>,
    }

    struct StubRender(Rc<RefCell<HostState>>);

    impl RenderHost for StubRender {
        fn show_scene(&mut self, panorama: TextureHandle, markers: &[MarkerSpec]) {
            let labels = markers.iter().map(|m| m.label.clone()).collect();
            self.0.borrow_mut().shown.push((panorama, labels));
        }

        fn set_overlay_alpha(&mut self, alpha: f64) {
            self.0.borrow_mut().overlay = alpha;
        }

        fn set_camera(&mut self, orientation: Quat) {
            self.0.borrow_mut().cameras.push(orientation);
        }

        fn set_orbit_target(&mut self, target: Vec3) {
            self.0.borrow_mut().orbit_targets.push(target);
        }

        fn set_tooltip(&mut self, tooltip: Option<&TooltipSpec>) {
            self.0.borrow_mut().tooltip = tooltip.map(|t| t.bitmap.lines.join(" "));
        }

        fn set_laser(&mut self, controller: usize, length: Option<f64>) {
            self.0.borrow_mut().lasers.push((controller, length));
        }

        fn set_marker_icon(&mut self, marker: usize, texture: TextureHandle) {
            self.0.borrow_mut().marker_icons.push((marker, texture));
        }

        fn pointer_ray(&self, _x_ndc: f64, _y_ndc: f64) -> Option<Ray> {
            self.0.borrow().pointer_ray
        }

        fn measure_text(&self, text: &str) -> f64 {
            text.chars().count() as f64 * 10.0
        }
    }

    struct StubFetcher(Rc<RefCell<HostState>>);

    impl TextureFetcher for StubFetcher {
        fn begin_fetch(&mut self, key: &AssetKey, _uri: &str) {
            self.0.borrow_mut().fetches.push(key.clone());
        }
    }

    struct StubXr(Rc<RefCell<HostState>>);

    impl XrHost for StubXr {
        fn request_reference_space(&mut self, transform: RigidTransform) {
            self.0.borrow_mut().rebased.push(transform);
        }
    }

    struct StubHistory(Rc<RefCell<HostState>>);

    impl HistoryStore for StubHistory {
        fn append(&mut self, scene_id: &str) -> Result<(), HistoryError> {
            self.0.borrow_mut().visited.push(scene_id.to_string());
            Ok(())
        }

        fn visited(&self) -> Result<Vec<String>, HistoryError> {
            Ok(self.0.borrow().visited.clone())
        }
    }

    struct StubSource {
        scenes: BTreeMap<SceneId, (SceneRecord, Vec<HotspotRecord>)>,
    }

    impl SceneSource for StubSource {
        fn scene(&mut self, id: &SceneId) -> Result<SceneRecord, SourceError> {
            self.scenes
                .get(id)
                .map(|(s, _)| s.clone())
                .ok_or_else(|| SourceError::NotFound(id.clone()))
        }

        fn hotspots(&mut self, id: &SceneId) -> Result<Vec<HotspotRecord>, SourceError> {
            self.scenes
                .get(id)
                .map(|(_, h)| h.clone())
                .ok_or_else(|| SourceError::NotFound(id.clone()))
        }
    }

    fn scene_record(uri: &str, entry_yaw_deg: f64) -> SceneRecord {
        SceneRecord {
            panorama_uri: uri.into(),
            entry_yaw: entry_yaw_deg,
            entry_pitch: 0.0,
            entry_roll: 0.0,
        }
    }

    fn hotspot_record(label: &str, target: Option<&str>, position: Option<Vec3>) -> HotspotRecord {
        HotspotRecord {
            label: label.into(),
            x: position.map(|p| p.x),
            y: position.map(|p| p.y),
            z: position.map(|p| p.z),
            yaw: None,
            pitch: None,
            roll: None,
            icon: None,
            target_scene: target.map(|t| RawSceneId::Text(t.into())),
        }
    }

    /// Two rooms: "a" (authored entry 0°) has a position-less "Door" to "b";
    /// "b" (authored entry 90°) has "Back" at (0, 0, -1) pointing home.
    fn two_room_tour() -> StubSource {
        let mut scenes = BTreeMap::new();
        scenes.insert(
            SceneId::new("a"),
            (
                scene_record("a.jpg", 0.0),
                vec![hotspot_record("Door", Some("b"), None)],
            ),
        );
        scenes.insert(
            SceneId::new("b"),
            (
                scene_record("b.jpg", 90.0),
                vec![hotspot_record("Back", Some("a"), Some(Vec3::new(0.0, 0.0, -1.0)))],
            ),
        );
        StubSource { scenes }
    }

    fn fixture(source: StubSource) -> (TourEngine, Rc<RefCell<HostState>>) {
        let state = Rc::new(RefCell::new(HostState::default()));
        let engine = TourEngine::new(
            Box::new(source),
            Box::new(StubRender(state.clone())),
            Box::new(StubFetcher(state.clone())),
            Box::new(StubXr(state.clone())),
            Box::new(StubHistory(state.clone())),
            EngineConfig::default(),
        );
        (engine, state)
    }

    fn panorama(id: &str) -> AssetKey {
        AssetKey::Panorama(SceneId::new(id))
    }

    /// Start on "a" and resolve its texture so the first scene is up.
    fn ready_on_a(engine: &mut TourEngine) {
        engine.start(SceneId::new("a")).unwrap();
        engine.texture_loaded(&panorama("a"), TextureHandle(1));
        engine.tick(0.016);
        assert!(engine.ready());
    }

    /// Aim the desktop pointer so the next pick hits `toward`.
    fn aim_pointer(engine: &mut TourEngine, state: &Rc<RefCell<HostState>>, toward: Vec3) {
        state.borrow_mut().pointer_ray = Some(Ray::new(Vec3::ZERO, toward));
        engine.pointer_moved(0.0, 0.0);
    }

    // A's single position-less hotspot lands at ring angle 0.
    const DOOR_MARKER: Vec3 = Vec3 {
        x: 4.0,
        y: 0.0,
        z: 0.0,
    };

    #[test]
    fn first_scene_waits_for_the_root_texture() {
        let (mut engine, state) = fixture(two_room_tour());
        let fired = Rc::new(RefCell::new(false));
        let flag = fired.clone();
        engine.on_ready(move || *flag.borrow_mut() = true);

        engine.start(SceneId::new("a")).unwrap();
        assert_eq!(state.borrow().fetches, vec![panorama("a")]);

        engine.tick(0.016);
        assert!(!engine.ready());
        assert!(state.borrow().shown.is_empty());
        assert!(!*fired.borrow());

        engine.texture_loaded(&panorama("a"), TextureHandle(1));
        engine.tick(0.016);
        assert!(engine.ready());
        assert!(*fired.borrow());
        assert_eq!(engine.markers().len(), 1);
        assert_eq!(engine.current_scene(), Some(&SceneId::new("a")));
        {
            let s = state.borrow();
            assert_eq!(s.shown, vec![(TextureHandle(1), vec!["Door".to_string()])]);
            assert_eq!(s.visited, vec!["a".to_string()]);
            // Authored entry of "a" is level, so the camera is identity.
            assert!(s.cameras.last().unwrap().dot(Quat::IDENTITY) > 0.999);
        }
        // Entering "a" scheduled its neighbor wave: "b" was prefetched.
        assert_eq!(
            state
                .borrow()
                .fetches
                .iter()
                .filter(|k| **k == panorama("b"))
                .count(),
            1
        );
    }

    #[test]
    fn navigation_holds_opaque_until_the_target_lands() {
        let (mut engine, state) = fixture(two_room_tour());
        ready_on_a(&mut engine);

        aim_pointer(&mut engine, &state, DOOR_MARKER);
        engine.pointer_pressed();
        assert!(!engine.transition_idle());
        // First-wins: a second press mid-fade changes nothing.
        engine.pointer_pressed();

        engine.tick(0.4); // fade-out completes; "b" is still pending
        engine.tick(0.1);
        {
            let s = state.borrow();
            assert_eq!(s.overlay, 1.0);
            assert_eq!(s.shown.len(), 1);
            assert_eq!(
                s.fetches.iter().filter(|k| **k == panorama("b")).count(),
                1
            );
        }

        engine.texture_loaded(&panorama("b"), TextureHandle(2));
        engine.tick(0.016);
        {
            let s = state.borrow();
            assert_eq!(s.shown.len(), 2);
            assert_eq!(s.shown[1], (TextureHandle(2), vec!["Back".to_string()]));
            assert_eq!(s.visited, vec!["a".to_string(), "b".to_string()]);
            // "Door" carries no arrival data, so B's authored 90° entry wins.
            let target = Quat::from_orientation(Orientation::from_degrees(90.0, 0.0, 0.0));
            assert!(s.cameras.last().unwrap().dot(target).abs() > 0.999);
        }

        engine.tick(0.4);
        engine.tick(0.016);
        assert!(engine.transition_idle());
        assert_eq!(state.borrow().overlay, 0.0);
    }

    #[test]
    fn returning_through_a_placed_hotspot_faces_back_along_it() {
        let (mut engine, state) = fixture(two_room_tour());
        ready_on_a(&mut engine);

        aim_pointer(&mut engine, &state, DOOR_MARKER);
        engine.pointer_pressed();
        engine.texture_loaded(&panorama("b"), TextureHandle(2));
        engine.tick(0.4);
        engine.tick(0.5); // fade-in finishes
        assert!(engine.transition_idle());
        assert_eq!(engine.current_scene(), Some(&SceneId::new("b")));

        // "Back" sits at (0, 0, -1); arriving in "a" yaws to atan2(0, -1) = π.
        aim_pointer(&mut engine, &state, Vec3::new(0.0, 0.0, -1.0));
        engine.pointer_pressed();
        engine.tick(0.4); // "a" is already cached, so the swap is immediate
        {
            let s = state.borrow();
            assert_eq!(
                s.visited,
                vec!["a".to_string(), "b".to_string(), "a".to_string()]
            );
            let target =
                Quat::from_orientation(Orientation::new(std::f64::consts::PI, 0.0, 0.0));
            assert!(s.cameras.last().unwrap().dot(target).abs() > 0.999);
        }
    }

    #[test]
    fn failed_target_aborts_back_over_the_current_scene() {
        let (mut engine, state) = fixture(two_room_tour());
        ready_on_a(&mut engine);

        aim_pointer(&mut engine, &state, DOOR_MARKER);
        engine.pointer_pressed();
        engine.tick(0.4);
        engine.texture_failed(&panorama("b"), "404");
        engine.tick(0.016);

        let events = engine.drain_events();
        assert!(
            events
                .iter()
                .any(|e| e.severity == Severity::Error && e.kind == "navigate")
        );
        engine.tick(0.5);
        assert!(engine.transition_idle());
        // "b" was never shown; "a" is still the scene on screen.
        assert_eq!(state.borrow().shown.len(), 1);
        assert_eq!(engine.current_scene(), Some(&SceneId::new("a")));
        assert_eq!(state.borrow().visited, vec!["a".to_string()]);
    }

    #[test]
    fn inert_hotspots_label_but_never_navigate() {
        let mut scenes = BTreeMap::new();
        scenes.insert(
            SceneId::new("a"),
            (
                scene_record("a.jpg", 0.0),
                vec![hotspot_record("Plaque", None, None)],
            ),
        );
        let (mut engine, state) = fixture(StubSource { scenes });
        ready_on_a(&mut engine);

        aim_pointer(&mut engine, &state, DOOR_MARKER);
        engine.tick(0.016);
        assert_eq!(state.borrow().tooltip.as_deref(), Some("Plaque"));

        engine.pointer_pressed();
        assert!(engine.transition_idle());
        assert_eq!(state.borrow().shown.len(), 1);
    }

    #[test]
    fn marker_icons_apply_when_their_texture_lands() {
        let mut scenes = BTreeMap::new();
        scenes.insert(
            SceneId::new("a"),
            (
                scene_record("a.jpg", 0.0),
                vec![
                    HotspotRecord {
                        icon: Some("arrow.png".into()),
                        ..hotspot_record("Door", Some("b"), None)
                    },
                    HotspotRecord {
                        icon: Some("broken.png".into()),
                        ..hotspot_record("Plaque", None, None)
                    },
                ],
            ),
        );
        scenes.insert(SceneId::new("b"), (scene_record("b.jpg", 0.0), vec![]));
        let (mut engine, state) = fixture(StubSource { scenes });
        ready_on_a(&mut engine);
        {
            let s = state.borrow();
            assert!(s.fetches.contains(&AssetKey::Icon("arrow.png".into())));
            assert!(s.fetches.contains(&AssetKey::Icon("broken.png".into())));
            assert!(s.marker_icons.is_empty());
        }

        engine.texture_loaded(&AssetKey::Icon("arrow.png".into()), TextureHandle(9));
        engine.texture_failed(&AssetKey::Icon("broken.png".into()), "404");
        engine.tick(0.016);
        // The failed icon leaves its marker on the default sprite.
        assert_eq!(state.borrow().marker_icons, vec![(0, TextureHandle(9))]);

        // Applied once, not re-stamped every frame.
        engine.tick(0.016);
        assert_eq!(state.borrow().marker_icons.len(), 1);
    }

    #[test]
    fn mode_toggle_round_trips_and_is_locked_during_vr() {
        let (mut engine, state) = fixture(two_room_tour());
        ready_on_a(&mut engine);
        assert_eq!(engine.orientation_mode(), OrientationMode::Orbit);

        engine.toggle_orientation_mode();
        assert_eq!(engine.orientation_mode(), OrientationMode::DeviceSensor);
        engine.toggle_orientation_mode();
        assert_eq!(engine.orientation_mode(), OrientationMode::Orbit);
        assert_eq!(state.borrow().orbit_targets.len(), 1);

        engine.vr_session_started();
        assert_eq!(engine.orientation_mode(), OrientationMode::Vr);
        engine.toggle_orientation_mode();
        assert_eq!(engine.orientation_mode(), OrientationMode::Vr);
        assert!(
            engine
                .drain_events()
                .iter()
                .any(|e| e.severity == Severity::Warn && e.kind == "orientation")
        );

        engine.vr_session_ended();
        assert_eq!(engine.orientation_mode(), OrientationMode::Orbit);
    }

    #[test]
    fn inactive_orientation_sources_never_reach_the_render_camera() {
        let (mut engine, state) = fixture(two_room_tour());
        ready_on_a(&mut engine);

        let before = state.borrow().cameras.len();
        let q = Quat::from_orientation(Orientation::new(1.0, 0.0, 0.0));
        engine.submit_orientation(OrientationMode::DeviceSensor, q);
        assert_eq!(state.borrow().cameras.len(), before);

        engine.submit_orientation(OrientationMode::Orbit, q);
        assert_eq!(state.borrow().cameras.len(), before + 1);
    }

    #[test]
    fn vr_navigation_rebases_the_reference_space() {
        let (mut engine, state) = fixture(two_room_tour());
        ready_on_a(&mut engine);
        engine.texture_loaded(&panorama("b"), TextureHandle(2));
        engine.vr_session_started();

        // Controller -Z axis rotated by yaw -90° points at the Door marker.
        let pose = ControllerPose {
            position: Vec3::ZERO,
            orientation: Quat::from_orientation(Orientation::from_degrees(-90.0, 0.0, 0.0)),
            trigger_pressed: true,
        };
        engine.controller_frame(&[pose]);
        assert!(!engine.transition_idle());
        {
            let s = state.borrow();
            assert_eq!(s.tooltip.as_deref(), Some("Door"));
            let (controller, length) = s.lasers.last().copied().unwrap();
            assert_eq!(controller, 0);
            assert!((length.unwrap() - (4.0 - 0.35)).abs() < 1e-9);
        }

        let cameras_before = state.borrow().cameras.len();
        engine.tick(0.4); // fade-out completes, "b" already cached: swap now
        {
            let s = state.borrow();
            // Entry realized through the XR host, never the camera transform.
            assert_eq!(s.cameras.len(), cameras_before);
            assert_eq!(s.rebased.len(), 1);
            let rigid = s.rebased[0];
            let target = Quat::from_orientation(Orientation::from_degrees(90.0, 0.0, 0.0));
            // Tracked camera is identity here, so the offset maps it onto
            // the target heading directly.
            assert!(rigid.rotation.mul(Quat::IDENTITY).dot(target).abs() > 0.999);
        }

        // Holding the trigger across frames does not re-activate.
        engine.controller_frame(&[pose]);
        assert_eq!(state.borrow().shown.len(), 2);
    }

    #[test]
    fn controller_select_picks_along_the_last_ray() {
        let (mut engine, state) = fixture(two_room_tour());
        ready_on_a(&mut engine);

        let pose = ControllerPose {
            position: Vec3::ZERO,
            orientation: Quat::from_orientation(Orientation::from_degrees(-90.0, 0.0, 0.0)),
            trigger_pressed: false,
        };
        engine.controller_frame(&[pose]);
        assert!(engine.transition_idle());

        engine.controller_select(0);
        assert!(!engine.transition_idle());
        assert_eq!(
            state
                .borrow()
                .fetches
                .iter()
                .filter(|k| **k == panorama("b"))
                .count(),
            1
        );
    }
}
