use graph::SceneId;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FadeConfig {
    /// Wall-clock seconds for each side of the fade.
    pub duration_s: f64,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self { duration_s: 0.4 }
    }
}

/// Scene-change state machine: `Idle → FadingOut → AwaitingAssets →
/// FadingIn → Idle`, strictly sequential.
///
/// `AwaitingAssets` is where the machine parks when the fade-out finished
/// but the target panorama hasn't resolved yet; the overlay holds at full
/// opacity instead of revealing a blank scene.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionState {
    Idle,
    FadingOut { target: SceneId, progress: f64 },
    AwaitingAssets { target: SceneId },
    FadingIn { progress: f64 },
}

/// What the engine should do after a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionTick {
    Idle,
    Fading,
    /// Fade-out just reached full opacity; swap when the target is ready.
    FadeOutComplete { target: SceneId },
    /// Still parked at full opacity waiting on the target texture.
    Holding { target: SceneId },
    /// Fade-in finished; the machine is `Idle` again.
    Completed,
}

#[derive(Debug)]
pub struct TransitionController {
    cfg: FadeConfig,
    state: TransitionState,
}

impl TransitionController {
    pub fn new(cfg: FadeConfig) -> Self {
        Self {
            cfg,
            state: TransitionState::Idle,
        }
    }

    pub fn state(&self) -> &TransitionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == TransitionState::Idle
    }

    /// The scene this transition is heading to, if one is in flight.
    pub fn target(&self) -> Option<&SceneId> {
        match &self.state {
            TransitionState::FadingOut { target, .. }
            | TransitionState::AwaitingAssets { target } => Some(target),
            _ => None,
        }
    }

    /// Begin a navigation. First-wins: while any transition is in flight a
    /// second request is a no-op and returns `false`, which is what keeps a
    /// rapid double-activation from corrupting the swap sequence.
    pub fn request_navigate(&mut self, target: SceneId) -> bool {
        if self.state != TransitionState::Idle {
            return false;
        }
        self.state = TransitionState::FadingOut {
            target,
            progress: 0.0,
        };
        true
    }

    /// Advance the fade by `dt_s` seconds of wall-clock time.
    pub fn tick(&mut self, dt_s: f64) -> TransitionTick {
        let step = if self.cfg.duration_s > 0.0 {
            dt_s / self.cfg.duration_s
        } else {
            1.0
        };

        match &mut self.state {
            TransitionState::Idle => TransitionTick::Idle,
            TransitionState::FadingOut { target, progress } => {
                *progress = (*progress + step).min(1.0);
                if *progress >= 1.0 {
                    let target = target.clone();
                    self.state = TransitionState::AwaitingAssets {
                        target: target.clone(),
                    };
                    TransitionTick::FadeOutComplete { target }
                } else {
                    TransitionTick::Fading
                }
            }
            TransitionState::AwaitingAssets { target } => TransitionTick::Holding {
                target: target.clone(),
            },
            TransitionState::FadingIn { progress } => {
                *progress = (*progress - step).max(0.0);
                if *progress <= 0.0 {
                    self.state = TransitionState::Idle;
                    TransitionTick::Completed
                } else {
                    TransitionTick::Fading
                }
            }
        }
    }

    /// The scene content was swapped; ramp the overlay back down.
    pub fn begin_fade_in(&mut self) {
        self.state = TransitionState::FadingIn { progress: 1.0 };
    }

    /// Abandon the navigation (target failed to load). The overlay fades
    /// back in over the *current* scene from wherever it is, so the machine
    /// still ends `Idle` without a jump cut.
    pub fn abort(&mut self) {
        let alpha = self.overlay_alpha();
        if alpha > 0.0 {
            self.state = TransitionState::FadingIn { progress: alpha };
        } else {
            self.state = TransitionState::Idle;
        }
    }

    /// Alpha of the camera-locked overlay quad. The host keeps that quad
    /// glued to the camera pose every frame while this is non-zero, so the
    /// fade stays full-screen under head movement in VR.
    pub fn overlay_alpha(&self) -> f64 {
        match &self.state {
            TransitionState::Idle => 0.0,
            TransitionState::FadingOut { progress, .. } => *progress,
            TransitionState::AwaitingAssets { .. } => 1.0,
            TransitionState::FadingIn { progress } => *progress,
        }
    }
}

impl Default for TransitionController {
    fn default() -> Self {
        Self::new(FadeConfig::default())
    }
}
