use foundation::time::Time;

/// Timebase advanced by the host's animation-frame callback.
///
/// Frame deltas come from the host and vary frame to frame, so elapsed time
/// is accumulated across `advance` calls rather than derived from the index;
/// event stamps stay monotonic even when a long frame is followed by a short
/// one.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta the host reported for this frame (seconds).
    pub dt_s: f64,
    /// Elapsed engine time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    /// The frame before the first animation-frame callback fires.
    pub fn start() -> Self {
        Self {
            index: 0,
            dt_s: 0.0,
            time: Time(0.0),
        }
    }

    /// The frame for the next callback, which reported `dt_s` since the
    /// previous one.
    pub fn advance(self, dt_s: f64) -> Self {
        Self {
            index: self.index + 1,
            dt_s,
            time: Time(self.time.0 + dt_s),
        }
    }
}
