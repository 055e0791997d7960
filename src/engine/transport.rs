//! Playback clock for Frameline
//!
//! Playback is not a background task: every redraw asks the clock for the
//! current time, passing in the wall-clock instant of that redraw. The
//! clock itself only stores where playback started.

use std::fmt;
use std::time::Instant;

use log::debug;

/// Clock modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Time is fixed at the stored frame number (default state)
    #[default]
    Paused,
    /// Time advances with the wall clock
    Playing,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Paused => write!(f, "Paused"),
            PlaybackState::Playing => write!(f, "Playing"),
        }
    }
}

/// Tracks the playhead frame number and, while playing, the instant
/// playback (re)started.
///
/// While running, the current time is
/// `frame + floor(elapsed * fps) / fps * speed`: elapsed wall-clock
/// seconds are quantized down to a whole frame step before the speed
/// multiplier is applied.
#[derive(Debug, Clone, Default)]
pub struct PlaybackClock {
    /// Stored frame number
    frame: f32,

    /// Origin of the running segment, `None` while paused
    started_at: Option<Instant>,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock mode
    pub fn state(&self) -> PlaybackState {
        match self.started_at {
            Some(_) => PlaybackState::Playing,
            None => PlaybackState::Paused,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.started_at.is_some()
    }

    /// Stored frame number (the paused position, or the running origin)
    pub fn frame(&self) -> f32 {
        self.frame
    }

    /// Time shown at `now`.
    pub fn current_time(&self, now: Instant, frame_rate: f32, speed: f32) -> f32 {
        match self.started_at {
            None => self.frame,
            Some(start) => {
                let elapsed = now.saturating_duration_since(start).as_secs_f32();
                let step = 1.0 / frame_rate;
                let quantized = (elapsed / step).floor() * step;
                self.frame + quantized * speed
            }
        }
    }

    /// Switch between paused and running.
    ///
    /// Pausing captures the running time back into the stored frame.
    pub fn toggle(&mut self, now: Instant, frame_rate: f32, speed: f32) {
        if self.started_at.is_some() {
            self.frame = self.current_time(now, frame_rate, speed);
            self.started_at = None;
            debug!("[PLAYBACK] Paused at frame {:.3}", self.frame);
        } else {
            self.started_at = Some(now);
            debug!("[PLAYBACK] Play from frame {:.3}", self.frame);
        }
    }

    /// Jump to `frame` (clamped to >= 0). While running, the elapsed-time
    /// origin moves to `now` so playback continues from the new position.
    pub fn seek(&mut self, frame: f32, now: Instant) {
        self.frame = frame.max(0.0);
        if self.started_at.is_some() {
            self.started_at = Some(now);
        }
        debug!("[PLAYBACK] Seek to frame {:.3}", self.frame);
    }

    /// Move the stored frame by `delta`, never below 0.
    pub fn step(&mut self, delta: f32) {
        self.frame = (self.frame + delta).max(0.0);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
