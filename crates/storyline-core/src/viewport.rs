//! Animated zoom/scroll controller
//!
//! Holds a *current* (rendered) and *target* (destination) value for both zoom and
//! scroll, plus a scroll velocity for inertial coasting. Input handlers only touch
//! targets; `tick` moves the current values toward them once per animation frame.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::coords::{clamp_scroll, CoordinateMapper};
use crate::smoothed::{frame_decay, SmoothedValue, REFERENCE_FRAME_SECS};

pub const MIN_PIXELS_PER_SECOND: f64 = 2.0;
pub const MAX_PIXELS_PER_SECOND: f64 = 1000.0;
pub const DEFAULT_PIXELS_PER_SECOND: f64 = 50.0;

/// Tuning for the viewport animation. Rates and friction are per 60Hz frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_pixels_per_second: f64,
    pub max_pixels_per_second: f64,
    pub zoom_rate: f64,
    pub scroll_rate: f64,
    /// Velocity multiplier applied every frame while coasting
    pub friction: f64,
    /// Velocity (px/frame) below which coasting stops
    pub velocity_floor: f64,
    /// Fraction of a pan delta converted into coasting velocity
    pub inertia_gain: f64,
    /// Multiplier for one zoom-in step; zoom-out uses the reciprocal
    pub zoom_step: f64,
    pub zoom_epsilon: f64,
    pub scroll_epsilon: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_pixels_per_second: MIN_PIXELS_PER_SECOND,
            max_pixels_per_second: MAX_PIXELS_PER_SECOND,
            zoom_rate: 0.2,
            scroll_rate: 0.25,
            friction: 0.9,
            velocity_floor: 0.05,
            inertia_gain: 0.3,
            zoom_step: 1.25,
            zoom_epsilon: 0.001,
            scroll_epsilon: 0.05,
        }
    }
}

/// Reference point that keeps its screen position across a zoom change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomAnchor {
    /// A timeline time (usually the playhead); falls back to the centre when off-screen
    Time(f64),
    /// A viewport pixel (usually the pointer)
    Pixel(f64),
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStatus {
    Idle,
    Animating,
}

/// Owns the zoom/scroll state for one timeline session.
///
/// Single writer: input handlers and the frame tick both go through `&mut self`.
#[derive(Debug, Clone)]
pub struct ViewportController {
    config: ViewportConfig,
    zoom: SmoothedValue,
    scroll: SmoothedValue,
    velocity: f64,
    duration: f64,
    viewport_width: f64,
    animating: bool,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Self {
        let initial = DEFAULT_PIXELS_PER_SECOND
            .clamp(config.min_pixels_per_second, config.max_pixels_per_second);
        Self {
            config,
            zoom: SmoothedValue::new(initial),
            scroll: SmoothedValue::new(0.0),
            velocity: 0.0,
            duration: 0.0,
            viewport_width: 0.0,
            animating: false,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    pub fn set_duration(&mut self, duration: f64) {
        let duration = duration.max(0.0);
        if duration != self.duration {
            self.duration = duration;
            self.reclamp();
        }
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        let width = width.max(0.0);
        if width != self.viewport_width {
            self.viewport_width = width;
            self.reclamp();
        }
    }

    pub fn pixels_per_second(&self) -> f64 {
        self.zoom.current
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll.current
    }

    pub fn target_pixels_per_second(&self) -> f64 {
        self.zoom.target
    }

    pub fn target_scroll_offset(&self) -> f64 {
        self.scroll.target
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Mapper for the values currently on screen
    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::new(self.zoom.current, self.scroll.current)
    }

    /// Mapper for where the animation is heading, with scroll clamped for the target zoom
    pub fn target_mapper(&self) -> CoordinateMapper {
        CoordinateMapper::new(
            self.zoom.target,
            self.clamp_scroll_at(self.scroll.target, self.zoom.target),
        )
    }

    /// Legal zoom range; the lower bound never lets the project be narrower than the viewport
    pub fn zoom_bounds(&self) -> (f64, f64) {
        let min = self.config.min_pixels_per_second;
        let max = self.config.max_pixels_per_second.max(min);
        let fit = if self.duration > 0.0 && self.viewport_width > 0.0 {
            self.viewport_width / self.duration
        } else {
            min
        };
        (fit.clamp(min, max), max)
    }

    pub fn clamp_scroll_at(&self, value: f64, pixels_per_second: f64) -> f64 {
        clamp_scroll(value, self.duration, pixels_per_second, self.viewport_width)
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Mark the animation loop active. Returns `true` only when it was idle, so the
    /// caller schedules at most one frame callback.
    pub fn begin_animation(&mut self) -> bool {
        if self.animating {
            return false;
        }
        self.animating = true;
        trace!("viewport animation started");
        true
    }

    /// Stop animating where we are (teardown). Targets collapse onto current values.
    pub fn cancel_animation(&mut self) {
        self.zoom.target = self.zoom.current;
        self.scroll.target = self.scroll.current;
        self.velocity = 0.0;
        self.animating = false;
    }

    /// Set zoom and scroll immediately, skipping the animation
    pub fn jump_to(&mut self, pixels_per_second: f64, scroll_offset: f64) {
        let (min, max) = self.zoom_bounds();
        let zoom = pixels_per_second.clamp(min, max);
        self.zoom.reset(zoom);
        self.scroll.reset(self.clamp_scroll_at(scroll_offset, zoom));
        self.velocity = 0.0;
        self.animating = false;
    }

    /// Animate to `pixels_per_second`, keeping `anchor` at the same screen pixel
    pub fn zoom_to(&mut self, pixels_per_second: f64, anchor: ZoomAnchor) {
        let (min, max) = self.zoom_bounds();
        let new_zoom = pixels_per_second.clamp(min, max);
        let (anchor_x, anchor_time) = self.resolve_anchor(anchor);

        self.zoom.set(new_zoom);
        self.scroll
            .set(self.clamp_scroll_at(anchor_time * new_zoom - anchor_x, new_zoom));
        self.velocity = 0.0;
        self.begin_animation();
    }

    pub fn zoom_by(&mut self, factor: f64, anchor: ZoomAnchor) {
        if factor <= 0.0 || !factor.is_finite() {
            return;
        }
        self.zoom_to(self.zoom.target * factor, anchor);
    }

    pub fn zoom_in(&mut self, anchor: ZoomAnchor) {
        self.zoom_by(self.config.zoom_step, anchor);
    }

    pub fn zoom_out(&mut self, anchor: ZoomAnchor) {
        self.zoom_by(1.0 / self.config.zoom_step, anchor);
    }

    /// Fit the whole project into the viewport
    pub fn zoom_to_fit(&mut self) {
        let (min, _) = self.zoom_bounds();
        self.zoom.set(min);
        self.scroll.set(0.0);
        self.velocity = 0.0;
        self.begin_animation();
    }

    /// Pan by `delta_px`; part of the delta keeps coasting after the gesture ends
    pub fn pan_by(&mut self, delta_px: f64) {
        if delta_px == 0.0 || !delta_px.is_finite() {
            return;
        }
        self.scroll
            .set(self.clamp_scroll_at(self.scroll.target + delta_px, self.zoom.target));
        self.velocity += delta_px * self.config.inertia_gain;
        self.begin_animation();
    }

    /// Animate to an absolute scroll offset with no coasting
    pub fn scroll_to(&mut self, scroll_offset: f64) {
        self.scroll
            .set(self.clamp_scroll_at(scroll_offset, self.zoom.target));
        self.velocity = 0.0;
        self.begin_animation();
    }

    /// Advance one animation frame of `dt` seconds
    pub fn tick(&mut self, dt: f64) -> AnimationStatus {
        if !self.animating {
            return AnimationStatus::Idle;
        }
        let cfg = self.config;

        let zoom = self.zoom.step(cfg.zoom_rate, dt);

        if self.velocity.abs() > cfg.velocity_floor {
            let frames = dt / REFERENCE_FRAME_SECS;
            let coasted = self.scroll.target + self.velocity * frames;
            self.scroll.target = self.clamp_scroll_at(coasted, self.zoom.target);
            self.velocity *= frame_decay(cfg.friction, dt);
        } else {
            self.velocity = 0.0;
        }

        // The legal scroll range depends on zoom, so clamp against this frame's zoom
        let goal = self.clamp_scroll_at(self.scroll.target, zoom);
        self.scroll.step_toward(goal, cfg.scroll_rate, dt);

        let settled = self.zoom.is_settled(cfg.zoom_epsilon)
            && (goal - self.scroll.current).abs() < cfg.scroll_epsilon
            && self.velocity.abs() <= cfg.velocity_floor;

        if settled {
            self.zoom.settle();
            self.scroll.target = self.clamp_scroll_at(self.scroll.target, self.zoom.current);
            self.scroll.settle();
            self.velocity = 0.0;
            self.animating = false;
            trace!(
                zoom = self.zoom.current,
                scroll = self.scroll.current,
                "viewport animation settled"
            );
            return AnimationStatus::Idle;
        }

        AnimationStatus::Animating
    }

    fn resolve_anchor(&self, anchor: ZoomAnchor) -> (f64, f64) {
        let mapper = self.target_mapper();
        let center = self.viewport_width / 2.0;
        match anchor {
            ZoomAnchor::Time(time) => {
                let x = mapper.time_to_pixel(time);
                if mapper.is_visible(x, self.viewport_width) {
                    (x, time)
                } else {
                    (center, mapper.pixel_to_time(center))
                }
            }
            ZoomAnchor::Pixel(x) => (x, mapper.pixel_to_time(x)),
            ZoomAnchor::Center => (center, mapper.pixel_to_time(center)),
        }
    }

    fn reclamp(&mut self) {
        let (min, max) = self.zoom_bounds();
        let zoom_target = self.zoom.target.clamp(min, max);
        let scroll_target = self.clamp_scroll_at(self.scroll.target, zoom_target);
        if zoom_target != self.zoom.target || scroll_target != self.scroll.target {
            self.zoom.set(zoom_target);
            self.scroll.set(scroll_target);
            self.begin_animation();
        }
    }
}
