//! Per-frame driver: advance the orbit controls, then draw the scene.
//!
//! The host decides when frames happen ([`TickSource`]); the loop keeps
//! going until its [`StopSignal`] is raised or the host runs out of ticks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::context::SceneContext;
use crate::scene::Scene;
use crate::viewport::camera::PerspectiveCamera;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    pub index: u64,
    /// Seconds since the previous tick
    pub dt: f32,
}

/// Something that paces frames (display refresh, a test counter)
pub trait TickSource {
    /// Wait for the next frame; `None` once the source is exhausted
    fn next_tick(&mut self) -> Option<FrameTick>;
}

/// Draws a scene as seen from a camera
pub trait SceneRenderer {
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera);
}

/// Shared flag that ends a running [`FrameLoop`]
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct FrameLoop {
    frames: u64,
    stop: StopSignal,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one frame. Returns `false` without rendering once stopped.
    pub fn tick(&mut self, ctx: &mut SceneContext, renderer: &mut impl SceneRenderer) -> bool {
        if self.stop.is_raised() {
            return false;
        }
        ctx.controls.update(&mut ctx.camera);
        renderer.render(&ctx.scene, &ctx.camera);
        ctx.scene.clear_material_updates();
        self.frames += 1;
        true
    }

    /// Render one frame per tick until stopped or the source is exhausted.
    ///
    /// Returns the number of frames rendered by this call.
    pub fn run(
        &mut self,
        ctx: &mut SceneContext,
        ticks: &mut impl TickSource,
        renderer: &mut impl SceneRenderer,
    ) -> u64 {
        let start = self.frames;
        while !self.stop.is_raised() {
            let Some(tick) = ticks.next_tick() else { break };
            tracing::trace!("Frame {} (dt={:.4})", tick.index, tick.dt);
            self.tick(ctx, renderer);
        }
        let rendered = self.frames - start;
        tracing::debug!("Frame loop finished after {rendered} frames");
        rendered
    }
}

/// A fixed number of evenly spaced ticks
#[derive(Debug, Clone)]
pub struct FixedTicks {
    remaining: u64,
    next: u64,
    dt: f32,
}

impl FixedTicks {
    pub fn new(count: u64, dt: f32) -> Self {
        Self {
            remaining: count,
            next: 0,
            dt,
        }
    }

    /// Effectively endless; for loops ended by their stop signal
    pub fn endless(dt: f32) -> Self {
        Self::new(u64::MAX, dt)
    }
}

impl TickSource for FixedTicks {
    fn next_tick(&mut self) -> Option<FrameTick> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let tick = FrameTick {
            index: self.next,
            dt: self.dt,
        };
        self.next += 1;
        Some(tick)
    }
}
