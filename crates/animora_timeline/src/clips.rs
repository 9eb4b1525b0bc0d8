// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in clip behaviors.

use crate::clip::{ClipBehavior, EvaluateContext};
use crate::clock::PlayDirection;
use crate::error::ClipError;
use std::cell::Cell;
use std::rc::Rc;

/// Logs every lifecycle callback through `tracing`
#[derive(Debug, Clone, Default)]
pub struct TracingClip {
    /// Label used in log lines
    pub label: String,
}

impl TracingClip {
    /// Create a tracing clip
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl ClipBehavior for TracingClip {
    fn enter(&mut self) -> Result<(), ClipError> {
        tracing::info!("[{}] enter", self.label);
        Ok(())
    }

    fn exit(&mut self) -> Result<(), ClipError> {
        tracing::info!("[{}] exit", self.label);
        Ok(())
    }

    fn on_evaluate(&mut self, ctx: &EvaluateContext) -> Result<(), ClipError> {
        tracing::trace!(
            "[{}] t={:.3} clip_t={:.3} n={:.3}{}",
            self.label,
            ctx.time,
            ctx.clip_time,
            ctx.normalized_time,
            if ctx.is_previewing { " (preview)" } else { "" }
        );
        Ok(())
    }

    fn on_start_loop(&mut self, loop_index: u32, direction: PlayDirection, _is_previewing: bool) -> Result<(), ClipError> {
        tracing::debug!("[{}] loop {} started {:?}", self.label, loop_index, direction);
        Ok(())
    }

    fn on_complete_loop(&mut self, loop_index: u32, _is_previewing: bool) -> Result<(), ClipError> {
        tracing::debug!("[{}] loop {} complete", self.label, loop_index);
        Ok(())
    }

    fn on_stop(&mut self) -> Result<(), ClipError> {
        tracing::info!("[{}] stopped", self.label);
        Ok(())
    }

    fn duplicate(&self) -> Option<Box<dyn ClipBehavior>> {
        Some(Box::new(self.clone()))
    }
}

/// Drives a shared float from `from` to `to` across the clip
#[derive(Debug, Clone, Default)]
pub struct ValueClip {
    /// Value at normalized time 0
    pub from: f32,
    /// Value at normalized time 1
    pub to: f32,
    /// Where the value is written
    pub target: Option<Rc<Cell<f32>>>,
}

impl ValueClip {
    /// Create a value clip writing into `target`
    pub fn new(from: f32, to: f32, target: Rc<Cell<f32>>) -> Self {
        Self {
            from,
            to,
            target: Some(target),
        }
    }

    /// Value at normalized time `t`
    pub fn sample(&self, t: f32) -> f32 {
        self.from + (self.to - self.from) * t
    }
}

impl ClipBehavior for ValueClip {
    fn on_evaluate(&mut self, ctx: &EvaluateContext) -> Result<(), ClipError> {
        let target = self
            .target
            .as_ref()
            .ok_or_else(|| ClipError::new("value clip has no target"))?;
        target.set(self.sample(ctx.normalized_time));
        Ok(())
    }

    fn configuration_error(&self) -> Option<String> {
        if self.target.is_none() {
            Some("missing target reference".to_string())
        } else {
            None
        }
    }

    fn reset_to_defaults(&mut self) {
        *self = Self::default();
    }

    fn duplicate(&self) -> Option<Box<dyn ClipBehavior>> {
        Some(Box::new(self.clone()))
    }
}
