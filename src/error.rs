// Copyright (c) 2026 rezky_nightky

use thiserror::Error;

/// Failures reported by [`crate::effect::RainBackgroundEffect::initialize`].
///
/// None of these are raised once the effect is running; drawing problems
/// during a tick are absorbed and counted instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EffectError {
    #[error("no drawable surface is available at the mount point")]
    SurfaceUnavailable,
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("effect instance was already started; create a fresh instance to run again")]
    AlreadyStarted,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrawError {
    #[error("surface is detached")]
    Detached,
    #[error("draw failed: {0}")]
    Backend(String),
}
