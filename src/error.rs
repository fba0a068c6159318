//! Error types.
//!
//! Per-frame operations never fail; everything here is raised while loading
//! configuration or reading a recorded keypoint stream.

use std::path::PathBuf;

use thiserror::Error;

/// A posture template that can never be evaluated as written.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
    #[error("template has an empty name")]
    EmptyName,

    #[error("invalid template '{template}': unknown joint '{joint}'")]
    UnknownJoint { template: String, joint: String },

    #[error("invalid template '{template}': no joint targets")]
    NoTargets { template: String },

    #[error("invalid template '{template}': tolerance must be a positive number, got {tolerance}")]
    Tolerance { template: String, tolerance: f32 },

    #[error("invalid template '{template}': target for {joint} must be within 0..=180 degrees, got {degrees}")]
    Target {
        template: String,
        joint: String,
        degrees: f32,
    },

    #[error("invalid template '{template}': min_confidence must be within 0..=1, got {value}")]
    MinConfidence { template: String, value: f32 },

    #[error("duplicate template name '{0}'")]
    Duplicate(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    InvalidTemplate(#[from] TemplateError),

    #[error("tick_interval_ms must be greater than zero")]
    TickInterval,
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read frame stream: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: malformed frame: {source}")]
    Frame {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
