//! Submission flow controllers for the appointment and contact forms.
//!
//! Each form owns its field state and a single status slot. A submit runs
//! `Idle → Submitting → Success | Failed`; the next edit or submit returns
//! the form to `Idle`. Every failure (bad date-time, transport, API) ends in
//! the status slot and never escapes the controller.

pub mod appointment;
pub mod datetime;
pub mod lead;

pub use appointment::*;
pub use datetime::*;
pub use lead::*;

use serde::Serialize;
use thiserror::Error;

use crate::gateway::GatewayError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmissionError {
    #[error("Invalid appointment date and time: '{0}'")]
    InvalidDateTime(String),

    #[error("Unknown form field: {0}")]
    UnknownField(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl SubmissionError {
    /// Text shown to the user: the server's message when it sent one,
    /// `fallback` otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Gateway(e) => e.server_message().unwrap_or(fallback).to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Kind of message currently shown for a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    #[default]
    None,
    Success,
    Error,
}

/// The single message slot of a form. Replaced wholesale on every attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SubmissionStatus {
    pub kind: StatusKind,
    pub text: String,
}

impl SubmissionStatus {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == StatusKind::Success
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

/// Lifecycle of one form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    #[default]
    Idle,
    Submitting,
    Success,
    Failed,
}

impl FormPhase {
    /// Phase after a field edit: any settled outcome goes back to `Idle`.
    fn after_edit(self) -> Self {
        match self {
            Self::Success | Self::Failed => Self::Idle,
            other => other,
        }
    }
}

/// Holds a form in `Submitting` for the span of one request.
///
/// If the submit future is dropped before `settle`, the form returns to
/// `Idle` so the next submit is not ignored.
struct InFlight<'a> {
    phase: &'a mut FormPhase,
}

impl<'a> InFlight<'a> {
    fn begin(phase: &'a mut FormPhase) -> Self {
        *phase = FormPhase::Submitting;
        Self { phase }
    }

    fn settle(self, outcome: FormPhase) {
        *self.phase = outcome;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if *self.phase == FormPhase::Submitting {
            tracing::debug!("Submission abandoned before completion");
            *self.phase = FormPhase::Idle;
        }
    }
}
