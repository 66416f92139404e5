use std::collections::BTreeMap;
use tokio::time::{Duration, Instant};

use super::error::FlowError;
use crate::utils::validation::FieldValidation;

/// How long an error banner stays visible
pub const BANNER_TTL: Duration = Duration::from_secs(5);

/// Screen lifecycle shared by every form controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Editing,
    Validating,
    Submitting,
    Success,
    Failed,
}

/// Result of pressing submit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// At least one field failed validation; nothing was sent
    Invalid,
    /// A submission was already running or had already succeeded
    Ignored,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Error,
    Success,
    Info,
}

/// Screen-level message
#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    expires_at: Option<Instant>,
}

impl Banner {
    /// Error banner that clears itself after `BANNER_TTL`
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            message: message.into(),
            expires_at: Some(Instant::now() + BANNER_TTL),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            message: message.into(),
            expires_at: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Info,
            message: message.into(),
            expires_at: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Per-field errors, banner and lifecycle state of one form.
///
/// A field is re-checked on edit only while it already shows an error;
/// submit checks every field.
#[derive(Debug, Clone)]
pub struct FormState<F> {
    state: FlowState,
    errors: BTreeMap<F, String>,
    banner: Option<Banner>,
}

impl<F: Copy + Ord> Default for FormState<F> {
    fn default() -> Self {
        Self {
            state: FlowState::Editing,
            errors: BTreeMap::new(),
            banner: None,
        }
    }
}

impl<F: Copy + Ord> FormState<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn is_submit_enabled(&self) -> bool {
        !matches!(self.state, FlowState::Submitting | FlowState::Success)
    }

    pub fn error(&self, field: F) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Current field errors in field order
    pub fn errors(&self) -> impl Iterator<Item = (F, &str)> {
        self.errors.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// Visible banner, if any has not expired yet
    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref().filter(|banner| !banner.is_expired())
    }

    pub fn show_banner(&mut self, banner: Banner) {
        self.banner = Some(banner);
    }

    /// A field value changed
    pub fn edited(&mut self, field: F, check: impl FnOnce() -> FieldValidation) {
        if self.state == FlowState::Failed {
            self.state = FlowState::Editing;
        }

        if self.errors.contains_key(&field) {
            self.record(field, check());
        }
    }

    /// Store the outcome of checking `field`
    pub fn record(&mut self, field: F, result: FieldValidation) {
        if result.valid {
            self.errors.remove(&field);
        } else {
            self.errors.insert(field, result.message);
        }
    }

    /// Enter `Validating`; false when a submit must be ignored
    pub fn begin_submit(&mut self) -> bool {
        if !self.is_submit_enabled() {
            return false;
        }
        self.state = FlowState::Validating;
        true
    }

    /// Apply the full check from a submit; true moves the form to `Submitting`
    pub fn finish_validation(&mut self, results: impl IntoIterator<Item = (F, FieldValidation)>) -> bool {
        for (field, result) in results {
            self.record(field, result);
        }

        if self.errors.is_empty() {
            self.banner = None;
            self.state = FlowState::Submitting;
            true
        } else {
            self.state = FlowState::Editing;
            false
        }
    }

    pub fn succeed(&mut self, banner: Option<Banner>) {
        self.state = FlowState::Success;
        self.banner = banner;
    }

    /// Move to `Failed` showing `error`, and hand the error back
    pub fn fail(&mut self, error: FlowError) -> FlowError {
        self.state = FlowState::Failed;
        self.banner = Some(Banner::error(error.to_string()));
        error
    }
}
