//! Submission validation and form encoding.
//!
//! A [`PendingSubmission`] can only be obtained from [`SubmissionForm::validate`]
//! (or [`crate::session::Session::begin`]), so a request that failed validation
//! has no fields to send.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::Ticket;

/// Engine value that only works on dynamic (time-indexed) models.
pub const PARTICLE_FILTER: &str = "ParticleFilter";

/// Marker whose presence makes a model "dynamic".
pub const DYNAMIC_MARKER: char = '@';

pub const FIELD_TEXT: &str = "textfield";
pub const FIELD_BASE: &str = "base";
pub const FIELD_ENGINE: &str = "eng";
pub const FIELD_ALGORITHM: &str = "alg";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("ParticleFilter can only be used to dynamic models!")]
    ParticleFilterNeedsDynamicModel,
}

/// Current editor text plus the three radio selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionForm {
    pub text: String,
    pub base: String,
    pub engine: String,
    pub algorithm: String,
}

impl SubmissionForm {
    pub fn new(
        text: impl Into<String>,
        base: impl Into<String>,
        engine: impl Into<String>,
        algorithm: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            base: base.into(),
            engine: engine.into(),
            algorithm: algorithm.into(),
        }
    }

    pub fn is_dynamic_model(&self) -> bool {
        self.text.contains(DYNAMIC_MARKER)
    }

    pub fn uses_particle_filter(&self) -> bool {
        self.engine == PARTICLE_FILTER
    }

    pub(crate) fn check(&self) -> Result<(), SubmitError> {
        if self.uses_particle_filter() && !self.is_dynamic_model() {
            return Err(SubmitError::ParticleFilterNeedsDynamicModel);
        }
        Ok(())
    }

    /// Validate outside of a session (ticket 0).
    pub fn validate(self) -> Result<PendingSubmission, SubmitError> {
        self.check()?;
        Ok(PendingSubmission {
            ticket: Ticket::default(),
            form: self,
        })
    }
}

/// A validated request, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub(crate) ticket: Ticket,
    pub(crate) form: SubmissionForm,
}

impl PendingSubmission {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn form(&self) -> &SubmissionForm {
        &self.form
    }

    /// Form fields in the order the backend documents them.
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            (FIELD_TEXT, self.form.text.as_str()),
            (FIELD_BASE, self.form.base.as_str()),
            (FIELD_ENGINE, self.form.engine.as_str()),
            (FIELD_ALGORITHM, self.form.algorithm.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATIC_MODEL: &str = "random Boolean A ~ BooleanDistrib(0.5);\nquery A;";
    const DYNAMIC_MODEL: &str = "random Real X(Timestep t) ~ Gaussian(0, 1);\nquery X(@3);";

    #[test]
    fn particle_filter_rejects_static_models() {
        let form = SubmissionForm::new(STATIC_MODEL, "1000", PARTICLE_FILTER, "default");
        assert_eq!(
            form.validate(),
            Err(SubmitError::ParticleFilterNeedsDynamicModel)
        );
    }

    #[test]
    fn rejection_message_matches_the_alert_text() {
        assert_eq!(
            SubmitError::ParticleFilterNeedsDynamicModel.to_string(),
            "ParticleFilter can only be used to dynamic models!"
        );
    }

    #[test]
    fn static_models_pass_with_other_engines() {
        for eng in ["LWSampler", "MHSampler", "RejectionSampler"] {
            let form = SubmissionForm::new(STATIC_MODEL, "1000", eng, "default");
            assert!(form.validate().is_ok(), "{eng}");
        }
    }

    #[test]
    fn dynamic_models_pass_with_every_engine_and_carry_all_fields() {
        for eng in ["LWSampler", "MHSampler", PARTICLE_FILTER] {
            let form = SubmissionForm::new(DYNAMIC_MODEL, "5000", eng, "swift");
            let pending = form.validate().expect("dynamic model");
            let fields = pending.fields();
            assert_eq!(fields[0], ("textfield", DYNAMIC_MODEL));
            assert_eq!(fields[1], ("base", "5000"));
            assert_eq!(fields[2], ("eng", eng));
            assert_eq!(fields[3], ("alg", "swift"));
        }
    }

    #[test]
    fn engine_match_is_exact() {
        let form = SubmissionForm::new(STATIC_MODEL, "1000", "particlefilter", "default");
        assert!(form.validate().is_ok());
    }
}
