use serde::{Deserialize, Serialize};

use crate::config::GateConfig;

use super::fields::FieldSet;
use super::gate::ReviewGate;
use super::set::{Requirement, ReviewSet};
use super::validation::Rule;

pub const IDENTITY_NUMBER: &str = "identity_number";
pub const ACCOUNT_HOLDER: &str = "account_holder";
pub const ACCOUNT_NUMBER: &str = "account_number";
pub const IFSC: &str = "ifsc";

const MIN_ACCOUNT_HOLDER_CHARS: usize = 3;

const KYC_FIELDS: [(&str, Rule); 4] = [
    (IDENTITY_NUMBER, Rule::PanOrAadhaar),
    (ACCOUNT_HOLDER, Rule::MinLength(MIN_ACCOUNT_HOLDER_CHARS)),
    (ACCOUNT_NUMBER, Rule::AccountNumber),
    (IFSC, Rule::Ifsc),
];

/// The screens that share the review gate, each with its own field rules and requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewProfile {
    /// Student identity and bank verification with at least one supporting document.
    Kyc,
    /// Provider verifying every document attached to one application.
    DocumentVerification,
    /// Reviewer working through a queue of application records.
    ApplicationReview,
}

impl ReviewProfile {
    pub fn requirement(self) -> Requirement {
        match self {
            ReviewProfile::Kyc => Requirement::AtLeast(1),
            ReviewProfile::DocumentVerification | ReviewProfile::ApplicationReview => {
                Requirement::AllItems
            }
        }
    }

    pub fn fields(self) -> FieldSet {
        match self {
            ReviewProfile::Kyc => FieldSet::from_rules(&KYC_FIELDS),
            ReviewProfile::DocumentVerification | ReviewProfile::ApplicationReview => {
                FieldSet::new()
            }
        }
    }

    pub fn gate(self, config: GateConfig) -> ReviewGate {
        ReviewGate::with_fields(
            self.fields(),
            ReviewSet::new(self.requirement()),
            config,
        )
    }
}
