/// Required-field validation over a `FormInput` snapshot.
///
/// Checks fail fast: the first unmet requirement wins and submission
/// halts with a single reason, matching the form's sequential error
/// toasts. The infrastructure list is deliberately not checked — it is
/// the one optional field.
use crate::form::FormInput;

/// Which required field was found empty. Ordered by check precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    LandArea,
    Population,
    Zoning,
    Goals,
    Budget,
}

impl MissingField {
    /// The user-facing reason reported through the notifier.
    pub fn message(self) -> &'static str {
        match self {
            Self::LandArea => "Please fill in the land area",
            Self::Population => "Please fill in the current population",
            Self::Zoning => "Please fill in the zoning",
            Self::Goals => "Please select at least one sustainability goal",
            Self::Budget => "Please fill in the development budget",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(MissingField),
}

pub fn validate(form: &FormInput) -> ValidationResult {
    if form.land_area().trim().is_empty() {
        return ValidationResult::Invalid(MissingField::LandArea);
    }
    if form.population().trim().is_empty() {
        return ValidationResult::Invalid(MissingField::Population);
    }
    if form.zoning().trim().is_empty() {
        return ValidationResult::Invalid(MissingField::Zoning);
    }
    if form.goals().is_empty() {
        return ValidationResult::Invalid(MissingField::Goals);
    }
    if form.budget().trim().is_empty() {
        return ValidationResult::Invalid(MissingField::Budget);
    }
    ValidationResult::Valid
}
