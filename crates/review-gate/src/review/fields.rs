use serde::Serialize;

use super::item::ItemId;
use super::set::{BlockingReason, Readiness, ValidationError};
use super::validation::{validate, Rule, ValidationResult};

/// One session-level input (identity number, bank details) and the rule it must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionField {
    pub id: ItemId,
    pub rule: Rule,
    pub raw_value: String,
}

impl SessionField {
    pub fn validation(&self) -> ValidationResult {
        validate(self.rule, &self.raw_value)
    }
}

/// Required form fields checked before any document is considered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldSet {
    fields: Vec<SessionField>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields for a fixed table of distinct ids, all starting empty.
    pub(crate) fn from_rules(rules: &[(&str, Rule)]) -> Self {
        let fields = rules
            .iter()
            .map(|&(id, rule)| SessionField {
                id: ItemId::from(id),
                rule,
                raw_value: String::new(),
            })
            .collect();
        Self { fields }
    }

    pub fn register(&mut self, id: impl Into<ItemId>, rule: Rule) -> Result<(), ValidationError> {
        let id = id.into();
        if self.get(&id).is_some() {
            return Err(ValidationError::DuplicateItem(id));
        }
        self.fields.push(SessionField {
            id,
            rule,
            raw_value: String::new(),
        });
        Ok(())
    }

    /// Store the raw input and report how it fares against the field's rule.
    pub fn set_value(
        &mut self,
        id: &ItemId,
        raw_value: impl Into<String>,
    ) -> Result<ValidationResult, ValidationError> {
        let field = self
            .fields
            .iter_mut()
            .find(|field| &field.id == id)
            .ok_or_else(|| ValidationError::UnknownField(id.clone()))?;
        field.raw_value = raw_value.into();
        Ok(field.validation())
    }

    pub fn get(&self, id: &ItemId) -> Option<&SessionField> {
        self.fields.iter().find(|field| &field.id == id)
    }

    pub fn fields(&self) -> &[SessionField] {
        &self.fields
    }

    /// Normalized value of a field, when it currently validates.
    pub fn normalized(&self, id: &ItemId) -> Option<String> {
        self.get(id)
            .and_then(|field| field.validation().normalized_value)
    }

    /// `pending_count` is the number of fields still failing their rule.
    pub fn readiness(&self) -> Readiness {
        let reasons: Vec<BlockingReason> = self
            .fields
            .iter()
            .filter_map(|field| {
                let result = field.validation();
                (!result.valid).then(|| BlockingReason::InvalidField {
                    id: field.id.clone(),
                    message: result.error.unwrap_or_default(),
                })
            })
            .collect();
        Readiness::from_reasons(reasons.len(), reasons)
    }
}
