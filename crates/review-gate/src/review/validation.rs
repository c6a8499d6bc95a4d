use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

const MIN_ACCOUNT_DIGITS: usize = 9;
const MAX_ACCOUNT_DIGITS: usize = 18;

/// Named format rule applied to a raw field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Rule {
    Pan,
    Aadhaar,
    PanOrAadhaar,
    Ifsc,
    AccountNumber,
    MinLength(usize),
}

impl Rule {
    fn label(self) -> &'static str {
        match self {
            Rule::Pan => "PAN",
            Rule::Aadhaar => "Aadhaar number",
            Rule::PanOrAadhaar => "PAN or Aadhaar number",
            Rule::Ifsc => "IFSC code",
            Rule::AccountNumber => "Account number",
            Rule::MinLength(_) => "Value",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Pan => f.write_str("PAN"),
            Rule::Aadhaar => f.write_str("AADHAAR"),
            Rule::PanOrAadhaar => f.write_str("PAN_OR_AADHAAR"),
            Rule::Ifsc => f.write_str("IFSC"),
            Rule::AccountNumber => f.write_str("ACCOUNT_NUMBER"),
            Rule::MinLength(n) => write!(f, "MIN_LENGTH({n})"),
        }
    }
}

/// Raised when a rule name is not part of the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown validation rule '{0}'")]
pub struct UnknownRule(pub String);

impl FromStr for Rule {
    type Err = UnknownRule;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let name: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        match name.as_str() {
            "PAN" => Ok(Rule::Pan),
            "AADHAAR" => Ok(Rule::Aadhaar),
            "PAN_OR_AADHAAR" => Ok(Rule::PanOrAadhaar),
            "IFSC" => Ok(Rule::Ifsc),
            "ACCOUNT_NUMBER" => Ok(Rule::AccountNumber),
            other => other
                .strip_prefix("MIN_LENGTH(")
                .and_then(|rest| rest.strip_suffix(')'))
                .and_then(|n| n.parse::<usize>().ok())
                .map(Rule::MinLength)
                .ok_or_else(|| UnknownRule(raw.to_string())),
        }
    }
}

impl TryFrom<String> for Rule {
    type Error = UnknownRule;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rule> for String {
    fn from(rule: Rule) -> Self {
        rule.to_string()
    }
}

/// Outcome of checking a raw value. Failures are data, so screens can render them inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    fn pass(normalized: String) -> Self {
        Self {
            valid: true,
            normalized_value: Some(normalized),
            error: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            normalized_value: None,
            error: Some(message.into()),
        }
    }
}

/// Check `raw` against `rule`.
pub fn validate(rule: Rule, raw: &str) -> ValidationResult {
    let result = match rule {
        Rule::Pan => check_pan(&strip_whitespace(raw)),
        Rule::Aadhaar => check_aadhaar(&strip_whitespace(raw)),
        Rule::PanOrAadhaar => check_pan_or_aadhaar(&strip_whitespace(raw)),
        Rule::Ifsc => check_ifsc(raw.trim()),
        Rule::AccountNumber => check_account_number(raw.trim()),
        Rule::MinLength(min) => check_min_length(raw.trim(), min),
    };
    debug!(%rule, valid = result.valid, "field validated");
    result
}

/// Look up a rule by name, reporting an unknown name as a failed result.
pub fn validate_named(rule_name: &str, raw: &str) -> ValidationResult {
    match rule_name.parse::<Rule>() {
        Ok(rule) => validate(rule, raw),
        Err(err) => ValidationResult::fail(err.to_string()),
    }
}

fn strip_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

fn required(rule: Rule) -> ValidationResult {
    ValidationResult::fail(format!("{} is required", rule.label()))
}

fn check_pan(value: &str) -> ValidationResult {
    if value.is_empty() {
        return required(Rule::Pan);
    }
    let chars: Vec<char> = value.chars().collect();
    let well_formed = chars.len() == 10
        && chars[..5].iter().all(char::is_ascii_alphabetic)
        && chars[5..9].iter().all(char::is_ascii_digit)
        && chars[9].is_ascii_alphabetic();

    if well_formed {
        ValidationResult::pass(value.to_ascii_uppercase())
    } else {
        ValidationResult::fail("Invalid PAN format")
    }
}

fn check_aadhaar(value: &str) -> ValidationResult {
    if value.is_empty() {
        return required(Rule::Aadhaar);
    }
    if value.len() == 12 && value.chars().all(|c| c.is_ascii_digit()) {
        ValidationResult::pass(value.to_string())
    } else {
        ValidationResult::fail("Invalid Aadhaar format")
    }
}

fn check_pan_or_aadhaar(value: &str) -> ValidationResult {
    match value.chars().count() {
        0 => required(Rule::PanOrAadhaar),
        10 => check_pan(value),
        12 => check_aadhaar(value),
        _ => ValidationResult::fail(
            "Enter a valid PAN (10 characters) or Aadhaar number (12 digits)",
        ),
    }
}

fn check_ifsc(value: &str) -> ValidationResult {
    if value.is_empty() {
        return required(Rule::Ifsc);
    }
    let chars: Vec<char> = value.chars().collect();
    let well_formed = chars.len() == 11
        && chars[..4].iter().all(char::is_ascii_alphabetic)
        && chars[4] == '0'
        && chars[5..].iter().all(char::is_ascii_alphanumeric);

    if well_formed {
        ValidationResult::pass(value.to_ascii_uppercase())
    } else {
        ValidationResult::fail("Invalid IFSC code")
    }
}

fn check_account_number(value: &str) -> ValidationResult {
    if value.is_empty() {
        return required(Rule::AccountNumber);
    }
    let digits_only = value.chars().all(|c| c.is_ascii_digit());
    if digits_only && (MIN_ACCOUNT_DIGITS..=MAX_ACCOUNT_DIGITS).contains(&value.len()) {
        ValidationResult::pass(value.to_string())
    } else {
        ValidationResult::fail(format!(
            "Account number must be {MIN_ACCOUNT_DIGITS} to {MAX_ACCOUNT_DIGITS} digits"
        ))
    }
}

fn check_min_length(value: &str, min: usize) -> ValidationResult {
    if value.chars().count() >= min {
        ValidationResult::pass(value.to_string())
    } else if value.is_empty() {
        required(Rule::MinLength(min))
    } else {
        ValidationResult::fail(format!("Must be at least {min} characters"))
    }
}
