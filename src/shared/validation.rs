//! Field validation rules
//!
//! Each rule is a plain function usable as a `validator` custom validator:
//! it receives the (already trimmed) value and fails with a `ValidationError`
//! whose code is the stable message key shown to users.
//!
//! | Field    | Keys                                                        |
//! |----------|-------------------------------------------------------------|
//! | name     | `nameShort`, `nameLong`, `nameInvalid`                      |
//! | email    | `emailInvalid`                                              |
//! | phone    | `phoneInvalid`                                              |
//! | username | `usernameShort`, `usernameLong`, `usernameInvalid`          |
//! | password | `passwordShort`, `passwordLong`, `passwordLetter`, `passwordDigit` |
//! | otp      | `otpLength`                                                 |
//! | chat     | `nameShort`, `nameLong`, `nameInvalid`                      |

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use validator::{ValidateEmail, ValidationError, ValidationErrors};

/// Person name: 5 to 100 characters containing two capitalised words
pub fn name(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < 5 {
        return Err(ValidationError::new("nameShort"));
    }
    if len > 100 {
        return Err(ValidationError::new("nameLong"));
    }
    if !has_capitalised_pair(value) {
        return Err(ValidationError::new("nameInvalid"));
    }
    Ok(())
}

/// Looks for `Upper lower+ <space> Upper lower+` anywhere in the value
fn has_capitalised_pair(value: &str) -> bool {
    let chars: Vec<char> = value.chars().collect();
    let capitalised_end = |start: usize| -> Option<usize> {
        if !chars.get(start)?.is_uppercase() {
            return None;
        }
        let mut end = start + 1;
        while chars.get(end).is_some_and(|c| c.is_lowercase()) {
            end += 1;
        }
        (end > start + 1).then_some(end)
    };

    (0..chars.len()).any(|i| match capitalised_end(i) {
        Some(end) => {
            chars.get(end).is_some_and(|c| c.is_whitespace()) && capitalised_end(end + 1).is_some()
        }
        None => false,
    })
}

pub fn email(value: &str) -> Result<(), ValidationError> {
    if value.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("emailInvalid"))
    }
}

/// Phone number in international format
pub fn phone(value: &str) -> Result<(), ValidationError> {
    normalize_phone(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("phoneInvalid"))
}

/// Strip separators and return the E.164 form (`+` and 8 to 15 digits)
pub fn normalize_phone(value: &str) -> Option<String> {
    let compact: String = value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();
    let digits = compact.strip_prefix('+')?;
    let valid = (8..=15).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0');
    valid.then(|| format!("+{}", digits))
}

pub fn username(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < 3 {
        return Err(ValidationError::new("usernameShort"));
    }
    if len > 30 {
        return Err(ValidationError::new("usernameLong"));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(ValidationError::new("usernameInvalid"));
    }
    Ok(())
}

pub fn password(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < 8 {
        return Err(ValidationError::new("passwordShort"));
    }
    if len > 50 {
        return Err(ValidationError::new("passwordLong"));
    }
    if !value.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::new("passwordLetter"));
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("passwordDigit"));
    }
    Ok(())
}

/// One-time password of exactly `len` characters
pub fn otp(value: &str, len: usize) -> Result<(), ValidationError> {
    if value.chars().count() == len {
        Ok(())
    } else {
        Err(ValidationError::new("otpLength"))
    }
}

/// Chat name: 1 to 50 characters of letters, digits, marks, spaces and `._-()+@!,`
pub fn chat_name(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len == 0 {
        return Err(ValidationError::new("nameShort"));
    }
    if len > 50 {
        return Err(ValidationError::new("nameLong"));
    }
    let allowed = |c: char| c.is_alphanumeric() || c.is_whitespace() || "._-()+@!,".contains(c);
    if !value.chars().all(allowed) {
        return Err(ValidationError::new("nameInvalid"));
    }
    Ok(())
}

/// Field errors of a submitted form, in the order they were found
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, Vec<String>>")]
pub struct FormErrors {
    fields: Vec<(String, Vec<String>)>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a form with a single failing field
    pub fn single(field: impl Into<String>, code: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, code);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, code: impl Into<String>) {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, codes)) => codes.push(code.into()),
            None => self.fields.push((field, vec![code.into()])),
        }
    }

    /// Run `rule` on `value` and record its failure under `field`
    pub fn check(&mut self, field: &str, value: &str, rule: impl Fn(&str) -> Result<(), ValidationError>) {
        if let Err(error) = rule(value) {
            self.add(field, error.code.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, codes)| codes.as_slice())
    }

    /// First error of the first failing field
    pub fn pick_error(&self) -> Option<&str> {
        self.fields
            .first()
            .and_then(|(_, codes)| codes.first())
            .map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Serialize for FormErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, codes) in &self.fields {
            map.serialize_entry(field, codes)?;
        }
        map.end()
    }
}

impl From<BTreeMap<String, Vec<String>>> for FormErrors {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            fields: map.into_iter().collect(),
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    /// Field order follows the field names alphabetically
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<(String, Vec<String>)> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let codes = errors.iter().map(|e| e.code.to_string()).collect();
                (field.to_string(), codes)
            })
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        Self { fields }
    }
}

/// Return the first error key of a form
pub fn pick_error(errors: &FormErrors) -> Option<&str> {
    errors.pick_error()
}
