use thiserror::Error;

/// Первое незаполненное поле формы.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} is required")]
pub struct ValidationError {
    pub field: String,
}

/// Checks `(label, value)` pairs in the given order and stops at the first
/// empty value. Whitespace-only values count as present.
pub fn validate_required(fields: &[(&str, &str)]) -> Result<(), ValidationError> {
    match fields.iter().find(|(_, value)| value.is_empty()) {
        Some((label, _)) => Err(ValidationError {
            field: (*label).to_string(),
        }),
        None => Ok(()),
    }
}
