use chrono::NaiveDateTime;

/// Формат, в котором браузер присылает дату из `<input type="datetime-local">`.
pub const STORED_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Формат даты на страницах: 12-часовые часы, всегда две цифры.
pub const DISPLAY_DATETIME_FORMAT: &str = "%Y-%m-%d %I:%M %p";

/// Builds the URL identifier for a display name: lowercase, spaces become
/// hyphens, everything else is kept as is.
///
/// No uniqueness check: "Go Night" and "go night" map to the same identifier.
pub fn derive_id(name: &str) -> String {
    name.replace(' ', "-").to_lowercase()
}

/// `2015-03-04T18:30` -> `2015-03-04 06:30 PM`.
pub fn normalize_for_display(raw: &str) -> Result<String, chrono::ParseError> {
    let parsed = NaiveDateTime::parse_from_str(raw, STORED_DATETIME_FORMAT)?;
    Ok(parsed.format(DISPLAY_DATETIME_FORMAT).to_string())
}
