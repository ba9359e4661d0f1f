//! Input validation helpers
//!
//! Centralized text length constants and the member field checks shared by
//! `add` and `update`. Every failing field is collected so the caller sees
//! the whole list at once.

use shared::models::{Member, format_birthday, parse_birthday};

use super::error::{DirectoryError, DirectoryResult};

// ── Text length limits ──────────────────────────────────────────────

/// Member names
pub const MAX_NAME_LEN: usize = 200;

/// Short identifiers: phone numbers
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Postal addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Photo references
pub const MAX_URL_LEN: usize = 2048;

// ── Field error collector ───────────────────────────────────────────

#[derive(Debug, Default)]
struct FieldErrors {
    errors: Vec<(&'static str, String)>,
}

impl FieldErrors {
    /// Required string: non-empty after trimming and within the length limit.
    fn required_text(&mut self, value: &str, field: &'static str, max_len: usize) {
        if value.trim().is_empty() {
            self.push(field, format!("{field} must not be empty"));
        } else if value.chars().count() > max_len {
            self.push(
                field,
                format!("{field} is too long ({} chars, max {max_len})", value.chars().count()),
            );
        }
    }

    /// Optional string, if present, within the length limit.
    fn optional_text(&mut self, value: &Option<String>, field: &'static str, max_len: usize) {
        if let Some(v) = value
            && v.chars().count() > max_len
        {
            self.push(
                field,
                format!("{field} is too long ({} chars, max {max_len})", v.chars().count()),
            );
        }
    }

    fn push(&mut self, field: &'static str, message: String) {
        self.errors.push((field, message));
    }

    fn into_result(self) -> DirectoryResult<()> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let (fields, messages): (Vec<_>, Vec<_>) = self
            .errors
            .into_iter()
            .map(|(field, msg)| (field.to_string(), msg))
            .unzip();
        Err(DirectoryError::Validation {
            fields,
            message: messages.join("; "),
        })
    }
}

// ── Normalisation ───────────────────────────────────────────────────

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim every text field, drop empty optionals and validate the result.
///
/// `id` and `joined` pass through untouched. On success the birthday is in
/// canonical `DD-MM-YYYY` form.
pub fn prepare_member(draft: Member) -> DirectoryResult<Member> {
    let mut member = Member {
        id: draft.id,
        name: draft.name.trim().to_string(),
        phone: draft.phone.trim().to_string(),
        email: normalize_optional(draft.email),
        address: normalize_optional(draft.address),
        birthday: draft.birthday.trim().to_string(),
        photo: normalize_optional(draft.photo),
        joined: draft.joined,
    };

    let mut errors = FieldErrors::default();
    errors.required_text(&member.name, "name", MAX_NAME_LEN);
    errors.required_text(&member.phone, "phone", MAX_SHORT_TEXT_LEN);
    errors.optional_text(&member.email, "email", MAX_EMAIL_LEN);
    errors.optional_text(&member.address, "address", MAX_ADDRESS_LEN);
    errors.optional_text(&member.photo, "photo", MAX_URL_LEN);

    if member.birthday.is_empty() {
        errors.push("birthday", "birthday must not be empty".to_string());
    } else {
        match parse_birthday(&member.birthday) {
            Some(date) => member.birthday = format_birthday(date),
            None => errors.push(
                "birthday",
                format!("birthday '{}' is not a valid calendar date", member.birthday),
            ),
        }
    }

    errors.into_result()?;
    Ok(member)
}
