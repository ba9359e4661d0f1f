//! Member Model

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// On-disk birthday format (e.g. `01-06-1990`)
pub const BIRTHDAY_FORMAT: &str = "%d-%m-%Y";

/// Alternate birthday input format accepted from clients (ISO)
pub const BIRTHDAY_ISO_FORMAT: &str = "%Y-%m-%d";

/// On-disk joined timestamp format (e.g. `2024-12-20 10:30`)
pub const JOINED_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Member entity (教区成员)
///
/// Optional text fields are written as `""` when absent, never `null`.
/// Every field defaults on read so that documents written by older admin
/// panels (no `id`, sometimes no `joined`) still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// 0 means "not yet assigned" (legacy record)
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, with = "empty_as_none")]
    pub email: Option<String>,
    #[serde(default, with = "empty_as_none")]
    pub address: Option<String>,
    /// `DD-MM-YYYY`
    #[serde(default)]
    pub birthday: String,
    /// Photo store reference
    #[serde(default, with = "empty_as_none")]
    pub photo: Option<String>,
    #[serde(default, with = "joined_format")]
    pub joined: Option<NaiveDateTime>,
}

impl Member {
    /// Parsed birthday, `None` if the stored text is not a real date
    pub fn birthday_date(&self) -> Option<NaiveDate> {
        parse_birthday(&self.birthday)
    }
}

/// Create member payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberCreate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub birthday: String,
    #[serde(default)]
    pub photo: Option<String>,
}

/// Update member payload
///
/// Absent fields keep their current value; `Some("")` clears an optional
/// field. `id` and `joined` are not part of the payload, so clients that send
/// them have them dropped during deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub birthday: Option<String>,
    pub photo: Option<String>,
}

/// Parse a birthday in `DD-MM-YYYY` (canonical) or `YYYY-MM-DD` form.
///
/// Impossible dates such as `30-02-2000` yield `None`.
pub fn parse_birthday(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, BIRTHDAY_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, BIRTHDAY_ISO_FORMAT))
        .ok()
}

/// Canonical on-disk text for a birthday
pub fn format_birthday(date: NaiveDate) -> String {
    date.format(BIRTHDAY_FORMAT).to_string()
}

mod empty_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(d)?;
        Ok(value.filter(|v| !v.trim().is_empty()))
    }
}

mod joined_format {
    use super::JOINED_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => s.serialize_str(&ts.format(JOINED_FORMAT).to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDateTime::parse_from_str(raw, JOINED_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid joined timestamp '{raw}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_birthday_formats() {
        assert_eq!(
            parse_birthday("01-06-1990"),
            NaiveDate::from_ymd_opt(1990, 6, 1)
        );
        assert_eq!(
            parse_birthday("1990-06-01"),
            NaiveDate::from_ymd_opt(1990, 6, 1)
        );
        assert_eq!(
            parse_birthday(" 29-02-2000 "),
            NaiveDate::from_ymd_opt(2000, 2, 29)
        );
    }

    #[test]
    fn test_parse_birthday_rejects_impossible_dates() {
        assert!(parse_birthday("30-02-2000").is_none());
        assert!(parse_birthday("29-02-2001").is_none());
        assert!(parse_birthday("31-04-1999").is_none());
        assert!(parse_birthday("").is_none());
        assert!(parse_birthday("not a date").is_none());
    }

    #[test]
    fn test_legacy_record_loads() {
        // Record without id, as older directory files have it
        let json = r#"{
            "name": "John Doe",
            "phone": "08012345678",
            "email": "",
            "address": "",
            "birthday": "05-01-1980",
            "photo": "",
            "joined": "2024-12-20 10:30"
        }"#;
        let member: Member = serde_json::from_str(json).unwrap();
        assert_eq!(member.id, 0);
        assert_eq!(member.email, None);
        assert_eq!(member.photo, None);
        assert_eq!(
            member.joined,
            NaiveDate::from_ymd_opt(2024, 12, 20).and_then(|d| d.and_hms_opt(10, 30, 0))
        );
        assert_eq!(member.birthday_date(), NaiveDate::from_ymd_opt(1980, 1, 5));
    }

    #[test]
    fn test_absent_fields_serialize_as_empty_strings() {
        let member = Member {
            id: 42,
            name: "Ada".into(),
            phone: "123".into(),
            email: None,
            address: Some("1 Church Road".into()),
            birthday: "01-01-2000".into(),
            photo: None,
            joined: None,
        };
        let json = serde_json::to_value(&member).unwrap();
        assert_eq!(json["email"], "");
        assert_eq!(json["photo"], "");
        assert_eq!(json["joined"], "");
        assert_eq!(json["address"], "1 Church Road");
        assert!(!json.to_string().contains("null"));
    }

    #[test]
    fn test_update_payload_drops_immutable_fields() {
        let json = r#"{"name": "New", "id": 99, "joined": "1999-01-01 00:00"}"#;
        let patch: MemberUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(patch.name.as_deref(), Some("New"));
        assert!(patch.phone.is_none());
    }

    #[test]
    fn test_bad_joined_is_rejected() {
        let json = r#"{"name": "A", "phone": "1", "birthday": "01-01-2000", "joined": "yesterday"}"#;
        assert!(serde_json::from_str::<Member>(json).is_err());
    }
}
