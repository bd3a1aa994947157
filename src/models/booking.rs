//! Booking data structures.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::utils::text::labeled_value;

/// Reservation platform a calendar was exported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "airbnb")]
    Airbnb,
    #[serde(rename = "booking.com")]
    BookingCom,
    /// Unrecognized source; generic extraction rules apply.
    #[default]
    #[serde(rename = "other", alias = "unknown")]
    Unknown,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Airbnb => "airbnb",
            Platform::BookingCom => "booking.com",
            Platform::Unknown => "other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "airbnb" => Ok(Platform::Airbnb),
            "booking.com" | "booking" | "bookingcom" => Ok(Platform::BookingCom),
            "other" | "unknown" => Ok(Platform::Unknown),
            other => Err(AppError::validation(format!("unknown platform '{other}'"))),
        }
    }
}

/// Booking status.
///
/// `Pending` exists for records created elsewhere; the parser never emits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Pending,
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A normalized booking built from one calendar event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Event UID, or a synthesized id when the source had none
    pub id: String,

    pub platform: Platform,

    /// Event location, or the platform's placeholder
    pub property_name: String,

    /// Never empty
    pub guest_name: String,

    /// Raw event description, kept for later re-extraction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// First night of the stay
    pub check_in_date: NaiveDate,

    /// Last night of the stay (inclusive)
    pub check_out_date: NaiveDate,

    pub status: BookingStatus,

    /// Event summary as exported, with TEXT escapes decoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_status: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Number of nights covered, counting both boundary dates.
    pub fn nights(&self) -> i64 {
        (self.check_out_date - self.check_in_date).num_days() + 1
    }

    /// Whether the stay covers the given day.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.check_in_date <= date && date <= self.check_out_date
    }

    /// Whether the stay touches any day in `[start, end]`.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.check_in_date <= end && start <= self.check_out_date
    }

    /// Blocked dates rather than a guest stay.
    pub fn is_blocked(&self) -> bool {
        if self.status == BookingStatus::Cancelled {
            return true;
        }
        let guest = self.guest_name.to_lowercase();
        guest.contains("block") || guest.contains("maintenance")
    }

    /// Structured sub-fields found in the description.
    pub fn description_fields(&self) -> DescriptionFields {
        self.description
            .as_deref()
            .map(DescriptionFields::parse)
            .unwrap_or_default()
    }

    /// Format booking for display using a template.
    ///
    /// Supported placeholders:
    /// - `{id}`, `{platform}`, `{property}`, `{guest}`, `{status}`
    /// - `{check_in}`, `{check_out}`, `{nights}`
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{id}", &self.id)
            .replace("{platform}", self.platform.as_str())
            .replace("{property}", &self.property_name)
            .replace("{guest}", &self.guest_name)
            .replace("{status}", &self.status.to_string())
            .replace("{check_in}", &self.check_in_date.to_string())
            .replace("{check_out}", &self.check_out_date.to_string())
            .replace("{nights}", &self.nights().to_string())
    }
}

const GUEST_LABEL: &str = "Guest";
const STATUS_LABEL: &str = "Status";
const RESERVATION_ID_LABEL: &str = "Reservation ID";
const PROPERTY_ID_LABEL: &str = "Property ID";
const RESERVATION_URL_LABEL: &str = "Reservation URL";
const PHONE_LABEL: &str = "Phone Number (Last 4 Digits)";

const KNOWN_LABELS: [&str; 6] = [
    GUEST_LABEL,
    STATUS_LABEL,
    RESERVATION_ID_LABEL,
    PROPERTY_ID_LABEL,
    RESERVATION_URL_LABEL,
    PHONE_LABEL,
];

/// Labeled fields some providers embed in event descriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionFields {
    pub guest: Option<String>,
    pub status: Option<String>,
    pub reservation_id: Option<String>,
    pub property_id: Option<String>,
    pub reservation_url: Option<String>,
    pub phone_last4: Option<String>,
}

impl DescriptionFields {
    /// Extract every known label. Missing labels stay `None`.
    pub fn parse(description: &str) -> Self {
        let field = |label: &str| {
            let stops: Vec<&str> = KNOWN_LABELS
                .iter()
                .copied()
                .filter(|other| *other != label)
                .collect();
            labeled_value(description, label, &stops)
        };

        Self {
            guest: field(GUEST_LABEL),
            // Status is a single word in every export seen so far.
            status: field(STATUS_LABEL)
                .and_then(|s| s.split_whitespace().next().map(str::to_string)),
            reservation_id: field(RESERVATION_ID_LABEL),
            property_id: field(PROPERTY_ID_LABEL),
            reservation_url: field(RESERVATION_URL_LABEL),
            phone_last4: field(PHONE_LABEL),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_booking() -> Booking {
        let ts = DateTime::parse_from_rfc3339("2025-07-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Booking {
            id: "X1".to_string(),
            platform: Platform::Airbnb,
            property_name: "Sea View".to_string(),
            guest_name: "Jane Doe".to_string(),
            description: Some("Guest: Jane Doe\nStatus: Confirmed".to_string()),
            check_in_date: NaiveDate::from_ymd_opt(2025, 7, 10).unwrap(),
            check_out_date: NaiveDate::from_ymd_opt(2025, 7, 12).unwrap(),
            status: BookingStatus::Confirmed,
            original_status: Some("Reserved".to_string()),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_format() {
        let booking = sample_booking();
        let result = booking.format("{check_in}..{check_out} {guest} [{platform}] {nights}n");
        assert_eq!(result, "2025-07-10..2025-07-12 Jane Doe [airbnb] 3n");
    }

    #[test]
    fn test_covers_and_overlaps() {
        let booking = sample_booking();
        let day = |d| NaiveDate::from_ymd_opt(2025, 7, d).unwrap();
        assert!(booking.covers(day(10)));
        assert!(booking.covers(day(12)));
        assert!(!booking.covers(day(13)));
        assert!(booking.overlaps(day(1), day(10)));
        assert!(!booking.overlaps(day(13), day(31)));
    }

    #[test]
    fn test_is_blocked() {
        let mut booking = sample_booking();
        assert!(!booking.is_blocked());
        booking.guest_name = "Maintenance".to_string();
        assert!(booking.is_blocked());
        booking.guest_name = "Jane".to_string();
        booking.status = BookingStatus::Cancelled;
        assert!(booking.is_blocked());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(sample_booking()).unwrap();
        assert_eq!(json["platform"], "airbnb");
        assert_eq!(json["checkInDate"], "2025-07-10");
        assert_eq!(json["checkOutDate"], "2025-07-12");
        assert_eq!(json["originalStatus"], "Reserved");
        assert_eq!(json["status"], "confirmed");
    }

    #[test]
    fn test_platform_from_str() {
        assert_eq!("Airbnb".parse::<Platform>().unwrap(), Platform::Airbnb);
        assert_eq!("booking.com".parse::<Platform>().unwrap(), Platform::BookingCom);
        assert_eq!("unknown".parse::<Platform>().unwrap(), Platform::Unknown);
        assert!("vrbo".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_unknown_alias() {
        let p: Platform = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(p, Platform::Unknown);
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"other\"");
    }

    #[test]
    fn test_description_fields() {
        let description = "Reservation URL: https://www.airbnb.com/hosting/reservations/details/HM123\n\
                           Phone Number (Last 4 Digits): 4321\n\
                           Guest: Jane Doe Reservation ID: HM123\n\
                           Status: Confirmed";
        let fields = DescriptionFields::parse(description);
        assert_eq!(fields.guest.as_deref(), Some("Jane Doe"));
        assert_eq!(fields.reservation_id.as_deref(), Some("HM123"));
        assert_eq!(fields.status.as_deref(), Some("Confirmed"));
        assert_eq!(fields.phone_last4.as_deref(), Some("4321"));
        assert_eq!(
            fields.reservation_url.as_deref(),
            Some("https://www.airbnb.com/hosting/reservations/details/HM123")
        );
        assert_eq!(fields.property_id, None);
    }

    #[test]
    fn test_description_fields_empty() {
        assert!(DescriptionFields::parse("Just a note").is_empty());
    }
}
