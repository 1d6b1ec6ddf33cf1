use anyhow::{Result, bail};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Stored and displayed with the shop's own labels; the English names parse too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize)]
pub enum AppointmentStatus {
    #[strum(to_string = "Beklemede", serialize = "pending")]
    #[serde(rename = "Beklemede")]
    Pending,
    #[strum(to_string = "Onaylandı", serialize = "confirmed")]
    #[serde(rename = "Onaylandı")]
    Confirmed,
    #[strum(to_string = "İptal Edildi", serialize = "cancelled")]
    #[serde(rename = "İptal Edildi")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Appointment {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub service: String,
    pub status: AppointmentStatus,
}

/// Booking request before it has an id. Always stored as pending.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub name: String,
    pub phone: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub service: String,
}

impl NewAppointment {
    /// Parses the date (`YYYY-MM-DD`) and time (`HH:MM`) and trims the text fields.
    pub fn parse(name: &str, phone: &str, date: &str, time: &str, service: &str) -> Result<Self> {
        let new = Self {
            name: name.trim().to_string(),
            phone: phone.trim().to_string(),
            date: NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
                .map_err(|e| anyhow::anyhow!("Invalid date '{}': {}", date, e))?,
            time: NaiveTime::parse_from_str(time.trim(), TIME_FORMAT)
                .map_err(|e| anyhow::anyhow!("Invalid time '{}': {}", time, e))?,
            service: service.trim().to_string(),
        };
        new.validate()?;
        Ok(new)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            bail!("Name must not be empty");
        }
        if self.phone.is_empty() {
            bail!("Phone must not be empty");
        }
        if self.service.is_empty() {
            bail!("Service must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn status_labels_round_trip() {
        for status in AppointmentStatus::iter() {
            assert_eq!(AppointmentStatus::from_str(&status.to_string()).unwrap(), status);
        }
        assert_eq!(AppointmentStatus::Pending.to_string(), "Beklemede");
        assert_eq!(
            AppointmentStatus::from_str("cancelled").unwrap(),
            AppointmentStatus::Cancelled
        );
        assert!(AppointmentStatus::from_str("done").is_err());
    }

    #[test]
    fn parses_new_appointment() {
        let a = NewAppointment::parse(" Ayşe ", "0555 000 00 00", "2024-05-01", "14:30", "Thai")
            .unwrap();
        assert_eq!(a.name, "Ayşe");
        assert_eq!(a.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(a.time, NaiveTime::from_hms_opt(14, 30, 0).unwrap());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(NewAppointment::parse("A", "1", "01/05/2024", "14:30", "Thai").is_err());
        assert!(NewAppointment::parse("A", "1", "2024-05-01", "25:00", "Thai").is_err());
        assert!(NewAppointment::parse("", "1", "2024-05-01", "10:00", "Thai").is_err());
        assert!(NewAppointment::parse("A", " ", "2024-05-01", "10:00", "Thai").is_err());
    }

    #[test]
    fn serializes_with_shop_labels() {
        let json = serde_json::to_string(&AppointmentStatus::Confirmed).unwrap();
        assert_eq!(json, "\"Onaylandı\"");
    }
}
