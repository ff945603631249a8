use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::PhoneNumber;

const MAX_EXPERIENCE_YEARS: u8 = 50;
const CONTACT_ID_PREFIX: &str = "doc-";

/// Kind of care provider a saved contact represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactRole {
    Doctor,
    Pharmacist,
}

impl ContactRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Doctor => "Doctor",
            Self::Pharmacist => "Pharmacist",
        }
    }
}

impl fmt::Display for ContactRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ContactRole {
    type Err = InvalidDoctorContact;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "doctor" | "dr" => Ok(Self::Doctor),
            "pharmacist" | "pharmacy" => Ok(Self::Pharmacist),
            other => Err(InvalidDoctorContact::UnknownRole(other.to_string())),
        }
    }
}

/// Everything the respondent enters about a doctor or pharmacist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorDetails {
    pub role: ContactRole,
    pub name: String,
    pub store_name: String,
    pub specialty: String,
    pub experience_years: u8,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub qualifications: String,
}

impl DoctorDetails {
    /// Every text field is required and experience is capped at fifty years.
    pub fn validate(&self) -> Result<(), InvalidDoctorContact> {
        let required = [
            ("name", &self.name),
            ("store_name", &self.store_name),
            ("specialty", &self.specialty),
            ("location", &self.location),
            ("email", &self.email),
            ("phone", &self.phone),
            ("qualifications", &self.qualifications),
        ];
        let blank = required
            .into_iter()
            .find(|(_, value)| value.trim().is_empty());
        if let Some((field, _)) = blank {
            return Err(InvalidDoctorContact::MissingField(field));
        }

        if self.experience_years > MAX_EXPERIENCE_YEARS {
            return Err(InvalidDoctorContact::ExperienceOutOfRange(self.experience_years));
        }

        match self.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(InvalidDoctorContact::InvalidEmail(self.email.clone())),
        }
    }
}

/// A saved contact, visible only to the phone number that added it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorContact {
    pub id: String,
    pub owner_phone: PhoneNumber,
    pub added_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: DoctorDetails,
}

impl DoctorContact {
    pub fn display_name(&self) -> String {
        match self.details.role {
            ContactRole::Doctor => format!("Dr. {}", self.details.name),
            ContactRole::Pharmacist => self.details.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidDoctorContact {
    #[error("`{0}` is required")]
    MissingField(&'static str),
    #[error("experience of {0} years is outside 0-50")]
    ExperienceOutOfRange(u8),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("unknown contact role '{0}' (use doctor or pharmacist)")]
    UnknownRole(String),
}

pub(crate) fn owned_by<'a>(
    contacts: &'a [DoctorContact],
    owner: &'a PhoneNumber,
) -> impl Iterator<Item = &'a DoctorContact> + 'a {
    contacts
        .iter()
        .filter(move |contact| &contact.owner_phone == owner)
}

pub(crate) fn next_contact_id(contacts: &[DoctorContact]) -> String {
    let highest = contacts
        .iter()
        .filter_map(|contact| contact.id.strip_prefix(CONTACT_ID_PREFIX))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{CONTACT_ID_PREFIX}{:04}", highest + 1)
}

#[cfg(test)]
pub(crate) fn sample_details(name: &str) -> DoctorDetails {
    DoctorDetails {
        role: ContactRole::Doctor,
        name: name.to_string(),
        store_name: "Sunrise Skin Clinic".to_string(),
        specialty: "Dermatology".to_string(),
        experience_years: 12,
        location: "Pune, Maharashtra".to_string(),
        email: "clinic@example.com".to_string(),
        phone: "020-5550-1234".to_string(),
        qualifications: "MBBS, MD (Dermatology)".to_string(),
    }
}
