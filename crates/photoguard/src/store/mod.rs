//! Typed respondent state: phone identity, latest result, an in-progress run,
//! and the respondent's saved doctor and pharmacist contacts.
//!
//! `JsonFileStore` plays the role browser local storage played for the web
//! client: one best-effort JSON document rewritten on every mutation.

mod doctors;
mod file;
mod phone;

pub use doctors::{ContactRole, DoctorContact, DoctorDetails, InvalidDoctorContact};
pub use file::JsonFileStore;
pub use phone::{InvalidPhoneNumber, PhoneNumber};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::assessment::{Answer, AssessmentResult};

/// Summary of a completed assessment kept for the home and status screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub yes_count: u32,
    pub scorable_count: u32,
    pub tier_key: String,
    pub tier_label: String,
    pub is_urgent: bool,
    pub completed_at: DateTime<Utc>,
}

impl AssessmentRecord {
    pub fn from_result(result: &AssessmentResult, completed_at: DateTime<Utc>) -> Self {
        Self {
            yes_count: result.yes_count,
            scorable_count: result.scorable_count,
            tier_key: result.tier.key.clone(),
            tier_label: result.tier.label.clone(),
            is_urgent: result.tier.is_urgent,
            completed_at,
        }
    }
}

/// Persisted document shared by every store implementation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<PhoneNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_assessment: Option<AssessmentRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub progress: Vec<Answer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub doctors: Vec<DoctorContact>,
}

impl PersistedState {
    fn doctors_for(&self, owner: &PhoneNumber) -> Vec<DoctorContact> {
        doctors::owned_by(&self.doctors, owner).cloned().collect()
    }

    /// Callers validate `details` first.
    fn insert_doctor(
        &mut self,
        owner: &PhoneNumber,
        details: DoctorDetails,
        added_at: DateTime<Utc>,
    ) -> DoctorContact {
        let contact = DoctorContact {
            id: doctors::next_contact_id(&self.doctors),
            owner_phone: owner.clone(),
            added_at,
            details,
        };
        self.doctors.push(contact.clone());
        contact
    }

    fn remove_doctor(&mut self, owner: &PhoneNumber, id: &str) -> bool {
        let before = self.doctors.len();
        self.doctors
            .retain(|contact| !(contact.id == id && &contact.owner_phone == owner));
        self.doctors.len() != before
    }
}

/// Typed accessors over process-wide respondent state.
pub trait StateStore: Send + Sync {
    fn phone_number(&self) -> Result<Option<PhoneNumber>, StoreError>;
    fn set_phone_number(&self, phone: PhoneNumber) -> Result<(), StoreError>;
    fn clear_phone_number(&self) -> Result<(), StoreError>;
    fn latest_assessment(&self) -> Result<Option<AssessmentRecord>, StoreError>;
    fn record_assessment(&self, record: AssessmentRecord) -> Result<(), StoreError>;
    fn saved_progress(&self) -> Result<Vec<Answer>, StoreError>;
    fn save_progress(&self, answers: &[Answer]) -> Result<(), StoreError>;
    fn clear_progress(&self) -> Result<(), StoreError>;
    /// Contacts saved by `owner`, oldest first.
    fn doctors(&self, owner: &PhoneNumber) -> Result<Vec<DoctorContact>, StoreError>;
    fn add_doctor(
        &self,
        owner: &PhoneNumber,
        details: DoctorDetails,
    ) -> Result<DoctorContact, StoreError>;
    /// Returns `false` when `owner` has no contact with that id.
    fn remove_doctor(&self, owner: &PhoneNumber, id: &str) -> Result<bool, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("state store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("state document is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("state store unavailable: {0}")]
    Unavailable(String),
    #[error("invalid contact: {0}")]
    InvalidContact(#[from] InvalidDoctorContact),
}

/// Volatile store for the HTTP service and tests.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Mutex<PersistedState>,
}

impl MemoryStateStore {
    pub fn snapshot(&self) -> PersistedState {
        self.state.lock().expect("state mutex poisoned").clone()
    }

    fn with_state<T>(&self, apply: impl FnOnce(&mut PersistedState) -> T) -> T {
        let mut guard = self.state.lock().expect("state mutex poisoned");
        apply(&mut guard)
    }
}

impl StateStore for MemoryStateStore {
    fn phone_number(&self) -> Result<Option<PhoneNumber>, StoreError> {
        Ok(self.with_state(|state| state.phone_number.clone()))
    }

    fn set_phone_number(&self, phone: PhoneNumber) -> Result<(), StoreError> {
        self.with_state(|state| state.phone_number = Some(phone));
        Ok(())
    }

    fn clear_phone_number(&self) -> Result<(), StoreError> {
        self.with_state(|state| state.phone_number = None);
        Ok(())
    }

    fn latest_assessment(&self) -> Result<Option<AssessmentRecord>, StoreError> {
        Ok(self.with_state(|state| state.latest_assessment.clone()))
    }

    fn record_assessment(&self, record: AssessmentRecord) -> Result<(), StoreError> {
        self.with_state(|state| state.latest_assessment = Some(record));
        Ok(())
    }

    fn saved_progress(&self) -> Result<Vec<Answer>, StoreError> {
        Ok(self.with_state(|state| state.progress.clone()))
    }

    fn save_progress(&self, answers: &[Answer]) -> Result<(), StoreError> {
        self.with_state(|state| state.progress = answers.to_vec());
        Ok(())
    }

    fn clear_progress(&self) -> Result<(), StoreError> {
        self.with_state(|state| state.progress.clear());
        Ok(())
    }

    fn doctors(&self, owner: &PhoneNumber) -> Result<Vec<DoctorContact>, StoreError> {
        Ok(self.with_state(|state| state.doctors_for(owner)))
    }

    fn add_doctor(
        &self,
        owner: &PhoneNumber,
        details: DoctorDetails,
    ) -> Result<DoctorContact, StoreError> {
        details.validate()?;
        Ok(self.with_state(|state| state.insert_doctor(owner, details, Utc::now())))
    }

    fn remove_doctor(&self, owner: &PhoneNumber, id: &str) -> Result<bool, StoreError> {
        Ok(self.with_state(|state| state.remove_doctor(owner, id)))
    }
}
