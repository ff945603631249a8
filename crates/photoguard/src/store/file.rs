use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use chrono::Utc;

use super::{
    AssessmentRecord, DoctorContact, DoctorDetails, PersistedState, PhoneNumber, StateStore,
    StoreError,
};
use crate::assessment::Answer;

/// JSON document store rewritten on every mutation.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: Mutex<PersistedState>,
}

impl JsonFileStore {
    /// Opens the document at `path`; a missing file is treated as empty state.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => PersistedState::default(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == ErrorKind::NotFound => PersistedState::default(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read<T>(&self, view: impl FnOnce(&PersistedState) -> T) -> Result<T, StoreError> {
        let guard = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("state mutex poisoned".to_string()))?;
        Ok(view(&guard))
    }

    fn write<T>(&self, apply: impl FnOnce(&mut PersistedState) -> T) -> Result<T, StoreError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("state mutex poisoned".to_string()))?;
        let outcome = apply(&mut guard);

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let encoded = serde_json::to_vec_pretty(&*guard)?;
        fs::write(&self.path, encoded)?;
        debug!(path = %self.path.display(), "state document written");
        Ok(outcome)
    }
}

impl StateStore for JsonFileStore {
    fn phone_number(&self) -> Result<Option<PhoneNumber>, StoreError> {
        self.read(|state| state.phone_number.clone())
    }

    fn set_phone_number(&self, phone: PhoneNumber) -> Result<(), StoreError> {
        self.write(|state| state.phone_number = Some(phone))
    }

    fn clear_phone_number(&self) -> Result<(), StoreError> {
        self.write(|state| state.phone_number = None)
    }

    fn latest_assessment(&self) -> Result<Option<AssessmentRecord>, StoreError> {
        self.read(|state| state.latest_assessment.clone())
    }

    fn record_assessment(&self, record: AssessmentRecord) -> Result<(), StoreError> {
        self.write(|state| state.latest_assessment = Some(record))
    }

    fn saved_progress(&self) -> Result<Vec<Answer>, StoreError> {
        self.read(|state| state.progress.clone())
    }

    fn save_progress(&self, answers: &[Answer]) -> Result<(), StoreError> {
        self.write(|state| state.progress = answers.to_vec())
    }

    fn clear_progress(&self) -> Result<(), StoreError> {
        self.write(|state| state.progress.clear())
    }

    fn doctors(&self, owner: &PhoneNumber) -> Result<Vec<DoctorContact>, StoreError> {
        self.read(|state| state.doctors_for(owner))
    }

    fn add_doctor(
        &self,
        owner: &PhoneNumber,
        details: DoctorDetails,
    ) -> Result<DoctorContact, StoreError> {
        details.validate()?;
        self.write(|state| state.insert_doctor(owner, details, Utc::now()))
    }

    fn remove_doctor(&self, owner: &PhoneNumber, id: &str) -> Result<bool, StoreError> {
        self.write(|state| state.remove_doctor(owner, id))
    }
}
