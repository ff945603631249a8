use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// One row of the triage table: an inclusive yes-count band and its guidance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDefinition {
    pub key: String,
    pub lower_bound: u32,
    pub upper_bound: u32,
    pub label: String,
    pub guidance_text: String,
    #[serde(default)]
    pub recommended_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions_heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions_note: Option<String>,
    #[serde(default)]
    pub is_urgent: bool,
}

impl TierDefinition {
    pub fn contains(&self, yes_count: u32) -> bool {
        self.lower_bound <= yes_count && yes_count <= self.upper_bound
    }

    pub fn range_label(&self) -> String {
        if self.lower_bound == self.upper_bound {
            format!("{} Yes answers", self.lower_bound)
        } else {
            format!("{}–{} Yes answers", self.lower_bound, self.upper_bound)
        }
    }
}

/// Reasons a tier table fails to partition `[0, scorable]`.
#[derive(Debug, thiserror::Error)]
pub enum TierTableError {
    #[error("tier table has no rows")]
    Empty,
    #[error("tier '{key}' has lower bound {lower} above upper bound {upper}")]
    InvertedBounds { key: String, lower: u32, upper: u32 },
    #[error("first tier '{key}' starts at {lower} instead of 0")]
    DoesNotStartAtZero { key: String, lower: u32 },
    #[error("gap between tier '{before}' (ends at {end}) and tier '{after}' (starts at {start})")]
    Gap {
        before: String,
        end: u32,
        after: String,
        start: u32,
    },
    #[error("tier '{after}' overlaps tier '{before}' at yes-count {at}")]
    Overlap {
        before: String,
        after: String,
        at: u32,
    },
    #[error("tier table ends at {covered} but {expected} scorable questions must be covered")]
    DoesNotCover { covered: u32, expected: u32 },
    #[error("failed to read tier table: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tier table: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validated, ascending triage table covering every yes-count exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TierTable {
    tiers: Vec<TierDefinition>,
}

impl TierTable {
    pub fn new(mut tiers: Vec<TierDefinition>, scorable: u32) -> Result<Self, TierTableError> {
        tiers.sort_by_key(|tier| tier.lower_bound);
        validate_partition(&tiers, scorable)?;
        Ok(Self { tiers })
    }

    /// Canonical three-stage photosensitivity table.
    ///
    /// Boundaries are fixed for the fifteen-question assessment; any other
    /// scorable count is rejected.
    pub fn standard(scorable: u32) -> Result<Self, TierTableError> {
        Self::new(standard_tiers(), scorable)
    }

    pub fn from_json_reader<R: Read>(reader: R, scorable: u32) -> Result<Self, TierTableError> {
        let tiers: Vec<TierDefinition> = serde_json::from_reader(reader)?;
        Self::new(tiers, scorable)
    }

    pub fn from_json_path(path: &Path, scorable: u32) -> Result<Self, TierTableError> {
        let file = File::open(path)?;
        Self::from_json_reader(BufReader::new(file), scorable)
    }

    pub fn tiers(&self) -> &[TierDefinition] {
        &self.tiers
    }

    /// Highest yes-count the table covers.
    pub fn covered_max(&self) -> u32 {
        self.tiers.last().map(|tier| tier.upper_bound).unwrap_or(0)
    }

    /// First tier in ascending order whose band contains `yes_count`.
    pub fn find(&self, yes_count: u32) -> Option<&TierDefinition> {
        self.tiers.iter().find(|tier| tier.contains(yes_count))
    }
}

fn validate_partition(tiers: &[TierDefinition], scorable: u32) -> Result<(), TierTableError> {
    let first = tiers.first().ok_or(TierTableError::Empty)?;

    for tier in tiers {
        if tier.lower_bound > tier.upper_bound {
            return Err(TierTableError::InvertedBounds {
                key: tier.key.clone(),
                lower: tier.lower_bound,
                upper: tier.upper_bound,
            });
        }
    }

    if first.lower_bound != 0 {
        return Err(TierTableError::DoesNotStartAtZero {
            key: first.key.clone(),
            lower: first.lower_bound,
        });
    }

    for pair in tiers.windows(2) {
        let (before, after) = (&pair[0], &pair[1]);
        if after.lower_bound <= before.upper_bound {
            return Err(TierTableError::Overlap {
                before: before.key.clone(),
                after: after.key.clone(),
                at: after.lower_bound,
            });
        }
        if after.lower_bound > before.upper_bound + 1 {
            return Err(TierTableError::Gap {
                before: before.key.clone(),
                end: before.upper_bound,
                after: after.key.clone(),
                start: after.lower_bound,
            });
        }
    }

    let covered = tiers.last().map(|tier| tier.upper_bound).unwrap_or(0);
    if covered != scorable {
        return Err(TierTableError::DoesNotCover {
            covered,
            expected: scorable,
        });
    }

    Ok(())
}

fn standard_tiers() -> Vec<TierDefinition> {
    vec![
        TierDefinition {
            key: "mild".to_string(),
            lower_bound: 0,
            upper_bound: 5,
            label: "Stage 1 (Mild Photosensitivity Risk)".to_string(),
            guidance_text: "Your risk appears mild. Focus on daily broad-spectrum SPF 30+, protective clothing, and avoiding peak sun hours (10 AM - 4 PM). Monitor your skin for changes.".to_string(),
            recommended_actions: vec![
                "Aloe vera gel / Aloe lotion - Soothes irritated skin (use fragrance-free)".to_string(),
                "Calamine lotion - Reduces itching and redness (apply 2-3 times daily)".to_string(),
                "Moisturizers with ceramides - Repairs skin barrier (good for dryness/peeling)".to_string(),
                "0.5–1% Hydrocortisone cream - Reduces inflammation, redness, itching (short-term use only - 3-5 days)".to_string(),
            ],
            actions_heading: Some("Topical Options (Over-the-counter)".to_string()),
            actions_note: Some(
                "These can help with sunburn-like symptoms, itching, redness, and inflammation."
                    .to_string(),
            ),
            is_urgent: false,
        },
        TierDefinition {
            key: "moderate".to_string(),
            lower_bound: 6,
            upper_bound: 10,
            label: "Stage 2 (Moderate Photosensitivity)".to_string(),
            guidance_text: "You show signs of moderate photosensitivity. Strict sun avoidance and wearing UV-protective clothing (UPF rated) are essential. Consult a dermatologist to review medications or conditions.".to_string(),
            recommended_actions: vec![
                "Cetirizine - 10 mg once daily (non-sedating antihistamine)".to_string(),
                "Loratadine - 10 mg once daily (non-drowsy)".to_string(),
            ],
            actions_heading: Some(
                "Oral OTC Options (for itching or allergic-type reaction)".to_string(),
            ),
            actions_note: Some(
                "These antihistamines help if the photosensitivity has an allergic or rash component."
                    .to_string(),
            ),
            is_urgent: false,
        },
        TierDefinition {
            key: "severe".to_string(),
            lower_bound: 11,
            upper_bound: 15,
            label: "Stage 3 (Severe Photosensitivity)".to_string(),
            guidance_text: "Your responses indicate severe photosensitivity or a high likelihood of a photo-induced condition. You must minimize sun exposure. Seek immediate consultation with a healthcare professional to identify and manage the underlying cause.".to_string(),
            recommended_actions: vec![
                "Fexofenadine - 120-180 mg once daily (stronger option for itching)".to_string(),
                "Diphenhydramine (Benadryl) - 25 mg at night (causes drowsiness - avoid driving)".to_string(),
            ],
            actions_heading: Some(
                "Oral OTC Options (for itching or allergic-type reaction)".to_string(),
            ),
            actions_note: Some(
                "These antihistamines help if the photosensitivity has an allergic or rash component."
                    .to_string(),
            ),
            is_urgent: true,
        },
    ]
}
