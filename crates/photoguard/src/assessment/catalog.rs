use super::controller::QuestionnaireError;
use super::domain::{Question, QuestionKind};

const SUNLIGHT_REACTION: &str = "Sunlight Reaction";
const MEDICATION: &str = "Medication";
const SKIN_HISTORY: &str = "Skin History";

const STANDARD_QUESTIONS: [(&str, &str); 15] = [
    (SUNLIGHT_REACTION, "Do you experience redness, burning, or a rash after being in sunlight?"),
    (SUNLIGHT_REACTION, "Do these symptoms occur only on sun-exposed areas (face, arms, neck)?"),
    (SUNLIGHT_REACTION, "Do the symptoms appear within a few hours of sunlight exposure?"),
    (SUNLIGHT_REACTION, "Does your skin itch or sting after short time in the sun?"),
    (SUNLIGHT_REACTION, "Does your skin react even under weak sunlight or through glass?"),
    (MEDICATION, "Have you started any new medication in the last few weeks?"),
    (MEDICATION, "Did the reaction start or worsen after taking that medicine?"),
    (
        MEDICATION,
        "Are you currently using any of these: antibiotics (like doxycycline), NSAIDs, amiodarone, thiazides, sulfa drugs?",
    ),
    (MEDICATION, "Do symptoms improve when the drug is stopped (under medical advice)?"),
    (SKIN_HISTORY, "Have you had similar sunlight reactions before?"),
    (SKIN_HISTORY, "Does your skin burn easily but rarely tan?"),
    (SKIN_HISTORY, "Do you have a family history of sunlight-triggered rashes?"),
    (SKIN_HISTORY, "Have you been told by a doctor you have sensitive or photosensitive skin?"),
    (SKIN_HISTORY, "Do you need to avoid sunlight because of your medicine or skin reaction?"),
    (SKIN_HISTORY, "Do you notice dark spots or peeling after sun exposure?"),
];

const PHOTO_STEP: (&str, &str) = (
    "Supporting Photo",
    "Upload a photo of the affected skin (optional).",
);

/// Blueprint for a question before its position is assigned.
#[derive(Debug, Clone)]
pub struct QuestionSpec {
    pub text: String,
    pub section: Option<String>,
    pub kind: QuestionKind,
}

impl QuestionSpec {
    pub fn yes_no(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            section: None,
            kind: QuestionKind::YesNo,
        }
    }

    pub fn attachment(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            section: None,
            kind: QuestionKind::Attachment,
        }
    }

    pub fn in_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }
}

/// Ordered, immutable catalog of assessment items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    pub fn new(specs: Vec<QuestionSpec>) -> Result<Self, QuestionnaireError> {
        if specs.is_empty() {
            return Err(QuestionnaireError::EmptyQuestionSet);
        }

        let questions = specs
            .into_iter()
            .enumerate()
            .map(|(index, spec)| Question {
                index,
                text: spec.text,
                section: spec.section,
                kind: spec.kind,
            })
            .collect();

        Ok(Self { questions })
    }

    /// The fifteen sectioned yes/no photosensitivity questions.
    pub fn standard() -> Self {
        Self {
            questions: standard_questions(),
        }
    }

    /// The standard questions followed by an optional photo attachment step.
    pub fn standard_with_photo_step() -> Self {
        let mut questions = standard_questions();
        let (section, text) = PHOTO_STEP;
        questions.push(Question {
            index: questions.len(),
            text: text.to_string(),
            section: Some(section.to_string()),
            kind: QuestionKind::Attachment,
        });
        Self { questions }
    }

    pub fn length(&self) -> usize {
        self.questions.len()
    }

    pub fn at(&self, index: usize) -> Result<&Question, QuestionnaireError> {
        self.questions
            .get(index)
            .ok_or(QuestionnaireError::OutOfRange {
                index,
                length: self.questions.len(),
            })
    }

    pub fn count_scorable(&self) -> usize {
        self.questions
            .iter()
            .filter(|question| question.is_scorable())
            .count()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Distinct section labels in order of first appearance.
    pub fn sections(&self) -> Vec<&str> {
        let mut sections: Vec<&str> = Vec::new();
        for section in self.questions.iter().filter_map(|q| q.section.as_deref()) {
            if !sections.contains(&section) {
                sections.push(section);
            }
        }
        sections
    }
}

fn standard_questions() -> Vec<Question> {
    STANDARD_QUESTIONS
        .iter()
        .enumerate()
        .map(|(index, (section, text))| Question {
            index,
            text: (*text).to_string(),
            section: Some((*section).to_string()),
            kind: QuestionKind::YesNo,
        })
        .collect()
}
