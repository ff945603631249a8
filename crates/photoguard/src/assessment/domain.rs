use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::controller::QuestionnaireError;

/// Distinguishes scorable prompts from supplementary media steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    YesNo,
    Attachment,
}

impl QuestionKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::YesNo => "Yes / No",
            Self::Attachment => "Attachment",
        }
    }
}

/// One assessment item. All scorable questions carry equal weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub index: usize,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub kind: QuestionKind,
}

impl Question {
    pub fn is_scorable(&self) -> bool {
        self.kind == QuestionKind::YesNo
    }
}

/// Opaque handle to supplementary media collected by an attachment step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentRef(pub String);

impl fmt::Display for AttachmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Respondent input for a single step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerValue {
    YesNo {
        value: bool,
    },
    Attachment {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reference: Option<AttachmentRef>,
    },
}

impl AnswerValue {
    pub const fn yes() -> Self {
        Self::YesNo { value: true }
    }

    pub const fn no() -> Self {
        Self::YesNo { value: false }
    }

    pub const fn acknowledged() -> Self {
        Self::Attachment { reference: None }
    }

    pub fn kind(&self) -> QuestionKind {
        match self {
            Self::YesNo { .. } => QuestionKind::YesNo,
            Self::Attachment { .. } => QuestionKind::Attachment,
        }
    }

    /// Interprets untyped input from the HTTP boundary.
    ///
    /// Booleans become yes/no answers, `null` an attachment acknowledgement and
    /// `{"attachment": "<ref>"}` an acknowledgement carrying a reference.
    pub fn from_json(raw: &Value) -> Result<Self, QuestionnaireError> {
        match raw {
            Value::Bool(value) => Ok(Self::YesNo { value: *value }),
            Value::Null => Ok(Self::acknowledged()),
            Value::Object(map) if map.len() == 1 => match map.get("attachment") {
                Some(Value::String(reference)) => Ok(Self::Attachment {
                    reference: Some(AttachmentRef(reference.clone())),
                }),
                Some(Value::Null) => Ok(Self::acknowledged()),
                _ => Err(QuestionnaireError::InvalidAnswer {
                    reason: "attachment reference must be a string".to_string(),
                }),
            },
            other => Err(QuestionnaireError::InvalidAnswer {
                reason: format!("expected a boolean or attachment acknowledgement, got {other}"),
            }),
        }
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        Self::YesNo { value }
    }
}

/// A recorded response. Never mutated after capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_index: usize,
    pub value: AnswerValue,
}

impl Answer {
    pub fn is_yes(&self) -> bool {
        matches!(self.value, AnswerValue::YesNo { value: true })
    }
}
