use serde::{Deserialize, Serialize};
use std::fmt;

const PHONE_DIGITS: usize = 10;

/// Ten-digit phone number used as the respondent's local identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Strips every non-digit and requires exactly ten digits to remain.
    pub fn parse(raw: &str) -> Result<Self, InvalidPhoneNumber> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.len() == PHONE_DIGITS {
            Ok(Self(digits))
        } else {
            Err(InvalidPhoneNumber {
                digits: digits.len(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last four digits with the rest masked, for logs and status output.
    pub fn masked(&self) -> String {
        format!("******{}", &self.0[PHONE_DIGITS - 4..])
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = InvalidPhoneNumber;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Please enter a valid 10-digit phone number.")]
pub struct InvalidPhoneNumber {
    pub digits: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_formatting_characters() {
        let phone = PhoneNumber::parse("(987) 654-3210").expect("ten digits");
        assert_eq!(phone.as_str(), "9876543210");
        assert_eq!(phone.masked(), "******3210");
    }

    #[test]
    fn rejects_short_and_long_numbers() {
        assert_eq!(
            PhoneNumber::parse("98765"),
            Err(InvalidPhoneNumber { digits: 5 })
        );
        assert!(PhoneNumber::parse("+91 98765 43210").is_err());
    }

    #[test]
    fn deserialization_validates() {
        let parsed: Result<PhoneNumber, _> = serde_json::from_str("\"12345\"");
        assert!(parsed.is_err());
        let parsed: PhoneNumber = serde_json::from_str("\"9876543210\"").expect("valid");
        assert_eq!(parsed.to_string(), "9876543210");
    }
}
