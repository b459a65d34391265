use crate::error::ToolError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::num::NonZeroU32;

/// A slide position as callers see it: 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlideNumber(NonZeroU32);

impl SlideNumber {
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(SlideNumber)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// The 0-based position in a produced sequence. This is the only place the
    /// two conventions meet.
    pub fn index(self) -> usize {
        usize::try_from(self.0.get() - 1).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for SlideNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn decode<T: DeserializeOwned>(args: &Value) -> Result<T, ToolError> {
    if !args.is_object() {
        return Err(ToolError::validation("arguments must be an object"));
    }
    serde_json::from_value(args.clone())
        .map_err(|err| ToolError::validation(format!("failed to parse input: {err}")))
}

/// Only the empty string counts as missing; whitespace is a legitimate value.
pub fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str, ToolError> {
    if value.is_empty() {
        return Err(ToolError::validation(format!("{field} is required")));
    }
    Ok(value)
}

pub fn require_slide_number(field: &str, value: Option<i64>) -> Result<SlideNumber, ToolError> {
    let Some(value) = value else {
        return Err(ToolError::validation(format!("{field} is required")));
    };
    parse_slide_number(field, value)
}

pub fn parse_slide_number(field: &str, value: i64) -> Result<SlideNumber, ToolError> {
    u32::try_from(value)
        .ok()
        .and_then(SlideNumber::new)
        .ok_or_else(|| ToolError::validation(format!("{field} must be >= 1 (got {value})")))
}

pub fn optional_text<'a>(field: &str, value: Option<&'a str>) -> Result<Option<&'a str>, ToolError> {
    match value {
        Some(value) if value.trim().is_empty() => {
            Err(ToolError::validation(format!("{field} must not be empty")))
        }
        other => Ok(other),
    }
}
