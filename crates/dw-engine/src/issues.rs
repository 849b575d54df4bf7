//! Validation findings reported by the engine services.

use std::fmt;

use dw_core::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    VelocityTooHigh,
    VelocityHigh,
    CapacityExceeded,
}

impl IssueCode {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCode::VelocityTooHigh => "VELOCITY_TOO_HIGH",
            IssueCode::VelocityHigh => "VELOCITY_HIGH",
            IssueCode::CapacityExceeded => "CAPACITY_EXCEEDED",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub entity_id: EntityId,
    #[serde(rename = "type")]
    pub severity: Severity,
    pub code: IssueCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn error(entity_id: impl Into<EntityId>, code: IssueCode, message: String) -> Self {
        Self::new(entity_id, Severity::Error, code, message)
    }

    pub fn warning(entity_id: impl Into<EntityId>, code: IssueCode, message: String) -> Self {
        Self::new(entity_id, Severity::Warning, code, message)
    }

    fn new(
        entity_id: impl Into<EntityId>,
        severity: Severity,
        code: IssueCode,
        message: String,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            severity,
            code,
            message,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        write!(f, "{level}[{}] {}: {}", self.code, self.entity_id, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_severity_as_type() {
        let issue = ValidationIssue::warning("d1", IssueCode::VelocityHigh, "fast".to_string())
            .with_suggestion("upsize");
        let json = serde_json::to_string(&issue).unwrap();
        assert!(json.contains("\"type\":\"warning\""));
        assert!(json.contains("\"code\":\"VELOCITY_HIGH\""));
        assert!(json.contains("\"entityId\":\"d1\""));
        assert_eq!(issue.to_string(), "warning[VELOCITY_HIGH] d1: fast (upsize)");
    }
}
