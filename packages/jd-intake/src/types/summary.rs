//! Summary types - the LLM port's input/output and the persisted aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::section::CanonicalSections;

/// Input to the LLM summarization port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeRequest {
    pub brand_name: String,
    pub position_name: String,

    /// Candidate position names the model may normalize against
    #[serde(default)]
    pub position_candidates: Vec<String>,

    /// Candidate category names the model may normalize against
    #[serde(default)]
    pub category_candidates: Vec<String>,

    pub sections: CanonicalSections,
}

/// Structured output of the LLM summarization port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmSummary {
    pub career_type: String,

    #[serde(default)]
    pub career_years: Option<String>,

    pub summary: String,

    pub responsibilities: Vec<String>,

    pub required_qualifications: Vec<String>,

    #[serde(default)]
    pub preferred_qualifications: Vec<String>,

    #[serde(default)]
    pub tech_stack: Vec<String>,

    #[serde(default)]
    pub recruitment_process: Vec<String>,
}

/// The persisted summary aggregate, written atomically with its outbox event
/// and the COMPLETED transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: Uuid,
    pub snapshot_id: Uuid,
    pub brand_name: String,
    pub position_name: String,
    pub career_type: String,
    pub career_years: Option<String>,
    pub summary: String,
    pub responsibilities: Vec<String>,
    pub required_qualifications: Vec<String>,
    pub preferred_qualifications: Vec<String>,
    pub tech_stack: Vec<String>,
    pub recruitment_process: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl JobSummary {
    /// Build the aggregate from a parsed LLM result.
    pub fn from_llm(
        snapshot_id: Uuid,
        brand_name: impl Into<String>,
        position_name: impl Into<String>,
        llm: LlmSummary,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            snapshot_id,
            brand_name: brand_name.into(),
            position_name: position_name.into(),
            career_type: llm.career_type,
            career_years: llm.career_years,
            summary: llm.summary,
            responsibilities: llm.responsibilities,
            required_qualifications: llm.required_qualifications,
            preferred_qualifications: llm.preferred_qualifications,
            tech_stack: llm.tech_stack,
            recruitment_process: llm.recruitment_process,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_summary_optional_fields_default() {
        let json = r#"{
            "career_type": "EXPERIENCED",
            "summary": "Backend role",
            "responsibilities": ["build services"],
            "required_qualifications": ["rust"]
        }"#;

        let parsed: LlmSummary = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.career_years, None);
        assert!(parsed.preferred_qualifications.is_empty());
        assert!(parsed.tech_stack.is_empty());
    }

    #[test]
    fn test_from_llm_carries_all_fields() {
        let llm = LlmSummary {
            career_type: "EXPERIENCED".into(),
            career_years: Some("3+".into()),
            summary: "Backend role".into(),
            responsibilities: vec!["build services".into()],
            required_qualifications: vec!["rust".into()],
            preferred_qualifications: vec!["postgres".into()],
            tech_stack: vec!["tokio".into()],
            recruitment_process: vec!["screen".into(), "interview".into()],
        };

        let snapshot_id = Uuid::new_v4();
        let summary = JobSummary::from_llm(snapshot_id, "Acme", "Backend Engineer", llm.clone());

        assert_eq!(summary.snapshot_id, snapshot_id);
        assert_eq!(summary.career_years.as_deref(), Some("3+"));
        assert_eq!(summary.recruitment_process, llm.recruitment_process);
    }
}
