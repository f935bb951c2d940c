//! Job snapshot - the persisted raw intake content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hashing::content_hash;
use crate::types::section::CanonicalSections;

/// Where the raw JD text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    Text,
    Image,
    Url,
}

impl SourceType {
    /// Stable string form for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Text => "TEXT",
            SourceType::Image => "IMAGE",
            SourceType::Url => "URL",
        }
    }

    /// Parse the stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TEXT" => Some(SourceType::Text),
            "IMAGE" => Some(SourceType::Image),
            "URL" => Some(SourceType::Url),
            _ => None,
        }
    }
}

/// Recruitment window advertised by the posting, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruitmentPeriod {
    pub opens_at: Option<DateTime<Utc>>,
    pub closes_at: Option<DateTime<Utc>>,
}

/// Raw intake content, keyed by its exact content hash.
///
/// Created once per distinct content and immutable afterwards. The
/// `content_hash` column carries a storage-level unique constraint; the
/// application-level pre-check alone would be racy under concurrency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: Uuid,

    /// Brand scope, optional at intake
    pub brand_id: Option<Uuid>,

    /// Position scope, optional at intake
    pub position_id: Option<Uuid>,

    pub source_type: SourceType,

    /// Source URL for scraped intakes
    pub source_url: Option<String>,

    /// Raw JD text as received
    pub raw_text: String,

    /// SHA-256 hex of `raw_text`, globally unique
    pub content_hash: String,

    /// Pre-cleaned section map
    pub sections: CanonicalSections,

    /// 64-bit SimHash fingerprint of the section map
    pub simhash: u64,

    pub recruitment: RecruitmentPeriod,

    pub created_at: DateTime<Utc>,
}

impl JobSnapshot {
    /// Create a snapshot from raw intake content.
    ///
    /// Computes the content hash; the SimHash fingerprint is set separately
    /// by whoever owns the calculator configuration.
    pub fn new(
        source_type: SourceType,
        raw_text: impl Into<String>,
        sections: CanonicalSections,
    ) -> Self {
        let raw_text = raw_text.into();
        let content_hash = content_hash(&raw_text);

        Self {
            id: Uuid::new_v4(),
            brand_id: None,
            position_id: None,
            source_type,
            source_url: None,
            raw_text,
            content_hash,
            sections,
            simhash: 0,
            recruitment: RecruitmentPeriod::default(),
            created_at: Utc::now(),
        }
    }

    /// Scope the snapshot to a brand.
    pub fn with_brand(mut self, brand_id: Uuid) -> Self {
        self.brand_id = Some(brand_id);
        self
    }

    /// Scope the snapshot to a position.
    pub fn with_position(mut self, position_id: Uuid) -> Self {
        self.position_id = Some(position_id);
        self
    }

    /// Record the scraped source URL.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Set the SimHash fingerprint.
    pub fn with_fingerprint(mut self, simhash: u64) -> Self {
        self.simhash = simhash;
        self
    }

    /// Set the recruitment window.
    pub fn with_recruitment(mut self, recruitment: RecruitmentPeriod) -> Self {
        self.recruitment = recruitment;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::section::JdSection;

    #[test]
    fn test_snapshot_hashes_raw_text() {
        let sections =
            CanonicalSections::new().set_lines(JdSection::Requirements, ["rust", "sql"]);
        let snapshot = JobSnapshot::new(SourceType::Text, "Backend engineer", sections);

        assert_eq!(snapshot.content_hash, content_hash("Backend engineer"));
        assert_eq!(snapshot.simhash, 0);
    }

    #[test]
    fn test_source_type_round_trip() {
        for st in [SourceType::Text, SourceType::Image, SourceType::Url] {
            assert_eq!(SourceType::parse(st.as_str()), Some(st));
        }
        assert_eq!(SourceType::parse("PDF"), None);
    }
}
