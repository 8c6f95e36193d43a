//! Job posting records and the field concatenation shared by training and inference.

use serde::{Deserialize, Serialize};

use crate::error::{DetectorError, Result};

/// Field order used to build the combined text. Training and inference must agree on it.
pub const FIELD_ORDER: [&str; 5] = [
    "title",
    "company_profile",
    "description",
    "requirements",
    "benefits",
];

/// A complete job posting. All five text fields are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company_profile: String,
    pub description: String,
    pub requirements: String,
    pub benefits: String,
}

impl JobPosting {
    /// Fields joined by a single space in [`FIELD_ORDER`]. No trimming or case folding.
    #[must_use]
    pub fn combined_text(&self) -> String {
        combine_fields([
            self.title.as_str(),
            self.company_profile.as_str(),
            self.description.as_str(),
            self.requirements.as_str(),
            self.benefits.as_str(),
        ])
    }
}

fn combine_fields(fields: [&str; 5]) -> String {
    fields.join(" ")
}

/// A posting as received from a caller, where any field may be absent or null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPosting {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company_profile: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub benefits: Option<String>,
}

impl RawPosting {
    /// Reports the first absent field in [`FIELD_ORDER`].
    pub fn validate(self) -> Result<JobPosting> {
        fn require(value: Option<String>, field: &'static str) -> Result<String> {
            value.ok_or(DetectorError::MissingField(field))
        }

        Ok(JobPosting {
            title: require(self.title, "title")?,
            company_profile: require(self.company_profile, "company_profile")?,
            description: require(self.description, "description")?,
            requirements: require(self.requirements, "requirements")?,
            benefits: require(self.benefits, "benefits")?,
        })
    }

    pub fn combined_text(self) -> Result<String> {
        self.validate().map(|posting| posting.combined_text())
    }
}

impl TryFrom<RawPosting> for JobPosting {
    type Error = DetectorError;

    fn try_from(raw: RawPosting) -> Result<Self> {
        raw.validate()
    }
}

impl From<JobPosting> for RawPosting {
    fn from(posting: JobPosting) -> Self {
        Self {
            title: Some(posting.title),
            company_profile: Some(posting.company_profile),
            description: Some(posting.description),
            requirements: Some(posting.requirements),
            benefits: Some(posting.benefits),
        }
    }
}
