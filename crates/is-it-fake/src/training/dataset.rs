use std::{io::Read, path::Path};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    error::{DetectorError, Result},
    posting::{FIELD_ORDER, JobPosting},
};

pub const LABEL_COLUMN: &str = "fraudulent";

/// One labelled posting with its combined text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledPosting {
    pub text: String,
    pub fraudulent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub records: Vec<LabeledPosting>,
    /// Rows dropped for a missing field or an unusable label.
    pub dropped: usize,
}

/// Raw CSV row; empty cells and unparseable labels become `None`.
#[derive(Debug, Deserialize)]
struct DatasetRow {
    title: Option<String>,
    company_profile: Option<String>,
    description: Option<String>,
    requirements: Option<String>,
    benefits: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option")]
    fraudulent: Option<f64>,
}

impl DatasetRow {
    fn into_labeled(self) -> Option<LabeledPosting> {
        let fraudulent = match self.fraudulent? {
            v if v == 0.0 => false,
            v if v == 1.0 => true,
            _ => return None,
        };
        let posting = JobPosting {
            title: self.title?,
            company_profile: self.company_profile?,
            description: self.description?,
            requirements: self.requirements?,
            benefits: self.benefits?,
        };
        Some(LabeledPosting {
            text: posting.combined_text(),
            fraudulent,
        })
    }
}

impl Dataset {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading training dataset");
        let reader = csv::Reader::from_path(path)?;
        Self::from_csv(reader)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_csv(csv::Reader::from_reader(reader))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let headers = reader.headers()?.clone();
        let missing: Vec<&str> = FIELD_ORDER
            .iter()
            .copied()
            .chain(std::iter::once(LABEL_COLUMN))
            .filter(|column| !headers.iter().any(|h| h == *column))
            .collect();
        if !missing.is_empty() {
            return Err(DetectorError::TrainingDataInvalid(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )));
        }

        let mut records = Vec::new();
        let mut dropped = 0;
        for row in reader.deserialize::<DatasetRow>() {
            match row?.into_labeled() {
                Some(record) => records.push(record),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!(dropped, kept = records.len(), "Dropped incomplete dataset rows");
        }
        if records.is_empty() {
            return Err(DetectorError::TrainingDataInvalid(
                "no complete rows remain after dropping missing values".into(),
            ));
        }
        info!(rows = records.len(), "Dataset loaded");
        Ok(Self { records, dropped })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "job_id,title,company_profile,description,requirements,benefits,fraudulent\n";

    #[test]
    fn loads_complete_rows_and_combines_text() {
        let csv = format!("{HEADER}1,Clerk,Acme,Type things,None,Pay,1\n2,Dev,Corp,Code,Rust,Health,0\n");
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.dropped, 0);
        assert_eq!(dataset.records[0].text, "Clerk Acme Type things None Pay");
        assert!(dataset.records[0].fraudulent);
        assert!(!dataset.records[1].fraudulent);
    }

    #[test]
    fn drops_rows_with_missing_values_or_bad_labels() {
        let csv = format!(
            "{HEADER}1,Clerk,,Type,None,Pay,1\n2,Dev,Corp,Code,Rust,Health,\n3,Dev,Corp,Code,Rust,Health,maybe\n4,Dev,Corp,Code,Rust,Health,0\n"
        );
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.dropped, 3);
    }

    #[test]
    fn missing_column_fails_before_reading_rows() {
        let csv = "title,company_profile,description,requirements,fraudulent\nA,B,C,D,1\n";
        match Dataset::from_reader(csv.as_bytes()) {
            Err(DetectorError::TrainingDataInvalid(msg)) => assert!(msg.contains("benefits")),
            other => panic!("expected TrainingDataInvalid, got {other:?}"),
        }
    }

    #[test]
    fn all_rows_dropped_is_invalid() {
        let csv = format!("{HEADER}1,,,,,,\n");
        assert!(matches!(
            Dataset::from_reader(csv.as_bytes()),
            Err(DetectorError::TrainingDataInvalid(_))
        ));
    }
}
