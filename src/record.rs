use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ComposeError;

/// One ordered label/value pair of the metadata block at the top of a record.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetadataPair {
    pub label: String,
    pub value: Option<String>,
}

/// A photo attachment as the record declares it: a source reference to hand to the
/// image fetcher plus an optional caption. The natural pixel size is only known once
/// the bytes have been fetched and decoded.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttachment {
    pub reference: String,
    pub caption: Option<String>,
}

/// One row of the work-task sub-table of a safety-job analysis.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkTask {
    pub description: String,
    pub hazards: Option<String>,
    pub measures: Option<String>,
}

/// One chemical product listed by a safety-job analysis.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChemicalProduct {
    pub name: String,
    pub hazard_statement: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviationRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub metadata: Vec<MetadataPair>,
    pub description: Option<String>,
    pub immediate_action: Option<String>,
    pub corrective_action: Option<String>,
    #[serde(default)]
    pub attachments: Vec<ImageAttachment>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub metadata: Vec<MetadataPair>,
    pub description: Option<String>,
    pub reason: Option<String>,
    pub consequence: Option<String>,
    #[serde(default)]
    pub attachments: Vec<ImageAttachment>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SafetyJobAnalysisRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub metadata: Vec<MetadataPair>,
    pub description: Option<String>,
    #[serde(default)]
    pub work_tasks: Vec<WorkTask>,
    #[serde(default)]
    pub chemical_products: Vec<ChemicalProduct>,
    #[serde(default)]
    pub attachments: Vec<ImageAttachment>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessmentRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub metadata: Vec<MetadataPair>,
    pub description: Option<String>,
    /// The assessed probability, on the 1 to 5 axis of the risk matrix.
    pub probability: u8,
    /// The assessed severity, on the 1 to 5 axis of the risk matrix.
    pub severity: u8,
    pub mitigation: Option<String>,
    #[serde(default)]
    pub attachments: Vec<ImageAttachment>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReportRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub metadata: Vec<MetadataPair>,
    /// The aggregated sub-records, rendered in exactly the supplied order.
    #[serde(default)]
    pub sub_records: Vec<Record>,
}

/// A structured business record to be rendered into a document. The records arrive as
/// JSON from the originating web application, tagged with their kind; an unknown kind
/// fails parsing and is fatal for the whole call.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "recordKind", rename_all = "camelCase")]
pub enum Record {
    Deviation(DeviationRecord),
    Change(ChangeRecord),
    SafetyJobAnalysis(SafetyJobAnalysisRecord),
    RiskAssessment(RiskAssessmentRecord),
    ProjectReport(ProjectReportRecord),
}

impl Record {
    /// Read a record from a JSON file.
    pub fn from_path(record_path: &PathBuf) -> Result<Record, ComposeError> {
        let record_content = std::fs::read_to_string(record_path).map_err(|error| {
            ComposeError::record_invalid(format!(
                "Unable to read the record {:?}: {}",
                record_path, error
            ))
        })?;
        Record::from_json(&record_content)
    }

    /// Parse a record from its JSON representation.
    pub fn from_json(record_content: &str) -> Result<Record, ComposeError> {
        let record: Record = serde_json::from_str(record_content).map_err(|error| {
            ComposeError::record_invalid(format!("Unable to parse the record: {}", error))
        })?;
        record.validate()?;

        Ok(record)
    }

    /// The tag of the record kind, as it appears in the JSON format and in the output
    /// filename.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Record::Deviation(_) => "deviation",
            Record::Change(_) => "change",
            Record::SafetyJobAnalysis(_) => "safetyJobAnalysis",
            Record::RiskAssessment(_) => "riskAssessment",
            Record::ProjectReport(_) => "projectReport",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Record::Deviation(record) => &record.id,
            Record::Change(record) => &record.id,
            Record::SafetyJobAnalysis(record) => &record.id,
            Record::RiskAssessment(record) => &record.id,
            Record::ProjectReport(record) => &record.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Record::Deviation(record) => &record.title,
            Record::Change(record) => &record.title,
            Record::SafetyJobAnalysis(record) => &record.title,
            Record::RiskAssessment(record) => &record.title,
            Record::ProjectReport(record) => &record.title,
        }
    }

    /// Check the shape constraints that make a record renderable at all. Violations are
    /// fatal: unlike a missing photo there is no sensible fallback for a record with an
    /// empty identifier or a risk value outside the matrix.
    pub fn validate(&self) -> Result<(), ComposeError> {
        if self.id().trim().is_empty() {
            return Err(ComposeError::record_invalid(
                "The record identifier is empty",
            ));
        }

        match self {
            Record::RiskAssessment(record) => {
                for (axis, value) in [
                    ("probability", record.probability),
                    ("severity", record.severity),
                ] {
                    if !(1..=5).contains(&value) {
                        return Err(ComposeError::record_invalid(format!(
                            "The {} {} falls outside the 1 to 5 range of the risk matrix",
                            axis, value
                        )));
                    }
                }
            }
            Record::ProjectReport(record) => {
                for sub_record in &record.sub_records {
                    if matches!(sub_record, Record::ProjectReport(_)) {
                        return Err(ComposeError::record_invalid(
                            "A project report cannot aggregate another project report",
                        ));
                    }
                    sub_record.validate()?;
                }
            }
            _ => {}
        }

        Ok(())
    }
}
