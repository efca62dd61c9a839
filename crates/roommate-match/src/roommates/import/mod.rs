mod parser;

use std::io::Read;
use std::path::Path;

use crate::roommates::preferences::{PreferenceRecord, ValidationError};
use crate::roommates::questionnaire::Questionnaire;
use crate::roommates::ranking::Candidate;

#[derive(Debug)]
pub enum CandidateImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumn(&'static str),
    UnknownColumn(String),
    MissingId { line: u64 },
    InvalidTimestamp { line: u64, value: String },
    InvalidScale {
        line: u64,
        question_id: String,
        value: String,
    },
    InvalidAnswer { line: u64, source: ValidationError },
}

impl std::fmt::Display for CandidateImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateImportError::Io(err) => write!(f, "failed to read candidate export: {}", err),
            CandidateImportError::Csv(err) => write!(f, "invalid candidate CSV data: {}", err),
            CandidateImportError::MissingColumn(column) => {
                write!(f, "candidate CSV is missing the '{}' column", column)
            }
            CandidateImportError::UnknownColumn(column) => {
                write!(f, "column '{}' is not a questionnaire question", column)
            }
            CandidateImportError::MissingId { line } => {
                write!(f, "line {}: candidate id is empty", line)
            }
            CandidateImportError::InvalidTimestamp { line, value } => write!(
                f,
                "line {}: '{}' is not an RFC 3339 timestamp or YYYY-MM-DD date",
                line, value
            ),
            CandidateImportError::InvalidScale {
                line,
                question_id,
                value,
            } => write!(
                f,
                "line {}: '{}' is not a scale value for '{}'",
                line, value, question_id
            ),
            CandidateImportError::InvalidAnswer { line, source } => {
                write!(f, "line {}: {}", line, source)
            }
        }
    }
}

impl std::error::Error for CandidateImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CandidateImportError::Io(err) => Some(err),
            CandidateImportError::Csv(err) => Some(err),
            CandidateImportError::InvalidAnswer { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CandidateImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CandidateImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loads a candidate pool from a CSV export with one column per question id.
///
/// Multi-select cells separate options with `|`. Rows without any answers become
/// candidates with no preference record.
pub struct CandidateImporter;

impl CandidateImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        questionnaire: &Questionnaire,
    ) -> Result<Vec<Candidate>, CandidateImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, questionnaire)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        questionnaire: &Questionnaire,
    ) -> Result<Vec<Candidate>, CandidateImportError> {
        parser::parse_rows(reader, questionnaire)?
            .into_iter()
            .map(|row| {
                let record = if row.answers.is_empty() {
                    None
                } else {
                    let record = PreferenceRecord::build(
                        row.id.clone(),
                        row.answers,
                        questionnaire,
                        row.created_at,
                    )
                    .map_err(|source| CandidateImportError::InvalidAnswer {
                        line: row.line,
                        source,
                    })?;
                    Some(record)
                };

                Ok(Candidate::new(row.id, row.created_at, record))
            })
            .collect()
    }
}
