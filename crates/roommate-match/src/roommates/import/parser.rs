use chrono::{DateTime, NaiveDate, Utc};
use csv::StringRecord;
use std::io::Read;

use super::CandidateImportError;
use crate::roommates::preferences::{Answer, OptionValue, OwnerId, PreferenceAnswers};
use crate::roommates::questionnaire::{AnswerType, Question, Questionnaire};

pub(crate) const ID_COLUMN: &str = "Candidate ID";
pub(crate) const CREATED_COLUMN: &str = "Created At";
const MULTI_SEPARATOR: char = '|';

#[derive(Debug)]
pub(crate) struct CandidateRow {
    pub(crate) line: u64,
    pub(crate) id: OwnerId,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) answers: PreferenceAnswers,
}

enum Column<'q> {
    Id,
    CreatedAt,
    Answer(&'q Question),
}

pub(crate) fn parse_rows<R: Read>(
    reader: R,
    questionnaire: &Questionnaire,
) -> Result<Vec<CandidateRow>, CandidateImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = map_columns(&headers, questionnaire)?;

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        rows.push(parse_row(&record, &columns, line)?);
    }

    Ok(rows)
}

fn map_columns<'q>(
    headers: &StringRecord,
    questionnaire: &'q Questionnaire,
) -> Result<Vec<Column<'q>>, CandidateImportError> {
    let columns = headers
        .iter()
        .map(|header| {
            if header.eq_ignore_ascii_case(ID_COLUMN) {
                Ok(Column::Id)
            } else if header.eq_ignore_ascii_case(CREATED_COLUMN) {
                Ok(Column::CreatedAt)
            } else {
                questionnaire
                    .question(header)
                    .map(Column::Answer)
                    .ok_or_else(|| CandidateImportError::UnknownColumn(header.to_string()))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    if !columns.iter().any(|column| matches!(column, Column::Id)) {
        return Err(CandidateImportError::MissingColumn(ID_COLUMN));
    }
    if !columns.iter().any(|column| matches!(column, Column::CreatedAt)) {
        return Err(CandidateImportError::MissingColumn(CREATED_COLUMN));
    }

    Ok(columns)
}

fn parse_row(
    record: &StringRecord,
    columns: &[Column<'_>],
    line: u64,
) -> Result<CandidateRow, CandidateImportError> {
    let mut id = None;
    let mut created_at = None;
    let mut answers = PreferenceAnswers::new();

    for (column, cell) in columns.iter().zip(record.iter()) {
        match column {
            Column::Id => {
                if !cell.is_empty() {
                    id = Some(OwnerId::new(cell));
                }
            }
            Column::CreatedAt => {
                let parsed = parse_datetime(cell).ok_or_else(|| {
                    CandidateImportError::InvalidTimestamp {
                        line,
                        value: cell.to_string(),
                    }
                })?;
                created_at = Some(parsed);
            }
            Column::Answer(question) => {
                if let Some(answer) = parse_cell(question, cell, line)? {
                    answers.insert(question.id.clone(), answer);
                }
            }
        }
    }

    let id = id.ok_or(CandidateImportError::MissingId { line })?;
    let created_at = created_at.ok_or_else(|| CandidateImportError::InvalidTimestamp {
        line,
        value: String::new(),
    })?;

    Ok(CandidateRow {
        line,
        id,
        created_at,
        answers,
    })
}

fn parse_cell(
    question: &Question,
    cell: &str,
    line: u64,
) -> Result<Option<Answer>, CandidateImportError> {
    if cell.is_empty() {
        return Ok(None);
    }

    let answer = match question.answer_type {
        AnswerType::Scale => {
            let value = cell
                .parse::<u8>()
                .map_err(|_| CandidateImportError::InvalidScale {
                    line,
                    question_id: question.id.clone(),
                    value: cell.to_string(),
                })?;
            Answer::Scale(value)
        }
        AnswerType::SingleChoice => Answer::Choice(option_value(question, cell)),
        AnswerType::MultiSelect => Answer::Multi(
            cell.split(MULTI_SEPARATOR)
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(|token| option_value(question, token))
                .collect(),
        ),
    };

    Ok(Some(answer))
}

/// Numeric cells map to integer options when the question declares one.
fn option_value(question: &Question, raw: &str) -> OptionValue {
    if let Ok(number) = raw.parse::<i64>() {
        let numeric = OptionValue::Number(number);
        if question.has_option(&numeric) {
            return numeric;
        }
    }
    OptionValue::text(raw)
}

pub(crate) fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
