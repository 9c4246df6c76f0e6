//! Proposal file ingestion.
//!
//! Parses delimited proposal exports (comma or tab separated) with lenient
//! header matching, since every HR tool names its columns differently.

use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use salarium_common::{EmployeeId, ProposalRow, ValidationError};

/// Columns we know how to ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    EmployeeId,
    RaiseAmount,
    RaisePercent,
    ProposedSalary,
}

/// Header synonyms, matched case-insensitively after trimming.
const SYNONYMS: &[(Field, &[&str])] = &[
    (
        Field::EmployeeId,
        &[
            "employee id",
            "employee_id",
            "employee number",
            "emp id",
            "id",
            "worker id",
        ],
    ),
    (
        Field::RaiseAmount,
        &["proposed raise", "raise", "raise amount", "raise usd", "increase"],
    ),
    (
        Field::RaisePercent,
        &[
            "proposed raise percent",
            "raise percent",
            "raise %",
            "percent",
            "increase %",
        ],
    ),
    (
        Field::ProposedSalary,
        &["proposed salary", "new salary", "target salary"],
    ),
];

fn field_for(header: &str) -> Option<Field> {
    let normalized = header.trim().to_lowercase();
    SYNONYMS
        .iter()
        .find(|(_, names)| names.contains(&normalized.as_str()))
        .map(|(field, _)| *field)
}

/// A parsed proposal file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposalFile {
    /// Rows that parsed cleanly.
    pub rows: Vec<ProposalRow>,
    /// Per-row rejections. A rejected row never blocks the rest of the
    /// file.
    pub rejected: Vec<ValidationError>,
}

/// Parse a delimited proposal file.
///
/// The delimiter is sniffed from the header row (tab if present, comma
/// otherwise); quoting follows CSV conventions, so thousands-separated
/// amounts survive a comma-delimited file. Unrecognized columns are
/// ignored. Returns an error only for file-level problems; row-level
/// problems land in [`ProposalFile::rejected`].
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn parse_proposals(text: &str) -> Result<ProposalFile, ValidationError> {
    let header_line = text
        .lines()
        .find(|line| !line.trim().is_empty())
        .ok_or(ValidationError::EmptyInput)?;
    let delimiter = if header_line.contains('\t') { b'\t' } else { b',' };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let columns: Vec<Option<Field>> = reader
        .headers()
        .map_err(|e| ValidationError::InvalidDocument(format!("malformed header: {e}")))?
        .iter()
        .map(field_for)
        .collect();

    if !columns.contains(&Some(Field::EmployeeId)) {
        warn!(header = header_line, "No identity column found in proposal header");
        return Err(ValidationError::MissingColumn("employee id".to_string()));
    }

    let mut file = ProposalFile::default();

    for result in reader.records() {
        match result {
            Ok(record) => {
                let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
                match parse_row(line, &record, &columns) {
                    Ok(row) => file.rows.push(row),
                    Err(err) => file.rejected.push(err),
                }
            }
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
                file.rejected
                    .push(ValidationError::bad_row(line, format!("malformed row: {e}")));
            }
        }
    }

    debug!(
        rows = file.rows.len(),
        rejected = file.rejected.len(),
        "Parsed proposal file"
    );
    Ok(file)
}

fn parse_row(
    line: usize,
    record: &csv::StringRecord,
    columns: &[Option<Field>],
) -> Result<ProposalRow, ValidationError> {
    let mut row = ProposalRow::new(line);

    for (cell, field) in record.iter().zip(columns.iter()) {
        let Some(field) = field else { continue };
        if cell.is_empty() {
            continue;
        }
        match field {
            Field::EmployeeId => {
                let id = EmployeeId::new(cell);
                if !id.is_empty() {
                    row.employee_id = Some(id);
                }
            }
            Field::RaiseAmount => {
                row.proposed_raise =
                    Some(parse_number(cell).map_err(|reason| ValidationError::bad_row(line, reason))?);
            }
            Field::RaisePercent => {
                row.proposed_raise_percent =
                    Some(parse_number(cell).map_err(|reason| ValidationError::bad_row(line, reason))?);
            }
            Field::ProposedSalary => {
                row.proposed_salary =
                    Some(parse_number(cell).map_err(|reason| ValidationError::bad_row(line, reason))?);
            }
        }
    }

    Ok(row)
}

/// Parse a numeric cell, tolerating currency symbols, thousands separators
/// and percent signs.
fn parse_number(raw: &str) -> Result<Decimal, String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%' | ' '))
        .collect();
    cleaned
        .parse::<Decimal>()
        .map_err(|_| format!("unparseable number '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_comma_separated() {
        let text = "Employee ID,Proposed Raise\nE1,5000\nE2,2500";
        let file = parse_proposals(text).unwrap();

        assert_eq!(file.rows.len(), 2);
        assert!(file.rejected.is_empty());
        assert_eq!(file.rows[0].employee_id, Some(EmployeeId::new("E1")));
        assert_eq!(file.rows[0].proposed_raise, Some(dec!(5000)));
        assert_eq!(file.rows[0].line, 2);
        assert_eq!(file.rows[1].line, 3);
    }

    #[test]
    fn test_parse_tab_separated() {
        let text = "employee_id\traise %\nE1\t5.5";
        let file = parse_proposals(text).unwrap();

        assert_eq!(file.rows.len(), 1);
        assert_eq!(file.rows[0].proposed_raise_percent, Some(dec!(5.5)));
    }

    #[test]
    fn test_header_synonyms_and_case() {
        let text = "WORKER ID,New Salary\nE1,95000";
        let file = parse_proposals(text).unwrap();

        assert_eq!(file.rows[0].employee_id, Some(EmployeeId::new("E1")));
        assert_eq!(file.rows[0].proposed_salary, Some(dec!(95000)));
    }

    #[test]
    fn test_quoted_thousands_separated_amount() {
        let text = "id,raise,percent\nE1,\"$5,000\",5%";
        let file = parse_proposals(text).unwrap();

        assert!(file.rejected.is_empty());
        assert_eq!(file.rows[0].proposed_raise, Some(dec!(5000)));
        assert_eq!(file.rows[0].proposed_raise_percent, Some(dec!(5)));
    }

    #[test]
    fn test_formatted_numbers_in_tab_file() {
        let text = "id\traise\tpercent\nE1\t$5,000\t5%";
        let file = parse_proposals(text).unwrap();

        assert_eq!(file.rows[0].proposed_raise, Some(dec!(5000)));
        assert_eq!(file.rows[0].proposed_raise_percent, Some(dec!(5)));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert_eq!(parse_proposals(""), Err(ValidationError::EmptyInput));
        assert_eq!(parse_proposals("\n  \n"), Err(ValidationError::EmptyInput));
    }

    #[test]
    fn test_missing_identity_column_rejected() {
        let result = parse_proposals("name,raise\nAda,5000");
        assert_eq!(
            result,
            Err(ValidationError::MissingColumn("employee id".to_string()))
        );
    }

    #[test]
    fn test_bad_row_collected_not_fatal() {
        let text = "id,raise\nE1,abc\nE2,1000";
        let file = parse_proposals(text).unwrap();

        assert_eq!(file.rows.len(), 1);
        assert_eq!(file.rows[0].employee_id, Some(EmployeeId::new("E2")));
        assert_eq!(file.rejected.len(), 1);
        assert!(matches!(
            file.rejected[0],
            ValidationError::BadRow { line: 2, .. }
        ));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let text = "\nid,raise\n\nE1,100\n\n";
        let file = parse_proposals(text).unwrap();

        assert_eq!(file.rows.len(), 1);
        assert_eq!(file.rows[0].line, 4);
    }

    #[test]
    fn test_unknown_columns_ignored() {
        let text = "id,manager notes,raise\nE1,looks good,2000";
        let file = parse_proposals(text).unwrap();

        assert_eq!(file.rows[0].proposed_raise, Some(dec!(2000)));
    }

    #[test]
    fn test_quoted_delimiter_in_ignored_column() {
        let text = "id,manager notes,raise\nE1,\"looks good, approve\",2000";
        let file = parse_proposals(text).unwrap();

        assert!(file.rejected.is_empty());
        assert_eq!(file.rows[0].proposed_raise, Some(dec!(2000)));
    }

    #[test]
    fn test_empty_cells_leave_fields_unset() {
        let text = "id,raise,percent,new salary\nE1,,4.5,";
        let file = parse_proposals(text).unwrap();

        let row = &file.rows[0];
        assert_eq!(row.proposed_raise, None);
        assert_eq!(row.proposed_raise_percent, Some(dec!(4.5)));
        assert_eq!(row.proposed_salary, None);
    }
}
