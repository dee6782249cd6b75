//! Prompt batch import from tabular sources.
//!
//! The expected layout matches the spreadsheet template users fill in:
//! the first row is a header, and column B of every following row holds
//! one prompt. Anything else in the sheet is ignored.

use std::io::Read;

use crate::error::CoreError;

/// Zero-based column holding the prompts (column B).
const PROMPT_COLUMN: usize = 1;

/// Extract prompts from a CSV source.
///
/// Skips the header row, reads column B of every remaining row, trims
/// each cell, and drops blanks. Rows that are too short to have a
/// column B are skipped rather than treated as errors.
///
/// Fails with [`CoreError::Import`] when the source is malformed or
/// when no usable prompt survives filtering, so callers can leave their
/// existing prompt list untouched.
pub fn extract_prompts<R: Read>(reader: R) -> Result<Vec<String>, CoreError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut prompts = Vec::new();
    for record in csv_reader.records() {
        let record =
            record.map_err(|e| CoreError::Import(format!("Failed to parse source: {e}")))?;
        if let Some(cell) = record.get(PROMPT_COLUMN) {
            let trimmed = cell.trim();
            if !trimmed.is_empty() {
                prompts.push(trimmed.to_string());
            }
        }
    }

    if prompts.is_empty() {
        return Err(CoreError::Import(
            "No valid prompts found in column B".to_string(),
        ));
    }

    Ok(prompts)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn extracts_column_b_after_header() {
        let source = "id,prompt\n1,a red balloon\n2,a storm at sea\n";
        let prompts = extract_prompts(source.as_bytes()).unwrap();
        assert_eq!(prompts, vec!["a red balloon", "a storm at sea"]);
    }

    #[test]
    fn trims_and_drops_blank_cells() {
        let source = "id,prompt\n1,  padded prompt  \n2,\n3,   \n4,kept\n";
        let prompts = extract_prompts(source.as_bytes()).unwrap();
        assert_eq!(prompts, vec!["padded prompt", "kept"]);
    }

    #[test]
    fn header_plus_empty_column_b_reports_no_prompts() {
        let source = "id,prompt\n1,\n";
        assert_matches!(
            extract_prompts(source.as_bytes()),
            Err(CoreError::Import(msg)) if msg.contains("No valid prompts")
        );
    }

    #[test]
    fn header_only_reports_no_prompts() {
        let source = "id,prompt\n";
        assert_matches!(
            extract_prompts(source.as_bytes()),
            Err(CoreError::Import(_))
        );
    }

    #[test]
    fn short_rows_are_skipped() {
        let source = "id,prompt\nonly-one-cell\n2,real prompt\n";
        let prompts = extract_prompts(source.as_bytes()).unwrap();
        assert_eq!(prompts, vec!["real prompt"]);
    }

    #[test]
    fn extra_columns_are_ignored() {
        let source = "id,prompt,notes\n1,the prompt,some note\n";
        let prompts = extract_prompts(source.as_bytes()).unwrap();
        assert_eq!(prompts, vec!["the prompt"]);
    }
}
