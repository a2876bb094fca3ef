use shared::{DomainError, DomainResult};

use crate::domain::entities::Assignment;

/// Render an assignment list as CSV with a `nurse_id,date,shift` header.
pub fn to_csv(assignments: &[Assignment]) -> DomainResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for assignment in assignments {
        writer
            .serialize(assignment)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| DomainError::Internal(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| DomainError::Internal(e.to_string()))
}

/// Parse CSV produced by [`to_csv`] back into the same assignment multiset.
pub fn parse_csv(text: &str) -> DomainResult<Vec<Assignment>> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let mut assignments = Vec::new();
    for record in reader.deserialize() {
        let assignment: Assignment = record.map_err(|e| DomainError::Parse(e.to_string()))?;
        assignments.push(assignment);
    }
    Ok(assignments)
}
