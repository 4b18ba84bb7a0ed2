//! Schema conformance check.
//!
//! A candidate table conforms only if it has exactly the target's columns (by name, any order)
//! with exactly the target's types. There is no coercion and no partial match.

use std::collections::HashSet;

use crate::types::Schema;

/// `true` iff `candidate` has the same column names and per-column types as `expected`.
pub fn verify(expected: &Schema, candidate: &Schema) -> bool {
    mismatch_reason(expected, candidate).is_none()
}

/// Describe the first way `candidate` differs from `expected`, or `None` if they match.
pub fn mismatch_reason(expected: &Schema, candidate: &Schema) -> Option<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(candidate.len());
    for field in &candidate.fields {
        if !seen.insert(field.name.as_str()) {
            return Some(format!("duplicate column '{}'", field.name));
        }
        match expected.field(&field.name) {
            None => return Some(format!("unexpected column '{}'", field.name)),
            Some(want) if want.data_type != field.data_type => {
                return Some(format!(
                    "column '{}' is {} but expected {}",
                    field.name, field.data_type, want.data_type
                ));
            }
            Some(_) => {}
        }
    }

    expected
        .fields
        .iter()
        .find(|f| !seen.contains(f.name.as_str()))
        .map(|f| format!("missing column '{}'", f.name))
}
