//! Per-term quota planning.

use serde::Serialize;

use crate::catalog::CollectionSpec;
use crate::error::AcquireError;

/// Splits `target` evenly across `term_count` search terms.
///
/// Floor division; the remainder is dropped, not redistributed, so
/// `term_count * quota <= target`. Zero terms is only valid with a zero target.
pub fn plan(target: u32, term_count: usize) -> Result<u32, AcquireError> {
    if term_count == 0 {
        if target > 0 {
            return Err(AcquireError::InvalidInput(format!(
                "target of {} with no search terms",
                target
            )));
        }
        return Ok(0);
    }
    Ok(target / term_count_u32(term_count))
}

fn term_count_u32(term_count: usize) -> u32 {
    u32::try_from(term_count).unwrap_or(u32::MAX)
}

/// Quota breakdown for one collection, for display before a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaPlan {
    pub name: String,
    pub target_count: u32,
    pub term_count: usize,
    pub quota_per_term: u32,
    /// Items that will never be attempted because of integer division.
    pub dropped: u32,
}

impl QuotaPlan {
    pub fn for_collection(spec: &CollectionSpec) -> Result<Self, AcquireError> {
        let quota_per_term = plan(spec.target_count, spec.search_terms.len())
            .map_err(|e| match e {
                AcquireError::InvalidInput(msg) => {
                    AcquireError::InvalidInput(format!("{}: {}", spec.name, msg))
                }
                other => other,
            })?;
        let planned = quota_per_term.saturating_mul(term_count_u32(spec.search_terms.len()));
        Ok(Self {
            name: spec.name.clone(),
            target_count: spec.target_count,
            term_count: spec.search_terms.len(),
            quota_per_term,
            dropped: spec.target_count.saturating_sub(planned),
        })
    }
}
