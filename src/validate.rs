use std::sync::OnceLock;

use regex::Regex;

use crate::ProcurosError;

pub(crate) const MAX_PER_PAGE: u32 = 100;
pub(crate) const MAX_BULK_ITEMS: usize = 1_000;

fn uuid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
            .unwrap_or_else(|err| unreachable!("static regex: {err}"))
    })
}

fn date_range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2},\d{4}-\d{2}-\d{2}$")
            .unwrap_or_else(|err| unreachable!("static regex: {err}"))
    })
}

pub(crate) fn validate_uuid(value: &str, label: &str) -> Result<(), ProcurosError> {
    if uuid_regex().is_match(value) {
        Ok(())
    } else {
        Err(ProcurosError::InvalidArgument(format!(
            "invalid UUID for {label}: \"{value}\""
        )))
    }
}

pub(crate) fn validate_per_page(value: u32) -> Result<(), ProcurosError> {
    if (1..=MAX_PER_PAGE).contains(&value) {
        Ok(())
    } else {
        Err(ProcurosError::InvalidArgument(format!(
            "per_page must be between 1 and {MAX_PER_PAGE}, got {value}"
        )))
    }
}

pub(crate) fn validate_bulk_size(len: usize) -> Result<(), ProcurosError> {
    if (1..=MAX_BULK_ITEMS).contains(&len) {
        Ok(())
    } else {
        Err(ProcurosError::InvalidArgument(format!(
            "bulk mark-processed requires 1 to {MAX_BULK_ITEMS} items, got {len}"
        )))
    }
}

/// `created_between` filter: `YYYY-MM-DD,YYYY-MM-DD`.
pub(crate) fn validate_created_between(value: &str) -> Result<(), ProcurosError> {
    if date_range_regex().is_match(value) {
        Ok(())
    } else {
        Err(ProcurosError::InvalidArgument(format!(
            "created_between must match \"YYYY-MM-DD,YYYY-MM-DD\", got \"{value}\""
        )))
    }
}
