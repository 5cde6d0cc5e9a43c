use crate::models::{NOT_AVAILABLE, RawCatalogRow, Record, UNKNOWN};

// ── Raw row → Record ──────────────────────────────────────────────────────────

/// Apply sentinel defaults. Total: every raw row becomes exactly one record.
pub fn row_to_record(row: RawCatalogRow, origin: &str) -> Record {
    let test_type = if row.keys.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        row.keys.join(", ")
    };

    Record {
        name: row.name.unwrap_or_else(|| UNKNOWN.to_string()),
        // Plain concatenation: a missing href leaves the bare origin.
        url: format!("{}{}", origin, row.href.as_deref().unwrap_or("")),
        duration: NOT_AVAILABLE.to_string(),
        test_type,
        remote_testing: row.remote_marker.into(),
        adaptive_irt: row.adaptive_marker.into(),
    }
}

pub fn clean_catalog_rows(rows: Vec<RawCatalogRow>, origin: &str) -> Vec<Record> {
    rows.into_iter().map(|r| row_to_record(r, origin)).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
