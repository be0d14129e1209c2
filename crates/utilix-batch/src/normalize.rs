//! Maps raw rows onto [`LookupRequest`]s through an [`AliasTable`].
//!
//! Normalization never rejects a row: missing apn or county become empty
//! strings and are left for the resolution service to judge.

use utilix_core::{AliasTable, CanonicalField, LookupRequest};

use crate::ingest::RawRow;

/// Converts each raw row into a request, preserving order and assigning
/// 1-based row indices.
///
/// Headers outside the alias table are ignored. When two headers map to the
/// same field the later column wins. A missing or blank state falls back to
/// `default_state`.
#[must_use]
pub fn normalize_rows(
    rows: &[RawRow],
    aliases: &AliasTable,
    default_state: &str,
) -> Vec<LookupRequest> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| normalize_row(idx + 1, row, aliases, default_state))
        .collect()
}

fn normalize_row(
    row_index: usize,
    row: &RawRow,
    aliases: &AliasTable,
    default_state: &str,
) -> LookupRequest {
    let mut apn = None;
    let mut street_address = None;
    let mut county = None;
    let mut state = None;

    for (header, value) in row.iter() {
        let slot = match aliases.resolve(header) {
            Some(CanonicalField::Apn) => &mut apn,
            Some(CanonicalField::StreetAddress) => &mut street_address,
            Some(CanonicalField::County) => &mut county,
            Some(CanonicalField::State) => &mut state,
            None => continue,
        };
        *slot = Some(value.to_string());
    }

    let state = state
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default_state.to_string());

    LookupRequest {
        row_index,
        apn: apn.unwrap_or_default(),
        street_address,
        county: county.unwrap_or_default(),
        state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(rows: &[RawRow]) -> Vec<LookupRequest> {
        normalize_rows(rows, &AliasTable::default(), "FL")
    }

    #[test]
    fn maps_recognized_headers() {
        let rows = vec![RawRow::from_pairs([
            ("APN", "123-456.789"),
            ("Address", "1 Main St"),
            ("County", "Lee"),
            ("State", "fl"),
        ])];
        let requests = normalize(&rows);
        assert_eq!(
            requests,
            vec![LookupRequest {
                row_index: 1,
                apn: "123-456.789".to_string(),
                street_address: Some("1 Main St".to_string()),
                county: "Lee".to_string(),
                state: "fl".to_string(),
            }]
        );
    }

    #[test]
    fn apn_header_variants_map_identically() {
        let variants = ["APN", "apn", " APN ", "Pan", "PAN "];
        for header in variants {
            let rows = vec![RawRow::from_pairs([(header, "AAA"), ("county", "Lee")])];
            let requests = normalize(&rows);
            assert_eq!(requests[0].apn, "AAA", "header {header:?}");
        }
    }

    #[test]
    fn ignores_unrecognized_headers() {
        let rows = vec![RawRow::from_pairs([
            ("apn", "AAA"),
            ("owner", "Smith"),
            ("street_address", "9 Elm"),
        ])];
        let requests = normalize(&rows);
        assert_eq!(requests[0].apn, "AAA");
        assert!(requests[0].street_address.is_none());
    }

    #[test]
    fn missing_state_uses_default() {
        let rows = vec![RawRow::from_pairs([("apn", "AAA"), ("county", "Lee")])];
        assert_eq!(normalize(&rows)[0].state, "FL");
    }

    #[test]
    fn blank_state_uses_default() {
        let rows = vec![RawRow::from_pairs([("apn", "AAA"), ("state", "  ")])];
        assert_eq!(normalize_rows(&rows, &AliasTable::default(), "GA")[0].state, "GA");
    }

    #[test]
    fn missing_apn_and_county_become_empty() {
        let rows = vec![RawRow::from_pairs([("address", "1 Main St")])];
        let request = &normalize(&rows)[0];
        assert_eq!(request.apn, "");
        assert_eq!(request.county, "");
    }

    #[test]
    fn later_alias_column_wins() {
        let rows = vec![RawRow::from_pairs([("apn", "FIRST"), ("pan", "SECOND")])];
        assert_eq!(normalize(&rows)[0].apn, "SECOND");
    }

    #[test]
    fn preserves_length_order_and_row_indices() {
        let rows: Vec<RawRow> = (0..5)
            .map(|i| RawRow::from_pairs([("apn", format!("P{i}"))]))
            .collect();
        let requests = normalize(&rows);
        assert_eq!(requests.len(), 5);
        for (i, request) in requests.iter().enumerate() {
            assert_eq!(request.row_index, i + 1);
            assert_eq!(request.apn, format!("P{i}"));
        }
    }

    #[test]
    fn empty_input_yields_no_requests() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn custom_alias_table_is_honored() {
        let table =
            AliasTable::from_yaml_str("aliases:\n  apn: [strap]\n  county: [municipality]\n")
                .unwrap();
        let rows = vec![RawRow::from_pairs([
            ("STRAP", "12-34"),
            ("Municipality", "Cape Coral"),
            ("apn", "ignored"),
        ])];
        let requests = normalize_rows(&rows, &table, "FL");
        assert_eq!(requests[0].apn, "12-34");
        assert_eq!(requests[0].county, "Cape Coral");
    }
}
