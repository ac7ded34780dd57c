use std::collections::BTreeMap;
use tracing::trace;

use super::RawRecord;

/// Partition one year's records by category, preserving row order inside
/// each group.
///
/// Rows whose text starts with `header_marker` are the source table's own
/// header repeated mid-table and are dropped. Groups left with no rows are
/// not returned.
pub fn group_by_category(
    records: Vec<RawRecord>,
    header_marker: &str,
) -> BTreeMap<String, Vec<RawRecord>> {
    let mut groups: BTreeMap<String, Vec<RawRecord>> = BTreeMap::new();

    for record in records {
        let group = groups.entry(record.category.clone()).or_default();
        if record.text.starts_with(header_marker) {
            trace!(category = %record.category, "skipping repeated header row");
            continue;
        }
        group.push(record);
    }

    groups.retain(|_, rows| !rows.is_empty());
    groups
}
