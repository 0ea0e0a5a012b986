use capatrack_core::OperationContext;
use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A persistable record belonging to one named collection.
///
/// Every record carries a process-assigned positive integer id that is
/// unique within its collection and never reused after deletion.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Collection file name, e.g. `actions.json`.
    const FILE: &'static str;

    /// Top-level document key holding the record array, e.g. `actions`.
    const KEY: &'static str;

    /// Returns the record id; `0` means not yet persisted.
    fn id(&self) -> u64;

    /// Assigns the process-generated id.
    fn assign_id(&mut self, id: u64);

    /// Stamps creation metadata from the operation context.
    fn touch_created(&mut self, _context: &OperationContext) {}

    /// Stamps update metadata from the operation context.
    fn touch_updated(&mut self, _context: &OperationContext) {}
}

/// Returns the next available id for a collection snapshot.
///
/// `1` for an empty collection, otherwise `max(id) + 1`. Derived from the
/// snapshot at read time, not a persisted counter.
#[must_use]
pub fn next_record_id<T: Record>(items: &[T]) -> u64 {
    items.iter().map(Record::id).max().map_or(1, |max| max + 1)
}

/// Finds a record by id with a linear scan.
#[must_use]
pub fn find_by_id<T: Record>(items: &[T], id: u64) -> Option<&T> {
    items.iter().find(|item| item.id() == id)
}

/// Finds the position of a record by id with a linear scan.
#[must_use]
pub fn find_index_by_id<T: Record>(items: &[T], id: u64) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

/// Checks a `YYYY-MM-DD` date string strictly.
///
/// The value must parse and format back to the identical string, so
/// unpadded or out-of-range components are rejected.
#[must_use]
pub fn is_strict_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.format("%Y-%m-%d").to_string() == value)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::is_strict_date;

    #[test]
    fn strict_date_accepts_padded_iso_dates() {
        assert!(is_strict_date("2024-01-10"));
        assert!(is_strict_date("1999-12-31"));
    }

    #[test]
    fn strict_date_rejects_malformed_values() {
        assert!(!is_strict_date("2024-1-10"));
        assert!(!is_strict_date("2024-01-32"));
        assert!(!is_strict_date("10.01.2024"));
        assert!(!is_strict_date(""));
    }
}
