//! Unit indexing.
//!
//! Every extractor walks its document's structural units (pages, paragraphs,
//! slides) and hands them here to receive ordinals. Ordinals start at 1 and are
//! dense: a unit with nothing to extract still occupies its slot.

use crate::types::{Ordinal, UnitMap};

/// Assign 1-based ordinals to units in the order they are yielded.
pub fn index_units<T, I>(units: I) -> UnitMap<T>
where
    I: IntoIterator<Item = T>,
{
    units
        .into_iter()
        .zip(1..)
        .map(|(unit, ordinal): (T, Ordinal)| (ordinal, unit))
        .collect()
}

/// Fallible variant: the first error aborts indexing.
pub fn try_index_units<T, E, I>(units: I) -> Result<UnitMap<T>, E>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    let mut map = UnitMap::new();
    for (unit, ordinal) in units.into_iter().zip(1..) {
        map.insert(ordinal, unit?);
    }
    Ok(map)
}

/// The single unit of a document without structural decomposition.
pub fn single_unit<T>(value: T) -> UnitMap<T> {
    index_units(std::iter::once(value))
}

/// True when the ordinals are exactly `1..=len`.
pub fn is_dense<T>(map: &UnitMap<T>) -> bool {
    map.ordinals().eq(1..=map.len() as Ordinal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_start_at_one_and_keep_order() {
        let map = index_units(vec!["first", "", "third"]);
        assert_eq!(map.ordinals().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(map.get(2), Some(&""));
        assert_eq!(map.get(3), Some(&"third"));
        assert!(is_dense(&map));
    }

    #[test]
    fn test_empty_document_has_no_units() {
        let map: UnitMap<String> = index_units(Vec::new());
        assert!(map.is_empty());
        assert!(is_dense(&map));
    }

    #[test]
    fn test_single_unit_is_ordinal_one() {
        let map = single_unit("abc".to_string());
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(1).map(String::as_str), Some("abc"));
    }

    #[test]
    fn test_try_index_stops_at_first_error() {
        let units: Vec<Result<u8, &str>> = vec![Ok(1), Err("broken"), Ok(3)];
        assert_eq!(try_index_units(units), Err("broken"));
    }

    #[test]
    fn test_gap_is_not_dense() {
        let map: UnitMap<u8> = [(1, 0), (3, 0)].into_iter().collect();
        assert!(!is_dense(&map));
    }
}
