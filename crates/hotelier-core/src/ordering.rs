//! Picture ordering rules.
//!
//! Positions are 1-based ranks. A reorder request names every picture of a
//! hotel exactly once and the rank of each picture becomes its index in the
//! request plus one. Planning is pure; `hotelier-db` applies the plan inside
//! a transaction.

use std::collections::HashSet;

use crate::{Error, PictureId, Result};

/// A single `picture -> position` assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank {
    pub picture_id: PictureId,
    pub position: i64,
}

/// Assign ranks `1..=N` to `ids` in the order given.
pub fn rank_in_order(ids: &[PictureId]) -> Vec<Rank> {
    ids.iter()
        .zip(1_i64..)
        .map(|(&picture_id, position)| Rank {
            picture_id,
            position,
        })
        .collect()
}

/// Check a caller-supplied ordering against the pictures a hotel owns and
/// turn it into rank assignments.
///
/// Fails with [`Error::Validation`] when `requested` names a picture twice,
/// and with [`Error::Forbidden`] when the two sets differ in any way.
pub fn plan_reorder(owned: &[PictureId], requested: &[PictureId]) -> Result<Vec<Rank>> {
    let mut seen = HashSet::with_capacity(requested.len());
    for id in requested {
        if !seen.insert(*id) {
            return Err(Error::validation(format!(
                "picture_ids contains {id} more than once"
            )));
        }
    }

    if requested.len() != owned.len() {
        return Err(Error::Forbidden(format!(
            "expected {} picture ids for this hotel, got {}",
            owned.len(),
            requested.len()
        )));
    }

    let owned: HashSet<PictureId> = owned.iter().copied().collect();
    if let Some(foreign) = requested.iter().find(|id| !owned.contains(id)) {
        return Err(Error::Forbidden(format!(
            "picture {foreign} does not belong to this hotel"
        )));
    }

    Ok(rank_in_order(requested))
}

/// Whether `positions` is exactly `{1..=N}` in some order.
pub fn is_contiguous(positions: &[i64]) -> bool {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    sorted.iter().zip(1_i64..).all(|(&p, expected)| p == expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[i64]) -> Vec<PictureId> {
        raw.iter().copied().map(PictureId::from).collect()
    }

    #[test]
    fn permutation_becomes_ranks() {
        let plan = plan_reorder(&ids(&[1, 2, 3]), &ids(&[3, 1, 2])).unwrap();
        let pairs: Vec<(i64, i64)> = plan
            .iter()
            .map(|r| (r.picture_id.get(), r.position))
            .collect();
        assert_eq!(pairs, vec![(3, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn missing_id_is_forbidden() {
        let err = plan_reorder(&ids(&[1, 2, 3]), &ids(&[3, 1])).unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[test]
    fn foreign_id_is_forbidden() {
        let err = plan_reorder(&ids(&[1, 2, 3]), &ids(&[3, 1, 2, 99])).unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        // Same cardinality, one swapped for a foreign id.
        let err = plan_reorder(&ids(&[1, 2, 3]), &ids(&[3, 1, 99])).unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[test]
    fn duplicate_id_is_validation() {
        let err = plan_reorder(&ids(&[1, 2, 3]), &ids(&[1, 1, 2])).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn empty_hotel_accepts_empty_list() {
        assert!(plan_reorder(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn identity_order_is_allowed() {
        let plan = plan_reorder(&ids(&[5, 9]), &ids(&[5, 9])).unwrap();
        assert_eq!(plan[0].position, 1);
        assert_eq!(plan[1].position, 2);
    }

    #[test]
    fn contiguity() {
        assert!(is_contiguous(&[]));
        assert!(is_contiguous(&[2, 1, 3]));
        assert!(!is_contiguous(&[1, 3]));
        assert!(!is_contiguous(&[1, 1, 2]));
        assert!(!is_contiguous(&[0, 1]));
    }
}
