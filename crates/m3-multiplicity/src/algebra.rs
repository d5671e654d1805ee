//! Multiplicity algebra over lists of multiplicities

use crate::{Bounds, Multiplicity, MultiplicityError, MultiplicityKind, MultiplicityResult};

/// Check if a common count satisfies every multiplicity in the list
///
/// True iff the largest lower bound does not exceed the smallest upper bound
/// (unbounded counting as infinity). Vacuously true for zero or one element.
/// Every member must be concrete.
pub fn intersect(multiplicities: &[Multiplicity]) -> MultiplicityResult<bool> {
    let bounds = multiplicities
        .iter()
        .map(Multiplicity::concrete_bounds)
        .collect::<MultiplicityResult<Vec<_>>>()?;

    if bounds.len() < 2 {
        return Ok(true);
    }

    let max_lower = bounds.iter().map(Bounds::lower).max().unwrap_or(0);
    let min_upper = bounds.iter().filter_map(Bounds::upper).min();

    Ok(min_upper.is_none_or(|upper| max_lower <= upper))
}

/// The narrowest concrete multiplicity subsuming every member of the list
///
/// The lower bound is the smallest lower bound among concrete members. The upper
/// bound is unbounded if any member is unbounded or parameterized, the largest upper
/// bound otherwise. A list without concrete members yields `[*]`.
pub fn min_subsuming_multiplicity(multiplicities: &[Multiplicity]) -> MultiplicityResult<Multiplicity> {
    if multiplicities.is_empty() {
        return Err(MultiplicityError::EmptyInput);
    }

    let mut lower: Option<u32> = None;
    let mut upper: Option<u32> = Some(0);
    for multiplicity in multiplicities {
        match multiplicity.kind() {
            MultiplicityKind::Concrete(bounds) => {
                lower = Some(lower.map_or(bounds.lower(), |l| l.min(bounds.lower())));
                upper = match (upper, bounds.upper()) {
                    (Some(current), Some(next)) => Some(current.max(next)),
                    _ => None,
                };
            }
            MultiplicityKind::Parameterized { .. } => upper = None,
        }
    }

    let bounds = Bounds::new(lower.unwrap_or(0), upper)?;
    Ok(Multiplicity::from_bounds(bounds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ONE_MANY, PURE_ONE, ZERO_MANY, ZERO_ONE};

    fn range(lower: u32, upper: u32) -> Multiplicity {
        Multiplicity::range(lower, upper).unwrap()
    }

    #[test]
    fn test_intersect() {
        assert!(!intersect(&[range(0, 10), range(11, 20)]).unwrap());
        assert!(intersect(&[range(0, 10), range(10, 20)]).unwrap());
        assert!(intersect(&[ZERO_MANY.clone(), ONE_MANY.clone(), range(3, 3)]).unwrap());
        assert!(!intersect(&[Multiplicity::unbounded(5), range(0, 4)]).unwrap());
    }

    #[test]
    fn test_intersect_trivial_lists() {
        assert!(intersect(&[]).unwrap());
        assert!(intersect(&[range(7, 9)]).unwrap());
    }

    #[test]
    fn test_intersect_requires_concrete() {
        let result = intersect(&[PURE_ONE.clone(), Multiplicity::parameter("m")]);
        assert!(matches!(result, Err(MultiplicityError::NonConcrete { .. })));
    }

    #[test]
    fn test_min_subsuming() {
        let list = [
            range(4, 10),
            range(5, 10),
            range(7, 21),
            Multiplicity::unbounded(71),
        ];
        assert_eq!(
            min_subsuming_multiplicity(&list).unwrap(),
            Multiplicity::unbounded(4)
        );

        assert_eq!(
            min_subsuming_multiplicity(&[PURE_ONE.clone(), ZERO_ONE.clone()]).unwrap(),
            ZERO_ONE
        );
        assert_eq!(
            min_subsuming_multiplicity(&[range(2, 3), range(5, 8)]).unwrap(),
            range(2, 8)
        );
    }

    #[test]
    fn test_min_subsuming_with_parameters() {
        let m = Multiplicity::parameter("m");
        let n = Multiplicity::parameter("n");

        assert_eq!(
            min_subsuming_multiplicity(&[range(2, 3), m.clone()]).unwrap(),
            Multiplicity::unbounded(2)
        );
        assert_eq!(
            min_subsuming_multiplicity(&[m.clone(), n]).unwrap(),
            ZERO_MANY
        );
        assert_eq!(
            min_subsuming_multiplicity(&[m.clone(), m.clone()]).unwrap(),
            ZERO_MANY
        );
        assert_eq!(min_subsuming_multiplicity(&[m]).unwrap(), ZERO_MANY);
    }

    #[test]
    fn test_min_subsuming_empty() {
        assert_eq!(
            min_subsuming_multiplicity(&[]),
            Err(MultiplicityError::EmptyInput)
        );
    }
}
