// Validator: structural preconditions for building a permutation krystal.
//
// Checked once, at construction, against the loaded inputs. The rules run in
// a fixed order and the first failure wins:
//
// 1. the permutation level is at least 1;
// 2. it is at most the source's level;
// 3. it is above the axis krystal's level;
// 4. it is above the contour krystal's level;
// 5. at every depth from 1 down to the permutation level, no group of the
//    source has more than seven members (there are no larger contours).
//
// A failure aborts construction; nothing here is recoverable at runtime.

use krystals_contour::MAX_DENSITY;

use crate::error::KrystalError;
use crate::grouping::group_outer;
use crate::krystal::Krystal;

/// Apply the five rules given precomputed levels and the permutability of
/// the source.
pub fn validate(
    source_level: u32,
    axis_level: u32,
    contour_level: u32,
    permutation_level: u32,
    source_is_permutable: bool,
) -> Result<(), KrystalError> {
    let invalid = |reason| KrystalError::InvalidPermutationLevel {
        level: permutation_level,
        reason,
    };
    if permutation_level < 1 {
        return Err(invalid("must be > 0"));
    }
    if permutation_level > source_level {
        return Err(invalid("must be ≤ source level"));
    }
    if permutation_level <= axis_level {
        return Err(invalid("must be > axis level"));
    }
    if permutation_level <= contour_level {
        return Err(invalid("must be > contour level"));
    }
    if !source_is_permutable {
        return Err(KrystalError::NotPermutable("group exceeds 7 elements".into()));
    }
    Ok(())
}

/// Run every rule against loaded krystals.
pub fn check_inputs(
    source: &Krystal,
    axis: &Krystal,
    contour: &Krystal,
    permutation_level: u32,
) -> Result<(), KrystalError> {
    validate(
        source.level(),
        axis.level(),
        contour.level(),
        permutation_level,
        is_permutable_at_level(source, permutation_level),
    )
}

/// True if every group the permutation would touch has a contour: for each
/// depth `d` in `1..=level`, every outer super-strand at `d` has at most
/// seven inner super-strands, and at the source's own level every strand has
/// at most seven values. Depths beyond the source's level are ignored.
pub fn is_permutable_at_level(source: &Krystal, level: u32) -> bool {
    let source_level = source.level();
    (1..=level.min(source_level)).all(|depth| {
        if depth < source_level {
            group_outer(source, depth)
                .iter()
                .all(|group| group.density() <= MAX_DENSITY)
        } else {
            source
                .strands()
                .iter()
                .all(|strand| strand.density() <= MAX_DENSITY)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::krystal::Strand;

    fn reason(result: Result<(), KrystalError>) -> &'static str {
        match result {
            Err(KrystalError::InvalidPermutationLevel { reason, .. }) => reason,
            Err(KrystalError::NotPermutable(_)) => "not permutable",
            Err(other) => panic!("unexpected error {other}"),
            Ok(()) => "ok",
        }
    }

    #[test]
    fn rules_apply_in_order() {
        assert_eq!(reason(validate(3, 0, 0, 2, true)), "ok");
        assert_eq!(reason(validate(3, 5, 5, 0, false)), "must be > 0");
        assert_eq!(reason(validate(3, 5, 5, 4, false)), "must be ≤ source level");
        assert_eq!(reason(validate(3, 2, 5, 2, false)), "must be > axis level");
        assert_eq!(reason(validate(3, 1, 2, 2, false)), "must be > contour level");
        assert_eq!(reason(validate(3, 1, 1, 2, false)), "not permutable");
    }

    #[test]
    fn level_zero_and_above_source_always_rejected() {
        for axis in 0..3 {
            for contour in 0..3 {
                for permutable in [true, false] {
                    assert_eq!(reason(validate(2, axis, contour, 0, permutable)), "must be > 0");
                    assert_eq!(
                        reason(validate(2, axis, contour, 3, permutable)),
                        "must be ≤ source level"
                    );
                }
            }
        }
    }

    #[test]
    fn dense_strands_block_value_permutation() {
        let source = Krystal::from_strands(vec![
            Strand::new(1, vec![1, 2, 3]),
            Strand::new(2, (1..=8).collect()),
        ])
        .unwrap();
        // Level 1 only needs the two level-2 groups.
        assert!(is_permutable_at_level(&source, 1));
        // Level 2 permutes values, and one strand has eight.
        assert!(!is_permutable_at_level(&source, 2));
    }

    #[test]
    fn dense_groups_block_strand_permutation() {
        let mut strands = vec![Strand::new(1, vec![1])];
        strands.extend((0..7).map(|_| Strand::new(2, vec![1])));
        let source = Krystal::from_strands(strands).unwrap();
        // One outer group with eight inner groups at level 1.
        assert!(!is_permutable_at_level(&source, 1));

        let source = Krystal::from_strands(source.strands()[..7].to_vec()).unwrap();
        assert!(is_permutable_at_level(&source, 1));
        assert!(is_permutable_at_level(&source, 2));
    }

    #[test]
    fn check_inputs_uses_krystal_levels() {
        let source = Krystal::from_strands(vec![
            Strand::new(1, vec![3, 1, 2]),
            Strand::new(2, vec![2, 1]),
        ])
        .unwrap();
        let constant = Krystal::constant(1);
        assert!(check_inputs(&source, &constant, &constant, 1).is_ok());
        assert!(check_inputs(&source, &constant, &constant, 2).is_ok());
        assert!(matches!(
            check_inputs(&source, &source, &constant, 2),
            Err(KrystalError::InvalidPermutationLevel { .. })
        ));
    }
}
