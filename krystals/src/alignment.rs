// Alignment engine: map a control krystal's values onto source groups.
//
// Axis and contour krystals are coarser than the source (their level is
// below the permutation level). Alignment walks the source strands at or
// above the permutation level and moves a cursor through the control
// krystal in step with the source's level changes:
//
// - a source strand at level 1 resets the cursor to the first control value;
// - a strand exactly one level below the control's deepest level moves to
//   the next value within the current control strand;
// - a strand at a coarser level moves to the next control strand.
//
// At permutation level 1 the whole source is one group, so the walk stops
// after emitting a single global control value: the first value of the
// control krystal.
//
// For a krystal that opens with its only level-1 strand, the result has
// exactly one value per outer super-strand from `grouping::group_outer` for
// the same `(source, level)`, whichever control krystal is passed.

use tracing::trace;

use crate::error::KrystalError;
use crate::krystal::Krystal;

/// One control value per source strand at or above `permutation_level`, in
/// source order, or a single value when `permutation_level` is 1.
/// Requires `control.level() < permutation_level <= source.level()`; a
/// control krystal whose structure does not match its level makes the cursor
/// run off its strands (`IndexOutOfRange`).
pub fn align(
    source: &Krystal,
    permutation_level: u32,
    control: &Krystal,
) -> Result<Vec<u32>, KrystalError> {
    debug_assert!(permutation_level <= source.level() && permutation_level > control.level());

    if permutation_level == 1 {
        let global = control_value(control, 0, 0)?;
        trace!(value = global, "aligned global control value");
        return Ok(vec![global]);
    }

    let value_level = control.level() + 1;
    let mut strand_index = 0usize;
    let mut value_index = 0usize;
    let mut aligned = Vec::new();

    for strand in source.strands() {
        if strand.level > permutation_level {
            continue;
        }
        if strand.level == 1 {
            strand_index = 0;
            value_index = 0;
        } else if strand.level == value_level {
            value_index += 1;
        } else if strand.level < value_level {
            strand_index += 1;
            value_index = 0;
        }
        aligned.push(control_value(control, strand_index, value_index)?);
    }
    trace!(permutation_level, values = ?aligned, "aligned control values");
    Ok(aligned)
}

fn control_value(
    control: &Krystal,
    strand_index: usize,
    value_index: usize,
) -> Result<u32, KrystalError> {
    control
        .strands()
        .get(strand_index)
        .and_then(|s| s.values.get(value_index))
        .copied()
        .ok_or_else(|| {
            KrystalError::IndexOutOfRange(format!(
                "control value {} of strand {} does not exist",
                value_index + 1,
                strand_index + 1
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::group_outer;
    use crate::krystal::Strand;

    fn levels(levels: &[u32]) -> Krystal {
        Krystal::from_strands(levels.iter().map(|&l| Strand::new(l, vec![1, 2])).collect())
            .unwrap()
    }

    fn line(values: &[u32]) -> Krystal {
        Krystal::from_strands(vec![Strand::new(1, values.to_vec())]).unwrap()
    }

    #[test]
    fn level_one_emits_the_global_value_once() {
        let control = Krystal::constant(4);
        let source = levels(&[1, 2, 2, 1, 2, 2]);
        assert_eq!(align(&source, 1, &control).unwrap(), vec![4]);
        assert_eq!(group_outer(&source, 1).len(), 1);

        let source = levels(&[1, 2, 2, 2]);
        assert_eq!(align(&source, 1, &control).unwrap(), vec![4]);
    }

    #[test]
    fn constant_control_repeats_at_deeper_levels() {
        let source = levels(&[1, 2, 3, 2, 3]);
        let control = Krystal::constant(9);
        assert_eq!(align(&source, 2, &control).unwrap(), vec![9, 9, 9]);
    }

    #[test]
    fn line_control_steps_through_values() {
        let source = levels(&[1, 3, 2, 3, 2, 3]);
        let control = line(&[5, 6, 7]);
        assert_eq!(align(&source, 2, &control).unwrap(), vec![5, 6, 7]);
    }

    #[test]
    fn level_two_control_steps_through_strands() {
        // Control: level-1 strand [1, 2], level-2 strands [3, 4] and [5, 6].
        let control = Krystal::from_strands(vec![
            Strand::new(1, vec![1, 2]),
            Strand::new(2, vec![3, 4]),
            Strand::new(2, vec![5, 6]),
        ])
        .unwrap();
        let source = levels(&[1, 3, 2, 3, 2, 3]);
        // Source level-3 strands are at value level; level-2 strands start a
        // new control strand.
        assert_eq!(align(&source, 3, &control).unwrap(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn level_one_strand_resets_the_cursor() {
        let source = levels(&[1, 2, 2, 1, 2]);
        let control = line(&[5, 6, 7]);
        assert_eq!(align(&source, 2, &control).unwrap(), vec![5, 6, 7, 5, 6]);
    }

    #[test]
    fn running_off_the_control_is_an_error() {
        let source = levels(&[1, 2, 2, 2]);
        let control = line(&[5, 6]);
        assert!(matches!(
            align(&source, 2, &control),
            Err(KrystalError::IndexOutOfRange(_))
        ));
    }

    #[test]
    fn length_matches_outer_groups_for_any_control() {
        let source = levels(&[1, 3, 3, 2, 3, 2, 3, 3, 3]);
        let controls = [Krystal::constant(1), line(&[1, 2, 3])];
        for level in 1..=3u32 {
            let groups = group_outer(&source, level).len();
            for control in controls.iter().filter(|c| c.level() < level) {
                assert_eq!(align(&source, level, control).unwrap().len(), groups);
            }
        }
    }
}
