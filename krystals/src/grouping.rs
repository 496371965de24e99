// Grouping engine: partition a source krystal's strands into super-strands.
//
// Permuting at level `p` below the source's own level reorders whole
// sub-trees. The sub-trees are found by scanning the flat strand list for
// level-change points:
//
// - An outer super-strand is a run of strands opened by a strand whose level
//   is in `(1, p]`. Everything deeper than `p` that follows belongs to the
//   same run. Level-1 strands never open a run: the first run accumulates
//   from the first strand of the krystal.
// - An inner super-strand is the same rule applied one level deeper inside an
//   outer super-strand: each member whose level is at most `p + 1` opens a
//   new inner run. The number of inner runs is the outer super-strand's
//   density; the inner runs are the units that get reordered.
//
// Super-strands hold 1-based moment numbers (positions in the whole source
// krystal), never strands: the source stays the single owner and a
// grouping can be rebuilt from `(source, level)` alone.
//
// See also: `alignment.rs`, which produces one axis/contour value per outer
// super-strand, and `permutation.rs`, which reorders the inner runs.

use crate::krystal::{Krystal, Strand};

/// A contiguous run of source strands opened by a strand whose level is in
/// `(1, permutation_level]`, together with its inner runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OuterSuperStrand {
    permutation_level: u32,
    moments: Vec<usize>,
    inner: Vec<InnerSuperStrand>,
}

/// A sub-run of an outer super-strand, opened one level deeper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerSuperStrand {
    moments: Vec<usize>,
}

impl OuterSuperStrand {
    pub fn permutation_level(&self) -> u32 {
        self.permutation_level
    }

    /// 1-based moment numbers of the members, in source order.
    pub fn moments(&self) -> &[usize] {
        &self.moments
    }

    pub fn inner_super_strands(&self) -> &[InnerSuperStrand] {
        &self.inner
    }

    /// Number of inner super-strands.
    pub fn density(&self) -> usize {
        self.inner.len()
    }
}

impl InnerSuperStrand {
    /// 1-based moment numbers of the members, in source order.
    pub fn moments(&self) -> &[usize] {
        &self.moments
    }
}

/// Partition `source` into outer super-strands at `permutation_level`, each
/// with its inner super-strands already computed.
pub fn group_outer(source: &Krystal, permutation_level: u32) -> Vec<OuterSuperStrand> {
    let strands = source.strands();
    let opens = |level: u32| level > 1 && level <= permutation_level;
    split_runs(strands, 1..=strands.len(), opens)
        .into_iter()
        .map(|moments| {
            let mut outer = OuterSuperStrand {
                permutation_level,
                moments,
                inner: Vec::new(),
            };
            outer.inner = group_inner(&outer, source);
            outer
        })
        .collect()
}

/// Partition an outer super-strand's members into inner super-strands,
/// opened by members at level `permutation_level + 1` or above.
pub fn group_inner(outer: &OuterSuperStrand, source: &Krystal) -> Vec<InnerSuperStrand> {
    let boundary = outer.permutation_level + 1;
    split_runs(source.strands(), outer.moments.iter().copied(), |level| level <= boundary)
        .into_iter()
        .map(|moments| InnerSuperStrand { moments })
        .collect()
}

/// Split a sequence of moments into runs. A moment whose strand level
/// satisfies `opens` closes the current run and opens the next one, unless
/// the current run is still empty.
fn split_runs(
    strands: &[Strand],
    moments: impl IntoIterator<Item = usize>,
    opens: impl Fn(u32) -> bool,
) -> Vec<Vec<usize>> {
    let mut runs = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    for moment in moments {
        if opens(strands[moment - 1].level) && !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
        current.push(moment);
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn krystal(levels: &[u32]) -> Krystal {
        let strands = levels
            .iter()
            .enumerate()
            .map(|(i, &l)| Strand::new(l, vec![i as u32 + 1]))
            .collect();
        Krystal::from_strands(strands).unwrap()
    }

    fn outer_moments(groups: &[OuterSuperStrand]) -> Vec<Vec<usize>> {
        groups.iter().map(|g| g.moments().to_vec()).collect()
    }

    fn inner_moments(group: &OuterSuperStrand) -> Vec<Vec<usize>> {
        group
            .inner_super_strands()
            .iter()
            .map(|g| g.moments().to_vec())
            .collect()
    }

    #[test]
    fn boundary_strand_opens_the_next_group() {
        let k = krystal(&[1, 3, 3, 2, 3, 3, 2, 3]);
        let groups = group_outer(&k, 2);
        assert_eq!(
            outer_moments(&groups),
            vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8]]
        );
        assert!(groups.iter().all(|g| g.permutation_level() == 2));
    }

    #[test]
    fn inner_groups_split_one_level_deeper() {
        let k = krystal(&[1, 3, 3, 2, 3, 3, 2, 3]);
        let groups = group_outer(&k, 2);
        assert_eq!(inner_moments(&groups[0]), vec![vec![1], vec![2], vec![3]]);
        assert_eq!(groups[0].density(), 3);
        assert_eq!(groups[2].density(), 2);
    }

    #[test]
    fn deeper_strands_stay_inside_their_inner_group() {
        // Level-3 krystal permuted at level 1: the inner units are the
        // level-2 sub-trees, each carrying its level-3 strands along.
        let k = krystal(&[1, 3, 2, 3, 3, 2]);
        let groups = group_outer(&k, 1);
        assert_eq!(outer_moments(&groups), vec![vec![1, 2, 3, 4, 5, 6]]);
        assert_eq!(
            inner_moments(&groups[0]),
            vec![vec![1, 2], vec![3, 4, 5], vec![6]]
        );
    }

    #[test]
    fn level_one_strands_never_open_outer_groups() {
        let k = krystal(&[1, 2, 2, 1, 2, 2]);
        let groups = group_outer(&k, 1);
        assert_eq!(outer_moments(&groups), vec![vec![1, 2, 3, 4, 5, 6]]);
        // Every member opens its own inner unit one level down.
        assert_eq!(groups[0].density(), 6);

        let groups = group_outer(&k, 2);
        assert_eq!(
            outer_moments(&groups),
            vec![vec![1], vec![2], vec![3, 4], vec![5], vec![6]]
        );
    }

    #[test]
    fn grouping_at_source_level_gives_one_group_per_strand() {
        let k = krystal(&[1, 2, 2]);
        let groups = group_outer(&k, 2);
        assert_eq!(outer_moments(&groups), vec![vec![1], vec![2], vec![3]]);
        assert!(groups.iter().all(|g| g.density() == 1));
    }

    #[test]
    fn every_strand_lands_in_exactly_one_group() {
        let k = krystal(&[1, 4, 3, 4, 2, 4, 4, 3, 2, 3]);
        for level in 1..=4 {
            let all: Vec<usize> = group_outer(&k, level)
                .iter()
                .flat_map(|g| g.inner_super_strands().iter())
                .flat_map(|g| g.moments().iter().copied())
                .collect();
            assert_eq!(all, (1..=10).collect::<Vec<_>>(), "level {level}");
        }
    }
}
