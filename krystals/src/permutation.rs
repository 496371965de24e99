// Permutation computation and materialisation.
//
// A permutation krystal is described by one `PermutationNode` per output
// strand. Which variant is used depends only on the permutation level:
//
// - Below the source's level (strand order): the source is grouped into
//   outer super-strands, each group's inner super-strands are reordered by a
//   contour, and every node names the source strand (1-based moment) to copy
//   into that output position.
// - At the source's level (strand values): every strand keeps its place and
//   its node carries the axis and contour used to reorder its values.
//
// Either way the output has exactly as many strands as the source. Only the
// order of strands (first case) or the order of values inside a strand
// (second case) changes.
//
// `build_nodes` and `materialize` are pure functions over the loaded
// inputs; `permutation_krystal.rs` wires them into the krystal's lifecycle.

use krystals_contour::ContourTable;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::KrystalError;
use crate::grouping::{InnerSuperStrand, group_outer};
use crate::krystal::{Krystal, Strand};

/// How one output strand is derived from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PermutationNode {
    /// Copy the source strand at this 1-based position.
    BySource { source_moment: usize },
    /// Keep the strand in place and reorder its values with this contour.
    ByContour { axis: u32, contour: u32 },
}

/// Compute one node per source strand.
///
/// `axis_values` and `contour_values` come from `alignment::align` for the
/// same source and level: one value per outer super-strand.
pub fn build_nodes<C: ContourTable>(
    source: &Krystal,
    axis_values: &[u32],
    contour_values: &[u32],
    permutation_level: u32,
    sort_first: bool,
    contours: &C,
) -> Result<Vec<PermutationNode>, KrystalError> {
    if axis_values.len() != contour_values.len() {
        return Err(KrystalError::IndexOutOfRange(format!(
            "{} axis values but {} contour values",
            axis_values.len(),
            contour_values.len()
        )));
    }

    if permutation_level == source.level() {
        if axis_values.len() != source.strands().len() {
            return Err(KrystalError::IndexOutOfRange(format!(
                "{} aligned values for {} strands",
                axis_values.len(),
                source.strands().len()
            )));
        }
        return Ok(axis_values
            .iter()
            .zip(contour_values)
            .map(|(&axis, &contour)| PermutationNode::ByContour { axis, contour })
            .collect());
    }

    let groups = group_outer(source, permutation_level);
    if groups.len() != axis_values.len() {
        return Err(KrystalError::IndexOutOfRange(format!(
            "{} aligned values for {} groups",
            axis_values.len(),
            groups.len()
        )));
    }

    let mut nodes = Vec::with_capacity(source.strands().len());
    for (i, group) in groups.iter().enumerate() {
        let density = group.density();
        if density == 1 {
            nodes.extend(
                group
                    .moments()
                    .iter()
                    .map(|&source_moment| PermutationNode::BySource { source_moment }),
            );
            continue;
        }

        let perm = contours.contour(density, contour_values[i], axis_values[i])?;
        let inner = ordered_inner(group.inner_super_strands(), sort_first);
        for &p in &perm {
            let unit = inner.get(p.wrapping_sub(1)).ok_or_else(|| {
                KrystalError::IndexOutOfRange(format!("contour entry {p} for density {density}"))
            })?;
            nodes.extend(
                unit.moments()
                    .iter()
                    .map(|&source_moment| PermutationNode::BySource { source_moment }),
            );
        }
        debug!(
            group = i + 1,
            density,
            axis = axis_values[i],
            contour = contour_values[i],
            ?perm,
            "permuted group"
        );
    }
    Ok(nodes)
}

/// Inner super-strands in input order, sorted ascending by their original
/// moment numbers when sorting first. Sorting moves units, never values:
/// strand content is only reordered at the source's own level.
fn ordered_inner(inner: &[InnerSuperStrand], sort_first: bool) -> Vec<&InnerSuperStrand> {
    let mut units: Vec<&InnerSuperStrand> = inner.iter().collect();
    if sort_first {
        units.sort_by_key(|unit| unit.moments().first().copied());
    }
    units
}

/// Build the output strands from the nodes. Never mutates the source.
pub fn materialize<C: ContourTable>(
    source: &Krystal,
    nodes: &[PermutationNode],
    sort_first: bool,
    contours: &C,
) -> Result<Vec<Strand>, KrystalError> {
    let strands = source.strands();
    let mut output = Vec::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        match *node {
            PermutationNode::BySource { source_moment } => {
                let strand = strands.get(source_moment.wrapping_sub(1)).ok_or_else(|| {
                    KrystalError::IndexOutOfRange(format!(
                        "source moment {source_moment} of {}",
                        strands.len()
                    ))
                })?;
                output.push(strand.clone());
            }
            PermutationNode::ByContour { axis, contour } => {
                let strand = strands.get(i).ok_or_else(|| {
                    KrystalError::IndexOutOfRange(format!("node {} has no source strand", i + 1))
                })?;
                output.push(permute_values(strand, axis, contour, sort_first, contours)?);
            }
        }
    }
    Ok(output)
}

/// Reorder one strand's values by the contour for its density.
pub fn permute_values<C: ContourTable>(
    strand: &Strand,
    axis: u32,
    contour: u32,
    sort_first: bool,
    contours: &C,
) -> Result<Strand, KrystalError> {
    let mut values = strand.values.clone();
    if sort_first {
        values.sort_unstable();
    }
    let perm = contours.contour(values.len(), contour, axis)?;
    let permuted = perm
        .iter()
        .map(|&p| {
            values.get(p.wrapping_sub(1)).copied().ok_or_else(|| {
                KrystalError::IndexOutOfRange(format!(
                    "contour entry {p} for density {}",
                    values.len()
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Strand::new(strand.level, permuted))
}
