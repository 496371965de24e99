// Contour table for krystal permutation.
//
// A contour is a permutation of `1..=density` used to reorder a small group
// of elements: entry `j` of the contour names (1-based) which element lands
// in position `j`. The permutation engine in the `krystals` crate asks for a
// contour once per group (or once per strand when permuting values) and never
// looks inside the table.
//
// The table is indexed by three small integers:
// - `density` (1..=7): how many elements the group has. Densities beyond 7
//   have no contours; the engine refuses to permute such groups up front.
// - a contour selector: picks the base shape. Selectors fold into 1..=12, so
//   0 behaves as 12 and 13 as 1. The base shape is the `(c - 1) mod density!`
//   permutation in lexicographic order (contour 1 is always the identity).
// - an axis selector: also folds into 1..=12 and rotates the base shape left
//   by `(a - 1) mod density` positions.
//
// `ContourTable` is the seam the engine calls through; `StandardContours`
// implements it with this table. Tests (and hosts with hand-drawn contours)
// can substitute their own table.
//
// **Critical constraint: determinism.** Every saved krystal depends on this
// table. Changing the folding rule or the ordering of shapes changes every
// permutation krystal ever derived with it.

use thiserror::Error;

/// Largest group size that has contours.
pub const MAX_DENSITY: usize = 7;

/// Number of distinct contour selectors before they wrap.
pub const CONTOURS_PER_DENSITY: u32 = 12;

/// Number of distinct axis selectors before they wrap.
pub const AXES_PER_DENSITY: u32 = 12;

/// Errors from contour lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContourError {
    /// There are no contours for empty groups or groups of more than
    /// seven elements.
    #[error("no contour exists for density {0} (must be 1..=7)")]
    DensityOutOfRange(usize),
}

/// A source of contours. Implementations must return a permutation of
/// `1..=density` for every density in `1..=MAX_DENSITY`.
pub trait ContourTable {
    fn contour(
        &self,
        density: usize,
        contour_number: u32,
        axis_number: u32,
    ) -> Result<Vec<usize>, ContourError>;
}

impl<T: ContourTable + ?Sized> ContourTable for &T {
    fn contour(
        &self,
        density: usize,
        contour_number: u32,
        axis_number: u32,
    ) -> Result<Vec<usize>, ContourError> {
        (**self).contour(density, contour_number, axis_number)
    }
}

/// The built-in contour table (see the module header for its layout).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandardContours;

impl ContourTable for StandardContours {
    fn contour(
        &self,
        density: usize,
        contour_number: u32,
        axis_number: u32,
    ) -> Result<Vec<usize>, ContourError> {
        contour(density, contour_number, axis_number)
    }
}

/// Look up a contour in the built-in table.
///
/// Returns a permutation of `1..=density`. Fails only when `density` is 0 or
/// greater than [`MAX_DENSITY`]; any selector value is accepted.
pub fn contour(
    density: usize,
    contour_number: u32,
    axis_number: u32,
) -> Result<Vec<usize>, ContourError> {
    if density == 0 || density > MAX_DENSITY {
        return Err(ContourError::DensityOutOfRange(density));
    }
    let shape = fold(contour_number, CONTOURS_PER_DENSITY) % factorial(density);
    let mut result = nth_permutation(density, shape);
    let rotation = fold(axis_number, AXES_PER_DENSITY) % density;
    result.rotate_left(rotation);
    Ok(result)
}

/// True if `candidate` is a permutation of `1..=candidate.len()`.
pub fn is_permutation(candidate: &[usize]) -> bool {
    let mut seen = [false; MAX_DENSITY + 1];
    if candidate.len() > MAX_DENSITY {
        return false;
    }
    for &entry in candidate {
        if entry == 0 || entry > candidate.len() || seen[entry] {
            return false;
        }
        seen[entry] = true;
    }
    true
}

/// Fold a 1-based selector into `0..period`, treating 0 as `period`.
fn fold(selector: u32, period: u32) -> usize {
    let folded = (u64::from(selector) + u64::from(period) - 1) % u64::from(period);
    folded as usize
}

fn factorial(n: usize) -> usize {
    (1..=n).product()
}

/// The `rank`-th permutation of `1..=density` in lexicographic order
/// (factorial number system). `rank` must be below `density!`.
fn nth_permutation(density: usize, mut rank: usize) -> Vec<usize> {
    let mut remaining: Vec<usize> = (1..=density).collect();
    let mut result = Vec::with_capacity(density);
    for position in (0..density).rev() {
        let block = factorial(position);
        result.push(remaining.remove(rank / block));
        rank %= block;
    }
    result
}
