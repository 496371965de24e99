// Krystal base model: strands and the krystal that owns them.
//
// A krystal is an ordered, non-empty list of strands. Each strand carries a
// level (how many enclosing levels close and reopen at that point; level 1
// is the coarsest boundary) and a non-empty list of non-negative values.
// Read in order, the levels form the krystal's nested bracketing.
//
// The one exception to "levels start at 1" is the constant krystal: a single
// strand at level 0 holding a single value. Constants are the usual axis and
// contour inputs for permutations at level 1.
//
// Level, max value and shape are derived from the strands on demand, never
// stored, so they can never disagree with the content.
//
// See also: `format.rs` for the on-disk form, `grouping.rs` and
// `alignment.rs` for the views the permutation engine builds over strands.

use serde::{Deserialize, Serialize};

use crate::error::KrystalError;

/// One level-tagged run of values within a krystal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Strand {
    pub level: u32,
    pub values: Vec<u32>,
}

impl Strand {
    pub fn new(level: u32, values: Vec<u32>) -> Self {
        Strand { level, values }
    }

    /// Number of values in the strand.
    pub fn density(&self) -> usize {
        self.values.len()
    }
}

/// An ordered sequence of strands forming a nested multi-level structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Strand>", into = "Vec<Strand>")]
pub struct Krystal {
    strands: Vec<Strand>,
}

impl Krystal {
    /// Build a krystal from strands, checking the structural rules:
    /// at least one strand, every strand non-empty, and level 0 only as the
    /// single one-value strand of a constant.
    pub fn from_strands(strands: Vec<Strand>) -> Result<Self, KrystalError> {
        if strands.is_empty() {
            return Err(KrystalError::Malformed("a krystal needs at least one strand".into()));
        }
        for (i, strand) in strands.iter().enumerate() {
            if strand.values.is_empty() {
                return Err(KrystalError::Malformed(format!("strand {} has no values", i + 1)));
            }
            if strand.level == 0 && (strands.len() != 1 || strand.values.len() != 1) {
                return Err(KrystalError::Malformed(format!(
                    "strand {} has level 0 but the krystal is not a single constant value",
                    i + 1
                )));
            }
        }
        Ok(Krystal { strands })
    }

    /// A level-0 krystal holding one value.
    pub fn constant(value: u32) -> Self {
        Krystal {
            strands: vec![Strand::new(0, vec![value])],
        }
    }

    pub fn strands(&self) -> &[Strand] {
        &self.strands
    }

    pub fn into_strands(self) -> Vec<Strand> {
        self.strands
    }

    /// Maximum strand level present.
    pub fn level(&self) -> u32 {
        max_level(&self.strands)
    }

    /// Maximum value present across all strands.
    pub fn max_value(&self) -> u32 {
        max_value(&self.strands)
    }

    pub fn min_value(&self) -> u32 {
        self.strands
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .min()
            .unwrap_or(0)
    }

    /// Total number of values across all strands.
    pub fn num_values(&self) -> usize {
        self.strands.iter().map(Strand::density).sum()
    }

    /// Element counts per level: for each level `L` in `1..=level()`, the
    /// number of strands whose level is at most `L`, followed by the total
    /// number of values. A constant's shape is `[1]`.
    pub fn shape(&self) -> Vec<usize> {
        let level = self.level();
        let mut shape: Vec<usize> = (1..=level)
            .map(|l| self.strands.iter().filter(|s| s.level <= l).count())
            .collect();
        shape.push(self.num_values());
        shape
    }

    /// `shape()` joined with colons, e.g. `"1:3:12"`.
    pub fn shape_string(&self) -> String {
        self.shape()
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl TryFrom<Vec<Strand>> for Krystal {
    type Error = KrystalError;

    fn try_from(strands: Vec<Strand>) -> Result<Self, Self::Error> {
        Krystal::from_strands(strands)
    }
}

impl From<Krystal> for Vec<Strand> {
    fn from(krystal: Krystal) -> Self {
        krystal.strands
    }
}

/// Maximum level over a strand list (0 when empty).
pub fn max_level(strands: &[Strand]) -> u32 {
    strands.iter().map(|s| s.level).max().unwrap_or(0)
}

/// Maximum value over a strand list (0 when empty).
pub fn max_value(strands: &[Strand]) -> u32 {
    strands
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_level() -> Krystal {
        Krystal::from_strands(vec![
            Strand::new(1, vec![1, 2, 3, 4]),
            Strand::new(2, vec![5, 1]),
            Strand::new(2, vec![3, 3, 2]),
        ])
        .unwrap()
    }

    #[test]
    fn derived_properties() {
        let k = two_level();
        assert_eq!(k.level(), 2);
        assert_eq!(k.max_value(), 5);
        assert_eq!(k.min_value(), 1);
        assert_eq!(k.num_values(), 9);
        assert_eq!(k.shape(), vec![1, 3, 9]);
        assert_eq!(k.shape_string(), "1:3:9");
    }

    #[test]
    fn constant_krystal() {
        let k = Krystal::constant(7);
        assert_eq!(k.level(), 0);
        assert_eq!(k.max_value(), 7);
        assert_eq!(k.shape(), vec![1]);
    }

    #[test]
    fn empty_krystal_is_rejected() {
        assert!(matches!(
            Krystal::from_strands(Vec::new()),
            Err(KrystalError::Malformed(_))
        ));
    }

    #[test]
    fn empty_strand_is_rejected() {
        let result = Krystal::from_strands(vec![Strand::new(1, vec![1]), Strand::new(2, vec![])]);
        assert!(matches!(result, Err(KrystalError::Malformed(_))));
    }

    #[test]
    fn level_zero_only_as_constant() {
        assert!(Krystal::from_strands(vec![Strand::new(0, vec![3])]).is_ok());
        assert!(Krystal::from_strands(vec![Strand::new(0, vec![3, 4])]).is_err());
        assert!(
            Krystal::from_strands(vec![Strand::new(1, vec![3]), Strand::new(0, vec![4])]).is_err()
        );
    }

    #[test]
    fn serde_goes_through_validation() {
        let k = two_level();
        let json = serde_json::to_string(&k).unwrap();
        let back: Krystal = serde_json::from_str(&json).unwrap();
        assert_eq!(k, back);
        assert!(serde_json::from_str::<Krystal>("[]").is_err());
    }
}
