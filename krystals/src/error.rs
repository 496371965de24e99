// Error taxonomy for the krystals crate.
//
// Every fallible operation in the library returns `KrystalError`. The
// variants split into three groups:
// - construction failures that reflect bad inputs and are never retried
//   (`InvalidPermutationLevel`, `NotPermutable`, `MissingOrMalformedInput`);
// - contract violations inside the engine (`IndexOutOfRange`) that indicate a
//   krystal whose level structure does not match its declared level;
// - plumbing (`Malformed`, `BadName`, `Unmaterialized`, I/O, XML, JSON).
//
// See also: `validate.rs` (which produces the first two), `input.rs` (which
// wraps loader failures into `MissingOrMalformedInput`).

use std::fmt;
use std::path::PathBuf;

use krystals_contour::ContourError;
use thiserror::Error;

/// Which of the three inputs of a permutation krystal failed to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRole {
    Source,
    Axis,
    Contour,
}

impl fmt::Display for InputRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputRole::Source => "source",
            InputRole::Axis => "axis",
            InputRole::Contour => "contour",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while loading, permuting or saving krystals.
#[derive(Debug, Error)]
pub enum KrystalError {
    /// One of the level-ordering rules between source, axis, contour and the
    /// requested permutation level failed.
    #[error("invalid permutation level {level}: {reason}")]
    InvalidPermutationLevel { level: u32, reason: &'static str },

    /// A group of the source krystal is too dense to have a contour.
    #[error("cannot permute the source krystal: {0}")]
    NotPermutable(String),

    /// An input krystal file is missing or could not be parsed.
    #[error("cannot load {role} krystal {}: {reason}", .path.display())]
    MissingOrMalformedInput {
        role: InputRole,
        path: PathBuf,
        reason: String,
    },

    /// Alignment or grouping stepped outside a krystal's strands.
    #[error("index out of range: {0}")]
    IndexOutOfRange(String),

    /// A krystal document or strand list breaks the structural rules.
    #[error("malformed krystal: {0}")]
    Malformed(String),

    /// A krystal file name does not follow `pk{level}({max})-{index}{suffix}`.
    #[error("bad krystal name: {0}")]
    BadName(String),

    /// `save` was called before `permute` produced any strands.
    #[error("the krystal has no strands yet (call permute first)")]
    Unmaterialized,

    #[error(transparent)]
    Contour(#[from] ContourError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_rule() {
        let err = KrystalError::InvalidPermutationLevel {
            level: 0,
            reason: "must be > 0",
        };
        assert_eq!(err.to_string(), "invalid permutation level 0: must be > 0");

        let err = KrystalError::MissingOrMalformedInput {
            role: InputRole::Axis,
            path: PathBuf::from("krystals/lk1(6)-1.krys"),
            reason: "file not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "cannot load axis krystal krystals/lk1(6)-1.krys: file not found"
        );
    }

    #[test]
    fn contour_errors_pass_through() {
        let err: KrystalError = ContourError::DensityOutOfRange(9).into();
        assert_eq!(err.to_string(), ContourError::DensityOutOfRange(9).to_string());
    }
}
