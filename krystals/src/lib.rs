// krystals: krystal model, file format and permutation engine.
//
// A krystal is an ordered list of level-tagged strands of integers that
// together encode a nested bracketing (see `krystal.rs`). This crate loads
// and saves krystal files and derives permutation krystals: a source krystal
// reordered, group by group, under two coarser control krystals (axis and
// contour) at a chosen permutation level.
//
// Module overview:
// - `krystal.rs`:             Strand and Krystal, plus derived level/max/shape.
// - `format.rs`:              XML krystal documents (read, write, canonical layout).
// - `name.rs`:                Content-addressed file names `pk{level}({max})-{n}`.
// - `config.rs`:              KrystalsConfig: folder and file suffix (JSON).
// - `folder.rs`:              KrystalsFolder: file-system side of persistence.
// - `input.rs`:               Loaded source/axis/contour inputs.
// - `validate.rs`:            Level-ordering and density checks run at construction.
// - `grouping.rs`:            Outer and inner super-strand views over a source.
// - `alignment.rs`:           Control krystal values aligned to source groups.
// - `permutation.rs`:         Permutation nodes and output materialisation.
// - `permutation_krystal.rs`: PermutationKrystal lifecycle (create, permute, save, rebuild).
// - `error.rs`:               KrystalError.
// - `contour`:                Re-exported from `krystals_contour`: the contour table.
//
// The binary in `main.rs` is a thin CLI over this library.
//
// **Critical constraint: determinism.** Permuting the same inputs with the
// same parameters always yields the same strands, so rebuilding a saved
// krystal reproduces its file byte for byte.

pub mod alignment;
pub mod config;
pub use krystals_contour as contour;
pub mod error;
pub mod folder;
pub mod format;
pub mod grouping;
pub mod input;
pub mod krystal;
pub mod name;
pub mod permutation;
pub mod permutation_krystal;
pub mod validate;

pub use config::KrystalsConfig;
pub use error::{InputRole, KrystalError};
pub use folder::KrystalsFolder;
pub use krystal::{Krystal, Strand};
pub use permutation::PermutationNode;
pub use permutation_krystal::PermutationKrystal;
