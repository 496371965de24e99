// Permutation krystals: construction, materialisation and persistence.
//
// A `PermutationKrystal` is derived from three read-only inputs (source, axis
// and contour krystals) plus two parameters (permutation level and the
// sort-first flag). Construction is a strict pipeline:
//
//   load inputs -> validate -> group -> align -> build nodes
//
// and either yields a complete krystal or an error; nothing partially built
// escapes. The output strands stay empty until `permute()` runs and are
// replaced wholesale on every call.
//
// Persistence writes the five heredity attributes (`source`, `axis`,
// `contour`, `pLevel`, `sortFirst`) and the output strands. Names are
// content-addressed (`pk{level}({max})-{index}`): when an upstream input
// changes and the rebuilt content no longer matches its name, the old file
// is deleted and the krystal is saved under a fresh name. `rebuild()` is the
// single-krystal step of a cascading rebuild; discovering which krystals
// depend on which is left to the host.
//
// See also: `permutation.rs` for the node computation, `folder.rs` for the
// file-system side of saving.

use std::path::{Path, PathBuf};

use krystals_contour::{ContourTable, StandardContours};
use tracing::{debug, info, warn};

use crate::alignment::align;
use crate::error::{InputRole, KrystalError};
use crate::folder::KrystalsFolder;
use crate::format::KrystalDocument;
use crate::input::InputKrystal;
use crate::krystal::{Krystal, Strand, max_level, max_value};
use crate::name::{KrystalName, PERMUTATION_PREFIX};
use crate::permutation::{PermutationNode, build_nodes, materialize};
use crate::validate::check_inputs;

/// Heredity element name of permutation krystals.
pub const PERMUTATION_KIND: &str = "permutation";

/// The five attributes that record how a permutation krystal was derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationHeredity {
    pub source: String,
    pub axis: String,
    pub contour: String,
    pub permutation_level: u32,
    pub sort_first: bool,
}

impl PermutationHeredity {
    /// Attributes in the order they are written.
    pub fn to_attributes(&self) -> Vec<(String, String)> {
        vec![
            ("source".into(), self.source.clone()),
            ("axis".into(), self.axis.clone()),
            ("contour".into(), self.contour.clone()),
            ("pLevel".into(), self.permutation_level.to_string()),
            ("sortFirst".into(), self.sort_first.to_string()),
        ]
    }

    pub fn from_document(document: &KrystalDocument) -> Result<Self, KrystalError> {
        if document.kind != PERMUTATION_KIND {
            return Err(KrystalError::Malformed(format!(
                "expected a permutation krystal, found <{}>",
                document.kind
            )));
        }
        let required = |name: &str| {
            document
                .attribute(name)
                .ok_or_else(|| KrystalError::Malformed(format!("missing attribute {name:?}")))
        };
        let level = required("pLevel")?;
        let permutation_level = level
            .trim()
            .parse()
            .map_err(|_| KrystalError::Malformed(format!("bad pLevel {level:?}")))?;
        let sort_first = match required("sortFirst")?.trim() {
            "true" => true,
            "false" => false,
            other => {
                return Err(KrystalError::Malformed(format!("bad sortFirst {other:?}")));
            }
        };
        Ok(PermutationHeredity {
            source: required("source")?.to_owned(),
            axis: required("axis")?.to_owned(),
            contour: required("contour")?.to_owned(),
            permutation_level,
            sort_first,
        })
    }
}

/// A krystal derived by permuting a source krystal under axis and contour
/// control krystals.
#[derive(Debug, Clone)]
pub struct PermutationKrystal<C: ContourTable = StandardContours> {
    name: Option<String>,
    source: InputKrystal,
    axis: InputKrystal,
    contour: InputKrystal,
    permutation_level: u32,
    sort_first: bool,
    nodes: Vec<PermutationNode>,
    strands: Vec<Strand>,
    contours: C,
}

impl PermutationKrystal {
    /// Create a new, unnamed permutation krystal from three krystal files.
    /// The output has no strands until `permute()` is called.
    pub fn create(
        source_path: &Path,
        axis_path: &Path,
        contour_path: &Path,
        permutation_level: u32,
        sort_first: bool,
    ) -> Result<Self, KrystalError> {
        Self::create_with_contours(
            source_path,
            axis_path,
            contour_path,
            permutation_level,
            sort_first,
            StandardContours,
        )
    }

    /// Load a saved permutation krystal; its inputs are resolved in `folder`.
    pub fn open(folder: &KrystalsFolder, name: &str) -> Result<Self, KrystalError> {
        Self::open_with_contours(folder, name, StandardContours)
    }
}

impl<C: ContourTable> PermutationKrystal<C> {
    /// `create` with a caller-supplied contour table.
    pub fn create_with_contours(
        source_path: &Path,
        axis_path: &Path,
        contour_path: &Path,
        permutation_level: u32,
        sort_first: bool,
        contours: C,
    ) -> Result<Self, KrystalError> {
        let source = InputKrystal::load(source_path, InputRole::Source)?;
        let axis = InputKrystal::load(axis_path, InputRole::Axis)?;
        let contour = InputKrystal::load(contour_path, InputRole::Contour)?;
        Self::from_inputs(source, axis, contour, permutation_level, sort_first, contours)
    }

    /// Build from already-loaded inputs: validate, then compute the nodes.
    pub fn from_inputs(
        source: InputKrystal,
        axis: InputKrystal,
        contour: InputKrystal,
        permutation_level: u32,
        sort_first: bool,
        contours: C,
    ) -> Result<Self, KrystalError> {
        check_inputs(source.krystal(), axis.krystal(), contour.krystal(), permutation_level)?;
        let mut krystal = PermutationKrystal {
            name: None,
            source,
            axis,
            contour,
            permutation_level,
            sort_first,
            nodes: Vec::new(),
            strands: Vec::new(),
            contours,
        };
        krystal.nodes = krystal.compute_nodes()?;
        debug!(
            source = krystal.source.filename(),
            permutation_level,
            sort_first,
            nodes = krystal.nodes.len(),
            "built permutation krystal"
        );
        Ok(krystal)
    }

    /// `open` with a caller-supplied contour table. The stored strands are
    /// kept as the current output; `rebuild()` recomputes them.
    pub fn open_with_contours(
        folder: &KrystalsFolder,
        name: &str,
        contours: C,
    ) -> Result<Self, KrystalError> {
        let document = folder.read(name)?;
        let heredity = PermutationHeredity::from_document(&document)?;
        let source = folder.load_input(&heredity.source, InputRole::Source)?;
        let axis = folder.load_input(&heredity.axis, InputRole::Axis)?;
        let contour = folder.load_input(&heredity.contour, InputRole::Contour)?;
        let mut krystal = Self::from_inputs(
            source,
            axis,
            contour,
            heredity.permutation_level,
            heredity.sort_first,
            contours,
        )?;
        krystal.name = Some(name.to_owned());
        krystal.strands = document.strands;
        Ok(krystal)
    }

    fn compute_nodes(&self) -> Result<Vec<PermutationNode>, KrystalError> {
        let source = self.source.krystal();
        let axis_values = align(source, self.permutation_level, self.axis.krystal())?;
        let contour_values = align(source, self.permutation_level, self.contour.krystal())?;
        build_nodes(
            source,
            &axis_values,
            &contour_values,
            self.permutation_level,
            self.sort_first,
            &self.contours,
        )
    }

    /// Change the permutation parameters. Re-validates and recomputes the
    /// nodes; the output strands are cleared and the krystal forgets its
    /// name, since its content will differ. On error nothing changes.
    pub fn set_parameters(&mut self, permutation_level: u32, sort_first: bool) -> Result<(), KrystalError> {
        check_inputs(
            self.source.krystal(),
            self.axis.krystal(),
            self.contour.krystal(),
            permutation_level,
        )?;
        let previous = (self.permutation_level, self.sort_first);
        self.permutation_level = permutation_level;
        self.sort_first = sort_first;
        match self.compute_nodes() {
            Ok(nodes) => {
                self.nodes = nodes;
                self.strands.clear();
                self.name = None;
                Ok(())
            }
            Err(e) => {
                (self.permutation_level, self.sort_first) = previous;
                Err(e)
            }
        }
    }

    /// Materialise the output strands from the node list, discarding any
    /// previous output.
    pub fn permute(&mut self) -> Result<(), KrystalError> {
        self.strands.clear();
        self.strands = materialize(
            self.source.krystal(),
            &self.nodes,
            self.sort_first,
            &self.contours,
        )?;
        Ok(())
    }

    /// Save into `folder` and return the path written.
    ///
    /// An unnamed krystal reuses the name of an identical saved krystal, or
    /// takes the first free `pk{level}({max})-{n}` name. A named krystal
    /// whose level or max value no longer matches its name has its old file
    /// deleted and moves to a fresh name. Without `overwrite`, an existing
    /// file holding different content is never replaced: the krystal moves
    /// to a fresh name instead. An existing file that cannot be read is an
    /// error.
    pub fn save(&mut self, folder: &KrystalsFolder, overwrite: bool) -> Result<PathBuf, KrystalError> {
        if self.strands.is_empty() {
            return Err(KrystalError::Unmaterialized);
        }
        let level = self.level();
        let max_value = self.max_value();
        let document = self.document();

        if let Some(name) = self.name.clone() {
            let parsed = KrystalName::parse(&name)?;
            if !parsed.matches_content(level, max_value) {
                warn!(
                    old = %name,
                    level,
                    max_value,
                    "content no longer matches name; deleting and renaming"
                );
                folder.remove(&name)?;
                self.name = None;
            } else if !overwrite && folder.exists(&name) && folder.read(&name)? != document {
                debug!(file = %name, "not overwriting; saving under a new name");
                self.name = None;
            }
        }

        let name = match self.name.clone() {
            Some(name) => name,
            None => {
                let name = match folder.equivalent_name(PERMUTATION_PREFIX, level, max_value, &document)? {
                    Some(existing) => existing,
                    None => folder.free_name(PERMUTATION_PREFIX, level, max_value),
                };
                self.name = Some(name.clone());
                name
            }
        };

        let path = folder.write(&name, &document)?;
        info!(file = %name, strands = self.strands.len(), "saved permutation krystal");
        Ok(path)
    }

    /// Re-permute against the currently loaded inputs, then save in place.
    pub fn rebuild(&mut self, folder: &KrystalsFolder) -> Result<PathBuf, KrystalError> {
        self.rebuild_with(folder, true)
    }

    /// `rebuild` with an explicit overwrite policy (see `save`).
    pub fn rebuild_with(&mut self, folder: &KrystalsFolder, overwrite: bool) -> Result<PathBuf, KrystalError> {
        self.permute()?;
        self.save(folder, overwrite)
    }

    /// The document this krystal saves as.
    pub fn document(&self) -> KrystalDocument {
        KrystalDocument {
            kind: PERMUTATION_KIND.to_owned(),
            attributes: self.heredity().to_attributes(),
            strands: self.strands.clone(),
        }
    }

    pub fn heredity(&self) -> PermutationHeredity {
        PermutationHeredity {
            source: self.source.filename().to_owned(),
            axis: self.axis.filename().to_owned(),
            contour: self.contour.filename().to_owned(),
            permutation_level: self.permutation_level,
            sort_first: self.sort_first,
        }
    }

    /// The output as a plain krystal (fails before `permute()`).
    pub fn to_krystal(&self) -> Result<Krystal, KrystalError> {
        Krystal::from_strands(self.strands.clone())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Maximum level of the output strands.
    pub fn level(&self) -> u32 {
        max_level(&self.strands)
    }

    /// Maximum value of the output strands.
    pub fn max_value(&self) -> u32 {
        max_value(&self.strands)
    }

    pub fn strands(&self) -> &[Strand] {
        &self.strands
    }

    pub fn nodes(&self) -> &[PermutationNode] {
        &self.nodes
    }

    pub fn source(&self) -> &InputKrystal {
        &self.source
    }

    pub fn axis(&self) -> &InputKrystal {
        &self.axis
    }

    pub fn contour(&self) -> &InputKrystal {
        &self.contour
    }

    pub fn permutation_level(&self) -> u32 {
        self.permutation_level
    }

    pub fn sort_first(&self) -> bool {
        self.sort_first
    }
}
