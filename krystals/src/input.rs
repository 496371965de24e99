// Input krystals: the read-only source, axis and contour of a permutation.
//
// An input can be any kind of krystal; only its strands matter here. Load
// failures of every sort (missing file, bad XML, structurally invalid
// strands) are reported as `MissingOrMalformedInput` naming the role, so the
// caller can tell which of the three inputs is broken.

use std::path::Path;

use tracing::debug;

use crate::error::{InputRole, KrystalError};
use crate::format::read_document;
use crate::krystal::{Krystal, Strand};

/// A loaded input krystal together with the file name it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputKrystal {
    role: InputRole,
    filename: String,
    krystal: Krystal,
}

impl InputKrystal {
    /// Load a krystal file for the given role.
    pub fn load(path: &Path, role: InputRole) -> Result<Self, KrystalError> {
        let malformed = |reason: String| KrystalError::MissingOrMalformedInput {
            role,
            path: path.to_path_buf(),
            reason,
        };
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| malformed("path has no file name".into()))?
            .to_owned();
        let document = read_document(path).map_err(|e| malformed(e.to_string()))?;
        let krystal = Krystal::from_strands(document.strands).map_err(|e| malformed(e.to_string()))?;
        debug!(
            %role,
            file = %filename,
            level = krystal.level(),
            strands = krystal.strands().len(),
            "loaded input krystal"
        );
        Ok(InputKrystal {
            role,
            filename,
            krystal,
        })
    }

    /// Wrap an in-memory krystal (used when the host builds inputs itself).
    pub fn from_krystal(role: InputRole, filename: &str, krystal: Krystal) -> Self {
        InputKrystal {
            role,
            filename: filename.to_owned(),
            krystal,
        }
    }

    pub fn role(&self) -> InputRole {
        self.role
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn krystal(&self) -> &Krystal {
        &self.krystal
    }

    pub fn level(&self) -> u32 {
        self.krystal.level()
    }

    pub fn strands(&self) -> &[Strand] {
        self.krystal.strands()
    }
}
