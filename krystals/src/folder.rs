// The krystals folder: where krystal files live and how new ones are named.
//
// All krystal file names (including the `source`/`axis`/`contour` references
// inside permutation krystals) are resolved against one folder supplied by
// the host. This module owns the file-system side of persistence: reading
// and writing documents, probing for free content-addressed names, finding a
// saved krystal with identical content, and deleting stale files.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::KrystalsConfig;
use crate::error::{InputRole, KrystalError};
use crate::format::{KrystalDocument, read_document, write_document};
use crate::input::InputKrystal;
use crate::name::KrystalName;

/// Handle on the folder that holds krystal files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KrystalsFolder {
    root: PathBuf,
    suffix: String,
}

impl KrystalsFolder {
    pub fn new(root: impl Into<PathBuf>, suffix: &str) -> Self {
        KrystalsFolder {
            root: root.into(),
            suffix: suffix.to_owned(),
        }
    }

    pub fn from_config(config: &KrystalsConfig) -> Self {
        Self::new(config.krystals_folder.clone(), &config.filename_suffix)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    /// Load a krystal from the folder as an input of the given role.
    pub fn load_input(&self, name: &str, role: InputRole) -> Result<InputKrystal, KrystalError> {
        InputKrystal::load(&self.path_of(name), role)
    }

    pub fn read(&self, name: &str) -> Result<KrystalDocument, KrystalError> {
        read_document(&self.path_of(name))
    }

    pub fn write(&self, name: &str, document: &KrystalDocument) -> Result<PathBuf, KrystalError> {
        let path = self.path_of(name);
        write_document(&path, document)?;
        Ok(path)
    }

    /// Delete a krystal file. A file that is already gone is not an error.
    pub fn remove(&self, name: &str) -> Result<(), KrystalError> {
        match std::fs::remove_file(self.path_of(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// The first `{prefix}{level}({max})-{n}{suffix}` with no file, probing
    /// `n = 1, 2, ...`.
    pub fn free_name(&self, prefix: &str, level: u32, max_value: u32) -> String {
        (1..)
            .map(|index| KrystalName::new(prefix, level, max_value, index, &self.suffix).to_string())
            .find(|name| !self.exists(name))
            .unwrap_or_default()
    }

    /// Names of the files in the folder carrying `prefix`, `level` and
    /// `max_value`, sorted by index.
    pub fn names_with(&self, prefix: &str, level: u32, max_value: u32) -> Result<Vec<String>, KrystalError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut found: Vec<(u32, String)> = Vec::new();
        for entry in entries {
            let file_name = entry?.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let Ok(parsed) = KrystalName::parse(file_name) else {
                continue;
            };
            if parsed.prefix == prefix
                && parsed.suffix == self.suffix
                && parsed.matches_content(level, max_value)
            {
                found.push((parsed.index, file_name.to_owned()));
            }
        }
        found.sort();
        Ok(found.into_iter().map(|(_, name)| name).collect())
    }

    /// The name of a saved krystal whose document equals `document`, if any.
    /// Only files with the matching prefix, level and max value are read.
    pub fn equivalent_name(
        &self,
        prefix: &str,
        level: u32,
        max_value: u32,
        document: &KrystalDocument,
    ) -> Result<Option<String>, KrystalError> {
        for name in self.names_with(prefix, level, max_value)? {
            match self.read(&name) {
                Ok(saved) if saved == *document => {
                    debug!(file = %name, "found equivalent saved krystal");
                    return Ok(Some(name));
                }
                Ok(_) => {}
                Err(e) => debug!(file = %name, error = %e, "skipping unreadable krystal"),
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::krystal::Strand;

    fn document(values: Vec<u32>) -> KrystalDocument {
        KrystalDocument {
            kind: "permutation".into(),
            attributes: vec![("pLevel".into(), "1".into())],
            strands: vec![Strand::new(1, values)],
        }
    }

    #[test]
    fn free_name_probes_upwards() {
        let dir = tempfile::TempDir::new().unwrap();
        let folder = KrystalsFolder::new(dir.path(), ".krys");
        assert_eq!(folder.free_name("pk", 2, 9), "pk2(9)-1.krys");
        folder.write("pk2(9)-1.krys", &document(vec![9])).unwrap();
        folder.write("pk2(9)-2.krys", &document(vec![9, 1])).unwrap();
        assert_eq!(folder.free_name("pk", 2, 9), "pk2(9)-3.krys");
        assert_eq!(folder.free_name("pk", 2, 8), "pk2(8)-1.krys");
    }

    #[test]
    fn equivalent_name_matches_content_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let folder = KrystalsFolder::new(dir.path(), ".krys");
        folder.write("pk1(9)-1.krys", &document(vec![9, 1])).unwrap();
        folder.write("pk1(9)-2.krys", &document(vec![1, 9])).unwrap();
        folder.write("pk1(9)-3.txt", &document(vec![9])).unwrap();

        assert_eq!(
            folder.equivalent_name("pk", 1, 9, &document(vec![1, 9])).unwrap(),
            Some("pk1(9)-2.krys".to_owned())
        );
        assert_eq!(folder.equivalent_name("pk", 1, 9, &document(vec![9])).unwrap(), None);
        assert_eq!(
            folder.names_with("pk", 1, 9).unwrap(),
            vec!["pk1(9)-1.krys".to_owned(), "pk1(9)-2.krys".to_owned()]
        );
    }

    #[test]
    fn missing_folder_has_no_names() {
        let dir = tempfile::TempDir::new().unwrap();
        let folder = KrystalsFolder::new(dir.path().join("absent"), ".krys");
        assert!(folder.names_with("pk", 1, 1).unwrap().is_empty());
    }

    #[test]
    fn remove_tolerates_missing_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let folder = KrystalsFolder::new(dir.path(), ".krys");
        folder.write("pk1(1)-1.krys", &document(vec![1])).unwrap();
        folder.remove("pk1(1)-1.krys").unwrap();
        assert!(!folder.exists("pk1(1)-1.krys"));
        folder.remove("pk1(1)-1.krys").unwrap();
    }

    #[test]
    fn from_config_uses_folder_and_suffix() {
        let config = KrystalsConfig {
            krystals_folder: PathBuf::from("/k"),
            filename_suffix: ".kry".into(),
        };
        let folder = KrystalsFolder::from_config(&config);
        assert_eq!(folder.root(), Path::new("/k"));
        assert_eq!(folder.suffix(), ".kry");
        assert_eq!(folder.path_of("pk1(1)-1.kry"), PathBuf::from("/k/pk1(1)-1.kry"));
    }
}
