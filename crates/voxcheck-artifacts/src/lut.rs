use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// Label-id → structure-name lookup, loaded from a tab-separated
/// table (`id<TAB>name[<TAB>...]`, `#` comment lines skipped) and
/// inverted once at load time.
#[derive(Debug, Clone, Default)]
pub struct LabelLookup {
    names: HashMap<i64, String>,
}

impl LabelLookup {
    pub fn from_tsv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .comment(Some(b'#'))
            .flexible(true)
            .from_path(path)
            .map_err(|err| match err.kind() {
                csv::ErrorKind::Io(_) => Error::MissingArtifact(path.to_path_buf()),
                _ => Error::Csv(err),
            })?;

        let mut names = HashMap::new();
        for record in reader.records() {
            let record = record?;
            if record.len() < 2 {
                return Err(Error::Parse(format!(
                    "lookup table row needs id and name: {:?}",
                    record
                )));
            }
            let id: i64 = record[0].trim().parse().map_err(|_| {
                Error::Parse(format!("invalid label id in lookup table: {:?}", &record[0]))
            })?;
            names.insert(id, record[1].trim().to_string());
        }
        Ok(Self { names })
    }

    pub fn name(&self, id: i64) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
