//! Script discovery - lists `*.sql` files in the scripts directory

use std::path::Path;

use crate::domain::result::{Error, Result};
use crate::domain::ScriptFile;

/// Fail unless `dir` exists and is a directory
pub fn ensure_scripts_directory(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Err(Error::configuration("scripts directory is not set"));
    }
    if !dir.is_dir() {
        return Err(Error::configuration(format!(
            "scripts directory {} does not exist",
            dir.display()
        )));
    }
    Ok(())
}

/// List the `.sql` files directly inside `dir`, sorted by filename
///
/// Lexical filename order is the migration order. Subdirectories are not
/// searched; the extension is matched case-insensitively.
pub fn discover_scripts(dir: &Path) -> Result<Vec<ScriptFile>> {
    let mut scripts = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() && !path.is_file() {
            continue;
        }

        let is_sql = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"));
        if !is_sql {
            continue;
        }

        match entry.file_name().into_string() {
            Ok(name) => scripts.push(ScriptFile::new(name, path)),
            Err(raw) => {
                tracing::warn!("Skipping script with non UTF-8 name: {:?}", raw);
            }
        }
    }

    scripts.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(scripts)
}
