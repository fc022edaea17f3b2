use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::EngineResult;

const TMP_SUFFIX: &str = "tmp";

/// Serializes `value` as pretty JSON and writes it by staging to a temporary file.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> EngineResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = tmp_path(path);
    write_file(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Reads a JSON document from disk, returning structured errors on failure.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> EngineResult<T> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> EngineResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn tmp_path_keeps_original_extension() {
        let tmp = tmp_path(Path::new("/data/snapshot.json"));
        assert_eq!(tmp, PathBuf::from("/data/snapshot.json.tmp"));
        assert_eq!(tmp_path(Path::new("plain")), PathBuf::from("plain.tmp"));
    }

    #[test]
    fn save_then_load_leaves_no_staging_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("values.json");
        save_json(&vec![1u32, 2, 3], &path).unwrap();
        let loaded: Vec<u32> = load_json(&path).unwrap();
        assert_eq!(loaded, vec![1, 2, 3]);
        assert!(!tmp_path(&path).exists());
    }
}
