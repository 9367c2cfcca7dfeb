//! File inputs in snarkjs formats.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// `public.json`: an array of decimal strings. Bare numbers are accepted too.
pub fn read_signals(path: &Path) -> Result<Vec<String>> {
    let values: Vec<Value> = read_json(path)?;
    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| match value {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => anyhow::bail!("public signal {i} in {} is {other}", path.display()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_string_and_numeric_signals() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["15", 7]"#).unwrap();
        assert_eq!(read_signals(file.path()).unwrap(), ["15", "7"]);
    }

    #[test]
    fn rejects_nested_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[["1"]]"#).unwrap();
        assert!(read_signals(file.path()).is_err());
    }
}
