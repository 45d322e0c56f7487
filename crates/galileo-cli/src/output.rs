//! Writing command results.

use std::{io, io::Write, path::Path};

use log::info;
use serde::{Serialize, de::DeserializeOwned};

use galileo::GalileoError;

/// Prints `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), GalileoError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).map_err(io::Error::from)?;
    writeln!(stdout)?;
    Ok(())
}

/// Writes binary command output to `path`.
pub(crate) async fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), GalileoError> {
    let contents = contents.as_ref();
    tokio::fs::write(path, contents).await?;
    info!(path = path.display().to_string(), bytes = contents.len(); "File written");
    Ok(())
}

/// Parses a JSON command-line argument.
pub(crate) fn parse_json<T: DeserializeOwned>(flag: &str, raw: &str) -> Result<T, GalileoError> {
    serde_json::from_str(raw).map_err(|err| GalileoError::Config(format!("invalid JSON for --{flag}: {err}")))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn test_parse_json_names_the_flag() {
        let err = parse_json::<Value>("features", "{nope").unwrap_err();
        assert!(err.to_string().contains("--features"));
    }

    #[test]
    fn test_parse_json() {
        let value: Vec<u32> = parse_json("rows", "[1, 2]").unwrap();
        assert_eq!(value, vec![1, 2]);
    }
}
