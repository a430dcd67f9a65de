pub mod file;
pub mod stdin;

use serde_json::Value;

/// Load a JSON document from `--input` if given, otherwise from piped stdin.
pub fn load_document(path: Option<&str>) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Some(file::read_json_value(path)?)),
        None => stdin::read_stdin(),
    }
}
