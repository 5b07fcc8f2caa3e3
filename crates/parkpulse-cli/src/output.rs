use std::io::{self, Write};

use serde_json::Value;

use crate::error::CliError;

pub fn render(payload: &Value, pretty: bool) -> Result<(), CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(text.as_bytes())?;
    handle.write_all(b"\n")?;
    handle.flush()?;
    Ok(())
}
