use std::io::{self, Write};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::commands::{CommandResult, ErrorReport};
use crate::error::CliError;

/// The single JSON document printed for every command.
#[derive(Debug, Serialize)]
pub struct Envelope<'a> {
    pub meta: Meta,
    pub data: &'a Value,
    #[serde(skip_serializing_if = "<[ErrorReport]>::is_empty")]
    pub errors: &'a [ErrorReport],
}

#[derive(Debug, Serialize)]
pub struct Meta {
    pub command: &'static str,
    pub elapsed_ms: u64,
}

impl<'a> Envelope<'a> {
    pub fn new(command: &'static str, result: &'a CommandResult, elapsed: Duration) -> Self {
        Self {
            meta: Meta {
                command,
                elapsed_ms: elapsed.as_millis().min(u128::from(u64::MAX)) as u64,
            },
            data: &result.data,
            errors: &result.errors,
        }
    }
}

pub fn render(envelope: &Envelope<'_>, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    write_envelope(&mut stdout.lock(), envelope, pretty)
}

fn write_envelope(
    writer: &mut impl Write,
    envelope: &Envelope<'_>,
    pretty: bool,
) -> Result<(), CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(envelope)?
    } else {
        serde_json::to_string(envelope)?
    };
    writeln!(writer, "{payload}")?;
    Ok(())
}
