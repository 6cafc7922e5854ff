//! The `explain` command: display documentation for error codes.

use std::io::Write;

use vmf_diagnostic::{ErrorCode, ErrorDocs};

use crate::CliError;

/// Write the documentation for `code_str` to `out`.
pub fn explain_error(code_str: &str, out: &mut dyn Write) -> Result<(), CliError> {
    let Ok(code) = code_str.parse::<ErrorCode>() else {
        return Err(CliError::UnknownCode(code_str.to_owned()));
    };
    let Some(doc) = ErrorDocs::get(code) else {
        return Err(CliError::NoDocs(code.to_string()));
    };
    writeln!(out, "{doc}").map_err(|source| CliError::Write {
        path: "<stdout>".to_owned(),
        source,
    })
}
