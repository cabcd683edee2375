//! Rendering classified errors to the error stream.
//!
//! Output layout:
//!
//! ```text
//! Error: <summary>
//!   <field>: <message>        (validation errors, one per line)
//!   <hint>                    (zero or more)
//!   Request ID: <id>          (server-side errors only)
//! ```
//!
//! With debug diagnostics on, `Debug:` lines describing the error and the
//! classification branch precede the block. They never change the exit code.

use std::io::{self, Write};

use probectl_utils::ExitCode;

use crate::catalog::MessageCatalog;
use crate::classify::{ClassifiedError, classify};
use crate::fault::Fault;

const HINT_INDENT: &str = "  ";

/// Single point where failures become user-visible text and an exit code.
#[derive(Debug, Clone, Default)]
pub struct ErrorReporter {
    catalog: MessageCatalog,
    debug: bool,
}

impl ErrorReporter {
    #[must_use]
    pub fn new(catalog: MessageCatalog, debug: bool) -> Self {
        Self { catalog, debug }
    }

    /// Classify `fault`, write its message block to `out`, return the code.
    ///
    /// `None` is success and writes nothing. Write failures on `out` are
    /// ignored; they must not change the exit code.
    pub fn report<W: Write>(&self, fault: Option<&Fault>, out: &mut W) -> ExitCode {
        let Some(fault) = fault else {
            return ExitCode::SUCCESS;
        };

        let classified = classify(fault, &self.catalog);
        tracing::debug!(
            kind = fault.kind_name(),
            branch = classified.branch.as_str(),
            exit_code = classified.exit_code.as_i32(),
            "classified error"
        );

        if self.debug {
            let _ = write_debug(fault, &classified, out);
        }
        let _ = render(&classified, out);
        classified.exit_code
    }

    /// Adapt an `anyhow` error and report it.
    pub fn report_anyhow<W: Write>(&self, err: Option<&anyhow::Error>, out: &mut W) -> ExitCode {
        let fault = err.map(Fault::from_anyhow);
        if self.debug
            && let Some(err) = err
        {
            let _ = writeln!(out, "Debug: error chain: {err:#}");
        }
        self.report(fault.as_ref(), out)
    }
}

fn write_debug<W: Write>(fault: &Fault, classified: &ClassifiedError, out: &mut W) -> io::Result<()> {
    writeln!(out, "Debug: error type: {}", fault.kind_name())?;
    writeln!(out, "Debug: message: {fault}")?;
    writeln!(
        out,
        "Debug: classification: {} -> exit {}",
        classified.branch.as_str(),
        classified.exit_code
    )
}

/// Write the message block for a classified error. Silent results write
/// nothing.
///
/// # Errors
///
/// Propagates write failures from `out`.
pub fn render<W: Write>(classified: &ClassifiedError, out: &mut W) -> io::Result<()> {
    let Some(message) = &classified.message else {
        return Ok(());
    };

    writeln!(out, "Error: {message}")?;
    for (field, field_message) in &classified.field_errors {
        writeln!(out, "{HINT_INDENT}{field}: {field_message}")?;
    }
    for hint in &classified.hints {
        writeln!(out, "{HINT_INDENT}{hint}")?;
    }
    if let Some(request_id) = &classified.request_id {
        writeln!(out, "{HINT_INDENT}Request ID: {request_id}")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::fault::{Cancelled, ContextFault};

    fn report(reporter: &ErrorReporter, fault: Option<Fault>) -> (ExitCode, String) {
        let mut out = Vec::new();
        let code = reporter.report(fault.as_ref(), &mut out);
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_none_is_silent_success() {
        let (code, output) = report(&ErrorReporter::default(), None);
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(output.is_empty());
    }

    #[test]
    fn test_unauthorized_end_to_end() {
        let fault = ApiError::new(401, "unauthorized", "").into();
        let (code, output) = report(&ErrorReporter::default(), Some(fault));
        assert_eq!(code.as_i32(), 3);
        assert!(output.contains("Authentication required"));
        assert!(output.contains("login"));
        assert!(output.starts_with("Error: "));
    }

    #[test]
    fn test_status_in_message_end_to_end() {
        let fault = Fault::opaque("GET https://api.example.com: 401 Unauthorized");
        let (code, _) = report(&ErrorReporter::default(), Some(fault));
        assert_eq!(code.as_i32(), 3);
    }

    #[test]
    fn test_cancelled_prints_nothing() {
        let (code, output) = report(
            &ErrorReporter::default(),
            Some(Fault::Context(ContextFault::Cancelled)),
        );
        assert_eq!(code, ExitCode::GENERAL_ERROR);
        assert!(output.is_empty());
    }

    #[test]
    fn test_layout_of_validation_errors() {
        let fault = ApiError::new(422, "validation_error", "")
            .with_field("name", "is required")
            .into();
        let (_, output) = report(&ErrorReporter::default(), Some(fault));
        assert_eq!(output, "Error: The request was invalid\n  name: is required\n");
    }

    #[test]
    fn test_single_request_id_line() {
        let fault = ApiError::new(500, "internal_error", "")
            .with_request_id("req_77")
            .into();
        let (_, output) = report(&ErrorReporter::default(), Some(fault));
        assert_eq!(output.matches("Request ID:").count(), 1);
        assert!(output.ends_with("  Request ID: req_77\n"));
    }

    #[test]
    fn test_exactly_one_error_line() {
        let fault = Fault::opaque("connection reset by peer");
        let (code, output) = report(&ErrorReporter::default(), Some(fault));
        assert_eq!(code, ExitCode::NETWORK);
        assert_eq!(output.matches("Error:").count(), 1);
        for line in output.lines().skip(1) {
            assert!(line.starts_with("  "), "unindented follow-up line: {line:?}");
        }
    }

    #[test]
    fn test_debug_lines_do_not_change_exit_code() {
        let fault = ApiError::new(404, "not_found", "").into();
        let quiet = ErrorReporter::default();
        let loud = ErrorReporter::new(MessageCatalog::default(), true);

        let (quiet_code, quiet_out) = report(&quiet, Some(fault));
        let fault = ApiError::new(404, "not_found", "").into();
        let (loud_code, loud_out) = report(&loud, Some(fault));

        assert_eq!(quiet_code, loud_code);
        assert!(!quiet_out.contains("Debug:"));
        assert!(loud_out.contains("Debug: error type: api"));
        assert!(loud_out.contains("Debug: classification: api.not_found"));
        assert!(loud_out.ends_with(&quiet_out));
    }

    #[test]
    fn test_report_anyhow() {
        let reporter = ErrorReporter::default();
        let mut out = Vec::new();

        let err = anyhow::Error::new(Cancelled).context("pinging api");
        assert_eq!(reporter.report_anyhow(Some(&err), &mut out), ExitCode::GENERAL_ERROR);
        assert!(out.is_empty());

        assert_eq!(reporter.report_anyhow(None, &mut out), ExitCode::SUCCESS);
        assert!(out.is_empty());
    }

    #[test]
    fn test_report_anyhow_local_io_failure_keeps_path() {
        use anyhow::Context;

        let reporter = ErrorReporter::default();
        let mut out = Vec::new();
        let err = Err::<(), _>(std::io::Error::from(std::io::ErrorKind::PermissionDenied))
            .context("failed to write preferences to /tmp/probectl/config.toml")
            .unwrap_err();

        assert_eq!(reporter.report_anyhow(Some(&err), &mut out), ExitCode::GENERAL_ERROR);
        let output = String::from_utf8(out).unwrap();
        assert_eq!(
            output,
            "Error: failed to write preferences to /tmp/probectl/config.toml: permission denied\n"
        );
    }

    #[test]
    fn test_injected_catalog_hint_is_printed() {
        let catalog = MessageCatalog::default()
            .with_hint(crate::catalog::topics::NETWORK_REFUSED, "Is the agent running?");
        let reporter = ErrorReporter::new(catalog, false);
        let fault = Fault::Network(crate::fault::NetworkFault::ConnectionRefused {
            message: "connection refused".to_string(),
        });
        let (code, output) = report(&reporter, Some(fault));
        assert_eq!(code, ExitCode::NETWORK);
        assert_eq!(output, "Error: Connection refused\n  Is the agent running?\n");
    }
}
