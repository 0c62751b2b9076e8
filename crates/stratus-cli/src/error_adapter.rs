//! Turns a [`StratusError`] into miette reports.
//!
//! A manifest error becomes one [`Report`] per diagnostic, each pointing into
//! the manifest text. Any other error becomes a single report with a
//! `stratus::*` code and, where there is an obvious remedy, a help line.

use std::{error::Error, fmt};

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceCode, SourceSpan};

use stratus::{StratusError, diagnostic::Diagnostic};

/// A single renderable report.
#[derive(Debug)]
pub struct Report<'a> {
    message: String,
    code: Option<String>,
    help: Option<String>,
    labels: Vec<LabeledSpan>,
    src: Option<&'a str>,
    cause: Option<&'a StratusError>,
}

impl<'a> Report<'a> {
    fn from_diagnostic(diag: &Diagnostic, src: &'a str) -> Self {
        let labels = diag
            .labels()
            .iter()
            .map(|label| {
                let span = SourceSpan::new(label.span().start.into(), label.span().len());
                let text = Some(label.message().to_string());
                if label.is_primary() {
                    LabeledSpan::new_primary_with_span(text, span)
                } else {
                    LabeledSpan::new_with_span(text, span)
                }
            })
            .collect();

        Self {
            message: diag.message().to_string(),
            code: diag.code().map(|code| code.to_string()),
            help: diag.help().map(str::to_string),
            labels,
            src: Some(src),
            cause: None,
        }
    }

    fn from_error(err: &'a StratusError) -> Self {
        Self {
            message: err.to_string(),
            code: error_code(err).map(str::to_string),
            help: error_help(err).map(str::to_string),
            labels: Vec::new(),
            src: None,
            cause: Some(err),
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for Report<'_> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.and_then(|err| err.source())
    }
}

impl MietteDiagnostic for Report<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.code
            .as_deref()
            .map(|code| Box::new(code) as Box<dyn fmt::Display>)
    }

    fn help<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.help
            .as_deref()
            .map(|help| Box::new(help) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.src.as_ref().map(|src| src as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            return None;
        }
        Some(Box::new(self.labels.iter().cloned()))
    }
}

fn error_code(err: &StratusError) -> Option<&'static str> {
    let code = match err {
        StratusError::Io(_) => "stratus::io",
        StratusError::InvalidReference(_) => "stratus::reference",
        StratusError::ClusterCycle { .. } => "stratus::cycle",
        StratusError::Model(_) => "stratus::model",
        StratusError::Manifest { .. } => return None,
        StratusError::BackendUnavailable(_) => "stratus::backend",
        StratusError::UnsupportedFormat { .. } => "stratus::format",
        StratusError::Render(_) => "stratus::render",
        StratusError::Config(_) => "stratus::config",
    };
    Some(code)
}

fn error_help(err: &StratusError) -> Option<&'static str> {
    match err {
        StratusError::BackendUnavailable(_) => {
            Some("install Graphviz, or pass `--backend layout` to render SVG without it")
        }
        StratusError::UnsupportedFormat { .. } => {
            Some("choose a format the backend supports with `--format`")
        }
        StratusError::ClusterCycle { .. } => Some("cluster parents must form a tree"),
        _ => None,
    }
}

/// Splits `err` into the reports to print, in order.
pub fn reports(err: &StratusError) -> Vec<Report<'_>> {
    match err {
        StratusError::Manifest { err, src } => err
            .diagnostics()
            .iter()
            .map(|diag| Report::from_diagnostic(diag, src))
            .collect(),
        _ => vec![Report::from_error(err)],
    }
}
