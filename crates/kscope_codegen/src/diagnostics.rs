use crate::error::CodegenError;

/// Destination for user-facing codegen errors.
///
/// Reporting never fails and never stops the run; the caller still has to
/// propagate the error it reported.
pub trait DiagnosticSink {
    fn report(&mut self, error: &CodegenError);
}

/// Writes each diagnostic to stderr as `Error: <message>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn report(&mut self, error: &CodegenError) {
        eprintln!("Error: {error}");
    }
}

/// Keeps rendered diagnostics in memory.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    messages: Vec<String>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, error: &CodegenError) {
        self.messages.push(error.to_string());
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, error: &CodegenError) {
        (**self).report(error);
    }
}
