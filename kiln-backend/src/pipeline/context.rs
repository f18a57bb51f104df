//! Compilation context lent to every phase invocation.

use std::time::Duration;

use kiln_config::CompilerConfig;
use serde::Serialize;

use super::{ActionStage, diagnostic::Diagnostic};
use crate::{BackendSymbols, InteropBuiltIns, OutputUnit};

/// Wall time spent in one phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseTiming {
    pub phase: &'static str,
    pub elapsed: Duration,
}

/// A rendered snapshot of the module taken around a phase.
#[derive(Debug, Clone, Serialize)]
pub struct IrDump {
    pub phase: &'static str,
    pub stage: ActionStage,
    pub text: String,
}

/// Per-compilation state.
///
/// Created once per compilation by the driver and lent mutably to every
/// phase. Registries are carried here explicitly; nothing is global.
#[derive(Debug)]
pub struct CompilationContext {
    /// The compiler configuration.
    pub config: CompilerConfig,
    /// The linked artifact currently being produced.
    pub output_unit: OutputUnit,
    /// Well-known symbols resolved from the program.
    pub symbols: BackendSymbols,
    /// Interop built-ins registered by the legacy front-end.
    pub interop_builtins: Option<InteropBuiltIns>,
    /// Diagnostics collected during compilation.
    pub diagnostics: Vec<Diagnostic>,
    /// Phase timings, recorded when `measure_time` is enabled.
    pub timings: Vec<PhaseTiming>,
    /// IR dumps requested through `dump_before`/`dump_after`.
    pub dumps: Vec<IrDump>,
}

impl CompilationContext {
    /// Create a new compilation context from a configuration.
    pub fn new(config: CompilerConfig) -> Self {
        let output_unit = OutputUnit::from_config(&config.output);
        Self {
            config,
            output_unit,
            symbols: BackendSymbols::default(),
            interop_builtins: None,
            diagnostics: Vec::new(),
            timings: Vec::new(),
            dumps: Vec::new(),
        }
    }

    /// Count the number of error diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_error())
            .count()
    }

    /// Count the number of warning diagnostics.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_warning())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use kiln_config::OutputKind;

    use super::*;
    use crate::pipeline::Severity;

    fn make_test_config() -> CompilerConfig {
        kiln_config::parse_str(
            r#"
            [output]
            name = "hello"
            modules = ["app"]
            "#,
        )
        .expect("Failed to parse test config")
    }

    #[test]
    fn test_context_creation() {
        let ctx = CompilationContext::new(make_test_config());

        assert_eq!(ctx.output_unit.kind, OutputKind::Executable);
        assert!(ctx.output_unit.contains_module("app"));
        assert!(ctx.symbols.entry_point.is_none());
        assert!(ctx.interop_builtins.is_none());
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn test_context_counts() {
        let mut ctx = CompilationContext::new(make_test_config());

        ctx.diagnostics.push(Diagnostic::error("test", "test error"));
        ctx.diagnostics
            .push(Diagnostic::with_severity(Severity::Warning, "test", "test warning"));
        ctx.diagnostics
            .push(Diagnostic::with_severity(Severity::Info, "test", "just info"));

        assert_eq!(ctx.error_count(), 1);
        assert_eq!(ctx.warning_count(), 1);
    }
}
