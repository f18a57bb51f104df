//! Driver composing the backend phases for one module.

use kiln_config::{CompilerConfig, Frontend};
use kiln_ir::{IrGraph, ModuleId};
use miette::Diagnostic as MietteDiagnostic;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    BackendSymbols, InteropBuiltIns, NativeBuiltIns, PluginContext,
    phases::{
        Fir2IrOutput, ModuleInput, SpecialBackendChecksInput, copy_default_values_to_actual_phase,
        entry_point_phase, k2_special_backend_checks_phase, special_backend_checks_phase,
    },
    pipeline::{
        CompilationContext, Diagnostic, IrDump, PhaseEngine, PhaseError, PhaseInfo, PhaseTiming,
    },
};

/// Errors surfaced by the [`Driver`].
#[derive(Debug, Error, MietteDiagnostic)]
pub enum DriverError {
    #[error("module '{name}' is not part of the program (available: {})", .available.join(", "))]
    #[diagnostic(code(kiln::driver::unknown_module))]
    UnknownModule { name: String, available: Vec<String> },

    #[error("compilation stopped in phase '{}'", .source.phase())]
    #[diagnostic(code(kiln::driver::phase))]
    Phase {
        #[source]
        source: PhaseError,
        /// Diagnostics collected before the failure.
        diagnostics: Vec<Diagnostic>,
    },
}

/// What a successful compilation produced besides the mutated graph.
#[derive(Debug, Clone, Serialize)]
pub struct CompileOutcome {
    pub module: String,
    /// Phases that ran to completion, in order.
    pub executed: Vec<&'static str>,
    pub diagnostics: Vec<Diagnostic>,
    pub timings: Vec<PhaseTiming>,
    pub dumps: Vec<IrDump>,
}

impl CompileOutcome {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity.is_warning()).count()
    }
}

/// Runs the backend phases in the order the configuration requires.
///
/// # Example
///
/// ```ignore
/// let driver = Driver::new(kiln_config::parse_file("kiln.toml")?);
/// let outcome = driver.compile(&mut graph, "app")?;
/// println!("ran {:?}", outcome.executed);
/// ```
#[derive(Debug, Clone)]
pub struct Driver {
    config: CompilerConfig,
}

impl Driver {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Run the checks, default-value copying and, for final binaries, entry
    /// point synthesis over `module_name`.
    ///
    /// Mutations made by phases that completed stay in `graph` even when a
    /// later phase fails.
    pub fn compile(
        &self,
        graph: &mut IrGraph,
        module_name: &str,
    ) -> Result<CompileOutcome, DriverError> {
        let module = resolve_module(graph, module_name)?;
        let mut ctx = self.context(graph);
        info!(
            module = module_name,
            frontend = %self.config.compiler.frontend,
            output = %ctx.output_unit.kind,
            "compiling module"
        );

        let result = compile_module(&mut ctx, graph, module);
        finish(ctx, module_name, result)
    }

    /// Run the checks phase only.
    pub fn check(
        &self,
        graph: &mut IrGraph,
        module_name: &str,
    ) -> Result<CompileOutcome, DriverError> {
        let module = resolve_module(graph, module_name)?;
        let mut ctx = self.context(graph);

        let result = {
            let mut engine = PhaseEngine::new(&mut ctx);
            run_checks(&mut engine, ModuleInput::new(graph, module))
                .map(|_| engine.executed().to_vec())
        };
        finish(ctx, module_name, result)
    }

    fn context(&self, graph: &IrGraph) -> CompilationContext {
        let mut ctx = CompilationContext::new(self.config.clone());
        ctx.symbols = BackendSymbols::lookup(graph.symbols(), &self.config.entry.name);
        if self.config.compiler.frontend == Frontend::Legacy {
            ctx.interop_builtins = Some(InteropBuiltIns::new(
                &NativeBuiltIns::default(),
                graph.symbols(),
            ));
        }
        debug!(symbols = ?ctx.symbols, "backend symbols resolved");
        ctx
    }
}

/// Name and description of every backend phase, in driver order.
pub fn phase_catalog() -> Vec<PhaseInfo> {
    vec![
        special_backend_checks_phase().info().clone(),
        copy_default_values_to_actual_phase().info().clone(),
        entry_point_phase().info().clone(),
    ]
}

fn resolve_module(graph: &IrGraph, name: &str) -> Result<ModuleId, DriverError> {
    graph
        .module_by_name(name)
        .ok_or_else(|| DriverError::UnknownModule {
            name: name.to_string(),
            available: graph.modules().map(|(_, m)| m.name.clone()).collect(),
        })
}

fn compile_module(
    ctx: &mut CompilationContext,
    graph: &mut IrGraph,
    module: ModuleId,
) -> Result<Vec<&'static str>, PhaseError> {
    let final_binary = ctx.output_unit.is_final_binary();
    let mut engine = PhaseEngine::new(ctx);

    let input = run_checks(&mut engine, ModuleInput::new(graph, module))?;
    let input = engine.run_phase(&copy_default_values_to_actual_phase(), input)?;
    if final_binary {
        engine.run_phase(&entry_point_phase(), input)?;
    } else {
        debug!("output is not a final binary, skipping entry point");
    }
    Ok(engine.executed().to_vec())
}

/// Run the checks variant matching the configured front-end, handing the
/// module back for the next phase.
fn run_checks<'a>(
    engine: &mut PhaseEngine<'_>,
    module: ModuleInput<'a>,
) -> Result<ModuleInput<'a>, PhaseError> {
    let symbols = engine.context().symbols.clone();
    match engine.context().config.compiler.frontend {
        Frontend::Legacy => {
            let input = SpecialBackendChecksInput { module, symbols };
            let output = engine.run_phase(&special_backend_checks_phase(), input)?;
            Ok(output.module)
        }
        Frontend::K2 => {
            let input = Fir2IrOutput {
                module,
                symbols,
                plugin_context: PluginContext::default(),
            };
            let output = engine.run_phase(&k2_special_backend_checks_phase(), input)?;
            Ok(output.module)
        }
    }
}

fn finish(
    ctx: CompilationContext,
    module_name: &str,
    result: Result<Vec<&'static str>, PhaseError>,
) -> Result<CompileOutcome, DriverError> {
    match result {
        Ok(executed) => {
            info!(
                module = module_name,
                phases = executed.len(),
                errors = ctx.error_count(),
                warnings = ctx.warning_count(),
                "module compiled"
            );
            Ok(CompileOutcome {
                module: module_name.to_string(),
                executed,
                diagnostics: ctx.diagnostics,
                timings: ctx.timings,
                dumps: ctx.dumps,
            })
        }
        Err(source) => Err(DriverError::Phase {
            source,
            diagnostics: ctx.diagnostics,
        }),
    }
}
