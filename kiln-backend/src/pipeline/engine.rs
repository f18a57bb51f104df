//! The phase engine: the single execution path for every phase.

use std::time::Instant;

use tracing::{debug, info};

use super::{
    Action, ActionScope, ActionStage, CompilationContext, NamedPhase, PhaseError, PhaseInfo,
    PhaseTiming,
};

/// Runs phases against a borrowed compilation context.
///
/// Every phase goes through [`PhaseEngine::run_phase`], so pre-actions, the
/// body and post-actions always execute in that order.
///
/// # Example
///
/// ```ignore
/// let mut engine = PhaseEngine::new(&mut ctx);
/// let input = engine.run_phase(&copy_default_values_to_actual_phase(), input)?;
/// engine.run_phase(&entry_point_phase(), input)?;
/// ```
pub struct PhaseEngine<'c> {
    context: &'c mut CompilationContext,
    executed: Vec<&'static str>,
}

impl<'c> PhaseEngine<'c> {
    pub fn new(context: &'c mut CompilationContext) -> Self {
        Self {
            context,
            executed: Vec::new(),
        }
    }

    pub fn context(&self) -> &CompilationContext {
        self.context
    }

    pub fn context_mut(&mut self) -> &mut CompilationContext {
        self.context
    }

    /// Names of the phases that completed, in execution order.
    pub fn executed(&self) -> &[&'static str] {
        &self.executed
    }

    /// Run one phase.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError::Validation`] if a pre- or post-action fails (the
    /// body is skipped on pre-action failure and the output is discarded on
    /// post-action failure), and [`PhaseError::Execution`] if the body fails.
    pub fn run_phase<In, Out>(
        &mut self,
        phase: &NamedPhase<In, Out>,
        input: In,
    ) -> Result<Out, PhaseError> {
        let info = &phase.info;
        debug!(phase = info.name, "phase starting");
        let started = Instant::now();

        self.run_actions(info, ActionStage::Pre, &phase.pre_actions, &input)?;

        let output = (phase.body)(&mut *self.context, input).map_err(|fault| {
            PhaseError::Execution {
                phase: info.name,
                fault,
            }
        })?;

        self.run_actions(info, ActionStage::Post, &phase.post_actions, &output)?;

        let elapsed = started.elapsed();
        let elapsed_us = elapsed.as_micros() as u64;
        info!(phase = info.name, elapsed_us, "phase finished");
        if self.context.config.compiler.measure_time {
            self.context.timings.push(PhaseTiming {
                phase: info.name,
                elapsed,
            });
        }
        self.executed.push(info.name);

        Ok(output)
    }

    fn run_actions<T>(
        &mut self,
        phase: &PhaseInfo,
        stage: ActionStage,
        actions: &[Action<T>],
        artifact: &T,
    ) -> Result<(), PhaseError> {
        for action in actions {
            let ctx = &mut *self.context;
            let mut scope = ActionScope {
                config: &ctx.config,
                phase,
                stage,
                diagnostics: &mut ctx.diagnostics,
                dumps: &mut ctx.dumps,
            };
            action(&mut scope, artifact).map_err(|failure| {
                debug!(phase = phase.name, %stage, invariant = %failure.invariant, "action failed");
                PhaseError::Validation {
                    phase: phase.name,
                    stage,
                    invariant: failure.invariant,
                    violations: failure.violations,
                }
            })?;
        }
        Ok(())
    }
}
