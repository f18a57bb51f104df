//! Phase descriptors.

use kiln_config::CompilerConfig;
use serde::Serialize;

use super::{ActionStage, CompilationContext, Diagnostic, ExecutionFault, IrDump, ValidationFailure};

/// Information about a pipeline phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseInfo {
    /// The phase name.
    pub name: &'static str,
    /// A human-readable description.
    pub description: &'static str,
}

/// What a validation action may see and record.
///
/// Actions get read-only access to the configuration and may only append to
/// the diagnostic and dump sinks of the context.
pub struct ActionScope<'a> {
    pub config: &'a CompilerConfig,
    pub phase: &'a PhaseInfo,
    pub stage: ActionStage,
    pub(crate) diagnostics: &'a mut Vec<Diagnostic>,
    pub(crate) dumps: &'a mut Vec<IrDump>,
}

impl ActionScope<'_> {
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn record_dump(&mut self, dump: IrDump) {
        self.dumps.push(dump);
    }
}

/// A validation callback run before or after a phase body.
///
/// The artifact is borrowed immutably, so actions cannot alter the IR.
pub type Action<T> = fn(&mut ActionScope<'_>, &T) -> Result<(), ValidationFailure>;

/// The transformation performed by a phase.
pub type PhaseBody<In, Out> = fn(&mut CompilationContext, In) -> Result<Out, ExecutionFault>;

/// A named, described phase from `In` to `Out`, with its validation actions.
///
/// Descriptors are assembled once by constructor functions and never
/// mutated afterwards; the [`PhaseEngine`](super::PhaseEngine) is the only
/// way to run them.
pub struct NamedPhase<In, Out> {
    pub(crate) info: PhaseInfo,
    pub(crate) pre_actions: Vec<Action<In>>,
    pub(crate) post_actions: Vec<Action<Out>>,
    pub(crate) body: PhaseBody<In, Out>,
}

impl<In, Out> NamedPhase<In, Out> {
    pub fn new(name: &'static str, description: &'static str, body: PhaseBody<In, Out>) -> Self {
        Self {
            info: PhaseInfo { name, description },
            pre_actions: Vec::new(),
            post_actions: Vec::new(),
            body,
        }
    }

    /// Actions run against the input, in order, before the body.
    pub fn pre_actions(mut self, actions: Vec<Action<In>>) -> Self {
        self.pre_actions = actions;
        self
    }

    /// Actions run against the output, in order, after the body.
    pub fn post_actions(mut self, actions: Vec<Action<Out>>) -> Self {
        self.post_actions = actions;
        self
    }

    pub fn info(&self) -> &PhaseInfo {
        &self.info
    }

    pub fn name(&self) -> &'static str {
        self.info.name
    }

    pub fn description(&self) -> &'static str {
        self.info.description
    }
}

impl<In, Out> std::fmt::Debug for NamedPhase<In, Out> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedPhase")
            .field("name", &self.info.name)
            .field("pre_actions", &self.pre_actions.len())
            .field("post_actions", &self.post_actions.len())
            .finish()
    }
}
