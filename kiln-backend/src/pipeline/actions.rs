//! Default IR actions shared by every module-level phase.
//!
//! Two actions run around a phase body: the structural IR validator and the
//! IR dumper. Both are driven by the `[phases]` section of `kiln.toml`, so a
//! phase not selected there pays nothing beyond a set lookup.

use kiln_ir::{IrGraph, ModuleId, render_module, verify_module};
use tracing::debug;

use super::{Action, ActionScope, ActionStage, Diagnostic, IrDump, ValidationFailure};

/// A phase artifact that exposes a module of the IR graph.
pub trait IrHolder {
    fn graph(&self) -> &IrGraph;

    fn module(&self) -> ModuleId;
}

/// The action set attached to module-level phases: validate, then dump.
pub fn default_ir_actions<T: IrHolder>() -> Vec<Action<T>> {
    vec![validate_ir::<T> as Action<T>, dump_ir::<T> as Action<T>]
}

fn validate_ir<T: IrHolder>(
    scope: &mut ActionScope<'_>,
    artifact: &T,
) -> Result<(), ValidationFailure> {
    let phase = scope.phase.name;
    if !scope.config.phases.validate.contains(phase) {
        return Ok(());
    }

    let violations = verify_module(artifact.graph(), artifact.module());
    if violations.is_empty() {
        debug!(phase, stage = %scope.stage, "IR verified");
        return Ok(());
    }

    for violation in &violations {
        scope.report(Diagnostic::error(phase, &violation.message).at(&violation.location));
    }
    Err(ValidationFailure::new("IR is structurally well-formed")
        .with_violations(violations.iter().map(ToString::to_string)))
}

fn dump_ir<T: IrHolder>(scope: &mut ActionScope<'_>, artifact: &T) -> Result<(), ValidationFailure> {
    let selection = match scope.stage {
        ActionStage::Pre => &scope.config.phases.dump_before,
        ActionStage::Post => &scope.config.phases.dump_after,
    };
    if selection.contains(scope.phase.name) {
        let dump = IrDump {
            phase: scope.phase.name,
            stage: scope.stage,
            text: render_module(artifact.graph(), artifact.module()),
        };
        scope.record_dump(dump);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use kiln_config::{CompilerConfig, PhaseSet};
    use kiln_ir::{Declaration, Expr, Function, IrType, Symbol};

    use super::*;
    use crate::pipeline::PhaseInfo;

    struct Holder {
        graph: IrGraph,
        module: ModuleId,
    }

    impl IrHolder for Holder {
        fn graph(&self) -> &IrGraph {
            &self.graph
        }

        fn module(&self) -> ModuleId {
            self.module
        }
    }

    fn holder(body: Option<Expr>) -> Holder {
        let mut graph = IrGraph::new();
        let module = graph.add_module("app");
        let file = graph.add_file(module, "main.kiln", "app");
        let mut function = Function::new(IrType::unit());
        function.body = body;
        graph.add_declaration(file, Declaration::function("main", function));
        Holder { graph, module }
    }

    fn run(
        config: &CompilerConfig,
        stage: ActionStage,
        artifact: &Holder,
    ) -> (Result<(), ValidationFailure>, Vec<Diagnostic>, Vec<IrDump>) {
        let info = PhaseInfo {
            name: "addEntryPoint",
            description: "Add entry point for program",
        };
        let mut diagnostics = Vec::new();
        let mut dumps = Vec::new();
        let mut result = Ok(());
        for action in default_ir_actions::<Holder>() {
            let mut scope = ActionScope {
                config,
                phase: &info,
                stage,
                diagnostics: &mut diagnostics,
                dumps: &mut dumps,
            };
            result = result.and(action(&mut scope, artifact));
        }
        (result, diagnostics, dumps)
    }

    #[test]
    fn test_validation_off_by_default() {
        let config = CompilerConfig::default();
        let broken = holder(Some(Expr::call(Symbol::new(7), vec![])));

        let (result, diagnostics, dumps) = run(&config, ActionStage::Pre, &broken);

        assert!(result.is_ok());
        assert!(diagnostics.is_empty());
        assert!(dumps.is_empty());
    }

    #[test]
    fn test_validation_reports_violations() {
        let mut config = CompilerConfig::default();
        config.phases.validate = PhaseSet::All;
        let broken = holder(Some(Expr::call(Symbol::new(7), vec![])));

        let (result, diagnostics, _) = run(&config, ActionStage::Post, &broken);

        let failure = result.unwrap_err();
        assert_eq!(failure.invariant, "IR is structurally well-formed");
        assert_eq!(failure.violations, ["main.kiln::main: references unknown sym#7"]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].location.as_deref(), Some("main.kiln::main"));
    }

    #[test]
    fn test_dump_follows_stage() {
        let mut config = CompilerConfig::default();
        config.phases.dump_after = PhaseSet::of(["addEntryPoint"]);
        let artifact = holder(None);

        let (_, _, before) = run(&config, ActionStage::Pre, &artifact);
        let (_, _, after) = run(&config, ActionStage::Post, &artifact);

        assert!(before.is_empty());
        assert_eq!(after.len(), 1);
        insta::assert_snapshot!(after[0].text, @r"
        module app
          file main.kiln (package app)
            fun main(): Unit
        ");
    }
}
