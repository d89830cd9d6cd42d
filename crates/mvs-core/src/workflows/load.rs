use crate::core::annotations::spec::RegisteredAnnotation;
use crate::core::tree::ids::NodeId;
use crate::core::tree::node::Tree;
use crate::core::tree::validation::validate_tree;
use crate::engine::compiler::{self, Diagnostic, ExecutedAction};
use crate::engine::config::LoadOptions;
use crate::engine::context::LoadingContext;
use crate::engine::error::EngineError;
use crate::engine::host::{CellRef, SceneHost, SceneSettings};
use crate::engine::progress::{Progress, ProgressReporter};
use slotmap::SecondaryMap;
use tracing::{info, instrument, warn};

/// Everything a caller learns from one load.
#[derive(Debug)]
pub struct LoadOutcome {
    /// Executed actions in order, the root first.
    pub actions: Vec<ExecutedAction>,
    /// Validation findings followed by nodes the compiler skipped.
    pub diagnostics: Vec<Diagnostic>,
    /// Distinct annotation sources referenced by the tree.
    pub annotations: Vec<RegisteredAnnotation>,
    pub node_cells: SecondaryMap<NodeId, CellRef>,
    /// Canvas and camera changes the host applies after the commit.
    pub settings: SceneSettings,
    pub mutation_count: usize,
}

#[instrument(skip_all, name = "mvs_load_workflow")]
pub fn run<H: SceneHost>(
    host: &mut H,
    tree: &Tree,
    options: &LoadOptions,
    reporter: &ProgressReporter,
) -> Result<LoadOutcome, EngineError> {
    // === Phase 0: Structural validation ===
    reporter.report(Progress::PhaseStart { name: "Validation" });
    info!("Validating tree of {} node(s).", tree.len());

    let issues = validate_tree(tree);
    if options.strict_validation && !issues.is_empty() {
        return Err(EngineError::Validation { issues });
    }
    let mut diagnostics: Vec<Diagnostic> = issues
        .into_iter()
        .inspect(|issue| warn!("{issue}"))
        .map(Diagnostic::from)
        .collect();

    reporter.report(Progress::PhaseFinish);

    // === Phase 1: Loading context ===
    reporter.report(Progress::PhaseStart {
        name: "Preparing Context",
    });
    let mut context = LoadingContext::prepare(tree)?;
    info!(
        "Loading context ready with {} distinct annotation source(s).",
        context.annotation_specs().len()
    );
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Compile and commit ===
    reporter.report(Progress::PhaseStart {
        name: "Building Scene",
    });
    let compilation = compiler::load_tree(host, tree, &mut context, options, reporter)?;
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Scene settings ===
    let settings = context.scene_settings(options.keep_camera);
    diagnostics.extend(compilation.diagnostics);

    info!(
        "Load complete: {} action(s), {} mutation(s), {} diagnostic(s).",
        compilation.actions.len(),
        compilation.mutation_count,
        diagnostics.len()
    );

    Ok(LoadOutcome {
        actions: compilation.actions,
        diagnostics,
        annotations: context.annotation_specs().to_vec(),
        node_cells: compilation.node_cells,
        settings,
        mutation_count: compilation.mutation_count,
    })
}
