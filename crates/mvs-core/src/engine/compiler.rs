use super::actions::{self, ActionScope, Role};
use super::config::LoadOptions;
use super::context::LoadingContext;
use super::error::EngineError;
use super::host::{CellRef, SceneHost};
use super::progress::{Progress, ProgressReporter, SkipReason};
use crate::core::tree::ids::NodeId;
use crate::core::tree::node::{Node, Tree};
use crate::core::tree::params::NodeKind;
use crate::core::tree::traverse::try_dfs;
use crate::core::tree::validation::ValidationIssue;
use slotmap::SecondaryMap;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    UnrecognizedKind,
    /// The node's parent produced no cell to attach to.
    OrphanedNode,
    /// The node sits under a parent kind the format does not allow.
    Misplaced(String),
}

/// A non-fatal finding about one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub node: NodeId,
    pub node_kind: String,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    fn skipped(node: NodeId, tree_node: &Node, reason: SkipReason) -> Self {
        let kind = match reason {
            SkipReason::UnrecognizedKind => DiagnosticKind::UnrecognizedKind,
            SkipReason::Orphaned => DiagnosticKind::OrphanedNode,
        };
        Self {
            node,
            node_kind: tree_node.kind_name().to_string(),
            kind,
        }
    }
}

impl From<ValidationIssue> for Diagnostic {
    fn from(issue: ValidationIssue) -> Self {
        Self {
            node: issue.node,
            node_kind: issue.kind,
            kind: DiagnosticKind::Misplaced(issue.message),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::UnrecognizedKind => write!(
                f,
                "Skipped node {:?} of unrecognized kind '{}' and its subtree",
                self.node, self.node_kind
            ),
            DiagnosticKind::OrphanedNode => write!(
                f,
                "Skipped '{}' node {:?}: its parent produced no scene content",
                self.node_kind, self.node
            ),
            DiagnosticKind::Misplaced(message) => {
                write!(f, "'{}' node {:?}: {}", self.node_kind, self.node, message)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutedAction {
    pub node: NodeId,
    pub kind: NodeKind,
}

/// What one pass over the tree did.
#[derive(Debug, Default)]
pub struct Compilation {
    /// Actions in execution order.
    pub actions: Vec<ExecutedAction>,
    pub diagnostics: Vec<Diagnostic>,
    /// Result cell of every action node that produced one.
    pub node_cells: SecondaryMap<NodeId, CellRef>,
    /// Mutations the host accepted in the commit.
    pub mutation_count: usize,
}

/// Walks `tree` once in pre-order, running each node's action against a
/// single batch on `host`, and commits the batch.
///
/// Children of pass-through nodes attach to the pass-through node's parent
/// result. Unrecognized and orphaned nodes are skipped with a diagnostic.
///
/// # Errors
///
/// The first action error aborts the walk and the batch is dropped, leaving
/// the host untouched. A rejected commit is returned as [`EngineError::Host`].
pub fn load_tree<H: SceneHost>(
    host: &mut H,
    tree: &Tree,
    context: &mut LoadingContext,
    options: &LoadOptions,
    reporter: &ProgressReporter,
) -> Result<Compilation, EngineError> {
    let root = host.root();
    let mut batch = host.begin_batch(root);
    let anchor = batch.anchor();
    if options.replace_existing {
        batch.remove_children(anchor);
    }

    let mut results: SecondaryMap<NodeId, CellRef> = SecondaryMap::new();
    let mut inherited: SecondaryMap<NodeId, CellRef> = SecondaryMap::new();
    let mut executed = Vec::new();
    let mut diagnostics = Vec::new();

    reporter.report(Progress::TaskStart {
        total_steps: tree.len() as u64,
    });

    {
        let mut scope = ActionScope {
            tree,
            context: &mut *context,
            batch: &mut batch,
            options,
        };

        try_dfs(
            tree,
            tree.root(),
            |id, node, parent| {
                reporter.report(Progress::TaskIncrement);
                let parent_result = match parent {
                    None => Some(anchor),
                    Some(parent) => results.get(parent).or_else(|| inherited.get(parent)).copied(),
                };

                let skip = match (actions::role(node.params()), parent_result) {
                    (Role::Action, Some(parent_cell)) => {
                        if let Some(cell) = actions::run(&mut scope, id, node.params(), parent_cell)? {
                            results.insert(id, cell);
                        }
                        executed.push(ExecutedAction {
                            node: id,
                            kind: node.kind(),
                        });
                        None
                    }
                    (Role::Action, None) => Some(SkipReason::Orphaned),
                    (Role::PassThrough, parent_result) => {
                        if let Some(cell) = parent_result {
                            inherited.insert(id, cell);
                        }
                        None
                    }
                    (Role::Unrecognized, _) => Some(SkipReason::UnrecognizedKind),
                };

                if let Some(reason) = skip {
                    let diagnostic = Diagnostic::skipped(id, node, reason);
                    warn!("{diagnostic}");
                    reporter.report(Progress::NodeSkipped {
                        kind: diagnostic.node_kind.clone(),
                        reason,
                    });
                    diagnostics.push(diagnostic);
                }
                Ok::<(), EngineError>(())
            },
            |_, _, _| Ok(()),
        )?;
    }

    reporter.report(Progress::TaskFinish);

    let mutation_count = batch.commit()?;
    Ok(Compilation {
        actions: executed,
        diagnostics,
        node_cells: results,
        mutation_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::Color;
    use crate::core::selection::selector::{ComponentSelector, StaticSelector};
    use crate::core::tree::params::{
        ColorParams, ComponentParams, DownloadParams, NodeParams, ParseFormat, ParseParams,
        RepresentationParams, RepresentationType, StructureParams, StructureType, TextParams,
        TransformParams, UnknownParams,
    };
    use crate::engine::color_theme::ColorTheme;
    use crate::engine::host::SceneTransform;
    use crate::engine::scene::SceneGraph;
    use std::sync::Mutex;

    const RED: Color = Color::from_hex(0xff0000);

    struct Scenario {
        tree: Tree,
        structure: NodeId,
        component: NodeId,
    }

    fn scenario() -> Scenario {
        let mut tree = Tree::new();
        let download = tree
            .add_child(
                tree.root(),
                NodeParams::Download(DownloadParams {
                    url: "https://files.wwpdb.org/download/1cbs.cif".into(),
                }),
            )
            .unwrap();
        let parse = tree
            .add_child(download, NodeParams::Parse(ParseParams { format: ParseFormat::Mmcif }))
            .unwrap();
        let structure = tree
            .add_child(parse, NodeParams::Structure(StructureParams::new(StructureType::Model)))
            .unwrap();
        let component = tree
            .add_child(
                structure,
                NodeParams::Component(ComponentParams {
                    selector: Some(ComponentSelector::Static(StaticSelector::All)),
                }),
            )
            .unwrap();
        let representation = tree
            .add_child(
                component,
                NodeParams::Representation(RepresentationParams {
                    kind: RepresentationType::Cartoon,
                }),
            )
            .unwrap();
        tree.add_child(
            representation,
            NodeParams::Color(ColorParams {
                color: RED,
                selector: Some(ComponentSelector::Static(StaticSelector::All)),
            }),
        )
        .unwrap();
        Scenario {
            tree,
            structure,
            component,
        }
    }


    fn compile(
        host: &mut SceneGraph,
        tree: &Tree,
        options: &LoadOptions,
    ) -> Result<Compilation, EngineError> {
        let mut context = LoadingContext::prepare(tree)?;
        load_tree(host, tree, &mut context, options, &ProgressReporter::new())
    }

    #[test]
    fn basic_scenario_builds_one_red_cartoon() {
        let Scenario { tree, .. } = scenario();
        let mut host = SceneGraph::new();
        let compilation = compile(&mut host, &tree, &LoadOptions::default()).unwrap();

        let kinds: Vec<NodeKind> = compilation.actions.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            [
                NodeKind::Root,
                NodeKind::Download,
                NodeKind::Parse,
                NodeKind::Structure,
                NodeKind::Component,
                NodeKind::Representation,
            ]
        );
        assert!(compilation.diagnostics.is_empty());
        assert_eq!(host.commit_count(), 1);

        let representations =
            host.find(|t| matches!(t, SceneTransform::Representation { .. }));
        assert_eq!(representations.len(), 1);
        match host.transform(representations[0]) {
            Some(SceneTransform::Representation { kind, color_theme }) => {
                assert_eq!(*kind, RepresentationType::Cartoon);
                assert_eq!(*color_theme, ColorTheme::uniform(RED));
            }
            other => panic!("unexpected transform: {other:?}"),
        }
    }

    #[test]
    fn unknown_kind_skips_its_subtree_with_diagnostics() {
        let Scenario {
            mut tree, structure, ..
        } = scenario();
        let unknown = tree
            .add_child(
                structure,
                NodeParams::Unknown(UnknownParams {
                    kind: "hologram".into(),
                    params: None,
                }),
            )
            .unwrap();
        let orphan = tree
            .add_child(unknown, NodeParams::Label(TextParams { text: "lost".into() }))
            .unwrap();

        let mut host = SceneGraph::new();
        let compilation = compile(&mut host, &tree, &LoadOptions::default()).unwrap();

        assert_eq!(compilation.diagnostics.len(), 2);
        assert_eq!(compilation.diagnostics[0].kind, DiagnosticKind::UnrecognizedKind);
        assert_eq!(compilation.diagnostics[0].node_kind, "hologram");
        assert_eq!(compilation.diagnostics[1].node, orphan);
        assert_eq!(compilation.diagnostics[1].kind, DiagnosticKind::OrphanedNode);
        assert!(host.find(|t| matches!(t, SceneTransform::Label { .. })).is_empty());
        assert_eq!(compilation.actions.len(), 6);
    }

    #[test]
    fn children_of_pass_through_nodes_attach_to_the_grandparent() {
        let Scenario {
            mut tree, component, ..
        } = scenario();
        let tooltip = tree
            .add_child(component, NodeParams::Tooltip(TextParams { text: "tip".into() }))
            .unwrap();
        let nested = tree
            .add_child(tooltip, NodeParams::Label(TextParams { text: "nested".into() }))
            .unwrap();

        let mut host = SceneGraph::new();
        let compilation = compile(&mut host, &tree, &LoadOptions::default()).unwrap();

        assert!(compilation.node_cells.get(tooltip).is_none());
        let label_cell = compilation.node_cells[nested];
        assert_eq!(
            host.cell(label_cell).and_then(|c| c.parent),
            Some(compilation.node_cells[component])
        );
    }

    #[test]
    fn replace_existing_clears_the_anchor_first() {
        let Scenario { tree, .. } = scenario();
        let mut host = SceneGraph::new();
        compile(&mut host, &tree, &LoadOptions::default()).unwrap();
        compile(&mut host, &tree, &LoadOptions::default()).unwrap();
        assert_eq!(host.children(host.root()).len(), 2);

        let replace = LoadOptions {
            replace_existing: true,
            ..LoadOptions::default()
        };
        compile(&mut host, &tree, &replace).unwrap();
        assert_eq!(host.children(host.root()).len(), 1);
        assert_eq!(host.commit_count(), 3);
    }

    #[test]
    fn action_error_leaves_the_host_untouched() {
        let Scenario {
            mut tree, structure, ..
        } = scenario();
        tree.add_child(
            structure,
            NodeParams::Transform(TransformParams {
                rotation: Some(vec![1.0; 9]),
                translation: None,
            }),
        )
        .unwrap();

        let mut host = SceneGraph::new();
        let result = compile(&mut host, &tree, &LoadOptions::default());
        assert!(matches!(
            result,
            Err(EngineError::InvalidParameter { kind: "transform", .. })
        ));
        assert_eq!(host.commit_count(), 0);
        assert_eq!(host.len(), 1);
    }

    #[test]
    fn compilation_is_deterministic() {
        let Scenario { tree, .. } = scenario();
        let mut first = SceneGraph::new();
        let mut second = SceneGraph::new();
        let a = compile(&mut first, &tree, &LoadOptions::default()).unwrap();
        let b = compile(&mut second, &tree, &LoadOptions::default()).unwrap();
        assert_eq!(a.actions, b.actions);
        assert_eq!(first.entries(), second.entries());
    }

    #[test]
    fn progress_reports_every_node_and_skips() {
        let Scenario {
            mut tree, structure, ..
        } = scenario();
        tree.add_child(
            structure,
            NodeParams::Unknown(UnknownParams {
                kind: "hologram".into(),
                params: None,
            }),
        )
        .unwrap();

        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        let mut host = SceneGraph::new();
        let mut context = LoadingContext::prepare(&tree).unwrap();
        load_tree(&mut host, &tree, &mut context, &LoadOptions::default(), &reporter).unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        let increments = events
            .iter()
            .filter(|e| matches!(e, Progress::TaskIncrement))
            .count();
        assert_eq!(increments, tree.len());
        assert!(events.iter().any(|e| matches!(
            e,
            Progress::NodeSkipped {
                reason: SkipReason::UnrecognizedKind,
                ..
            }
        )));
    }
}
