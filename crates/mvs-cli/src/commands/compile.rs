use super::{read_document, write_output};
use crate::cli::{CompileArgs, OutputFormat};
use crate::config::{AppConfig, PartialCompileConfig};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use molviewspec::core::annotations::spec::RegisteredAnnotation;
use molviewspec::core::tree::io::MvsDocument;
use molviewspec::engine::host::{CameraUpdate, SceneSettings, SceneTransform, StructureKind};
use molviewspec::engine::progress::ProgressReporter;
use molviewspec::engine::scene::{SceneEntry, SceneGraph};
use molviewspec::workflows::load::{self, LoadOutcome};
use serde::Serialize;
use std::fmt::Write as _;
use tracing::info;

#[derive(Serialize)]
struct CompileReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    actions: Vec<&'static str>,
    diagnostics: Vec<String>,
    annotations: &'a [RegisteredAnnotation],
    settings: &'a SceneSettings,
    scene: Vec<SceneEntry<'a>>,
}

pub fn run(args: CompileArgs, show_progress: bool) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => PartialCompileConfig::from_file(path)?,
        None => PartialCompileConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let config = file_config.merge_with_cli(&args)?;

    let document = read_document(&args.input)?;
    let (scene, outcome) = compile_document(&document, &config, show_progress)?;

    let rendered = match config.output.format {
        OutputFormat::Scene => render_report(&document, &scene, &outcome, config.output.pretty)?,
        OutputFormat::Summary => render_summary(&scene, &outcome),
    };
    write_output(args.output.as_deref(), &rendered)
}

fn compile_document(
    document: &MvsDocument,
    config: &AppConfig,
    show_progress: bool,
) -> Result<(SceneGraph, LoadOutcome)> {
    let handler = if show_progress {
        CliProgressHandler::new()
    } else {
        CliProgressHandler::hidden()
    };
    let reporter = ProgressReporter::with_callback(handler.get_callback());

    let mut scene = SceneGraph::new();
    info!("Invoking the load workflow...");
    let outcome = load::run(&mut scene, &document.tree, &config.load, &reporter)?;
    info!(
        "Workflow finished: {} cell(s), {} node(s) skipped.",
        scene.len(),
        handler.skipped()
    );
    Ok((scene, outcome))
}

fn render_report(
    document: &MvsDocument,
    scene: &SceneGraph,
    outcome: &LoadOutcome,
    pretty: bool,
) -> Result<String> {
    let report = CompileReport {
        title: document
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.title.as_deref()),
        actions: outcome.actions.iter().map(|a| a.kind.as_str()).collect(),
        diagnostics: outcome.diagnostics.iter().map(ToString::to_string).collect(),
        annotations: &outcome.annotations,
        settings: &outcome.settings,
        scene: scene.entries(),
    };
    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(json)
}

fn describe(transform: &SceneTransform) -> String {
    match transform {
        SceneTransform::Download { url, is_binary } => {
            format!("download {url}{}", if *is_binary { " (binary)" } else { "" })
        }
        SceneTransform::Parse { format } => format!("parse {format:?}"),
        SceneTransform::Model { model_index, .. } => format!("model #{model_index}"),
        SceneTransform::Structure { kind } => match kind {
            StructureKind::Model => "structure model".to_string(),
            StructureKind::Assembly { assembly_id } => format!(
                "structure assembly {}",
                assembly_id.as_deref().unwrap_or("(default)")
            ),
            StructureKind::Symmetry { ijk_min, ijk_max } => {
                format!("structure symmetry {ijk_min:?}..{ijk_max:?}")
            }
            StructureKind::SymmetryMates { radius } => {
                format!("structure symmetry mates within {radius} Å")
            }
        },
        SceneTransform::TransformConformation { .. } => "transform".to_string(),
        SceneTransform::Component { label, .. } => format!("component \"{label}\""),
        SceneTransform::Representation { kind, .. } => format!("representation {kind:?}"),
        SceneTransform::Label { text, .. } => format!("label \"{text}\""),
        SceneTransform::AnnotationLabel { field_name, .. } => {
            format!("annotation label from '{field_name}'")
        }
    }
}

fn render_summary(scene: &SceneGraph, outcome: &LoadOutcome) -> String {
    let mut out = String::new();
    for entry in scene.entries() {
        let indent = "  ".repeat(entry.depth);
        let text = entry.transform.map_or_else(|| "(root)".to_string(), describe);
        let _ = writeln!(out, "{indent}{} {text}", entry.cell);
    }

    let camera = match &outcome.settings.camera {
        CameraUpdate::Camera(_) => "explicit".to_string(),
        CameraUpdate::Focus { cell } => format!("focus {cell}"),
        CameraUpdate::Keep => "keep".to_string(),
        CameraUpdate::Reset => "reset".to_string(),
    };
    let _ = writeln!(
        out,
        "{} action(s), {} diagnostic(s), {} annotation source(s); camera: {camera}",
        outcome.actions.len(),
        outcome.diagnostics.len(),
        outcome.annotations.len()
    );
    for diagnostic in &outcome.diagnostics {
        let _ = writeln!(out, "  ⚠ {diagnostic}");
    }
    out.trim_end().to_string()
}
