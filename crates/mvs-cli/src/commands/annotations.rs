use super::{read_document, write_output};
use crate::cli::AnnotationsArgs;
use crate::error::Result;
use molviewspec::core::annotations::spec::RegisteredAnnotation;
use molviewspec::engine::context::LoadingContext;
use tracing::info;

pub fn run(args: AnnotationsArgs) -> Result<()> {
    let document = read_document(&args.input)?;
    let annotations = collect(&document.tree)?;
    info!("Found {} distinct annotation source(s).", annotations.len());
    write_output(
        args.output.as_deref(),
        &serde_json::to_string_pretty(&annotations)?,
    )
}

fn collect(tree: &molviewspec::core::tree::node::Tree) -> Result<Vec<RegisteredAnnotation>> {
    let context = LoadingContext::prepare(tree)?;
    Ok(context.annotation_specs().to_vec())
}
