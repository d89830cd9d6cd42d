use super::read_document;
use crate::cli::ValidateArgs;
use crate::error::{CliError, Result};
use molviewspec::core::tree::params::NodeKind;
use molviewspec::core::tree::traverse::preorder;
use molviewspec::core::tree::validation::validate_tree;
use tracing::{info, warn};

pub fn run(args: ValidateArgs) -> Result<()> {
    let document = read_document(&args.input)?;
    let tree = &document.tree;

    let issues = validate_tree(tree);
    let unknown_kinds = preorder(tree, tree.root())
        .into_iter()
        .filter(|id| tree.kind(*id) == Some(NodeKind::Unknown))
        .count();

    for issue in &issues {
        println!("  ✗ {issue}");
    }
    if unknown_kinds > 0 {
        warn!("{unknown_kinds} node(s) have kinds this interpreter does not recognize.");
    }
    info!(
        "Validated {} node(s): {} issue(s).",
        tree.len(),
        issues.len()
    );

    if issues.is_empty() {
        println!("✓ {} node(s), no issues.", tree.len());
        return Ok(());
    }
    println!("{} issue(s) in {} node(s).", issues.len(), tree.len());
    if args.strict {
        return Err(CliError::ValidationFailed(issues.len()));
    }
    Ok(())
}
