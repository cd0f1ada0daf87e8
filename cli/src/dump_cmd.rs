//! `homeinspect dump`: bootstrap once and print the checklist hierarchy.

use std::io::Write;

use clap::Parser;
use homeinspect_core::InspectConfig;
use homeinspect_core::InspectionStore;
use homeinspect_core::StoreError;
use homeinspect_protocol::CommentId;
use homeinspect_protocol::ResultId;
use homeinspect_protocol::SectionId;
use homeinspect_protocol::SubSectionId;
use serde::Serialize;

#[derive(Debug, Default, Parser)]
pub struct DumpArgs {
    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct SectionView {
    pub id: SectionId,
    pub name: Option<String>,
    pub subsections: Vec<SubSectionView>,
}

#[derive(Debug, Serialize)]
pub struct SubSectionView {
    pub id: SubSectionId,
    pub name: Option<String>,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: CommentId,
    pub text: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_id: Option<ResultId>,
}

pub async fn run(config: &InspectConfig, args: &DumpArgs) -> anyhow::Result<()> {
    let store = InspectionStore::new(config)?;
    store.bootstrap().await?;

    let tree = collect_tree(&store)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &tree)?;
        writeln!(out)?;
    } else {
        write_tree(&tree, &mut out)?;
    }
    Ok(())
}

/// Snapshot the hierarchy in display order.
pub fn collect_tree(store: &InspectionStore) -> Result<Vec<SectionView>, StoreError> {
    let mut tree = Vec::new();
    for section in store.sections()? {
        let mut subsections = Vec::with_capacity(section.subsection_ids.len());
        for subsection_id in &section.subsection_ids {
            let subsection = store.subsection(*subsection_id)?;
            let mut comments = Vec::with_capacity(subsection.comment_ids.len());
            for comment_id in &subsection.comment_ids {
                let comment = store.comment(*comment_id)?;
                comments.push(CommentView {
                    id: comment.id,
                    text: comment.text,
                    active: comment.active,
                    result_id: comment.result_id,
                });
            }
            subsections.push(SubSectionView {
                id: subsection.id,
                name: subsection.name,
                comments,
            });
        }
        tree.push(SectionView {
            id: section.id,
            name: section.name,
            subsections,
        });
    }
    Ok(tree)
}

pub fn write_tree(tree: &[SectionView], out: &mut impl Write) -> std::io::Result<()> {
    for section in tree {
        writeln!(out, "[{}] {}", section.id, label(section.name.as_deref()))?;
        for subsection in &section.subsections {
            writeln!(out, "  [{}] {}", subsection.id, label(subsection.name.as_deref()))?;
            for comment in &subsection.comments {
                write!(out, "    #{} {}", comment.id, comment.text)?;
                if !comment.active {
                    write!(out, " (inactive)")?;
                }
                if let Some(result_id) = comment.result_id {
                    write!(out, " -> result {result_id}")?;
                }
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

fn label(name: Option<&str>) -> &str {
    name.unwrap_or("(unnamed)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tree_renders_with_markers() {
        let tree = vec![SectionView {
            id: 1,
            name: Some("Exterior".to_string()),
            subsections: vec![SubSectionView {
                id: 4,
                name: None,
                comments: vec![
                    CommentView {
                        id: 1,
                        text: "Moss".to_string(),
                        active: true,
                        result_id: Some(0),
                    },
                    CommentView {
                        id: 2,
                        text: "Old note".to_string(),
                        active: false,
                        result_id: None,
                    },
                ],
            }],
        }];

        let mut out = Vec::new();
        write_tree(&tree, &mut out).unwrap_or_else(|e| panic!("write: {e}"));
        assert_eq!(
            String::from_utf8_lossy(&out),
            "[1] Exterior\n  [4] (unnamed)\n    #1 Moss -> result 0\n    #2 Old note (inactive)\n"
        );
    }
}
