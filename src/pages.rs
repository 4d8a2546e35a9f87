use std::collections::HashSet;

use crate::document::DocumentIndex;
use crate::error::Result;
use crate::report::{IssueKind, Report};
use crate::types::{required, Dict};

/// Flatten a page tree into leaf page object numbers.
///
/// Kids are visited depth-first in array order, and that order is the page
/// order. Kids typed `/Pages` are descended into, kids typed `/Page` are
/// collected, and anything else (including a kid without `/Type`) is
/// skipped.
///
/// Only a broken root is an error. A kid that does not resolve, or a
/// nested node without usable `/Kids`, loses just its own branch and is
/// noted in `report`. A node reached a second time is skipped the same
/// way.
pub fn collect_page_numbers(
    doc: &DocumentIndex,
    root: &Dict,
    report: &mut Report,
) -> Result<Vec<u32>> {
    let mut pages = Vec::new();
    let mut visited = HashSet::new();
    walk(doc, root, &mut pages, &mut visited, report)?;
    Ok(pages)
}

fn walk(
    doc: &DocumentIndex,
    node: &Dict,
    pages: &mut Vec<u32>,
    visited: &mut HashSet<u32>,
    report: &mut Report,
) -> Result<()> {
    let kids = required(node, "Kids")?.expect_array()?;

    for kid in kids {
        let kid_num = match kid.expect_ref() {
            Ok(r) => r.obj_num,
            Err(e) => {
                report.record(IssueKind::SkippedPage, format!("page tree kid: {}", e));
                continue;
            }
        };
        let kid_dict = match doc.object(kid_num) {
            Ok(obj) => match obj.as_dict() {
                Some(dict) => dict,
                None => continue,
            },
            Err(e) => {
                report.record(IssueKind::SkippedPage, format!("page tree kid: {}", e));
                continue;
            }
        };

        match kid_dict.get("Type").and_then(|t| t.as_name()) {
            Some("Pages") => {
                if !visited.insert(kid_num) {
                    report.record(
                        IssueKind::SkippedPage,
                        format!("page tree node {} is reached twice", kid_num),
                    );
                    continue;
                }
                if let Err(e) = walk(doc, kid_dict, pages, visited, report) {
                    report.record(
                        IssueKind::SkippedPage,
                        format!("page tree node {}: {}", kid_num, e),
                    );
                }
            }
            Some("Page") => pages.push(kid_num),
            _ => {}
        }
    }

    Ok(())
}
