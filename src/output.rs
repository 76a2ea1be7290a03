//! CLI output formatting for `build` and `check`.
//!
//! Output lists what the site consists of, not how it was produced: one line
//! per page with its resolved title and output file, copies grouped first.
//!
//! ## Build
//!
//! ```text
//! Copied
//!     assets/ (3 files) ← content/assets
//!     404.html ← content/404.html
//!
//! Pages
//! 001 First - My site → post/first/index.html
//! 002 My site → index.html
//!
//! Wrote 2 pages, 2 copies to dist
//! ```
//!
//! ## Check
//!
//! ```text
//! Pages
//! 001 First - My site → post/first/index.html
//!
//! Errors
//!     "/post/{s}": error while rendering route: front matter not found
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::generate::{CommitError, CommitReport, CopyKind, PageEntry};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn count(n: usize, one: &str, many: &str) -> String {
    format!("{n} {}", if n == 1 { one } else { many })
}

/// Format a page line: index, title (or the route path when untitled), file.
fn page_line(index: usize, page: &PageEntry) -> String {
    let label = if page.title.is_empty() {
        format!("(/{})", page.route)
    } else {
        page.title.clone()
    };
    format!(
        "{} {} → {}",
        format_index(index),
        label,
        page.file.display()
    )
}

fn format_pages(pages: &[PageEntry]) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    lines.extend(
        pages
            .iter()
            .enumerate()
            .map(|(i, page)| page_line(i + 1, page)),
    );
    lines
}

// ============================================================================
// Build
// ============================================================================

pub fn format_commit_report(report: &CommitReport) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.copies.is_empty() {
        lines.push("Copied".to_string());
        for copy in &report.copies {
            let line = match copy.kind {
                CopyKind::Directory => format!(
                    "{}{}/ ({}) ← {}",
                    indent(1),
                    copy.destination.display(),
                    count(copy.files, "file", "files"),
                    copy.source.display()
                ),
                CopyKind::File => format!(
                    "{}{} ← {}",
                    indent(1),
                    copy.destination.display(),
                    copy.source.display()
                ),
            };
            lines.push(line);
        }
        lines.push(String::new());
    }

    lines.extend(format_pages(&report.pages));
    lines.push(String::new());
    lines.push(format!(
        "Wrote {}, {} to {}",
        count(report.pages.len(), "page", "pages"),
        count(report.copies.len(), "copy", "copies"),
        report.destination.display()
    ));
    lines
}

pub fn print_commit_report(report: &CommitReport) {
    for line in format_commit_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Planned pages followed by the reason the commit would be refused, if any.
pub fn format_check_output(pages: &[PageEntry], result: Result<(), &CommitError>) -> Vec<String> {
    let mut lines = format_pages(pages);

    let Err(err) = result else {
        return lines;
    };
    lines.push(String::new());
    lines.push("Errors".to_string());
    match err {
        CommitError::Routes(errors) => {
            for (path, cause) in errors.iter() {
                lines.push(format!("{}\"{}\": {}", indent(1), path, cause));
            }
        }
        CommitError::Conflicts(conflicts) => {
            for conflict in conflicts {
                lines.push(format!(
                    "{}{} claimed by {}",
                    indent(1),
                    conflict.file.display(),
                    conflict.routes.join(", ")
                ));
            }
        }
        other => lines.push(format!("{}{}", indent(1), other)),
    }
    lines
}

pub fn print_check_output(pages: &[PageEntry], result: Result<(), &CommitError>) {
    for line in format_check_output(pages, result) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{CopiedEntry, OutputConflict};
    use crate::routes::Routes;
    use crate::test_helpers::generator;
    use maud::html;
    use std::path::PathBuf;

    fn page(route: &str, file: &str, title: &str) -> PageEntry {
        PageEntry {
            route: route.to_string(),
            file: PathBuf::from(file),
            title: title.to_string(),
        }
    }

    #[test]
    fn commit_report_lists_copies_then_pages() {
        let report = CommitReport {
            destination: PathBuf::from("dist"),
            copies: vec![
                CopiedEntry {
                    kind: CopyKind::Directory,
                    source: PathBuf::from("content/assets"),
                    destination: PathBuf::from("assets"),
                    files: 3,
                },
                CopiedEntry {
                    kind: CopyKind::File,
                    source: PathBuf::from("content/404.html"),
                    destination: PathBuf::from("404.html"),
                    files: 1,
                },
            ],
            pages: vec![page("post/first", "post/first/index.html", "First - My site")],
        };

        assert_eq!(
            format_commit_report(&report),
            vec![
                "Copied",
                "    assets/ (3 files) ← content/assets",
                "    404.html ← content/404.html",
                "",
                "Pages",
                "001 First - My site → post/first/index.html",
                "",
                "Wrote 1 page, 2 copies to dist",
            ]
        );
    }

    #[test]
    fn commit_report_without_copies() {
        let report = CommitReport {
            destination: PathBuf::from("out"),
            copies: vec![],
            pages: vec![page("", "index.html", "")],
        };
        let lines = format_commit_report(&report);
        assert_eq!(lines[0], "Pages");
        assert_eq!(lines[1], "001 (/) → index.html");
        assert_eq!(lines.last().unwrap(), "Wrote 1 page, 0 copies to out");
    }

    #[test]
    fn check_output_ok_lists_pages_only() {
        let pages = vec![page("about", "about/index.html", "About")];
        let lines = format_check_output(&pages, Ok(()));
        assert_eq!(lines, vec!["Pages", "001 About → about/index.html"]);
    }

    #[test]
    fn check_output_lists_route_errors() {
        let mut g = generator();
        Routes::from_slugs("/post", ["a"]).add_to(&mut g, |_| Ok(html! {}));
        let err = g.check().unwrap_err();

        let lines = format_check_output(&[], Err(&err));
        assert_eq!(lines[2], "Errors");
        assert_eq!(lines[3], "    \"/post\": slug placeholder {s} not found in \"/post\"");
    }

    #[test]
    fn check_output_lists_conflicts() {
        let err = CommitError::Conflicts(vec![OutputConflict {
            file: PathBuf::from("about/index.html"),
            routes: vec!["about".into(), "about/".into()],
        }]);
        let lines = format_check_output(&[], Err(&err));
        assert_eq!(lines.last().unwrap(), "    about/index.html claimed by about, about/");
    }
}
