//! Change table for one level of a change tree

use crate::diff::{DataChange, FolderChange};
use crate::snapshot::FsData;
use console::{pad_str, style, Alignment};
use humansize::{format_size, DECIMAL};
use std::path::MAIN_SEPARATOR;

const HEADERS: [&str; 6] = [
    "Name",
    "Change type",
    "Percent diff",
    "Absolute diff",
    "Old fraction -> New fraction",
    "Old size -> New size",
];

/// Gap between columns
const GAP: &str = "  ";

/// Child rows are indented under the folder row
const CHILD_PREFIX: &str = "|----";

struct Row<'a> {
    cells: [String; 6],
    change: &'a DataChange,
}

/// Render a folder and its direct children as an aligned, colored table
///
/// Rows that grew are green and rows that shrank are red.
pub fn render_folder_change(change: &FolderChange) -> String {
    let mut rows = Vec::with_capacity(1 + change.subs.len() + change.files.len());
    rows.push(Row {
        cells: cells(&change.data, None, true, ""),
        change: &change.data,
    });
    for sub in &change.subs {
        rows.push(Row {
            cells: cells(&sub.data, Some(&change.data), true, CHILD_PREFIX),
            change: &sub.data,
        });
    }
    for file in &change.files {
        rows.push(Row {
            cells: cells(file, Some(&change.data), false, CHILD_PREFIX),
            change: file,
        });
    }

    let mut widths = HEADERS.map(console::measure_text_width);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(&row.cells) {
            *width = (*width).max(console::measure_text_width(cell));
        }
    }

    let mut out = String::new();
    out.push_str(&format!("Analysis for path: {}\n\n", change.data.cur.path));
    out.push_str(&join_padded(&HEADERS, &widths));
    out.push('\n');

    for row in &rows {
        let line = join_padded(&row.cells, &widths);
        let line = if row.change.grew() {
            style(line).green().to_string()
        } else if row.change.shrank() {
            style(line).red().to_string()
        } else {
            line
        };
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// Render tables for the root and every differing folder down to `max_depth`
///
/// Folders whose mode is `same` are skipped below the root, along with
/// everything under them.
pub fn render_change_levels(change: &FolderChange, max_depth: usize) -> String {
    let mut out = String::new();
    let mut stack = vec![(change, 0usize)];

    while let Some((folder, depth)) = stack.pop() {
        out.push_str(&render_folder_change(folder));
        out.push('\n');

        if depth < max_depth {
            stack.extend(
                folder
                    .subs
                    .iter()
                    .rev()
                    .filter(|sub| !sub.change_mode().is_same())
                    .map(|sub| (sub, depth + 1)),
            );
        }
    }

    out
}

fn join_padded<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let padded: Vec<_> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| pad_str(cell.as_ref(), width, Alignment::Left, None))
        .collect();
    padded.join(GAP).trim_end().to_string()
}

fn cells(
    data: &DataChange,
    parent: Option<&DataChange>,
    is_folder: bool,
    prefix: &str,
) -> [String; 6] {
    let sign = sign(data);
    let mark = if is_folder {
        MAIN_SEPARATOR.to_string()
    } else {
        String::new()
    };

    [
        format!("{}{}{}", prefix, data.name(), mark),
        data.change_mode.to_string(),
        format!("{}{:.1}%", sign, data.percent_size_change()),
        format!("{}{}", sign, format_bytes(data.size_delta().unsigned_abs())),
        format!(
            "{:.1}% -> {:.1}%",
            fraction_of(&data.old, parent.map(|p| &p.old)),
            fraction_of(&data.cur, parent.map(|p| &p.cur)),
        ),
        format!(
            "{} -> {}",
            format_bytes(non_negative(data.old.size)),
            format_bytes(non_negative(data.cur.size))
        ),
    ]
}

fn sign(data: &DataChange) -> &'static str {
    if data.grew() {
        "+"
    } else if data.shrank() {
        "-"
    } else {
        "="
    }
}

/// Share of the parent's size in percent; 100 for the top row, 0 under an empty parent
fn fraction_of(child: &FsData, parent: Option<&FsData>) -> f64 {
    match parent {
        None => 100.0,
        Some(parent) if parent.size == 0 => 0.0,
        Some(parent) => child.size as f64 / parent.size as f64 * 100.0,
    }
}

fn non_negative(size: i64) -> u64 {
    u64::try_from(size).unwrap_or(0)
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::ChangeMode;

    fn sample() -> FolderChange {
        FolderChange {
            data: DataChange {
                old: FsData::new("R", "/R", 30),
                cur: FsData::new("R", "/R", 35),
                change_mode: ChangeMode::Changed,
            },
            subs: vec![FolderChange {
                data: DataChange::removed(FsData::new("old", "/R/old", 0)),
                subs: vec![],
                files: vec![],
            }],
            files: vec![
                DataChange::between(FsData::new("a", "/R/a", 10), FsData::new("a", "/R/a", 15)),
                DataChange::between(FsData::new("b", "/R/b", 20), FsData::new("b", "/R/b", 20)),
                DataChange::added(FsData::new("c", "/R/c", 5)),
            ],
        }
    }

    fn plain(text: &str) -> String {
        console::strip_ansi_codes(text).into_owned()
    }

    #[test]
    fn test_header_and_rows() {
        let out = plain(&render_folder_change(&sample()));
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "Analysis for path: /R");
        assert!(lines[2].starts_with("Name"));
        assert!(lines[3].starts_with(&format!("R{}", MAIN_SEPARATOR)));
        assert!(lines[4].starts_with(&format!("|----old{}", MAIN_SEPARATOR)));
        assert!(lines[5].starts_with("|----a "));
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn test_row_values() {
        let out = plain(&render_folder_change(&sample()));
        let a = out.lines().find(|l| l.starts_with("|----a ")).unwrap();
        assert!(a.contains("changed"));
        assert!(a.contains("+33.3%"));
        assert!(a.contains("+5 B"));
        assert!(a.contains("33.3% -> 42.9%"));
        assert!(a.contains("10 B -> 15 B"));

        let b = out.lines().find(|l| l.starts_with("|----b ")).unwrap();
        assert!(b.contains("same"));
        assert!(b.contains("=0.0%"));

        let c = out.lines().find(|l| l.starts_with("|----c ")).unwrap();
        assert!(c.contains("new"));
        assert!(c.contains("+100.0%"));
    }

    #[test]
    fn test_columns_aligned() {
        let out = plain(&render_folder_change(&sample()));
        let lines: Vec<&str> = out.lines().skip(2).collect();
        let column = lines[0].find("Change type").unwrap();
        for line in &lines[1..] {
            let mode_start = line[column..].chars().next().unwrap();
            assert!(mode_start.is_ascii_alphabetic(), "misaligned: {line}");
        }
    }

    #[test]
    fn test_change_levels_skip_same() {
        let mut tree = sample();
        tree.subs.push(FolderChange {
            data: DataChange::between(
                FsData::new("kept", "/R/kept", 4),
                FsData::new("kept", "/R/kept", 4),
            ),
            subs: vec![],
            files: vec![],
        });

        let out = plain(&render_change_levels(&tree, 1));
        let tables: Vec<&str> = out
            .lines()
            .filter_map(|l| l.strip_prefix("Analysis for path: "))
            .collect();
        assert_eq!(tables, vec!["/R", "/R/old"]);

        let root_only = plain(&render_change_levels(&tree, 0));
        assert_eq!(root_only.matches("Analysis for path").count(), 1);
    }

    #[test]
    fn test_fraction_of_empty_parent() {
        let child = FsData::new("x", "/x", 0);
        let parent = FsData::new("p", "/", 0);
        assert_eq!(fraction_of(&child, Some(&parent)), 0.0);
        assert_eq!(fraction_of(&child, None), 100.0);
    }
}
