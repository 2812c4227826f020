//! Indented tree printout of a snapshot

use crate::report::table::format_bytes;
use crate::snapshot::{FolderId, Snapshot};
use console::{pad_str, Alignment};
use std::path::MAIN_SEPARATOR;

const INDENT: &str = "    ";

/// Render `snapshot` as an indented tree
///
/// Each row shows the entry's share of its parent, its size and its name.
/// Subfolders are listed before the files of the same folder. With
/// `max_depth` set, folders deeper than it are not expanded.
pub fn render_snapshot(snapshot: &Snapshot, max_depth: Option<usize>) -> String {
    let mut rows: Vec<(String, String)> = Vec::new();
    collect_rows(snapshot, snapshot.root_id(), 0, max_depth, &mut rows);

    let width = rows
        .iter()
        .map(|(stats, _)| console::measure_text_width(stats))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (stats, name) in rows {
        out.push_str(&pad_str(&stats, width, Alignment::Left, None));
        out.push_str(INDENT);
        out.push_str(&name);
        out.push('\n');
    }
    out
}

fn collect_rows(
    snapshot: &Snapshot,
    id: FolderId,
    depth: usize,
    max_depth: Option<usize>,
    rows: &mut Vec<(String, String)>,
) {
    let folder = snapshot.folder(id);
    let offset = INDENT.repeat(depth);
    let share = match folder.data.parent {
        Some(parent) => percent(folder.size(), snapshot.folder(parent).size()),
        None => 100.0,
    };
    rows.push((
        format!("{}{:.1}%  {}", offset, share, size(folder.size())),
        format!("{}{}{}", offset, folder.name(), MAIN_SEPARATOR),
    ));

    if max_depth.is_some_and(|max| depth >= max) {
        return;
    }

    for &child in &folder.subfolders {
        collect_rows(snapshot, child, depth + 1, max_depth, rows);
    }

    let offset = INDENT.repeat(depth + 1);
    for file in &folder.files {
        rows.push((
            format!("{}{:.1}%  {}", offset, percent(file.size, folder.size()), size(file.size)),
            format!("{}{}", offset, file.name),
        ));
    }
}

fn percent(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn size(bytes: i64) -> String {
    format_bytes(u64::try_from(bytes).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        let mut snap = Snapshot::new("R", "/R");
        let root = snap.root_id();
        let docs = snap.add_folder(root, "docs");
        snap.add_file(docs, "a.txt", 30);
        let deep = snap.add_folder(docs, "deep");
        snap.add_file(deep, "b.bin", 10);
        snap.add_file(root, "top", 60);
        snap.aggregate();
        snap
    }

    #[test]
    fn test_full_tree() {
        let out = render_snapshot(&sample(), None);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("100.0%  100 B"));
        assert!(lines[0].ends_with(&format!("R{}", MAIN_SEPARATOR)));
        assert!(lines[1].contains("40.0%  40 B"));
        assert!(lines[1].ends_with(&format!("    docs{}", MAIN_SEPARATOR)));
        assert!(lines[2].ends_with(&format!("        deep{}", MAIN_SEPARATOR)));
        assert!(lines[3].ends_with("            b.bin"));
        assert!(lines[4].ends_with("        a.txt"));
        assert!(lines[5].contains("60.0%  60 B"));
        assert!(lines[5].ends_with("    top"));
    }

    #[test]
    fn test_depth_limit() {
        let snap = sample();

        let root_only = render_snapshot(&snap, Some(0));
        assert_eq!(root_only.lines().count(), 1);

        let one_level = render_snapshot(&snap, Some(1));
        let lines: Vec<&str> = one_level.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with(&format!("docs{}", MAIN_SEPARATOR)));
        assert!(lines[2].ends_with("top"));
    }

    #[test]
    fn test_empty_folder_share() {
        let mut snap = Snapshot::new("R", "/R");
        snap.add_folder(snap.root_id(), "void");
        snap.aggregate();

        let out = render_snapshot(&snap, None);
        assert!(out.lines().nth(1).unwrap().contains("0.0%  0 B"));
    }
}
