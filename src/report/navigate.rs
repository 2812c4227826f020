//! Interactive browsing of a change tree

use crate::diff::FolderChange;
use crate::report::table::render_folder_change;
use std::io::{self, BufRead, Write};
use tracing::trace;

const PROMPT: &str = "Enter name of folder to go to. '.' to go up";

/// Walks a change tree one folder at a time
///
/// Shows the table for the current folder and reads one command per line:
/// `.` goes up (leaving the root ends the session), a subfolder name goes
/// down into it. End of input also ends the session.
pub struct Navigator<'a> {
    root: &'a FolderChange,
}

impl<'a> Navigator<'a> {
    pub fn new(root: &'a FolderChange) -> Self {
        Self { root }
    }

    /// Run the session until the user leaves the root or input ends
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> io::Result<()> {
        let mut path: Vec<&FolderChange> = vec![self.root];
        let mut line = String::new();

        while let Some(&current) = path.last() {
            writeln!(output, "{}", render_folder_change(current))?;
            writeln!(output, "{}", PROMPT)?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }

            let command = line.trim_end_matches(['\r', '\n']);
            if command == "." {
                path.pop();
                continue;
            }

            match current.find_sub(command) {
                Some(sub) => {
                    trace!(folder = %sub.data.cur.path, "Descending");
                    path.push(sub);
                }
                None => writeln!(output, "No such folder!")?,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{ChangeMode, DataChange};
    use crate::snapshot::FsData;
    use std::io::Cursor;

    fn folder(name: &str, path: &str, subs: Vec<FolderChange>) -> FolderChange {
        FolderChange {
            data: DataChange {
                old: FsData::new(name, path, 1),
                cur: FsData::new(name, path, 1),
                change_mode: ChangeMode::Same,
            },
            subs,
            files: vec![],
        }
    }

    fn tree() -> FolderChange {
        folder(
            "R",
            "/R",
            vec![folder("docs", "/R/docs", vec![folder("deep", "/R/docs/deep", vec![])])],
        )
    }

    fn session(commands: &str) -> String {
        let root = tree();
        let mut out = Vec::new();
        Navigator::new(&root)
            .run(Cursor::new(commands.as_bytes()), &mut out)
            .unwrap();
        console::strip_ansi_codes(&String::from_utf8(out).unwrap()).into_owned()
    }

    fn visited(out: &str) -> Vec<&str> {
        out.lines()
            .filter_map(|l| l.strip_prefix("Analysis for path: "))
            .collect()
    }

    #[test]
    fn test_descend_and_return() {
        let out = session("docs\ndeep\n.\n.\n.\n");
        assert_eq!(
            visited(&out),
            vec!["/R", "/R/docs", "/R/docs/deep", "/R/docs", "/R"]
        );
        assert!(!out.contains("No such folder!"));
    }

    #[test]
    fn test_unknown_name() {
        let out = session("nope\n.\n");
        assert_eq!(out.matches("No such folder!").count(), 1);
        assert_eq!(visited(&out), vec!["/R", "/R"]);
    }

    #[test]
    fn test_eof_ends_session() {
        let out = session("docs\r\n");
        assert_eq!(visited(&out), vec!["/R", "/R/docs"]);
    }
}
