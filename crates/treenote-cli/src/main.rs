//! Thin demo host for the treenote editing engine.
//!
//! This binary is deliberately minimal: the engine (`spec.md` §1) treats the
//! terminal UI layer, keybinding maps, and status/help bars as external
//! collaborators, so this host drives the facade (`treenote_editor::Editor`)
//! from a line-oriented command script on stdin rather than a curses-style
//! screen. It exists to prove the facade's surface is complete and to give
//! the engine something runnable; a real terminal front end is out of scope.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use treenote_doc::TreeIndex;
use treenote_editor::Editor;

/// A hierarchical plain-text note editor, driven by a line-oriented command
/// script on stdin. Run `help` at the prompt for the command list.
#[derive(Parser, Debug)]
#[command(name = "treenote", version, about)]
struct Args {
    /// Note file to open (tree-drawing text). Omit to start untitled.
    path: Option<PathBuf>,
    /// Configuration file overriding the `treenote.toml` discovered next to
    /// the log directory.
    #[arg(long = "config")]
    config: Option<PathBuf>,
    /// Directory `autosave` snapshots and the default log file are written to.
    #[arg(long = "dir", default_value = ".")]
    dir: PathBuf,
}

fn configure_logging(dir: &Path) -> Option<WorkerGuard> {
    let log_path = dir.join("treenote.log");
    let appender = tracing_appender::rolling::never(dir, "treenote.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(writer)
        .try_init()
    {
        Ok(()) => {
            info!(target: "host.io", path = %log_path.display(), "logging_started");
            Some(guard)
        }
        Err(_) => None, // a subscriber is already installed (e.g. under `cargo test`)
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "host.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging(&args.dir);
    install_panic_hook();

    let mut editor = match args.config.as_ref() {
        Some(path) => Editor::try_with_config_file(path)?,
        None => Editor::make_empty_with_config_dir(&args.dir),
    };

    if let Some(path) = args.path.as_ref() {
        let (status, stats) = editor.load_file(path);
        if status == treenote_editor::FileStatus::None {
            info!(target: "host.io", path = %path.display(), nodes = stats.node_count, "opened");
        } else {
            warn!(target: "host.io", path = %path.display(), ?status, "open_reported_status");
            if status != treenote_editor::FileStatus::DoesNotExist {
                anyhow::bail!("could not open {}: {:?}", path.display(), status);
            }
        }
    }

    run_command_loop(&mut editor, &args.dir)
}

fn run_command_loop(editor: &mut Editor, dir: &Path) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    print_tree(editor, &mut stdout)?;
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match dispatch(editor, line, dir, &mut stdout) {
            Ok(Control::Continue) => {}
            Ok(Control::Quit) => break,
            Err(err) => writeln!(stdout, "error: {err}")?,
        }
        stdout.flush()?;
    }
    if editor.modified() {
        let status = editor.save_to_tmp(dir);
        info!(target: "host.io", ?status, "exit_autosave");
    }
    Ok(())
}

enum Control {
    Continue,
    Quit,
}

/// Parses and executes one command line. Commands mirror the facade's
/// operation names (`spec.md` §6) closely enough that this function is a
/// thin dispatch table rather than its own keybinding layer.
fn dispatch(editor: &mut Editor, line: &str, dir: &Path, out: &mut impl Write) -> Result<Control> {
    let mut parts = line.split_whitespace();
    let cmd = parts.next().unwrap_or("");
    let rest: Vec<&str> = parts.collect();

    match cmd {
        "help" => print_help(out)?,
        "quit" | "exit" | "q" => return Ok(Control::Quit),
        "render" => print_tree(editor, out)?,

        // Line editing.
        "ins" => {
            let text = line.splitn(2, ' ').nth(1).unwrap_or("");
            report(out, "line_insert_text", editor.line_insert_text(text))?;
        }
        "nl" => report(out, "line_newline", editor.line_newline())?,
        "del" => report(out, "line_delete_char", editor.line_delete_char())?,
        "bs" => report(out, "line_backspace", editor.line_backspace())?,
        "dw" => report(out, "line_forward_delete_word", editor.line_forward_delete_word())?,
        "db" => report(out, "line_backward_delete_word", editor.line_backward_delete_word())?,

        // Cursor movement.
        "left" => editor.cursor_mv_left(amt(&rest)),
        "right" => editor.cursor_mv_right(amt(&rest)),
        "up" => editor.cursor_mv_up(amt(&rest)),
        "down" => editor.cursor_mv_down(amt(&rest)),
        "wf" => editor.cursor_wd_forward(),
        "wb" => editor.cursor_wd_backward(),
        "sol" => editor.cursor_to_sol(),
        "eol" => editor.cursor_to_eol(),
        "sof" => editor.cursor_to_sof(),
        "eof" => editor.cursor_to_eof(),
        "parent" => editor.cursor_nd_parent(),
        "child" => editor.cursor_nd_child(),
        "prev" => editor.cursor_nd_prev(),
        "next" => editor.cursor_nd_next(),
        "goto" => {
            let (index_s, line_s, col_s) = (
                *rest.first().context("goto needs <index> <line> <col>")?,
                *rest.get(1).context("goto needs <index> <line> <col>")?,
                *rest.get(2).context("goto needs <index> <line> <col>")?,
            );
            let index = parse_tree_index(index_s)?;
            editor.cursor_go_to(&index, line_s.parse()?, col_s.parse()?);
        }

        // Tree editing.
        "higher" => report(out, "node_move_higher_rec", editor.node_move_higher_rec())?,
        "lower" => report(out, "node_move_lower_rec", editor.node_move_lower_rec())?,
        "back" => report(out, "node_move_back_rec", editor.node_move_back_rec())?,
        "forward" => report(out, "node_move_forward_rec", editor.node_move_forward_rec())?,
        "indent" => report(out, "node_move_lower_indent", editor.node_move_lower_indent())?,
        "new" => report(out, "node_insert_default", editor.node_insert_default())?,
        "newenter" => report(out, "node_insert_enter", editor.node_insert_enter())?,
        "newabove" => report(out, "node_insert_above", editor.node_insert_above())?,
        "newbelow" => report(out, "node_insert_below", editor.node_insert_below())?,
        "newchild" => report(out, "node_insert_child", editor.node_insert_child())?,
        "delcheck" => report(out, "node_delete_check", editor.node_delete_check())?,
        "delspecial" => report(out, "node_delete_special", editor.node_delete_special())?,
        "delrec" => report(out, "node_delete_rec", editor.node_delete_rec())?,
        "cut" => report(out, "node_cut", editor.node_cut())?,
        "copy" => report(out, "node_copy", editor.node_copy())?,
        "pasteabove" => report(out, "node_paste_above", editor.node_paste_above())?,
        "paste" => report(out, "node_paste_default", editor.node_paste_default())?,

        // Undo/redo.
        "undo" => report_name(out, "undo", editor.undo())?,
        "redo" => report_name(out, "redo", editor.redo())?,

        // Lifecycle.
        "save" => {
            let path = rest.first().map(|s| PathBuf::from(s));
            let (status, stats) = editor.save_file(path.as_deref());
            writeln!(out, "save: {status:?} bytes={}", stats.bytes_written)?;
        }
        "autosave" => {
            let target = rest.first().map(PathBuf::from).unwrap_or_else(|| dir.to_path_buf());
            let status = editor.save_to_tmp(&target);
            writeln!(out, "autosave: {status:?}")?;
        }
        "status" => print_status(editor, out)?,

        other => writeln!(out, "unknown command: {other} (try `help`)")?,
    }
    Ok(Control::Continue)
}

fn amt(rest: &[&str]) -> usize {
    rest.first().and_then(|s| s.parse().ok()).unwrap_or(1)
}

fn parse_tree_index(s: &str) -> Result<TreeIndex> {
    if s == "." || s.is_empty() {
        return Ok(TreeIndex::root());
    }
    let mut idx = TreeIndex::root();
    for part in s.split('.') {
        idx = idx.child(part.parse().with_context(|| format!("invalid tree index {s}"))?);
    }
    Ok(idx)
}

fn report(out: &mut impl Write, name: &str, code: i32) -> Result<()> {
    if code == 0 {
        writeln!(out, "{name}: ok")?;
    } else {
        writeln!(out, "{name}: refused")?;
    }
    Ok(())
}

fn report_name(out: &mut impl Write, action: &str, name: Option<&'static str>) -> Result<()> {
    match name {
        Some(n) => writeln!(out, "{action}: {n}")?,
        None => writeln!(out, "{action}: refused")?,
    }
    Ok(())
}

fn print_status(editor: &Editor, out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "y={} x={} rows={} modified={} title={}",
        editor.view.cursor.y,
        editor.view.cursor.x,
        editor.row_count(),
        editor.modified(),
        editor.title()
    )?;
    Ok(())
}

/// Renders every row using the facade's prefix/content accessors
/// (`spec.md` §6), the same way a terminal front end would build a line.
fn print_tree(editor: &Editor, out: &mut impl Write) -> Result<()> {
    for y in 0..editor.row_count() {
        let prefix = editor.get_entry_prefix(y);
        let len = editor.get_entry_line_length(y);
        let content = editor.get_entry_content(y, 0, len);
        writeln!(out, "{prefix}{content}")?;
    }
    Ok(())
}

fn print_help(out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "commands: ins <text>|nl|del|bs|dw|db \
         left/right/up/down [n]|wf|wb|sol|eol|sof|eof|parent|child|prev|next|goto <idx> <line> <col> \
         higher|lower|back|forward|indent|new|newenter|newabove|newbelow|newchild \
         delcheck|delspecial|delrec|cut|copy|paste|pasteabove \
         undo|redo|save [path]|autosave [dir]|status|render|quit"
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(editor: &mut Editor, lines: &[&str]) -> String {
        let dir = std::env::temp_dir();
        let mut out = Vec::new();
        for line in lines {
            dispatch(editor, line, &dir, &mut out).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn insert_and_render_round_trip() {
        let mut editor = Editor::make_empty();
        run(&mut editor, &["ins hello"]);
        let mut out = Vec::new();
        print_tree(&editor, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "└── hello\n");
    }

    #[test]
    fn undo_reports_refused_on_empty_history() {
        let mut editor = Editor::make_empty();
        let output = run(&mut editor, &["undo"]);
        assert_eq!(output, "undo: refused\n");
    }

    #[test]
    fn new_node_then_delete_round_trip_through_dispatch() {
        let mut editor = Editor::make_empty();
        let output = run(&mut editor, &["new", "delrec"]);
        assert!(output.contains("node_insert_default: ok"));
        assert!(output.contains("node_delete_rec: ok"));
        assert_eq!(editor.row_count(), 1);
    }

    #[test]
    fn tree_index_parsing_accepts_root_and_dotted_paths() {
        assert_eq!(parse_tree_index(".").unwrap(), TreeIndex::root());
        assert_eq!(parse_tree_index("1.2").unwrap(), TreeIndex::root().child(1).child(2));
    }
}
