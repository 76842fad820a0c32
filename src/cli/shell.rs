//! Interactive session: one tree, many commands, redrawn after each change

use std::io::BufRead;

use tracing::{debug, instrument};

use crate::application::services::{outline, SyncSession};
use crate::cli::commands::{print_stats, render_svg};
use crate::cli::output;
use crate::cli::CliResult;
use crate::domain::{parse_node_value, TreeStats};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::util::path::expand_path;

const HELP: &str = "\
commands:
  insert|i <value>     insert a value
  delete|d <value>     delete a value
  traverse|t <order>   print a traversal (inorden, preorden, postorden, amplitud)
  find|f <value>       look a value up in the shown tree
  clear                remove all values
  kind <name>          switch tree kind
  show                 print the tree
  render <file>        draw the tree into an SVG file
  stats                size, height and shape checks
  help                 this text
  quit|exit            leave";

/// One line typed at the shell prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Raw value text; validated by the session, not here.
    Insert(String),
    Delete(String),
    Traverse(String),
    Find(String),
    Clear,
    Kind(String),
    Show,
    Render(String),
    Stats,
    Help,
    Quit,
    Empty,
}

impl ShellCommand {
    /// Parse a prompt line; the error is a usage hint.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let required = |usage: &str| {
            if rest.is_empty() {
                Err(format!("usage: {usage}"))
            } else {
                Ok(rest.to_string())
            }
        };
        let bare = |cmd: ShellCommand| {
            if rest.is_empty() {
                Ok(cmd)
            } else {
                Err(format!("{verb} takes no arguments"))
            }
        };

        match verb {
            "" => Ok(Self::Empty),
            "insert" | "i" => Ok(Self::Insert(rest.to_string())),
            "delete" | "d" => Ok(Self::Delete(rest.to_string())),
            "traverse" | "t" => required("traverse <order>").map(Self::Traverse),
            "find" | "f" => required("find <value>").map(Self::Find),
            "kind" => required("kind <name>").map(Self::Kind),
            "render" => required("render <file>").map(Self::Render),
            "clear" => bare(Self::Clear),
            "show" => bare(Self::Show),
            "stats" => bare(Self::Stats),
            "help" | "?" => bare(Self::Help),
            "quit" | "exit" | "q" => bare(Self::Quit),
            other => Err(format!("unknown command '{other}', try 'help'")),
        }
    }
}

/// Read commands from `input` until it ends or the user quits.
#[instrument(skip_all)]
pub fn run<R: BufRead>(container: &ServiceContainer, input: R) -> CliResult<()> {
    let mut session = container.session();
    session.refresh_snapshot();
    redraw(&session);

    let mut lines = input.lines();
    loop {
        output::prompt(&format!("{}>", session.tree_kind()));
        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.map_err(|e| InfraError::io("read command", e))?;

        match ShellCommand::parse(&line) {
            Err(usage) => output::warning(&usage),
            Ok(ShellCommand::Quit) => break,
            Ok(command) => execute(container, &mut session, command),
        }
    }
    debug!("shell finished");
    Ok(())
}

fn execute(container: &ServiceContainer, session: &mut SyncSession, command: ShellCommand) {
    match command {
        ShellCommand::Insert(value) => {
            session.set_input(value);
            session.insert();
            after_change(session);
        }
        ShellCommand::Delete(value) => {
            session.set_input(value);
            session.remove();
            after_change(session);
        }
        ShellCommand::Traverse(order) => {
            if session.traverse(&order) {
                if let Some(traversal) = session.traversal() {
                    output::info(traversal);
                }
            } else {
                print_status(session);
            }
        }
        ShellCommand::Find(value) => match parse_node_value(&value) {
            Ok(value) => output::info(&find_message(session, value)),
            Err(e) => output::error(&e),
        },
        ShellCommand::Clear => {
            session.clear();
            after_change(session);
        }
        ShellCommand::Kind(kind) => {
            session.select_tree_kind(kind);
            if !session.refresh_snapshot() {
                print_status(session);
            }
            redraw(session);
        }
        ShellCommand::Show => {
            if !session.refresh_snapshot() {
                print_status(session);
            }
            redraw(session);
        }
        ShellCommand::Render(file) => {
            let path = expand_path(&file);
            if let Err(e) = render_svg(container, session.snapshot(), &path, None, None) {
                output::error(&e);
            }
        }
        ShellCommand::Stats => print_stats(session.tree_kind(), &TreeStats::of(session.snapshot())),
        ShellCommand::Help => output::info(HELP),
        ShellCommand::Quit | ShellCommand::Empty => {}
    }
}

/// Search-tree lookup in the local snapshot; no request is sent.
fn find_message(session: &SyncSession, value: i64) -> String {
    let kind = session.tree_kind().to_uppercase();
    match session.snapshot() {
        Some(tree) if tree.contains(value) => format!("{value} is in {kind}"),
        _ => format!("{value} is not in {kind}"),
    }
}

fn after_change(session: &SyncSession) {
    print_status(session);
    redraw(session);
}

fn print_status(session: &SyncSession) {
    match session.status() {
        Some(status) if status.is_error() => output::error(status),
        Some(status) => output::success(status),
        None => {}
    }
}

fn redraw(session: &SyncSession) {
    output::info(&outline(session.snapshot()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    use rstest::rstest;

    use crate::config::Settings;
    use crate::util::testing::{InMemoryTreeService, ServiceCall};

    #[rstest]
    #[case("insert 5", ShellCommand::Insert("5".into()))]
    #[case("i   -3 ", ShellCommand::Insert("-3".into()))]
    #[case("insert", ShellCommand::Insert(String::new()))]
    #[case("d 7", ShellCommand::Delete("7".into()))]
    #[case("t inorden", ShellCommand::Traverse("inorden".into()))]
    #[case("f 12", ShellCommand::Find("12".into()))]
    #[case("kind avl", ShellCommand::Kind("avl".into()))]
    #[case("render ~/tree.svg", ShellCommand::Render("~/tree.svg".into()))]
    #[case("clear", ShellCommand::Clear)]
    #[case("  ", ShellCommand::Empty)]
    #[case("exit", ShellCommand::Quit)]
    fn given_line_when_parsing_then_yields_command(#[case] line: &str, #[case] expected: ShellCommand) {
        assert_eq!(ShellCommand::parse(line).unwrap(), expected);
    }

    #[rstest]
    #[case("traverse")]
    #[case("render")]
    #[case("find")]
    #[case("clear now")]
    #[case("frobnicate 3")]
    fn given_bad_line_when_parsing_then_returns_hint(#[case] line: &str) {
        assert!(ShellCommand::parse(line).is_err());
    }

    #[test]
    fn given_script_when_running_then_applies_commands_until_quit() {
        let service = Arc::new(InMemoryTreeService::new());
        let container = ServiceContainer::with_deps(Settings::default(), service.clone());
        let script = "insert 10\ni 5\ninsert oops\nkind avl\ni 1\nquit\ninsert 99\n";

        run(&container, Cursor::new(script)).unwrap();

        assert_eq!(service.tree("abb").unwrap().in_order(), vec![5, 10]);
        assert_eq!(service.tree("avl").unwrap().in_order(), vec![1]);
        assert!(!service
            .calls()
            .iter()
            .any(|c| matches!(c, ServiceCall::Insert { value: 99, .. })));
    }

    #[test]
    fn given_snapshot_when_finding_then_descends_local_tree() {
        let service = Arc::new(InMemoryTreeService::new());
        let container = ServiceContainer::with_deps(Settings::default(), service.clone());
        let mut session = container.session();
        for v in ["10", "5", "15", "7"] {
            session.set_input(v);
            assert!(session.insert());
        }
        let calls_before = service.calls().len();

        assert_eq!(find_message(&session, 7), "7 is in ABB");
        assert_eq!(find_message(&session, 8), "8 is not in ABB");
        assert_eq!(service.calls().len(), calls_before);
    }
}
