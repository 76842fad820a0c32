//! Command handlers

use std::env;
use std::fs;
use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, info, instrument};

use crate::application::services::{outline, SyncSession};
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::shell;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{TreeSnapshot, TreeStats};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::svg::SvgCanvas;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e))?;
        return Ok(());
    };

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "treeviz", &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => cmd_config(cli, command),
        other => {
            let container = ServiceContainer::new(load_settings(cli)?)?;
            dispatch(&container, other)
        }
    }
}

/// Run a tree command against an already wired container.
pub fn dispatch(container: &ServiceContainer, command: &Commands) -> CliResult<()> {
    match command {
        Commands::Insert { value } => cmd_insert(container, value),
        Commands::Delete { value } => cmd_delete(container, value),
        Commands::Traverse { order } => cmd_traverse(container, order),
        Commands::Clear => cmd_clear(container),
        Commands::Show {
            svg,
            json,
            width,
            height,
        } => cmd_show(container, svg.as_deref(), *json, *width, *height),
        Commands::Stats => cmd_stats(container),
        Commands::Shell => shell::run(container, io::stdin().lock()),
        Commands::Config { .. } | Commands::Completion { .. } => Err(CliError::Usage(
            "command does not talk to the tree service".to_string(),
        )),
    }
}

/// Settings from files and environment with command line overrides on top.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let cwd = env::current_dir().map_err(|e| InfraError::io("get current directory", e))?;
    let mut settings = Settings::load(Some(&cwd))?;

    if let Some(server) = &cli.server {
        settings.server_url = server.clone();
    }
    if let Some(kind) = &cli.kind {
        if kind.trim().is_empty() {
            return Err(CliError::InvalidArgs("--kind must not be empty".to_string()));
        }
        settings.tree_kind = kind.clone();
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

/// Print a success status or turn an error status into the command's error.
fn report(session: &SyncSession) -> CliResult<()> {
    match session.status() {
        Some(status) if status.is_error() => Err(CliError::Action(status.clone())),
        Some(status) => {
            output::success(status);
            Ok(())
        }
        None => Ok(()),
    }
}

#[instrument(skip(container))]
fn cmd_insert(container: &ServiceContainer, value: &str) -> CliResult<()> {
    let mut session = container.session();
    session.set_input(value);
    session.insert();
    report(&session)?;
    output::info(&outline(session.snapshot()));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_delete(container: &ServiceContainer, value: &str) -> CliResult<()> {
    let mut session = container.session();
    session.set_input(value);
    session.remove();
    report(&session)?;
    output::info(&outline(session.snapshot()));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_traverse(container: &ServiceContainer, order: &str) -> CliResult<()> {
    let mut session = container.session();
    if !session.traverse(order) {
        return report(&session);
    }
    if let Some(traversal) = session.traversal() {
        output::info(traversal);
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_clear(container: &ServiceContainer) -> CliResult<()> {
    let mut session = container.session();
    session.clear();
    report(&session)
}

#[instrument(skip(container))]
fn cmd_show(
    container: &ServiceContainer,
    svg: Option<&Path>,
    json: bool,
    width: Option<u32>,
    height: Option<u32>,
) -> CliResult<()> {
    let mut session = container.session();
    if !session.refresh_snapshot() {
        return report(&session);
    }

    if json {
        output::info(&snapshot_json(session.snapshot())?);
    } else {
        output::info(&outline(session.snapshot()));
    }

    if let Some(path) = svg {
        render_svg(container, session.snapshot(), path, width, height)?;
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_stats(container: &ServiceContainer) -> CliResult<()> {
    let mut session = container.session();
    if !session.refresh_snapshot() {
        return report(&session);
    }
    print_stats(session.tree_kind(), &TreeStats::of(session.snapshot()));
    Ok(())
}

pub(crate) fn print_stats(tree_kind: &str, stats: &TreeStats) {
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    let or_dash = |v: Option<i64>| v.map_or_else(|| "-".to_string(), |v| v.to_string());

    output::header(&format!("{} tree", tree_kind.to_uppercase()));
    output::detail(&format!("nodes:           {}", stats.nodes));
    output::detail(&format!("height:          {}", stats.height));
    output::detail(&format!("leaves:          {}", stats.leaves));
    output::detail(&format!("min:             {}", or_dash(stats.min)));
    output::detail(&format!("max:             {}", or_dash(stats.max)));
    output::detail(&format!("search tree:     {}", yes_no(stats.search_tree)));
    output::detail(&format!("height balanced: {}", yes_no(stats.height_balanced)));
}

fn snapshot_json(snapshot: Option<&TreeSnapshot>) -> CliResult<String> {
    serde_json::to_string_pretty(&snapshot).map_err(|e| {
        ApplicationError::OperationFailed {
            context: "serialize snapshot".to_string(),
            source: Box::new(e),
        }
        .into()
    })
}

/// Draw `snapshot` into an SVG file; size falls back to the configured canvas.
pub(crate) fn render_svg(
    container: &ServiceContainer,
    snapshot: Option<&TreeSnapshot>,
    path: &Path,
    width: Option<u32>,
    height: Option<u32>,
) -> CliResult<()> {
    let canvas_settings = &container.settings.canvas;
    let width = width.unwrap_or(canvas_settings.width);
    let height = height.unwrap_or(canvas_settings.height);
    if width == 0 || height == 0 {
        return Err(CliError::InvalidArgs(format!(
            "canvas size must be positive, got {width}x{height}"
        )));
    }

    let mut canvas = SvgCanvas::new(f64::from(width), f64::from(height));
    container.renderer().draw(&mut canvas, snapshot);
    fs::write(path, canvas.to_svg())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;

    info!("rendered {} elements into {}", canvas.element_count(), path.display());
    output::action("Wrote", &path.display());
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            let cwd = env::current_dir().map_err(|e| InfraError::io("get current directory", e))?;
            match global_config_path() {
                Some(path) => print_config_path("Global", &path),
                None => output::detail(&"Global: (no config directory on this platform)"),
            }
            print_config_path("Local", &local_config_path(&cwd));
            Ok(())
        }
        ConfigCommands::Init { global, force } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("no global config directory on this platform".to_string())
                })?
            } else {
                let cwd =
                    env::current_dir().map_err(|e| InfraError::io("get current directory", e))?;
                local_config_path(&cwd)
            };
            init_config(&path, *force)
        }
    }
}

fn print_config_path(label: &str, path: &Path) {
    let state = if path.exists() { "exists" } else { "missing" };
    output::detail(&format!("{label}: {} ({state})", path.display()));
}

/// Write the config template to `path`, refusing to overwrite unless `force`.
pub fn init_config(path: &Path, force: bool) -> CliResult<()> {
    if path.exists() && !force {
        return Err(CliError::Usage(format!(
            "config already exists: {} (use --force to overwrite)",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
    }
    fs::write(path, Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    output::action("Created", &path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::application::services::StatusKind;
    use crate::infrastructure::traits::TreeService;
    use crate::util::testing::{init_test_setup, InMemoryTreeService, ServiceCall};
    use tempfile::TempDir;

    fn container(service: Arc<InMemoryTreeService>) -> ServiceContainer {
        ServiceContainer::with_deps(Settings::default(), service)
    }

    #[test]
    fn given_number_when_inserting_then_service_receives_it() {
        init_test_setup();
        let service = Arc::new(InMemoryTreeService::new());
        let c = container(service.clone());

        dispatch(&c, &Commands::Insert { value: "42".to_string() }).unwrap();

        assert_eq!(service.tree("abb").map(|t| t.value), Some(42));
    }

    #[test]
    fn given_text_when_inserting_then_fails_with_invalid_status() {
        let service = Arc::new(InMemoryTreeService::new());
        let c = container(service.clone());

        let err = dispatch(&c, &Commands::Insert { value: "abc".to_string() }).unwrap_err();

        match &err {
            CliError::Action(status) => assert_eq!(status.kind, StatusKind::Invalid),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
        assert!(service.calls().is_empty());
    }

    #[test]
    fn given_service_down_when_traversing_then_fails_unavailable() {
        let service = Arc::new(InMemoryTreeService::new());
        service.fail_with_status(500);
        let c = container(service.clone());

        let err = dispatch(&c, &Commands::Traverse { order: "inorden".to_string() }).unwrap_err();

        assert_eq!(err.exit_code(), crate::exitcode::UNAVAILABLE);
        assert!(err.to_string().starts_with("traversal failed:"));
    }

    #[test]
    fn given_tree_when_showing_with_svg_then_writes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tree.svg");
        let service = Arc::new(InMemoryTreeService::new());
        for v in [10, 5, 15] {
            service.insert(v, "abb").unwrap();
        }
        let c = container(service.clone());

        dispatch(
            &c,
            &Commands::Show {
                svg: Some(path.clone()),
                json: false,
                width: Some(400),
                height: None,
            },
        )
        .unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert_eq!(svg.matches("<circle").count(), 3);
        assert_eq!(svg.matches("<line").count(), 2);
        assert_eq!(
            service.calls(),
            vec![
                ServiceCall::Insert { value: 10, tree_kind: "abb".into() },
                ServiceCall::Insert { value: 5, tree_kind: "abb".into() },
                ServiceCall::Insert { value: 15, tree_kind: "abb".into() },
                ServiceCall::Snapshot { tree_kind: "abb".into() },
            ]
        );
    }

    #[test]
    fn given_zero_width_when_rendering_then_rejects() {
        let temp = TempDir::new().unwrap();
        let c = container(Arc::new(InMemoryTreeService::new()));
        let err = render_svg(&c, None, &temp.path().join("x.svg"), Some(0), None).unwrap_err();
        assert_eq!(err.exit_code(), crate::exitcode::USAGE);
    }

    #[test]
    fn given_existing_config_when_init_without_force_then_refuses() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".treeviz.toml");
        fs::write(&path, "tree_kind = \"avl\"\n").unwrap();

        assert!(init_config(&path, false).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "tree_kind = \"avl\"\n");

        init_config(&path, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), Settings::template());
    }

    #[test]
    fn given_empty_tree_when_serializing_then_json_null() {
        assert_eq!(snapshot_json(None).unwrap(), "null");
    }
}
