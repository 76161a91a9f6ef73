use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use workspace_changelog::analyzer::TargetSelection;
use workspace_changelog::cli::{self, UpdateArgs};
use workspace_changelog::config::{self, Config, CONFIG_FILE_NAME};
use workspace_changelog::domain::BumpType;
use workspace_changelog::git::Git2Repository;
use workspace_changelog::planner::AppliedPlan;
use workspace_changelog::workspace::{self, JsonManifestStore, Workspace};
use workspace_changelog::{boundary::BoundaryWarning, ui, ChangelogError};

#[derive(Parser)]
#[command(
    name = "workspace-changelog",
    version,
    about = "Dependency-aware version bumps and changelogs for package workspaces"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Workspace directory (defaults to the current one)")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default configuration and build the cache from existing changelogs
    Init,
    /// Bump versions and write changelog entries
    Update(UpdateCommand),
    /// Show, create or reset the configuration file
    Config(ConfigCommand),
    /// Show cache state and pending commits
    Status {
        #[arg(short, long, help = "List pending commits")]
        verbose: bool,
    },
}

#[derive(ClapArgs)]
struct UpdateCommand {
    #[arg(short, long, value_delimiter = ',', conflicts_with = "all", help = "Packages to update")]
    packages: Vec<String>,

    #[arg(short, long, help = "Update every package with pending commits")]
    all: bool,

    #[arg(short = 't', long = "type", help = "Force the bump type (major, minor, patch)")]
    bump: Option<BumpType>,

    #[arg(long, help = "Preview the plan without writing anything")]
    dry_run: bool,

    #[arg(short, long, help = "Proceed despite version conflicts and skip confirmation")]
    force: bool,

    #[arg(short, long, help = "Show debug diagnostics")]
    verbose: bool,
}

#[derive(ClapArgs)]
struct ConfigCommand {
    #[arg(long, conflicts_with_all = ["reset", "show"], help = "Create the config file if missing")]
    init: bool,

    #[arg(long, conflicts_with = "show", help = "Overwrite the config file with defaults")]
    reset: bool,

    #[arg(long, help = "Print the effective configuration")]
    show: bool,
}

fn main() {
    let args = Args::parse();

    let verbose = match &args.command {
        Command::Update(update) => update.verbose,
        Command::Status { verbose } => *verbose,
        _ => false,
    };
    init_tracing(verbose);

    if let Err(e) = run(args) {
        if let Some(ChangelogError::Conflicts(conflicts)) = e.downcast_ref::<ChangelogError>() {
            ui::display_conflicts(conflicts);
            ui::display_error("Aborting; re-run with --force to apply anyway");
        } else {
            ui::display_error(&format!("{:#}", e));
        }
        std::process::exit(1);
    }
}

/// stderr logging; `RUST_LOG` wins over the verbosity flag
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("workspace_changelog={}", default_level)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    tracing_subscriber::registry().with(filter).with(layer).init();
}

fn run(args: Args) -> Result<()> {
    let start = match &args.cwd {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };

    match args.command {
        Command::Config(command) => run_config(args.config.as_deref(), &start, command),
        Command::Init => {
            let workspace = workspace::discover_workspace(&start)?;
            let config = workspace_config(args.config.as_deref(), &workspace)?;
            let report = cli::run_init(&workspace, &config, Utc::now())?;

            match &report.config_written {
                Some(path) => ui::display_success(&format!("Created {}", path.display())),
                None => ui::display_status("Configuration already exists, keeping it"),
            }
            ui::display_success(&format!(
                "Cache written to {} ({} package(s) recovered from changelogs)",
                report.cache_path.display(),
                report.recovered
            ));
            Ok(())
        }
        Command::Status { verbose } => {
            let workspace = workspace::discover_workspace(&start)?;
            let config = workspace_config(args.config.as_deref(), &workspace)?;
            let repo = open_repository(&workspace)?;
            let report = cli::run_status(&repo, &workspace, &config, Utc::now())?;

            println!(
                "Workspace: {} ({} package(s))\n",
                workspace.root.display(),
                workspace.packages.len()
            );
            ui::display_cache_status(&report.cache);
            ui::display_pending(&report.pending, verbose);
            Ok(())
        }
        Command::Update(update) => {
            let mut workspace = workspace::discover_workspace(&start)?;
            let config = workspace_config(args.config.as_deref(), &workspace)?;
            let repo = open_repository(&workspace)?;
            run_update(&repo, &mut workspace, &config, update)
        }
    }
}

/// Explicit path first, then the file at the workspace root, then the usual lookup
fn workspace_config(explicit: Option<&Path>, workspace: &Workspace) -> Result<Config> {
    let at_root = workspace.root.join(CONFIG_FILE_NAME);
    if explicit.is_none() && at_root.exists() {
        return Ok(config::load_config_file(&at_root)?);
    }
    Ok(config::load_config(explicit)?)
}

fn open_repository(workspace: &Workspace) -> Result<Git2Repository> {
    Ok(Git2Repository::open(&workspace.root)?.scoped_to(&workspace.root)?)
}

fn run_update(
    repo: &Git2Repository,
    workspace: &mut Workspace,
    config: &Config,
    update: UpdateCommand,
) -> Result<()> {
    let selection = if update.all {
        TargetSelection::All
    } else if !update.packages.is_empty() {
        TargetSelection::Named(update.packages.clone())
    } else {
        let status = cli::run_status(repo, workspace, config, Utc::now())?;
        let candidates: Vec<String> = status
            .pending
            .iter()
            .filter(|(_, commits)| !commits.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        if candidates.is_empty() {
            ui::display_boundary_warning(&BoundaryWarning::NoPendingChanges);
            return Ok(());
        }
        TargetSelection::Named(ui::select_packages(&candidates)?)
    };

    let mut args = UpdateArgs {
        selection,
        bump: update.bump,
        dry_run: true,
        force: update.force,
    };

    // Always plan first so the user sees what will change
    let preview = cli::run_update_workflow(repo, workspace, config, JsonManifestStore, &args, Utc::now())?;
    if preview.is_empty() {
        ui::display_status("Nothing to update");
        return Ok(());
    }

    ui::display_plan(&preview.plan, &preview.changes);
    if !preview.conflicts.is_empty() {
        ui::display_conflicts(&preview.conflicts);
    }

    if update.dry_run {
        ui::display_status("Dry run: no files were changed");
        return Ok(());
    }

    if !update.force && !ui::confirm_action("Apply these changes?")? {
        println!("Operation cancelled by user.");
        return Ok(());
    }

    args.dry_run = false;
    let result = cli::run_update_workflow(repo, workspace, config, JsonManifestStore, &args, Utc::now())?;

    ui::display_applied(&AppliedPlan {
        changes: result.changes,
        dependency_updates: result.dependency_updates,
    });
    for path in &result.changelogs {
        ui::display_status(&format!("Wrote {}", path.display()));
    }
    Ok(())
}

fn run_config(explicit: Option<&Path>, start: &Path, command: ConfigCommand) -> Result<()> {
    let target = match explicit {
        Some(path) => path.to_path_buf(),
        None => workspace::find_workspace_root(&start.canonicalize()?)?
            .map(|(root, _)| root.join(CONFIG_FILE_NAME))
            .unwrap_or_else(|| start.join(CONFIG_FILE_NAME)),
    };

    if command.init {
        if target.exists() {
            ui::display_status(&format!("{} already exists", target.display()));
        } else {
            Config::default().save(&target)?;
            ui::display_success(&format!("Created {}", target.display()));
        }
        return Ok(());
    }

    if command.reset {
        if target.exists()
            && !ui::confirm_action(&format!("Overwrite {} with defaults?", target.display()))?
        {
            println!("Operation cancelled by user.");
            return Ok(());
        }
        Config::default().save(&target)?;
        ui::display_success(&format!("Reset {}", target.display()));
        return Ok(());
    }

    let config = if target.exists() {
        config::load_config_file(&target)?
    } else {
        config::load_config(explicit)?
    };
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
