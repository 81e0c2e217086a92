//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the Ctrl-C handler,
//! then runs either a one-shot relocation or the interactive session.

use anyhow::{Context, Result};
use dialoguer::Confirm;
use std::io;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

use dirlink::cli::Args;
use dirlink::config::{create_template_config, load_config, CONFIG_ENV};
use dirlink::output as out;
use dirlink::{
    default_config_path, shutdown, AssumeYes, Config, Confirmer, Outcome, Prompt,
    RelocationError, RelocationRequest, Relocator, Session,
};

use crate::logging::init_tracing;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CANCELLED: u8 = 3;
pub const EXIT_MANUAL_CLEANUP: u8 = 4;
const EXIT_INTERRUPTED: i32 = 130;

/// Asks on the controlling terminal.
struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&mut self, prompt: &Prompt<'_>) -> io::Result<bool> {
        Confirm::new()
            .with_prompt(prompt.to_string())
            .default(false)
            .interact()
            .map_err(io::Error::other)
    }
}

/// Declines everything; used when stdin cannot answer and `--yes` is absent.
struct NonInteractive;

impl Confirmer for NonInteractive {
    fn confirm(&mut self, _prompt: &Prompt<'_>) -> io::Result<bool> {
        out::print_warn("stdin is not a terminal and --yes was not given; declining.");
        Ok(false)
    }
}

/// Run the CLI application.
pub fn run(args: Args) -> Result<ExitCode> {
    // Config location helpers run before logging init
    if args.print_config {
        print_config_location()?;
        return Ok(ExitCode::SUCCESS);
    }
    if args.init_config {
        let path = default_config_path()?;
        create_template_config(&path)
            .with_context(|| format!("write template config '{}'", path.display()))?;
        out::print_success(&format!("Template config written to: {}", path.display()));
        return Ok(ExitCode::SUCCESS);
    }

    // CLI flags > XML > defaults
    let mut cfg = load_config()?.unwrap_or_default();
    args.apply_overrides(&mut cfg);

    let guard = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json)
        .context("initialize logging")?;

    // The guard is dropped from the handler too so the file log is flushed
    // before an interrupt exits the process.
    let guard_slot = Arc::new(Mutex::new(guard));
    {
        let guard_slot = Arc::clone(&guard_slot);
        if let Err(e) = ctrlc::set_handler(move || {
            shutdown::request();
            if shutdown::in_critical_section() {
                out::print_warn("Interrupt received; finishing the current step first.");
                return;
            }
            out::print_warn("Interrupted; nothing is in progress.");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
            std::process::exit(EXIT_INTERRUPTED);
        }) {
            warn!(error = %e, "could not install Ctrl-C handler");
        }
    }

    debug!(?args, ?cfg, "starting dirlink");

    let relocator = Relocator::new().parent_policy(cfg.parent_policy());
    let code = match args.request() {
        Some(request) => run_once(&relocator, &request, &cfg),
        None => run_session(relocator),
    };

    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }
    code
}

fn print_config_location() -> Result<()> {
    if let Ok(env) = std::env::var(CONFIG_ENV) {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit):\n  {env}"));
        return Ok(());
    }
    let path = default_config_path()?;
    out::print_info(&format!("Default dirlink config path:\n  {}", path.display()));
    if path.exists() {
        out::print_info("A config file exists at that location.");
    } else {
        out::print_info("No config file exists there yet. Run with --init-config to create one.");
    }
    Ok(())
}

fn run_once(relocator: &Relocator, request: &RelocationRequest, cfg: &Config) -> Result<ExitCode> {
    if cfg.dry_run {
        return Ok(match relocator.plan(request) {
            Ok(plan) => {
                out::print_info("Dry-run: nothing will be changed. Pending actions:");
                out::print_user(&plan.to_string());
                ExitCode::SUCCESS
            }
            Err(e) => report_failure(&e),
        });
    }

    let result = if cfg.assume_yes {
        relocator.relocate(request, &mut AssumeYes)
    } else if atty::is(atty::Stream::Stdin) {
        relocator.relocate(request, &mut TerminalConfirmer)
    } else {
        relocator.relocate(request, &mut NonInteractive)
    };

    Ok(match result {
        Ok(Outcome::Completed(record)) => {
            info!(
                src = %record.source.display(),
                dest = %record.destination.display(),
                "relocation completed"
            );
            out::print_success(&format!(
                "'{}' now lives at '{}'; '{}' is a symlink to it.",
                record.source.display(),
                record.destination.display(),
                record.link.display()
            ));
            ExitCode::SUCCESS
        }
        Ok(Outcome::Cancelled) => {
            out::print_warn("Cancelled; nothing was changed.");
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(e) => report_failure(&e),
    })
}

fn run_session(relocator: Relocator) -> Result<ExitCode> {
    let stdin = io::stdin();
    let mut session = Session::new(stdin.lock(), io::stdout(), relocator);
    let summary = session.run().context("interactive session")?;
    info!(
        relocated = summary.relocated,
        undone = summary.undone,
        failed = summary.failed,
        "session finished"
    );
    if summary.needs_cleanup {
        return Ok(ExitCode::from(EXIT_MANUAL_CLEANUP));
    }
    Ok(ExitCode::SUCCESS)
}

fn report_failure(err: &RelocationError) -> ExitCode {
    let stage = err.stage();
    let state = err.filesystem_state();
    match err.validation_failure() {
        Some(failure) => error!(%stage, kind = %failure, "relocation rejected"),
        None => error!(%stage, ?state, error = %err, "relocation failed"),
    }
    out::print_error(&out::failure_report(err));
    if err.needs_manual_cleanup() {
        ExitCode::from(EXIT_MANUAL_CLEANUP)
    } else {
        ExitCode::from(EXIT_FAILURE)
    }
}
