//! CLI driver, grounded in the teacher's `commands` module (one function
//! per concern) and in the pack's `clap`-derive CLIs
//! (`preedep-jobweaver-rs`). Tauri's IPC surface is replaced outright by a
//! `clap::Parser` over stdin/stdout/exit-code, since there is no desktop
//! shell in this crate (see DESIGN.md).

pub mod scenarios;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{error, info};

use crate::domain::Registry;
use crate::error::SchedulerError;
use crate::model::{self, GenerateOptions};
use crate::schedule::{ics, Schedule};

pub const EXIT_OK: i32 = 0;
pub const EXIT_INFEASIBLE: i32 = 2;
pub const EXIT_CONFIG_ERROR: i32 = 64;

#[derive(Parser)]
#[command(name = "dutyweave", about = "Constraint-programming physician duty scheduler")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Root directory holding named scenario fragments.
    #[arg(long, global = true, default_value = "scenarios")]
    pub scenarios_root: PathBuf,

    /// Directory schedules/ICS/debug artifacts are written to.
    #[arg(long, global = true, default_value = "out")]
    pub out_dir: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a single scenario.
    Run {
        #[arg(long)]
        scenario: String,
        #[arg(long)]
        task_scenario: Option<String>,
        #[arg(long)]
        physician_scenario: Option<String>,
        #[arg(long)]
        calendar_scenario: Option<String>,
        #[arg(long)]
        schedule_scenario: Option<String>,
        #[arg(long)]
        use_initial: bool,
    },
    /// Run every scenario found under `--scenarios-root`.
    RunAll {
        #[arg(long)]
        use_initial: bool,
    },
    /// Print a `calendar.json`-shaped holiday fragment for a region/year.
    /// Never invoked as part of `run`/`run-all` - see `config::holidays_api`.
    ImportHolidays {
        #[arg(long)]
        region: String,
        #[arg(long)]
        year: i32,
    },
}

pub fn run(cli: Cli) -> i32 {
    std::fs::create_dir_all(&cli.out_dir).ok();
    match cli.command {
        Command::Run {
            scenario,
            task_scenario,
            physician_scenario,
            calendar_scenario,
            schedule_scenario,
            use_initial,
        } => run_one(
            &cli.scenarios_root,
            &cli.out_dir,
            &scenario,
            task_scenario.as_deref(),
            physician_scenario.as_deref(),
            calendar_scenario.as_deref(),
            schedule_scenario.as_deref(),
            use_initial,
        ),
        Command::RunAll { use_initial } => {
            let names = scenarios::list_scenarios(&cli.scenarios_root);
            if names.is_empty() {
                error!("no scenarios found under {}", cli.scenarios_root.display());
                return EXIT_CONFIG_ERROR;
            }
            let mut worst = EXIT_OK;
            for name in names {
                let out_dir = cli.out_dir.join(&name);
                std::fs::create_dir_all(&out_dir).ok();
                let code = run_one(&cli.scenarios_root, &out_dir, &name, None, None, None, None, use_initial);
                worst = worst.max(code);
            }
            worst
        }
        Command::ImportHolidays { region, year } => match crate::config::holidays_api::fetch_public_holidays(&region, year) {
            Ok(holidays) => {
                let dates: Vec<_> = holidays.iter().map(|h| h.date).collect();
                let fragment = serde_json::json!({ "region": region, "holidays": dates });
                println!("{}", serde_json::to_string_pretty(&fragment).unwrap());
                EXIT_OK
            }
            Err(e) => {
                error!("failed to import holidays: {e}");
                EXIT_CONFIG_ERROR
            }
        },
    }
}

#[allow(clippy::too_many_arguments)]
fn run_one(
    scenarios_root: &std::path::Path,
    out_dir: &std::path::Path,
    scenario: &str,
    task_scenario: Option<&str>,
    physician_scenario: Option<&str>,
    calendar_scenario: Option<&str>,
    schedule_scenario: Option<&str>,
    use_initial: bool,
) -> i32 {
    let paths = scenarios::compose(
        scenarios_root,
        scenario,
        task_scenario,
        physician_scenario,
        calendar_scenario,
        schedule_scenario,
    );

    let registry = match crate::config::load_registry(&paths.tasks, &paths.physicians) {
        Ok(r) => r,
        Err(e) => {
            error!("configuration error: {e}");
            return EXIT_CONFIG_ERROR;
        }
    };

    let calendar = match crate::config::calendar::load(&paths.calendar) {
        Ok(c) => c,
        Err(e) => {
            error!("configuration error: {e}");
            return EXIT_CONFIG_ERROR;
        }
    };

    let prior_schedule: Option<Schedule> = match &paths.schedule {
        Some(p) => match crate::config::schedule_doc::load(p) {
            Ok(s) => Some(s),
            Err(e) => {
                error!("configuration error loading prior schedule: {e}");
                return EXIT_CONFIG_ERROR;
            }
        },
        None => None,
    };

    run_pipeline(
        &registry,
        &calendar,
        prior_schedule.as_ref(),
        use_initial,
        out_dir,
        scenario,
    )
}

fn run_pipeline(
    registry: &Registry,
    calendar: &crate::calendar::Calendar,
    prior_schedule: Option<&Schedule>,
    use_initial: bool,
    out_dir: &std::path::Path,
    scenario: &str,
) -> i32 {
    let extra_holidays: Vec<_> = calendar.holidays.iter().copied().collect();
    let mut backend = crate::solver::highs_backend::HighsBackend::new();
    let options = GenerateOptions {
        use_initial,
        ..GenerateOptions::default()
    };

    let outcome = model::generate(
        registry,
        calendar.start_date,
        calendar.end_date,
        &calendar.region,
        &extra_holidays,
        prior_schedule,
        &mut backend,
        &options,
    );

    match outcome {
        Ok(outcome) => {
            info!("scenario '{scenario}' solved feasibly");
            let schedule_path = out_dir.join("schedule.json");
            if let Err(e) = crate::config::schedule_doc::save(&schedule_path, &outcome.schedule) {
                error!("failed to save schedule: {e}");
                return EXIT_CONFIG_ERROR;
            }
            let ics_path = out_dir.join("schedule.ics");
            if let Err(e) = std::fs::write(&ics_path, ics::export_ics(&outcome.schedule)) {
                error!("failed to write ICS export: {e}");
            }
            let trace_path = out_dir.join("candidate_trace.json");
            if let Ok(json) = serde_json::to_string_pretty(&outcome.candidate_trace) {
                std::fs::write(&trace_path, json).ok();
            }
            EXIT_OK
        }
        Err(SchedulerError::InfeasibleError { reason }) => {
            error!("scenario '{scenario}' is infeasible: {reason}");
            let model_dump_path = out_dir.join("infeasible_model.txt");
            std::fs::write(&model_dump_path, &reason).ok();
            EXIT_INFEASIBLE
        }
        Err(e) => {
            error!("scenario '{scenario}' failed: {e}");
            EXIT_CONFIG_ERROR
        }
    }
}
