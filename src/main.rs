//! Console front end for the planner.
//!
//! With no instruction arguments, each non-empty stdin line is planned in turn.

use std::io::BufRead;

use anyhow::{Context, Result};
use clap::Parser;

use robot_planner::inference::config::resolve_planner_config;
use robot_planner::planner::{scene_context, PlanResult, Planner};

#[derive(Debug, Parser)]
#[command(
    name = "robot-planner",
    about = "Turn natural-language instructions into robot commands"
)]
struct Cli {
    /// Print the full two-stage trace instead of the bare commands.
    #[arg(short, long)]
    verbose: bool,

    /// Scene context passed to the grounding stage, verbatim.
    #[arg(long, conflicts_with = "objects")]
    context: Option<String>,

    /// Comma-separated objects in the scene, rendered as `objects = [...]`.
    #[arg(long, value_name = "A,B,...")]
    objects: Option<String>,

    /// Instruction to plan. Reads stdin lines when omitted.
    #[arg(value_name = "INSTRUCTION")]
    instruction: Vec<String>,
}

impl Cli {
    fn context(&self) -> String {
        if let Some(list) = &self.objects {
            let objects: Vec<&str> = list
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .collect();
            return scene_context(&objects);
        }
        self.context.clone().unwrap_or_default()
    }

    fn instruction(&self) -> Option<String> {
        if self.instruction.is_empty() {
            None
        } else {
            Some(self.instruction.join(" "))
        }
    }
}

fn print_result(result: &PlanResult) {
    if let Some(trace) = &result.trace {
        println!("{trace}");
        println!(
            "(stage 1: {:.2}s via {:?})",
            result.stage1_response.elapsed_seconds, result.stage1_response.path
        );
        return;
    }
    let (stage1, stage2) = result.texts();
    if stage1.is_empty() {
        println!("(no actionable command)");
    } else {
        println!("{stage1}");
    }
    if let Some(stage2) = stage2 {
        println!("{stage2}");
    }
}

async fn plan_one(planner: &Planner, instruction: &str, context: &str, verbose: bool) -> Result<()> {
    let result = planner
        .run_plan(instruction, context, verbose)
        .await
        .with_context(|| format!("planning failed for: {instruction}"))?;
    print_result(&result);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = robot_planner::init_tracing() {
        eprintln!("warning: logging disabled: {e}");
    }

    let cwd = std::env::current_dir().context("cannot read working directory")?;
    let config = resolve_planner_config(&cwd)?;
    let planner = robot_planner::build_planner(&config)?;
    let context = cli.context();

    if let Some(instruction) = cli.instruction() {
        return plan_one(&planner, &instruction, &context, cli.verbose).await;
    }

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        let instruction = line.trim();
        if instruction.is_empty() {
            continue;
        }
        if let Err(e) = plan_one(&planner, instruction, &context, cli.verbose).await {
            tracing::error!(error = %e, "instruction failed");
            eprintln!("error: {e:#}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_joins_instruction_words() {
        let cli = Cli::try_parse_from(["robot-planner", "-v", "pick", "up", "the", "cup"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.instruction().as_deref(), Some("pick up the cup"));
        assert_eq!(cli.context(), "");
    }

    #[test]
    fn test_cli_without_instruction_reads_stdin() {
        let cli = Cli::try_parse_from(["robot-planner"]).unwrap();
        assert!(!cli.verbose);
        assert!(cli.instruction().is_none());
    }

    #[test]
    fn test_cli_objects_render_scene_context() {
        let cli =
            Cli::try_parse_from(["robot-planner", "--objects", "red block, green cup,", "go"])
                .unwrap();
        assert_eq!(cli.context(), scene_context(&["red block", "green cup"]));
    }

    #[test]
    fn test_cli_context_passes_through() {
        let cli = Cli::try_parse_from([
            "robot-planner",
            "--context",
            "objects = [\"mug\"]",
            "--verbose",
            "grab it",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.context(), "objects = [\"mug\"]");
    }

    #[test]
    fn test_cli_context_conflicts_with_objects() {
        let err = Cli::try_parse_from([
            "robot-planner",
            "--context",
            "x",
            "--objects",
            "a,b",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_cli_rejects_unknown_flag() {
        let err = Cli::try_parse_from(["robot-planner", "--bogus"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
