//! Command implementations.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};

use chdrunner_core::{
    batch::{BatchConfig, BatchEvent, BatchQueue, BatchSequencer, JobStatus},
    command::{add_option, build_arguments, codec_description, display_command, OptionKind},
    locate::{self, NOT_FOUND_HELP},
    runner::{ExecutableLocation, OutputLine, ProcessRunner, ToolRunner},
    Config, Direction, ToolOption,
};

/// Arguments of the `batch` command after config defaults were applied.
pub struct BatchRequest {
    pub direction: Direction,
    pub inputs: Vec<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub options: Vec<String>,
    pub config: BatchConfig,
    pub json: bool,
}

pub fn locate(config: &Config) -> Result<bool> {
    let location = locate::resolve(&config.tool.path);
    if location.is_verified() {
        println!("{}", location.path().display());
        return Ok(true);
    }
    println!("{}", NOT_FOUND_HELP);
    Ok(false)
}

pub fn list_options(direction: Direction) {
    println!("{} ({})", direction.title(), direction.subcommand());
    println!("{}", direction.description());
    println!();
    for option in direction.known_options() {
        let value = match &option.kind {
            OptionKind::Flag => String::new(),
            OptionKind::Text => "=<VALUE>".to_string(),
            OptionKind::Choice(choices) => format!("={{{}}}", choices.join("|")),
        };
        println!("  {}{:<16} {}", option.key, value, option.help);
        if let OptionKind::Choice(choices) = &option.kind {
            for choice in choices {
                if let Some(description) = codec_description(choice) {
                    println!("      {:<6} {}", choice, description);
                }
            }
        }
    }
}

/// Turns `KEY[=VALUE]` strings into options, filling in catalog help and defaults.
pub fn parse_options(direction: Direction, specs: &[String]) -> Vec<ToolOption> {
    let mut options = Vec::new();
    for spec in specs {
        let parsed = ToolOption::parse_cli(spec);
        let option = match direction.known_option(&parsed.key) {
            Some(known) => ToolOption {
                value: parsed.value.or(known.value.clone()),
                ..known
            },
            None => parsed,
        };
        if !add_option(&mut options, option) {
            warn!(option = %spec, "Ignoring repeated option");
        }
    }
    options
}

fn resolve_executable(config: &Config) -> ExecutableLocation {
    let location = locate::resolve(&config.tool.path);
    if !location.is_verified() {
        warn!(path = %location.path().display(), "chdman could not be verified");
    }
    location
}

pub async fn convert(
    config: &Config,
    direction: Direction,
    input: &Path,
    output: &Path,
    options: &[String],
) -> Result<bool> {
    let executable = resolve_executable(config);
    let options = parse_options(direction, options);
    let args = build_arguments(direction, input, output, &options);
    info!(command = %display_command(executable.path(), &args), "Converting");

    let runner = ProcessRunner::new(config.runner_config());
    let mut stderr = std::io::stderr();
    let mut print_line = |line: OutputLine| match line.progress {
        Some(fraction) => {
            let _ = write!(stderr, "\r{:>3.0}%", fraction * 100.0);
            let _ = stderr.flush();
        }
        None if !line.text.trim().is_empty() => {
            let _ = writeln!(stderr, "\r{}", line.text);
        }
        None => {}
    };

    match runner.run(&executable, &args, &mut print_line).await {
        Ok(()) => {
            eprintln!();
            println!("{}", output.display());
            Ok(true)
        }
        Err(e) => {
            eprintln!();
            eprintln!("{}", e);
            if let Some(hint) = e.hint() {
                eprintln!("{}", hint);
            }
            Ok(false)
        }
    }
}

pub async fn batch(config: &Config, request: BatchRequest) -> Result<bool> {
    let executable = resolve_executable(config);
    let options = parse_options(request.direction, &request.options);

    let mut queue = BatchQueue::new(request.direction);
    queue.set_output_directory(request.output_dir);
    let added = queue.add_inputs(request.inputs);
    info!(jobs = added, direction = %request.direction, "Queued batch");

    let (tx, mut rx) = mpsc::unbounded_channel::<BatchEvent>();
    let json = request.json;
    let total = queue.len();
    let printer = tokio::spawn(async move {
        let mut finished = 0;
        while let Some(event) = rx.recv().await {
            if json {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!(error = %e, "Failed to encode event"),
                }
                continue;
            }
            if let BatchEvent::JobUpdated(job) = &event {
                if job.status.is_terminal() {
                    finished += 1;
                }
                println!(
                    "[{}/{}] {:<10} {}",
                    finished,
                    total,
                    job.status,
                    job.input_path.display()
                );
                if job.status == JobStatus::Failed {
                    if let Some(message) = &job.error_message {
                        for line in message.lines() {
                            println!("    {}", line);
                        }
                    }
                }
            }
        }
    });

    let sequencer = BatchSequencer::new(ProcessRunner::new(config.runner_config()));
    let result = sequencer
        .run_batch(
            &executable,
            queue.jobs_mut(),
            request.direction,
            &options,
            &request.config,
            &tx,
        )
        .await;
    drop(tx);
    printer.await.context("Event printer task failed")?;

    let summary = result.context("Batch could not start")?;
    if request.json {
        println!("{}", serde_json::json!({ "event": "summary", "summary": summary }));
    } else {
        println!();
        println!("{}", summary);
    }

    Ok(summary.failed == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_uses_catalog_defaults() {
        let options = parse_options(
            Direction::CueToChd,
            &["-c".to_string(), "-hs=4096".to_string(), "-x=1".to_string()],
        );
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].value.as_deref(), Some("cd"));
        assert!(matches!(options[0].kind, OptionKind::Choice(_)));
        assert!(options[0].enabled);
        assert_eq!(options[1].value.as_deref(), Some("4096"));
        assert_eq!(options[1].help, "Hunk size in bytes (e.g., 2048, 4096)");
        assert_eq!(options[2].key, "-x");
    }

    #[test]
    fn test_parse_options_drops_repeats() {
        let options = parse_options(
            Direction::ChdToIso,
            &["-f".to_string(), "-f".to_string()],
        );
        assert_eq!(options.len(), 1);
        assert!(options[0].kind.is_flag());
    }

    #[test]
    fn test_parse_options_feed_argument_builder() {
        let options = parse_options(Direction::CueToChd, &["-c=cdfl".to_string()]);
        let args = build_arguments(
            Direction::CueToChd,
            Path::new("in.cue"),
            Path::new("out.chd"),
            &options,
        );
        assert_eq!(&args[5..], &["-c".to_string(), "cdfl".to_string()]);
    }
}
