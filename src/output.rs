//! Shared output formatting for harmony CLI commands.

use serde::Serialize;

use crate::error::{JsonError, Result};
use crate::model::HarmonyTask;

pub const SCHEMA_VERSION: &str = "harmony.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Emit a successful result: a JSON envelope in `--json` mode, otherwise
/// the prepared human-readable lines.
pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    lines: &[String],
) -> Result<()> {
    if options.json {
        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    for line in lines {
        println!("{line}");
    }

    Ok(())
}

pub fn emit_error(command: &str, err: &crate::error::Error, json: bool) -> Result<()> {
    if json {
        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: JsonError,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: JsonError::from(err),
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    Ok(())
}

/// One-line listing entry for a task.
pub fn task_line(task: &HarmonyTask) -> String {
    let mut line = task.id.clone();
    if let Some(title) = &task.title {
        line.push_str("  ");
        line.push_str(title);
    }
    if let Some(difficulty) = task.difficulty {
        line.push_str(&format!("  [{difficulty}]"));
    }
    if let Some(tags) = &task.tags {
        for tag in tags {
            line.push_str(&format!("  #{tag}"));
        }
    }
    line
}

/// Multi-line detail view of a task.
pub fn task_detail(task: &HarmonyTask) -> Vec<String> {
    let mut lines = vec![format!("Task {}", task.id)];
    if let Some(title) = &task.title {
        lines.push(format!("Title: {title}"));
    }
    lines.push(format!("Description: {}", task.description));
    if let Some(difficulty) = task.difficulty {
        lines.push(format!("Difficulty: {difficulty}"));
    }
    if let Some(tags) = &task.tags {
        lines.push(format!("Tags: {}", tags.join(", ")));
    }
    lines.push(format!("Score: {}", task.score.score_type));

    let answers: Vec<&str> = task
        .answer
        .iter()
        .map(|answer| answer.answer_type.as_str())
        .collect();
    lines.push(format!("Answers: {}", answers.join(", ")));

    lines
}
