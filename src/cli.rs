//! Command-line interface for harmony
//!
//! This module defines the CLI structure using clap derive macros.

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::api::ApiClient;
use crate::config::{Config, CONFIG_FILE};
use crate::error::{Error, Result};
use crate::model::{validate_record, Difficulty};
use crate::output::{emit_success, task_detail, task_line, OutputOptions};
use crate::repository::{HarmonyTaskRepository, JsonTaskRepository, TaskFilter};
use crate::store::FsBlobStore;

/// harmony - browse and maintain harmony exercise tasks
#[derive(Parser, Debug)]
#[command(name = "harmony")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the task storage blob (defaults to current directory)
    #[arg(long, global = true, env = "HARMONY_STORE")]
    pub store: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add or update a task from a JSON record
    Add {
        /// Path to the task JSON file, or "-" for stdin
        file: String,
    },

    /// Show a single task
    Show {
        /// Task id
        id: String,
    },

    /// List tasks, optionally filtered
    List {
        /// Keep only tasks with this difficulty: easy, normal, hard
        #[arg(long)]
        difficulty: Option<String>,

        /// Keep only tasks carrying every given tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Remove a task
    Remove {
        /// Task id
        id: String,
    },

    /// Fetch tasks from the remote service
    Fetch {
        /// Fetch a single task instead of the whole list
        id: Option<String>,
    },
}

impl Cli {
    /// Name of the selected subcommand, for output envelopes.
    pub fn command_name(&self) -> &'static str {
        match self.command {
            Commands::Add { .. } => "add",
            Commands::Show { .. } => "show",
            Commands::List { .. } => "list",
            Commands::Remove { .. } => "remove",
            Commands::Fetch { .. } => "fetch",
        }
    }

    pub fn run(&self) -> Result<()> {
        let options = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };

        let config_path = self
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        let config = Config::load(&config_path)?;

        match &self.command {
            Commands::Add { file } => {
                let raw = read_input(file)?;
                let record: serde_json::Value = serde_json::from_str(&raw)
                    .map_err(|err| Error::InvalidArgument(format!("input is not valid JSON: {err}")))?;
                let task = validate_record(&record)?;

                let repo = self.open_repository(&config)?;
                repo.save_task(&task)?;

                emit_success(options, "add", &task, &[format!("Saved task {}", task.id)])
            }

            Commands::Show { id } => {
                let repo = self.open_repository(&config)?;
                let task = repo.load_task(id)?;
                emit_success(options, "show", &task, &task_detail(&task))
            }

            Commands::List { difficulty, tags } => {
                let filter = TaskFilter {
                    difficulty: difficulty
                        .as_deref()
                        .map(|d| d.parse::<Difficulty>())
                        .transpose()?,
                    tags: if tags.is_empty() {
                        None
                    } else {
                        Some(tags.clone())
                    },
                };

                let repo = self.open_repository(&config)?;
                let tasks = repo.list_tasks(&filter)?;

                let mut lines = vec![format!("{} task(s)", tasks.len())];
                lines.extend(tasks.iter().map(task_line));
                emit_success(options, "list", &tasks, &lines)
            }

            Commands::Remove { id } => {
                let repo = self.open_repository(&config)?;
                repo.delete_task(id)?;
                emit_success(
                    options,
                    "remove",
                    &serde_json::json!({ "id": id }),
                    &[format!("Removed task {id}")],
                )
            }

            Commands::Fetch { id } => {
                let client = ApiClient::new(config.api.base_url.clone());
                match id {
                    Some(id) => {
                        let task = client.get_task(id)?;
                        emit_success(options, "fetch", &task, &task_detail(&task))
                    }
                    None => {
                        let tasks = client.get_tasks()?;
                        let mut lines = vec![format!("{} task(s)", tasks.len())];
                        lines.extend(tasks.iter().map(task_line));
                        emit_success(options, "fetch", &tasks, &lines)
                    }
                }
            }
        }
    }

    fn open_repository(&self, config: &Config) -> Result<JsonTaskRepository<FsBlobStore>> {
        let root = self.store.clone().unwrap_or_else(|| PathBuf::from("."));
        JsonTaskRepository::new(FsBlobStore::new(root), config.storage_path.clone())
    }
}

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        return Ok(raw);
    }

    std::fs::read_to_string(file)
        .map_err(|err| Error::InvalidArgument(format!("cannot read {file}: {err}")))
}
