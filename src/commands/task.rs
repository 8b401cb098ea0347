//! Local task management.
//!
//! Just enough CRUD to seed the generic task and register project tags; the
//! full management surface lives in the API service.

use anyhow::{Context, Result};
use horas_core::tag::normalize_tag;
use horas_core::{Task, TaskStore};
use owo_colors::OwoColorize;

use crate::app::App;

pub fn list(app: &App) -> Result<()> {
    let tasks = app.tasks.all()?;
    if tasks.is_empty() {
        eprintln!(
            "No tasks yet. Create the fallback first: horas task add \"General\" --tag {}",
            app.config.sync.generic_tag
        );
        return Ok(());
    }

    for task in tasks {
        let marker = if task.active { " " } else { "-" };
        println!(
            "{marker} {:>4}  {:<24}  {} (project {})",
            task.id,
            task.tag.cyan(),
            task.name,
            task.project_id
        );
    }
    Ok(())
}

pub fn add(
    app: &App,
    name: &str,
    tag: &str,
    project: i64,
    description: Option<String>,
) -> Result<()> {
    let tag = normalize_tag(tag).context("tag must not be empty")?;

    let task = app.tasks.insert(Task {
        id: 0,
        name: name.to_string(),
        description,
        project_id: project,
        tag,
        starts_on: None,
        ends_on: None,
        active: true,
    })?;

    eprintln!("Created task {} with tag {}", task.id, task.tag.green());
    Ok(())
}
