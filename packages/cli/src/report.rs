// ABOUTME: Plain-text rendering of tracker states and finished research reports
// ABOUTME: Status lines, source lists, cost breakdowns, and saving the PDF report

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use scout_research::{ResearchTask, Source, TrackerState, Usage};

pub fn status_line(state: &TrackerState) -> String {
    match state {
        TrackerState::Pending => "Task submitted, waiting for first status...".to_string(),
        TrackerState::Active(task) | TrackerState::Finished(task) => task_status_line(task),
        TrackerState::Cancelled { .. } => "Research cancelled".to_string(),
        TrackerState::AuthRequired => "Sign in required. Run `scout login` and try again.".to_string(),
    }
}

pub fn task_status_line(task: &ResearchTask) -> String {
    match task.progress {
        Some(progress) if !task.is_terminal() => format!(
            "{} (step {}/{})",
            task.status.describe(),
            progress.current_step,
            progress.total_steps
        ),
        _ => task.status.describe().to_string(),
    }
}

pub fn source_lines(sources: &[Source]) -> Vec<String> {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            if source.title.trim().is_empty() {
                format!("{}. {}", i + 1, source.url)
            } else {
                format!("{}. {} - {}", i + 1, source.title, source.url)
            }
        })
        .collect()
}

pub fn usage_lines(usage: &Usage) -> Vec<String> {
    vec![
        format!("Search:  ${:.4}", usage.search_cost),
        format!("AI:      ${:.4}", usage.ai_cost),
        format!("Compute: ${:.4}", usage.compute_cost),
        format!("Total:   ${:.4}", usage.total_cost),
    ]
}

/// Save the report PDF under `dir`, creating it if needed
pub fn write_pdf(dir: &Path, task: &ResearchTask, bytes: &[u8]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(task.pdf_file_name());
    fs::write(&path, bytes)?;
    Ok(path)
}
