// ABOUTME: CLI commands for competitor research tasks
// ABOUTME: Analyze with live status updates and Ctrl-C cancellation, plus one-shot status and cancel

use anyhow::{bail, Result};
use colored::*;
use std::path::Path;
use tracing::warn;

use scout_cli::report::{self, status_line};
use scout_cli::{AppContext, ResearchContext};
use scout_research::{
    CompetitorBrief, CredentialSource, ResearchTask, TaskHandle, TaskStatus, TrackerState,
};

/// Extra polls to wait for a PDF link that lags completion
const PDF_POLL_ATTEMPTS: usize = 3;

pub async fn analyze(
    ctx: &AppContext,
    url: &str,
    summary: &str,
    detach: bool,
    pdf_dir: Option<&Path>,
) -> Result<()> {
    let brief = CompetitorBrief::new(url, summary)?;
    let research = ctx.research()?;

    let handle = research.controller.start_brief(&brief).await?;
    println!("{} {}", "Task:".bold(), handle.task_id());

    if detach {
        handle.dispose();
        println!("Check progress with `scout status {} --watch`", handle.task_id());
        return Ok(());
    }

    follow(&research, &handle, pdf_dir).await
}

pub async fn status(
    ctx: &AppContext,
    task_id: &str,
    watch: bool,
    pdf_dir: Option<&Path>,
) -> Result<()> {
    let research = ctx.research()?;

    if watch {
        let handle = research.controller.resume(task_id).await?;
        return follow(&research, &handle, pdf_dir).await;
    }

    let credential = research.credentials.credential().await;
    let task = research.controller.poll(task_id, &credential).await?;
    println!("{}", report::task_status_line(&task));

    if task.status == TaskStatus::Completed {
        print_report(&task);
        if let Some(dir) = pdf_dir {
            save_pdf(&research, task, dir).await;
        }
    }
    Ok(())
}

pub async fn cancel(ctx: &AppContext, task_id: &str) -> Result<()> {
    let research = ctx.research()?;
    let credential = research.credentials.credential().await;

    let ack = research.controller.cancel(task_id, &credential).await?;
    if ack.already_terminal {
        println!(
            "{} Task {} had already finished",
            "✓".green().bold(),
            ack.task_id
        );
    } else {
        println!("{} Task {} cancelled", "✓".green().bold(), ack.task_id);
    }
    Ok(())
}

/// Print every state change until the task finishes; Ctrl-C cancels it
async fn follow(research: &ResearchContext, handle: &TaskHandle, pdf_dir: Option<&Path>) -> Result<()> {
    let mut rx = handle.subscribe();
    let mut last_line = String::new();

    let final_state = loop {
        let state = rx.borrow_and_update().clone();
        let line = status_line(&state);
        if line != last_line {
            println!("{} {}", "→".cyan(), line);
            last_line = line;
        }
        if state.is_terminal() {
            break state;
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    bail!("Status updates stopped unexpectedly");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("{}", "Cancelling research...".yellow());
                match handle.cancel().await {
                    Ok(_) => println!("{} Research cancelled", "✓".green().bold()),
                    Err(e) => warn!("Provider cancel failed: {}", e),
                }
                return Ok(());
            }
        }
    };

    match final_state {
        TrackerState::Finished(task) if task.status == TaskStatus::Completed => {
            print_report(&task);
            if let Some(dir) = pdf_dir {
                save_pdf(research, task, dir).await;
            }
            Ok(())
        }
        TrackerState::Finished(task) => bail!("{}", task.status.describe()),
        TrackerState::AuthRequired => bail!("Sign in required. Run `scout login` and try again."),
        _ => Ok(()),
    }
}

fn print_report(task: &ResearchTask) {
    println!();
    match task.output.as_deref() {
        Some(output) if !output.trim().is_empty() => println!("{}", output),
        _ => println!("{}", "No report output was returned.".dimmed()),
    }

    if !task.sources.is_empty() {
        println!();
        println!("{}", "Sources".bold());
        for line in report::source_lines(&task.sources) {
            println!("  {}", line);
        }
    }

    if let Some(usage) = &task.usage {
        println!();
        println!("{}", "Cost".bold());
        for line in report::usage_lines(usage) {
            println!("  {}", line);
        }
    }
}

async fn save_pdf(research: &ResearchContext, mut task: ResearchTask, dir: &Path) {
    let credential = research.credentials.credential().await;
    let interval = research.controller.poll_interval();

    for _ in 0..PDF_POLL_ATTEMPTS {
        if task.pdf_url.is_some() {
            break;
        }
        tokio::time::sleep(interval).await;
        match research.controller.poll(&task.task_id, &credential).await {
            Ok(latest) => task = latest,
            Err(e) => warn!("Failed to refresh task for PDF link: {}", e),
        }
    }

    let Some(pdf_url) = task.pdf_url.clone() else {
        println!("{} PDF report is not available yet", "⚠".yellow());
        return;
    };

    let result = match research.provider.fetch_pdf(&pdf_url).await {
        Ok(bytes) => report::write_pdf(dir, &task, &bytes).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    match result {
        Ok(path) => println!("{} PDF saved to {}", "✓".green().bold(), path.display()),
        Err(e) => println!("{} Failed to save PDF: {}", "⚠".yellow(), e),
    }
}
