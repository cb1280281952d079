use anyhow::Result;
use colored::*;
use reactor_core::colors::get_module_color;
use reactor_core::results::BuildSummary;
use reactor_core::session::ExecutionRequest;
use reactor_core::Reactor;

/// Build the reactor and print the per-module summary. Returns whether the build succeeded.
pub async fn execute(reactor: &Reactor, request: ExecutionRequest) -> Result<bool> {
    let goals = if request.goals.is_empty() {
        "(default goal)".to_string()
    } else {
        request.goals.join(" ")
    };
    println!(
        "{} {} {}",
        "Building".bold(),
        reactor.config().name.cyan(),
        goals.dimmed()
    );

    let result = reactor
        .build(request)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run build: {}", e))?;

    println!();
    println!("{}", "Reactor Summary:".bold().underline());
    for outcome in &result.outcomes {
        let name = outcome.module.color(get_module_color(&outcome.module));
        match &outcome.summary {
            BuildSummary::Success { duration } => println!(
                "  {} {} {}",
                "✓".green().bold(),
                name,
                format!("[{:.2?}]", duration).dimmed()
            ),
            BuildSummary::Failure { duration, error } => println!(
                "  {} {} {} {}",
                "✗".red().bold(),
                name,
                format!("[{:.2?}]", duration).dimmed(),
                error.to_string().red()
            ),
            BuildSummary::Skipped { reason } => {
                println!("  {} {} {}", "-".yellow(), name, reason.dimmed())
            }
        }
    }

    println!();
    if result.is_success() {
        println!("{} {}", "✓".green().bold(), "BUILD SUCCESS".green().bold());
    } else {
        println!("{} {}", "✗".red().bold(), "BUILD FAILURE".red().bold());
        if result.halted {
            println!("  {}", "Build halted after the first failure".dimmed());
        }
    }

    Ok(result.is_success())
}
