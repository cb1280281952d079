use anyhow::Result;
use colored::*;
use reactor_core::session::ExecutionRequest;
use reactor_core::Reactor;

pub fn execute(reactor: &Reactor, request: &ExecutionRequest, json: bool) -> Result<()> {
    let plan = reactor
        .plan(request)
        .map_err(|e| anyhow::anyhow!("Failed to get execution plan: {}", e))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Execution plan for".bold(),
        plan.goals.join(" ").cyan()
    );
    if !plan.requires_project {
        println!("  {}", "(no goal requires a module)".dimmed());
    }

    for (i, planned) in plan.segments.iter().enumerate() {
        println!("\n{} {}", format!("Segment {}:", i + 1).bold(), planned.segment);
        println!("  {} {}", "modules:".dimmed(), planned.modules.join(", "));
        for execution in &planned.executions {
            match &execution.phase {
                Some(phase) => println!("    {} {}", execution.mojo.id(), format!("({})", phase).dimmed()),
                None => println!("    {}", execution.mojo.id()),
            }
        }
    }

    Ok(())
}
