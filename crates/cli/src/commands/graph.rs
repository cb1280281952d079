use anyhow::Result;
use colored::*;
use reactor_core::Reactor;

pub fn execute(reactor: &Reactor) -> Result<()> {
    println!("{}", "Module Dependency Graph:".bold().underline());

    let graph = reactor.graph();
    for module in graph.sorted_modules() {
        println!("{}", module.name.blue().bold());

        let deps = graph.upstream(&module.name);
        if !deps.is_empty() {
            println!("  {} {}", "depends on:".dimmed(), deps.join(", "));
        } else {
            println!("  {}", "no dependencies".dimmed());
        }
        println!();
    }

    Ok(())
}
