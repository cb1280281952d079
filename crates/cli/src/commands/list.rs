use anyhow::Result;
use colored::*;
use reactor_core::colors::get_module_color;
use reactor_core::Reactor;

pub fn execute(reactor: &Reactor) -> Result<()> {
    println!("{}", "Modules".bold().underline());

    for module in reactor.modules() {
        let name = module.name.color(get_module_color(&module.name)).bold();
        if module.is_root {
            println!("{} {}", name, "[root]".green());
        } else {
            println!("{} {}", name, module.dir.display().to_string().dimmed());
        }
    }

    Ok(())
}
