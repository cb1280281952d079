use anyhow::Result;
use reactor_core::configs::reactor::ReactorConfig;

pub fn execute() -> Result<()> {
    let schema = schemars::schema_for!(ReactorConfig);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
