use anyhow::Result;

use crate::LayoutArgs;

pub fn cmd_layout(args: &LayoutArgs) -> Result<()> {
    let layout = super::resolve(args);
    println!("{}", serde_json::to_string_pretty(&layout)?);
    Ok(())
}
