use sparkfleet_core::Inventory;
use std::path::Path;

pub fn handle(config: Option<&Path>, name: Option<&str>) -> anyhow::Result<()> {
    let name = match name {
        Some(name) => name.to_string(),
        None => sparkfleet_config::load(config)?.1.cluster.name,
    };

    let path = Inventory::default_path(&name);
    if !path.exists() {
        anyhow::bail!(
            "No inventory for cluster '{}' at {}; has it been deployed?",
            name,
            path.display()
        );
    }

    print!("{}", std::fs::read_to_string(&path)?);
    Ok(())
}
