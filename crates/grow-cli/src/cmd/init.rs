use anyhow::Context;
use grow_core::catalog::Catalog;
use grow_core::config::Config;
use grow_core::types::Audience;
use grow_core::{io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let site_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "grow".to_string());

    println!("Initializing grow in: {}", root.display());

    // 1. Directory tree
    let dirs = [
        paths::GROW_DIR,
        paths::BANKS_DIR,
        paths::CARTS_DIR,
        paths::PENDING_DIR,
        paths::COMMUNITY_DIR,
    ];
    for dir in dirs {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }
    for &audience in Audience::all() {
        io::ensure_dir(&paths::responses_dir(root, audience))?;
    }

    // 2. config.yaml
    if paths::config_path(root).exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
    } else {
        Config::new(&site_name)
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    }

    // 3. catalog.yaml
    if Catalog::seed(root).context("failed to seed catalog")? {
        println!("  created: {}", paths::CATALOG_FILE);
    } else {
        println!("  exists:  {}", paths::CATALOG_FILE);
    }

    println!("\nNext: grow serve   or   grow assess list");
    Ok(())
}
