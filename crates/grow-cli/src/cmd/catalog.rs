use crate::output::{format_cents, print_json, print_table};
use clap::Subcommand;
use grow_core::catalog::Catalog;
use std::path::Path;

#[derive(Subcommand)]
pub enum CatalogSubcommand {
    /// List products with prices
    Products,
    /// List coaches
    Coaches,
}

pub fn run(root: &Path, subcmd: CatalogSubcommand, json: bool) -> anyhow::Result<()> {
    let catalog = Catalog::load(root)?;
    match subcmd {
        CatalogSubcommand::Products => {
            if json {
                return print_json(&catalog.products);
            }
            let rows = catalog
                .products
                .iter()
                .map(|p| {
                    vec![
                        p.slug.clone(),
                        p.category.clone(),
                        format_cents(p.price_cents),
                        p.name.clone(),
                    ]
                })
                .collect();
            print_table(&["SLUG", "CATEGORY", "PRICE", "NAME"], rows);
        }
        CatalogSubcommand::Coaches => {
            if json {
                return print_json(&catalog.coaches);
            }
            let rows = catalog
                .coaches
                .iter()
                .map(|c| vec![c.slug.clone(), c.name.clone(), c.specialties.join(", ")])
                .collect();
            print_table(&["SLUG", "NAME", "SPECIALTIES"], rows);
        }
    }
    Ok(())
}
