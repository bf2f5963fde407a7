use crate::output::{print_json, print_table};
use clap::Subcommand;
use grow_core::leads::{self, LeadKind};
use std::path::Path;

#[derive(Subcommand)]
pub enum LeadsSubcommand {
    /// List submissions, oldest first
    List {
        /// contact, playbook, coach_application or digital_twin
        #[arg(long)]
        kind: Option<String>,
    },
    /// Show one submission
    Show { id: String },
    /// Delete a submission
    Delete { id: String },
}

pub fn run(root: &Path, subcmd: LeadsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        LeadsSubcommand::List { kind } => list(root, kind.as_deref(), json),
        LeadsSubcommand::Show { id } => show(root, &id, json),
        LeadsSubcommand::Delete { id } => delete(root, &id, json),
    }
}

fn list(root: &Path, kind: Option<&str>, json: bool) -> anyhow::Result<()> {
    let kind: Option<LeadKind> = kind.map(str::parse).transpose()?;
    let leads = leads::list(root, kind)?;

    if json {
        return print_json(&leads);
    }
    if leads.is_empty() {
        println!("No leads.");
        return Ok(());
    }
    let rows = leads
        .iter()
        .map(|l| {
            vec![
                l.id.clone(),
                l.kind().to_string(),
                l.form.name().to_string(),
                l.form.email().to_string(),
                l.created_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "KIND", "NAME", "EMAIL", "CREATED"], rows);
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let lead = leads::get(root, id)?;
    if json {
        return print_json(&lead);
    }
    println!("{} ({})  {}", lead.id, lead.kind(), lead.created_at.format("%Y-%m-%d %H:%M UTC"));
    print!("{}", serde_yaml::to_string(&lead.form)?);
    Ok(())
}

fn delete(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    if !leads::delete(root, id)? {
        anyhow::bail!("lead '{id}' not found");
    }
    if json {
        print_json(&serde_json::json!({ "deleted": id }))?;
    } else {
        println!("Deleted {id}");
    }
    Ok(())
}
