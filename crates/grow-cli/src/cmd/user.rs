use crate::output::{print_json, print_table};
use clap::Subcommand;
use grow_core::accounts::{self, Role, UserSummary};
use std::path::Path;

#[derive(Subcommand)]
pub enum UserSubcommand {
    /// Create an account (the only way to make coaches and admins)
    Add {
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
        /// member, coach or admin
        #[arg(long, default_value = "member")]
        role: String,
    },
    /// List accounts
    List,
}

pub fn run(root: &Path, subcmd: UserSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        UserSubcommand::Add {
            email,
            name,
            password,
            role,
        } => {
            let role: Role = role.parse()?;
            let user = accounts::register(root, &email, &name, &password, role)?;
            if json {
                return print_json(&UserSummary::from(&user));
            }
            println!("Created {} ({}) as {}", user.email, user.id, user.role);
            Ok(())
        }
        UserSubcommand::List => {
            let users = accounts::list_users(root)?;
            let summaries: Vec<UserSummary> = users.iter().map(UserSummary::from).collect();
            if json {
                return print_json(&summaries);
            }
            let rows = summaries
                .iter()
                .map(|u| vec![u.email.clone(), u.name.clone(), u.role.to_string()])
                .collect();
            print_table(&["EMAIL", "NAME", "ROLE"], rows);
            Ok(())
        }
    }
}
