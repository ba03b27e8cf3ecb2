//! Contact management commands for CLI.

use birthdays_core::{
    AnniversaryCollection, Clock, Config, ContactBook, ContactSource, SystemClock,
};
use clap::Subcommand;

use super::{reapply, CliResult};

#[derive(Subcommand)]
pub enum ContactsAction {
    /// List contacts by days until their next birthday
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a contact, replacing one with the same name
    Add {
        /// Contact name
        name: String,
        /// Birthday as YYYY-MM-DD, or --MM-DD when the year is unknown
        #[arg(allow_hyphen_values = true)]
        birthday: String,
    },
    /// Remove a contact
    Remove {
        /// Contact name
        name: String,
    },
}

pub fn run(action: ContactsAction) -> CliResult {
    let config = Config::load()?;
    let book = ContactBook::new(config.contacts_path()?);

    match action {
        ContactsAction::List { json } => {
            let records = if book.path().exists() {
                book.query()?
            } else {
                Vec::new()
            };
            let collection = AnniversaryCollection::build(
                &records,
                SystemClock.today(),
                &config.alerts.resolver(),
            );

            if json {
                println!("{}", serde_json::to_string_pretty(collection.as_slice())?);
            } else if collection.is_empty() {
                println!("no contacts");
            } else {
                let today: Vec<&str> = collection.todays().map(|a| a.name.as_str()).collect();
                if !today.is_empty() {
                    println!("Birthday today: {}", today.join(", "));
                }
                for a in &collection {
                    let age = a
                        .next_age
                        .map(|age| format!(" (turns {age})"))
                        .unwrap_or_default();
                    println!("{:>3}d  {}  {}{age}", a.days_until, a.occurrence, a.name);
                }
            }
        }
        ContactsAction::Add { name, birthday } => {
            let replaced = book.add(&name, &birthday)?;
            if replaced {
                println!("Contact updated: {name}");
            } else {
                println!("Contact added: {name}");
            }
            reapply(&config)?;
        }
        ContactsAction::Remove { name } => {
            if book.remove(&name)? {
                println!("Contact removed: {name}");
                reapply(&config)?;
            } else {
                println!("Contact not found: {name}");
            }
        }
    }
    Ok(())
}
