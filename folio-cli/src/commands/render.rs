//! Terminal rendering of controller state.

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use folio_core::{ErrorCategory, LoadState, ProfileSnapshot, Repository, Settings};
use folio_runtime::ControllerState;

#[derive(Tabled)]
struct RepositoryRow {
    #[tabled(rename = "repository")]
    name: String,
    #[tabled(rename = "language")]
    language: String,
    #[tabled(rename = "stars")]
    stars: u64,
    #[tabled(rename = "forks")]
    forks: u64,
    #[tabled(rename = "description")]
    description: String,
}

pub fn print_state(state: &ControllerState) {
    match &state.state {
        LoadState::Idle => {}
        LoadState::Loading => match &state.settings {
            Some(settings) => println!("{} {}", "loading".dimmed(), settings.identity),
            None => println!("{}", "loading".dimmed()),
        },
        LoadState::Loaded {
            profile,
            repositories,
        } => {
            print_profile(profile);
            if let Some(settings) = &state.settings {
                print_repositories(settings, repositories);
            }
        }
        LoadState::Failed { error } => print_error(error),
    }
}

fn print_profile(profile: &ProfileSnapshot) {
    println!("{}", profile.name.bold());
    for line in [&profile.bio, &profile.location, &profile.company] {
        if !line.is_empty() {
            println!("  {line}");
        }
    }
    if !profile.avatar.is_empty() {
        println!("  {}", profile.avatar.dimmed());
    }
}

fn print_repositories(settings: &Settings, repositories: &[Repository]) {
    if !settings.projects.display {
        return;
    }
    println!();
    println!("{}", settings.projects.header.to_uppercase().bold());
    if repositories.is_empty() {
        println!("  (no repositories)");
        return;
    }
    let rows: Vec<RepositoryRow> = repositories
        .iter()
        .map(|repo| RepositoryRow {
            name: repo.name.clone(),
            language: repo.language.clone().unwrap_or_default(),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            description: repo.description.clone().unwrap_or_default(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

pub fn print_error(error: &ErrorCategory) {
    let view = error.view();
    println!("{} {}", view.status.to_string().red(), view.title.red().bold());
    println!("{}", view.subtitle);
}
