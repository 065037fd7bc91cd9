use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::client::ApiClient;
use crate::donor_search::{DonorSearch, SearchState, SearchTransport};
use crate::error::{AppError, Result};
use crate::fmt::dollars;
use crate::search::LocalSearch;
use crate::settings::load_settings;

pub fn run(candidate: &str, query: &str, remote: bool) -> Result<()> {
    let settings = load_settings();
    let transport: Box<dyn SearchTransport> = if remote {
        Box::new(ApiClient::new(&settings.api_base_url))
    } else {
        Box::new(LocalSearch::new(settings.db_path()))
    };

    let mut search = DonorSearch::new(candidate);
    let ticket = search.submit_query(query);
    search.run(ticket, transport.as_ref());
    print_state(&search)
}

fn print_state(search: &DonorSearch) -> Result<()> {
    match search.state() {
        SearchState::Found(records) => {
            let mut table = Table::new();
            table.set_header(vec!["Name", "Amount", "Employer", "City", "Date", "Group"]);
            for r in records {
                table.add_row(vec![
                    Cell::new(&r.contributor_name),
                    Cell::new(dollars(r.contribution_amount)).set_alignment(CellAlignment::Right),
                    Cell::new(r.employer.as_deref().unwrap_or("")),
                    Cell::new(r.donor_city.as_deref().unwrap_or("")),
                    Cell::new(r.contribution_date.as_deref().unwrap_or("")),
                    Cell::new(r.contributor_group.as_deref().unwrap_or("")),
                ]);
            }
            println!("{}\n{table}", search.input().bold());
        }
        SearchState::Suggestions(names) => {
            println!("{}", "Did you mean:".yellow());
            for name in names {
                println!("  {name}");
            }
        }
        SearchState::NotFound(msg) => println!("{msg}"),
        SearchState::Error(msg) => return Err(AppError::Other(msg.clone())),
        SearchState::Idle | SearchState::Searching(_) => {}
    }
    Ok(())
}
