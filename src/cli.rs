//! Terminal front end: line commands in, rendered view state out.

use std::fmt::Write as _;

use crate::models::{CatalogEntry, Credentials, MediaType, ViewState};

/// One line of user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    More,
    SignIn { email: String, password: String },
    Register { name: String, email: String, password: String },
    SignOut,
    WhoAmI,
    Help,
    Quit,
}

impl Command {
    pub fn credentials(&self) -> Option<Credentials> {
        match self {
            Command::SignIn { email, password } => Some(Credentials::sign_in(email, password)),
            Command::Register {
                name,
                email,
                password,
            } => Some(Credentials::register(name, email, password)),
            _ => None,
        }
    }
}

pub const HELP: &str = "\
Type a title to search. Commands:
  :more                              load the next page of results (or press enter)
  :signin <email> <password>         sign in
  :register <name> <email> <password> create an account
  :signout                           forget the signed-in user
  :whoami                            show the signed-in user
  :quit                              exit";

/// Parses a line. Anything that is not a command is a search.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::More);
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Ok(Command::Search(line.to_string()));
    };

    let mut words: Vec<&str> = rest.split_whitespace().collect();
    let name = if words.is_empty() {
        String::new()
    } else {
        words.remove(0).to_lowercase()
    };
    match (name.as_str(), words.as_slice()) {
        ("more", []) => Ok(Command::More),
        ("signin", [email, password]) => Ok(Command::SignIn {
            email: email.to_string(),
            password: password.to_string(),
        }),
        ("register", [names @ .., email, password]) if !names.is_empty() => Ok(Command::Register {
            name: names.join(" "),
            email: email.to_string(),
            password: password.to_string(),
        }),
        ("signout", []) => Ok(Command::SignOut),
        ("whoami", []) => Ok(Command::WhoAmI),
        ("help", []) => Ok(Command::Help),
        ("quit" | "q" | "exit", []) => Ok(Command::Quit),
        _ => Err(format!("Unrecognised command ':{}'. Type :help for usage.", rest.trim())),
    }
}

fn media_label(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Movie => "movie",
        MediaType::Show => "tv",
        MediaType::Person => "person",
        MediaType::Unknown => "other",
    }
}

/// One numbered result line
pub fn render_entry(position: usize, entry: &CatalogEntry) -> String {
    let mut line = format!("{:>3}. {}", position, entry.title);
    if let Some(year) = entry.release_date.as_deref().and_then(|d| d.get(..4)) {
        let _ = write!(line, " ({})", year);
    }
    let _ = write!(line, " [{}]", media_label(entry.media_type));
    if let Some(rating) = entry.vote_average.filter(|r| *r > 0.0) {
        let _ = write!(line, " ★ {:.1}", rating);
    }
    line
}

/// Renders visible catalog results starting after the first `skip` of them
pub fn render_results_from(view: &ViewState, skip: usize) -> String {
    let mut out = String::new();
    for (i, entry) in view.visible_results().enumerate().skip(skip) {
        let _ = writeln!(out, "{}", render_entry(i + 1, entry));
    }
    out
}

pub fn render_footer(view: &ViewState) -> String {
    if view.is_loading_next_page {
        "  … loading more".to_string()
    } else if !view.catalog_results.has_more {
        "  -- end of results --".to_string()
    } else if view.catalog_results.merged_entries.is_empty() {
        "  -- results could not be loaded, press enter or type :more to retry --".to_string()
    } else {
        format!(
            "  -- page {} available, press enter or type :more --",
            view.catalog_results.next_page
        )
    }
}

/// Full render of a settled view
pub fn render_view(view: &ViewState) -> String {
    if view.is_loading() {
        return "Loading…\n".to_string();
    }
    if view.has_no_results() && !view.catalog_results.has_more {
        return "No Results Found\n".to_string();
    }

    let mut out = String::new();
    if !view.suggestions.is_empty() {
        let _ = writeln!(out, "{}", view.suggestions_heading());
        for (i, entry) in view.visible_suggestions().enumerate() {
            let _ = writeln!(out, "{}", render_entry(i + 1, entry));
        }
        let _ = writeln!(out);
    }
    if !view.catalog_results.merged_entries.is_empty() {
        let _ = writeln!(out, "{}", view.results_heading());
        out.push_str(&render_results_from(view, 0));
        let _ = writeln!(out, "{}", render_footer(view));
    } else if view.catalog_results.has_more {
        let _ = writeln!(out, "{}", render_footer(view));
    }
    out
}
