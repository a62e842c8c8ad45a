//! Student commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use rust_i18n::t;

use crate::config::build_client;
use crate::handlers::student::{self as handlers, SearchOptions};
use crate::output::{print_structured, print_table, OutputFormat};

#[derive(Subcommand)]
pub enum StudentAction {
    /// Search students
    #[command(alias = "s")]
    Search {
        /// Matches name, university, course or bio
        query: Option<String>,
        /// Location: all, india or abroad
        #[arg(short = 'L', long)]
        location: Option<String>,
        /// Exact country
        #[arg(short, long)]
        country: Option<String>,
        /// Exact course
        #[arg(long)]
        course: Option<String>,
        /// Page number (all matches when omitted)
        #[arg(short, long)]
        page: Option<u32>,
        /// Show available country and course filters
        #[arg(long)]
        facets: bool,
    },

    /// View student profiles by ID
    Get {
        /// User IDs
        #[arg(required = true)]
        user_ids: Vec<String>,
        /// Concurrent requests
        #[arg(long, default_value = "4")]
        concurrency: usize,
    },
}

pub async fn handle(action: StudentAction, format: OutputFormat, _verbose: bool) -> Result<()> {
    match action {
        StudentAction::Search {
            query,
            location,
            country,
            course,
            page,
            facets,
        } => {
            let options = SearchOptions {
                location,
                country,
                course,
                search: query,
                page,
            };
            search(options, facets, format).await
        }
        StudentAction::Get {
            user_ids,
            concurrency,
        } => get(&user_ids, concurrency, format).await,
    }
}

async fn search(options: SearchOptions, show_facets: bool, format: OutputFormat) -> Result<()> {
    let client = build_client()?;
    let result = handlers::search_students(&client, options).await?;

    if matches!(format, OutputFormat::Json | OutputFormat::Toon) {
        print_structured(&result, format);
        return Ok(());
    }

    if format.is_human() {
        println!("{}\n", t!("students_found", count = result.students.len()));
    }
    print_table(result.students, format);

    if show_facets {
        println!();
        println!("{} {}", t!("countries_label").bold(), result.countries.join(", "));
        println!("{} {}", t!("courses_label").bold(), result.courses.join(", "));
    }
    Ok(())
}

async fn get(user_ids: &[String], concurrency: usize, format: OutputFormat) -> Result<()> {
    let client = build_client()?;
    let students = handlers::get_students(&client, user_ids, concurrency).await?;
    print_table(students, format);
    Ok(())
}
