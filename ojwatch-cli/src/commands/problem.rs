//! Problem command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use ojwatch_core::domain::problem::Problem;
use ojwatch_core::dto::page::PageQuery;
use ojwatch_core::dto::problem::ProblemQuery;

use crate::config::Config;

/// Problem subcommands
#[derive(Subcommand)]
pub enum ProblemCommands {
    /// List problems
    List {
        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Page size
        #[arg(long, default_value_t = 20)]
        size: u32,
        /// Only problems of this difficulty
        #[arg(long)]
        difficulty: Option<i32>,
        /// Search in titles
        #[arg(long)]
        keyword: Option<String>,
    },
    /// Show a problem statement
    Show {
        /// Problem ID
        id: i64,
    },
}

/// Handle problem commands
pub async fn handle_problem_command(command: ProblemCommands, config: &Config) -> Result<()> {
    let client = config.client()?;

    match command {
        ProblemCommands::List {
            page,
            size,
            difficulty,
            keyword,
        } => {
            let query = ProblemQuery {
                page: PageQuery {
                    page_no: page,
                    page_size: size,
                },
                difficulty,
                keyword,
            };
            let problems = client.list_problems(&query).await?;

            if problems.is_empty() {
                println!("{}", "No problems found.".yellow());
                return Ok(());
            }

            println!(
                "{}",
                format!(
                    "Page {} of {} ({} problem(s) total):",
                    page, problems.pages, problems.total
                )
                .bold()
            );
            for problem in &problems.list {
                print_problem_summary(problem);
            }
            Ok(())
        }
        ProblemCommands::Show { id } => {
            let problem = client.get_problem(id).await?;
            print_problem_details(&problem);
            Ok(())
        }
    }
}

fn print_problem_summary(problem: &Problem) {
    let rate = problem
        .acceptance_rate()
        .map(|r| format!("{:.1}%", r))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  {} {:>5}  {:<40} {}",
        "▸".cyan(),
        problem.id,
        problem.title,
        rate.dimmed()
    );
}

fn print_problem_details(problem: &Problem) {
    println!("{} {}", format!("#{}", problem.id).cyan(), problem.title.bold());

    let mut limits = Vec::new();
    if let Some(time) = problem.time_limit {
        limits.push(format!("Time: {} ms", time));
    }
    if let Some(memory) = problem.memory_limit {
        limits.push(format!("Memory: {} MB", memory));
    }
    if !limits.is_empty() {
        println!("  {}", limits.join("  ").dimmed());
    }
    if !problem.tags.is_empty() {
        println!("  Tags: {}", problem.tags.join(", "));
    }

    let sections = [
        ("Description", &problem.description),
        ("Input", &problem.input_description),
        ("Output", &problem.output_description),
        ("Sample Input", &problem.sample_input),
        ("Sample Output", &problem.sample_output),
        ("Hint", &problem.hint),
    ];
    for (title, body) in sections {
        if let Some(body) = body.as_deref().filter(|b| !b.is_empty()) {
            println!("\n{}", format!("{}:", title).bold());
            println!("{}", body);
        }
    }
}
