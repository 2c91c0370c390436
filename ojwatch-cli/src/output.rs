//! Terminal rendering shared by the command handlers

use colored::*;
use ojwatch_core::domain::submission::{Submission, SubmissionHandle, Verdict};

/// Colorize a verdict for display
pub fn colorize_verdict(verdict: Verdict) -> ColoredString {
    let text = verdict.as_str();
    match verdict {
        Verdict::Pending => text.dimmed(),
        Verdict::Judging => text.cyan(),
        Verdict::Accepted => text.green().bold(),
        Verdict::WrongAnswer => text.red(),
        Verdict::TimeLimitExceeded | Verdict::MemoryLimitExceeded => text.yellow(),
        Verdict::RuntimeError | Verdict::CompileError => text.magenta(),
        Verdict::SystemError => text.red().bold(),
    }
}

/// One-line progress of a running watch
pub fn progress_line(handle: &SubmissionHandle, max_attempts: u32) -> String {
    let status = match handle.status {
        Some(verdict) => colorize_verdict(verdict).to_string(),
        None => "Waiting".dimmed().to_string(),
    };
    format!(
        "  {} Submission {}: {} {}",
        "▸".cyan(),
        handle.submission_id,
        status,
        format!("(poll {}/{})", handle.attempts, max_attempts).dimmed()
    )
}

/// Print a submission summary line
pub fn print_submission_summary(submission: &Submission) {
    println!(
        "  {} #{:<8} {:<24} {:<10} {}",
        "▸".cyan(),
        submission.id,
        submission
            .problem_title
            .clone()
            .unwrap_or_else(|| format!("Problem {}", submission.problem_id)),
        submission.language.as_deref().unwrap_or("-"),
        colorize_verdict(submission.status)
    );
}

/// Print detailed submission information
pub fn print_submission_details(submission: &Submission) {
    println!("{}", "Submission Details:".bold());
    println!("  ID:       {}", submission.id.to_string().cyan());
    match &submission.problem_title {
        Some(title) => println!("  Problem:  {} ({})", title, submission.problem_id),
        None => println!("  Problem:  {}", submission.problem_id),
    }
    if let Some(username) = &submission.username {
        println!("  User:     {}", username);
    }
    if let Some(language) = &submission.language {
        println!("  Language: {}", language);
    }
    println!("  Status:   {}", colorize_verdict(submission.status));
    if let Some(time) = submission.time {
        println!("  Time:     {} ms", time);
    }
    if let Some(memory) = submission.memory {
        println!("  Memory:   {} KB", memory);
    }
    if let Some(created) = &submission.create_time {
        println!("  Created:  {}", created.dimmed());
    }

    if let Some(info) = submission.judge_info.as_deref().filter(|i| !i.is_empty()) {
        println!("\n{}", "Judge Info:".bold());
        println!("{}", info);
    }
}
