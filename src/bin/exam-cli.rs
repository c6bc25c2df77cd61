//! Terminal client for taking a timed exam against a running portal server.
//!
//! Commands are read line by line from stdin while a one-second ticker runs
//! the clock. Submitting (or running out of time) sends the answers once and
//! prints the score.

use std::process::ExitCode;
use std::sync::Arc;

use campus_portal::models::exam::{OptionLetter, QuizScore, SubmitQuizRequest};
use campus_portal::quiz::{
    ClientError, ExamSession, HttpExamClient, ScoringClient, Student, SubmissionState, SubmitOutcome,
    SubmitStep, SubmitTrigger, TickEvent, Ticker,
    timer::Severity,
};
use chrono::Utc;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const HELP_TEXT: &str = "\
Commands:
  a | b | c | d   choose an option for the current question
  n, next         next question
  p, prev         previous question
  g <number>      go to question <number>
  l, list         show which questions are answered
  t, time         show remaining time
  s, submit       submit the exam
  q, quit         leave without submitting
  h, help         show this help";

#[derive(Debug, Parser)]
#[command(name = "exam-cli", version, about = "Take a timed placement exam in the terminal")]
struct Args {
    /// Base URL of the portal server.
    #[arg(long, env = "EXAM_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,

    /// List available exams and exit.
    #[arg(long)]
    list: bool,

    /// ID of the exam to take.
    #[arg(long, required_unless_present = "list")]
    exam: Option<i64>,

    /// Your full name.
    #[arg(long, env = "STUDENT_NAME", required_unless_present = "list")]
    name: Option<String>,

    /// Your university seat number.
    #[arg(long, env = "STUDENT_USN", required_unless_present = "list")]
    usn: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Choose(OptionLetter),
    Next,
    Previous,
    GoTo(usize),
    List,
    Time,
    Submit,
    Quit,
    Help,
}

/// Parses one input line. Question numbers are 1-based on screen.
fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?.to_ascii_lowercase();
    let command = match head.as_str() {
        "n" | "next" => Command::Next,
        "p" | "prev" | "previous" => Command::Previous,
        "g" | "goto" => {
            let number: usize = parts.next()?.parse().ok()?;
            Command::GoTo(number.checked_sub(1)?)
        }
        "l" | "list" => Command::List,
        "t" | "time" => Command::Time,
        "s" | "submit" => Command::Submit,
        "q" | "quit" | "exit" => Command::Quit,
        "h" | "help" | "?" => Command::Help,
        other if other.len() == 1 => Command::Choose(OptionLetter::from_char(other.chars().next()?)?),
        _ => return None,
    };
    Some(command)
}

/// `Some(true)` / `Some(false)` for yes/no answers to the confirmation prompt.
fn parse_confirmation(line: &str) -> Option<bool> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

fn render_question(session: &ExamSession) {
    let Some(question) = session.current_question() else {
        println!("This exam has no questions. Type 's' to submit.");
        return;
    };
    let index = session.current_index();
    println!();
    println!(
        "Question {}/{}  [{} left]",
        index + 1,
        session.question_count(),
        session.countdown()
    );
    println!("{}", question.text);
    for (letter, text) in &question.options {
        let marker = if session.selected(index) == Some(*letter) { '*' } else { ' ' };
        println!(" {marker} {letter}) {text}");
    }
}

fn render_palette(session: &ExamSession) {
    let marks: Vec<String> = (0..session.question_count())
        .map(|i| match session.selected(i) {
            Some(letter) => format!("{}:{}", i + 1, letter),
            None => format!("{}:-", i + 1),
        })
        .collect();
    println!("{}", marks.join("  "));
    println!(
        "{} answered, {} unanswered",
        session.answered_count(),
        session.unanswered_count()
    );
}

fn spawn_submit(
    client: &Arc<HttpExamClient>,
    payload: SubmitQuizRequest,
    done: &mpsc::Sender<Result<QuizScore, ClientError>>,
) {
    println!("Submitting exam...");
    let client = Arc::clone(client);
    let done = done.clone();
    tokio::spawn(async move {
        let result = client.submit(&payload).await;
        // the view may be gone by now; then the result is simply dropped
        let _ = done.send(result).await;
    });
}

/// Runs the attempt until it is scored or the learner leaves.
async fn take_exam(mut session: ExamSession, client: Arc<HttpExamClient>) -> Option<QuizScore> {
    let (_ticker, mut ticks) = Ticker::every_second();
    let (done_tx, mut done_rx) = mpsc::channel(1);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!(
        "{}: {} questions, {} minutes. Type 'h' for help.",
        session.exam().name,
        session.question_count(),
        session.exam().duration_minutes
    );
    render_question(&session);

    loop {
        tokio::select! {
            Some(()) = ticks.recv() => {
                match session.tick(Utc::now()) {
                    Some(TickEvent::Warning(warning)) => match warning.severity() {
                        Severity::Warning => println!("[warning] {}", warning.message()),
                        Severity::Urgent => println!("[URGENT] {}", warning.message()),
                    },
                    Some(TickEvent::AutoSubmit(payload)) => {
                        println!("Time is up!");
                        spawn_submit(&client, payload, &done_tx);
                    }
                    None => {}
                }
            }
            Some(result) = done_rx.recv() => {
                match session.finish_submit(result) {
                    Some(SubmitOutcome::Completed(score)) => return Some(score),
                    Some(SubmitOutcome::Failed { message }) => {
                        println!("{message} Your answers are kept; type 's' to try again.");
                    }
                    None => {}
                }
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) | Err(_) => {
                        println!("Input closed, leaving without submitting.");
                        return None;
                    }
                };

                let confirming = matches!(session.submission_state(), SubmissionState::Confirming { .. });
                if confirming {
                    match parse_confirmation(&line) {
                        Some(accepted) => {
                            if let SubmitStep::Send(payload) = session.confirm_submit(accepted, Utc::now()) {
                                spawn_submit(&client, payload, &done_tx);
                            } else {
                                render_question(&session);
                            }
                        }
                        None => println!("Please answer y or n."),
                    }
                    continue;
                }

                match parse_command(&line) {
                    Some(Command::Choose(letter)) => {
                        session.select_current(letter);
                        render_question(&session);
                    }
                    Some(Command::Next) => {
                        session.next();
                        render_question(&session);
                    }
                    Some(Command::Previous) => {
                        session.previous();
                        render_question(&session);
                    }
                    Some(Command::GoTo(index)) => {
                        if session.jump_to(index) {
                            render_question(&session);
                        } else {
                            println!("There is no question {}.", index + 1);
                        }
                    }
                    Some(Command::List) => render_palette(&session),
                    Some(Command::Time) => println!("{} left", session.countdown()),
                    Some(Command::Help) => println!("{HELP_TEXT}"),
                    Some(Command::Quit) => return None,
                    Some(Command::Submit) => match session.request_submit(SubmitTrigger::Manual, Utc::now()) {
                        SubmitStep::Confirm { unanswered } => {
                            println!("You have {unanswered} unanswered question(s). Submit anyway? [y/n]");
                        }
                        SubmitStep::Send(payload) => spawn_submit(&client, payload, &done_tx),
                        SubmitStep::Ignored => println!("Submission already in progress."),
                    },
                    None => println!("Unknown command. Type 'h' for help."),
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let client = Arc::new(HttpExamClient::new(args.server.as_str()));

    if args.list {
        return match client.list_exams().await {
            Ok(exams) => {
                for exam in exams {
                    println!(
                        "{:>4}  {}  ({} questions, {} min)",
                        exam.id, exam.name, exam.question_count, exam.duration_minutes
                    );
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Could not list exams: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let (Some(exam_id), Some(name), Some(usn)) = (args.exam, args.name, args.usn) else {
        eprintln!("--exam, --name and --usn are required");
        return ExitCode::FAILURE;
    };

    let exam = match client.fetch_exam(exam_id).await {
        Ok(exam) => exam,
        Err(e) => {
            eprintln!("Could not load exam {}: {}", exam_id, e.user_message());
            tracing::debug!("fetch_exam failed: {:?}", e);
            return ExitCode::FAILURE;
        }
    };

    let session = ExamSession::new(exam, Student { name, usn }, Utc::now());

    match take_exam(session, client).await {
        Some(score) => {
            println!(
                "Exam submitted. Score: {}/{}",
                score.score, score.total_questions
            );
            ExitCode::SUCCESS
        }
        None => ExitCode::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_and_navigation_parse() {
        assert_eq!(parse_command("b"), Some(Command::Choose(OptionLetter::B)));
        assert_eq!(parse_command("  NEXT "), Some(Command::Next));
        assert_eq!(parse_command("g 3"), Some(Command::GoTo(2)));
        assert_eq!(parse_command("g 0"), None);
        assert_eq!(parse_command("e"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn confirmation_accepts_yes_and_no_only() {
        assert_eq!(parse_confirmation("Y"), Some(true));
        assert_eq!(parse_confirmation("no"), Some(false));
        assert_eq!(parse_confirmation("maybe"), None);
    }
}
