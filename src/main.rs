use std::io::{self, stdout, BufRead, Stdout, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use crossbeam_channel::{Receiver, TryRecvError};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Runtime;

use ideahub::api::{
    AnsweredQuestion, ApiClient, Feedback, QuizAnswer, QuizStats, ScoreBand, TeamApplication,
};
use ideahub::app::LogicThread;
use ideahub::chat::TeamId;
use ideahub::config::Config;
use ideahub::render::RenderState;
use ideahub::tea::Model;
use ideahub::{hlog, ui, util, Error, Result};

const FRAME_DURATION: Duration = Duration::from_micros(16_666); // 60fps

/// ideahub - idea submission wizard and team chat for the youth entrepreneurship platform
#[derive(Parser, Debug)]
#[command(name = "ideahub")]
#[command(version, about, long_about = None)]
#[command(
    after_help = "ENVIRONMENT:\n    IDEAHUB_DEBUG=1     Enable debug logging (alternative to --debug)"
)]
pub struct Cli {
    /// Enable debug logging (writes to ~/.ideahub/ideahub.log)
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Backend URL (overrides config)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Display name used to highlight own chat messages (overrides config)
    #[arg(long)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Submit a new idea through the guided wizard (default)
    Submit,

    /// Open a team's chat
    Chat {
        team_id: TeamId,

        /// Team name shown in the chat header
        #[arg(long)]
        name: Option<String>,
    },

    /// Print a team's messages once
    Messages { team_id: TeamId },

    /// Post one message to a team
    Send { team_id: TeamId, text: String },

    /// Leave a team
    Leave { team_id: TeamId },

    /// Like or unlike an idea
    Like { idea_id: u64 },

    /// Comment on an idea
    Comment { idea_id: u64, text: String },

    /// Ask the backend for an AI evaluation of one of your ideas
    Evaluate { idea_id: u64 },

    /// Take today's quiz
    Quiz,

    /// Show your quiz history
    Stats,

    /// List the ideas you have liked
    Likes,

    /// Ask to join the team behind an idea
    Apply {
        idea_id: u64,
        message: String,
        #[arg(long, default_value = "")]
        skills: String,
        #[arg(long, default_value = "")]
        experience: String,
        #[arg(long, default_value = "")]
        availability: String,
    },

    /// Delete one of your ideas
    DeleteIdea { idea_id: u64 },

    /// Upload a new profile picture
    Avatar { path: PathBuf },

    /// Write a config file with every default filled in
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Send feedback about the platform
    Feedback {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// 1-5
        #[arg(long)]
        rating: String,
        message: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    ideahub::log::init_with_debug(cli.debug);

    let mut config = Config::load()?;
    if let Some(url) = cli.base_url.clone() {
        config.base_url = Some(url);
    }
    if let Some(user) = cli.user.clone() {
        config.username = Some(user);
    }

    match cli.command {
        None | Some(Command::Submit) => run_tui(Model::new(config), cli.debug),
        Some(Command::Init { force }) => init_config(&config, force),
        Some(Command::Chat { team_id, name }) => {
            let title = name.unwrap_or_else(|| format!("Team {}", team_id));
            run_tui(Model::for_chat(config, team_id, title), cli.debug)
        }
        Some(command) => run_headless(command, &config),
    }
}

fn run_tui(model: Model, debug: bool) -> Result<()> {
    if debug {
        hlog!("ideahub starting (debug mode enabled)");
    } else {
        hlog!("ideahub starting");
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let (state_tx, state_rx) = crossbeam_channel::bounded::<RenderState>(1);

    let shutdown_clone = shutdown.clone();
    let logic_handle = thread::spawn(move || LogicThread::run(model, state_tx, shutdown_clone));

    let mut terminal = setup_terminal()?;
    let result = render_loop(&mut terminal, state_rx, &shutdown);

    shutdown.store(true, Ordering::SeqCst);
    let logic_result = logic_handle
        .join()
        .map_err(|_| Error::TaskJoin("logic thread panicked".to_string()))?;
    restore_terminal(&mut terminal)?;
    result.and(logic_result)
}

fn run_headless(command: Command, config: &Config) -> Result<()> {
    let api = ApiClient::from_config(config)?;
    hlog!("Headless command: {:?}", command);
    let username = config.effective_username().to_string();

    Runtime::new()?.block_on(async move {
        match command {
            Command::Messages { team_id } => {
                for m in api.team_messages(team_id).await? {
                    let marker = if !username.is_empty() && m.author == username {
                        "*"
                    } else {
                        " "
                    };
                    println!("{}{} [{}] {}", marker, m.author, m.timestamp, m.text);
                }
            }
            Command::Send { team_id, text } => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(Error::Validation("Message cannot be empty".to_string()));
                }
                api.send_team_message(team_id, text).await?;
                println!("Sent.");
            }
            Command::Leave { team_id } => {
                api.leave_team(team_id).await?;
                println!("Left team {}.", team_id);
            }
            Command::Like { idea_id } => {
                let like = api.like_idea(idea_id).await?;
                let verb = if like.liked { "Liked" } else { "Unliked" };
                println!("{} idea {} ({} likes)", verb, idea_id, like.like_count);
            }
            Command::Comment { idea_id, text } => {
                let comment = api.post_comment(idea_id, &text).await?;
                println!("{} ({}): {}", comment.author, comment.date, comment.text);
            }
            Command::Evaluate { idea_id } => {
                println!("Analyzing your idea...");
                print_evaluation(&api.evaluate_idea(idea_id).await?);
            }
            Command::Quiz => run_quiz(&api).await?,
            Command::Stats => {
                let stats = api.quiz_analytics().await?;
                println!("Quizzes taken: {}", stats.total_quizzes);
                println!("Average accuracy: {:.1}%", stats.avg_accuracy);
                if !stats.recent_scores.is_empty() {
                    let scores: Vec<String> =
                        stats.recent_scores.iter().map(|s| s.to_string()).collect();
                    println!("Recent scores: {}", scores.join(", "));
                }
                if let Some(category) = stats.best_category {
                    println!("Best category: {}", category);
                }
            }
            Command::Likes => {
                let likes = api.user_likes().await?;
                if likes.is_empty() {
                    println!("You haven't liked any ideas yet.");
                }
                for idea_id in likes {
                    println!("{}", idea_id);
                }
            }
            Command::Apply {
                idea_id,
                message,
                skills,
                experience,
                availability,
            } => {
                api.apply_to_team(&TeamApplication {
                    idea_id,
                    message,
                    skills,
                    experience,
                    availability,
                })
                .await?;
                println!("Application sent.");
            }
            Command::DeleteIdea { idea_id } => {
                api.delete_idea(idea_id).await?;
                println!("Deleted idea {}.", idea_id);
            }
            Command::Avatar { path } => {
                api.upload_profile_pic(&path).await?;
                println!("Profile picture updated.");
            }
            Command::Feedback {
                name,
                email,
                rating,
                message,
            } => {
                let feedback = Feedback::new(name, email, rating, message);
                match api.send_feedback(feedback) {
                    Some(handle) => {
                        util::join(handle).await?;
                        println!("Thanks for your feedback!");
                    }
                    None => {
                        return Err(Error::Validation(
                            "No feedback_url configured".to_string(),
                        ))
                    }
                }
            }
            Command::Submit | Command::Chat { .. } | Command::Init { .. } => {}
        }
        Ok::<_, Error>(())
    })
}

fn init_config(config: &Config, force: bool) -> Result<()> {
    let path = Config::config_path()?;
    if path.exists() && !force {
        println!("{} already exists (use --force to overwrite)", path.display());
        return Ok(());
    }
    config.save()?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn print_evaluation(evaluation: &ideahub::api::Evaluation) {
    let band = |score: f64| match ScoreBand::of(score) {
        ScoreBand::Excellent => "excellent",
        ScoreBand::Good => "good",
        ScoreBand::Fair => "fair",
        ScoreBand::Poor => "poor",
    };
    println!(
        "Overall: {}/10 ({})",
        evaluation.overall_rating,
        band(evaluation.overall_rating)
    );
    if !evaluation.overall_feedback.is_empty() {
        println!("  {}", evaluation.overall_feedback);
    }
    for (category, score) in &evaluation.detailed_analysis {
        println!(
            "{}: {}/10 ({})\n  {}",
            category.replace('_', " "),
            score.score,
            band(score.score),
            score.feedback
        );
    }
    for (heading, items) in [
        ("Strengths", &evaluation.strengths),
        ("Improvements", &evaluation.improvements),
        ("Challenges", &evaluation.challenges),
        ("Next steps", &evaluation.next_steps),
    ] {
        if items.is_empty() {
            continue;
        }
        println!("{}:", heading);
        for item in items {
            println!("  - {}", item);
        }
    }
}

async fn run_quiz(api: &ApiClient) -> Result<()> {
    let quiz = api.daily_quiz().await?;
    if quiz.questions.is_empty() {
        println!("You've already completed today's quiz. Come back tomorrow!");
        return Ok(());
    }

    let started = Instant::now();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut answers = Vec::with_capacity(quiz.questions.len());

    for (idx, question) in quiz.questions.iter().enumerate() {
        println!(
            "\n[{}/{}] ({}) {}",
            idx + 1,
            quiz.questions.len(),
            question.category,
            question.question
        );
        for (i, option) in question.options.iter().enumerate() {
            println!("  {}. {}", i + 1, option);
        }

        let selected = loop {
            print!("> ");
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                return Ok(());
            };
            match line?.trim().parse::<usize>() {
                Ok(n) if (1..=question.options.len()).contains(&n) => break n - 1,
                _ => println!("Enter a number between 1 and {}", question.options.len()),
            }
        };

        let correct = question.is_correct(selected);
        if correct {
            println!("Correct!");
        } else if let Some(answer) = question.options.get(question.correct_answer) {
            println!("Not quite. The answer was: {}", answer);
        }
        if !question.explanation.is_empty() {
            println!("{}", question.explanation);
        }

        api.submit_quiz_answer(&QuizAnswer {
            question_id: question.id,
            selected_answer: selected,
        })
        .await?;
        answers.push(AnsweredQuestion {
            question_id: question.id,
            selected_answer: selected,
            correct,
        });
    }

    let minutes = started.elapsed().as_secs() / 60;
    let stats = QuizStats::from_answers(answers, minutes);
    api.update_quiz_stats(&stats).await?;
    println!(
        "\nScore: {}/{} ({}%), {} points",
        stats.correct_answers, stats.questions_answered, stats.accuracy, stats.points_earned
    );
    Ok(())
}

fn render_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state_rx: Receiver<RenderState>,
    shutdown: &AtomicBool,
) -> Result<()> {
    let mut state = RenderState::default();
    let mut last_version: u64 = 0;
    let mut last_frame = Instant::now();
    let mut dirty = true;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match state_rx.try_recv() {
            Ok(s) => {
                dirty = dirty || s.version != last_version;
                state = s;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }

        if last_frame.elapsed() < FRAME_DURATION {
            thread::sleep(Duration::from_micros(500));
            continue;
        }
        last_frame = Instant::now();

        if dirty {
            terminal.draw(|f| ui::draw(f, &state))?;
            last_version = state.version;
            dirty = false;
        }
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(disable_raw_mode()?)
}
