//! CLI entry point for the math coach guardrail engine.
//!
//! Provides commands for auditing the rule layer offline and for running a
//! coaching session against the deterministic offline generator.
//! Main components: Cli parser, Commands enum, and async runtime.

use anyhow::{Context, bail};
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use mathcoach::display::THEME;
use mathcoach::guardrail::{Category, shows_reasoning};
use mathcoach::io::{ExitCode, JsonResponse, OutputFormat};
use mathcoach::prompt::hint_instruction;
use mathcoach::session::TurnKind;
use mathcoach::{
    Coach, HintTier, OfflineGenerator, PolicyDecision, Problem, ProblemType, Settings, logging,
};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Socratic math coach guardrails
#[derive(Parser)]
#[command(
    name = "mathcoach",
    version = env!("CARGO_PKG_VERSION"),
    about = "Guardrail engine for a Socratic math coach",
    long_about = "Classify student messages, scan coach replies for answer leaks, and run offline coaching sessions.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log guardrail decisions at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Initialize project
    #[command(about = "Set up .mathcoach directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings from .mathcoach/settings.toml")]
    Config,

    /// Classify a student message
    #[command(
        about = "Classify a student message into a guardrail category",
        after_help = "Examples:\n  mathcoach classify \"just tell me the answer\"\n  mathcoach classify --json \"is 42 correct?\"\n\nExit code 2 when the message triggers a redirect."
    )]
    Classify {
        /// Message text; read from stdin when omitted
        text: Vec<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Scan a generated reply for leaks
    #[command(
        about = "Scan a generated coach reply for answer or confirmation leaks",
        after_help = "Examples:\n  mathcoach scan \"The answer is 17.\"\n  mathcoach scan --file reply.txt --json\n\nExit code 2 when the reply would be suppressed."
    )]
    Scan {
        /// Reply text; read from stdin when omitted
        text: Vec<String>,

        /// Read the reply from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the generator instruction for a hint tier
    #[command(name = "hint-prompt", about = "Show the system content sent for a hint tier")]
    HintPrompt {
        /// Hint tier (1-3)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=3))]
        tier: u8,

        /// Problem type used to tailor the instruction
        #[arg(short = 'p', long, default_value = "other")]
        problem_type: String,

        /// Problem text; prints the full system content when given
        #[arg(long)]
        problem: Option<String>,
    },

    /// Run a coaching session in the terminal
    #[command(
        about = "Coach through a problem with the offline generator",
        after_help = "Inside the session:\n  /hint   request the next hint\n  /stats  show guardrail counters\n  /quit   end the session and print the reflection"
    )]
    Chat {
        /// The problem to work on
        #[arg(short, long)]
        problem: String,

        /// Problem type (algebra, arithmetic, geometry, word-problem, ...)
        #[arg(long, default_value = "other")]
        problem_type: String,

        /// Pin template selection
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Debug, Serialize)]
struct ClassifyOutput<'a> {
    text: &'a str,
    category: Category,
    recognizer: Option<String>,
    shows_reasoning: bool,
}

#[derive(Debug, Serialize)]
struct ScanOutput {
    leak: Option<mathcoach::guardrail::LeakReport>,
    formula_dump: Option<mathcoach::guardrail::LeakReport>,
    suppressed: bool,
}

/// Entry point with tokio async runtime
///
/// Loads layered configuration, installs logging, and dispatches the command.
#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        Settings::load_from(config_path).unwrap_or_else(|e| {
            eprintln!(
                "Configuration error loading from {}: {}",
                config_path.display(),
                e
            );
            std::process::exit(ExitCode::ConfigError.into());
        })
    } else {
        Settings::load().unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            Settings::default()
        })
    };

    logging::init(logging::effective_level(
        &config.logging.level,
        cli.verbose || config.debug,
    ));

    let code = match cli.command {
        Commands::Init { force } => run_init(force),
        Commands::Config => run_config(&config),
        Commands::Classify { text, json } => {
            with_input(text, None).map(|text| run_classify(&config, &text, json))
        }
        Commands::Scan { text, file, json } => {
            with_input(text, file).map(|text| run_scan(&config, &text, json))
        }
        Commands::HintPrompt {
            tier,
            problem_type,
            problem,
        } => run_hint_prompt(&config, tier, &problem_type, problem.as_deref()),
        Commands::Chat {
            problem,
            problem_type,
            seed,
        } => run_chat(config, &problem, &problem_type, seed).await,
    };

    match code {
        Ok(code) => std::process::exit(code.into()),
        Err(e) => {
            eprintln!("{}", THEME.error_with_icon(&format!("{e:#}")));
            std::process::exit(ExitCode::GeneralError.into());
        }
    }
}

/// Join positional words, or read the whole of stdin/a file
fn with_input(words: Vec<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }
    if !words.is_empty() {
        return Ok(words.join(" "));
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read stdin")?;
    Ok(buffer)
}

fn run_init(force: bool) -> anyhow::Result<ExitCode> {
    match Settings::init_config_file(force) {
        Ok(path) => {
            println!("Created configuration file at: {}", path.display());
            println!("Edit this file to customize your settings.");
            Ok(ExitCode::Success)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            Ok(ExitCode::GeneralError)
        }
    }
}

fn run_config(config: &Settings) -> anyhow::Result<ExitCode> {
    println!("Current Configuration:");
    if let Some(path) = Settings::config_path() {
        println!("Loaded from: {}", path.display());
    }
    println!("{}", "=".repeat(50));
    let toml_str = toml::to_string_pretty(config).context("Error displaying config")?;
    println!("{toml_str}");
    Ok(ExitCode::Success)
}

/// Build a coach for the audit commands, reporting configuration errors
fn build_coach(config: &Settings) -> Result<Coach, ExitCode> {
    Coach::new(config, Arc::new(OfflineGenerator)).map_err(|e| {
        eprintln!("{}", THEME.error_with_icon(&e.to_string()));
        for suggestion in e.recovery_suggestions() {
            eprintln!("  {}", THEME.apply(&THEME.dim, suggestion));
        }
        ExitCode::from_error(&e)
    })
}

fn run_classify(config: &Settings, text: &str, json: bool) -> ExitCode {
    let coach = match build_coach(config) {
        Ok(coach) => coach,
        Err(code) => return code,
    };
    let text = text.trim();
    let classification = coach.classifier().classify_detailed(text);
    let code = ExitCode::from_flag(classification.category.is_hard_redirect());

    let output = ClassifyOutput {
        text,
        category: classification.category,
        recognizer: classification.recognizer,
        shows_reasoning: shows_reasoning(text),
    };

    if OutputFormat::from_json_flag(json).is_json() {
        print_json(&JsonResponse::with_data(&output, code));
    } else {
        let recognizer = output.recognizer.as_deref().unwrap_or("-");
        println!(
            "{}  {}",
            THEME.apply(&THEME.code, output.category),
            THEME.apply(&THEME.dim, recognizer)
        );
        if output.category == Category::ConfirmationSeeking {
            println!("shows reasoning: {}", output.shows_reasoning);
        }
    }
    code
}

fn run_scan(config: &Settings, text: &str, json: bool) -> ExitCode {
    let coach = match build_coach(config) {
        Ok(coach) => coach,
        Err(code) => return code,
    };
    let leak = coach.scanner().scan(text);
    let formula_dump = coach.scanner().detect_formula_dump(text);
    let suppressed = leak.is_some()
        || (formula_dump.is_some()
            && config.policy.formula_dump_action == mathcoach::policy::FormulaDumpAction::Replace);
    let code = ExitCode::from_flag(suppressed);

    let output = ScanOutput {
        leak,
        formula_dump,
        suppressed,
    };

    if OutputFormat::from_json_flag(json).is_json() {
        print_json(&JsonResponse::with_data(&output, code));
        return code;
    }

    match &output.leak {
        Some(report) => println!(
            "{}",
            THEME.warning_with_icon(&format!(
                "leak: {} ({})",
                report.category, report.recognizer
            ))
        ),
        None => println!("{}", THEME.success_with_icon("no leak")),
    }
    if let Some(report) = &output.formula_dump {
        println!(
            "{}",
            THEME.warning_with_icon(&format!("formula dump ({})", report.recognizer))
        );
    }
    code
}

fn run_hint_prompt(
    config: &Settings,
    tier: u8,
    problem_type: &str,
    problem: Option<&str>,
) -> anyhow::Result<ExitCode> {
    let Some(tier) = HintTier::from_level(tier) else {
        bail!("hint tier must be between 1 and 3, got {tier}");
    };
    let problem_type = ProblemType::parse(problem_type);

    match problem {
        Some(text) => {
            let problem = Problem::typed(text).with_problem_type(problem_type);
            let policy = mathcoach::PolicyText::new(config.policy.confirmation_policy);
            println!("{}", policy.system_content(Some(&problem), Some(tier)));
        }
        None => println!("{}", hint_instruction(tier, problem_type)),
    }
    Ok(ExitCode::Success)
}

async fn run_chat(
    mut config: Settings,
    problem: &str,
    problem_type: &str,
    seed: Option<u64>,
) -> anyhow::Result<ExitCode> {
    // A command-line seed pins selection without dropping `[templates]` overrides
    config.templates.seed = seed.or(config.templates.seed);
    let coach = match build_coach(&config) {
        Ok(coach) => coach,
        Err(code) => return Ok(code),
    };

    let problem = Problem::typed(problem).with_problem_type(ProblemType::parse(problem_type));
    let id = coach.start_session(problem);
    for turn in coach.transcript(id).await? {
        print_coach(&turn.content, turn.kind == TurnKind::Hint);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let decision = match line {
            "/quit" | "/exit" => break,
            "/stats" => {
                println!("{}", serde_json::to_string_pretty(&coach.stats())?);
                continue;
            }
            "/hint" => coach.request_hint(id).await?,
            message => coach.send_message(id, message).await?,
        };
        print_decision(&decision, coach.hints_remaining(id).await?);
    }

    let record = coach.end_session(id).await?;
    println!("\n{}", THEME.apply(&THEME.header, "Session summary"));
    println!("Hints used: {}", record.hints_used);
    println!(
        "Concepts practiced: {}",
        record.reflection.concepts_practiced.join(", ")
    );
    for question in &record.reflection.reflection_questions {
        println!("  - {question}");
    }
    Ok(ExitCode::Success)
}

fn print_coach(text: &str, hint: bool) {
    let label = if hint { "hint" } else { "coach" };
    println!("{} {text}\n", THEME.apply(&THEME.header, format!("{label}>")));
}

fn print_decision(decision: &PolicyDecision, hints_remaining: u8) {
    match decision {
        PolicyDecision::Hint { tier, text } => {
            print_coach(text, true);
            println!(
                "{}",
                THEME.apply(
                    &THEME.dim,
                    format!("[{}; {hints_remaining} left]", tier.label())
                )
            );
        }
        other => {
            print_coach(other.text(), false);
            if !matches!(other, PolicyDecision::PassThrough { .. }) {
                println!("{}", THEME.apply(&THEME.dim, format!("[{}]", other.kind())));
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error serializing output: {e}"),
    }
}
