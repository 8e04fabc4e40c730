use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use soroban_core::generate_with;
use soroban_core::model::{
    CorrectionPolicy, Difficulty, DifficultyConfig, DigitClass, GameSettingsDraft,
    SessionConfigDraft,
};
use services::{Clock, GameService};
use storage::repository::Storage;
use tracing_subscriber::EnvFilter;

mod game;
mod play;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidDigits { raw: String },
    InvalidDifficulty { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDigits { raw } => {
                write!(f, "invalid --digits value (expected e.g. 1d<10, 3d>1000): {raw}")
            }
            ArgsError::InvalidDifficulty { raw } => {
                write!(f, "invalid --difficulty value (beginner|intermediate|advanced): {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ArgsError> {
    let value = require_value(args, flag)?;
    value
        .trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw: value })
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app generate [--digits <code>] [--operands <n>] [--count <n>] [--seed <n>] [--reflect]");
    eprintln!("  app play     [--digits <code>] [--operands <n>] [--questions <n>] [--speed <secs>] [--seed <n>]");
    eprintln!("  app game     [--db <sqlite_url>] [--questions <n>] [--range <n>] [--difficulty <level>] [--time-limit <secs>]");
    eprintln!("  app stats    [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Digit codes:");
    for class in DigitClass::ALL {
        eprintln!("  {:<10} {}", class.code(), class.display_label());
    }
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SOROBAN_DB_URL, SOROBAN_DIGITS, SOROBAN_OPERANDS, SOROBAN_QUESTIONS, SOROBAN_SPEED");
    eprintln!("  RUST_LOG (default: soroban_core=info,services=info,storage=info,app=info)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Generate,
    Play,
    Game,
    Stats,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "generate" => Some(Self::Generate),
            "play" => Some(Self::Play),
            "game" => Some(Self::Game),
            "stats" => Some(Self::Stats),
            _ => None,
        }
    }
}

/// Drill knobs shared by `generate` and `play`.
#[derive(Debug)]
struct DrillArgs {
    digits: DigitClass,
    operands: u32,
    count: u32,
    speed: Option<u32>,
    seed: Option<u64>,
    reflect: bool,
}

impl DrillArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            digits: std::env::var("SOROBAN_DIGITS")
                .ok()
                .map_or_else(DigitClass::default, |code| DigitClass::from_code_lossy(&code)),
            operands: env_number("SOROBAN_OPERANDS").unwrap_or(2),
            count: env_number("SOROBAN_QUESTIONS").unwrap_or(5),
            speed: env_number("SOROBAN_SPEED"),
            seed: None,
            reflect: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--digits" => {
                    let value = require_value(args, "--digits")?;
                    parsed.digits = DigitClass::from_code(&value)
                        .ok_or(ArgsError::InvalidDigits { raw: value })?;
                }
                "--operands" => parsed.operands = parse_number(args, "--operands")?,
                "--count" => parsed.count = parse_number(args, "--count")?,
                "--questions" => parsed.count = parse_number(args, "--questions")?,
                "--speed" => parsed.speed = Some(parse_number(args, "--speed")?),
                "--seed" => parsed.seed = Some(parse_number(args, "--seed")?),
                "--reflect" => parsed.reflect = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(parsed)
    }

    fn rng(&self) -> StdRng {
        self.seed.map_or_else(
            || StdRng::from_rng(&mut rand::rng()),
            StdRng::seed_from_u64,
        )
    }
}

/// Knobs for the persisted `game` and `stats` commands.
#[derive(Debug)]
struct GameArgs {
    db_url: String,
    settings: GameSettingsDraft,
}

impl GameArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("SOROBAN_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://soroban.sqlite3".into(), normalize_sqlite_url);
        let mut settings = GameSettingsDraft {
            question_count: env_number("SOROBAN_QUESTIONS"),
            ..GameSettingsDraft::default()
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--questions" => settings.question_count = Some(parse_number(args, "--questions")?),
                "--range" => settings.number_range = Some(parse_number(args, "--range")?),
                "--time-limit" => settings.time_limit = Some(parse_number(args, "--time-limit")?),
                "--difficulty" => {
                    let value = require_value(args, "--difficulty")?;
                    settings.difficulty = Some(match value.trim() {
                        "beginner" => Difficulty::Beginner,
                        "intermediate" => Difficulty::Intermediate,
                        "advanced" => Difficulty::Advanced,
                        _ => return Err(ArgsError::InvalidDifficulty { raw: value }),
                    });
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, settings })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn open_storage(db_url: &str) -> Result<Storage, Box<dyn std::error::Error>> {
    // Open + migrate SQLite here so core/services stay free of filesystem concerns.
    prepare_sqlite_file(db_url)?;
    Ok(Storage::sqlite(db_url).await?)
}

fn generate(args: &DrillArgs) -> Result<(), Box<dyn std::error::Error>> {
    let correction = if args.reflect {
        CorrectionPolicy::Reflect
    } else {
        CorrectionPolicy::Clamp
    };
    let config = DifficultyConfig::new(args.digits, args.operands.max(1)).with_correction(correction);
    let mut rng = args.rng();
    let expressions: Vec<_> = (0..args.count.max(1))
        .map(|_| generate_with(&config, &mut rng))
        .collect();
    println!("{}", serde_json::to_string_pretty(&expressions)?);
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next() {
        None => {
            print_usage();
            return Ok(());
        }
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let report = |e: ArgsError| {
        eprintln!("{e}");
        print_usage();
        e
    };

    match cmd {
        Command::Generate => {
            let args = DrillArgs::parse(&mut argv).map_err(report)?;
            generate(&args)
        }
        Command::Play => {
            let args = DrillArgs::parse(&mut argv).map_err(report)?;
            let config = SessionConfigDraft {
                operand_count: Some(args.operands),
                speed_secs: args.speed,
                digit_class: Some(args.digits),
                question_count: Some(args.count),
                ..SessionConfigDraft::new()
            }
            .clamp();
            play::run(config, args.seed).await
        }
        Command::Game => {
            let args = GameArgs::parse(&mut argv).map_err(report)?;
            let storage = open_storage(&args.db_url).await?;
            let service = GameService::from_storage(Clock::default_clock(), &storage);
            game::run(&service, args.settings).await
        }
        Command::Stats => {
            let args = GameArgs::parse(&mut argv).map_err(report)?;
            let storage = open_storage(&args.db_url).await?;
            let service = GameService::from_storage(Clock::default_clock(), &storage);
            let stats = service.stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("soroban_core=info,services=info,storage=info,app=info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> std::vec::IntoIter<String> {
        raw.iter().map(|s| (*s).to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn drill_args_parse_flags() {
        let parsed = DrillArgs::parse(&mut args(&[
            "--digits", "3d>1000", "--operands", "4", "--count", "2", "--seed", "9", "--reflect",
        ]))
        .unwrap();
        assert_eq!(parsed.digits, DigitClass::ThreeDigitFromThousand);
        assert_eq!(parsed.operands, 4);
        assert_eq!(parsed.count, 2);
        assert_eq!(parsed.seed, Some(9));
        assert!(parsed.reflect);
    }

    #[test]
    fn drill_args_reject_unknown_digits_and_flags() {
        assert!(matches!(
            DrillArgs::parse(&mut args(&["--digits", "7d"])),
            Err(ArgsError::InvalidDigits { .. })
        ));
        assert!(matches!(
            DrillArgs::parse(&mut args(&["--bogus"])),
            Err(ArgsError::UnknownArg(_))
        ));
        assert!(matches!(
            DrillArgs::parse(&mut args(&["--operands"])),
            Err(ArgsError::MissingValue { flag: "--operands" })
        ));
    }

    #[test]
    fn game_args_parse_difficulty() {
        let parsed =
            GameArgs::parse(&mut args(&["--db", "sqlite::memory:", "--difficulty", "advanced"]))
                .unwrap();
        assert_eq!(parsed.db_url, "sqlite::memory:");
        assert_eq!(parsed.settings.difficulty, Some(Difficulty::Advanced));
    }

    #[test]
    fn normalizes_relative_sqlite_paths() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/a.db".into()),
            "sqlite:///tmp/a.db"
        );
        assert!(normalize_sqlite_url("sqlite:data/a.db".into()).ends_with("/data/a.db"));
        assert!(normalize_sqlite_url("sqlite:data/a.db".into()).starts_with("sqlite:///"));
    }
}
