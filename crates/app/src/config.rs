use std::fmt;
use std::path::{Path, PathBuf};

use exam_core::model::{BlueprintDraft, BlueprintError, ExamBlueprint};

pub const DEFAULT_DB_URL: &str = "sqlite://exam.sqlite3";
pub const DEFAULT_BANK_PATH: &str = "question_bank.json";

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidSeed { raw: String },
    HelpRequested,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::HelpRequested => f.write_str("help requested"),
        }
    }
}

impl std::error::Error for ArgsError {}

/// Failure to read or validate a blueprint file.
#[derive(Debug)]
pub enum BlueprintFileError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Invalid(BlueprintError),
}

impl fmt::Display for BlueprintFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlueprintFileError::Io { path, source } => {
                write!(f, "cannot read blueprint {}: {source}", path.display())
            }
            BlueprintFileError::Parse { path, source } => {
                write!(f, "cannot parse blueprint {}: {source}", path.display())
            }
            BlueprintFileError::Invalid(err) => write!(f, "invalid blueprint: {err}"),
        }
    }
}

impl std::error::Error for BlueprintFileError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Run,
    Generate,
}

impl Command {
    pub fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "run" => Some(Self::Run),
            "generate" => Some(Self::Generate),
            _ => None,
        }
    }
}

/// Where settings and the session snapshot live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Database {
    Sqlite(String),
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub database: Database,
    pub bank_path: PathBuf,
    pub blueprint_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub json: bool,
}

impl Args {
    /// Parse flags after the subcommand. `env` supplies the fallbacks
    /// (`EXAM_DB_URL`, `EXAM_BANK_PATH`, `EXAM_BLUEPRINT`).
    pub fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut database = Database::Sqlite(
            env("EXAM_DB_URL").map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url),
        );
        let mut bank_path =
            PathBuf::from(env("EXAM_BANK_PATH").unwrap_or_else(|| DEFAULT_BANK_PATH.into()));
        let mut blueprint_path = env("EXAM_BLUEPRINT")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let mut seed = None;
        let mut json = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    database = Database::Sqlite(normalize_sqlite_url(value));
                }
                "--memory" => database = Database::Memory,
                "--bank" => bank_path = PathBuf::from(require_value(args, "--bank")?),
                "--blueprint" => {
                    blueprint_path = Some(PathBuf::from(require_value(args, "--blueprint")?));
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    let parsed = value
                        .parse::<u64>()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    seed = Some(parsed);
                }
                "--json" => json = true,
                "--help" | "-h" => return Err(ArgsError::HelpRequested),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            database,
            bank_path,
            blueprint_path,
            seed,
            json,
        })
    }
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file (and its directory) so `SQLite` can open it.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
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

    let path = Path::new(path);
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

/// Parse a TOML blueprint.
pub fn parse_blueprint(raw: &str, path: &Path) -> Result<ExamBlueprint, BlueprintFileError> {
    let draft: BlueprintDraft = toml::from_str(raw).map_err(|source| BlueprintFileError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    draft.validate().map_err(BlueprintFileError::Invalid)
}

/// Load the blueprint at `path`, or the reference blueprint when none is given.
pub fn load_blueprint(path: Option<&Path>) -> Result<ExamBlueprint, BlueprintFileError> {
    let Some(path) = path else {
        return Ok(ExamBlueprint::reference());
    };
    let raw = std::fs::read_to_string(path).map_err(|source| BlueprintFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let blueprint = parse_blueprint(&raw, path)?;
    tracing::info!(path = %path.display(), sections = blueprint.len(), "blueprint loaded");
    Ok(blueprint)
}
