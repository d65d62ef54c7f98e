use clap::Parser;
use expanding_tokenizer::config::runtime::LoggingPreferences;
use expanding_tokenizer::config::{build_info, LexerSettings};
use expanding_tokenizer::lexical::{self, LexerConfig};
use expanding_tokenizer::{ini, logging, Lexer, MapVariables};
use std::path::PathBuf;
use std::process;

const ENVIRONMENT_HELP: &str = "\
ENVIRONMENT:
    EXPANDING_LOG_LEVEL        error, warning, info or debug
    EXPANDING_STRUCTURED_LOGS  true for JSON log lines
    EXPANDING_LOG_EXPANSIONS   true to log every expansion at debug level
    EXPANDING_COLLECT_METRICS  false to skip token metrics

EXAMPLES:
    expanding app.ini
    expanding --define HOST=db.local app.ini
    expanding --tokens --full template.txt";

/// Tokenize a configuration file with $-expansion and print it as JSON
#[derive(Parser, Debug)]
#[command(name = "expanding", version, after_help = ENVIRONMENT_HELP)]
struct Cli {
    /// Print one JSON object per token instead of the document
    #[arg(long)]
    tokens: bool,

    /// Treat every glyph as a token (ignored with --settings)
    #[arg(long)]
    full: bool,

    /// Read lexer settings from a TOML file
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Define a variable, overriding the environment
    #[arg(long = "define", value_name = "NAME=VALUE", value_parser = parse_define)]
    defines: Vec<(String, String)>,

    /// Write log events to stderr as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Configuration file to read
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

fn main() {
    // Usage errors exit with status 2, help and version with 0
    let cli = Cli::parse();

    if cli.json_logs {
        let preferences = LoggingPreferences {
            use_structured_logging: true,
            ..LoggingPreferences::default()
        };
        if let Err(message) = logging::config::init_runtime_preferences(preferences) {
            eprintln!("Warning: {}", message);
        }
    }
    if let Err(message) = logging::init_global_logging() {
        eprintln!("Warning: {}", message);
    }
    expanding_tokenizer::log_info!("Limits loaded",
        "profile" => build_info::profile(),
        "source" => build_info::source_info()
    );

    if let Err(error) = run(&cli) {
        eprintln!("Error: {}", error);
        process::exit(1);
    }
}

fn parse_define(definition: &str) -> Result<(String, String), String> {
    definition
        .split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("invalid definition '{}', expected NAME=VALUE", definition))
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut variables = MapVariables::from_environment();
    for (name, value) in &cli.defines {
        variables.insert(name.as_str(), value.as_str());
    }

    let mut lexer = open_lexer(cli, variables)?;

    if cli.tokens {
        for token in &mut lexer {
            println!("{}", serde_json::to_string(&token?)?);
        }
    } else {
        let document = ini::parse_document(&mut lexer)?;
        println!("{}", document.to_json()?);
    }

    Ok(())
}

fn open_lexer(
    cli: &Cli,
    variables: MapVariables,
) -> Result<Lexer<'static>, Box<dyn std::error::Error>> {
    let default_name = cli.input.display().to_string();

    let (source_name, config) = match &cli.settings {
        Some(path) => {
            let settings = LexerSettings::load(path)?;
            let config = settings.lexer_config()?;
            (settings.source_name.unwrap_or(default_name), config)
        }
        None if cli.full => (default_name, LexerConfig::full()),
        None => (default_name, LexerConfig::ini()),
    };

    Ok(lexical::open_named(&cli.input, &source_name, variables, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("expanding").chain(args.iter().copied()))
    }

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_options() {
        let cli = parse(&[
            "--tokens",
            "--define",
            "A=1=2",
            "--define",
            "B=",
            "--settings",
            "lexer.toml",
            "app.ini",
        ])
        .unwrap();

        assert!(cli.tokens);
        assert!(!cli.full);
        assert_eq!(
            cli.defines,
            vec![
                ("A".to_string(), "1=2".to_string()),
                ("B".to_string(), String::new())
            ]
        );
        assert_eq!(cli.settings, Some(PathBuf::from("lexer.toml")));
        assert_eq!(cli.input, PathBuf::from("app.ini"));
    }

    #[test]
    fn test_usage_errors() {
        let kind = |args: &[&str]| parse(args).unwrap_err().kind();

        assert_eq!(kind(&[]), ErrorKind::MissingRequiredArgument);
        assert_eq!(kind(&["--define", "A", "x"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["--settings"]), ErrorKind::InvalidValue);
        assert_eq!(kind(&["--bogus", "x"]), ErrorKind::UnknownArgument);
        assert_eq!(kind(&["a", "b"]), ErrorKind::UnknownArgument);
        assert_eq!(kind(&["--help"]), ErrorKind::DisplayHelp);

        assert_eq!(parse(&[]).unwrap_err().exit_code(), 2);
        assert_eq!(parse(&["--help"]).unwrap_err().exit_code(), 0);
    }

    #[test]
    fn test_run_on_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[s]\nk = $(1 + $N)\n").unwrap();

        let input = file.path().to_str().unwrap();
        let cli = parse(&["--define", "N=41", input]).unwrap();
        let mut lexer = open_lexer(&cli, MapVariables::new().with("N", "41")).unwrap();
        let document = ini::parse_document(&mut lexer).unwrap();
        assert_eq!(document.get("s", "k"), Some("42"));
        assert!(run(&cli).is_ok());
    }
}
