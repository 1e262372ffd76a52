use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum, error::ErrorKind};
use clap_complete::{
    generate,
    shells::{Bash, Fish, Zsh},
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use dft_core::Error;
use dft_core::build::{DockerCli, build_image};
use dft_core::config::{
    BuildConfig, DEFAULT_CONTEXT_DIR, DEFAULT_DOCKER_PROGRAM, DEFAULT_SOURCE_FILE,
    TranslateOptions,
};
use dft_core::exit_code::ExitCode;
use dft_core::model::TranslationResult;
use dft_core::translate::translate_reader;
use dft_core::validate::validate_translation;

const LONG_ABOUT: &str = "Translate an extended Dockerfile into a standard one and build it with docker.\n\nThe extended syntax adds // comments, a TAG directive naming the image, a pull-always policy on FROM, and RUN ( ... ) blocks whose lines are chained into a single command with &&.";

const AFTER_HELP: &str = "Examples:\n  dft\n  dft -f build/Dockerfile.dft build\n  dft -t myapp:dev .\n  dft --emit > Dockerfile\n  dft --emit --json | jq .tag\n  dft --check --emit\n  cat Dockerfile.dft | dft --stdin --emit";

fn main() {
    let code = match run() {
        Ok(()) => ExitCode::Success,
        Err(app_error) => {
            if !app_error.message.is_empty() {
                eprintln!("{}", app_error.message);
            }
            app_error.code
        }
    };
    std::process::exit(code.as_i32());
}

#[derive(Debug)]
struct AppError {
    code: ExitCode,
    message: String,
}

impl AppError {
    fn usage(message: impl Into<String>) -> Self {
        Self {
            code: ExitCode::Usage,
            message: message.into(),
        }
    }
}

impl From<Error> for AppError {
    fn from(value: Error) -> Self {
        Self {
            code: ExitCode::from(&value),
            message: value.to_string(),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(value_enum, value_name = "SHELL")]
        shell: CompletionShell,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Debug, Parser)]
#[command(
    name = "dft",
    about = "Build images from extended Dockerfiles",
    long_about = LONG_ABOUT,
    after_help = AFTER_HELP,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(
        short = 'f',
        long = "file",
        value_name = "PATH",
        help = "Read the extended Dockerfile from a file path",
        long_help = "Read the extended Dockerfile from PATH. If omitted, dft uses ./Dockerfile.dft."
    )]
    file: Option<PathBuf>,

    #[arg(
        long = "stdin",
        help = "Read the extended Dockerfile from stdin",
        long_help = "Read the extended Dockerfile from stdin. This conflicts with --file."
    )]
    stdin: bool,

    #[arg(
        short = 't',
        long = "tag",
        value_name = "NAME[:TAG]",
        help = "Name and optionally a tag in the 'name:tag' format",
        long_help = "Name and optionally a tag in the 'name:tag' format. Takes precedence over a TAG directive in the source."
    )]
    tag: Option<String>,

    #[arg(
        long = "emit",
        help = "Print the translated Dockerfile instead of building",
        long_help = "Write the translated Dockerfile to stdout and exit without pulling or building anything."
    )]
    emit: bool,

    #[arg(
        long = "json",
        requires = "emit",
        help = "Emit translation metadata as JSON",
        long_help = "With --emit, print { tag, base_image, pull_always, dockerfile } as a JSON object instead of the raw Dockerfile."
    )]
    json: bool,

    #[arg(
        long = "check",
        help = "Validate the translated Dockerfile",
        long_help = "Parse the translated Dockerfile with a standard Dockerfile parser before emitting or building it, and fail if it does not parse."
    )]
    check: bool,

    #[arg(
        long = "docker",
        env = "DFT_DOCKER",
        value_name = "PATH",
        default_value = DEFAULT_DOCKER_PROGRAM,
        help = "Docker executable used to pull and build",
        long_help = "Docker executable used for `pull` and `build`. Can also be set with DFT_DOCKER."
    )]
    docker: String,

    #[arg(
        short = 'v',
        long = "verbose",
        help = "Print debug details to stderr",
        long_help = "Print debug logging to stderr while keeping stdout clean for --emit output. RUST_LOG is honoured when --verbose is not given."
    )]
    verbose: bool,

    #[arg(
        value_name = "CONTEXT",
        default_value = DEFAULT_CONTEXT_DIR,
        help = "Build context directory",
        long_help = "Build context directory passed to docker build. The temporary Dockerfile is written here as well."
    )]
    context: PathBuf,
}

fn run() -> Result<(), AppError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) {
                print!("{err}");
                return Ok(());
            }
            return Err(AppError::usage(err.to_string()));
        }
    };

    init_logging(cli.verbose);
    execute(cli)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn execute(cli: Cli) -> Result<(), AppError> {
    if let Some(command) = cli.command {
        return execute_command(command);
    }

    validate_cli(&cli)?;

    let options = TranslateOptions {
        tag_override: cli.tag.clone(),
    };
    let result = read_and_translate(&cli, &options)?;

    if cli.check {
        let summary = validate_translation(&result)?;
        debug!(
            stages = summary.stages.len(),
            instructions = summary.instruction_count,
            "translated Dockerfile is valid"
        );
    }

    if cli.emit {
        return write_translation(&result, cli.json);
    }

    let config = BuildConfig::new(cli.context);
    let docker = DockerCli::new(cli.docker);
    build_image(&result, &config, &docker)?;
    Ok(())
}

fn execute_command(command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Completion { shell } => write_completion(shell),
    }
}

fn write_completion(shell: CompletionShell) -> Result<(), AppError> {
    let mut command = Cli::command();
    let mut stdout = std::io::stdout().lock();
    match shell {
        CompletionShell::Bash => generate(Bash, &mut command, "dft", &mut stdout),
        CompletionShell::Zsh => generate(Zsh, &mut command, "dft", &mut stdout),
        CompletionShell::Fish => generate(Fish, &mut command, "dft", &mut stdout),
    }
    stdout.flush().map_err(Error::from).map_err(AppError::from)
}

fn validate_cli(cli: &Cli) -> Result<(), AppError> {
    if cli.stdin && cli.file.is_some() {
        return Err(AppError::usage("--stdin is mutually exclusive with --file"));
    }
    if cli.tag.as_deref() == Some("") {
        return Err(AppError::usage("--tag cannot be empty"));
    }
    Ok(())
}

fn read_and_translate(
    cli: &Cli,
    options: &TranslateOptions,
) -> Result<TranslationResult, AppError> {
    if cli.stdin {
        let stdin = std::io::stdin().lock();
        return translate_reader(stdin, options).map_err(AppError::from);
    }

    let path = cli
        .file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_FILE));
    debug!(path = %path.display(), "reading extended Dockerfile");
    let file = File::open(&path).map_err(|err| AppError {
        code: ExitCode::Io,
        message: format!("cannot open {}: {err}", path.display()),
    })?;
    translate_reader(BufReader::new(file), options).map_err(AppError::from)
}

fn write_translation(result: &TranslationResult, json: bool) -> Result<(), AppError> {
    let mut stdout = std::io::stdout().lock();
    if json {
        serde_json::to_writer(&mut stdout, &result.summary())
            .map_err(std::io::Error::from)
            .map_err(Error::from)?;
        stdout.write_all(b"\n").map_err(Error::from)?;
    } else {
        stdout.write_all(&result.body).map_err(Error::from)?;
    }
    stdout.flush().map_err(Error::from)?;
    Ok(())
}
