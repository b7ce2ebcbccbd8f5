use anyhow::Result;
use clap::Parser;
use pkgrecipe::config::Config;
use pkgrecipe::package::RecipeFormat;
use std::path::PathBuf;

/// pkgrecipe - Package recipe registry
///
/// Inspect package recipes: their sources, versions, variants and the
/// dependencies a given variant selection activates.
///
/// Recipe directories are searched in order: --repo options, then
/// PKGRECIPE_PATH, then the user configuration directory.
///
/// Examples:
///   pkgrecipe show ports-of-call
///   pkgrecipe deps ports-of-call +doc
#[derive(Parser, Debug)]
#[command(author, version = env!("PKGRECIPE_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Additional recipe directory, given before the command (may be repeated)
    #[arg(long = "repo", short = 'r', value_name = "DIR")]
    pub repos: Vec<PathBuf>,

    /// Reject versions that track a branch or tag without a checksum
    #[arg(
        long = "require-pinned",
        env = "PKGRECIPE_REQUIRE_PINNED",
        value_parser = clap::builder::BoolishValueParser::new(),
        global = true
    )]
    pub require_pinned: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List all known recipes
    List,

    /// Show detailed information about a recipe
    Show(ShowArgs),

    /// Print the dependencies active for a variant selection
    Deps(DepsArgs),

    /// Serialize a recipe as JSON or YAML
    Export(ExportArgs),

    /// Validate recipe files
    Check(CheckArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Package name
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct DepsArgs {
    /// Package name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Variant settings such as +doc, ~doc or doc=true
    #[arg(value_name = "VARIANT")]
    pub variants: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Package name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Output format when writing to stdout
    #[arg(long, short = 'f', default_value = "json")]
    pub format: RecipeFormat,

    /// Write to a file instead of stdout (format follows the extension)
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Overwrite an existing file without asking
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Recipe files to validate
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = pkgrecipe::runtime::RealRuntime;
    let config = Config::new(&runtime, cli.repos, cli.require_pinned)?;

    match cli.command {
        Commands::List => pkgrecipe::commands::list(&runtime, &config)?,
        Commands::Show(args) => pkgrecipe::commands::show(&runtime, &config, &args.name)?,
        Commands::Deps(args) => {
            pkgrecipe::commands::deps(&runtime, &config, &args.name, &args.variants)?
        }
        Commands::Export(args) => pkgrecipe::commands::export(
            &runtime,
            &config,
            &args.name,
            args.format,
            args.output.as_deref(),
            args.yes,
        )?,
        Commands::Check(args) => pkgrecipe::commands::check(&runtime, &config, &args.files)?,
    }
    Ok(())
}
