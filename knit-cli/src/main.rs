// Command-line interface for knit
//
// This binary reads site documents the way the site generator would, and prints
// the resulting content and metadata. It is the quickest way to check that an
// R Markdown post knits and that its header parses.
//
// The readers live in the knit-readers crate; settings come from knit-config.
// This crate only wires the two together and formats output.
//
// Usage:
//  knit <path>                            - Read a document (default)
//  knit read <path> [--format json|html]  - Same as above (explicit)
//  knit read <post.Rmd> --explain         - Show the knitr program for a post instead of running it
//  knit readers                           - List extensions and their readers
//  knit config                            - Print the resolved settings
//
// Settings are layered: built-in defaults, the --profile overlay, ./site.toml if
// present, then --config <PATH>.

use clap::{Arg, ArgAction, Command, ValueHint};
use knit_config::{Loader, Profile, Settings};
use knit_readers::{ReadError, Reader, ReaderRegistry, RmdReader};
use std::path::Path;
use tracing::warn;
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &["read", "readers", "config", "help"];

fn build_cli() -> Command {
    Command::new("knit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Read site documents, including R Markdown knitted with knitr")
        .long_about(
            "knit reads site documents into HTML content and metadata.\n\n\
            Commands:\n  \
            - read:    Read a document and print its content and metadata\n  \
            - readers: List the registered readers\n  \
            - config:  Print the resolved site settings\n\n\
            R Markdown (.Rmd) needs Rscript with the knitr package installed.\n\
            Set KNIT_RSCRIPT_BIN or knitr.rscript in site.toml to pick a specific Rscript.\n\n\
            Examples:\n  \
            knit content/posts/hello.md                 # JSON with metadata and content\n  \
            knit read content/posts/lm.Rmd --format html\n  \
            knit read content/posts/lm.Rmd --explain    # Show the knitr program\n  \
            knit config --profile production",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a site.toml settings file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("profile")
                .long("profile")
                .value_name("PROFILE")
                .help("Build profile: dev or production")
                .default_value("dev")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log debug output to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("read")
                .about("Read a document (default command)")
                .long_about(
                    "Read a document with the reader registered for its extension.\n\n\
                    Output is JSON with `metadata` and `content` keys, or only the\n\
                    HTML content with --format html.\n\n\
                    Examples:\n  \
                    knit read content/posts/hello.md\n  \
                    knit read content/posts/lm.Rmd --format html\n  \
                    knit content/posts/hello.md                 # 'read' is optional",
                )
                .arg(
                    Arg::new("path")
                        .help("Document to read")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .help("Output format")
                        .value_parser(["json", "html"])
                        .default_value("json"),
                )
                .arg(
                    Arg::new("explain")
                        .long("explain")
                        .help("Print the knitr program for an R Markdown source instead of reading it")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("readers").about("List file extensions and their readers"))
        .subcommand(Command::new("config").about("Print the resolved site settings as JSON"))
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&args) {
        Ok(m) => m,
        Err(e) => {
            // A bare path means "read"
            if args.len() > 1 && !args[1].starts_with('-') && !SUBCOMMANDS.contains(&args[1].as_str())
            {
                let mut new_args = vec![args[0].clone(), "read".to_string()];
                new_args.extend_from_slice(&args[1..]);

                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    init_tracing(matches.get_flag("verbose"));

    let profile = matches
        .get_one::<String>("profile")
        .map(|s| s.as_str())
        .unwrap_or("dev");
    let settings = load_cli_settings(
        profile,
        matches.get_one::<String>("config").map(|s| s.as_str()),
    );

    match matches.subcommand() {
        Some(("read", sub_matches)) => {
            let path = sub_matches
                .get_one::<String>("path")
                .expect("path is required");
            let format = sub_matches
                .get_one::<String>("format")
                .map(|s| s.as_str())
                .unwrap_or("json");
            if sub_matches.get_flag("explain") {
                handle_explain_command(Path::new(path), &settings);
            } else {
                handle_read_command(Path::new(path), format, &settings);
            }
        }
        Some(("readers", _)) => handle_readers_command(&settings),
        Some(("config", _)) => handle_config_command(&settings),
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Handle the read command
fn handle_read_command(path: &Path, format: &str, settings: &Settings) {
    if settings.is_ignored(path) {
        warn!(path = %path.display(), "path matches ignore_files; reading it anyway");
    }

    let registry = ReaderRegistry::with_builtin_plugins(settings);
    let output = registry.read(path).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        if let ReadError::NoReader { .. } = e {
            if RmdReader::EXTENSIONS
                .iter()
                .any(|ext| path.extension().is_some_and(|p| p == *ext))
            {
                eprintln!(
                    "R Markdown needs Rscript with knitr, and 'knitr' in the plugins setting."
                );
            }
        }
        std::process::exit(1);
    });

    match format {
        "html" => print!("{}", output.content),
        _ => {
            let json = serde_json::to_string_pretty(&output).unwrap_or_else(|e| {
                eprintln!("Serialization error: {e}");
                std::process::exit(1);
            });
            println!("{json}");
        }
    }
}

/// Handle read --explain
fn handle_explain_command(path: &Path, settings: &Settings) {
    let reader = RmdReader::from_settings(settings).unwrap_or_else(|e| {
        eprintln!("Error resolving content root: {e}");
        std::process::exit(1);
    });

    if !reader.claims(path) {
        eprintln!(
            "Error: --explain only applies to R Markdown sources ({})",
            RmdReader::EXTENSIONS.join(", ")
        );
        std::process::exit(1);
    }

    let job = reader.job_for(path).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    println!("# working directory: {}", job.working_dir.display());
    println!("# output: {}", job.output_path().display());
    print!("{}", job.knit_script());
}

/// Handle the readers command
fn handle_readers_command(settings: &Settings) {
    let registry = ReaderRegistry::with_builtin_plugins(settings);

    println!("Registered readers:\n");
    for extension in registry.list_extensions() {
        if let Some(reader) = registry.get(&extension) {
            println!("  {extension:<10} {:<10} {}", reader.name(), reader.description());
        }
    }

    if settings.has_plugin("knitr") && !registry.has("Rmd") {
        println!("\nDisabled:\n");
        println!(
            "  {:<10} {:<10} knitr engine not available",
            RmdReader::EXTENSIONS.join(", "),
            "rmd"
        );
    }
}

/// Handle the config command
fn handle_config_command(settings: &Settings) {
    let json = serde_json::to_string_pretty(settings).unwrap_or_else(|e| {
        eprintln!("Serialization error: {e}");
        std::process::exit(1);
    });
    println!("{json}");
}

fn load_cli_settings(profile: &str, explicit_path: Option<&str>) -> Settings {
    let profile: Profile = profile.parse().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let loader = Loader::for_profile(profile).with_optional_file("site.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load settings: {err}");
        std::process::exit(1);
    })
}
