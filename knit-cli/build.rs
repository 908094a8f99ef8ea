use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of build_cli() in src/main.rs
// Build scripts can't reach into src/, so the command tree is repeated here
fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("knit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Read site documents, including R Markdown knitted with knitr")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("profile")
                .long("profile")
                .value_parser(["dev", "production"])
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("read")
                .about("Read a document")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_parser(["json", "html"]),
                )
                .arg(
                    Arg::new("explain")
                        .long("explain")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("readers").about("List file extensions and their readers"))
        .subcommand(Command::new("config").about("Print the resolved site settings as JSON"));

    generate_to(Bash, &mut cmd, "knit", &outdir)?;
    generate_to(Zsh, &mut cmd, "knit", &outdir)?;
    generate_to(Fish, &mut cmd, "knit", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
