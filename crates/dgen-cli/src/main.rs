use clap::{ArgAction, Parser, Subcommand};
use dgen_config::ManglingScheme;
use miette::{miette, Result};
use std::path::PathBuf;

mod commands;
mod logging;

use commands::Overrides;

#[derive(Parser)]
#[command(name = "dgen")]
#[command(author, version, about = "Generate D bindings from resolved C/C++ declarations")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit a D module from a JSON translation-unit dump
    Generate {
        /// Translation unit dumped by the front end
        unit: PathBuf,

        /// Configuration file (dgen.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output module path, `-` for stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Input path root; repeat for several
        #[arg(long = "path")]
        paths: Vec<PathBuf>,

        /// Source language standard (e.g. c99, c++17)
        #[arg(long = "std")]
        standard: Option<String>,

        /// Extra feature flag (e.g. attr-nogc); repeat for several
        #[arg(long = "extra")]
        extras: Vec<String>,

        /// Symbol mangling scheme
        #[arg(long)]
        mangling: Option<Mangling>,

        /// Leave out the fixed module preamble
        #[arg(long)]
        no_preamble: bool,
    },

    /// Emit into memory and report problems without writing anything
    Check {
        /// Translation unit dumped by the front end
        unit: PathBuf,

        /// Configuration file (dgen.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the declarations of a translation-unit dump
    Dump {
        /// Translation unit dumped by the front end
        unit: PathBuf,
    },

    /// Write a starting dgen.toml
    Init {
        /// Where to write the configuration
        #[arg(default_value = "dgen.toml")]
        output: PathBuf,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Mangling {
    /// Itanium C++ ABI
    Itanium,
    /// Microsoft Visual C++ ABI
    Microsoft,
}

impl From<Mangling> for ManglingScheme {
    fn from(value: Mangling) -> Self {
        match value {
            Mangling::Itanium => ManglingScheme::Itanium,
            Mangling::Microsoft => ManglingScheme::Microsoft,
        }
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            unit,
            config,
            output,
            paths,
            standard,
            extras,
            mangling,
            no_preamble,
        } => {
            let overrides = Overrides {
                output,
                paths,
                standard,
                extras,
                mangling: mangling.map(Into::into),
            };
            let config = commands::resolve_config(config.as_deref(), overrides)?;
            let code = commands::generate(&unit, &config, !no_preamble)?;
            commands::write_output(&config.output.path, &code)?;
        }

        Commands::Check { unit, config } => {
            let config = commands::resolve_config(config.as_deref(), Overrides::default())?;
            let code = commands::generate(&unit, &config, true)?;
            println!("{}: ok ({} bytes)", unit.display(), code.len());
        }

        Commands::Dump { unit } => {
            let unit = commands::load_unit(&unit)?;
            print!("{}", commands::dump(&unit));
        }

        Commands::Init { output, force } => {
            if output.exists() && !force {
                return Err(miette!(
                    "{} already exists (use --force to replace it)",
                    output.display()
                ));
            }
            let text = commands::default_config_text()?;
            commands::write_output(&output, &text)?;
            println!("Wrote {}", output.display());
        }
    }

    Ok(())
}
