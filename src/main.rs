/*!
 * Command-line interface for davbrowse
 */

use std::fs;
use std::io::{self, Write};

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use davbrowse::config::{Args, Config};
use davbrowse::handler::Browser;
use davbrowse::tree::FsTree;

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Logs go to stderr so stdout can carry the page
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if let Some(shell) = args.generate {
        let mut command = Args::command();
        generate(shell, &mut command, "davbrowse", &mut io::stdout());
        return Ok(());
    }

    // Create and validate configuration
    let config = Config::from_args(&args)?;
    config.validate()?;

    let tree = FsTree::new(&args.directory_path)?;
    let browser = Browser::new(tree, config)?;

    let output = match &args.asset {
        Some(name) => browser.serve_asset(name)?.body,
        None => match browser.generate_index(&args.path) {
            Ok(html) => html.into_bytes(),
            Err(e) if e.is_not_found() => {
                eprintln!("No such node: {}", args.path);
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        },
    };

    match &args.output {
        Some(path) => fs::write(path, output)?,
        None => io::stdout().write_all(&output)?,
    }

    Ok(())
}
