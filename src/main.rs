//! Command line shell around the compiler.
//!
//! ```bash
//! # compile once into output.html
//! atml app.atml
//!
//! # recompile whenever app.atml changes
//! atml app.atml -dev
//! ```

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use atml::{config::Config, compile_program, watch::Watcher};

#[derive(Parser, Debug)]
#[command(name = "atml", version, about = "Compile an atml screen description into static HTML")]
struct Cli {
    /// Source file to compile
    source: PathBuf,

    /// Recompile whenever the source changes (also accepted as `-dev`)
    #[arg(long)]
    dev: bool,

    /// Output file, overriding the config
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file, defaults to atml.yaml in the working directory when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the expanded syntax tree to stderr
    #[arg(long)]
    print_tree: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| if arg == "-dev" { OsString::from("--dev") } else { arg })
        .collect()
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "atml=info",
        1 => "atml=debug",
        _ => "atml=trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::discover(cli.config.as_deref(), Path::new("."))?;

    if let Some(output) = &cli.output {
        config.output = output.clone();
    }

    config.print_tree |= cli.print_tree;

    Ok(config)
}

/// Compiles `source` and writes the document. Nothing is written if compilation fails.
fn build(source: &Path, config: &Config) -> Result<()> {
    let text = fs::read_to_string(source)
        .with_context(|| format!("failed to read {}", source.display()))?;

    let compilation = compile_program(&text)?;

    if config.print_tree {
        eprint!("{}", compilation.program);
    }

    fs::write(&config.output, &compilation.html)
        .with_context(|| format!("failed to write {}", config.output.display()))?;

    info!(
        output = %config.output.display(),
        warnings = compilation.warnings.len(),
        "compiled {}",
        source.display(),
    );

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    init_tracing(cli.verbose);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            error!("{:#}", err);
            return ExitCode::FAILURE;
        }
    };

    let result = build(&cli.source, &config);

    if !cli.dev {
        return match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                error!("{:#}", err);
                ExitCode::FAILURE
            }
        };
    }

    if let Err(err) = result {
        warn!("{:#}", err);
    }

    info!(interval_ms = config.watch_interval_ms, "watching {} for changes", cli.source.display());

    Watcher::new(&cli.source, config.watch_interval())
        .run(|| {
            if let Err(err) = build(&cli.source, &config) {
                warn!("{:#}", err);
            }
        })
        .await;

    ExitCode::SUCCESS
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_dev_flag_is_normalized() {
        let args = normalize_args(["atml", "app.atml", "-dev"].map(OsString::from));
        let cli = Cli::parse_from(args);

        assert!(cli.dev);
        assert_eq!(cli.source, PathBuf::from("app.atml"));
    }

    #[test]
    fn parses_every_flag() {
        let cli = Cli::parse_from(["atml", "app.atml", "-o", "site.html", "--print-tree", "-vv"]);

        assert!(!cli.dev);
        assert_eq!(cli.output, Some(PathBuf::from("site.html")));
        assert!(cli.print_tree);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        fs::write(&path, "output: from-file.html\nprint_tree: true\nwatch_interval_ms: 50\n").unwrap();

        let mut args = vec![OsString::from("atml"), OsString::from("app.atml"), OsString::from("--config")];
        args.push(path.into_os_string());
        args.extend(["-o", "site.html"].map(OsString::from));

        let config = load_config(&Cli::parse_from(args)).unwrap();

        assert_eq!(config.output, PathBuf::from("site.html"));
        assert!(config.print_tree);
        assert_eq!(config.watch_interval_ms, 50);
    }

    #[test]
    fn failed_build_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("app.atml");
        let output = dir.path().join("out.html");
        fs::write(&source, "@load missing\n").unwrap();

        let config = Config { output: output.clone(), ..Config::default() };
        let err = build(&source, &config).unwrap_err();

        assert!(err.to_string().contains("missing"));
        assert!(!output.exists());
    }

    #[test]
    fn successful_build_overwrites_output() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("app.atml");
        let output = dir.path().join("out.html");
        fs::write(&source, "@title \"Demo\"\n").unwrap();
        fs::write(&output, "stale").unwrap();

        let config = Config { output: output.clone(), ..Config::default() };
        build(&source, &config).unwrap();

        let html = fs::read_to_string(&output).unwrap();
        assert!(html.contains("<title>Demo</title>"));
        assert!(!html.contains("stale"));
    }
}
