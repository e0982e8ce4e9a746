use std::io::Write;

use anyhow::Context;
use colored::Colorize;
use keepsake_store::{
    AnyResultStore, KeyTemplate, Params, ResultHandle, ResultStore, StoreConfig,
};
use serde_json::json;
use tracing::debug;

use crate::cli::*;

/// Build the store configuration: config file (or defaults), then
/// `KEEPSAKE_HOME`, then command-line flags.
pub fn load_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => StoreConfig::default(),
    }
    .apply_env();

    if let Some(home) = &cli.home {
        config.home_dir = home.clone();
    }
    if let Some(dir) = &cli.dir {
        config.directory = Some(dir.clone());
    }
    if cli.no_validate {
        config.validate_directory = false;
    }
    if let Some(template) = &cli.template {
        config.key_template = Some(
            KeyTemplate::parse(template)
                .with_context(|| format!("invalid key template `{template}`"))?,
        );
    }
    if let Some(codec) = cli.codec {
        config.codec = codec.into();
    }
    Ok(config)
}

/// Run one command. `Ok(false)` means it ran but reported a negative result.
pub fn run_command(cli: Cli, out: &mut impl Write) -> anyhow::Result<bool> {
    let config = load_config(&cli)?;
    debug!(home = %config.home_dir.display(), backend = %config.backend, "loaded configuration");
    let store = AnyResultStore::from_config(&config).context("opening result store")?;
    let output = cli.output;

    match cli.command {
        Command::Root => cmd_root(&store, output, out),
        Command::Format(args) => cmd_format(&store, args, output, out),
        Command::Write(args) => cmd_write(&store, args, output, out),
        Command::Read(args) => cmd_read(&store, args, output, out),
        Command::Exists(args) => cmd_exists(&store, args, output, out),
    }
}

fn params(pairs: Vec<(String, String)>) -> Params {
    pairs.into_iter().collect()
}

fn cmd_root(store: &AnyResultStore, output: OutputFormat, out: &mut impl Write) -> anyhow::Result<bool> {
    match output {
        OutputFormat::Text => writeln!(out, "{}", store.root().display())?,
        OutputFormat::Json => writeln!(
            out,
            "{}",
            json!({ "root": store.root(), "backend": store.backend() })
        )?,
    }
    Ok(true)
}

fn cmd_format(store: &AnyResultStore, args: FormatArgs, output: OutputFormat, out: &mut impl Write) -> anyhow::Result<bool> {
    let handle: ResultHandle<()> = store.format(&params(args.params))?;
    let key = handle.key().context("formatted handle has no key")?;
    match output {
        OutputFormat::Text => writeln!(out, "{key}")?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&handle.reference())?)?,
    }
    Ok(true)
}

fn cmd_write(store: &AnyResultStore, args: WriteArgs, output: OutputFormat, out: &mut impl Write) -> anyhow::Result<bool> {
    let handle = store.write(args.value, &params(args.params))?;
    let key = handle.key().context("written handle has no key")?;
    match output {
        OutputFormat::Text => writeln!(out, "{} Stored {}", "✓".green().bold(), key.as_str().yellow())?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&handle.reference())?)?,
    }
    Ok(true)
}

fn cmd_read(store: &AnyResultStore, args: KeyArgs, output: OutputFormat, out: &mut impl Write) -> anyhow::Result<bool> {
    let handle: ResultHandle<String> = store.read(&args.key)?;
    let value = handle.into_value().unwrap_or_default();
    match output {
        OutputFormat::Text => writeln!(out, "{value}")?,
        OutputFormat::Json => writeln!(out, "{}", json!({ "key": args.key, "value": value }))?,
    }
    Ok(true)
}

fn cmd_exists(store: &AnyResultStore, args: KeyArgs, output: OutputFormat, out: &mut impl Write) -> anyhow::Result<bool> {
    let present = store.exists(&args.key)?;
    match output {
        OutputFormat::Text if present => writeln!(out, "{}", "yes".green())?,
        OutputFormat::Text => writeln!(out, "{}", "no".red())?,
        OutputFormat::Json => writeln!(out, "{}", json!({ "key": args.key, "exists": present }))?,
    }
    Ok(present)
}
