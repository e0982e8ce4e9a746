use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use keepsake_codec::CodecKind;
use keepsake_types::StorageKey;

#[derive(Parser)]
#[command(
    name = "keepsake",
    about = "Keepsake: persist and recover task results by key",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Home directory; overrides the config file and KEEPSAKE_HOME
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Result directory; collapses to <home>/results when inside home
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Use the directory as given without creating it
    #[arg(long, global = true)]
    pub no_validate: bool,

    /// Key template, e.g. "{flow}/{task}.bin"
    #[arg(long, global = true)]
    pub template: Option<String>,

    #[arg(long, global = true)]
    pub codec: Option<CodecArg>,

    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum CodecArg {
    Bincode,
    Json,
}

impl From<CodecArg> for CodecKind {
    fn from(arg: CodecArg) -> Self {
        match arg {
            CodecArg::Bincode => CodecKind::Bincode,
            CodecArg::Json => CodecKind::Json,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the effective result directory
    Root,
    /// Print the key a write would use, without writing
    Format(FormatArgs),
    /// Store a string value and print its key
    Write(WriteArgs),
    /// Print the value stored at a key
    Read(KeyArgs),
    /// Check whether a key holds a result; exits 1 when absent
    Exists(KeyArgs),
}

#[derive(Args)]
pub struct FormatArgs {
    /// Template parameter as name=value; repeatable
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

#[derive(Args)]
pub struct WriteArgs {
    pub value: String,
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

#[derive(Args)]
pub struct KeyArgs {
    pub key: StorageKey,
}

/// Split `name=value` at the first `=`.
pub fn parse_param(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, _)) if name.is_empty() => Err(format!("missing parameter name in `{s}`")),
        Some((name, value)) => Ok((name.to_string(), value.to_string())),
        None => Err(format!("expected name=value, got `{s}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_root() {
        let cli = Cli::try_parse_from(["keepsake", "root"]).unwrap();
        assert!(matches!(cli.command, Command::Root));
        assert_eq!(cli.output, OutputFormat::Text);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn parse_format_params() {
        let cli = Cli::try_parse_from([
            "keepsake", "format", "-p", "flow=etl", "--param", "task=load",
        ])
        .unwrap();
        if let Command::Format(args) = cli.command {
            assert_eq!(
                args.params,
                vec![
                    ("flow".to_string(), "etl".to_string()),
                    ("task".to_string(), "load".to_string()),
                ]
            );
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_write() {
        let cli = Cli::try_parse_from(["keepsake", "write", "hello", "-p", "name=a"]).unwrap();
        if let Command::Write(args) = cli.command {
            assert_eq!(args.value, "hello");
            assert_eq!(args.params.len(), 1);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_read_validates_key() {
        let cli = Cli::try_parse_from(["keepsake", "read", "etl/load.bin"]).unwrap();
        if let Command::Read(args) = cli.command {
            assert_eq!(args.key.as_str(), "etl/load.bin");
        } else { panic!("wrong command"); }

        assert!(Cli::try_parse_from(["keepsake", "read", "../escape"]).is_err());
        assert!(Cli::try_parse_from(["keepsake", "exists", "/abs"]).is_err());
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "keepsake", "exists", "k", "--home", "/h", "--dir", "/d", "--no-validate",
            "--template", "{name}", "--codec", "json", "--output", "json", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.home, Some(PathBuf::from("/h")));
        assert_eq!(cli.dir, Some(PathBuf::from("/d")));
        assert!(cli.no_validate);
        assert_eq!(cli.template.as_deref(), Some("{name}"));
        assert_eq!(cli.codec, Some(CodecArg::Json));
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn codec_arg_maps_to_kind() {
        assert_eq!(CodecKind::from(CodecArg::Bincode), CodecKind::Bincode);
        assert_eq!(CodecKind::from(CodecArg::Json), CodecKind::Json);
    }

    #[test]
    fn param_parsing() {
        assert_eq!(parse_param("a=b"), Ok(("a".into(), "b".into())));
        assert_eq!(parse_param("a=b=c"), Ok(("a".into(), "b=c".into())));
        assert_eq!(parse_param("a="), Ok(("a".into(), String::new())));
        assert!(parse_param("=b").is_err());
        assert!(parse_param("ab").is_err());
    }

    #[test]
    fn bad_param_is_rejected() {
        assert!(Cli::try_parse_from(["keepsake", "format", "-p", "noequals"]).is_err());
    }
}
