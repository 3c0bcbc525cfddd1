use crate::walker::WalkMode;
use clap::error::ErrorKind;
use clap::{Args, Parser};
use std::path::PathBuf;
use std::process;

/// Folder selection flags shared by the artwork tools.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = true)]
pub struct TargetArgs {
    /// Process a specific folder (album or CD folder)
    #[arg(short, long, value_name = "PATH", conflicts_with_all = ["all", "cd"])]
    pub input: Option<PathBuf>,

    /// Process the entire music library
    #[arg(short, long)]
    pub all: bool,

    /// Process CD folders (e.g. CD 1, CD 2)
    #[arg(short, long)]
    pub cd: bool,
}

impl TargetArgs {
    #[must_use]
    pub fn mode(&self) -> WalkMode {
        match &self.input {
            Some(folder) => WalkMode::Single(folder.clone()),
            None if self.cd => WalkMode::Discs,
            None => WalkMode::Library,
        }
    }
}

/// Exit status for a command-line error. Running a tool without any flags
/// prints the help and exits with 1, everything else keeps clap's status.
#[must_use]
pub fn exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 1,
        _ => err.exit_code(),
    }
}

/// Parse the process arguments, exiting with [`exit_code`] on error.
#[must_use]
pub fn parse_args<P: Parser>() -> P {
    P::try_parse().unwrap_or_else(|err| {
        let _ = err.print();
        process::exit(exit_code(&err));
    })
}

/// Usage examples for a tool's `--help`.
#[must_use]
pub fn examples(tool: &str) -> String {
    format!(
        r#"EXAMPLES:
    Process a specific folder:
    {tool} -i "/music/Zac Brown Band/Uncaged (2012)/CD 1/"

    Process the entire library:
    {tool} -a

    Process CD folders in the entire library:
    {tool} -a -c"#
    )
}
