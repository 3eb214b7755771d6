use std::{
    env,
    io::{Write, stderr, stdout},
    path::PathBuf,
    process,
    str::FromStr,
};

use argparse::{ArgumentParser, Print, Store, StoreOption, StoreTrue};

use crate::{device::DEFAULT_DEBUGFS_ROOT, pstate::Selection};

const DESCRIPTION: &str = "Simple utility tool for changing nouveau pstates. \
    Needs elevated permissions. USE AT YOUR OWN RISK!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    // List all available pstates
    #[default]
    List,
    // Set a specific pstate
    Set,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(Self::List),
            "set" => Ok(Self::Set),
            _ => Err(format!("unknown command: \"{s}\"")),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct ArgsOptions {
    pub command: Command,
    pub device: u32,
    // None means the user is prompted with the list of pstates
    pub selection: Option<Selection>,
    pub assume_yes: bool,
    pub json: bool,
    pub debugfs_root: PathBuf,
}

impl ArgsOptions {
    pub fn parse() -> Self {
        let args = env::args().collect();

        match Self::parse_from(args, &mut stdout(), &mut stderr()) {
            Ok(options) => options,
            Err(code) => process::exit(code),
        }
    }

    // Parse the given arguments, the first one being the program name.
    // On failure, or after printing the help or version, the exit code
    // is returned.
    pub fn parse_from(
        args: Vec<String>,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<Self, i32> {
        let mut options = ArgsOptions::default();

        {
            let mut parser = ArgumentParser::new();
            parser.set_description(DESCRIPTION);

            parser
                .refer(&mut options.command)
                .add_argument("command", Store, "list | set")
                .required();

            // Device index
            parser.refer(&mut options.device).add_option(
                &["-d", "--device"],
                Store,
                "The device id, defaults to 0",
            );

            // Pstate selection
            parser.refer(&mut options.selection).add_option(
                &["-p", "--pstate"],
                StoreOption,
                "performance | save-energy | id:<id> | val:<value>, \
                 if omitted you will be prompted with a list to choose from",
            );

            parser.refer(&mut options.assume_yes).add_option(
                &["-y", "--yes"],
                StoreTrue,
                "Don't ask before setting a value the device doesn't list",
            );

            parser.refer(&mut options.json).add_option(
                &["-j", "--json"],
                StoreTrue,
                "List the pstates as Json",
            );

            parser.refer(&mut options.debugfs_root).add_option(
                &["--debugfs"],
                Store,
                "Mount point of the debug filesystem",
            );

            // Show program version
            parser.add_option(
                &["-V", "--version"],
                Print(format!("noupstate v{}", env!("CARGO_PKG_VERSION"))),
                "Show the program version",
            );

            parser.parse(args, out, err)?;
        }

        Ok(options)
    }
}

impl Default for ArgsOptions {
    fn default() -> Self {
        Self {
            command: Command::default(),
            device: 0,
            selection: None,
            assume_yes: false,
            json: false,
            debugfs_root: PathBuf::from(DEFAULT_DEBUGFS_ROOT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pstate::Profile;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<ArgsOptions, i32> {
        let args = std::iter::once("noupstate")
            .chain(args.iter().copied())
            .map(String::from)
            .collect();

        ArgsOptions::parse_from(args, &mut Vec::new(), &mut Vec::new())
    }

    #[test]
    fn list_defaults() {
        assert_eq!(parse(&["list"]), Ok(ArgsOptions::default()));
    }

    #[test]
    fn set_with_options() {
        let options = parse(&["set", "-d", "1", "-p", "val:0f", "-y"]).unwrap();

        assert_eq!(options.command, Command::Set);
        assert_eq!(options.device, 1);
        assert_eq!(options.selection, Some(Selection::ByValue(0x0f)));
        assert!(options.assume_yes);
    }

    #[test]
    fn set_profile_and_root() {
        let options =
            parse(&["set", "--pstate", "save-energy", "--debugfs", "/tmp/debug"]).unwrap();

        assert_eq!(
            options.selection,
            Some(Selection::Profile(Profile::SaveEnergy))
        );
        assert_eq!(options.debugfs_root, PathBuf::from("/tmp/debug"));
    }

    #[test]
    fn invalid_arguments() {
        assert!(matches!(parse(&[]), Err(code) if code != 0));
        assert!(matches!(parse(&["frobnicate"]), Err(code) if code != 0));
        assert!(matches!(parse(&["set", "-p", "fastest"]), Err(code) if code != 0));
        assert!(matches!(parse(&["list", "-d", "-1"]), Err(code) if code != 0));
    }

    #[test]
    fn help_exits_successfully() {
        assert_eq!(parse(&["-h"]), Err(0));
    }
}
