//! clap definition of the `xfer` command line.

use std::ffi::OsString;
use std::num::NonZeroUsize;

use clap::builder::OsStringValueParser;
use clap::{Arg, ArgAction, Command, value_parser};
use compress::MAX_BLOCK_SIZE;
use logging::LogLevel;
use protocol::constants::DEFAULT_PORT;

pub(crate) const PROGRAM_NAME: &str = "xfer";

/// Value of `--progress` when given without a tick count.
pub(crate) const DEFAULT_TICKS_ARG: &str = "40";

pub(crate) fn clap_command(program_name: &'static str) -> Command {
    Command::new(program_name)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg_required_else_help(false)
        .arg(
            Arg::new("help")
                .long("help")
                .help("Show this help message and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .short('V')
                .help("Output version information and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("target")
                .long("target")
                .short('t')
                .value_name("DIR")
                .default_value(".")
                .value_parser(OsStringValueParser::new()),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .short('h')
                .value_name("HOST")
                .default_value("localhost"),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .value_name("PORT")
                .value_parser(value_parser!(u16)),
        )
        .arg(
            Arg::new("block-size")
                .long("block-size")
                .short('B')
                .value_name("BYTES")
                .value_parser(parse_block_size),
        )
        .arg(
            Arg::new("overwrite")
                .long("overwrite")
                .short('o')
                .action(ArgAction::SetTrue)
                .overrides_with("copy"),
        )
        .arg(
            Arg::new("copy")
                .long("copy")
                .short('O')
                .action(ArgAction::SetTrue)
                .overrides_with("overwrite"),
        )
        .arg(
            Arg::new("compress")
                .long("compress")
                .short('z')
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("compress-level")
                .long("compress-level")
                .short('Z')
                .value_name("N")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i64)),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .short('l')
                .value_name("LEVEL")
                .value_parser(LogLevel::parse),
        )
        .arg(
            Arg::new("allow")
                .long("allow")
                .short('i')
                .value_name("PREFIX")
                .action(ArgAction::Append)
                .value_delimiter(','),
        )
        .arg(
            Arg::new("modify-window")
                .long("modify-window")
                .value_name("MS")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("progress")
                .long("progress")
                .short('b')
                .value_name("TICKS")
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value(DEFAULT_TICKS_ARG)
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("cygwin")
                .long("cygwin")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("paths")
                .value_name("PATHS")
                .action(ArgAction::Append)
                .num_args(0..)
                .value_parser(OsStringValueParser::new()),
        )
}

pub(crate) fn help_text() -> String {
    format!(
        "\
Usage: {PROGRAM_NAME} [OPTIONS] [PATHS]...

Without PATHS, {PROGRAM_NAME} receives into the target directory until
interrupted. With PATHS, it sends every path (directories recursively) to a
receiver.

Options:
  -t, --target DIR           Receiver: directory to write into [default: .]
  -h, --host HOST            Sender: receiver host [default: localhost]
  -p, --port PORT            TCP port [default: {DEFAULT_PORT}]
  -B, --block-size BYTES     Chunk and frame size, 1 to {MAX_BLOCK_SIZE}
                             [default: 16384]
  -o, --overwrite            Overwrite existing files; a sender forces this
                             on the receiver (cancels -O)
  -O, --copy                 Receiver: write a suffixed copy next to existing
                             files (cancels -o)
  -z, --compress             Compress the stream; both sides must agree
  -Z, --compress-level N     1 fast, 5 default, 9 best; other values round
                             up to the next of these
  -l, --log-level LEVEL      SEVERE, WARNING, INFO, CONFIG, FINE, FINER or
                             FINEST [default: INFO]
  -i, --allow PREFIX[,...]   Receiver: accept peers whose address starts
                             with one of the prefixes
      --modify-window MS     Tolerated modification time drift [default: 1000]
  -b, --progress[=TICKS]     Print a progress bar per file [default: {DEFAULT_TICKS_ARG}]
      --cygwin               Translate /cygdrive/ paths to Windows paths
  -V, --version              Output version information and exit
      --help                 Show this help message and exit
"
    )
}

fn parse_block_size(value: &str) -> Result<NonZeroUsize, String> {
    let size: NonZeroUsize = value.trim().parse().map_err(|error| format!("{error}"))?;
    if size.get() > MAX_BLOCK_SIZE {
        return Err(format!("must not exceed {MAX_BLOCK_SIZE} bytes"));
    }
    Ok(size)
}

pub(crate) fn version_text() -> String {
    format!(
        "{PROGRAM_NAME} {}\nprotocol {}\n",
        env!("CARGO_PKG_VERSION"),
        protocol::constants::VERSION
    )
}

pub(crate) fn normalize_arguments<I, S>(arguments: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();
    if args.is_empty() {
        args.push(OsString::from(PROGRAM_NAME));
    }
    args
}
