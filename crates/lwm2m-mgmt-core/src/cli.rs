//! Shared argument-parsing and session-bootstrap plumbing for the
//! `server-*` CLI tools.
//!
//! Each tool is a thin mapping from command-line flags to one operation;
//! this module exists only to avoid re-typing the flags every `server-*`
//! binary has in common (`--ipcAddress`, `--ipcPort`, `--clientID`,
//! `--verbose`, `--debug`) and the one-line-per-failed-path diagnostic
//! format. No `clap`/`argh` dependency is introduced — `env::args()` is
//! parsed by hand, the same shape every binary in this crate follows.

use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::session::Session;
use crate::tree::PathResult;
use std::env;

/// Flags common to every `server-*` tool, plus whatever positional
/// arguments (paths) were left over.
pub struct CommonArgs {
    pub ipc_address: String,
    pub ipc_port: u16,
    pub client_id: Option<String>,
    pub verbose: bool,
    pub debug: bool,
    pub positionals: Vec<String>,
}

/// Parses the common flags out of `args`, leaving everything else
/// (positional paths, tool-specific flags) in [`CommonArgs::positionals`]
/// for the caller to interpret.
pub fn parse_common(args: impl Iterator<Item = String>) -> CommonArgs {
    let mut common = CommonArgs {
        ipc_address: "127.0.0.1".to_string(),
        ipc_port: crate::config::DEFAULT_IPC_PORT,
        client_id: None,
        verbose: false,
        debug: false,
        positionals: Vec::new(),
    };

    let mut args = args.peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--ipcAddress" => {
                if let Some(v) = args.next() {
                    common.ipc_address = v;
                }
            }
            "--ipcPort" => {
                if let Some(v) = args.next() {
                    if let Ok(port) = v.parse() {
                        common.ipc_port = port;
                    }
                }
            }
            "--clientID" => {
                common.client_id = args.next();
            }
            "--verbose" => common.verbose = true,
            "--debug" => common.debug = true,
            other => common.positionals.push(other.to_string()),
        }
    }
    common
}

/// Installs a `tracing_subscriber` formatter at a level matching
/// `--verbose`/`--debug` — the library itself never installs a global
/// subscriber, only the binaries do.
pub fn init_logging(common: &CommonArgs) {
    let level = if common.debug {
        tracing::Level::DEBUG
    } else if common.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
}

/// Builds a [`Session`] from the common flags and connects it.
pub fn connect(common: &CommonArgs) -> Result<Session, CoreError> {
    let config = SessionConfig::new()
        .with_ipc_address(common.ipc_address.clone())
        .with_ipc_port(common.ipc_port);
    let session = Session::new(config);
    session.connect(None)?;
    Ok(session)
}

/// Required client ID for tools that operate on exactly one client, via
/// the `--clientID` flag.
pub fn require_client_id(common: &CommonArgs) -> Result<String, String> {
    common.client_id.clone().ok_or_else(|| "--clientID is required".to_string())
}

/// One-line human diagnostic per failed path, plus its symbolic code.
pub fn print_path_result(path: &str, result: PathResult) {
    if result.is_success() {
        println!("{path}: Success");
        return;
    }
    match result.lwm2m_error {
        Some(code) => eprintln!("{path}: {} ({code})", result.error),
        None => eprintln!("{path}: {}", result.error),
    }
}

/// Reads the `program_name: args()[1..]` convention every `server-*` main
/// uses, already split on the common flags.
pub fn args_after_program_name() -> CommonArgs {
    parse_common(env::args().skip(1))
}
