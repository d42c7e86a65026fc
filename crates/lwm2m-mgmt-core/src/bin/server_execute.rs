//! `server-execute`: invokes one or more executable resources on a client.
//! Grounded on `original_source/tools/awa-server-execute.c`.
//!
//! Usage: `server-execute --clientID ID [--stdin] [PATHS]...`
//!
//! With `--stdin`, the bytes read from standard input are passed as the
//! opaque argument payload to every path in the same invocation.

use lwm2m_mgmt_core::cli;
use lwm2m_mgmt_core::operation::ExecuteOperation;
use lwm2m_mgmt_core::response::PerformOutcome;
use lwm2m_mgmt_core::Path;
use std::io::Read;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let mut common = cli::args_after_program_name();
    cli::init_logging(&common);

    let mut use_stdin = false;
    common.positionals.retain(|arg| {
        if arg == "--stdin" {
            use_stdin = true;
            false
        } else {
            true
        }
    });

    let client_id = match cli::require_client_id(&common) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };
    if common.positionals.is_empty() {
        eprintln!("specify one or more resource paths");
        return 1;
    }

    let arguments = if use_stdin {
        let mut buf = Vec::new();
        if let Err(e) = std::io::stdin().read_to_end(&mut buf) {
            eprintln!("failed to read stdin: {e}");
            return 1;
        }
        Some(buf)
    } else {
        None
    };

    let session = match cli::connect(&common) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("connect failed: {e}");
            return 1;
        }
    };

    let mut op = ExecuteOperation::new(&session);
    let mut paths = Vec::new();
    for raw in &common.positionals {
        match Path::parse(raw) {
            Ok(path) => {
                op.add_path(&client_id, path, arguments.as_deref());
                paths.push(path);
            }
            Err(e) => {
                eprintln!("{raw}: {e}");
                return 1;
            }
        }
    }

    let (outcome, response) = match op.perform(None) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Execute failed: {e}");
            return 1;
        }
    };

    for path in &paths {
        cli::print_path_result(&path.to_string(), response.path_result(&client_id, path));
    }

    match outcome {
        PerformOutcome::Success => 0,
        PerformOutcome::PartialFailure => 1,
    }
}
