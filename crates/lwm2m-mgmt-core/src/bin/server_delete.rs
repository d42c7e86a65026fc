//! `server-delete`: deletes object instances on a client. A resource or
//! object path is accepted by the builder but the daemon answers
//! `MethodNotAllowed` — only object-instance paths succeed.
//!
//! Usage: `server-delete --clientID ID [PATHS]...`

use lwm2m_mgmt_core::cli;
use lwm2m_mgmt_core::operation::DeleteOperation;
use lwm2m_mgmt_core::response::PerformOutcome;
use lwm2m_mgmt_core::Path;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let common = cli::args_after_program_name();
    cli::init_logging(&common);

    let client_id = match cli::require_client_id(&common) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };
    if common.positionals.is_empty() {
        eprintln!("specify one or more object-instance paths");
        return 1;
    }

    let session = match cli::connect(&common) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("connect failed: {e}");
            return 1;
        }
    };

    let mut op = DeleteOperation::new(&session);
    let mut paths = Vec::new();
    for raw in &common.positionals {
        match Path::parse(raw) {
            Ok(path) => {
                op.add_path(&client_id, path);
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
            eprintln!("Delete failed: {e}");
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
