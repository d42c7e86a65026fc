//! `server-discover`: reads back the write-attributes registered at one or
//! more paths on a client.
//!
//! Usage: `server-discover --clientID ID [PATHS]...`

use lwm2m_mgmt_core::cli;
use lwm2m_mgmt_core::operation::DiscoverOperation;
use lwm2m_mgmt_core::response::PerformOutcome;
use lwm2m_mgmt_core::tree::AttributeLink;
use lwm2m_mgmt_core::Path;

const LINKS: [AttributeLink; 5] = [
    AttributeLink::Pmin,
    AttributeLink::Pmax,
    AttributeLink::Gt,
    AttributeLink::Lt,
    AttributeLink::Stp,
];

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
        eprintln!("specify one or more paths");
        return 1;
    }

    let session = match cli::connect(&common) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("connect failed: {e}");
            return 1;
        }
    };

    let mut op = DiscoverOperation::new(&session);
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
            eprintln!("Discover failed: {e}");
            return 1;
        }
    };

    let Some(client) = response.client(&client_id) else {
        eprintln!("{client_id}: ClientNotFound");
        return 1;
    };
    for path in &paths {
        cli::print_path_result(&path.to_string(), response.path_result(&client_id, path));
        for link in LINKS {
            if let Some(value) = client.attribute(path, link) {
                println!("  {link:?}={value}");
            }
        }
    }

    match outcome {
        PerformOutcome::Success => 0,
        PerformOutcome::PartialFailure => 1,
    }
}
