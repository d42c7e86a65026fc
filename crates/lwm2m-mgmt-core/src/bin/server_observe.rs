//! `server-observe`: subscribes to changes at one or more paths on a
//! client and prints each notification as it arrives. Grounded on
//! `original_source/api/examples/server-event-example.c`'s long-running
//! `Process`/`DispatchCallbacks` loop, carried over as
//! [`lwm2m_mgmt_core::Session::run_until`].
//!
//! Usage: `server-observe --clientID ID [PATHS]...`
//!
//! Runs until killed; each change prints `PATH: ChangeType[ = value]`.

use lwm2m_mgmt_core::cli;
use lwm2m_mgmt_core::operation::ObserveOperation;
use lwm2m_mgmt_core::response::PerformOutcome;
use lwm2m_mgmt_core::{Observation, Path, Timeout};

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
        eprintln!("specify one or more paths to observe");
        return 1;
    }

    let session = match cli::connect(&common) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("connect failed: {e}");
            return 1;
        }
    };

    let mut observations = Vec::new();
    let mut op = ObserveOperation::new(&session);
    for raw in &common.positionals {
        let path = match Path::parse(raw) {
            Ok(path) => path,
            Err(e) => {
                eprintln!("{raw}: {e}");
                return 1;
            }
        };
        let client_id_owned = client_id.clone();
        let observation = Observation::new(client_id.clone(), path, move |changes| {
            let change_type = changes.change_type(&path);
            match (change_type, changes.value(&path)) {
                (Some(kind), Some(value)) => println!("{client_id_owned} {path}: {kind:?} = {value:?}"),
                (Some(kind), None) => println!("{client_id_owned} {path}: {kind:?}"),
                (None, _) => {}
            }
        });
        if let Err(e) = op.add_observation(&observation) {
            eprintln!("{raw}: {e}");
            return 1;
        }
        observations.push(observation);
    }

    let (outcome, response) = match op.perform(None) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Observe failed: {e}");
            return 1;
        }
    };
    for raw in &common.positionals {
        if let Ok(path) = Path::parse(raw) {
            cli::print_path_result(raw, response.path_result(&client_id, &path));
        }
    }
    if outcome == PerformOutcome::PartialFailure {
        return 1;
    }

    // Keep receiving notifications until the process is killed; `observations`
    // must stay alive for the whole loop, since dropping the last strong
    // handle is what frees the registration.
    session
        .run_until(Timeout::from_millis(1000), || false)
        .unwrap_or_else(|e| eprintln!("notification loop ended: {e}"));
    drop(observations);
    0
}
