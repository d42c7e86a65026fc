//! `server-list-clients`: connects and prints every registered client and
//! its registered entity paths.

use lwm2m_mgmt_core::cli;
use lwm2m_mgmt_core::operation::ListClientsOperation;
use lwm2m_mgmt_core::response::PerformOutcome;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let common = cli::args_after_program_name();
    cli::init_logging(&common);

    let session = match cli::connect(&common) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("connect failed: {e}");
            return 1;
        }
    };

    let (outcome, response) = match ListClientsOperation::new(&session).perform(None) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("ListClients failed: {e}");
            return 1;
        }
    };

    for client_id in response.client_ids() {
        println!("{client_id}");
        let client = response.client(client_id).expect("id came from client_ids()");
        for path in client.registered_entities() {
            println!("  {path}");
        }
    }

    match outcome {
        PerformOutcome::Success => 0,
        PerformOutcome::PartialFailure => 1,
    }
}
