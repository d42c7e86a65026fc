//! `server-write-attributes`: tunes notification thresholds on a resource.
//!
//! Usage: `server-write-attributes --clientID ID PATH:LINK=VALUE...`
//!
//! `LINK` is one of `pmin`, `pmax`, `gt`, `lt`, `stp`; `VALUE` is parsed as
//! an integer when possible, otherwise a float.

use lwm2m_mgmt_core::cli;
use lwm2m_mgmt_core::operation::WriteAttributesOperation;
use lwm2m_mgmt_core::response::PerformOutcome;
use lwm2m_mgmt_core::tree::AttributeLink;
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
        eprintln!("specify one or more PATH:LINK=VALUE entries");
        return 1;
    }

    let session = match cli::connect(&common) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("connect failed: {e}");
            return 1;
        }
    };

    let mut op = WriteAttributesOperation::new(&session);
    let mut paths = Vec::new();
    for raw in &common.positionals {
        let Some((head, value_str)) = raw.split_once('=') else {
            eprintln!("{raw}: expected PATH:LINK=VALUE");
            return 1;
        };
        let Some((path_str, link_str)) = head.split_once(':') else {
            eprintln!("{raw}: expected PATH:LINK=VALUE");
            return 1;
        };
        let path = match Path::parse(path_str) {
            Ok(path) => path,
            Err(e) => {
                eprintln!("{path_str}: {e}");
                return 1;
            }
        };
        let Some(link) = AttributeLink::parse(link_str) else {
            eprintln!("{link_str}: unknown attribute link");
            return 1;
        };
        if let Ok(i) = value_str.parse::<i64>() {
            op.add_attribute_as_integer(&client_id, path, link, i);
        } else {
            match value_str.parse::<f64>() {
                Ok(f) => op.add_attribute_as_float(&client_id, path, link, f),
                Err(_) => {
                    eprintln!("{value_str}: not a number");
                    return 1;
                }
            }
        }
        paths.push(path);
    }

    let (outcome, response) = match op.perform(None) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("WriteAttributes failed: {e}");
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
