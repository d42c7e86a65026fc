//! `server-write`: writes resource values on a client.
//!
//! Usage: `server-write --clientID ID [--replace] PATH=VALUE...`
//!
//! Each positional argument is `PATH=VALUE`; `VALUE` is parsed as an
//! integer, then a float, then `True`/`False`, falling back to a string —
//! the same best-effort scalar sniffing `tools_common.c` in
//! `original_source/` does before handing a value to the typed
//! `addValueAs…` API.

use lwm2m_mgmt_core::cli;
use lwm2m_mgmt_core::operation::WriteOperation;
use lwm2m_mgmt_core::response::PerformOutcome;
use lwm2m_mgmt_core::value::Value;
use lwm2m_mgmt_core::{Path, WriteMode};

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let mut common = cli::args_after_program_name();
    cli::init_logging(&common);

    let mut replace = false;
    common.positionals.retain(|arg| {
        if arg == "--replace" {
            replace = true;
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
        eprintln!("specify one or more PATH=VALUE pairs");
        return 1;
    }

    let session = match cli::connect(&common) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("connect failed: {e}");
            return 1;
        }
    };

    let mode = if replace { WriteMode::Replace } else { WriteMode::Update };
    let mut op = WriteOperation::new(&session, mode);
    let mut paths = Vec::new();
    for raw in &common.positionals {
        let Some((path_str, value_str)) = raw.split_once('=') else {
            eprintln!("{raw}: expected PATH=VALUE");
            return 1;
        };
        let path = match Path::parse(path_str) {
            Ok(path) => path,
            Err(e) => {
                eprintln!("{path_str}: {e}");
                return 1;
            }
        };
        op.add_value(&client_id, path, sniff_value(value_str));
        paths.push(path);
    }

    let (outcome, response) = match op.perform(None) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Write failed: {e}");
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

fn sniff_value(text: &str) -> Value {
    if let Ok(i) = text.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = text.parse::<f64>() {
        return Value::Float(f);
    }
    match text {
        "True" | "true" => Value::Boolean(true),
        "False" | "false" => Value::Boolean(false),
        _ => Value::String(text.to_string()),
    }
}
