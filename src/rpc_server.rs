//! markshelf RPC server, JSON-RPC over stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.create", "params":{"url":"...","title":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":{"kind":"...","message":"..."}}

use std::io::{self, Write};

use markshelf::app::Library;
use markshelf::rpc_handler::handle_method;
use markshelf::services::logging;
use markshelf::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

fn emit(value: &Value) {
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{}", value);
    let _ = out.flush();
}

#[tokio::main]
async fn main() {
    let mut engine = SettingsEngine::from_env();
    let loaded = engine.load();
    let settings = engine.get_settings().clone();

    logging::init(&settings.log_level);
    if let Err(e) = loaded {
        warn!(path = engine.get_config_path(), error = %e, "falling back to default settings");
    }

    let mut library = match Library::open(&settings) {
        Ok(lib) => lib,
        Err(e) => {
            error!(error = %e, "failed to open library");
            emit(&json!({"event": "fatal", "error": {"kind": e.kind(), "message": e.to_string()}}));
            std::process::exit(1);
        }
    };

    info!(storage = ?settings.storage, "markshelf rpc ready");
    emit(&json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                emit(&json!({"id": null, "error": {"kind": "parse_error", "message": e.to_string()}}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);
        let method = req.get("method").and_then(Value::as_str).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_method(&mut library, method, &params).await {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        emit(&response);
    }
    info!("stdin closed, shutting down");
}
