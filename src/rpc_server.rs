//! Extra bars control server: newline-delimited JSON over stdin/stdout.
//!
//! Request:  {"id":1, "message":{"action":"addLinkToBar","url":"...","title":"..."}}
//!           {"id":2, "page":{"url":"...","title":"..."}}
//! Response: {"id":1, "result":{"success":true}} or {"id":1, "error":"..."};
//!           a result may carry "alerts":[...] raised while handling it.

use std::io::{self, BufRead, Write};
use std::time::Instant;

use extra_bars::app::App;
use extra_bars::logging::init_logging;
use extra_bars::message_handler::handle_message;
use extra_bars::services::config_engine::{ConfigEngine, ConfigEngineTrait};
use extra_bars::types::message::PageInfo;

use serde_json::{json, Value};
use tracing::{error, info, warn};

/// Fixed-window limiter on requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self {
            window_start: Instant::now(),
            request_count: 0,
            max_per_second,
        }
    }

    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn respond(out: &mut impl Write, response: Value) -> io::Result<()> {
    writeln!(out, "{}", response)?;
    out.flush()
}

fn route(app: &mut App, request: &Value) -> Result<Value, String> {
    if let Some(message) = request.get("message") {
        let result = handle_message(app, message);
        return serde_json::to_value(result).map_err(|e| e.to_string());
    }
    if let Some(page) = request.get("page") {
        let page: PageInfo = serde_json::from_value(page.clone()).map_err(|e| format!("invalid page: {}", e))?;
        app.set_page(page);
        return Ok(json!({"success": true}));
    }
    Err("request needs a \"message\" or a \"page\"".to_string())
}

/// Runs one request. Alerts raised meanwhile are drained into the reply
/// under `alerts`; nobody else would ever show them.
fn dispatch(app: &mut App, request: &Value) -> Result<Value, String> {
    app.poll_external_changes();
    let outcome = route(app, request);
    let alerts = app.surface_mut().take_alerts();
    let mut result = outcome?;
    if !alerts.is_empty() {
        if let Some(fields) = result.as_object_mut() {
            fields.insert("alerts".to_string(), json!(alerts));
        }
    }
    Ok(result)
}

fn main() {
    let mut engine = ConfigEngine::new(std::env::var("EXTRA_BARS_CONFIG").ok());
    let config = engine.load().unwrap_or_else(|e| {
        eprintln!("extra-bars-rpc: {}; using defaults", e);
        Default::default()
    });
    init_logging(&config.logging.filter);

    let mut app = match App::open(config) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "cannot open bar store");
            std::process::exit(1);
        }
    };
    app.load();
    info!(instance = app.instance_id(), "control server ready");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if respond(&mut out, json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")})).is_err() {
        return;
    }

    let mut rate_limiter = RateLimiter::new(200);

    for line in io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let request: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "unparseable request");
                if respond(&mut out, json!({"id": null, "error": format!("parse error: {}", e)})).is_err() {
                    break;
                }
                continue;
            }
        };
        let id = request.get("id").cloned().unwrap_or(Value::Null);

        let response = if !rate_limiter.check() {
            json!({"id": id, "error": "rate limit exceeded"})
        } else {
            match dispatch(&mut app, &request) {
                Ok(result) => json!({"id": id, "result": result}),
                Err(err) => json!({"id": id, "error": err}),
            }
        };
        if respond(&mut out, response).is_err() {
            break;
        }
    }

    app.shutdown();
}
