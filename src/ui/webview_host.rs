//! Browser window that injects the extra bars into every page using `wry` + `tao`.
//!
//! Architecture:
//! - `with_initialization_script(GLUE_JS)` installs `window.__extraBars` on every page.
//! - The page reports `ui_ready`; Rust runs the setup policy and pushes the bar HTML.
//! - Listeners declared in the HTML (`data-eb-on`) post `ui_event` messages back.
//! - Effects returned by [`App::handle_ui`] are applied with `evaluate_script`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tao::event::{Event, StartCause, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy};
use tao::window::WindowBuilder;
use tracing::{debug, error, info, warn};
use wry::WebViewBuilder;

use crate::app::App;
use crate::logging::init_logging;
use crate::services::config_engine::{ConfigEngine, ConfigEngineTrait};
use crate::services::readiness::{ReadinessProbe, SetupOutcome};
use crate::types::event::{ContextTarget, Disposition, HostEffect, UiEvent};
use crate::types::menu::{MenuAction, MenuInput};
use crate::types::message::PageInfo;

const START_URL: &str = "https://www.rust-lang.org/";
const POLL_INTERVAL: Duration = Duration::from_millis(500);

const GLUE_JS: &str = r#"
(function(){
  if (window.__extraBars) return;
  var send = function(cmd, body){ window.ipc.postMessage(JSON.stringify(Object.assign({cmd: cmd}, body || {}))); };
  var transferOf = function(e, readable){
    var out = {};
    if (!e.dataTransfer) return out;
    Array.prototype.forEach.call(e.dataTransfer.types || [], function(t){
      out[t] = readable ? e.dataTransfer.getData(t) : '';
    });
    return out;
  };
  var bind = function(root){
    root.querySelectorAll('[data-eb-on]').forEach(function(el){
      var wiring = JSON.parse(el.getAttribute('data-eb-on'));
      Object.keys(wiring).forEach(function(name){
        el.addEventListener(name, function(e){
          if (name !== 'error' && name !== 'dragleave' && name !== 'dragend') { e.preventDefault(); e.stopPropagation(); }
          if (name === 'dragstart') {
            e.dataTransfer.effectAllowed = 'move';
            e.dataTransfer.setData('text/extra-bookmark', el.getAttribute('data-drag-payload'));
            if (!e.dataTransfer.getData('text/plain')) e.dataTransfer.setData('text/plain', 'drag');
          }
          if (name === 'dragover' && e.dataTransfer) e.dataTransfer.dropEffect = 'move';
          if (name === 'auxclick' && e.button !== 1) return;
          var r = el.getBoundingClientRect();
          send('ui_event', {event: {
            action: wiring[name],
            pointerX: e.clientX || 0,
            rect: {left: r.left, width: r.width},
            transfer: transferOf(e, name === 'drop' || name === 'dragstart'),
            modifiers: {ctrl: !!e.ctrlKey, meta: !!e.metaKey, button: e.button || 0}
          }});
        });
      });
    });
  };
  var menu = null;
  var hideMenu = function(){ if (menu) { menu.remove(); menu = null; } };
  document.addEventListener('click', hideMenu);
  window.__extraBars = {
    mount: function(toggleHtml, containerHtml, css){
      ['extra-bookmark-bars-container', 'extra-bars-toggle', 'extra-bars-style'].forEach(function(id){
        var old = document.getElementById(id); if (old) old.remove();
      });
      var style = document.createElement('style'); style.id = 'extra-bars-style'; style.textContent = css;
      document.documentElement.appendChild(style);
      var holder = document.createElement('div');
      holder.innerHTML = toggleHtml + containerHtml;
      var target = document.body || document.documentElement;
      while (holder.lastChild) target.insertBefore(holder.lastChild, target.firstChild);
      bind(document.getElementById('extra-bars-toggle').parentNode);
    },
    unmount: function(){
      ['extra-bookmark-bars-container', 'extra-bars-toggle'].forEach(function(id){
        var old = document.getElementById(id); if (old) old.remove();
      });
      hideMenu();
    },
    indicators: function(list){
      document.querySelectorAll('.extra-bookmark-item').forEach(function(el){
        el.classList.remove('drop-before', 'drop-after');
      });
      list.forEach(function(i){
        var el = document.querySelector('.extra-bookmark-item[data-bar-id="' + i[0] + '"][data-index="' + i[1] + '"]');
        if (el) el.classList.add(i[2] ? 'drop-before' : 'drop-after');
      });
    },
    showMenu: function(target, items, x, y){
      hideMenu();
      menu = document.createElement('div');
      menu.className = 'bookmark-context-menu';
      menu.style.left = Math.min(x, window.innerWidth - 200) + 'px';
      menu.style.top = Math.min(y, window.innerHeight - 300) + 'px';
      items.forEach(function(item){
        var row = document.createElement('div');
        if (!item.action) { row.className = 'menu-separator'; menu.appendChild(row); return; }
        row.className = 'menu-item' + (item.destructive ? ' delete-item' : '');
        row.textContent = item.label;
        row.addEventListener('click', function(e){
          e.stopPropagation(); hideMenu();
          send('menu', {target: target, action: item.action});
        });
        menu.appendChild(row);
      });
      document.body.appendChild(menu);
    },
    ask: function(target, action, prompt){
      var input = {text: null, confirmed: false};
      if (prompt.kind === 'text') { input.text = window.prompt(prompt.message, prompt.default); }
      else { input.confirmed = window.confirm(prompt.message); }
      send('menu_input', {target: target, action: action, input: input});
    },
    paste: function(target){
      var reply = function(text){ send('menu_input', {target: target, action: 'pasteUrl', input: {text: text, confirmed: false}}); };
      if (navigator.clipboard && navigator.clipboard.readText) navigator.clipboard.readText().then(reply, function(){ reply(null); });
      else reply(null);
    }
  };
  var lastX = 0, lastY = 0;
  document.addEventListener('contextmenu', function(e){ lastX = e.pageX; lastY = e.pageY; }, true);
  window.__extraBars.lastPointer = function(){ return [lastX, lastY]; };
  var ready = function(){
    send('ui_ready', {page: {url: location.href, title: document.title}, hasContainer: !!document.getElementById('extra-bookmark-bars-container')});
  };
  if (document.readyState === 'loading') document.addEventListener('DOMContentLoaded', ready); else ready();
})();
"#;

const BARS_CSS: &str = r#"
.extra-bookmark-bars-container{position:fixed;top:0;left:0;right:0;z-index:999999;font:12px -apple-system,"Segoe UI",sans-serif}
.extra-bookmark-bars-container.collapsed{display:none}
.extra-bookmark-bars-container.with-toggle-offset{padding-left:28px}
.extra-bookmark-bar{display:flex;align-items:center;min-height:calc(28px * var(--bar-scale,1));opacity:var(--bar-opacity,1);background:#f1f3f4;border-bottom:1px solid #dadce0}
.extra-bar-bookmarks{display:flex;flex:1;gap:var(--item-spacing,0px);overflow-x:auto;padding:2px 6px}
.extra-bookmark-item{display:flex;align-items:center;border-radius:4px}
.extra-bookmark-item.dragging{opacity:.4}
.extra-bookmark-item.drop-before{box-shadow:inset 2px 0 0 #1a73e8}
.extra-bookmark-item.drop-after{box-shadow:inset -2px 0 0 #1a73e8}
.extra-bookmark-item a{display:flex;align-items:center;gap:4px;padding:2px 6px;color:#202124;text-decoration:none;white-space:nowrap}
.favicon-container img,.text-favicon,.emoji-favicon{width:16px;height:16px;display:inline-flex;align-items:center;justify-content:center}
.text-favicon{border-radius:3px;color:#fff;font-size:10px;font-weight:600}
.empty-bar-message{color:#80868b;font-style:italic;padding:0 6px}
#extra-bars-toggle{position:fixed;top:4px;left:6px;z-index:1000000;width:20px;height:20px;border:0;border-radius:4px;cursor:pointer}
.bookmark-context-menu{position:fixed;z-index:1000001;background:#fff;border:1px solid #dadce0;border-radius:4px;padding:4px 0;min-width:160px}
.bookmark-context-menu .menu-item{padding:6px 12px;cursor:pointer}
.bookmark-context-menu .menu-item:hover{background:#f1f3f4}
.bookmark-context-menu .delete-item{color:#d93025}
.bookmark-context-menu .menu-separator{height:1px;margin:4px 0;background:#dadce0}
"#;

#[derive(Debug)]
enum UserEvent {
    LoadUrl(String),
    EvalScript(String),
    #[cfg_attr(not(feature = "network"), allow(dead_code))]
    IconResolved { url: String, icon: Option<String> },
}

struct HostState {
    app: App,
    /// Surface generation last pushed into the page.
    pushed_generation: u64,
}

/// What the page reported about itself in `ui_ready`.
struct PageProbe {
    has_container: bool,
}

impl ReadinessProbe for PageProbe {
    fn is_ready(&self) -> bool {
        true
    }

    fn is_mounted(&self) -> bool {
        self.has_container
    }
}

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Script bringing the page in line with the surface, if it changed since the last push.
fn sync_script(state: &mut HostState, force: bool) -> Option<String> {
    let surface = state.app.surface_mut();
    let alerts = surface.take_alerts();
    let generation = surface.generation();
    let mut script = String::new();

    if force || generation != state.pushed_generation {
        match surface.view() {
            Some(view) => script.push_str(&format!(
                "window.__extraBars&&window.__extraBars.mount({},{},{});",
                js_string(&view.toggle.to_html()),
                js_string(&view.container.to_html()),
                js_string(BARS_CSS)
            )),
            None => script.push_str("window.__extraBars&&window.__extraBars.unmount();"),
        }
        state.pushed_generation = generation;
    } else {
        let indicators = serde_json::to_string(&surface.indicators()).unwrap_or_else(|_| "[]".to_string());
        script.push_str(&format!(
            "window.__extraBars&&window.__extraBars.indicators({});",
            indicators
        ));
    }
    for alert in alerts {
        script.push_str(&format!("window.alert({});", js_string(&alert)));
    }
    Some(script)
}

fn effect_script(effect: HostEffect, proxy: &EventLoopProxy<UserEvent>) -> Option<String> {
    match effect {
        HostEffect::Open { url, disposition } => {
            if disposition != Disposition::SameTab {
                debug!(?disposition, "single-window host opens links in place");
            }
            let _ = proxy.send_event(UserEvent::LoadUrl(url));
            None
        }
        HostEffect::ShowContextMenu { target, items } => Some(format!(
            "(function(p){{window.__extraBars.showMenu({},{},p[0],p[1]);}})(window.__extraBars.lastPointer());",
            serde_json::to_string(&target).ok()?,
            serde_json::to_string(&items).ok()?
        )),
        HostEffect::Prompt {
            target,
            action,
            prompt,
        } => Some(format!(
            "window.__extraBars.ask({},{},{});",
            serde_json::to_string(&target).ok()?,
            serde_json::to_string(&action).ok()?,
            serde_json::to_string(&prompt).ok()?
        )),
        HostEffect::CopyToClipboard { text } => Some(format!(
            "navigator.clipboard&&navigator.clipboard.writeText({});",
            js_string(&text)
        )),
        // The glue script already handled these synchronously
        HostEffect::WriteTransfer { .. } | HostEffect::AcceptDrop => None,
    }
}

#[cfg(feature = "network")]
fn spawn_icon_probes(app: &App, proxy: &EventLoopProxy<UserEvent>) {
    use crate::services::favicon::{first_resolved, HttpIconProbe};

    if !app.config().favicon.probe_enabled {
        return;
    }
    let pending = app.pending_icon_probes();
    if pending.is_empty() {
        return;
    }
    let timeout = app.config().favicon.probe_timeout_ms;
    let proxy = proxy.clone();
    std::thread::spawn(move || {
        let probe = match HttpIconProbe::new(timeout) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "icon probing unavailable");
                return;
            }
        };
        for (url, candidates) in pending {
            let icon = first_resolved(&candidates, &probe);
            if proxy.send_event(UserEvent::IconResolved { url, icon }).is_err() {
                break;
            }
        }
    });
}

#[cfg(not(feature = "network"))]
fn spawn_icon_probes(_app: &App, _proxy: &EventLoopProxy<UserEvent>) {}

fn handle_ipc(state: &mut HostState, message: &str, proxy: &EventLoopProxy<UserEvent>) -> Vec<UserEvent> {
    let msg: Value = match serde_json::from_str(message) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "unreadable IPC message");
            return Vec::new();
        }
    };
    let cmd = msg.get("cmd").and_then(Value::as_str).unwrap_or("");
    let mut scripts = Vec::new();

    match cmd {
        "ui_ready" => {
            if let Some(page) = msg.get("page").and_then(|p| serde_json::from_value::<PageInfo>(p.clone()).ok()) {
                state.app.set_page(page);
            }
            let probe = PageProbe {
                has_container: msg.get("hasContainer").and_then(Value::as_bool).unwrap_or(false),
            };
            let outcome = state.app.setup(&probe, std::thread::sleep);
            debug!(?outcome, "page setup");
            if outcome == SetupOutcome::Mounted {
                scripts.extend(sync_script(state, true));
                spawn_icon_probes(&state.app, proxy);
            }
        }
        "ui_event" => {
            let Some(event) = msg.get("event").and_then(|e| serde_json::from_value::<UiEvent>(e.clone()).ok()) else {
                warn!("malformed ui_event");
                return Vec::new();
            };
            for effect in state.app.handle_ui(event) {
                scripts.extend(effect_script(effect, proxy));
            }
            scripts.extend(sync_script(state, false));
        }
        "menu" | "menu_input" => {
            let target = msg.get("target").and_then(|t| serde_json::from_value::<ContextTarget>(t.clone()).ok());
            let action = msg.get("action").and_then(|a| serde_json::from_value::<MenuAction>(a.clone()).ok());
            let (Some(target), Some(action)) = (target, action) else {
                warn!("malformed menu message");
                return Vec::new();
            };
            if cmd == "menu" {
                if action == MenuAction::PasteUrl {
                    scripts.push(format!(
                        "window.__extraBars.paste({});",
                        serde_json::to_string(&target).unwrap_or_default()
                    ));
                    return scripts.into_iter().map(UserEvent::EvalScript).collect();
                }
                if let Some(prompt) = state.app.prompt_for(&target, action) {
                    scripts.extend(effect_script(HostEffect::Prompt { target, action, prompt }, proxy));
                    return scripts.into_iter().map(UserEvent::EvalScript).collect();
                }
            }
            let input: MenuInput = msg
                .get("input")
                .and_then(|i| serde_json::from_value(i.clone()).ok())
                .unwrap_or_default();
            for effect in state.app.run_menu_action(&target, action, input) {
                scripts.extend(effect_script(effect, proxy));
            }
            scripts.extend(sync_script(state, false));
        }
        other => debug!(cmd = other, "ignoring IPC command"),
    }

    scripts.into_iter().map(UserEvent::EvalScript).collect()
}

// === Main entry point ===

pub fn run() {
    let mut engine = ConfigEngine::new(std::env::var("EXTRA_BARS_CONFIG").ok());
    let config = engine.load().unwrap_or_default();
    init_logging(&config.logging.filter);

    let mut app = match App::open(config) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "cannot open bar store");
            return;
        }
    };
    app.load();
    let state = Rc::new(RefCell::new(HostState {
        app,
        pushed_generation: 0,
    }));

    let event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let window = match WindowBuilder::new()
        .with_title("Extra Bookmark Bars")
        .with_inner_size(tao::dpi::LogicalSize::new(1280.0, 800.0))
        .build(&event_loop)
    {
        Ok(w) => w,
        Err(e) => {
            error!(error = %e, "failed to create window");
            return;
        }
    };

    let ipc_state = state.clone();
    let ipc_proxy = proxy.clone();
    let nw_proxy = proxy.clone();

    let builder = WebViewBuilder::new()
        .with_initialization_script(GLUE_JS)
        .with_url(START_URL)
        .with_ipc_handler(move |msg: wry::http::Request<String>| {
            let Ok(mut s) = ipc_state.try_borrow_mut() else {
                warn!("IPC re-entered while busy; dropping message");
                return;
            };
            for event in handle_ipc(&mut s, msg.body(), &ipc_proxy) {
                let _ = ipc_proxy.send_event(event);
            }
        })
        .with_new_window_req_handler(move |url, _features| {
            if url.starts_with("http://") || url.starts_with("https://") {
                let _ = nw_proxy.send_event(UserEvent::LoadUrl(url));
            }
            wry::NewWindowResponse::Deny
        })
        .with_devtools(cfg!(debug_assertions));

    #[cfg(target_os = "linux")]
    let webview = {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;
        let Some(vbox) = window.default_vbox() else {
            error!("window has no GTK container");
            return;
        };
        builder.build_gtk(vbox)
    };

    #[cfg(not(target_os = "linux"))]
    let webview = builder.build(&window);

    let webview = match webview {
        Ok(w) => w,
        Err(e) => {
            error!(error = %e, "failed to create webview");
            return;
        }
    };
    info!("webview host running");

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::WaitUntil(Instant::now() + POLL_INTERVAL);

        match event {
            Event::NewEvents(StartCause::ResumeTimeReached { .. }) => {
                if let Ok(mut s) = state.try_borrow_mut() {
                    if s.app.poll_external_changes() > 0 {
                        if let Some(js) = sync_script(&mut s, false) {
                            let _ = webview.evaluate_script(&js);
                        }
                    }
                }
            }

            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                if let Ok(mut s) = state.try_borrow_mut() {
                    s.app.shutdown();
                }
                *control_flow = ControlFlow::Exit;
            }

            Event::UserEvent(user_event) => match user_event {
                UserEvent::LoadUrl(url) => {
                    info!(%url, "navigating");
                    let _ = webview.load_url(&url);
                }
                UserEvent::EvalScript(js) => {
                    let _ = webview.evaluate_script(&js);
                }
                UserEvent::IconResolved { url, icon } => {
                    if let Ok(mut s) = state.try_borrow_mut() {
                        s.app.icon_resolved(&url, icon);
                        if let Some(js) = sync_script(&mut s, false) {
                            let _ = webview.evaluate_script(&js);
                        }
                    }
                }
            },

            _ => {}
        }
    });
}
