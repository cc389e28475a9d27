//! Webview host for the extra bars.
//!
//! Uses `wry` for cross-platform WebView rendering:
//! - Windows: WebView2
//! - Linux: WebKitGTK
//! - macOS: WKWebView
//!
//! A glue script injected into every page mounts the HTML produced by the
//! render engine and forwards DOM events to Rust over wry IPC.

pub mod webview_host;
