use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Synced key holding the bar list.
pub const KEY_BARS: &str = "extraBars";
/// Synced key holding the global on/off switch.
pub const KEY_ENABLED: &str = "isEnabled";
/// Synced key holding [`GlobalOptions`].
pub const KEY_OPTIONS: &str = "globalOptions";
/// Synced key holding the collapsed flag.
pub const KEY_COLLAPSED: &str = "barsCollapsed";
/// Local-only mirror of the collapsed flag.
pub const LOCAL_KEY_COLLAPSED: &str = "extraBarsCollapsed";

/// Visual tuning applied uniformly to all bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalOptions {
    pub scale: f64,
    pub spacing: f64,
    pub opacity: f64,
}

impl Default for GlobalOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            spacing: 0.0,
            opacity: 1.0,
        }
    }
}

impl GlobalOptions {
    /// Reads options from an arbitrary stored value.
    ///
    /// Each field falls back to its default independently when missing or not a
    /// number, then gets clamped into its valid range.
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        let field = |name: &str, fallback: f64| {
            value
                .get(name)
                .and_then(Value::as_f64)
                .filter(|v| v.is_finite())
                .unwrap_or(fallback)
        };
        Self {
            scale: field("scale", defaults.scale),
            spacing: field("spacing", defaults.spacing),
            opacity: field("opacity", defaults.opacity),
        }
        .clamped()
    }

    pub fn clamped(self) -> Self {
        Self {
            scale: self.scale.max(1.0),
            spacing: self.spacing.max(0.0),
            opacity: self.opacity.clamp(0.0, 1.0),
        }
    }
}
