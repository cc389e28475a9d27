// Extra bars services
// Services provide storage, rendering, change propagation, icons, setup retries and host configuration.

pub mod change_propagation;
pub mod config_engine;
pub mod favicon;
pub mod readiness;
pub mod render_engine;
pub mod storage;
