mod capture;
mod config;
mod logging;

pub const RUN_ID_ENV_VAR: &str = "SELFUP_RUN_ID";

pub mod prelude {
    pub use super::RUN_ID_ENV_VAR;
    pub use super::capture::{
        CaptureError, CaptureOpts, DefaultExecutionProvider, ExecutionProvider,
        MockExecutionProvider, OutputCapture, OutputCaptureBuilder,
    };
    pub use super::config::ConfigOptions;
    pub use super::logging::{LoggingOpts, LoggingProgress, wants_color};
}
