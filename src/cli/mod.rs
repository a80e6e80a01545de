//! Command-line interface components.

mod args;

pub use args::{
    CalibrateArgs, Cli, Command, ConfigAction, FilterArgs, GlobalArgs, ScorerArgs, SummarizeArgs,
    TelemetryArgs,
};
