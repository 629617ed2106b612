use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use awt_checker::PatternPolicy;

/// CLI arguments for the awt binary.
#[derive(Parser, Debug)]
#[command(
    name = "awt",
    version,
    about = "Resolve await expressions against a symbol table fixture"
)]
pub struct CliArgs {
    /// JSON fixture describing namespaces, types and await sites.
    pub fixture: PathBuf,

    /// Boundary between "inapplicable, keep looking" and "unsuitable, report".
    /// Overrides the fixture's own policy.
    #[arg(long, value_enum, ignore_case = true)]
    pub policy: Option<Policy>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Resolve sites one after another instead of in parallel.
    #[arg(long)]
    pub sequential: bool,

    /// Disable colored output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Policy {
    Strict,
    Reference,
}

impl Policy {
    pub fn to_pattern_policy(self) -> PatternPolicy {
        match self {
            Policy::Strict => PatternPolicy::strict(),
            Policy::Reference => PatternPolicy::reference_compatible(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
