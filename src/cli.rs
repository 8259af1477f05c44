use crate::filtering::SectionConfig;
use crate::sections;
use clap::{Parser, Subcommand, ValueEnum};
use std::num::NonZeroU32;
use std::path::PathBuf;

/// Inspect and maintain the persisted filter contexts of the list views
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the persisted contexts
    #[arg(long, env = "CASE_QUERY_STORE_DIR", default_value = ".case-query", global = true)]
    pub store_dir: PathBuf,

    /// Path to a settings profile (TOML)
    #[arg(long, env = "CASE_QUERY_SETTINGS", global = true)]
    pub settings: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Increase diagnostic output on stderr
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Which wire encoding a context compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Encoding {
    /// Structured v1 JSON operator tree
    Wire,
    /// Flattened legacy query string
    Legacy,
}

/// The list views with a built-in section configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Section {
    Cases,
    Alerts,
    MyTasks,
    WaitingTasks,
    Observables,
    Procedures,
    Dashboards,
    CustomTags,
}

impl Section {
    pub fn config(self) -> SectionConfig {
        match self {
            Section::Cases => sections::cases(),
            Section::Alerts => sections::alerts(),
            Section::MyTasks => sections::tasks("mytasks"),
            Section::WaitingTasks => sections::tasks("waitingtasks"),
            Section::Observables => sections::observables(),
            Section::Procedures => sections::procedures(),
            Section::Dashboards => sections::dashboards(),
            Section::CustomTags => sections::custom_tags(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the contexts present in the store
    List,

    /// Display a section's context: filters, sort and paging
    Show {
        #[arg(value_enum)]
        section: Section,
    },

    /// Compile a section's filters to a query expression
    Compile {
        #[arg(value_enum)]
        section: Section,

        /// Encoding to compile to
        #[arg(long, value_enum, default_value_t = Encoding::Wire)]
        encoding: Encoding,
    },

    /// Set one filter and commit it (value in JSON5, coerced to the
    /// field's kind: a scalar, an array of terms, or a full typed value)
    Set {
        #[arg(value_enum)]
        section: Section,

        /// Field to filter on
        field: String,

        /// Filter value, e.g. 'Open', '["t1","t2"]' or '{kind:"terms",operator:"none",list:[{text:"noise"}]}'
        value: String,
    },

    /// Remove one filter
    Unset {
        #[arg(value_enum)]
        section: Section,

        field: String,
    },

    /// Remove every filter of a section
    Clear {
        #[arg(value_enum)]
        section: Section,
    },

    /// Toggle-or-reset the sort on a field
    Sort {
        #[arg(value_enum)]
        section: Section,

        field: String,
    },

    /// Change the page size
    PageSize {
        #[arg(value_enum)]
        section: Section,

        size: NonZeroU32,
    },

    /// Discard the stored context and rebuild the section defaults
    Reset {
        #[arg(value_enum)]
        section: Section,
    },
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
