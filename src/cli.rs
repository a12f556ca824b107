use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// feed-mix: analyze poultry feed mixes against Ross 308 recommendations.
#[derive(Parser, Debug)]
#[command(name = "feed-mix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the ingredient catalog (JSON or CSV). The built-in catalog is used if missing.
    #[arg(short, long, default_value = "feed_catalog.json")]
    pub catalog: PathBuf,

    /// Path to the settings JSON file.
    #[arg(short, long, default_value = "feed_settings.json")]
    pub settings: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a mix file.
    Analyze {
        /// Mix JSON file.
        mix: PathBuf,

        /// Print the analysis as JSON.
        #[arg(long)]
        json: bool,

        /// Also write the analysis to a CSV file.
        #[arg(long, value_name = "FILE")]
        export_csv: Option<PathBuf>,
    },

    /// Compare a mix against the recommendation profile.
    Compare {
        /// Mix JSON file.
        mix: PathBuf,

        /// Growth phase to compare against (defaults to the saved phase).
        #[arg(long)]
        phase: Option<String>,
    },

    /// Create and edit mixes.
    Mix {
        #[command(subcommand)]
        action: MixCommand,
    },

    /// Manage the ingredient catalog.
    Catalog {
        #[command(subcommand)]
        action: CatalogCommand,
    },

    /// View and change settings.
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum MixCommand {
    /// Build a new mix from catalog ingredients.
    New {
        /// Output mix file.
        out: PathBuf,

        /// Catalog ids to include; picked interactively when omitted.
        #[arg(long, value_delimiter = ',')]
        ids: Vec<u64>,
    },

    /// Edit an existing mix: inclusions, per-row price and nutrient
    /// overrides, and adding or removing ingredients.
    Edit {
        mix: PathBuf,
    },

    /// Scale inclusions so the mix sums to 100 %.
    Normalize {
        mix: PathBuf,
    },

    /// Show the ingredients of a mix.
    Show {
        mix: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// List catalog ingredients.
    List {
        /// Only list enzymes.
        #[arg(long)]
        enzymes: bool,
    },

    /// Add an ingredient or enzyme to the catalog interactively.
    Add,

    /// Edit a catalog ingredient interactively.
    Edit {
        id: u64,
    },

    /// Merge ingredients from a JSON or CSV file into the catalog.
    Import {
        file: PathBuf,
    },

    /// Write the catalog to a JSON or CSV file.
    Export {
        file: PathBuf,
    },

    /// Replace the catalog with the built-in one.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Show the current settings.
    Show,

    /// Set the growth phase (Starter, Grower, Finisher 1, Finisher 2).
    Phase {
        phase: String,
    },

    /// Set the inclusion input mode (percent or kg_per_ton).
    InclusionMode {
        mode: String,
    },

    /// Set the display unit of a report field.
    Unit {
        /// Field key, e.g. CP_pct or totalCostPerTon.
        field: String,
        unit: String,
    },

    /// Override the recommendation for a metric; prompts when MIN is omitted.
    Override {
        field: String,
        min: Option<f64>,
        max: Option<f64>,
    },

    /// Revert a metric to its built-in recommendation.
    ClearOverride {
        field: String,
    },

    /// Remove every override.
    ResetOverrides,

    /// Hide a field from reports.
    Hide {
        field: String,
    },

    /// Show a previously hidden field.
    ShowField {
        field: String,
    },
}
