use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::commands::{
    analytics::{DashboardArgs, KpisArgs, TopArgs},
    browse::{CountriesArgs, RegionsArgs, RowsArgs},
    compare::{CompareArgs, CompareGlobalArgs},
    export::ExportArgs,
    schema::SchemaArgs,
};
use crate::query::FilterSet;

#[derive(Debug, Parser)]
#[command(
    name = "airwater",
    version,
    about = "Air quality and water pollution analytics per city"
)]
pub struct Cli {
    #[command(flatten)]
    pub runtime: RuntimeArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct RuntimeArgs {
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[arg(long, global = true, value_name = "NAME")]
    pub table: Option<String>,

    #[arg(long, global = true, value_name = "PATH")]
    pub home_dir: Option<PathBuf>,

    #[arg(long, global = true, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Countries(CountriesArgs),
    Regions(RegionsArgs),
    Rows(RowsArgs),
    Kpis(KpisArgs),
    Top(TopArgs),
    Compare(CompareArgs),
    CompareGlobal(CompareGlobalArgs),
    Dashboard(DashboardArgs),
    Export(ExportArgs),
    Schema(SchemaArgs),
}

impl Command {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Countries(_) => "countries",
            Self::Regions(_) => "regions",
            Self::Rows(_) => "rows",
            Self::Kpis(_) => "kpis",
            Self::Top(_) => "top",
            Self::Compare(_) => "compare",
            Self::CompareGlobal(_) => "compare-global",
            Self::Dashboard(_) => "dashboard",
            Self::Export(_) => "export",
            Self::Schema(_) => "schema",
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    #[arg(long, value_name = "COUNTRY")]
    pub country: Option<String>,

    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub city: Option<String>,
}

impl FilterArgs {
    #[must_use]
    pub fn to_filter_set(&self) -> FilterSet {
        FilterSet {
            country: self.country.clone(),
            region: self.region.clone(),
            city_search: self.city.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Args)]
pub struct OutputArgs {
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
