use std::path::PathBuf;

use clap::Parser;

/// Start-up configuration, from the command line or the environment.
#[derive(Debug, Parser)]
#[command(name = "box-office", version, about = "Explore movie box-office data")]
pub struct Config {
    /// Movie table to open at start-up (.csv, .json or .parquet).
    #[arg(env = "BOX_OFFICE_DATA")]
    pub data: Option<PathBuf>,

    /// Page to show first.
    #[arg(long, value_enum, default_value_t = StartPage::Home)]
    pub page: StartPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StartPage {
    Home,
    Explore,
    Viz,
    Insights,
}

impl From<StartPage> for crate::state::Page {
    fn from(page: StartPage) -> Self {
        use crate::state::Page;
        match page {
            StartPage::Home => Page::Home,
            StartPage::Explore => Page::Explore,
            StartPage::Viz => Page::Visualizations,
            StartPage::Insights => Page::Insights,
        }
    }
}
