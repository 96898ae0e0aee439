//! Command-line flags and their resolution into a run plan.
//!
//! All usage rules are checked here, before any network call is made.

use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use ecourts_api::ApiState;
use ecourts_core::{CaseQuery, CourtLocation, ListingDay, QueryError};
use ecourts_portal::{DEFAULT_BASE_URL, PortalConfig};
use thiserror::Error;

const EXAMPLES: &str = "\
Examples:
  ecourts --cnr DLNC010012342024
  ecourts --case-type CS --case-number 123 --case-year 2024
  ecourts --cnr DLNC010012342024 --today --tomorrow
  ecourts --causelist --today
  ecourts --cnr DLNC010012342024 --download-pdf
  ecourts serve --bind 127.0.0.1:5000";

#[derive(Parser, Debug)]
#[command(
    name = "ecourts",
    version,
    about = "Check eCourts India case listings and download case documents",
    after_help = EXAMPLES,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
    #[command(flatten)]
    pub search: SearchArgs,
    #[command(flatten)]
    pub portal: PortalArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API instead of running a single lookup
    Serve {
        #[arg(long, default_value = "127.0.0.1:5000")]
        bind: String,
        #[command(flatten)]
        portal: PortalArgs,
    },
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// CNR (Case Number Record) number
    #[arg(long, help_heading = "Case Search", conflicts_with_all = ["case_type", "case_number", "case_year"])]
    pub cnr: Option<String>,
    /// Case type (e.g. CS, CRL)
    #[arg(long, help_heading = "Case Search")]
    pub case_type: Option<String>,
    /// Case registration number
    #[arg(long, help_heading = "Case Search")]
    pub case_number: Option<String>,
    /// Case filing year
    #[arg(long, help_heading = "Case Search")]
    pub case_year: Option<String>,

    /// Check whether the case is listed today
    #[arg(long, help_heading = "Listing Check")]
    pub today: bool,
    /// Check whether the case is listed tomorrow
    #[arg(long, help_heading = "Listing Check")]
    pub tomorrow: bool,

    /// Download the case PDF if available
    #[arg(long, help_heading = "Download Options")]
    pub download_pdf: bool,
    /// Download the court's entire cause list (needs --today or --tomorrow)
    #[arg(long, help_heading = "Download Options")]
    pub causelist: bool,

    /// Directory for downloads and the run summary
    #[arg(long, default_value = "output", help_heading = "Configuration")]
    pub output_dir: PathBuf,
    /// Do not write the JSON run summary
    #[arg(long, help_heading = "Configuration")]
    pub no_save: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PortalArgs {
    /// State code
    #[arg(long, env = "ECOURTS_STATE", default_value = "DL", help_heading = "Configuration")]
    pub state: String,
    /// District code
    #[arg(long, env = "ECOURTS_DISTRICT", default_value = "1", help_heading = "Configuration")]
    pub district: String,
    /// Portal base URL
    #[arg(long, env = "ECOURTS_BASE_URL", default_value = DEFAULT_BASE_URL, help_heading = "Configuration")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[arg(long, env = "ECOURTS_TIMEOUT", default_value_t = 30, value_name = "SECS", help_heading = "Configuration")]
    pub timeout: u64,
}

impl PortalArgs {
    pub fn portal_config(&self) -> PortalConfig {
        PortalConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout),
        }
    }

    pub fn api_state(&self) -> ApiState {
        ApiState {
            portal: self.portal_config(),
            state_code: self.state.clone(),
            district_code: self.district.clone(),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UsageError {
    #[error("provide either --cnr OR (--case-type, --case-number, --case-year) OR --causelist")]
    NothingToDo,
    #[error("missing {0}: --case-type, --case-number and --case-year must be given together")]
    PartialCase(String),
    #[error("--causelist requires --today or --tomorrow")]
    CauseListWithoutDay,
    #[error("--download-pdf requires a case (--cnr or --case-type/--case-number/--case-year)")]
    PdfWithoutCase,
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl UsageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UsageError::Query(_) => ErrorKind::ValueValidation,
            _ => ErrorKind::MissingRequiredArgument,
        }
    }
}

/// Everything one invocation will do.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub court: CourtLocation,
    pub query: Option<CaseQuery>,
    pub days: Vec<ListingDay>,
    pub download_pdf: bool,
    pub causelist: bool,
    pub output_dir: PathBuf,
    pub save_summary: bool,
    pub portal: PortalConfig,
}

pub fn resolve(search: &SearchArgs, portal: &PortalArgs) -> Result<RunPlan, UsageError> {
    let court = CourtLocation::new(&portal.state, &portal.district)?;

    let query = match (
        &search.cnr,
        &search.case_type,
        &search.case_number,
        &search.case_year,
    ) {
        (Some(cnr), ..) => Some(CaseQuery::by_cnr(court.clone(), cnr)?),
        (None, None, None, None) => None,
        (None, Some(t), Some(n), Some(y)) => {
            Some(CaseQuery::by_registration(court.clone(), t, n, y)?)
        }
        (None, t, n, y) => {
            let missing: Vec<&str> = [
                ("--case-type", t.is_none()),
                ("--case-number", n.is_none()),
                ("--case-year", y.is_none()),
            ]
            .into_iter()
            .filter(|(_, absent)| *absent)
            .map(|(flag, _)| flag)
            .collect();
            return Err(UsageError::PartialCase(missing.join(", ")));
        }
    };

    if query.is_none() && !search.causelist {
        return Err(UsageError::NothingToDo);
    }
    if search.causelist && !(search.today || search.tomorrow) {
        return Err(UsageError::CauseListWithoutDay);
    }
    if search.download_pdf && query.is_none() {
        return Err(UsageError::PdfWithoutCase);
    }

    let mut days = Vec::new();
    if search.today {
        days.push(ListingDay::Today);
    }
    if search.tomorrow {
        days.push(ListingDay::Tomorrow);
    }

    Ok(RunPlan {
        court,
        query,
        days,
        download_pdf: search.download_pdf,
        causelist: search.causelist,
        output_dir: search.output_dir.clone(),
        save_summary: !search.no_save,
        portal: portal.portal_config(),
    })
}
