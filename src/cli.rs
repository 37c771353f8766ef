use std::path::PathBuf;

use agriguard_core::AdvisoryStrategyKind;
use agriguard_weather::{LocationError, LocationQuery};
use clap::{ArgGroup, Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "agriguard",
    version,
    about = "Today's farm advice from the local weather forecast"
)]
#[command(group(ArgGroup::new("location").required(true).args(["city", "lat"])))]
pub struct Cli {
    /// Place name to geocode, e.g. "Lodwar"
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub city: Option<String>,

    /// Latitude in decimal degrees (-90 to 90)
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees (-180 to 180)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Advisory strategy; defaults to the configured one
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Translate the advice; optional DeepL language code (default from config)
    #[arg(long, value_name = "LANG")]
    pub translate: Option<Option<String>>,

    /// Send the advice by SMS to these numbers
    #[arg(long, value_name = "NUMBER", num_args = 1..)]
    pub sms: Vec<String>,

    /// Config file (default: <config dir>/agriguard/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Model,
    Rules,
}

impl From<StrategyArg> for AdvisoryStrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Model => AdvisoryStrategyKind::Model,
            StrategyArg::Rules => AdvisoryStrategyKind::Rules,
        }
    }
}

impl Cli {
    pub fn location_query(&self) -> Result<LocationQuery, LocationError> {
        match (&self.city, self.lat, self.lon) {
            (_, Some(lat), Some(lon)) => LocationQuery::coordinates(lat, lon),
            (Some(city), _, _) => Ok(LocationQuery::place(city.trim())),
            _ => Err(LocationError::Provider(
                "Provide either --city or --lat/--lon".to_string(),
            )),
        }
    }
}
