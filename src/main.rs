use anyhow::{bail, Context};
use clap::Parser;
use rest_router::{
    sdk::batch::BatchRunner,
    sdk::config::{
        resolve_api_key, DeploymentVariant, OutputMode, Provider, RangeType, RequestMode,
        RunConfig, TravelMode, Weighting,
    },
    sdk::input::{parse_ranges, read_rows, InputRow, LatLon},
    sdk::output::write_results,
    sdk::routing::fetch::{Fetcher, FixtureFetcher, HttpFetcher},
    sdk::util::{log::init_logging, rate_limit::Limiter},
};
use std::{path::PathBuf, time::Duration};

/// Download routes or isochrones from a REST routing API and save them as CSV
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Print the resolved configuration and exit
    #[arg(long)]
    check: bool,

    #[arg(long, value_enum, default_value_t = RequestMode::Directions)]
    mode: RequestMode,

    /// Start of a single route
    #[arg(long, num_args = 2, value_names = ["LAT", "LON"], allow_negative_numbers = true,
          default_values_t = [49.49331, 5.98375])]
    start: Vec<f64>,

    /// End of a single route
    #[arg(long, num_args = 2, value_names = ["LAT", "LON"], allow_negative_numbers = true,
          default_values_t = [49.60050, 6.13336])]
    end: Vec<f64>,

    /// Center of a single isochrone
    #[arg(long, num_args = 2, value_names = ["LAT", "LON"], allow_negative_numbers = true)]
    center: Option<Vec<f64>>,

    /// Isochrone ranges, comma separated (e.g. "800,1000")
    #[arg(long)]
    range: Option<String>,

    #[arg(long, value_enum, default_value_t = RangeType::Distance)]
    range_type: RangeType,

    /// CSV table of requests; a single request is made from the coordinates otherwise
    #[arg(long)]
    infile: Option<PathBuf>,

    /// Write one summary row per request instead of the points
    #[arg(long)]
    summary: bool,

    /// Add the route geometry to summary rows
    #[arg(long)]
    geometry: bool,

    #[arg(long, default_value = "../data/out/route.csv")]
    outfile: PathBuf,

    /// Directory of the raw JSON cache
    #[arg(long, default_value = "../data/out/json")]
    jsondir: PathBuf,

    /// Read and write the raw JSON cache
    #[arg(long)]
    json: bool,

    #[arg(long, value_enum, default_value_t = Provider::TomTom)]
    router: Provider,

    #[arg(long, value_enum, default_value_t = Weighting::Shortest)]
    route_weighting: Weighting,

    /// Base URL of the routing service
    #[arg(long)]
    rest_url: Option<String>,

    /// Hosting flavour of the ORS server, guessed from --rest-url when absent
    #[arg(long, value_enum)]
    deployment: Option<DeploymentVariant>,

    /// File holding the API key; ROUTING_API_KEY takes precedence
    #[arg(long, default_value = "./tomtom-api-key.txt")]
    api_key: PathBuf,

    #[arg(long, value_enum, default_value_t = TravelMode::Car)]
    travel_mode: TravelMode,

    /// Answer every request with this JSON file instead of calling the service
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Minimum delay between two requests, in milliseconds
    #[arg(long)]
    request_interval_ms: Option<u64>,

    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Cli {
    fn run_config(&self) -> anyhow::Result<RunConfig> {
        let ranges = match &self.range {
            Some(text) => parse_ranges(text).map_err(anyhow::Error::msg)?,
            None => Vec::new(),
        };
        Ok(RunConfig {
            provider: self.router,
            variant: self
                .deployment
                .unwrap_or_else(|| DeploymentVariant::infer(self.rest_url.as_deref())),
            travel_mode: self.travel_mode,
            weighting: self.route_weighting,
            request_mode: self.mode,
            output_mode: if self.summary { OutputMode::Summary } else { OutputMode::Points },
            include_geometry: self.geometry,
            use_cache: self.json,
            cache_dir: self.jsondir.clone(),
            api_key: String::new(),
            base_url: self.rest_url.clone(),
            range_type: self.range_type,
            ranges,
            request_interval: self.request_interval_ms.map(Duration::from_millis),
            timeout: self.timeout_secs.map(Duration::from_secs),
            fixture: self.fixture.clone(),
        })
    }

    /// The one request made when no input table is given, named after the output file.
    fn single_row(&self, config: &RunConfig) -> anyhow::Result<InputRow> {
        let id = self
            .outfile
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "route".to_string());
        let row = match config.request_mode {
            RequestMode::Directions => {
                InputRow::directions(&id, lat_lon(&self.start)?, lat_lon(&self.end)?)
            }
            RequestMode::Isochrone => {
                let Some(center) = &self.center else {
                    bail!("--center is required for a single isochrone request");
                };
                InputRow::isochrone(&id, lat_lon(center)?, config.ranges.clone())
            }
        };
        Ok(row)
    }
}

fn lat_lon(values: &[f64]) -> anyhow::Result<LatLon> {
    match values {
        [lat, lon] => Ok(LatLon { lat: *lat, lon: *lon }),
        _ => bail!("expected LAT LON, got {:?}", values),
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let mut config = cli.run_config()?;

    if cli.check {
        println!("configuration:\n{}", config);
        return Ok(());
    }
    config.validate()?;
    if config.fixture.is_none() {
        config.api_key = resolve_api_key(&cli.api_key);
    }
    log::info!("Starting with\n{}", config);

    let fetcher: Box<dyn Fetcher> = match &config.fixture {
        Some(path) => Box::new(FixtureFetcher::new(path)),
        None => {
            let limiter = Limiter::from_interval(config.effective_request_interval());
            Box::new(HttpFetcher::new(limiter, config.timeout).context("building HTTP client")?)
        }
    };

    let rows = match &cli.infile {
        Some(path) => read_rows(path, config.request_mode, &config.ranges)
            .with_context(|| format!("reading {}", path.display()))?,
        None => vec![cli.single_row(&config)?],
    };

    let (result, _stats) = BatchRunner::new(&config, fetcher.as_ref()).run(&rows);

    let sibling = write_results(&result, &cli.outfile, config.include_geometry)
        .with_context(|| format!("writing {}", cli.outfile.display()))?;
    log::info!("{} results written to {}", result.len(), cli.outfile.display());
    if let Some(path) = sibling {
        log::info!("Geometry written to {}", path.display());
    }
    Ok(())
}
