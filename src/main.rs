use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::Parser;
use serde::Serialize;
use usage_analytics::{
    client::{AnalyticsService, QueryClient, QueryState},
    config::AnalyticsConfig,
    export::{DirectorySink, ExportFormat, export_to},
    observability,
    query::{CohortPeriod, QueryBuilder, QueryInput, Timeframe},
    reshape::{format_axis_date, retention_curve},
    view::{EventExplorer, ExplorerFilters, load_dashboard},
};

#[derive(Parser, Debug)]
#[command(version, about = "Usage analytics client", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to config file (built-in defaults when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the backend base URL from the config file
    #[arg(long, global = true)]
    base_url: Option<String>,
}

#[derive(clap::Args, Debug, Clone, Default)]
struct FilterArgs {
    /// First day of the range (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Last day of the range (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,
    /// Restrict to a company; repeat for several
    #[arg(long = "company")]
    companies: Vec<String>,
}

impl FilterArgs {
    fn input(&self) -> QueryInput {
        QueryInput {
            start_date: self.start,
            end_date: self.end,
            companies: self.companies.clone(),
            ..Default::default()
        }
    }

    fn explorer_filters(&self) -> ExplorerFilters {
        ExplorerFilters {
            start_date: self.start,
            end_date: self.end,
            companies: self.companies.clone(),
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
struct PageArgs {
    /// Free-text search
    #[arg(short, long, default_value = "")]
    query: String,
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    page_size: Option<u32>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Search events and print one page as JSON
    Events {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Export one page of events to a file
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        page: PageArgs,
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// Directory to write into
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
        /// Use this filename instead of the generated one
        #[arg(long)]
        filename: Option<String>,
    },
    /// Multi-company trends: sorted rows and per-company totals
    Trends {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_enum)]
        timeframe: Option<Timeframe>,
        /// Restrict to an event type; repeat for several
        #[arg(long = "event-type")]
        event_types: Vec<String>,
    },
    /// Cohort retention curve
    Retention {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_enum)]
        cohort_period: Option<CohortPeriod>,
        #[arg(long)]
        min_cohort_size: Option<u32>,
    },
    /// Overview panels as JSON
    Dashboard {
        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match AnalyticsConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config from {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => AnalyticsConfig::default(),
    };
    if let Some(base_url) = args.base_url {
        config.api.base_url = base_url;
    }

    observability::init_tracing(&config.observability).expect("Failed to initialize tracing");

    let client = match QueryClient::from_config(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let service = AnalyticsService::new(client, QueryBuilder::new(&config.defaults));

    if let Err(e) = run(args.command, service, &config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(
    command: Command,
    service: AnalyticsService,
    config: &AnalyticsConfig,
) -> Result<(), String> {
    match command {
        Command::Events { filters, page } => {
            let explorer = load_explorer(service, config, &filters, &page).await?;
            let table = explorer.table();
            print_json(&serde_json::json!({
                "events": table.events(),
                "pagination": table.pagination(),
            }))
        }
        Command::Export {
            filters,
            page,
            format,
            output_dir,
            filename,
        } => {
            let explorer = load_explorer(service, config, &filters, &page).await?;
            let sink = DirectorySink::new(&output_dir);
            let artifact = export_to(
                &sink,
                &explorer.export_bundle(),
                format,
                Utc::now(),
                filename.as_deref(),
            )
            .await
            .map_err(|e| e.to_string())?;
            println!("{}", output_dir.join(&artifact.filename).display());
            Ok(())
        }
        Command::Trends {
            filters,
            timeframe,
            event_types,
        } => {
            let params = service
                .builder()
                .trends(&filters.input(), timeframe, &event_types);
            let chart = into_result(service.company_chart(&params).await)?;
            let labels: Vec<String> = chart
                .rows
                .iter()
                .map(|row| format_axis_date(&row.timestamp, timeframe.unwrap_or_default()))
                .collect();
            print_json(&serde_json::json!({
                "labels": labels,
                "chart": chart,
            }))
        }
        Command::Retention {
            filters,
            cohort_period,
            min_cohort_size,
        } => {
            let company = filters.companies.first().map(String::as_str);
            let params = service.builder().retention(
                &filters.input(),
                company,
                cohort_period,
                min_cohort_size,
            );
            let response = into_result(service.retention(&params).await)?;
            print_json(&serde_json::json!({
                "rows": retention_curve(&response.cohorts),
                "totalCohorts": response.total_cohorts,
                "averageRetention": response.average_retention,
            }))
        }
        Command::Dashboard { filters } => {
            let snapshot = load_dashboard(&service, &filters.input()).await;
            print_json(&snapshot)?;
            match snapshot.error {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }
    }
}

async fn load_explorer(
    service: AnalyticsService,
    config: &AnalyticsConfig,
    filters: &FilterArgs,
    page: &PageArgs,
) -> Result<EventExplorer, String> {
    let explorer = EventExplorer::new(service, config.defaults.search_debounce());
    explorer
        .update(|table| {
            table.set_filters(filters.explorer_filters());
            table.set_query(page.query.clone());
            if let Some(size) = page.page_size {
                table.set_page_size(size);
            }
            if let Some(n) = page.page {
                table.set_page(n);
            }
        })
        .await;

    match explorer.table().error() {
        Some(error) => Err(error.to_string()),
        None => Ok(explorer),
    }
}

fn into_result<T>(state: QueryState<T>) -> Result<T, String> {
    match (state.data, state.error) {
        (_, Some(error)) => Err(error),
        (Some(data), None) => Ok(data),
        (None, None) => Err("No data returned".to_string()),
    }
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    let out = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{out}");
    Ok(())
}
