//! Command-line surface. Each subcommand stands in for one dashboard view and
//! prints JSON to stdout.

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api::types::CreateClientMeeting;
use crate::api::{ApiClient, CachedDashboardClient, DashboardApi, RequestError};
use crate::auth::{AuthService, CredentialStore, FileCredentialStore};
use crate::cache::{CacheResult, DatasetKey, KpiStore, SessionEpoch, SqliteStorage};
use crate::config::Config;
use crate::query::{Query, QueryState};
use crate::transform::{
  commercial_sector_series, commercial_sector_success_entries, cumulative_totals,
  filter_by_time_range, filter_meetings, lead_source_success_entries, leads_source_series,
  meetings_summary, monthly_breakdown, reason_series, series_total, sort_meetings,
  success_rate_summary, summarize_new_leads, summary_cards, MeetingFilter, MeetingSort,
  TimeRange,
};

/// Password fallback for `login` and `signup`.
const PASSWORD_ENV: &str = "VAMBE_DASH_PASSWORD";

#[derive(Parser, Debug)]
#[command(name = "vambe-dash")]
#[command(about = "Vambe AI sales dashboard in the terminal")]
#[command(version)]
pub struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/vambe-dash/config.yaml)
  #[arg(short, long, global = true)]
  pub config: Option<PathBuf>,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Summary cards and the overview charts, fetched concurrently
  Dashboard {
    /// Area chart window: all, 90d or 30d
    #[arg(long, default_value = "all")]
    range: TimeRange,
  },
  /// One dataset by name, e.g. `leads-source` or `salesman-success-rate:3`
  Dataset {
    key: String,
    #[arg(long, default_value = "all")]
    range: TimeRange,
    /// Limit salesman performance to these salesmen (repeatable)
    #[arg(long = "salesman")]
    salesmen: Vec<String>,
  },
  /// Client meetings table
  Meetings {
    /// Match against client name or email
    #[arg(short, long)]
    search: Option<String>,
    #[arg(long)]
    salesman: Option<String>,
    #[arg(long)]
    closed: Option<bool>,
    /// `date`, `name` or `salesman`, optionally suffixed with `:asc` or `:desc`
    #[arg(long, default_value = "date:desc")]
    sort: MeetingSort,
  },
  /// AI classification of one meeting
  Classification { meeting_id: u64 },
  Salesmen,
  CreateSalesman { name: String },
  CreateMeeting {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    salesman: String,
    /// `YYYY-MM-DD`
    #[arg(long)]
    date: String,
    #[arg(long)]
    closed: bool,
    #[arg(long, default_value = "")]
    transcription: String,
  },
  /// Bulk import meetings from a CSV file
  Upload { file: PathBuf },
  Login {
    #[arg(long)]
    email: String,
    /// Falls back to VAMBE_DASH_PASSWORD
    #[arg(long)]
    password: Option<String>,
  },
  Signup {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: Option<String>,
  },
  /// Forget the token and every cached dataset
  Logout,
  Whoami,
  /// Drop one cached dataset, or all of them
  ClearCache { key: Option<String> },
  /// Send one raw request and print the JSON response
  Api {
    method: ApiMethod,
    /// Path under the base URL, e.g. `/salesmen/all`
    path: String,
    /// JSON body for post and put
    #[arg(long)]
    body: Option<String>,
  },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
  Get,
  Post,
  Put,
  Delete,
}

/// Options that shape how a dataset is presented.
#[derive(Debug, Clone, Default)]
struct ViewOptions {
  range: TimeRange,
  salesmen: Vec<String>,
}

/// Everything a command needs, built once per process.
pub struct Context {
  client: CachedDashboardClient,
  auth: AuthService,
  api: ApiClient,
}

impl Context {
  pub fn build(config: &Config, epoch: SessionEpoch) -> Result<Self> {
    let credentials: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::open()?);
    let store = Arc::new(open_store(config)?);
    let http = ApiClient::new(&config.api.base_url, credentials)?;
    let api = DashboardApi::new(http.clone());

    Ok(Self {
      client: CachedDashboardClient::new(api.clone(), Arc::clone(&store), epoch),
      auth: AuthService::new(api, store),
      api: http,
    })
  }

  fn store(&self) -> &KpiStore {
    self.client.store()
  }
}

fn open_store(config: &Config) -> Result<KpiStore> {
  if !config.cache.enabled {
    info!("KPI cache persistence disabled");
    return Ok(KpiStore::in_memory());
  }

  let path = config.cache_path()?;
  let storage = SqliteStorage::open_at(&path)?;
  info!(path = %path.display(), "Opened KPI cache");
  Ok(KpiStore::open(storage))
}

pub async fn run(command: Command, ctx: &Context) -> Result<()> {
  match command {
    Command::Dashboard { range } => dashboard(ctx, range).await,
    Command::Dataset {
      key,
      range,
      salesmen,
    } => {
      let key = parse_key(&key)?;
      watch_dataset(ctx, key, ViewOptions { range, salesmen }).await
    }
    Command::Meetings {
      search,
      salesman,
      closed,
      sort,
    } => {
      let filter = MeetingFilter {
        search,
        salesman,
        closed,
      };
      meetings(ctx, &filter, sort).await
    }
    Command::Classification { meeting_id } => {
      let result = ctx.client.meeting_classification(meeting_id).await;
      print_outcome(result)
    }
    Command::Salesmen => {
      let output = render_dataset(&ctx.client, DatasetKey::Salesmen, &ViewOptions::default()).await;
      print_json(&output)
    }
    Command::CreateSalesman { name } => print_outcome(ctx.client.create_salesman(&name).await),
    Command::CreateMeeting {
      name,
      email,
      phone,
      salesman,
      date,
      closed,
      transcription,
    } => {
      let meeting = CreateClientMeeting {
        name,
        email,
        phone,
        salesman_name: salesman,
        date,
        closed,
        transcription,
      };
      print_outcome(ctx.client.create_client_meeting(&meeting).await)
    }
    Command::Upload { file } => upload(ctx, &file).await,
    Command::Login { email, password } => {
      let password = password_or_env(password)?;
      print_outcome(ctx.auth.sign_in(&email, &password).await)
    }
    Command::Signup { email, password } => {
      let password = password_or_env(password)?;
      print_outcome(ctx.auth.sign_up(&email, &password).await)
    }
    Command::Logout => {
      ctx.auth.sign_out();
      print_json(&json!({ "signedOut": true }))
    }
    Command::Whoami => whoami(ctx).await,
    Command::ClearCache { key } => clear_cache(ctx, key.as_deref()),
    Command::Api { method, path, body } => {
      let body = parse_body(body.as_deref())?;
      print_outcome(raw_request(&ctx.api, method, &path, &body).await)
    }
  }
}

fn parse_key(name: &str) -> Result<DatasetKey> {
  DatasetKey::parse(name).ok_or_else(|| {
    let known: Vec<String> = DatasetKey::FIXED.iter().map(|k| k.storage_name()).collect();
    eyre!(
      "Unknown dataset: {}. Expected one of {}, or salesman-success-rate:<id>",
      name,
      known.join(", ")
    )
  })
}

fn password_or_env(password: Option<String>) -> Result<String> {
  password
    .or_else(|| std::env::var(PASSWORD_ENV).ok())
    .ok_or_else(|| eyre!("No password given. Pass --password or set {}.", PASSWORD_ENV))
}

async fn dashboard(ctx: &Context, range: TimeRange) -> Result<()> {
  let options = ViewOptions {
    range,
    ..Default::default()
  };
  let client = &ctx.client;

  let (cards, chart, leads, reasons, sources, sectors) = futures::join!(
    render_dataset(client, DatasetKey::SectionCards, &options),
    render_dataset(client, DatasetKey::ChartArea, &options),
    render_dataset(client, DatasetKey::NewLeads, &options),
    render_dataset(client, DatasetKey::Reasons, &options),
    render_dataset(client, DatasetKey::LeadsSource, &options),
    render_dataset(client, DatasetKey::CommercialSectors, &options),
  );

  print_json(&json!({
    "sectionCards": cards,
    "chartArea": chart,
    "newLeads": leads,
    "reasons": reasons,
    "leadsSource": sources,
    "commercialSectors": sectors,
  }))
}

/// Fetch one dataset through a [`Query`], giving up quietly on Ctrl-C.
async fn watch_dataset(ctx: &Context, key: DatasetKey, options: ViewOptions) -> Result<()> {
  let client = ctx.client.clone();
  let mut query = Query::new(move || {
    let client = client.clone();
    let options = options.clone();
    async move { Ok::<_, String>(render_dataset(&client, key, &options).await) }
  });

  let unmounted = CancellationToken::new();
  let on_interrupt = unmounted.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      on_interrupt.cancel();
    }
  });

  query.fetch_with(unmounted);

  let mut tick = tokio::time::interval(Duration::from_millis(50));
  loop {
    tick.tick().await;
    if !query.poll() {
      continue;
    }

    match query.state() {
      QueryState::Success(output) => return print_json(output),
      QueryState::Error(e) => return print_json(&json!({ "error": e })),
      QueryState::Idle => {
        warn!(dataset = %key, "Interrupted before the dataset arrived");
        return Ok(());
      }
      QueryState::Loading => {}
    }
  }
}

/// Dataset as printed: fetch metadata plus its chart-ready shape, or the
/// error next to whatever the store last held.
async fn render_dataset(
  client: &CachedDashboardClient,
  key: DatasetKey,
  options: &ViewOptions,
) -> Value {
  match load_dataset(client, key, options).await {
    Ok(result) => json!({
      "dataset": key.storage_name(),
      "source": result.source,
      "fetchedAt": result.fetched_at_millis,
      "data": result.data,
    }),
    Err(e) => failure(client.store(), key, &e),
  }
}

fn failure(store: &KpiStore, key: DatasetKey, err: &RequestError) -> Value {
  let last_known = store.raw(key);
  json!({
    "dataset": key.storage_name(),
    "error": err.message,
    "status": err.status,
    "lastKnown": last_known.as_ref().map(|record| &record.value),
    "fetchedAt": last_known.as_ref().map(|record| record.last_fetched_at_millis),
  })
}

async fn load_dataset(
  client: &CachedDashboardClient,
  key: DatasetKey,
  options: &ViewOptions,
) -> Result<CacheResult<Value>, RequestError> {
  match key {
    DatasetKey::SectionCards => shape(client.section_cards().await, |cards| {
      json!({ "raw": cards, "cards": summary_cards(cards) })
    }),
    DatasetKey::ChartArea => shape(client.chart_area().await, |points| {
      json!({
        "range": options.range.as_str(),
        "points": filter_by_time_range(points, options.range),
      })
    }),
    DatasetKey::ClientMeetings => shape(client.client_meetings().await, |meetings| json!(meetings)),
    DatasetKey::NewLeads => shape(client.new_leads().await, |leads| {
      json!({ "bars": leads, "summary": summarize_new_leads(leads) })
    }),
    DatasetKey::Reasons => shape(client.reasons().await, |reasons| {
      let series = reason_series(reasons);
      json!({ "total": series_total(&series), "series": series })
    }),
    DatasetKey::LeadsSource => shape(client.leads_source().await, |sources| {
      let series = leads_source_series(sources);
      json!({ "total": series_total(&series), "series": series })
    }),
    DatasetKey::CommercialSectors => shape(client.commercial_sectors().await, |sectors| {
      let series = commercial_sector_series(sectors);
      json!({ "total": series_total(&series), "series": series })
    }),
    DatasetKey::LeadsSourceSuccessRate => shape(client.leads_source_success_rate().await, |rates| {
      let entries = lead_source_success_entries(rates);
      json!({ "summary": success_rate_summary(&entries), "entries": entries })
    }),
    DatasetKey::CommercialSectorSuccessRate => {
      shape(client.commercial_sector_success_rate().await, |rates| {
        let entries = commercial_sector_success_entries(rates);
        json!({ "summary": success_rate_summary(&entries), "entries": entries })
      })
    }
    DatasetKey::SalesmanSuccessRate { salesman_id } => {
      shape(client.salesman_success_rate(salesman_id).await, |rates| {
        let entries = commercial_sector_success_entries(rates);
        json!({ "summary": success_rate_summary(&entries), "entries": entries })
      })
    }
    DatasetKey::Salesmen => shape(client.salesmen().await, |salesmen| json!(salesmen)),
    DatasetKey::SalesmanPerformance => shape(client.salesman_performance().await, |performance| {
      json!({
        "monthly": monthly_breakdown(performance, &options.salesmen),
        "cumulative": cumulative_totals(performance, &options.salesmen),
      })
    }),
  }
}

fn shape<T>(
  result: Result<CacheResult<T>, RequestError>,
  f: impl FnOnce(&T) -> Value,
) -> Result<CacheResult<Value>, RequestError> {
  Ok(result?.map(|data| f(&data)))
}

async fn meetings(ctx: &Context, filter: &MeetingFilter, sort: MeetingSort) -> Result<()> {
  let output = match ctx.client.client_meetings().await {
    Ok(result) => {
      let mut rows = filter_meetings(&result.data, filter);
      sort_meetings(&mut rows, sort);
      json!({
        "source": result.source,
        "fetchedAt": result.fetched_at_millis,
        "summary": meetings_summary(&result.data, Utc::now()),
        "shown": rows.len(),
        "meetings": rows,
      })
    }
    Err(e) => failure(ctx.store(), DatasetKey::ClientMeetings, &e),
  };

  print_json(&output)
}

async fn upload(ctx: &Context, file: &Path) -> Result<()> {
  let contents = std::fs::read(file)
    .map_err(|e| eyre!("Failed to read {}: {}", file.display(), e))?;
  let file_name = file
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_else(|| "upload.csv".to_string());

  print_outcome(ctx.client.upload_csv(&file_name, contents).await)
}

async fn whoami(ctx: &Context) -> Result<()> {
  let Some(user) = ctx.auth.current_user() else {
    return print_json(&json!({ "authenticated": false }));
  };

  let output = match ctx.auth.profile().await {
    Ok(profile) => json!({ "authenticated": true, "user": user, "profile": profile }),
    Err(e) => json!({
      "authenticated": ctx.auth.is_authenticated(),
      "user": user,
      "error": e.message,
      "status": e.status,
    }),
  };

  print_json(&output)
}

fn clear_cache(ctx: &Context, key: Option<&str>) -> Result<()> {
  match key {
    Some(name) => {
      let key = parse_key(name)?;
      ctx.store().clear_key(key)?;
      print_json(&json!({ "cleared": [key.storage_name()] }))
    }
    None => {
      let cleared: Vec<String> = ctx
        .store()
        .cached_keys()
        .iter()
        .map(DatasetKey::storage_name)
        .collect();
      ctx.store().clear_all()?;
      print_json(&json!({ "cleared": cleared }))
    }
  }
}

fn parse_body(body: Option<&str>) -> Result<Value> {
  match body {
    Some(raw) => serde_json::from_str(raw).map_err(|e| eyre!("Invalid --body JSON: {}", e)),
    None => Ok(json!({})),
  }
}

/// Uncached request through the same client the datasets use.
async fn raw_request(
  api: &ApiClient,
  method: ApiMethod,
  path: &str,
  body: &Value,
) -> Result<Value, RequestError> {
  match method {
    ApiMethod::Get => api.get(path).await,
    ApiMethod::Post => api.post(path, body).await,
    ApiMethod::Put => api.put(path, body).await,
    ApiMethod::Delete => api.delete(path).await,
  }
}

/// Print a mutation's result, or its error, without failing the process.
fn print_outcome<T: Serialize>(result: Result<T, RequestError>) -> Result<()> {
  match result {
    Ok(value) => print_json(&value),
    Err(e) => print_json(&json!({ "error": e.message, "status": e.status })),
  }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
  let rendered =
    serde_json::to_string_pretty(value).map_err(|e| eyre!("Failed to render output: {}", e))?;
  println!("{}", rendered);
  Ok(())
}
