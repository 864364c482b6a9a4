//! CLI binary for browsing supermarket prices and running batch searches.

use std::fs;
use std::io::{self, Read, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use price_compare::client::{PriceBlockingClient, SearchBlockingClient};
use price_compare::config::Config;
use price_compare::form::{FormStatus, SEARCHING_MESSAGE, SearchForm};
use price_compare::listing::ListingView;
use price_compare::models::{NaiveDate, PriceRecord, SearchLang, Supermarket};
use price_compare::query::Listing;
use price_compare::render::{Align, PriceTable, render_table};
use price_compare::source::{BlockingPriceSource, BlockingSearchBackend};

/// Merchant shown when none is given.
const DEFAULT_MERCHANT: &str = "dirk";

/// Supermarket price comparison CLI.
#[derive(Debug, Parser)]
#[command(name = "price-compare", version, about)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// List products of one merchant, optionally filtered by name.
    Browse(ListingArgs),
    /// List promotions of one merchant, optionally filtered by name.
    Promotions {
        /// Merchant and name filter.
        #[command(flatten)]
        listing: ListingArgs,
        /// Only show promotions valid today.
        #[arg(long)]
        active: bool,
    },
    /// Search several products at once across supermarkets.
    Search(SearchArgs),
    /// Check that the search backend is reachable.
    Health,
}

/// Arguments shared by the listing subcommands.
#[derive(Debug, Args)]
struct ListingArgs {
    /// Merchant identifier.
    #[arg(long, default_value = DEFAULT_MERCHANT)]
    merchant: String,
    /// Case-insensitive product name filter.
    #[arg(long, default_value = "")]
    search: String,
}

/// Arguments for the `search` subcommand.
#[derive(Debug, Args)]
struct SearchArgs {
    /// Query language (du or en).
    #[arg(long, default_value = "du", value_parser = parse_lang)]
    lang: SearchLang,
    /// Restrict to a supermarket; repeat for several (default: all).
    #[arg(long = "supermarket", value_name = "ID", value_parser = parse_supermarket)]
    supermarkets: Vec<Supermarket>,
    /// Read queries from a file, one per line.
    #[arg(long, value_name = "FILE", conflicts_with = "queries")]
    file: Option<PathBuf>,
    /// Product queries; read from stdin when neither these nor --file are
    /// given.
    queries: Vec<String>,
}

/// Parses a query language for clap.
fn parse_lang(s: &str) -> Result<SearchLang, String> {
    s.parse().map_err(|err| format!("{err}"))
}

/// Parses a supermarket identifier for clap.
fn parse_supermarket(s: &str) -> Result<Supermarket, String> {
    s.parse().map_err(|err| format!("{err}"))
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = Config::from_env();
    dispatch(&config, cli.command)
}

/// Reports a client construction failure, usually a missing variable.
fn report_client_error(err: &price_compare::error::PriceCompareError) -> io::Result<ExitCode> {
    let mut out = io::stderr().lock();
    writeln!(
        out,
        "{} failed to build client: {err}",
        "error:".red().bold()
    )?;
    writeln!(
        out,
        "  {} create a .env file with SUPABASE_URL, SUPABASE_ANON_KEY and BACKEND_URL",
        "hint:".cyan()
    )?;
    Ok(ExitCode::FAILURE)
}

/// Builds the client a subcommand needs and dispatches to its handler.
fn dispatch(config: &Config, command: Command) -> io::Result<ExitCode> {
    match command {
        Command::Browse(args) => match PriceBlockingClient::from_config(config) {
            Ok(client) => cmd_listing(&client, Listing::Browse, &args, None),
            Err(err) => report_client_error(&err),
        },
        Command::Promotions { listing, active } => {
            match PriceBlockingClient::from_config(config) {
                Ok(client) => {
                    let today = active.then(|| Utc::now().date_naive());
                    cmd_listing(&client, Listing::Promotions, &listing, today)
                }
                Err(err) => report_client_error(&err),
            }
        }
        Command::Search(args) => match SearchBlockingClient::from_config(config) {
            Ok(client) => cmd_search(&client, &args, io::stdin().lock()),
            Err(err) => report_client_error(&err),
        },
        Command::Health => match SearchBlockingClient::from_config(config) {
            Ok(client) => cmd_health(&client),
            Err(err) => report_client_error(&err),
        },
    }
}

/// Keeps only the records whose validity window contains `today`.
fn active_on(records: &[PriceRecord], today: NaiveDate) -> Vec<PriceRecord> {
    records
        .iter()
        .filter(|record| record.is_valid_on(today))
        .cloned()
        .collect()
}

/// Executes a listing subcommand: fetches one page and prints it.
///
/// With `active_on_day`, promotions outside their validity window are
/// hidden.
fn cmd_listing<S: BlockingPriceSource>(
    source: &S,
    listing: Listing,
    args: &ListingArgs,
    active_on_day: Option<NaiveDate>,
) -> io::Result<ExitCode> {
    let mut view = ListingView::new(listing, args.merchant.as_str());
    let spinner = make_spinner(&format!("Loading {listing} for {}...", args.merchant));
    let _applied = view.refresh_blocking(source, &args.search);
    spinner.finish_and_clear();

    if let Some(message) = view.error() {
        writeln!(
            io::stderr().lock(),
            "{} failed to load {listing}: {message}",
            "error:".red().bold()
        )?;
        return Ok(ExitCode::FAILURE);
    }

    let table = match active_on_day {
        Some(today) => render_table(
            &active_on(view.records(), today),
            view.is_loading(),
            listing.empty_message(),
        ),
        None => view.table(),
    };
    let title = match listing {
        Listing::Browse => "Products",
        Listing::Promotions => "Promotions",
    };
    print_price_table(&format!("{title} ({})", args.merchant), &table)?;
    Ok(ExitCode::SUCCESS)
}

/// Collects the raw query text from `--file`, positional queries, or
/// `stdin`, in that order of preference.
fn read_query_text<R: Read>(args: &SearchArgs, mut stdin: R) -> io::Result<String> {
    if let Some(path) = args.file.as_ref() {
        return fs::read_to_string(path);
    }
    if !args.queries.is_empty() {
        return Ok(args.queries.join("\n"));
    }
    let mut text = String::new();
    let _read = stdin.read_to_string(&mut text)?;
    Ok(text)
}

/// Executes the `search` subcommand: submits every query line as one
/// batch and prints the raw response.
fn cmd_search<B: BlockingSearchBackend, R: Read>(
    backend: &B,
    args: &SearchArgs,
    stdin: R,
) -> io::Result<ExitCode> {
    let text = match read_query_text(args, stdin) {
        Ok(text) => text,
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} failed to read queries: {err}",
                "error:".red().bold()
            )?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut form = SearchForm::new();
    form.set_text(text);
    form.set_language(args.lang);
    if !args.supermarkets.is_empty() {
        form.select_only(args.supermarkets.iter().copied());
    }

    let spinner = make_spinner(SEARCHING_MESSAGE);
    let status = form.submit_blocking(backend);
    spinner.finish_and_clear();

    match status {
        FormStatus::Success => {
            let mut out = io::stdout().lock();
            writeln!(out, "{}", "Search results".green().bold())?;
            writeln!(out)?;
            writeln!(out, "{}", form.status_text())?;
            Ok(ExitCode::SUCCESS)
        }
        FormStatus::Failed => {
            writeln!(
                io::stderr().lock(),
                "{} {}",
                "error:".red().bold(),
                form.status_text()
            )?;
            Ok(ExitCode::FAILURE)
        }
        FormStatus::Idle | FormStatus::Searching => Ok(ExitCode::FAILURE),
    }
}

/// Executes the `health` subcommand: probes the search backend.
fn cmd_health(client: &SearchBlockingClient) -> io::Result<ExitCode> {
    let spinner = make_spinner("Checking search backend...");
    let outcome = client.health();
    spinner.finish_and_clear();

    match outcome {
        Ok(health) if health.is_ok() => {
            writeln!(
                io::stdout().lock(),
                "{} {}",
                "Backend healthy".green().bold(),
                health.message.unwrap_or_default().dimmed()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(health) => {
            writeln!(
                io::stderr().lock(),
                "{} backend reported status {}",
                "error:".red().bold(),
                health.status.bold()
            )?;
            Ok(ExitCode::FAILURE)
        }
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} health check failed: {err}",
                "error:".red().bold()
            )?;
            Ok(ExitCode::FAILURE)
        }
    }
}

// ── Output formatting ────────────────────────────────────────────────

/// Prints a rendered price table under a title.
fn print_price_table(title: &str, table: &PriceTable) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if let Some(placeholder) = table.placeholder.as_ref() {
        writeln!(out, "{}", placeholder.message.dimmed())?;
        return Ok(());
    }

    let alignments = table.columns.map(|column| match column.align {
        Align::Left => CellAlignment::Left,
        Align::Right => CellAlignment::Right,
    });

    let mut grid = Table::new();
    _ = grid.load_preset(UTF8_FULL);
    _ = grid.set_header(
        table
            .columns
            .iter()
            .map(|column| Cell::new(column.title).fg(Color::Cyan)),
    );

    for row in &table.rows {
        _ = grid.add_row(
            row.cells
                .iter()
                .zip(alignments)
                .map(|(text, align)| Cell::new(text).set_alignment(align)),
        );
    }

    writeln!(
        out,
        "{} {}",
        title.green().bold(),
        format_args!("({})", table.rows.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{grid}")?;
    Ok(())
}

/// Creates a spinner with the given message.
fn make_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(core::time::Duration::from_millis(80));
    spinner
}

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use price_compare::error::{PriceCompareError, Result};
    use price_compare::models::{MerchantId, SearchRequest};
    use price_compare::render::render_row;
    use price_compare::source::InMemoryPriceSource;

    /// Search backend double that records requests.
    #[derive(Debug, Default)]
    struct RecordingBackend {
        /// Requests received so far.
        calls: Mutex<Vec<SearchRequest>>,
        /// Whether to answer with a server error.
        fail: bool,
    }

    impl BlockingSearchBackend for RecordingBackend {
        fn submit(&self, request: &SearchRequest) -> Result<serde_json::Value> {
            self.calls.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(PriceCompareError::Api {
                    status: 500,
                    message: "Internal Server Error".to_owned(),
                });
            }
            Ok(serde_json::json!({ "results": [] }))
        }
    }

    /// Creates a test record for the given merchant.
    fn record(name: &str, valid_from: &str, valid_to: &str) -> PriceRecord {
        PriceRecord {
            source_url: Some(format!("https://shop.example/{name}")),
            product_name: Some(name.to_owned()),
            unit_label: Some("1 l".to_owned()),
            current_price: Some(1.29),
            regular_price: Some(1.59),
            valid_from: Some(valid_from.to_owned()),
            valid_to: Some(valid_to.to_owned()),
            merchant: Some(MerchantId::from(DEFAULT_MERCHANT)),
        }
    }

    fn listing_args(search: &str) -> ListingArgs {
        ListingArgs {
            merchant: DEFAULT_MERCHANT.to_owned(),
            search: search.to_owned(),
        }
    }

    fn search_args(queries: &[&str]) -> SearchArgs {
        SearchArgs {
            lang: SearchLang::Dutch,
            supermarkets: Vec::new(),
            file: None,
            queries: queries.iter().map(|&query| query.to_owned()).collect(),
        }
    }

    fn day(year: i32, month: u32, date: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, date).unwrap()
    }

    // ── parser tests ─────────────────────────────────────────────────

    #[test]
    fn parse_lang_accepts_known_codes() {
        assert_eq!(parse_lang("en").unwrap(), SearchLang::English);
        assert_eq!(parse_lang("du").unwrap(), SearchLang::Dutch);
        assert!(parse_lang("fr").is_err());
    }

    #[test]
    fn parse_supermarket_accepts_ids() {
        assert_eq!(parse_supermarket("AH").unwrap(), Supermarket::Ah);
        assert_eq!(
            parse_supermarket("hoogvliet").unwrap(),
            Supermarket::Hoogvliet
        );
        assert!(parse_supermarket("lidl").is_err());
    }

    #[test]
    fn cli_parses_search_flags() {
        let cli = Cli::try_parse_from([
            "price-compare",
            "search",
            "--lang",
            "en",
            "--supermarket",
            "ah",
            "--supermarket",
            "dirk",
            "milk",
            "bread",
        ])
        .unwrap();
        let Command::Search(args) = cli.command else {
            unreachable!("expected search command");
        };
        assert_eq!(args.lang, SearchLang::English);
        assert_eq!(args.supermarkets, vec![Supermarket::Ah, Supermarket::Dirk]);
        assert_eq!(args.queries, vec!["milk", "bread"]);
    }

    #[test]
    fn cli_parses_promotions_defaults() {
        let cli = Cli::try_parse_from(["price-compare", "promotions", "--active"]).unwrap();
        let Command::Promotions { listing, active } = cli.command else {
            unreachable!("expected promotions command");
        };
        assert!(active);
        assert_eq!(listing.merchant, "dirk");
        assert!(listing.search.is_empty());
    }

    // ── active_on tests ──────────────────────────────────────────────

    #[test]
    fn active_on_keeps_current_promotions() {
        let records = vec![
            record("melk", "2024-05-01", "2024-05-07"),
            record("kaas", "2024-04-01", "2024-04-07"),
        ];
        let active = active_on(&records, day(2024, 5, 7));
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].product_name.as_deref(), Some("melk"));
    }

    // ── read_query_text tests ────────────────────────────────────────

    #[test]
    fn read_query_text_prefers_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queries.txt");
        fs::write(&path, "volle melk\nkipfilet\n").unwrap();
        let mut args = search_args(&[]);
        args.file = Some(path);
        let text = read_query_text(&args, io::empty()).unwrap();
        assert_eq!(text, "volle melk\nkipfilet\n");
    }

    #[test]
    fn read_query_text_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = search_args(&[]);
        args.file = Some(dir.path().join("missing.txt"));
        assert!(read_query_text(&args, io::empty()).is_err());
    }

    #[test]
    fn read_query_text_joins_positionals() {
        let args = search_args(&["melk", "brood"]);
        let text = read_query_text(&args, io::empty()).unwrap();
        assert_eq!(text, "melk\nbrood");
    }

    #[test]
    fn read_query_text_falls_back_to_stdin() {
        let args = search_args(&[]);
        let text = read_query_text(&args, "eieren\n".as_bytes()).unwrap();
        assert_eq!(text, "eieren\n");
    }

    // ── cmd_listing tests ────────────────────────────────────────────

    #[test]
    fn cmd_listing_empty() {
        let source = InMemoryPriceSource::new();
        let code = cmd_listing(&source, Listing::Browse, &listing_args(""), None).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(source.query_count(), 1);
    }

    #[test]
    fn cmd_listing_with_data() {
        let source = InMemoryPriceSource::new();
        source.insert(
            "food_prices",
            vec![record("melk", "2024-05-01", "2024-05-07")],
        );
        let code = cmd_listing(&source, Listing::Browse, &listing_args("MELK"), None).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn cmd_listing_active_promotions() {
        let source = InMemoryPriceSource::new();
        source.insert(
            "v_promotions",
            vec![record("melk", "2024-05-01", "2024-05-07")],
        );
        let code = cmd_listing(
            &source,
            Listing::Promotions,
            &listing_args(""),
            Some(day(2030, 1, 1)),
        )
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn cmd_listing_source_failure() {
        let source = InMemoryPriceSource::new();
        source.fail_with(Some("connection refused"));
        let code = cmd_listing(&source, Listing::Promotions, &listing_args(""), None).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    // ── cmd_search tests ─────────────────────────────────────────────

    #[test]
    fn cmd_search_sends_batch() {
        let backend = RecordingBackend::default();
        let mut args = search_args(&["volle melk", "", "kipfilet"]);
        args.supermarkets = vec![Supermarket::Dirk];
        let code = cmd_search(&backend, &args, io::empty()).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].queries, vec!["volle melk", "kipfilet"]);
        assert_eq!(calls[0].supermarkets.len(), 1);
    }

    #[test]
    fn cmd_search_without_queries_skips_backend() {
        let backend = RecordingBackend::default();
        let code = cmd_search(&backend, &search_args(&[]), "  \n".as_bytes()).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn cmd_search_backend_failure() {
        let backend = RecordingBackend {
            fail: true,
            ..RecordingBackend::default()
        };
        let code = cmd_search(&backend, &search_args(&["melk"]), io::empty()).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    // ── cmd_health tests ─────────────────────────────────────────────

    #[test]
    fn cmd_health_unreachable_backend() {
        let client = SearchBlockingClient::builder()
            .base_url("http://127.0.0.1:9")
            .timeout(core::time::Duration::from_secs(2))
            .build()
            .unwrap();
        let code = cmd_health(&client).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    // ── print function tests ─────────────────────────────────────────

    #[test]
    fn print_price_table_placeholder() {
        let table = render_table(&[], false, "No products found.");
        assert!(print_price_table("Products", &table).is_ok());
    }

    #[test]
    fn print_price_table_with_rows() {
        let records = vec![record("melk", "2024-05-01", "2024-05-07"), {
            let mut bare = record("kaas", "", "");
            bare.current_price = None;
            bare.source_url = None;
            bare
        }];
        let table = render_table(&records, false, "No products found.");
        assert_eq!(table.row_count(), 2);
        assert_eq!(render_row(&records[1], 1).cells[2], "-");
        assert!(print_price_table("Products", &table).is_ok());
    }

    #[test]
    fn make_spinner_creates_spinner() {
        let spinner = make_spinner("Testing...");
        spinner.finish_and_clear();
    }
}
