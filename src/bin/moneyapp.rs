//! CLI binary for browsing and recording MoneyApp transactions.

use std::io::{self, Write as _};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use moneyapp_rs::config::{API_URL_ENV, CURRENCY_ENV, Config};
use moneyapp_rs::form::{AddForm, PickerStep};
use moneyapp_rs::models::{
    Local, NaiveDate, NaiveTime, Section, Structure, StructureItem, Transaction, TransactionKind,
};
use moneyapp_rs::{Alert, Host, ItemView, MoneyAppBlocking, SectionHeader, Tone};
use owo_colors::OwoColorize;

/// Format of dates shown in the transaction tables.
const TABLE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format of the saved transaction's date in the confirmation line.
const CONFIRM_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// MoneyApp CLI: list and record personal finance transactions.
#[derive(Debug, Parser)]
#[command(name = "moneyapp", version, about)]
struct Cli {
    /// Base URL of the MoneyApp API.
    #[arg(long, global = true, value_name = "URL", env = API_URL_ENV)]
    api_url: Option<String>,
    /// Currency symbol prefixed to amounts.
    #[arg(long, global = true, value_name = "SYMBOL", env = CURRENCY_ENV)]
    currency: Option<String>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Show transactions grouped by period, with subtotals.
    List,
    /// Show the categories, accounts and people known to the server.
    Structure,
    /// Record a new transaction.
    Add(AddArgs),
}

/// Arguments for the `add` subcommand.
#[derive(Debug, Args)]
struct AddArgs {
    /// Transaction type: transaction, roll or self.
    #[arg(long = "type", value_name = "TYPE", value_parser = parse_kind)]
    kind: TransactionKind,
    /// Signed amount written canonically, e.g. -250 or 12.5.
    #[arg(long, allow_hyphen_values = true)]
    amount: String,
    /// Category name or id (type `transaction`).
    #[arg(long)]
    category: Option<String>,
    /// Account name or id (types `transaction` and `roll`).
    #[arg(long)]
    account: Option<String>,
    /// Source account name or id (type `self`).
    #[arg(long)]
    from: Option<String>,
    /// Destination account name or id (type `self`).
    #[arg(long)]
    to: Option<String>,
    /// Person name or id (type `roll`).
    #[arg(long)]
    person: Option<String>,
    /// Free-text comment.
    #[arg(long, default_value = "")]
    comment: String,
    /// Local date (YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    /// Local time (HH:MM). Requires --date; defaults to the current time
    /// of day.
    #[arg(long, requires = "date", value_parser = parse_time)]
    time: Option<NaiveTime>,
}

/// Host that prints alerts on stderr and counts them.
#[derive(Debug, Default)]
struct TerminalHost {
    /// Number of alerts raised so far.
    alerts: core::cell::Cell<usize>,
}

impl TerminalHost {
    /// Returns the number of alerts raised so far.
    fn alert_count(&self) -> usize {
        self.alerts.get()
    }
}

impl Host for TerminalHost {
    fn alert(&self, alert: &Alert) {
        self.alerts.set(self.alerts.get().saturating_add(1));
        let _ignored = writeln!(
            io::stderr().lock(),
            "{} {}",
            format_args!("{}:", alert.title).red().bold(),
            alert.message
        );
    }

    fn form_closed(&self) {
        tracing::debug!("add form closed");
    }
}

/// Parses a transaction type for clap.
fn parse_kind(s: &str) -> Result<TransactionKind, String> {
    s.parse().map_err(|err| format!("{err}"))
}

/// Parses a date string in `YYYY-MM-DD` format for clap.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|err| format!("{err}"))
}

/// Parses a time string in `HH:MM` format for clap.
fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|err| format!("{err}"))
}

/// Resolves settings from env files, then applies the command-line (and
/// process environment) values on top.
fn resolve_config(
    api_url: Option<&str>,
    currency: Option<&str>,
) -> moneyapp_rs::Result<Config> {
    let mut config = Config::from_env_and_files(&Config::default_env_files())?;
    if let Some(url) = api_url.filter(|url| !url.is_empty()) {
        config = config.with_api_url(url)?;
    }
    if let Some(symbol) = currency.filter(|symbol| !symbol.is_empty()) {
        config = config.with_currency(symbol);
    }
    Ok(config)
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = match resolve_config(cli.api_url.as_deref(), cli.currency.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} invalid configuration: {err}",
                "error:".red().bold()
            )?;
            writeln!(
                io::stderr().lock(),
                "  {} set {} or pass --api-url",
                "hint:".cyan(),
                API_URL_ENV
            )?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut app = match MoneyAppBlocking::builder()
        .config(&config)
        .host(TerminalHost::default())
        .build()
    {
        Ok(app) => app,
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} failed to build client: {err}",
                "error:".red().bold()
            )?;
            return Ok(ExitCode::FAILURE);
        }
    };

    dispatch(&mut app, &config, cli.command)
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch(
    app: &mut MoneyAppBlocking<TerminalHost>,
    config: &Config,
    command: Command,
) -> io::Result<ExitCode> {
    match command {
        Command::List => cmd_list(app, config),
        Command::Structure => cmd_structure(app),
        Command::Add(args) => cmd_add(app, config, &args),
    }
}

/// Executes the `list` subcommand: loads and prints the grouped list.
fn cmd_list(app: &mut MoneyAppBlocking<TerminalHost>, config: &Config) -> io::Result<ExitCode> {
    let spinner = make_spinner("Loading transactions...");
    let loaded = app.refresh();
    spinner.finish_and_clear();
    if !loaded {
        return Ok(ExitCode::FAILURE);
    }
    print_sections(&mut io::stdout().lock(), app.list().sections(), config)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `structure` subcommand: prints the reference data.
fn cmd_structure(app: &mut MoneyAppBlocking<TerminalHost>) -> io::Result<ExitCode> {
    if !open_form(app)? {
        app.close_form();
        return Ok(ExitCode::FAILURE);
    }
    print_structure(&mut io::stdout().lock(), app.form().structure())?;
    app.close_form();
    Ok(ExitCode::SUCCESS)
}

/// Executes the `add` subcommand: fills the form and saves it.
fn cmd_add(
    app: &mut MoneyAppBlocking<TerminalHost>,
    config: &Config,
    args: &AddArgs,
) -> io::Result<ExitCode> {
    if !open_form(app)? {
        app.close_form();
        return Ok(ExitCode::FAILURE);
    }

    if let Err(message) = fill_form(app.form_mut(), args) {
        writeln!(io::stderr().lock(), "{} {message}", "error:".red().bold())?;
        app.close_form();
        return Ok(ExitCode::FAILURE);
    }
    let payload = match app.form().fields().validate() {
        Ok(payload) => payload,
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} {err}",
                "error:".red().bold()
            )?;
            app.close_form();
            return Ok(ExitCode::FAILURE);
        }
    };

    let spinner = make_spinner("Saving transaction...");
    let outcome = app.save();
    spinner.finish_and_clear();
    match outcome {
        Ok(true) => {
            print_saved(&mut io::stdout().lock(), &payload, config)?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(false) => {
            app.close_form();
            Ok(ExitCode::FAILURE)
        }
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} {err}",
                "error:".red().bold()
            )?;
            app.close_form();
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Opens the add form with a spinner. Returns `false` if the reference
/// data could not be loaded (the alert is already printed).
fn open_form(app: &mut MoneyAppBlocking<TerminalHost>) -> io::Result<bool> {
    let alerts_before = app.host().alert_count();
    let spinner = make_spinner("Loading form data...");
    let opened = app.open_form();
    spinner.finish_and_clear();
    if let Err(err) = opened {
        writeln!(
            io::stderr().lock(),
            "{} {err}",
            "error:".red().bold()
        )?;
        return Ok(false);
    }
    Ok(app.host().alert_count() == alerts_before)
}

/// Looks up a reference by name or id, naming it in the error message.
fn resolve<Id: Clone>(
    label: &str,
    name: &str,
    found: Option<&StructureItem<Id>>,
) -> Result<Id, String> {
    found
        .map(|item| item.id.clone())
        .ok_or_else(|| format!("{label} not found: {name}"))
}

/// Copies the arguments into the form, resolving names against the loaded
/// structure and driving the date picker.
///
/// References a type does not use are ignored. Missing required ones are
/// left empty for validation to report.
fn fill_form(form: &mut AddForm, args: &AddArgs) -> Result<(), String> {
    form.set_kind(Some(args.kind)).map_err(|err| err.to_string())?;
    form.set_amount(args.amount.as_str())
        .map_err(|err| err.to_string())?;
    form.set_comment(args.comment.as_str())
        .map_err(|err| err.to_string())?;

    match args.kind {
        TransactionKind::Transaction => {
            if let Some(name) = args.category.as_deref() {
                let id = resolve("category", name, form.structure().find_category(name))?;
                form.select_category(Some(id)).map_err(|err| err.to_string())?;
            }
            if let Some(name) = args.account.as_deref() {
                let id = resolve("account", name, form.structure().find_account(name))?;
                form.select_account(Some(id)).map_err(|err| err.to_string())?;
            }
        }
        TransactionKind::Roll => {
            if let Some(name) = args.person.as_deref() {
                let id = resolve("person", name, form.structure().find_person(name))?;
                form.select_person(Some(id)).map_err(|err| err.to_string())?;
            }
            if let Some(name) = args.account.as_deref() {
                let id = resolve("account", name, form.structure().find_account(name))?;
                form.select_account(Some(id)).map_err(|err| err.to_string())?;
            }
        }
        TransactionKind::SelfTransfer => {
            if let Some(name) = args.from.as_deref() {
                let id = resolve("account", name, form.structure().find_account(name))?;
                form.select_from_account(Some(id))
                    .map_err(|err| err.to_string())?;
            }
            if let Some(name) = args.to.as_deref() {
                let id = resolve("account", name, form.structure().find_account(name))?;
                form.select_to_account(Some(id))
                    .map_err(|err| err.to_string())?;
            }
        }
    }

    if let Some(date) = args.date {
        form.open_date_picker().map_err(|err| err.to_string())?;
        form.pick_date(Some(date)).map_err(|err| err.to_string())?;
        if let PickerStep::Time(base) = form.date_input().step() {
            form.pick_time(Some(args.time.unwrap_or_else(|| base.time())))
                .map_err(|err| err.to_string())?;
        }
    }
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

/// Maps a tone to a table colour.
const fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Success => Color::Green,
        Tone::Warning => Color::Yellow,
    }
}

/// Prints one table per section, with a coloured header line.
fn print_sections<W: io::Write>(out: &mut W, sections: &[Section], config: &Config) -> io::Result<()> {
    if sections.is_empty() {
        writeln!(out, "{}", "No transactions found.".dimmed())?;
        return Ok(());
    }

    for section in sections {
        let header = SectionHeader::from(section);
        let total = format!("{}{}", config.currency, header.total);
        match header.tone {
            Tone::Success => writeln!(out, "{} {}", header.label.bold(), total.green().bold())?,
            Tone::Warning => writeln!(out, "{} {}", header.label.bold(), total.yellow().bold())?,
        }

        let mut table = Table::new();
        _ = table.load_preset(UTF8_FULL);
        _ = table.set_header(vec![
            Cell::new("Date").fg(Color::Cyan),
            Cell::new("Type").fg(Color::Cyan),
            Cell::new("Title").fg(Color::Cyan),
            Cell::new("Details").fg(Color::Cyan),
            Cell::new("Amount").fg(Color::Cyan),
            Cell::new("Comment").fg(Color::Cyan),
        ]);
        for transaction in &section.data {
            let item = ItemView::from(transaction);
            _ = table.add_row(vec![
                Cell::new(
                    transaction
                        .date
                        .with_timezone(&Local)
                        .format(TABLE_DATE_FORMAT),
                ),
                Cell::new(item.kind.label()),
                Cell::new(&item.title),
                Cell::new(item.subtitles.join(", ")),
                Cell::new(format!("{}{}", config.currency, item.amount)).fg(tone_color(item.tone)),
                Cell::new(&transaction.comment),
            ]);
        }
        writeln!(out, "{table}")?;
        writeln!(out)?;
    }
    Ok(())
}

/// Appends a name/id table of reference items, or a placeholder line.
fn print_items<W: io::Write, Id: AsRef<str>>(
    out: &mut W,
    title: &str,
    items: &[StructureItem<Id>],
) -> io::Result<()> {
    writeln!(
        out,
        "{} {}",
        title.green().bold(),
        format_args!("({})", items.len()).dimmed()
    )?;
    if items.is_empty() {
        writeln!(out, "{}", "None.".dimmed())?;
        writeln!(out)?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("ID").fg(Color::Cyan),
    ]);
    for item in items {
        _ = table.add_row(vec![Cell::new(&item.name), Cell::new(item.id.as_ref())]);
    }
    writeln!(out, "{table}")?;
    writeln!(out)?;
    Ok(())
}

/// Prints the categories, accounts and people.
fn print_structure<W: io::Write>(out: &mut W, structure: &Structure) -> io::Result<()> {
    print_items(out, "Categories", &structure.categories)?;
    print_items(out, "Accounts", &structure.accounts)?;
    print_items(out, "People", &structure.people)
}

/// Prints the confirmation for a saved transaction.
fn print_saved<W: io::Write>(out: &mut W, saved: &Transaction, config: &Config) -> io::Result<()> {
    writeln!(
        out,
        "{} {} {} {}",
        "Saved".green().bold(),
        saved.kind().label(),
        config.display_money(saved.amount),
        format_args!(
            "({})",
            saved.date.with_timezone(&Local).format(CONFIRM_DATE_FORMAT)
        )
        .dimmed()
    )?;
    writeln!(
        out,
        "  {} run {} to see it in the list",
        "hint:".cyan(),
        "moneyapp list".bold()
    )?;
    Ok(())
}

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            // If stderr itself failed there is nothing left to report to.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
