use clap::{Parser, Subcommand};
use hospice_dashboard::cli;
use hospice_dashboard::error::DashboardResult;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(about = "Hospice dashboard workbook tool: read sheets, post chat, seed sample data.")]
#[command(long_about = "Dashboard - Workbook tooling for the hospice team dashboard
Reads the Active, Vendors and Chat sheets the dashboard server serves.

COMMANDS:
  sheets  - List the sheets in a workbook
  read    - Print a sheet as JSON row objects
  chat    - Show chat messages, optionally for one user
  post    - Append a chat message
  seed    - Write the sample Vendors and Chat sheets
  check   - Validate sheet headers
  push    - Upload the workbook to a remote spreadsheet

The workbook defaults to \"Dashboard Clone.xlsx\" or $DASHBOARD_WORKBOOK.

EXAMPLES:
  dashboard seed                                  # Create sample sheets
  dashboard read Active --active-dates            # Patients with real dates
  dashboard chat --user Christa                   # Christa's conversations
  dashboard post --user Alyssa -m \"Meeting at 2\" --recipients all")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sheets in a workbook
    Sheets {
        /// Workbook file (.xlsx)
        #[arg(short, long, env = "DASHBOARD_WORKBOOK")]
        file: Option<PathBuf>,
    },

    #[command(long_about = "Print a sheet as an array of JSON row objects.

The first row of the sheet is the header row. Each later row becomes an
object keyed by header. Columns named with --date are converted from
spreadsheet day serials to ISO-8601 timestamps.

EXAMPLES:
  dashboard read Vendors
  dashboard read Active --active-dates
  dashboard read Visits --date \"Visit Date\" --optional")]
    /// Print a sheet as JSON row objects
    Read {
        /// Sheet name
        sheet: String,

        /// Workbook file (.xlsx)
        #[arg(short, long, env = "DASHBOARD_WORKBOOK")]
        file: Option<PathBuf>,

        /// Column holding date serials (repeatable)
        #[arg(short, long = "date")]
        date_fields: Vec<String>,

        /// Treat the Active sheet's date columns as dates
        #[arg(long)]
        active_dates: bool,

        /// Print [] instead of failing when the sheet is missing
        #[arg(long)]
        optional: bool,
    },

    /// Show chat messages, optionally only those a user takes part in
    Chat {
        /// Workbook file (.xlsx)
        #[arg(short, long, env = "DASHBOARD_WORKBOOK")]
        file: Option<PathBuf>,

        /// Only show messages this user participates in
        #[arg(short, long)]
        user: Option<String>,
    },

    #[command(long_about = "Append a chat message to the Chat sheet.

RECIPIENTS:
  all                 - Everyone who has taken part in the chat so far
  <Alyssa><Christa>   - Coded participant list
  @Dr. Moore          - A single mention
  Alyssa, Amber       - Comma separated names

The sender is always a participant.")]
    /// Append a chat message
    Post {
        /// Workbook file (.xlsx)
        #[arg(short, long, env = "DASHBOARD_WORKBOOK")]
        file: Option<PathBuf>,

        /// Sender
        #[arg(short, long)]
        user: String,

        /// Message text
        #[arg(short, long)]
        message: String,

        /// Message type (GM, DM, NOTE)
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// Recipients
        #[arg(short, long)]
        recipients: Option<String>,

        /// Tags
        #[arg(long)]
        tags: Option<String>,
    },

    /// Write the sample Vendors and Chat sheets (both unless one is chosen)
    Seed {
        /// Workbook file (.xlsx), created when missing
        #[arg(short, long, env = "DASHBOARD_WORKBOOK")]
        file: Option<PathBuf>,

        /// Only the Vendors sheet
        #[arg(long)]
        vendors: bool,

        /// Only the Chat sheet
        #[arg(long)]
        chat: bool,
    },

    /// Validate the Active, Vendors and Chat headers
    Check {
        /// Workbook file (.xlsx)
        #[arg(short, long, env = "DASHBOARD_WORKBOOK")]
        file: Option<PathBuf>,
    },

    /// Upload every sheet to a remote spreadsheet
    Push {
        /// Workbook file (.xlsx)
        #[arg(short, long, env = "DASHBOARD_WORKBOOK")]
        file: Option<PathBuf>,

        /// Remote spreadsheet ID
        #[arg(short, long, env = "DASHBOARD_SPREADSHEET_ID")]
        spreadsheet_id: String,

        /// JSON file holding {"access_token": "..."}
        #[arg(short, long, env = "DASHBOARD_TOKEN_FILE")]
        token_file: PathBuf,
    },
}

fn main() -> DashboardResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sheets { file } => cli::sheets(cli::workbook_path(file)),

        Commands::Read {
            sheet,
            file,
            date_fields,
            active_dates,
            optional,
        } => cli::read(
            cli::workbook_path(file),
            sheet,
            date_fields,
            active_dates,
            optional,
        ),

        Commands::Chat { file, user } => cli::chat(cli::workbook_path(file), user),

        Commands::Post {
            file,
            user,
            message,
            kind,
            recipients,
            tags,
        } => cli::post(cli::workbook_path(file), user, message, kind, recipients, tags),

        Commands::Seed {
            file,
            vendors,
            chat,
        } => cli::seed(cli::workbook_path(file), vendors, chat),

        Commands::Check { file } => cli::check(cli::workbook_path(file)),

        Commands::Push {
            file,
            spreadsheet_id,
            token_file,
        } => cli::push(cli::workbook_path(file), spreadsheet_id, token_file),
    }
}
