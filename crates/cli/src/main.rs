use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, FixedOffset, NaiveDate};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use daybook_core::config::DEFAULT_CONFIG_FILE;
use daybook_core::logging::{self, sanitize_path};
use daybook_core::{
    Clock, Config, DailySummarizer, ListQuery, NewReport, Report, ReportAuthor, ReportService, ReportStats,
    ReportType, SearchScope, SystemClock, Tally,
};
use daybook_store::MarkdownReportStore;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// daybook - a dated markdown journal
#[derive(Parser, Debug)]
#[command(name = "daybook")]
#[command(about = "Create, search and summarize dated markdown reports", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to daybook.toml (default: ./daybook.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a new report into today's journal partition
    Create(CreateArgs),
    /// List recent reports, most recently updated first
    List(ListArgs),
    /// Search the last year of reports for a keyword
    Search(SearchArgs),
    /// Show report statistics
    Stats(StatsArgs),
    /// Write the daily activity report
    Observe,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[arg(long)]
    title: String,

    /// tech, paper, life or meta
    #[arg(long = "type", value_name = "TYPE")]
    report_type: String,

    /// Comma-separated tags
    #[arg(long, value_delimiter = ',', value_name = "TAGS")]
    tags: Vec<String>,

    /// user, agent:self_observer, agent:summarizer or agent:ingestor
    #[arg(long, default_value = "user")]
    author: String,

    /// Markdown body
    #[arg(long)]
    body: String,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Maximum number of reports
    #[arg(short = 'n', long, default_value_t = 10)]
    limit: usize,

    /// Only reports updated on or after this date (default: 30 days ago)
    #[arg(long, value_name = "YYYY-MM-DD")]
    since: Option<NaiveDate>,

    #[arg(long = "type", value_name = "TYPE")]
    report_type: Option<String>,

    #[arg(long)]
    author: Option<String>,

    /// Match reports carrying any of these comma-separated tags
    #[arg(long, value_delimiter = ',', value_name = "TAGS")]
    tags: Vec<String>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Include report bodies
    #[arg(long)]
    show_body: bool,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Case-insensitive keyword
    keyword: String,

    #[arg(long, conflicts_with_all = ["body_only", "tags_only"])]
    title_only: bool,

    #[arg(long, conflicts_with = "tags_only")]
    body_only: bool,

    #[arg(long)]
    tags_only: bool,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// Start of the period (default: 30 days ago)
    #[arg(long, value_name = "YYYY-MM-DD")]
    since: Option<NaiveDate>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        return cmd_completions(shell, &mut io::stdout());
    }

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = Config::load(&config_path)?;
    let _guard = logging::init_logging(Some(config.logging.clone().into())).context("Failed to initialize logging")?;

    if cli.verbose {
        eprintln!("{} Using config: {}", "Info:".blue().bold(), config_path.display());
    }

    let clock = Arc::new(SystemClock::new(config.utc_offset()?));
    let journal = Journal::open(&config, clock)?;

    if cli.verbose {
        eprintln!(
            "{} Journal root: {}",
            "Info:".blue().bold(),
            sanitize_path(journal.store.paths().root())
        );
    }

    let mut out = io::stdout().lock();
    match cli.command {
        Commands::Create(args) => cmd_create(&journal, args, &mut out)?,
        Commands::List(args) => cmd_list(&journal, args, &mut out)?,
        Commands::Search(args) => cmd_search(&journal, args, &mut out)?,
        Commands::Stats(args) => cmd_stats(&journal, args, &mut out)?,
        Commands::Observe => cmd_observe(&journal, config.observer.enabled, &mut out)?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// The markdown store and the service on top of it
struct Journal {
    store: Arc<MarkdownReportStore>,
    clock: Arc<dyn Clock>,
    service: ReportService,
}

impl Journal {
    /// Fails with a configuration error when no journal root is configured
    fn open(config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let root = config.notes_root()?;
        let store = Arc::new(MarkdownReportStore::new(root, clock.clone()));
        let service = ReportService::new(store.clone(), clock.clone());
        Ok(Self { store, clock, service })
    }

    /// Midnight of `date` in the clock's offset
    fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<FixedOffset>> {
        date.and_hms_opt(0, 0, 0)
            .and_then(|dt| dt.and_local_timezone(self.clock.offset()).single())
            .ok_or_else(|| anyhow!("Invalid date: {}", date))
    }

    /// Report location relative to the notes root
    fn relative_path(&self, report: &Report) -> PathBuf {
        let paths = self.store.paths();
        let path = paths.report_path(report);
        let relative = paths.relative(&path).map(Path::to_path_buf).ok();
        relative.unwrap_or(path)
    }
}

/// Trim tags and drop empty entries from `--tags a,,b`
fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn cmd_create(journal: &Journal, args: CreateArgs, out: &mut impl Write) -> Result<()> {
    let report_type: ReportType = args.report_type.parse()?;
    let author: ReportAuthor = args.author.parse()?;

    let new = NewReport::new(args.title, args.body, report_type)
        .with_author(author)
        .with_tags(clean_tags(args.tags));
    let report = journal.service.create_report(new)?;

    writeln!(out, "{} Created report {}", "Success:".green().bold(), report.meta.note_id.cyan())?;
    writeln!(out, "  {}", journal.relative_path(&report).display())?;
    Ok(())
}

fn cmd_list(journal: &Journal, args: ListArgs, out: &mut impl Write) -> Result<()> {
    let query = ListQuery {
        limit: Some(args.limit),
        since: args.since.map(|d| journal.start_of_day(d)).transpose()?,
        report_type: args.report_type.as_deref().map(str::parse::<ReportType>).transpose()?,
        author: args.author.as_deref().map(str::parse::<ReportAuthor>).transpose()?,
        tags: Some(clean_tags(args.tags)),
    };

    let reports = journal.service.list_reports(&query)?;
    if args.json {
        return write_json(out, &reports);
    }

    print_reports(out, &reports, args.show_body)
}

fn cmd_search(journal: &Journal, args: SearchArgs, out: &mut impl Write) -> Result<()> {
    let scope = if args.title_only {
        SearchScope::title_only()
    } else if args.body_only {
        SearchScope::body_only()
    } else if args.tags_only {
        SearchScope::tags_only()
    } else {
        SearchScope::ALL
    };

    let reports = journal.service.search_reports(&args.keyword, scope)?;
    if args.json {
        return write_json(out, &reports);
    }

    print_reports(out, &reports, false)
}

fn cmd_stats(journal: &Journal, args: StatsArgs, out: &mut impl Write) -> Result<()> {
    let since = args.since.map(|d| journal.start_of_day(d)).transpose()?;
    let stats = journal.service.get_statistics(since)?;

    if args.json {
        return write_json(out, &stats);
    }

    print_stats(out, &stats)
}

fn cmd_observe(journal: &Journal, enabled: bool, out: &mut impl Write) -> Result<()> {
    if !enabled {
        writeln!(out, "{} Observer is disabled in config", "Info:".yellow().bold())?;
        return Ok(());
    }

    let summarizer = DailySummarizer::new(journal.store.clone(), journal.clock.clone());
    let report = summarizer
        .analyze_daily_activity()
        .context("Failed to write daily report")?;

    writeln!(out, "{} Daily report {}", "Success:".green().bold(), report.meta.note_id.cyan())?;
    writeln!(out, "  {}", journal.relative_path(&report).display())?;
    Ok(())
}

fn cmd_completions(shell: Shell, out: &mut impl Write) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "daybook", out);
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn print_reports(out: &mut impl Write, reports: &[Report], show_body: bool) -> Result<()> {
    if reports.is_empty() {
        writeln!(out, "{} No reports found", "Info:".yellow().bold())?;
        return Ok(());
    }

    for report in reports {
        let meta = &report.meta;
        writeln!(
            out,
            "{} {} {} {}",
            meta.updated_at.format("%Y-%m-%d %H:%M").dimmed(),
            format!("[{}]", meta.report_type).magenta(),
            meta.title.bold(),
            format!("({})", meta.author).dimmed()
        )?;
        writeln!(out, "  {}", meta.note_id.cyan())?;
        if !meta.tags.is_empty() {
            writeln!(out, "  tags: {}", meta.tags.join(", "))?;
        }

        if show_body {
            writeln!(out)?;
            for line in report.body.lines() {
                writeln!(out, "    {}", line)?;
            }
            writeln!(out)?;
        }
    }

    writeln!(out, "{} report(s)", reports.len())?;
    Ok(())
}

fn print_stats(out: &mut impl Write, stats: &ReportStats) -> Result<()> {
    writeln!(
        out,
        "{} {} ~ {}",
        "Statistics".green().bold().underline(),
        stats.period_start.format("%Y-%m-%d %H:%M"),
        stats.period_end.format("%Y-%m-%d %H:%M")
    )?;
    writeln!(out, "Total reports: {}", stats.total_count.to_string().cyan())?;

    for (heading, tally) in [("By type", &stats.by_type), ("By author", &stats.by_author), ("Top tags", &stats.top_tags)] {
        print_tally(out, heading, tally)?;
    }

    Ok(())
}

fn print_tally(out: &mut impl Write, heading: &str, tally: &Tally) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", heading.blue().bold())?;
    if tally.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for (key, count) in tally.sorted_by_count() {
        writeln!(out, "  {}: {}", key, count)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_core::FixedClock;
    use std::fs;
    use tempfile::TempDir;

    const NOW: &str = "2025-01-15T10:30:00+09:00";

    fn test_config(root: &Path) -> Config {
        let mut config = Config::default();
        config.notes.repo_root = Some(root.to_path_buf());
        config
    }

    fn open_journal(root: &Path) -> Journal {
        Journal::open(&test_config(root), Arc::new(FixedClock::at(NOW).unwrap())).unwrap()
    }

    fn create_args(title: &str, report_type: &str, tags: &[&str], body: &str) -> CreateArgs {
        CreateArgs {
            title: title.to_string(),
            report_type: report_type.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            author: "user".to_string(),
            body: body.to_string(),
        }
    }

    fn seed(journal: &Journal) {
        let mut sink = Vec::new();
        cmd_create(journal, create_args("Hello World", "tech", &["rust", "cli"], "content"), &mut sink).unwrap();
        cmd_create(journal, create_args("Ramen", "life", &["food"], "FINDME in the broth"), &mut sink).unwrap();
        cmd_create(journal, create_args("Attention", "paper", &["ml"], "findm only"), &mut sink).unwrap();
    }

    fn output(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_create_command() {
        let cli = Cli::try_parse_from([
            "daybook",
            "create",
            "--title",
            "Hello World",
            "--type",
            "tech",
            "--tags",
            "rust,cli",
            "--body",
            "content",
        ])
        .unwrap();

        if let Commands::Create(args) = cli.command {
            assert_eq!(args.title, "Hello World");
            assert_eq!(args.report_type, "tech");
            assert_eq!(args.tags, vec!["rust", "cli"]);
            assert_eq!(args.author, "user");
        } else {
            panic!("Expected Create command");
        }
    }

    #[test]
    fn test_cli_list_command() {
        let cli = Cli::try_parse_from(["daybook", "list", "-n", "5", "--since", "2025-01-01", "--json"]).unwrap();

        if let Commands::List(args) = cli.command {
            assert_eq!(args.limit, 5);
            assert_eq!(args.since, NaiveDate::from_ymd_opt(2025, 1, 1));
            assert!(args.json);
            assert!(!args.show_body);
        } else {
            panic!("Expected List command");
        }
    }

    #[test]
    fn test_cli_list_defaults() {
        let cli = Cli::try_parse_from(["daybook", "list"]).unwrap();
        if let Commands::List(args) = cli.command {
            assert_eq!(args.limit, 10);
            assert!(args.since.is_none());
            assert!(args.tags.is_empty());
        } else {
            panic!("Expected List command");
        }
    }

    #[test]
    fn test_cli_rejects_bad_since() {
        assert!(Cli::try_parse_from(["daybook", "list", "--since", "yesterday"]).is_err());
    }

    #[test]
    fn test_cli_search_scopes_conflict() {
        assert!(Cli::try_parse_from(["daybook", "search", "rust", "--title-only", "--body-only"]).is_err());
        assert!(Cli::try_parse_from(["daybook", "search", "rust", "--tags-only"]).is_ok());
    }

    #[test]
    fn test_cli_with_config_and_verbose() {
        let cli = Cli::try_parse_from(["daybook", "-c", "/tmp/daybook.toml", "-v", "observe"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/daybook.toml")));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Observe));
    }

    #[test]
    fn test_open_without_root_is_config_error() {
        let result = Journal::open(&Config::default(), Arc::new(FixedClock::at(NOW).unwrap()));
        let err = result.err().unwrap();
        assert!(err.to_string().contains("notes.repo_root"));
    }

    #[test]
    fn test_cmd_create_writes_report() {
        let temp = TempDir::new().unwrap();
        let journal = open_journal(temp.path());

        let mut out = Vec::new();
        cmd_create(&journal, create_args("Hello World", "tech", &["rust", " cli ", ""], "content"), &mut out).unwrap();

        let path = temp
            .path()
            .join("docs/journal/2025/01/15/2025-01-15-1030-tech-Hello-World.md");
        let report = Report::parse(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(report.meta.tags, vec!["rust", "cli"]);
        assert_eq!(report.body, "content");

        let output = output(out);
        assert!(output.contains("2025-01-15-1030-tech-Hello-World"));
        assert!(output.contains("docs/journal/2025/01/15/2025-01-15-1030-tech-Hello-World.md"));
    }

    #[test]
    fn test_cmd_create_rejects_invalid_type_before_writing() {
        let temp = TempDir::new().unwrap();
        let journal = open_journal(temp.path());

        let err = cmd_create(&journal, create_args("x", "poem", &[], "x"), &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("invalid type 'poem'"));
        assert!(!temp.path().join("docs").exists());
    }

    #[test]
    fn test_cmd_create_rejects_invalid_author() {
        let temp = TempDir::new().unwrap();
        let journal = open_journal(temp.path());

        let mut args = create_args("x", "tech", &[], "x");
        args.author = "agent:unknown".to_string();
        let err = cmd_create(&journal, args, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("invalid author"));
    }

    #[test]
    fn test_cmd_list_json_with_filters() {
        let temp = TempDir::new().unwrap();
        let journal = open_journal(temp.path());
        seed(&journal);

        let args = ListArgs {
            limit: 10,
            since: None,
            report_type: Some("life".to_string()),
            author: None,
            tags: vec![],
            json: true,
            show_body: false,
        };
        let mut out = Vec::new();
        cmd_list(&journal, args, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let reports = value.as_array().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0]["meta"]["type"], "life");
        assert_eq!(reports[0]["meta"]["title"], "Ramen");
    }

    #[test]
    fn test_cmd_list_text_limit_and_tags() {
        let temp = TempDir::new().unwrap();
        let journal = open_journal(temp.path());
        seed(&journal);

        let args = ListArgs {
            limit: 1,
            since: NaiveDate::from_ymd_opt(2025, 1, 15),
            report_type: None,
            author: None,
            tags: vec!["food".to_string(), "ml".to_string()],
            json: false,
            show_body: true,
        };
        let mut out = Vec::new();
        cmd_list(&journal, args, &mut out).unwrap();

        let output = output(out);
        assert!(output.contains("1 report(s)"));
        assert!(!output.contains("Hello World"));
    }

    #[test]
    fn test_cmd_list_empty() {
        let temp = TempDir::new().unwrap();
        let journal = open_journal(temp.path());

        let args = ListArgs {
            limit: 10,
            since: None,
            report_type: None,
            author: None,
            tags: vec![],
            json: false,
            show_body: false,
        };
        let mut out = Vec::new();
        cmd_list(&journal, args, &mut out).unwrap();
        assert!(output(out).contains("No reports found"));
    }

    #[test]
    fn test_cmd_search_is_case_insensitive() {
        let temp = TempDir::new().unwrap();
        let journal = open_journal(temp.path());
        seed(&journal);

        let args = SearchArgs {
            keyword: "findme".to_string(),
            title_only: false,
            body_only: true,
            tags_only: false,
            json: true,
        };
        let mut out = Vec::new();
        cmd_search(&journal, args, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let reports = value.as_array().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0]["meta"]["title"], "Ramen");
    }

    #[test]
    fn test_cmd_stats_json() {
        let temp = TempDir::new().unwrap();
        let journal = open_journal(temp.path());
        seed(&journal);

        let mut out = Vec::new();
        cmd_stats(&journal, StatsArgs { since: None, json: true }, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["total_count"], 3);
        assert_eq!(value["by_author"]["user"], 3);
        assert_eq!(value["by_type"]["tech"], 1);
    }

    #[test]
    fn test_cmd_stats_text() {
        let temp = TempDir::new().unwrap();
        let journal = open_journal(temp.path());
        seed(&journal);

        let mut out = Vec::new();
        cmd_stats(&journal, StatsArgs { since: NaiveDate::from_ymd_opt(2025, 1, 1), json: false }, &mut out).unwrap();

        let output = output(out);
        assert!(output.contains("2025-01-01 00:00"));
        assert!(output.contains("food: 1"));
    }

    #[test]
    fn test_cmd_observe_writes_daily_report() {
        let temp = TempDir::new().unwrap();
        let journal = open_journal(temp.path());
        seed(&journal);

        let mut out = Vec::new();
        cmd_observe(&journal, true, &mut out).unwrap();

        let path = temp
            .path()
            .join("docs/journal/2025/01/15/2025-01-15-1030-meta-daily-report.md");
        let report = Report::parse(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(report.meta.author, ReportAuthor::SelfObserver);
        assert!(report.body.contains("- **Total Reports**: 3"));
        assert!(output(out).contains("2025-01-15-1030-meta-daily-report"));
    }

    #[test]
    fn test_cmd_observe_disabled() {
        let temp = TempDir::new().unwrap();
        let journal = open_journal(temp.path());

        let mut out = Vec::new();
        cmd_observe(&journal, false, &mut out).unwrap();

        assert!(output(out).contains("disabled"));
        assert!(!temp.path().join("docs").exists());
    }

    #[test]
    fn test_cmd_completions() {
        let mut out = Vec::new();
        cmd_completions(Shell::Bash, &mut out).unwrap();
        assert!(output(out).contains("daybook"));
    }

    #[test]
    fn test_start_of_day_uses_clock_offset() {
        let temp = TempDir::new().unwrap();
        let journal = open_journal(temp.path());

        let since = journal.start_of_day(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()).unwrap();
        assert_eq!(since.to_rfc3339(), "2025-01-10T00:00:00+09:00");
    }

    #[test]
    fn test_clean_tags() {
        let tags = clean_tags(vec![" a ".to_string(), String::new(), "b".to_string()]);
        assert_eq!(tags, vec!["a", "b"]);
    }
}
