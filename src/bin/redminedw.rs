use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "redminedw", about = "Redmine dashboard warehouse CLI")]
struct Cli {
    /// Database path (default: ~/.redminedw/redminedw.db)
    #[arg(long)]
    db: Option<String>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a JSON data export into the warehouse
    Import {
        /// Path to the export file
        file: String,
    },
    /// Compute dashboard analytics for a project
    Dashboard {
        /// Project id
        project_id: i64,
        #[command(flatten)]
        filters: FilterArgs,
        /// Output the full payload as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate an LLM status report over the dashboard
    Analyze {
        /// Project id
        project_id: i64,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show warehouse status
    Status,
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Range start (YYYY-MM-DD, default: 30 days ago)
    #[arg(long)]
    start_date: Option<String>,
    /// Range end (YYYY-MM-DD, default: today)
    #[arg(long)]
    end_date: Option<String>,
    /// Restrict to these sub-project ids (comma separated)
    #[arg(long, value_delimiter = ',')]
    projects: Option<Vec<i64>>,
    /// Filter by version id
    #[arg(long)]
    version: Option<i64>,
    /// Filter by tracker id
    #[arg(long)]
    tracker: Option<i64>,
    /// Filter by assignee id
    #[arg(long)]
    assignee: Option<i64>,
    /// Compute as of this date instead of today (YYYY-MM-DD)
    #[arg(long)]
    as_of: Option<String>,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a config value
    Get { key: String },
    /// Set a config value
    Set { key: String, value: String },
    /// List all config values
    List,
}

impl FilterArgs {
    fn params(&self) -> redminedw::DashboardParams {
        redminedw::DashboardParams {
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            target_project_ids: self.projects.clone(),
            version_id: self.version,
            tracker_id: self.tracker,
            assigned_to_id: self.assignee,
        }
    }

    fn as_of(&self) -> anyhow::Result<chrono::NaiveDate> {
        match self.as_of.as_deref() {
            Some(s) => Ok(redminedw::date_util::parse_date(s)?),
            None => Ok(chrono::Local::now().date_naive()),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let db = match &cli.db {
        Some(path) => redminedw::Database::open_at(path).await?,
        None => redminedw::Database::open().await?,
    };
    let dw = redminedw::RedmineDW::new(db);

    match cli.command {
        Commands::Import { file } => {
            let report = dw.import(&file).await?;
            print_import_report(&report);
        }
        Commands::Dashboard {
            project_id,
            filters,
            json,
        } => {
            let summary = dw
                .dashboard(project_id, &filters.params(), filters.as_of()?)
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }
        Commands::Analyze {
            project_id,
            filters,
        } => {
            let report = dw
                .analyze(project_id, &filters.params(), filters.as_of()?)
                .await?;
            println!("{report}");
        }
        Commands::Config { action } => match action {
            ConfigAction::Get { key } => match dw.config_get(&key).await? {
                Some(value) => println!("{key} = {value}"),
                None => println!("{key} is not set"),
            },
            ConfigAction::Set { key, value } => {
                dw.config_set(&key, &value).await?;
                println!("Config updated.");
            }
            ConfigAction::List => {
                let items = dw.config_list().await?;
                if items.is_empty() {
                    println!("No configuration set.");
                } else {
                    for (key, value) in items {
                        println!("{key} = {value}");
                    }
                }
            }
        },
        Commands::Status => {
            let status = dw.status().await?;
            println!("Warehouse Status");
            println!("  Projects: {}", status.projects);
            println!("  Issues:   {}", status.issues);
            println!("  Journals: {}", status.journals);
            println!("  Users:    {}", status.users);
            println!(
                "  Last import: {}",
                status.last_import.unwrap_or_else(|| "never".to_string())
            );
        }
    }

    Ok(())
}

fn print_import_report(report: &redminedw::ImportReport) {
    println!("Imported {} records", report.total());
    println!("  Projects:   {}", report.projects);
    println!("  Users:      {}", report.users);
    println!("  Statuses:   {}", report.statuses);
    println!("  Trackers:   {}", report.trackers);
    println!("  Priorities: {}", report.priorities);
    println!("  Versions:   {}", report.versions);
    println!("  Issues:     {}", report.issues);
    println!("  Journals:   {}", report.journals);
}

fn print_summary(summary: &redminedw::DashboardSummary) {
    let kpis = &summary.kpis;
    println!("KPI Summary");
    println!("  Completion:    {:.1}%", kpis.completion_rate);
    println!("  Delayed:       {}", kpis.delayed_count);
    println!("  Avg lead time: {:.1} days", kpis.avg_lead_time);
    println!("  WIP:           {}", kpis.wip_count);
    println!("  Throughput:    {} (7d)", kpis.throughput);
    println!(
        "  Due dates set: {:.1}% ({} unset)",
        kpis.due_date_rate, kpis.unset_due_date_count
    );
    println!(
        "  Stagnant:      {} ({:.1}%)",
        kpis.stagnant_count, kpis.bottleneck_rate
    );
    println!(
        "  Concentration: {:?} (top assignee holds {})",
        kpis.assignee_concentration, kpis.top_assignee_count
    );

    if !summary.workload.series.is_empty() {
        println!("\nWorkload (open issues)");
        for row in summary.workload.series.iter().take(5) {
            println!(
                "  {}: {} issues, est {:.1}h, spent {:.1}h",
                row.name, row.count, row.estimated_hours, row.spent_hours
            );
        }
    }

    if !summary.velocity.series.is_empty() {
        println!("\nVelocity (recent weeks)");
        let recent = summary.velocity.series.iter().rev().take(4).rev();
        for point in recent {
            println!(
                "  week of {}: {} closed, {:.1} points",
                point.week, point.count, point.points
            );
        }
    }

    if !summary.version_progress.versions.is_empty() {
        println!("\nVersions");
        for version in &summary.version_progress.versions {
            let due = version
                .due_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "no due date".to_string());
            println!(
                "  {}: {:.0}% complete, due {}",
                version.name, version.completed_rate, due
            );
        }
    }

    println!("\n{} issues in scope (use --json for the full payload)", summary.issues.len());
}
