use std::{collections::HashMap, io, path::PathBuf, sync::Arc};

use chrono::{NaiveDate, NaiveDateTime};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use log::{LevelFilter, info};
use serde::Serialize;

use crate::{
    config::TimelineConfig,
    constants::FILE_NAMES,
    domain::{ExperienceRecord, Track},
    error::{Result, TimelineError},
    storage,
    timeline::{
        Clock, FixedClock, MarkerTicker, SystemClock, Timeline, TimelineView,
        format::{format_duration, format_month_year, format_percent, format_period, truncate_label},
        progress::midnight,
    },
};

#[derive(Parser, Debug)]
#[command(name = "strata-timeline")]
#[command(about = "Experience timeline layout: bounds, stats, tracks and the today marker", long_about = None)]
pub struct Cli {
    #[arg(long, global = true, help = "Experiences JSON file")]
    data: Option<PathBuf>,

    #[arg(long, global = true, help = "Config JSON file")]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Evaluate at this instant (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)"
    )]
    now: Option<String>,

    #[arg(long, short, global = true, help = "Debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Show the padded display range")]
    Bounds,

    #[command(about = "Show status counts and per-year activity")]
    Stats,

    #[command(about = "Show positions per track")]
    Layout {
        #[arg(long, value_enum, help = "Only this track")]
        track: Option<TrackArg>,

        #[arg(long, help = "Show single-row percent positions instead")]
        horizontal: bool,
    },

    #[command(about = "Show experience groups, most recent first")]
    Groups,

    #[command(about = "Run the current-time marker")]
    Marker {
        #[arg(long, default_value_t = 1, help = "Snapshots to print before exiting")]
        ticks: usize,

        #[arg(long, help = "Refresh every second")]
        high_precision: bool,
    },

    #[command(about = "Export the computed layout")]
    Export {
        #[arg(long, value_enum, help = "Export format")]
        format: ExportFormat,

        #[arg(long, short, help = "Output path")]
        out: Option<PathBuf>,
    },

    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(help = "Shell type (bash, zsh, fish)")]
        shell: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TrackArg {
    Personal,
    Social,
    Community,
}

impl From<TrackArg> for Track {
    fn from(arg: TrackArg) -> Self {
        match arg {
            TrackArg::Personal => Track::Personal,
            TrackArg::Social => Track::Social,
            TrackArg::Community => Track::Community,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutRow {
    pub track: Track,
    pub id: String,
    pub title: String,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    pub top_percent: f64,
    pub top_pixel: f64,
    pub depth_opacity: f64,
    pub left_percent: f64,
    pub width_percent: f64,
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutExport<'a> {
    pub schema_version: u32,
    pub generated_at: NaiveDateTime,
    pub view: TimelineView<'a>,
}

struct Context {
    timeline: Timeline,
    config: TimelineConfig,
    now: NaiveDateTime,
    fixed_now: bool,
}

pub fn parse_now(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(midnight(date));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| TimelineError::InvalidNow(raw.to_string()))
}

fn load_context(cli: &Cli) -> Result<Context> {
    let data_path = cli
        .data
        .clone()
        .unwrap_or_else(|| storage::get_data_dir().join(FILE_NAMES.experiences));
    let config_path = cli.config.clone().unwrap_or_else(storage::get_config_path);

    let config = storage::load_config(&config_path);
    let mut records = storage::load_records(&data_path)?;

    let translations_path = data_path.with_file_name(FILE_NAMES.translations);
    if let Some(catalog) = storage::load_catalog(&translations_path) {
        info!("using '{}' translations", catalog.locale);
        records = catalog.localize_all(&records);
    }

    let (now, fixed_now) = match cli.now.as_deref() {
        Some(raw) => (parse_now(raw)?, true),
        None => (SystemClock.now(), false),
    };

    let timeline = Timeline::new(records, config.layout.clone())?;
    Ok(Context {
        timeline,
        config,
        now,
        fixed_now,
    })
}

fn print_bounds(ctx: &Context) {
    let bounds = ctx.timeline.bounds(ctx.now);
    println!("Timeline Bounds ({})", bounds.current_date);
    println!("{}", "-".repeat(40));
    println!("{:20} {}", "start", bounds.display_start);
    println!("{:20} {}", "end", bounds.display_end);
    println!("{:20} {}", "today", bounds.current_date);
    println!("{:20} {}", "months", bounds.total_months);
}

fn print_stats(ctx: &Context) {
    let stats = ctx.timeline.stats(ctx.now);
    println!("Timeline Stats ({})", ctx.now.date());
    println!("{}", "-".repeat(40));
    println!("{:20} {}", "total", stats.total_projects);
    println!("{:20} {}", "active", stats.active_projects);
    println!("{:20} {}", "completed", stats.completed_projects);
    println!("{:20} {}", "planned", stats.planned_projects);
    println!("{}", "-".repeat(40));
    for entry in &stats.year_ranges {
        println!("{:20} {}", entry.year, entry.count);
    }
}

fn print_layout(ctx: &Context, track: Option<Track>, horizontal: bool) {
    let bounds = ctx.timeline.bounds(ctx.now);

    if horizontal {
        println!(
            "Horizontal Layout ({} - {})",
            format_month_year(bounds.display_start),
            format_month_year(bounds.display_end)
        );
        println!("{}", "-".repeat(60));
        for entry in ctx.timeline.horizontal(&bounds, ctx.now) {
            if track.is_some_and(|t| t != entry.experience.track) {
                continue;
            }
            println!(
                "{:24} left {} width {} {}",
                truncate_label(&entry.experience.title, 24),
                format_percent(entry.position.left_percent),
                format_percent(entry.position.width_percent),
                format_period(entry.experience.start, entry.experience.end),
            );
        }
        return;
    }

    for layout in ctx.timeline.tracks(&bounds) {
        if track.is_some_and(|t| t != layout.track) {
            continue;
        }
        println!("Track {} (height {:.0}px)", layout.track, layout.height);
        println!("{}", "-".repeat(60));
        for item in &layout.items {
            let record = item.experience;
            println!(
                "{:24} {:>7.0}px raw {} opacity {:.2} {}",
                truncate_label(&record.title, 24),
                item.top_pixel,
                format_percent(item.top_percent),
                item.depth_opacity,
                format_duration(record.start, record.end_on(bounds.current_date)),
            );
        }
        println!();
    }
}

fn print_groups(ctx: &Context) -> Result<()> {
    for group in ctx.timeline.groups()? {
        let label = group
            .key
            .clone()
            .unwrap_or_else(|| group.members[0].title.clone());
        println!(
            "{:24} {} {:>2} member(s) since {}",
            truncate_label(&label, 24),
            group.color,
            group.len(),
            format_month_year(group.earliest_start)
        );
        if !group.is_standalone() {
            for member in &group.members {
                println!(
                    "    {:20} {}",
                    truncate_label(&member.title, 20),
                    format_period(member.start, member.end)
                );
            }
        }
    }
    Ok(())
}

fn run_marker(ctx: &Context, ticks: usize, high_precision: bool) -> Result<()> {
    let mut marker_config = ctx.config.marker.clone();
    marker_config.high_precision |= high_precision;

    let clock: Arc<dyn Clock> = if ctx.fixed_now {
        Arc::new(FixedClock::new(ctx.now))
    } else {
        Arc::new(SystemClock)
    };
    let records: Arc<[ExperienceRecord]> = Arc::from(ctx.timeline.records().to_vec());

    info!(
        "marker refresh every {:?} (midnight refresh: {})",
        marker_config.tick_interval(),
        marker_config.handle_midnight
    );
    let (mut ticker, snapshots) = MarkerTicker::start(
        records,
        ctx.timeline.settings().clone(),
        &marker_config,
        clock,
    )?;

    for snapshot in snapshots.iter().take(ticks) {
        println!(
            "{} marker {} active {} ({})",
            snapshot.now.format("%Y-%m-%d %H:%M:%S"),
            format_percent(snapshot.position_percent),
            snapshot.active_count,
            if snapshot.is_active_today { "busy" } else { "idle" }
        );
    }

    ticker.stop();
    Ok(())
}

pub fn layout_rows(view: &TimelineView<'_>) -> Vec<LayoutRow> {
    let horizontal: HashMap<&str, _> = view
        .horizontal
        .iter()
        .map(|entry| (entry.experience.id.as_str(), entry))
        .collect();

    view.tracks
        .iter()
        .flat_map(|layout| layout.items.iter().map(move |item| (layout.track, item)))
        .map(|(track, item)| {
            let record = item.experience;
            let entry = horizontal.get(record.id.as_str());
            LayoutRow {
                track,
                id: record.id.to_string(),
                title: record.title.clone(),
                start: record.start,
                end: record.end.fixed(),
                top_percent: item.top_percent,
                top_pixel: item.top_pixel,
                depth_opacity: item.depth_opacity,
                left_percent: entry.map_or(0.0, |e| e.position.left_percent),
                width_percent: entry.map_or(0.0, |e| e.position.width_percent),
                progress: entry.map_or(0.0, |e| e.progress),
            }
        })
        .collect()
}

fn export_layout(ctx: &Context, format: ExportFormat, out_path: Option<PathBuf>) -> Result<()> {
    let view = ctx.timeline.view(ctx.now)?;

    let content = match format {
        ExportFormat::Json => {
            let export = LayoutExport {
                schema_version: 1,
                generated_at: ctx.now,
                view,
            };
            serde_json::to_string_pretty(&export)?
        }
        ExportFormat::Csv => storage::csv_string(&layout_rows(&view))?,
    };

    if let Some(path) = out_path {
        storage::write_text_file(&path, &content)?;
        println!("Exported to {}", path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

pub fn print_completions(shell: &str) -> Result<()> {
    use clap_complete::Shell;
    let shell = match shell {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        _ => return Err(TimelineError::UnsupportedShell(shell.to_string())),
    };
    clap_complete::generate(shell, &mut Cli::command(), "strata-timeline", &mut io::stdout());
    Ok(())
}

fn dispatch(cli: Cli) -> Result<()> {
    if let Command::Completions { shell } = &cli.command {
        return print_completions(shell);
    }

    let ctx = load_context(&cli)?;
    match cli.command {
        Command::Bounds => print_bounds(&ctx),
        Command::Stats => print_stats(&ctx),
        Command::Layout { track, horizontal } => {
            print_layout(&ctx, track.map(Track::from), horizontal)
        }
        Command::Groups => print_groups(&ctx)?,
        Command::Marker {
            ticks,
            high_precision,
        } => run_marker(&ctx, ticks, high_precision)?,
        Command::Export { format, out } => export_layout(&ctx, format, out)?,
        Command::Completions { .. } => {}
    }
    Ok(())
}

pub fn run_cli() {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    if let Err(e) = dispatch(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::LayoutSettings,
        domain::{EndDate, Status},
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_now_formats() {
        assert_eq!(parse_now("2024-06-01").unwrap(), midnight(date(2024, 6, 1)));
        assert_eq!(
            parse_now("2024-06-01T13:45:00").unwrap(),
            date(2024, 6, 1).and_hms_opt(13, 45, 0).unwrap()
        );
        assert!(matches!(
            parse_now("June 1st"),
            Err(TimelineError::InvalidNow(_))
        ));
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "strata-timeline",
            "layout",
            "--track",
            "social",
            "--now",
            "2024-06-01",
        ])
        .unwrap();

        assert_eq!(cli.now.as_deref(), Some("2024-06-01"));
        assert!(matches!(
            cli.command,
            Command::Layout {
                track: Some(TrackArg::Social),
                horizontal: false
            }
        ));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_layout_rows_join_vertical_and_horizontal() {
        let records = vec![
            ExperienceRecord::new(
                "a",
                "A",
                date(2023, 1, 1),
                EndDate::Fixed(date(2023, 6, 1)),
                Status::Completed,
                Track::Personal,
            ),
            ExperienceRecord::new(
                "b",
                "B",
                date(2024, 1, 1),
                EndDate::Open,
                Status::Ongoing,
                Track::Social,
            ),
        ];
        let timeline = Timeline::new(records, LayoutSettings::default()).unwrap();
        let view = timeline.view(midnight(date(2024, 6, 1))).unwrap();
        let rows = layout_rows(&view);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "a");
        assert_eq!(rows[0].track, Track::Personal);
        assert_eq!(rows[0].end, Some(date(2023, 6, 1)));
        assert_eq!(rows[1].end, None);
        assert!(rows[0].width_percent >= 1.0);
        assert_eq!(rows[0].progress, 1.0);

        let csv = storage::csv_string(&rows).unwrap();
        assert!(csv.starts_with("track,id,title,start,end,"));
    }
}
