//! `lboard` - CLI for launchboard
//!
//! This binary loads launch data from the SpaceX API and the analytics
//! service and renders the dashboard views in the terminal.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{debug, warn};

use launchboard::cli::{
    AnalyticsCommand, Cli, Command, ConfigCommand, ExportCommand, LaunchesCommand, ShowCommand,
};
use launchboard::model::{location_name, GeoPoint, UNAVAILABLE};
use launchboard::{
    init_logging, AnalyticsPanel, ApiClient, Config, Dashboard, Error, Exporter, MapModal,
    MapView, MapWidget, SortField, SummaryTable,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Launches(cmd) => handle_launches(&config, &cmd).await,
        Command::Show(cmd) => handle_show(&config, &cmd).await,
        Command::Export(cmd) => handle_export(&config, cmd).await,
        Command::Analytics(cmd) => handle_analytics(&config, &cmd).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

async fn load_dashboard(config: &Config, client: &ApiClient) -> anyhow::Result<Dashboard> {
    let mut dashboard = Dashboard::from_config(config);
    if !dashboard.load(client).await {
        bail!("could not load launch data from {}", config.api.launches_base_url);
    }
    Ok(dashboard)
}

async fn handle_launches(config: &Config, cmd: &LaunchesCommand) -> anyhow::Result<()> {
    let client = ApiClient::new(&config.api)?;
    let mut dashboard = load_dashboard(config, &client).await?;

    let view = dashboard.collection_mut();
    if let Some(filter) = &cmd.filter {
        view.set_filter(filter.as_str());
    }
    if let Some(sort) = cmd.sort_spec() {
        view.set_sort(sort);
    }
    view.go_to_page(cmd.page);

    let view = dashboard.collection();
    let rows = view.current_rows();
    let pads = view.launchpads();

    if cmd.json {
        let rows: Vec<_> = rows
            .iter()
            .map(|launch| {
                serde_json::json!({
                    "id": launch.id,
                    "name": launch.display_name(),
                    "date": launch.formatted_date(view.date_format()),
                    "status": launch.success.to_string(),
                    "location": location_name(pads, launch),
                })
            })
            .collect();
        let page = serde_json::json!({
            "page": view.current_page(),
            "pages": view.page_count(),
            "matches": view.visible().len(),
            "sort": view.sort(),
            "rows": rows,
        });
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    let sort = view.sort();
    let header = |field: SortField, label: &str| {
        if sort.field == field {
            format!("{label} {}", sort.direction.arrow())
        } else {
            label.to_string()
        }
    };
    println!(
        "{:<26} {:<28} {:<12} {:<14} {}",
        "ID",
        header(SortField::Name, "Name"),
        header(SortField::Date, "Date"),
        header(SortField::Status, "Status"),
        "Location"
    );
    println!("{}", "-".repeat(100));
    for launch in &rows {
        println!(
            "{:<26} {:<28} {:<12} {:<14} {}",
            launch.id,
            launch.display_name(),
            launch
                .formatted_date(view.date_format())
                .unwrap_or_else(|| UNAVAILABLE.to_string()),
            launch.success.to_string(),
            location_name(pads, launch)
        );
    }
    if rows.is_empty() {
        println!("No launches match.");
    }
    println!();
    println!(
        "Page {} of {}{}{}",
        view.current_page(),
        view.page_count(),
        if view.has_previous() { "  [previous]" } else { "" },
        if view.has_next() { "  [next]" } else { "" }
    );
    Ok(())
}

/// Map widget that keeps the requested view for printing.
#[derive(Debug, Default)]
struct TerminalMap {
    view: Option<(GeoPoint, u8)>,
}

impl MapWidget for TerminalMap {
    fn invalidate_size(&mut self) {
        debug!("Terminal map resized");
    }

    fn set_view(&mut self, center: GeoPoint, zoom: u8) {
        self.view = Some((center, zoom));
    }
}

async fn handle_show(config: &Config, cmd: &ShowCommand) -> anyhow::Result<()> {
    let client = ApiClient::new(&config.api)?;
    let mut dashboard = load_dashboard(config, &client).await?;

    if !dashboard.select_for_detail(&cmd.id) {
        bail!("no launch with id {}", cmd.id);
    }
    let card = dashboard
        .detail_card()
        .context("selected launch disappeared")?;

    let mut modal = None;
    if cmd.map {
        if let Some(task) = dashboard.handle_detail_signal(card.show_map()) {
            let mut widget = TerminalMap::default();
            task.run(&mut widget).await;
            debug!(view = ?widget.view, "Map widget positioned");
        }
        modal = Some(dashboard.map_modal());
    }

    if cmd.json {
        let out = serde_json::json!({ "launch": card, "map": modal });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print!("{card}");
    match modal {
        None | Some(MapModal::Closed) => {}
        Some(MapModal::LocationUnavailable) => {
            println!();
            println!("Location unavailable");
        }
        Some(MapModal::Open { title, view }) => {
            println!();
            println!("Map: {title}");
            match view {
                MapView::InvalidCoordinates => println!("  Invalid coordinates"),
                MapView::Hidden => {}
                MapView::Map(scene) => {
                    println!(
                        "  Centre:  {:.4}, {:.4} (zoom {})",
                        scene.center.latitude, scene.center.longitude, scene.zoom
                    );
                    println!("  Marker:  {}", scene.marker.label);
                    println!("  Tile:    {}", scene.tile_url);
                    println!("  Browse:  {}", scene.browse_url());
                    println!("  {}", scene.attribution);
                }
            }
        }
    }
    Ok(())
}

async fn handle_export(config: &Config, cmd: ExportCommand) -> anyhow::Result<()> {
    let client = ApiClient::new(&config.api)?;
    let mut dashboard = load_dashboard(config, &client).await?;

    let view = dashboard.collection_mut();
    for id in &cmd.ids {
        if view.find(id).is_none() {
            warn!("No launch with id {id}, skipping");
        } else if !view.is_selected(id) {
            view.toggle_selection(id);
        }
    }
    let selection = view.export_selection()?;

    let exporter = Exporter::new(&config.export, view.date_format());
    let dir = cmd.output.unwrap_or_else(|| PathBuf::from("."));
    let report = exporter.export(&client, &selection, &dir).await?;

    println!(
        "Exported {} launches ({} with patch images, {} pages) to {}",
        report.records,
        report.images,
        report.pages,
        report.path.display()
    );
    Ok(())
}

async fn handle_analytics(config: &Config, cmd: &AnalyticsCommand) -> anyhow::Result<()> {
    let client = ApiClient::new(&config.api)?;
    let mut panel = AnalyticsPanel::new();
    panel.refresh(&client).await;
    print!("{panel}");

    if let Some(dir) = &cmd.charts_dir {
        save_charts(&panel, dir)?;
    }

    if cmd.table {
        let mut table = SummaryTable::new();
        if table.load(&client).await {
            println!();
            println!("{:<28} {:<12} {:<14} {}", "Name", "Date", "Rocket", "Status");
            println!("{}", "-".repeat(70));
            for row in table.rows() {
                println!(
                    "{:<28} {:<12} {:<14} {}",
                    row.name.as_deref().unwrap_or(UNAVAILABLE),
                    row.date_utc.as_deref().unwrap_or(UNAVAILABLE),
                    row.rocket_name.as_deref().unwrap_or(UNAVAILABLE),
                    row.success
                );
            }
        }
    }
    Ok(())
}

fn save_charts(panel: &AnalyticsPanel, dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
        path: dir.to_path_buf(),
        source,
    })?;
    for (name, chart) in [
        ("launches-per-year.png", panel.launches_per_year()),
        ("success-by-rocket.png", panel.success_by_rocket()),
    ] {
        let Some(chart) = chart else {
            continue;
        };
        let path = dir.join(name);
        std::fs::write(&path, chart.decode()?)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Saved {}", path.display());
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[API]");
                println!("  Launches base URL:  {}", config.api.launches_base_url);
                println!("  Analytics base URL: {}", config.api.analytics_base_url);
                println!();
                println!("[Table]");
                println!("  Page size:          {}", config.table.page_size);
                println!("  Date format:        {}", config.table.date_format);
                println!();
                println!("[Map]");
                println!("  Zoom:               {}", config.map.zoom);
                println!("  Relayout delay:     {:?}", config.relayout_delay());
                println!("  Tile URL:           {}", config.map.tile_url);
                println!();
                println!("[Export]");
                println!("  File name:          {}", config.export.file_name);
                println!("  Title:              {}", config.export.title);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
