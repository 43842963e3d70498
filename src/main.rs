use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use lostfound_lib::{
    api::RegistryClient,
    geo::{FixedPosition, IpPosition, NominatimGeocoder, PositionSource},
    map::{provider, MapProvider, ProviderKind},
    screen::{DeviceScreen, ScreenError},
    session::SessionContext,
    Error, Settings,
};
use lostfound_proto::{
    dto::{DeviceDraft, RegisterRequestDto},
    DeviceId, GeoPoint, DEFAULT_BASE_URL,
};
use simple_logger::SimpleLogger;

use crate::ui::{Action, InteractiveUI, LocationMethod, PromptUI};

mod ui;

#[derive(Parser)]
struct Args {
    /// Base url of the lost & found registry
    #[arg(long, env = "LOSTFOUND_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Map provider used for map views and routes
    #[arg(long, env = "LOSTFOUND_MAP_PROVIDER", value_enum, default_value_t = MapProviderArg::Osm)]
    map_provider: MapProviderArg,

    /// Google Maps API key, required by the google provider
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    google_api_key: Option<String>,

    /// Username to log in with, prompted when missing
    #[arg(long, short, env = "LOSTFOUND_USERNAME")]
    username: Option<String>,

    /// Password to log in with, prompted when missing
    #[arg(long, env = "LOSTFOUND_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Current latitude, used instead of an IP lookup
    #[arg(long, requires = "longitude", allow_hyphen_values = true)]
    latitude: Option<f64>,

    /// Current longitude, used instead of an IP lookup
    #[arg(long, requires = "latitude", allow_hyphen_values = true)]
    longitude: Option<f64>,

    /// Locate the current position from the public IP address
    #[arg(long)]
    ip_location: bool,

    /// Seconds between two simulated tracking points
    #[arg(long, default_value_t = 2)]
    track_interval: u64,

    /// Number of points after which simulated tracking stops
    #[arg(long, default_value_t = 20)]
    track_points: usize,

    /// Do not use nerd fonts
    #[arg(long)]
    no_nerd: bool,

    #[clap(subcommand)]
    cmd: Option<SubCommand>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum MapProviderArg {
    Osm,
    Google,
}

impl From<MapProviderArg> for ProviderKind {
    fn from(value: MapProviderArg) -> Self {
        match value {
            MapProviderArg::Osm => ProviderKind::Osm,
            MapProviderArg::Google => ProviderKind::Google,
        }
    }
}

#[derive(clap::Subcommand)]
enum SubCommand {
    /// Manage devices interactively (default)
    Manage,
    /// Create an account
    Register(RegisterArgs),
    /// Print all devices
    List,
    /// Print the device map
    Map(MapArgs),
    /// Check the registry health
    Health,
    /// Inspect every user's devices, for administrators
    Admin(AdminArgs),
}

#[derive(Parser)]
struct RegisterArgs {
    /// Optional email address
    #[arg(long)]
    email: Option<String>,
}

#[derive(Parser)]
struct AdminArgs {
    /// Print registry-wide statistics instead of the devices
    #[arg(long)]
    stats: bool,
}

#[derive(Parser)]
struct MapArgs {
    /// Write the map as GeoJSON to this file
    #[arg(long)]
    geojson: Option<PathBuf>,

    /// Show the route from the current position to this device
    #[arg(long)]
    route_to: Option<DeviceId>,
}

impl Args {
    fn settings(&self) -> Settings {
        Settings {
            base_url: self.base_url.clone(),
            google_api_key: self.google_api_key.clone(),
            track_interval: std::time::Duration::from_secs(self.track_interval.max(1)),
            track_cap: self.track_points,
            ..Default::default()
        }
    }

    fn position_source(&self, settings: &Settings) -> Box<dyn PositionSource> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => {
                Box::new(FixedPosition::At(GeoPoint::new(latitude, longitude)))
            }
            _ if self.ip_location => Box::new(IpPosition::new(settings)),
            _ => Box::new(FixedPosition::Unavailable),
        }
    }
}

struct App {
    ui: PromptUI,
    settings: Settings,
    client: RegistryClient,
    provider: Box<dyn MapProvider>,
    geocoder: NominatimGeocoder,
    position: Box<dyn PositionSource>,
}

impl App {
    async fn login(&self, username: Option<String>, password: Option<String>) -> anyhow::Result<()> {
        let (username, password) = match (username, password) {
            (Some(username), Some(password)) => (username, password),
            (username, _) => self
                .ui
                .prompt_credentials(username)
                .context("Login cancelled")?,
        };
        let session = self
            .ui
            .show_loading(
                "Logging in".to_owned(),
                self.client.login(&username, &password),
            )
            .await?;
        log::debug!("session {} started", session.session_id);
        Ok(())
    }

    async fn register(&self, username: Option<String>, args: RegisterArgs) -> anyhow::Result<()> {
        let (username, password) = self
            .ui
            .prompt_credentials(username)
            .context("Registration cancelled")?;
        let dto = RegisterRequestDto {
            username,
            password,
            email: args.email,
        };
        self.ui
            .show_loading("Registering".to_owned(), self.client.register(&dto))
            .await?;
        self.ui
            .print_message(&format!("Account {} created, you can log in now", dto.username));
        Ok(())
    }

    async fn health(&self) -> anyhow::Result<()> {
        let health = self
            .ui
            .show_loading("Checking".to_owned(), self.client.health())
            .await?;
        if health.is_healthy() {
            let stats = health.stats.unwrap_or_default();
            self.ui.print_message(&format!(
                "Registry is healthy: {} users, {} devices",
                stats.users, stats.devices
            ));
        } else {
            anyhow::bail!(
                "Registry is unhealthy: {}",
                health.error.unwrap_or(health.status)
            );
        }
        Ok(())
    }

    async fn admin(&self, args: AdminArgs) -> anyhow::Result<()> {
        if args.stats {
            let stats = self
                .ui
                .show_loading("Loading".to_owned(), self.client.admin_stats())
                .await?;
            self.ui.print_admin_stats(&stats);
        } else {
            let devices = self
                .ui
                .show_loading("Loading".to_owned(), self.client.admin_devices())
                .await?;
            self.ui.print_devices(&devices);
        }
        Ok(())
    }

    async fn map(&self, screen: &DeviceScreen, args: MapArgs) -> anyhow::Result<()> {
        let view = match args.route_to {
            Some(id) => {
                let from = self.position.current_position().await?;
                self.ui
                    .show_loading(
                        "Routing".to_owned(),
                        screen.route_to(self.provider.as_ref(), from, id),
                    )
                    .await?
            }
            None => screen.map_view(self.provider.as_ref()).await,
        };
        self.ui.print_map(self.provider.as_ref(), &view);
        if let Some(path) = args.geojson {
            let geojson = serde_json::to_string_pretty(&view.to_geojson())?;
            std::fs::write(&path, geojson)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            self.ui
                .print_message(&format!("GeoJSON written to {}", path.display()));
        }
        Ok(())
    }

    async fn fill_location(
        &self,
        screen: &DeviceScreen,
        allow_clear: bool,
    ) -> lostfound_lib::Result<()> {
        match self.ui.select_location_method(allow_clear) {
            Some(LocationMethod::Search) => {
                let query = match self.ui.prompt_text("Place:") {
                    Some(query) => query,
                    None => return Ok(()),
                };
                let candidates = self
                    .ui
                    .show_loading(
                        "Searching".to_owned(),
                        screen.search_location(&self.geocoder, &query),
                    )
                    .await?;
                if candidates.is_empty() {
                    self.ui.print_message(&format!(
                        "No places found (type at least {} characters)",
                        self.settings.min_query_length
                    ));
                } else if let Some(candidate) = self.ui.select_candidate(candidates) {
                    screen.apply_location(&candidate).await;
                }
            }
            Some(LocationMethod::CurrentPosition) => {
                let candidate = self
                    .ui
                    .show_loading(
                        "Locating".to_owned(),
                        screen.use_current_position(self.position.as_ref(), &self.geocoder),
                    )
                    .await?;
                self.ui
                    .print_message(&format!("Location set to {}", candidate.label));
            }
            Some(LocationMethod::Coordinates) => {
                if let Some(position) = self.ui.prompt_position() {
                    screen
                        .update_draft(|draft| draft.set_position(Some(position)))
                        .await;
                }
            }
            Some(LocationMethod::Clear) => screen.clear_location().await,
            Some(LocationMethod::Skip) | None => {}
        }
        Ok(())
    }

    async fn add(&self, screen: &DeviceScreen) -> lostfound_lib::Result<()> {
        let draft = match self.ui.prompt_draft(&screen.draft().await) {
            Some(draft) => draft,
            None => return Ok(()),
        };
        screen.set_draft(draft).await;
        self.fill_location(screen, false).await?;
        let device = self
            .ui
            .show_loading("Saving".to_owned(), screen.submit())
            .await?;
        self.ui
            .print_message(&format!("Device #{} {} added", device.id, device.name));
        Ok(())
    }

    async fn edit(&self, screen: &DeviceScreen) -> lostfound_lib::Result<()> {
        let devices = screen.devices().await;
        let device = match self.ui.select_device("Select the device to edit", &devices) {
            Some(device) => device,
            None => return Ok(()),
        };
        let draft = match self.ui.prompt_draft(&DeviceDraft::from(&device)) {
            Some(draft) => draft,
            None => return Ok(()),
        };
        // the form is shared with `add`, keep whatever was pending there
        let pending = screen.draft().await;
        screen.set_draft(draft).await;
        let filled = self.fill_location(screen, true).await;
        let draft = screen.draft().await;
        screen.set_draft(pending).await;
        filled?;

        let device = self
            .ui
            .show_loading("Saving".to_owned(), screen.edit(device.id, &draft))
            .await?;
        self.ui
            .print_message(&format!("Device #{} updated", device.id));
        Ok(())
    }

    async fn handle(&self, screen: &DeviceScreen, action: Action) -> lostfound_lib::Result<()> {
        match action {
            Action::Refresh => {
                self.ui
                    .show_loading("Loading".to_owned(), screen.load())
                    .await?;
                self.ui.print_devices(&screen.devices().await);
            }
            Action::Add => self.add(screen).await?,
            Action::Edit => self.edit(screen).await?,
            Action::ToggleStatus => {
                let devices = screen.devices().await;
                if let Some(device) = self.ui.select_device("Toggle which device?", &devices) {
                    let device = self
                        .ui
                        .show_loading("Updating".to_owned(), screen.toggle_status(device.id))
                        .await?;
                    self.ui.print_message(&format!(
                        "{} is now marked as {}",
                        device.name, device.status
                    ));
                }
            }
            Action::Delete => {
                let devices = screen.devices().await;
                if let Some(device) = self.ui.select_device("Delete which device?", &devices) {
                    if screen
                        .delete(device.id, |device| self.ui.confirm_delete(device))
                        .await?
                    {
                        self.ui
                            .print_message(&format!("{} deleted", device.name));
                    }
                }
            }
            Action::Search => {
                if let Some(query) = self.ui.prompt_text("Search:") {
                    let devices = self
                        .ui
                        .show_loading("Searching".to_owned(), screen.search(&query))
                        .await?;
                    self.ui.print_devices(&devices);
                }
            }
            Action::Stats => {
                let stats = self
                    .ui
                    .show_loading("Loading".to_owned(), screen.stats())
                    .await?;
                self.ui.print_stats(&stats);
            }
            Action::Map => {
                let view = screen.map_view(self.provider.as_ref()).await;
                self.ui.print_map(self.provider.as_ref(), &view);
                self.ui.print_tracking(&screen.tracker().snapshot().await);
            }
            Action::Route => {
                let devices: Vec<_> = screen
                    .devices()
                    .await
                    .into_iter()
                    .filter(|d| d.position().is_some())
                    .collect();
                if let Some(device) = self.ui.select_device("Route to which device?", &devices) {
                    let from = self.position.current_position().await?;
                    let view = self
                        .ui
                        .show_loading(
                            "Routing".to_owned(),
                            screen.route_to(self.provider.as_ref(), from, device.id),
                        )
                        .await?;
                    self.ui.print_map(self.provider.as_ref(), &view);
                }
            }
            Action::Track => {
                let devices: Vec<_> = screen
                    .devices()
                    .await
                    .into_iter()
                    .filter(|d| d.is_trackable())
                    .collect();
                if let Some(device) = self.ui.select_device("Track which lost device?", &devices) {
                    screen.start_tracking(device.id).await?;
                    self.ui.print_message(&format!(
                        "Tracking {}, open the map to follow it",
                        device.name
                    ));
                }
            }
            Action::StopTracking => {
                screen.stop_tracking().await;
                self.ui.print_message("Tracking stopped");
            }
            Action::Exit => {}
        }
        Ok(())
    }

    async fn manage(&self, screen: Arc<DeviceScreen>) -> anyhow::Result<()> {
        if let Err(e) = self.handle(&screen, Action::Refresh).await {
            self.ui.print_error(&e);
        }
        loop {
            let tracking = screen.tracker().tracked_device().await.is_some();
            let action = match self.ui.select_action(tracking) {
                Some(Action::Exit) | None => break,
                Some(action) => action,
            };
            match self.handle(&screen, action).await {
                Ok(_) => {}
                Err(e) if ends_session(&e) => break,
                Err(e) => self.ui.print_error(&e),
            }
            println!();
        }
        screen.close().await;
        Ok(())
    }
}

/// Only a closed screen ends the interactive loop, every other failure is reported.
fn ends_session(error: &Error) -> bool {
    matches!(error, Error::Screen(ScreenError::Closed))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()
        .context("Failed to init logger")?;

    let args: Args = Args::parse();
    let settings = args.settings();
    log::debug!("settings: {:?}", settings);

    let session = SessionContext::default();
    let client = RegistryClient::new(&settings, session.clone());
    let mut ui = PromptUI::default();
    ui.use_nerd_fonts = !args.no_nerd;

    let app = App {
        ui,
        client: client.clone(),
        provider: provider(args.map_provider.into(), &settings)?,
        geocoder: NominatimGeocoder::new(&settings),
        position: args.position_source(&settings),
        settings: settings.clone(),
    };

    let cmd = args.cmd.unwrap_or(SubCommand::Manage);
    match cmd {
        SubCommand::Register(register_args) => {
            return app.register(args.username, register_args).await;
        }
        SubCommand::Health => return app.health().await,
        _ => {}
    }

    app.login(args.username, args.password).await?;
    let screen = Arc::new(DeviceScreen::new(Arc::new(client), settings));

    let (running_tx, mut running_rx) = tokio::sync::mpsc::channel(1);
    if let Ok(_) = ctrlc::set_handler(move || {
        running_tx.blocking_send(false).ok();
    }) {
        let screen = screen.clone();
        let session = session.clone();
        tokio::spawn(async move {
            running_rx.recv().await;
            screen.close().await;
            session.end().await;
            std::process::exit(0)
        });
    }

    let result = match cmd {
        SubCommand::List => {
            app.ui
                .show_loading("Loading".to_owned(), screen.load())
                .await?;
            app.ui.print_devices(&screen.devices().await);
            Ok(())
        }
        SubCommand::Admin(admin_args) => app.admin(admin_args).await,
        SubCommand::Map(map_args) => {
            app.ui
                .show_loading("Loading".to_owned(), screen.load())
                .await?;
            app.map(&screen, map_args).await
        }
        _ => app.manage(screen.clone()).await,
    };

    screen.close().await;
    session.end().await;
    result
}
