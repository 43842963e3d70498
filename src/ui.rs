use std::{fmt::Display, future::Future, time::Duration};

use async_trait::async_trait;
use colored::Colorize;
use comfy_table::Table;
use indicatif::ProgressStyle;
use itertools::Itertools;
use lostfound_lib::{
    geo::LocationCandidate,
    map::{MapProvider, MapView, RouteKind},
    tracking::{TrackingSnapshot, TrackingState},
    Error,
};
use lostfound_proto::{
    dto::{AdminStatsDto, DeviceDraft, DeviceStatsDto},
    Device, DeviceStatus, GeoPoint,
};

const PROGRESS_BAR_NO_NERD_TICK_CHARS: &'static str = "+x*";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Refresh,
    Add,
    Edit,
    ToggleStatus,
    Delete,
    Search,
    Stats,
    Map,
    Route,
    Track,
    StopTracking,
    Exit,
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Action::Refresh => "Refresh devices",
            Action::Add => "Add device",
            Action::Edit => "Edit device",
            Action::ToggleStatus => "Toggle lost/found",
            Action::Delete => "Delete device",
            Action::Search => "Search devices",
            Action::Stats => "Statistics",
            Action::Map => "Show map",
            Action::Route => "Route to device",
            Action::Track => "Track lost device",
            Action::StopTracking => "Stop tracking",
            Action::Exit => "Log out and exit",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationMethod {
    Skip,
    Search,
    CurrentPosition,
    Coordinates,
    Clear,
}

impl Display for LocationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LocationMethod::Skip => "Keep current location",
            LocationMethod::Search => "Search for a place",
            LocationMethod::CurrentPosition => "Use my current position",
            LocationMethod::Coordinates => "Enter coordinates",
            LocationMethod::Clear => "Clear location and coordinates",
        })
    }
}

#[async_trait]
pub trait InteractiveUI {
    async fn show_loading<T>(&self, message: String, task: T) -> T::Output
    where
        T: Future + Send,
        T::Output: Send;

    fn select_action(&self, tracking: bool) -> Option<Action>;

    fn prompt_credentials(&self, username: Option<String>) -> Option<(String, String)>;

    fn prompt_draft(&self, initial: &DeviceDraft) -> Option<DeviceDraft>;

    fn select_location_method(&self, allow_clear: bool) -> Option<LocationMethod>;

    fn prompt_text(&self, message: &str) -> Option<String>;

    fn select_candidate(&self, candidates: Vec<LocationCandidate>) -> Option<LocationCandidate>;

    fn prompt_position(&self) -> Option<GeoPoint>;

    fn select_device(&self, message: &str, devices: &[Device]) -> Option<Device>;

    fn confirm_delete(&self, device: &Device) -> bool;

    fn print_devices(&self, devices: &[Device]);

    fn print_stats(&self, stats: &DeviceStatsDto);

    fn print_admin_stats(&self, stats: &AdminStatsDto);

    fn print_map(&self, provider: &dyn MapProvider, view: &MapView);

    fn print_tracking(&self, snapshot: &TrackingSnapshot);

    fn print_message(&self, message: &str);

    fn print_error(&self, error: &Error);
}

#[derive(Clone)]
pub struct PromptUI {
    pub use_nerd_fonts: bool,
}

impl Default for PromptUI {
    fn default() -> Self {
        Self {
            use_nerd_fonts: true,
        }
    }
}

fn optional(text: String) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_owned())
    }
}

#[async_trait]
impl InteractiveUI for PromptUI {
    async fn show_loading<T>(&self, message: String, task: T) -> T::Output
    where
        T: Future + Send,
        T::Output: Send,
    {
        let mut style = ProgressStyle::default_spinner();
        if !self.use_nerd_fonts {
            style = style.tick_chars(PROGRESS_BAR_NO_NERD_TICK_CHARS);
        }
        let pb = indicatif::ProgressBar::new_spinner();
        pb.set_message(message);
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(64));
        let output = task.await;
        pb.finish_and_clear();
        output
    }

    fn select_action(&self, tracking: bool) -> Option<Action> {
        let mut actions = vec![
            Action::Refresh,
            Action::Add,
            Action::Edit,
            Action::ToggleStatus,
            Action::Delete,
            Action::Search,
            Action::Stats,
            Action::Map,
            Action::Route,
            Action::Track,
        ];
        if tracking {
            actions.push(Action::StopTracking);
        }
        actions.push(Action::Exit);

        inquire::Select::new("What do you want to do?", actions)
            .with_help_message("↑↓ to move, enter to select, type to filter, esc to exit")
            .with_vim_mode(true)
            .with_page_size(12)
            .prompt_skippable()
            .ok()
            .flatten()
    }

    fn prompt_credentials(&self, username: Option<String>) -> Option<(String, String)> {
        let username = match username {
            Some(username) => username,
            None => inquire::Text::new("Username:").prompt_skippable().ok()??,
        };
        let password = inquire::Password::new("Password:")
            .without_confirmation()
            .prompt_skippable()
            .ok()??;
        Some((username, password))
    }

    fn prompt_draft(&self, initial: &DeviceDraft) -> Option<DeviceDraft> {
        let name = inquire::Text::new("Name:")
            .with_initial_value(&initial.name)
            .with_validator(inquire::required!("Device name is required"))
            .prompt_skippable()
            .ok()??;
        let description = inquire::Text::new("Description:")
            .with_initial_value(initial.description.as_deref().unwrap_or_default())
            .prompt_skippable()
            .ok()??;
        let category = inquire::Text::new("Category:")
            .with_initial_value(initial.category.as_deref().unwrap_or_default())
            .with_help_message("e.g. phone, laptop, wallet, keys")
            .prompt_skippable()
            .ok()??;
        let statuses = vec![DeviceStatus::Lost, DeviceStatus::Found];
        let cursor = statuses
            .iter()
            .position(|s| *s == initial.status)
            .unwrap_or_default();
        let status = inquire::Select::new("Status:", statuses)
            .with_starting_cursor(cursor)
            .prompt_skippable()
            .ok()??;

        Some(DeviceDraft {
            name,
            description: optional(description),
            category: optional(category),
            status,
            ..initial.clone()
        })
    }

    fn select_location_method(&self, allow_clear: bool) -> Option<LocationMethod> {
        let mut methods = vec![
            LocationMethod::Skip,
            LocationMethod::Search,
            LocationMethod::CurrentPosition,
            LocationMethod::Coordinates,
        ];
        if allow_clear {
            methods.push(LocationMethod::Clear);
        }
        inquire::Select::new("Location:", methods)
            .prompt_skippable()
            .ok()
            .flatten()
    }

    fn prompt_text(&self, message: &str) -> Option<String> {
        inquire::Text::new(message).prompt_skippable().ok().flatten()
    }

    fn select_candidate(&self, candidates: Vec<LocationCandidate>) -> Option<LocationCandidate> {
        struct SelectItem(LocationCandidate);

        impl Display for SelectItem {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{} ({})", self.0.label, self.0.position)
            }
        }

        let items = candidates.into_iter().map(SelectItem).collect_vec();
        inquire::Select::new("Pick a place", items)
            .with_help_message("↑↓ to move, enter to select, esc to cancel")
            .prompt_skippable()
            .ok()
            .flatten()
            .map(|item| item.0)
    }

    fn prompt_position(&self) -> Option<GeoPoint> {
        let latitude = inquire::CustomType::<f64>::new("Latitude:")
            .with_error_message("Please type a number between -90 and 90")
            .prompt_skippable()
            .ok()??;
        let longitude = inquire::CustomType::<f64>::new("Longitude:")
            .with_error_message("Please type a number between -180 and 180")
            .prompt_skippable()
            .ok()??;
        Some(GeoPoint::new(latitude, longitude))
    }

    fn select_device(&self, message: &str, devices: &[Device]) -> Option<Device> {
        struct SelectItem<'a>(&'a Device);

        impl<'a> Display for SelectItem<'a> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(
                    f,
                    "#{} {} [{}]",
                    self.0.id,
                    self.0.name,
                    format_status(self.0.status)
                )
            }
        }

        if devices.is_empty() {
            println!("{}", "No devices".dimmed());
            return None;
        }
        let items = devices.iter().map(SelectItem).collect_vec();
        inquire::Select::new(message, items)
            .with_help_message("↑↓ to move, enter to select, type to filter, esc to cancel")
            .with_vim_mode(true)
            .prompt_skippable()
            .ok()
            .flatten()
            .map(|item| item.0.clone())
    }

    fn confirm_delete(&self, device: &Device) -> bool {
        inquire::Confirm::new(&format!("Delete \"{}\"?", device.name))
            .with_default(false)
            .with_help_message("this cannot be undone")
            .prompt_skippable()
            .is_ok_and(|r| r == Some(true))
    }

    fn print_devices(&self, devices: &[Device]) {
        if devices.is_empty() {
            println!("{}", "No devices registered yet".dimmed());
            return;
        }
        let mut table = Table::new();
        table.set_header(vec![
            "ID", "Name", "Category", "Status", "Location", "Position", "Created",
        ]);
        for device in devices {
            table.add_row(vec![
                device.id.to_string(),
                device.name.clone(),
                device.category.clone().unwrap_or_default(),
                format_status(device.status),
                device.location.clone().unwrap_or_default(),
                device
                    .position()
                    .map(|p| format!("{} {}", self.pin_icon(), p))
                    .unwrap_or_default(),
                device.created_at.clone().unwrap_or_default(),
            ]);
        }
        println!("{}", table);
    }

    fn print_stats(&self, stats: &DeviceStatsDto) {
        let mut table = Table::new();
        table.set_header(vec!["Total", "Lost", "Found"]);
        table.add_row(vec![
            stats.total.to_string(),
            stats.lost.to_string().red().to_string(),
            stats.found.to_string().green().to_string(),
        ]);
        println!("{}", table);
    }

    fn print_admin_stats(&self, stats: &AdminStatsDto) {
        let mut table = Table::new();
        table.set_header(vec!["Users", "Devices", "Lost", "Found"]);
        table.add_row(vec![
            stats.users.to_string(),
            stats.devices.to_string(),
            stats.lost.to_string().red().to_string(),
            stats.found.to_string().green().to_string(),
        ]);
        println!("{}", table);
    }

    fn print_map(&self, provider: &dyn MapProvider, view: &MapView) {
        println!(
            "{} centered on {} (zoom {})",
            provider.name().bold(),
            view.center,
            view.zoom
        );
        if view.markers.is_empty() {
            println!("{}", "No device has coordinates".dimmed());
        } else {
            let mut table = Table::new();
            table.set_header(vec!["ID", "Status", "Position", "Details"]);
            for marker in &view.markers {
                table.add_row(vec![
                    marker.device_id.to_string(),
                    format_status(marker.status),
                    marker.position.to_string(),
                    marker.popup.clone(),
                ]);
            }
            println!("{}", table);
        }
        if let Some(route) = &view.route {
            let kind = match route.kind {
                RouteKind::Simulated => "Simulated route",
                RouteKind::Driving => "Driving route",
            };
            let mut summary = format!("{}: {} points", kind, route.points.len());
            if let Some(distance) = route.distance {
                summary.push_str(&format!(", {:.1} km", distance / 1000.0));
            }
            if let Some(duration) = route.duration {
                summary.push_str(&format!(", {:.0} min", duration / 60.0));
            }
            println!("{}", summary.cyan());
        }
        println!("{}", provider.view_url(view).underline());
    }

    fn print_tracking(&self, snapshot: &TrackingSnapshot) {
        let state = match snapshot.state {
            TrackingState::Idle => "idle".dimmed(),
            TrackingState::Active => "active".yellow(),
            TrackingState::Stopped => "finished".green(),
        };
        match (snapshot.device_id, snapshot.route.last()) {
            (Some(id), Some(last)) => println!(
                "Tracking device #{} {}: {} points, last at {}",
                id,
                state,
                snapshot.route.len(),
                last
            ),
            _ => println!("Tracking {}", state),
        }
    }

    fn print_message(&self, message: &str) {
        println!("{}", message.green());
    }

    fn print_error(&self, error: &Error) {
        println!("{}", error.to_string().bold().red());
        if error.is_network() {
            println!("{}", "Is the registry reachable? Check --base-url".dimmed());
        }
    }
}

impl PromptUI {
    fn pin_icon(&self) -> &'static str {
        if self.use_nerd_fonts {
            "󰍎"
        } else {
            ""
        }
    }
}

fn format_status(status: DeviceStatus) -> String {
    match status {
        DeviceStatus::Lost => status.to_string().red().bold().to_string(),
        DeviceStatus::Found => status.to_string().green().bold().to_string(),
    }
}
