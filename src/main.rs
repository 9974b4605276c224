//! Veðurspá - forecast widget in the terminal

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio::task::LocalSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tui_dispatch::{EffectStore, EventKind};
use vedur::action::Action;
use vedur::api::{self, OpenMeteo};
use vedur::components::{Component, DocumentView, DocumentViewProps};
use vedur::dom::Element;
use vedur::effect::Effect;
use vedur::geolocation::{
    self, FixedPosition, GeolocationProvider, IpGeolocation, Position, Unsupported,
};
use vedur::page;
use vedur::reducer::reducer;
use vedur::search::{ForecastSource, SearchController};
use vedur::state::{default_locations, locations_from_json, AppState, Location};
use vedur::view::{View, ViewRenderer};

/// Time between frames; search tasks run while the loop sleeps.
const FRAME_MS: u64 = 50;

/// Veðurspá - hourly forecast for a list of places
#[derive(Parser, Debug)]
#[command(name = "vedur")]
#[command(about = "Hourly temperature and precipitation forecast in the terminal")]
struct Args {
    /// JSON file of `{"title", "lat", "lng"}` records replacing the built-in list
    #[arg(long)]
    locations: Option<PathBuf>,

    /// Forecast endpoint (Open-Meteo compatible)
    #[arg(long, default_value = api::OPEN_METEO_URL)]
    forecast_url: String,

    /// Position lookup endpoint (ip-api compatible)
    #[arg(long, default_value = geolocation::IP_API_URL)]
    geolocation_url: String,

    /// Fixed device latitude, used instead of the lookup service
    #[arg(long, requires = "longitude", allow_hyphen_values = true)]
    latitude: Option<f64>,

    /// Fixed device longitude, used instead of the lookup service
    #[arg(long, requires = "latitude", allow_hyphen_values = true)]
    longitude: Option<f64>,

    /// Behave as if no geolocation were available
    #[arg(long, conflicts_with_all = ["latitude", "longitude"])]
    no_geolocation: bool,

    /// Log file (filter with RUST_LOG)
    #[arg(long, default_value = "vedur.log")]
    log_file: PathBuf,
}

/// Work requested by page listeners, run on the local task set
enum Command {
    Search(Location),
    SearchMyLocation,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    let locations = match &args.locations {
        Some(path) => load_locations(path)?,
        None => default_locations(),
    };
    let source: Rc<dyn ForecastSource> = Rc::new(OpenMeteo::new(args.forecast_url.clone()));
    let geolocation = geolocation_provider(&args);

    // ===== Terminal setup =====
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let local = LocalSet::new();
    let result = local
        .run_until(run_app(&mut terminal, locations, source, geolocation))
        .await;

    // ===== Cleanup =====
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_locations(path: &Path) -> io::Result<Vec<Location>> {
    let json = fs::read_to_string(path)?;
    locations_from_json(&json).map_err(io::Error::other)
}

fn geolocation_provider(args: &Args) -> Rc<dyn GeolocationProvider> {
    if args.no_geolocation {
        return Rc::new(Unsupported);
    }
    match (args.latitude, args.longitude) {
        (Some(latitude), Some(longitude)) => Rc::new(FixedPosition(Position {
            latitude,
            longitude,
        })),
        _ => Rc::new(IpGeolocation::new(args.geolocation_url.clone())),
    }
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    locations: Vec<Location>,
    source: Rc<dyn ForecastSource>,
    geolocation: Rc<dyn GeolocationProvider>,
) -> io::Result<()> {
    let (commands, mut pending) = mpsc::unbounded_channel();
    let search_commands = commands.clone();

    let body = Element::new("body");
    let output = page::render(
        &body,
        &locations,
        move |location| {
            let _ = search_commands.send(Command::Search(location));
        },
        move || {
            let _ = commands.send(Command::SearchMyLocation);
        },
    );
    let view: Rc<dyn View> = Rc::new(ViewRenderer::new(&output));
    let controller = Rc::new(SearchController::new(source, view, geolocation));

    let mut store = EffectStore::new(AppState::new(body.find_all("button").len()), reducer);
    let mut display = DocumentView;
    info!(locations = locations.len(), "widget mounted");

    loop {
        terminal.draw(|frame| {
            let props = DocumentViewProps {
                document: &body,
                focused: store.state().focused,
                is_focused: true,
            };
            display.render(frame, frame.area(), props);
        })?;

        while event::poll(Duration::ZERO)? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }

            let props = DocumentViewProps {
                document: &body,
                focused: store.state().focused,
                is_focused: true,
            };
            let actions: Vec<_> = display
                .handle_event(&EventKind::Key(key), props)
                .into_iter()
                .collect();
            for action in actions {
                if action == Action::Quit {
                    return Ok(());
                }
                let result = store.dispatch(action);
                for effect in result.effects {
                    handle_effect(effect, &body);
                }
            }
        }

        while let Ok(command) = pending.try_recv() {
            let controller = Rc::clone(&controller);
            tokio::task::spawn_local(async move {
                match command {
                    Command::Search(location) => controller.search(location).await,
                    Command::SearchMyLocation => controller.search_current_location().await,
                }
            });
        }

        tokio::time::sleep(Duration::from_millis(FRAME_MS)).await;
    }
}

/// Handle effects against the live document
fn handle_effect(effect: Effect, document: &Element) {
    match effect {
        Effect::Click { index } => match document.find_all("button").get(index) {
            Some(button) => {
                button.dispatch("click");
            }
            None => warn!(index, "no button to click"),
        },
    }
}
