//! City table TUI - browse world cities page by page

use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use citytable::action::Action;
use citytable::api::{self, CitySource, OpenDataSoftClient};
use citytable::components::{CitiesView, CitiesViewProps, Component};
use citytable::effect::Effect;
use citytable::logging;
use citytable::reducer::reducer;
use citytable::state::{AppState, DEFAULT_PAGE_SIZE, LOADING_TICK_MS};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend, layout::Rect};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventContext, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, RenderContext, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

/// City table TUI - infinite scroll, search and sort over a public dataset
#[derive(Parser, Debug)]
#[command(name = "citytable")]
#[command(about = "Browse world cities with infinite scroll, search and sorting")]
struct Args {
    /// Records search endpoint
    #[arg(long, default_value = api::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Dataset to page through
    #[arg(long, default_value = api::DEFAULT_DATASET)]
    dataset: String,

    /// Rows per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..=100))]
    page_size: u32,

    /// Diagnostics log file (defaults to citytable.log in the temp dir)
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum CityComponentId {
    Cities,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum CityContext {
    Main,
}

impl EventRoutingState<CityComponentId, CityContext> for AppState {
    fn focused(&self) -> Option<CityComponentId> {
        Some(CityComponentId::Cities)
    }

    fn modal(&self) -> Option<CityComponentId> {
        None
    }

    fn binding_context(&self, _id: CityComponentId) -> CityContext {
        CityContext::Main
    }

    fn default_context(&self) -> CityContext {
        CityContext::Main
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        endpoint,
        dataset,
        page_size,
        log_file,
        debug: debug_args,
    } = Args::parse();

    let log_path = log_file.unwrap_or_else(logging::default_log_path);
    logging::init(&log_path)?;
    tracing::info!(%endpoint, %dataset, page_size, "starting citytable");

    let debug = DebugSession::new(debug_args);

    // Export JSON schemas if requested
    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState::new(page_size))
        })
        .await
        .map_err(debug_error)?;

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;

    let (middleware, action_recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let source: Arc<dyn CitySource> = Arc::new(OpenDataSoftClient::new(endpoint, dataset));

    // ===== Terminal setup =====
    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions, source).await;

    // ===== Cleanup =====
    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug
        .save_actions(action_recorder.as_ref())
        .map_err(debug_error)?;

    Ok(())
}

struct CityUi {
    view: CitiesView,
}

impl CityUi {
    fn new() -> Self {
        Self {
            view: CitiesView::new(),
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
        event_ctx: &mut EventContext<CityComponentId>,
    ) {
        event_ctx.set_component_area(CityComponentId::Cities, area);
        let props = CitiesViewProps {
            state,
            is_focused: render_ctx.is_focused(),
        };
        self.view.render(frame, area, props);
    }

    fn handle_event(&mut self, event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
        let props = CitiesViewProps {
            state,
            is_focused: true,
        };
        let actions: Vec<_> = self.view.handle_event(event, props).into_iter().collect();
        if actions.is_empty() {
            HandlerResponse::ignored()
        } else {
            HandlerResponse {
                actions,
                consumed: true,
                needs_render: false,
            }
        }
    }
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
    source: Arc<dyn CitySource>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(CityUi::new()));
    let mut bus: EventBus<AppState, Action, CityComponentId, CityContext> = EventBus::new();
    let keybindings: Keybindings<CityContext> = Keybindings::new();

    let ui_cities = Rc::clone(&ui);
    bus.register(CityComponentId::Cities, move |event, state| {
        ui_cities.borrow_mut().handle_event(&event.kind, state)
    });

    // Re-render on terminal resize (no action needed, just redraw)
    bus.register_global(|event, _state| match event.kind {
        EventKind::Resize(_, _) => HandlerResponse::ignored().with_render(),
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::PageFetch),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }

                runtime.subscriptions().interval(
                    "tick",
                    Duration::from_millis(LOADING_TICK_MS),
                    || Action::Tick,
                );
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(effect, ctx, Arc::clone(&source)),
        )
        .await
}

/// Handle effects by spawning tasks
fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>, source: Arc<dyn CitySource>) {
    match effect {
        Effect::FetchPage { page, start, rows } => {
            tracing::info!(page, start, rows, "fetching city page");
            ctx.tasks().spawn(TaskKey::new("page"), async move {
                api::load_page(source.as_ref(), page, start, rows).await
            });
        }
        Effect::OpenRoute { route } => {
            tracing::info!(%route, "opening weather route");
        }
    }
}
