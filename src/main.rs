use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventKind,
    HandlerResponse, Keybindings, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use pokecards::action::Action;
use pokecards::api::{self, PageFetcher, PokeApiClient};
use pokecards::config::Config;
use pokecards::effect::Effect;
use pokecards::reducer::reducer;
use pokecards::state::AppState;
use pokecards::ui::{self, CardsComponentId, CardsContext};

#[derive(Parser, Debug)]
#[command(name = "pokecards")]
#[command(about = "Browse Pokemon as cards, one page at a time")]
struct Args {
    #[command(flatten)]
    config: Config,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    args.config
        .validate()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let _log_guard = pokecards::logging::init(&args.config.log_dir());

    let client = PokeApiClient::new(&args.config.base_url, args.config.timeout())
        .map_err(io::Error::other)?;
    api::install_fetcher(PageFetcher::new(
        Arc::new(client),
        args.config.detail_concurrency,
    ))
    .map_err(io::Error::other)?;
    tracing::info!(
        base_url = %args.config.base_url,
        page_size = args.config.page_size,
        "starting pokecards"
    );

    let page_size = args.config.page_size;
    let debug = DebugSession::new(args.debug);

    let state = debug
        .load_state_or_else_async(|| async move {
            Ok::<AppState, io::Error>(AppState::with_page_size(page_size))
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions).await;

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
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    tracing::info!("pokecards stopped");
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(ui::CardsUi::new()));
    let mut bus: EventBus<AppState, Action, CardsComponentId, CardsContext> = EventBus::new();
    let keybindings: Keybindings<CardsContext> = Keybindings::new();

    bus.register(CardsComponentId::Grid, |event, state| {
        ui::handle_grid_event(&event.kind, state)
    });
    bus.register(CardsComponentId::Detail, |event, state| {
        ui::handle_detail_event(&event.kind, state)
    });
    bus.register(CardsComponentId::Search, |event, state| {
        ui::handle_search_event(&event.kind, state)
    });

    bus.register_global(|event, state| match event.kind {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(width, height)).with_render()
        }
        EventKind::Key(key) if !state.search.active => match key.code {
            crossterm::event::KeyCode::Char('q') => HandlerResponse::action(Action::Quit),
            crossterm::event::KeyCode::Char('/') if !state.navigator.is_open() => {
                HandlerResponse::action(Action::SearchStart)
            }
            _ => HandlerResponse::ignored(),
        },
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(90), || Action::Tick);
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>) {
    match effect {
        Effect::FetchPage(request) => {
            let Some(fetcher) = api::installed_fetcher() else {
                tracing::error!("page requested before the fetcher was installed");
                return;
            };
            ctx.tasks().spawn(TaskKey::new("page"), async move {
                Action::PageDidLoad {
                    generation: request.generation,
                    page: fetcher.fetch(request).await,
                }
            });
        }
    }
}
