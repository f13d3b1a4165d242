use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{
    Component, EventContext, EventKind, EventRoutingState, HandlerResponse, RenderContext,
};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps,
    StatusBarSection, StatusBarStyle,
};

use crate::action::Action;
use crate::search::SearchStatus;
use crate::state::{AppState, Item, ItemStat};

const BG_BASE: Color = Color::Rgb(12, 18, 28);
const BG_PANEL: Color = Color::Rgb(20, 32, 46);
const TEXT_MAIN: Color = Color::Rgb(232, 242, 244);
const TEXT_DIM: Color = Color::Rgb(176, 195, 207);
const ACCENT_TEAL: Color = Color::Rgb(72, 204, 184);
const ACCENT_GOLD: Color = Color::Rgb(228, 176, 88);
const UNKNOWN_TYPE: Color = Color::Rgb(0x77, 0x77, 0x77);

pub const CARD_WIDTH: u16 = 22;
pub const CARD_HEIGHT: u16 = 6;
const DETAIL_WIDTH: u16 = 58;
const DETAIL_HEIGHT: u16 = 22;
const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CardsComponentId {
    Grid,
    Detail,
    Search,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardsContext {
    Grid,
    Detail,
    Search,
}

impl EventRoutingState<CardsComponentId, CardsContext> for AppState {
    fn focused(&self) -> Option<CardsComponentId> {
        self.modal().or(Some(CardsComponentId::Grid))
    }

    fn modal(&self) -> Option<CardsComponentId> {
        if self.search.active {
            Some(CardsComponentId::Search)
        } else if self.navigator.is_open() {
            Some(CardsComponentId::Detail)
        } else {
            None
        }
    }

    fn binding_context(&self, id: CardsComponentId) -> CardsContext {
        match id {
            CardsComponentId::Grid => CardsContext::Grid,
            CardsComponentId::Detail => CardsContext::Detail,
            CardsComponentId::Search => CardsContext::Search,
        }
    }

    fn default_context(&self) -> CardsContext {
        CardsContext::Grid
    }
}

pub const PROMPT_TOO_SHORT: &str = "Type at least 3 characters to search.";
pub const PROMPT_NO_MATCHES: &str = "No Pokémon found matching your search.";

/// Turns items into displayable cards and detail views.
pub trait CardRenderer {
    /// Append one card per item to `into`, leaving existing cards in place.
    fn render_cards(&self, items: &[&Item], into: &mut Vec<Text<'static>>);

    fn render_detail(&self, item: &Item) -> Text<'static>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalCards;

impl CardRenderer for TerminalCards {
    fn render_cards(&self, items: &[&Item], into: &mut Vec<Text<'static>>) {
        into.extend(items.iter().map(|item| {
            Text::from(vec![
                Line::from(Span::styled(format_id(item.id), Style::default().fg(TEXT_DIM))),
                Line::from(Span::styled(
                    format_name(&item.name),
                    Style::default().fg(TEXT_MAIN).add_modifier(Modifier::BOLD),
                )),
                type_badges(&item.types),
            ])
        }));
    }

    fn render_detail(&self, item: &Item) -> Text<'static> {
        let label = Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(vec![
                Span::styled("Image: ", label),
                Span::styled(item.image_ref.clone(), Style::default().fg(TEXT_DIM)),
            ]),
            type_badges(&item.types),
            Line::from(vec![
                Span::styled("Abilities: ", label),
                Span::raw(if item.abilities.is_empty() {
                    "-".to_string()
                } else {
                    item.abilities
                        .iter()
                        .map(|ability| format_name(ability))
                        .collect::<Vec<_>>()
                        .join(", ")
                }),
            ]),
            Line::from(""),
            Line::from(Span::styled("Base Stats:", label)),
        ];
        lines.extend(item.stats.iter().map(|stat| Line::from(render_stat(stat))));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Height: ", label),
            Span::raw(format_tenths(item.height, "m")),
            Span::raw("   "),
            Span::styled("Weight: ", label),
            Span::raw(format_tenths(item.weight, "kg")),
        ]));
        Text::from(lines)
    }
}

pub struct CardsUi {
    renderer: TerminalCards,
    status_bar: StatusBar,
}

impl Default for CardsUi {
    fn default() -> Self {
        Self::new()
    }
}

impl CardsUi {
    pub fn new() -> Self {
        Self {
            renderer: TerminalCards,
            status_bar: StatusBar::new(),
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        _render_ctx: RenderContext,
        event_ctx: &mut EventContext<CardsComponentId>,
    ) {
        let layout = app_layout(area);
        event_ctx.set_component_area(CardsComponentId::Search, layout[0]);
        event_ctx.set_component_area(CardsComponentId::Grid, layout[1]);
        if state.navigator.is_open() {
            event_ctx.set_component_area(CardsComponentId::Detail, detail_area(area));
        }
        render_app(frame, area, state, &self.renderer, &mut self.status_bar);
    }
}

fn app_layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(CARD_HEIGHT),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(area)
}

fn detail_area(area: Rect) -> Rect {
    let width = DETAIL_WIDTH.min(area.width);
    let height = DETAIL_HEIGHT.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

pub fn render_app(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    renderer: &dyn CardRenderer,
    status_bar: &mut StatusBar,
) {
    let base = Block::default().style(Style::default().bg(BG_BASE));
    frame.render_widget(base, area);
    let layout = app_layout(area);

    render_header(frame, layout[0], state);
    render_grid(frame, layout[1], state, renderer);
    render_load_more(frame, layout[2], state);
    render_footer(frame, layout[3], state, status_bar);

    if let Some(item) = state.detail() {
        render_detail(frame, area, state, item, renderer);
    }
}

pub fn handle_grid_event(event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
    let columns = grid_columns(state.terminal_size.0.saturating_sub(2)) as i16;
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Left | crossterm::event::KeyCode::Char('h') => {
                vec![Action::CursorMove(-1)]
            }
            crossterm::event::KeyCode::Right | crossterm::event::KeyCode::Char('l') => {
                vec![Action::CursorMove(1)]
            }
            crossterm::event::KeyCode::Up | crossterm::event::KeyCode::Char('k') => {
                vec![Action::CursorMove(-columns)]
            }
            crossterm::event::KeyCode::Down | crossterm::event::KeyCode::Char('j') => {
                vec![Action::CursorMove(columns)]
            }
            crossterm::event::KeyCode::Home => vec![Action::CursorSet(0)],
            crossterm::event::KeyCode::End => vec![Action::CursorSet(usize::MAX)],
            crossterm::event::KeyCode::Enter => vec![Action::DetailOpenSelected],
            crossterm::event::KeyCode::Char('m') if state.load_more_button().enabled => {
                vec![Action::LoadMore]
            }
            crossterm::event::KeyCode::Char('r') => vec![Action::LoadRetry],
            crossterm::event::KeyCode::Char('R') => vec![Action::CatalogReload],
            crossterm::event::KeyCode::Esc if state.search_active() => vec![Action::SearchCancel],
            _ => vec![],
        },
        EventKind::Scroll { delta, .. } => vec![Action::CursorMove(*delta as i16 * columns)],
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_detail_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Left | crossterm::event::KeyCode::Char('h') => {
                vec![Action::DetailPrev]
            }
            crossterm::event::KeyCode::Right | crossterm::event::KeyCode::Char('l') => {
                vec![Action::DetailNext]
            }
            crossterm::event::KeyCode::Esc
            | crossterm::event::KeyCode::Enter
            | crossterm::event::KeyCode::Backspace => vec![Action::DetailClose],
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_search_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Esc => vec![Action::SearchCancel],
            crossterm::event::KeyCode::Enter => vec![Action::SearchSubmit],
            crossterm::event::KeyCode::Backspace => vec![Action::SearchBackspace],
            crossterm::event::KeyCode::Char(ch) => vec![Action::SearchInput(ch)],
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
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

/// Cards per grid row for a body of the given width.
pub fn grid_columns(width: u16) -> usize {
    (width / CARD_WIDTH).max(1) as usize
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let title_style = Style::default()
        .fg(ACCENT_TEAL)
        .add_modifier(Modifier::BOLD);
    let search = if state.search.active {
        format!("/{}_", state.search.query)
    } else if state.search.query.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", state.search.query)
    };
    let mut spans = vec![
        Span::styled("Loaded: ", Style::default().fg(TEXT_DIM)),
        Span::styled(state.store.len().to_string(), title_style),
        Span::raw("  |  Search: "),
        Span::styled(search, Style::default().fg(ACCENT_GOLD)),
    ];
    if state.pagination.is_loading() {
        let frame_char = SPINNER[(state.tick as usize) % SPINNER.len()];
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{frame_char} Loading"),
            Style::default().fg(ACCENT_TEAL),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM))
        .title("POKEDEX CARDS");
    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_grid(frame: &mut Frame, area: Rect, state: &AppState, renderer: &dyn CardRenderer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let view = state.view();
    let empty_message = match view.status {
        SearchStatus::TooShort => Some(PROMPT_TOO_SHORT.to_string()),
        SearchStatus::NoMatches => Some(PROMPT_NO_MATCHES.to_string()),
        SearchStatus::ShowAll if view.results.is_empty() => Some(
            state
                .message
                .clone()
                .unwrap_or_else(|| "Loading Pokémon...".to_string()),
        ),
        _ => None,
    };
    if let Some(message) = empty_message {
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(TEXT_DIM))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
        return;
    }

    let columns = grid_columns(inner.width);
    let visible_rows = (inner.height / CARD_HEIGHT).max(1) as usize;
    let cursor_row = state.cursor / columns;
    let first_row = cursor_row.saturating_sub(visible_rows - 1);
    let start = (first_row * columns).min(view.results.len());
    let end = (start + visible_rows * columns).min(view.results.len());
    let visible = &view.results[start..end];

    let mut cards = Vec::with_capacity(visible.len());
    renderer.render_cards(visible, &mut cards);

    for (offset, (item, card)) in visible.iter().zip(cards).enumerate() {
        let row = (offset / columns) as u16;
        let col = (offset % columns) as u16;
        let rect = Rect::new(
            inner.x + col * CARD_WIDTH,
            inner.y + row * CARD_HEIGHT,
            CARD_WIDTH.min(inner.width),
            CARD_HEIGHT.min(inner.height),
        );
        if rect.bottom() > inner.bottom() || rect.right() > inner.right() {
            continue;
        }
        let mut border = Style::default().fg(type_color(item.primary_type()));
        if start + offset == state.cursor {
            border = border.add_modifier(Modifier::BOLD | Modifier::REVERSED);
        }
        let card_block = Block::default()
            .borders(Borders::ALL)
            .border_style(border);
        let paragraph = Paragraph::new(card)
            .block(card_block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, rect);
    }
}

fn render_load_more(frame: &mut Frame, area: Rect, state: &AppState) {
    let button = state.load_more_button();
    if !button.visible {
        return;
    }
    let style = if button.enabled {
        Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_DIM)
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(
        format!("[ {} ]", button.label),
        style,
    )))
    .alignment(Alignment::Center)
    .style(Style::default().bg(BG_BASE));
    frame.render_widget(paragraph, area);
}

fn render_detail(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    item: &Item,
    renderer: &dyn CardRenderer,
) {
    let modal_area = detail_area(area);
    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(
            Style::default()
                .fg(type_color(item.primary_type()))
                .add_modifier(Modifier::BOLD),
        )
        .title(format!(" {} {} ", format_name(&item.name), format_id(item.id)));
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let detail = Paragraph::new(renderer.render_detail(item)).wrap(Wrap { trim: false });
    frame.render_widget(detail, layout[0]);

    let enabled = Style::default().fg(ACCENT_TEAL).add_modifier(Modifier::BOLD);
    let disabled = Style::default().fg(TEXT_DIM).add_modifier(Modifier::DIM);
    let nav = Line::from(vec![
        Span::styled(
            "< Prev",
            if state.navigator.can_prev(&state.store) { enabled } else { disabled },
        ),
        Span::raw("   Esc Close   "),
        Span::styled(
            "Next >",
            if state.navigator.can_next(&state.store) { enabled } else { disabled },
        ),
    ]);
    frame.render_widget(
        Paragraph::new(nav).alignment(Alignment::Center),
        layout[1],
    );
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let status = state.message.clone().unwrap_or_else(|| {
        if state.pagination.is_loading() {
            "Loading Pokémon...".to_string()
        } else {
            "".to_string()
        }
    });
    let (left_hints, center_hints) = status_hints(state);
    let status_span = Span::styled(status.as_str(), Style::default().fg(ACCENT_GOLD));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT_TEAL)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

fn status_hints(state: &AppState) -> (Vec<StatusBarHint<'static>>, Vec<StatusBarHint<'static>>) {
    if state.search.active {
        let left = vec![
            StatusBarHint::new("Enter", "Apply"),
            StatusBarHint::new("Esc", "Clear"),
            StatusBarHint::new("Bksp", "Delete"),
        ];
        return (left, Vec::new());
    }
    if state.navigator.is_open() {
        let left = vec![
            StatusBarHint::new("h/l", "Prev/Next"),
            StatusBarHint::new("Esc", "Close"),
        ];
        return (left, vec![StatusBarHint::new("q", "Quit")]);
    }

    let mut left = vec![
        StatusBarHint::new("hjkl", "Move"),
        StatusBarHint::new("Enter", "Details"),
    ];
    if state.load_more_button().enabled {
        left.push(StatusBarHint::new("m", "More"));
    }
    if state.pagination.phase() == crate::pagination::LoadPhase::Error {
        left.push(StatusBarHint::new("r", "Retry"));
    }
    let center = vec![
        StatusBarHint::new("/", "Search"),
        StatusBarHint::new("R", "Reload"),
        StatusBarHint::new("q", "Quit"),
    ];
    (left, center)
}

fn type_badges(types: &[String]) -> Line<'static> {
    let mut spans = Vec::with_capacity(types.len() * 2);
    for (index, name) in types.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            format!(" {} ", format_name(name)),
            Style::default()
                .bg(type_color(name))
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

pub fn type_color(name: &str) -> Color {
    match name {
        "normal" => Color::Rgb(0xA8, 0xA7, 0x7A),
        "fire" => Color::Rgb(0xEE, 0x81, 0x30),
        "water" => Color::Rgb(0x63, 0x90, 0xF0),
        "electric" => Color::Rgb(0xF7, 0xD0, 0x2C),
        "grass" => Color::Rgb(0x7A, 0xC7, 0x4C),
        "ice" => Color::Rgb(0x96, 0xD9, 0xD6),
        "fighting" => Color::Rgb(0xC2, 0x2E, 0x28),
        "poison" => Color::Rgb(0xA3, 0x3E, 0xA1),
        "ground" => Color::Rgb(0xE2, 0xBF, 0x65),
        "flying" => Color::Rgb(0xA9, 0x8F, 0xF3),
        "psychic" => Color::Rgb(0xF9, 0x55, 0x87),
        "bug" => Color::Rgb(0xA6, 0xB9, 0x1A),
        "rock" => Color::Rgb(0xB6, 0xA1, 0x36),
        "ghost" => Color::Rgb(0x73, 0x57, 0x97),
        "dragon" => Color::Rgb(0x6F, 0x35, 0xFC),
        "dark" => Color::Rgb(0x70, 0x57, 0x46),
        "steel" => Color::Rgb(0xB7, 0xB7, 0xCE),
        "fairy" => Color::Rgb(0xD6, 0x85, 0xAD),
        _ => UNKNOWN_TYPE,
    }
}

pub fn format_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
                None => "".to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_id(id: u32) -> String {
    format!("#{id:03}")
}

/// Provider units are tenths: 7 -> "0.7 m".
pub fn format_tenths(value: u32, unit: &str) -> String {
    format!("{}.{} {unit}", value / 10, value % 10)
}

fn render_stat(stat: &ItemStat) -> String {
    let label = shorten_stat(&stat.name);
    let bar_len = (stat.value as usize / 10).clamp(1, 20);
    let bar = "#".repeat(bar_len);
    format!("{label:>4} {value:>3} {bar}", value = stat.value)
}

fn shorten_stat(name: &str) -> String {
    match name {
        "hp" => " HP".to_string(),
        "attack" => "ATK".to_string(),
        "defense" => "DEF".to_string(),
        "special-attack" => "SAT".to_string(),
        "special-defense" => "SDF".to_string(),
        "speed" => "SPD".to_string(),
        _ => name.to_ascii_uppercase(),
    }
}
