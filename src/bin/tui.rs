use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind}, execute, terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{backend::CrosstermBackend, Terminal, widgets::{Block, Borders, List, ListItem, Paragraph, ListState}, layout::{Layout, Constraint, Direction}, style::{Style, Modifier, Color}};

use todo_app::client::ApiClient;
use todo_app::tui::{App, Mode};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let base_url = std::env::var("TODO_API_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
    let client = ApiClient::new(base_url);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, client).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

async fn run_app(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, client: ApiClient) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut app = App::new(client);
    let mut list_state = ListState::default();
    let mut last_tick = Instant::now();
    app.load().await?;

    loop {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(1),
                    Constraint::Length(3),
                ])
                .split(f.size());

            let header = Paragraph::new("Todos (Enter: toggle, n: new, e: edit, d: delete, f: filter, r: reload, q: quit)")
                .block(Block::default().borders(Borders::ALL).title("todo-app"));
            f.render_widget(header, chunks[0]);

            let visible = app.visible();
            let items: Vec<ListItem> = visible.iter().filter_map(|&idx| app.todos.get(idx)).map(|t| {
                let mark = if t.completed { "[x]" } else { "[ ]" };
                ListItem::new(format!("{} {}", mark, t.title))
            }).collect();
            if visible.is_empty() { list_state.select(None); } else { list_state.select(Some(app.selected.min(visible.len() - 1))); }
            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL).title(format!("items [{}]", app.filter.label())))
                .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
                .highlight_symbol(">> ");
            f.render_stateful_widget(list, chunks[1], &mut list_state);

            let footer_text = match app.mode {
                Mode::View => match &app.status {
                    Some(status) => status.clone(),
                    None => format!("Filter=[{}]  |  {} items", app.filter.label(), app.todos.len()),
                },
                Mode::Create => format!("New title: {}_  |  (Enter to save, Esc to cancel)", app.new_title),
                Mode::Edit => format!("Edit title: {}_  |  (Enter to save, Esc to cancel)", app.editing_title),
            };
            let footer = Paragraph::new(footer_text)
                .block(Block::default().borders(Borders::ALL).title(match app.mode { Mode::View => "info", Mode::Create => "create", Mode::Edit => "edit" }));
            f.render_widget(footer, chunks[2]);
        })?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only act on key presses; ignore repeats and releases to prevent duplicate input
                if key.kind != KeyEventKind::Press { continue; }
                match app.mode {
                    Mode::View => match key.code {
                        KeyCode::Char('q') => break,
                        KeyCode::Up => app.move_selection(-1),
                        KeyCode::Down => app.move_selection(1),
                        KeyCode::Enter => app.toggle_selected().await,
                        KeyCode::Char('n') => app.start_create(),
                        KeyCode::Char('e') => app.begin_edit(),
                        KeyCode::Char('d') => app.remove_selected().await,
                        KeyCode::Char('f') => app.cycle_filter(),
                        KeyCode::Char('r') => app.load().await?,
                        _ => {}
                    },
                    Mode::Create => match key.code {
                        KeyCode::Esc => app.cancel_create(),
                        KeyCode::Enter => app.add().await,
                        KeyCode::Backspace => { app.new_title.pop(); }
                        KeyCode::Char(c) => app.new_title.push(c),
                        _ => {}
                    },
                    Mode::Edit => match key.code {
                        KeyCode::Esc => app.cancel_edit(),
                        KeyCode::Enter => app.save_edit().await,
                        KeyCode::Backspace => { app.editing_title.pop(); }
                        KeyCode::Char(c) => app.editing_title.push(c),
                        _ => {}
                    },
                }
            }
        }
        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }
    Ok(())
}
