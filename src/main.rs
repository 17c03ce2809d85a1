mod app;
mod client;
mod config;
mod conversation;
mod log;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::Parser;
use client::{AnswerClient, AnswerService, RequestFailed};
use conversation::Conversation;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use theme::Theme;
use tokio::sync::mpsc;

const PAGE: u16 = 10;
const WHEEL_STEP: u16 = 3;

#[derive(Parser)]
#[command(name = "qa-chat")]
#[command(about = "Terminal chat client for a question/answer HTTP service")]
struct Cli {
    /// Answer service URL (overrides the config file)
    #[arg(short, long)]
    endpoint: Option<String>,
    /// Start in this theme instead of following the terminal
    #[arg(short, long, value_enum)]
    theme: Option<Theme>,
    /// Ask a single question, print the exchange and exit
    #[arg(short, long)]
    ask: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config()?;
    let log_path = log::init(&config::app_dir()?, &cfg.log_filter)?;

    let endpoint = cli.endpoint.unwrap_or(cfg.endpoint);
    let client = AnswerClient::new(endpoint);
    tracing::info!(endpoint = client.endpoint(), log = %log_path.display(), "starting");
    let client: Arc<dyn AnswerService> = Arc::new(client);

    if let Some(question) = cli.ask {
        return ask_once(client.as_ref(), &question).await;
    }

    let theme = cli.theme.or(cfg.theme).unwrap_or_else(Theme::detect);
    let mut app = App::new(theme);

    install_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, client).await;

    restore_terminal()?;
    terminal.show_cursor()?;
    tracing::info!(messages = app.conversation.messages().len(), "exiting");

    result
}

async fn ask_once(service: &dyn AnswerService, question: &str) -> Result<()> {
    let mut conversation = Conversation::new();
    conversation.submit(service, question).await;

    for message in conversation.messages() {
        let who = if message.is_user { "👤" } else { "🤖" };
        println!("{} {}", who, message.text);
    }

    if let Some(error) = conversation.error() {
        anyhow::bail!("{}", error);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: Arc<dyn AnswerService>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Result<String, RequestFailed>>();

    loop {
        // Completions are applied here, on the UI task, in arrival order
        while let Ok(outcome) = rx.try_recv() {
            app.apply_outcome(outcome);
        }

        terminal.draw(|f| ui::render(f, app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        let key = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key,
            Event::Mouse(mouse) => {
                on_mouse(app, mouse.kind);
                continue;
            }
            _ => continue,
        };

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                app.should_quit = true;
            }
            KeyCode::Char('t') if ctrl => {
                app.toggle_theme();
            }
            KeyCode::Char(c) if !ctrl => {
                app.push_char(c);
            }
            KeyCode::Backspace => {
                app.pop_char();
            }
            KeyCode::Esc => {
                app.clear_input();
            }
            KeyCode::Enter => {
                if let Some(question) = app.submit_input() {
                    tracing::info!(chars = question.chars().count(), "question submitted");
                    let client = client.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let outcome = client.ask(&question).await;
                        let _ = tx.send(outcome);
                    });
                }
            }
            KeyCode::Up => app.scroll_up(1),
            KeyCode::Down => app.scroll_down(1),
            KeyCode::PageUp => app.scroll_up(PAGE),
            KeyCode::PageDown => app.scroll_down(PAGE),
            KeyCode::End => app.scroll_to_bottom(),
            _ => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn on_mouse(app: &mut App, kind: MouseEventKind) {
    match kind {
        MouseEventKind::ScrollUp => app.scroll_up(WHEEL_STEP),
        MouseEventKind::ScrollDown => app.scroll_down(WHEEL_STEP),
        _ => {}
    }
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

/// Put the terminal back before the default hook prints the panic.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl AnswerService for Unreachable {
        async fn ask(&self, _question: &str) -> Result<String, RequestFailed> {
            Err(RequestFailed::new("connection refused"))
        }
    }

    struct Echo;

    #[async_trait]
    impl AnswerService for Echo {
        async fn ask(&self, question: &str) -> Result<String, RequestFailed> {
            Ok(question.to_uppercase())
        }
    }

    #[tokio::test]
    async fn test_ask_once_failure_is_returned_as_error() {
        let err = ask_once(&Unreachable, "Hello").await.unwrap_err();
        assert_eq!(err.to_string(), conversation::ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_ask_once_success_and_blank() {
        assert!(ask_once(&Echo, "Hello").await.is_ok());
        assert!(ask_once(&Unreachable, "   ").await.is_ok());
    }

    #[test]
    fn test_mouse_wheel_scrolls_conversation() {
        let mut app = App::new(Theme::Dark);
        app.sync_scroll(20);

        on_mouse(&mut app, MouseEventKind::ScrollUp);
        assert_eq!(app.scroll_offset, 20 - WHEEL_STEP);
        assert!(!app.follow_bottom);

        on_mouse(&mut app, MouseEventKind::Moved);
        assert_eq!(app.scroll_offset, 20 - WHEEL_STEP);

        on_mouse(&mut app, MouseEventKind::ScrollDown);
        assert_eq!(app.scroll_offset, 20);
        assert!(app.follow_bottom);
    }
}
