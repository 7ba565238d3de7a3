use clap::Parser;
use crossterm::{
    event::{ Event, EventStream, KeyEventKind },
    execute,
    terminal::{ EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode },
};
use dost_ai::cli::ChatArgs;
use dost_ai::client::app::{ App, OutcomeReceiver };
use dost_ai::client::clipboard::Osc52Clipboard;
use dost_ai::client::handlers::handle_key_event;
use dost_ai::client::relay::HttpRelay;
use dost_ai::client::ui::ui;
use futures::StreamExt;
use log::info;
use ratatui::{ Terminal, backend::CrosstermBackend };
use std::error::Error;
use std::fs::File;
use std::io;
use std::sync::Arc;
use std::time::{ Duration, Instant };

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let args = ChatArgs::parse();
    init_logging(&args)?;

    let relay = HttpRelay::from_build_config()?;
    info!("Relay endpoint: {}", relay.endpoint());
    let (mut app, outcomes) = App::new(Arc::new(relay), Box::new(Osc52Clipboard::stdout()));

    // Setup terminal for TUI
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, outcomes).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn init_logging(args: &ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match &args.log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    mut outcomes: OutcomeReceiver,
) -> io::Result<()> {
    let mut events = EventStream::new();
    // Drives the typing animation and expires copy indicators.
    let mut tick = tokio::time::interval(Duration::from_millis(250));

    loop {
        terminal.draw(|f| ui(f, app))?;

        tokio::select! {
            Some(outcome) = outcomes.recv() => {
                app.apply_outcome(outcome);
            }
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        handle_key_event(app, key.code, key.modifiers);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e),
                    None => break,
                }
            }
            _ = tick.tick() => {
                app.on_tick(Instant::now());
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
