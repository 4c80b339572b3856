//! Cipher Quest: Field Operations Against ENIGMA
//!
//! A cryptography puzzle game for the terminal. Decode intercepted
//! transmissions, unlock the next mission, climb the leaderboard.

use anyhow::Context;
use cipher_quest::cipher::{Direction, Transform};
use cipher_quest::config::{init_logging, Cli, Command, Config, TransformArgs};
use cipher_quest::game::device::{FixedLocation, ManualQrScanner};
use cipher_quest::game::qr::{mission_payload, qr_missions, render_mission_qr, render_qr};
use cipher_quest::game::{time_ago, Catalog, Confirmation, Game, Ledger, Position};
use cipher_quest::store::{
    leaderboard_or_fallback, load_agent, JsonFileStore, LeaderboardStore, MemoryLeaderboard,
    SqliteLeaderboard, AGENT_KEY,
};
use cipher_quest::tui::App;
use cipher_quest::{AgentRank, VERSION};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, stdout, BufRead, Write};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_cli(&cli);

    if let Err(e) = init_logging(&config) {
        eprintln!("warning: logging disabled: {:#}", e);
    }
    tracing::info!(version = VERSION, data_dir = %config.data_dir.display(), "Starting Cipher Quest");

    match cli.command.unwrap_or(Command::Play { name: None }) {
        Command::Play { name } => play(&config, cli.location, name.as_deref()),
        Command::Missions => list_missions(&config),
        Command::Encode(args) => run_transform(&args, Direction::Encode),
        Command::Decode(args) => run_transform(&args, Direction::Decode),
        Command::Leaderboard => show_leaderboard(&config),
        Command::Log => mission_log(&config),
        Command::Qr { text, mission } => qr(&config, text.as_deref(), mission),
        Command::Reset { yes } => reset(&config, yes),
    }
}

fn load_catalog(config: &Config) -> anyhow::Result<Catalog> {
    let catalog = match &config.catalog {
        Some(path) => Catalog::from_path(path)
            .with_context(|| format!("loading catalog {}", path.display()))?,
        None => Catalog::embedded().context("loading bundled missions")?,
    };
    tracing::info!(missions = catalog.len(), "Catalog loaded");
    Ok(catalog)
}

fn load_ledger(config: &Config, catalog: &Catalog) -> Ledger {
    Ledger::load(Box::new(JsonFileStore::new(config.progress_path())), catalog.len())
}

/// The SQLite board, or an offline stand-in that always falls back
fn open_leaderboard(config: &Config) -> Box<dyn LeaderboardStore> {
    match SqliteLeaderboard::open(&config.leaderboard_path()) {
        Ok(board) => Box::new(board),
        Err(e) => {
            tracing::error!("Leaderboard unavailable: {}", e);
            Box::new(MemoryLeaderboard {
                unavailable: true,
                ..Default::default()
            })
        }
    }
}

fn play(config: &Config, location: Option<Position>, name: Option<&str>) -> anyhow::Result<()> {
    let catalog = load_catalog(config)?;
    let ledger = load_ledger(config, &catalog);
    let mut agent_store = JsonFileStore::with_key(config.progress_path(), AGENT_KEY);
    let player = load_agent(&mut agent_store, name);

    let qr_feed = ManualQrScanner::new();
    let game = Game::new(
        catalog,
        ledger,
        Box::new(FixedLocation::new(location)),
        Box::new(qr_feed.clone()),
        open_leaderboard(config),
        player,
    );
    let mut app = App::new(game, qr_feed);

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result?;

    let ledger = app.game.ledger();
    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  Thanks for playing Cipher Quest!                      ║");
    println!(
        "║  {:<54}║",
        format!("Missions completed: {}/{}", ledger.completed_count(), app.game.catalog().len())
    );
    println!("║  {:<54}║", format!("Rank: {}", app.game.rank()));
    println!("║                                                        ║");
    println!("║  Stay sharp, agent.                                    ║");
    println!("╚════════════════════════════════════════════════════════╝\n");

    tracing::info!("Session ended");
    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    while app.running {
        terminal.draw(|frame| app.render(frame))?;
        if !app.handle_input()? {
            break;
        }
    }
    Ok(())
}

fn list_missions(config: &Config) -> anyhow::Result<()> {
    let catalog = load_catalog(config)?;
    let ledger = load_ledger(config, &catalog);

    for summary in catalog.summaries(ledger.progress()) {
        let mark = if summary.is_completed {
            "✔"
        } else if summary.is_locked {
            "🔒"
        } else {
            "▶"
        };
        println!(
            "{} {:02}  {:<40} {:<7} {}",
            mark,
            summary.id,
            summary.name,
            summary.difficulty.to_string(),
            summary.crypto_type
        );
    }
    println!(
        "\n{}/{} completed, {} hints used",
        ledger.completed_count(),
        catalog.len(),
        ledger.progress().total_hints()
    );
    Ok(())
}

fn run_transform(args: &TransformArgs, direction: Direction) -> anyhow::Result<()> {
    let transform = Transform::parse(&args.transform, args.key.as_deref())?;
    let output = transform
        .apply(&args.text, direction)
        .with_context(|| format!("{} {}", direction.to_string().to_lowercase(), transform))?;
    println!("{}", output);
    Ok(())
}

fn show_leaderboard(config: &Config) -> anyhow::Result<()> {
    let board = open_leaderboard(config);
    let entries = leaderboard_or_fallback(board.as_ref());

    println!("{:<5} {:<20} {:>8} {:>10}  {}", "#", "AGENT", "MISSIONS", "TIME", "RANK");
    for (i, entry) in entries.iter().enumerate() {
        println!(
            "{:<5} {:<20} {:>8} {:>10}  {}",
            i + 1,
            entry.name,
            entry.completed_levels,
            entry.total_time,
            entry.rank
        );
    }

    let catalog = load_catalog(config)?;
    let ledger = load_ledger(config, &catalog);
    let rank = AgentRank::for_completed(ledger.completed_count());
    println!("\nYou: {} {} ({} missions)", rank.icon(), rank, ledger.completed_count());
    Ok(())
}

fn mission_log(config: &Config) -> anyhow::Result<()> {
    let catalog = load_catalog(config)?;
    let ledger = load_ledger(config, &catalog);
    let entries = ledger.mission_log(&catalog);

    if entries.is_empty() {
        println!("No completed missions yet.");
        return Ok(());
    }

    let now = chrono::Utc::now();
    for entry in &entries {
        let when = match entry.completed_at {
            Some(at) => format!("{} ({})", at.format("%Y-%m-%d %H:%M"), time_ago(at, now)),
            None => "date unknown".to_string(),
        };
        let hints = match entry.hints_used {
            0 => "no hints".to_string(),
            1 => "1 hint".to_string(),
            n => format!("{} hints", n),
        };
        println!("{:02}  {:<40} {:<22} {}", entry.id, entry.title, entry.crypto_type, hints);
        println!("    {}", when);
    }
    println!("
{} missions in the log", entries.len());
    Ok(())
}

fn qr(config: &Config, text: Option<&str>, mission: Option<u32>) -> anyhow::Result<()> {
    let (image, value) = match (text, mission) {
        (Some(text), _) => (render_qr(text)?, text.to_string()),
        (None, Some(id)) => {
            let catalog = load_catalog(config)?;
            let mission = catalog
                .get(id)
                .with_context(|| format!("no mission {}", id))?;
            let image = render_mission_qr(mission)?;
            (image, mission_payload(mission).unwrap_or_default().to_string())
        }
        (None, None) => {
            let catalog = load_catalog(config)?;
            println!("Missions with a QR code:");
            for mission in qr_missions(&catalog) {
                println!(
                    "  {:02}  {:<40} {}",
                    mission.id,
                    mission.title,
                    mission_payload(mission).unwrap_or_default()
                );
            }
            println!("
Use `cipher-quest qr --mission N` to print one.");
            return Ok(());
        }
    };
    println!("{}", image);
    println!("Value: {}", value);
    Ok(())
}

fn reset(config: &Config, yes: bool) -> anyhow::Result<()> {
    let catalog = load_catalog(config)?;
    let mut ledger = load_ledger(config, &catalog);

    let confirmation = if yes { Confirmation::Confirmed } else { prompt_confirmation()? };
    if ledger.reset(confirmation) {
        if ledger.last_save_failed() {
            anyhow::bail!("progress was reset in memory but could not be saved");
        }
        println!("All progress has been reset.");
    } else {
        println!("Reset cancelled.");
    }
    Ok(())
}

fn prompt_confirmation() -> anyhow::Result<Confirmation> {
    print!("Are you sure you want to reset all your progress? This cannot be undone. [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(match line.trim().to_lowercase().as_str() {
        "y" | "yes" => Confirmation::Confirmed,
        _ => Confirmation::Declined,
    })
}
