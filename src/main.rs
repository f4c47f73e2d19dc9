use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use skywatch_core::{App, ConfigError};
use skywatch_ui::DashboardController;
use skywatch_weather::UnitSystem;

/// Longest we wait for location plus both weather requests
const REQUEST_WAIT: Duration = Duration::from_secs(30);

const HELP: &str = "\
Commands:
  search <city>    show weather for a city
  here             show weather for the device location
  fav              save the current city as a favorite
  unfav <name>     remove a favorite
  open <n|name>    show weather for a favorite
  unit             switch between metric and imperial
  dark             switch between dark and light theme
  show             redraw the dashboard
  help             show this help
  quit             exit";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, env = "SKYWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Show info-level logs on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Never use ANSI colors
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive dashboard (default)
    Interactive,
    /// Show weather for a city
    Search {
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },
    /// Show weather for the device location
    Here,
    /// List or edit favorite cities
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesAction>,
    },
    /// Set the unit system
    Unit { unit: UnitSystem },
    /// Turn the dark theme on or off
    Dark { state: Switch },
}

#[derive(Subcommand)]
enum FavoritesAction {
    List,
    Add {
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },
    Remove {
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

/// One line typed at the interactive prompt
#[derive(Debug, PartialEq)]
enum Command {
    Search(String),
    Here,
    Save,
    Remove(String),
    Open(String),
    Unit,
    Dark,
    Show,
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim().to_string();

    let command = match word.to_lowercase().as_str() {
        "search" | "s" => Command::Search(rest),
        "here" => Command::Here,
        "fav" | "save" => Command::Save,
        "unfav" | "remove" => Command::Remove(rest),
        "open" | "o" => Command::Open(rest),
        "unit" | "units" => Command::Unit,
        "dark" | "theme" => Command::Dark,
        "show" | "refresh" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => Command::Unknown(word.to_string()),
    };
    Some(command)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    skywatch_core::init_with_default_filter(if cli.verbose { "info" } else { "warn" })?;

    let mut app = match App::new(cli.config.as_deref()) {
        Ok(app) => app,
        Err(e) => {
            if let Some(config_error) = e.downcast_ref::<ConfigError>() {
                tracing::error!("{}", config_error.user_message());
            }
            return Err(e);
        }
    };
    let mut controller = DashboardController::from_config(app.config())?;
    let color = !cli.no_color && std::io::stdout().is_terminal();

    tracing::info!("Skywatch started");

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => run_interactive(&mut controller, color)?,
        Commands::Search { city } => {
            let city = city.join(" ");
            if !controller.search(&city) {
                anyhow::bail!("City name must not be blank");
            }
            finish(&mut controller)?;
            print_dashboard(&controller, color)?;
        }
        Commands::Here => {
            controller.locate_device();
            finish(&mut controller)?;
            if controller.weather().current().is_none()
                && controller.weather().error_message().is_none()
            {
                println!("Device location unavailable. Set [location] in the config file.");
            } else {
                print_dashboard(&controller, color)?;
            }
        }
        Commands::Favorites { action } => match action.unwrap_or(FavoritesAction::List) {
            FavoritesAction::List => {
                if controller.preferences().favorites().is_empty() {
                    println!("No favorites yet");
                }
                for (i, name) in controller.preferences().favorites().iter().enumerate() {
                    println!("{}. {}", i + 1, name);
                }
            }
            FavoritesAction::Add { city } => {
                let city = city.join(" ");
                if controller.add_favorite(&city) {
                    println!("Added {}", city);
                } else {
                    println!("{} is already a favorite", city);
                }
            }
            FavoritesAction::Remove { city } => {
                let city = city.join(" ");
                if controller.remove_favorite(&city) {
                    println!("Removed {}", city);
                } else {
                    println!("{} is not a favorite", city);
                }
            }
        },
        Commands::Unit { unit } => {
            controller.set_unit(unit);
            println!("Units set to {}", unit);
        }
        Commands::Dark { state } => {
            let on = matches!(state, Switch::On);
            controller.set_dark_mode(on);
            println!("Dark mode {}", if on { "on" } else { "off" });
        }
    }

    controller.shutdown();
    app.shutdown()?;
    Ok(())
}

fn finish(controller: &mut DashboardController) -> Result<()> {
    if !controller.wait_idle(REQUEST_WAIT) {
        anyhow::bail!("Timed out waiting for the weather service");
    }
    Ok(())
}

fn print_dashboard(controller: &DashboardController, color: bool) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{}", controller.render(color)).context("Failed to write dashboard")?;
    stdout.flush().context("Failed to flush stdout")
}

fn prompt() -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "> ").context("Failed to write prompt")?;
    stdout.flush().context("Failed to flush stdout")
}

fn run_interactive(controller: &mut DashboardController, color: bool) -> Result<()> {
    controller.locate_device();
    if !controller.wait_idle(REQUEST_WAIT) {
        tracing::warn!("Startup location lookup still pending");
    }
    print_dashboard(controller, color)?;
    println!("Type 'help' for commands.");
    prompt()?;

    for line in std::io::stdin().lock().lines() {
        let line = line.context("Failed to read command")?;
        let Some(command) = parse_command(&line) else {
            prompt()?;
            continue;
        };

        let redraw = match command {
            Command::Quit => break,
            Command::Search(city) => {
                if !controller.search(&city) {
                    println!("Usage: search <city>");
                }
                true
            }
            Command::Here => {
                controller.locate_device();
                true
            }
            Command::Save => {
                match controller.save_favorite() {
                    Some(name) => println!("Saved {}", name),
                    None => println!("Search for a city first"),
                }
                false
            }
            Command::Remove(name) => {
                let removed = controller.remove_favorite(&name);
                if !removed {
                    println!("{} is not a favorite", name);
                }
                removed
            }
            Command::Open(selector) => {
                if !controller.open_favorite(&selector) {
                    println!("No such favorite: {}", selector);
                }
                true
            }
            Command::Unit => {
                controller.toggle_unit();
                true
            }
            Command::Dark => {
                controller.toggle_dark_mode();
                true
            }
            Command::Show => true,
            Command::Help => {
                println!("{}", HELP);
                false
            }
            Command::Unknown(word) => {
                println!("Unknown command '{}'. Type 'help' for commands.", word);
                false
            }
        };

        if redraw {
            if !controller.wait_idle(REQUEST_WAIT) {
                println!("Still loading...");
            }
            print_dashboard(controller, color)?;
        }
        prompt()?;
    }

    Ok(())
}
