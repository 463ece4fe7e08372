//! Stronghold - Entry Point
//!
//! Interactive text front end. Sets up logging, builds the kingdom from an
//! optional config file and seed, then runs the numbered menu until the
//! player exits or the kingdom falls.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use stronghold::core::clock::{SessionClock, SimulatedDelay};
use stronghold::core::config::KingdomConfig;
use stronghold::core::error::{KingdomError, Result};
use stronghold::kingdom::leader::{King, Leader, LeaderStats};
use stronghold::kingdom::resource::ResourceKind;
use stronghold::kingdom::systems::{Estate, UnitType};
use stronghold::kingdom::Kingdom;

/// Stronghold - rule your medieval kingdom one year at a time
#[derive(Parser, Debug)]
#[command(name = "stronghold")]
#[command(about = "Turn-based medieval kingdom management")]
struct Args {
    /// Random seed for a reproducible game
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file overriding the starting kingdom
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save file to resume from
    #[arg(long)]
    load: Option<PathBuf>,

    /// Skip the pauses after drills and training
    #[arg(long, default_value_t = false)]
    no_pacing: bool,

    /// Log filter directive
    #[arg(long, default_value = "stronghold=info")]
    log: String,
}

/// Line-oriented terminal I/O with reprompting input validation
struct Console {
    lines: io::Lines<io::StdinLock<'static>>,
    pacing: bool,
}

impl Console {
    fn new(pacing: bool) -> Self {
        Self {
            lines: io::stdin().lock().lines(),
            pacing,
        }
    }

    /// Next input line; a closed stdin ends the session
    fn prompt(&mut self, text: &str) -> Result<String> {
        print!("{}", text);
        io::stdout().flush()?;
        match self.lines.next() {
            Some(line) => Ok(line?.trim().to_string()),
            None => Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
        }
    }

    fn read_int(&mut self, text: &str, min: i64, max: i64) -> Result<i64> {
        loop {
            let input = self.prompt(text)?;
            match input.parse::<i64>() {
                Ok(value) if (min..=max).contains(&value) => return Ok(value),
                _ => println!("Invalid input! Must be between {} and {}.", min, max),
            }
        }
    }

    fn read_rate(&mut self, text: &str, min: f64, max: f64) -> Result<f64> {
        loop {
            let input = self.prompt(text)?;
            match input.parse::<f64>() {
                Ok(value) if (min..=max).contains(&value) => return Ok(value),
                _ => println!("Invalid input! Must be between {} and {}.", min, max),
            }
        }
    }

    fn read_resource(&mut self) -> Result<ResourceKind> {
        loop {
            let input = self.prompt("Enter resource type (Food/Wood/Stone/Iron): ")?;
            match input.parse::<ResourceKind>() {
                Ok(kind) if kind.is_tradeable() => return Ok(kind),
                Ok(kind) => println!("{} cannot be traded on the market.", kind),
                Err(e) => println!("{}", e),
            }
        }
    }

    fn read_name(&mut self, text: &str, fallback: &str) -> Result<String> {
        let input = self.prompt(text)?;
        Ok(if input.is_empty() { fallback.to_string() } else { input })
    }

    fn pause(&mut self) -> Result<()> {
        self.prompt("\nPress Enter to continue...")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
        Ok(())
    }

    /// Print the delay's label followed by one dot per step
    fn pace(&self, delay: SimulatedDelay) -> Result<()> {
        print!("{}", delay.label);
        io::stdout().flush()?;
        for _ in 0..delay.steps {
            if self.pacing {
                std::thread::sleep(delay.step);
            }
            print!(".");
            io::stdout().flush()?;
        }
        println!();
        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&args.log))
        .init();

    let config = match &args.config {
        Some(path) => KingdomConfig::load(path)?,
        None => KingdomConfig::default(),
    };
    let rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut console = Console::new(!args.no_pacing);

    println!("Welcome to Stronghold: Rule Your Medieval Kingdom!");
    let kingdom_name = match console.read_name("Enter your kingdom's name: ", "Default Kingdom") {
        Ok(name) => name,
        Err(KingdomError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
        Err(e) => return Err(e),
    };
    let king_name = console.read_name("Enter your king's name: ", "King Ali")?;

    let mut kingdom = Kingdom::with_config(kingdom_name, &config, rng, SessionClock::wall());
    kingdom.set_ruler(Leader::King(King::new(LeaderStats::new(king_name, 70, 60, 50), 80)));
    tracing::info!(kingdom = %kingdom.name(), seed = ?args.seed, "session started");

    if let Some(path) = &args.load {
        match kingdom.load(path) {
            Ok(()) => println!("Game loaded from {}", path.display()),
            Err(e) => println!("Error: could not load {}: {}", path.display(), e),
        }
    }

    match run(&mut console, &mut kingdom) {
        Ok(()) => {}
        Err(KingdomError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {}
        Err(e) => return Err(e),
    }

    if kingdom.is_game_over() {
        println!("\n===== GAME OVER =====");
        println!("Your kingdom has fallen!");
        println!("Final Score: {}", kingdom.score());
        println!("Years Ruled: {}", kingdom.year() - 1);
    } else {
        println!("\nThank you for playing Stronghold!");
    }
    Ok(())
}

fn run(console: &mut Console, kingdom: &mut Kingdom) -> Result<()> {
    while !kingdom.is_game_over() {
        console.clear()?;
        print_main_menu();
        let choice = console.read_int("Enter choice: ", 1, 13)?;

        match choice {
            1 => {
                advance_year(kingdom);
                console.pause()?;
            }
            2 => {
                println!("\n{}", kingdom.status_report());
                console.pause()?;
            }
            3 => resource_menu(console, kingdom)?,
            4 => army_menu(console, kingdom)?,
            5 => economy_menu(console, kingdom)?,
            6 => diplomacy_menu(console, kingdom)?,
            7 => bank_menu(console, kingdom)?,
            8 => {
                let ruler = kingdom.hold_elections();
                println!("Elections held! {} now rules the kingdom.", ruler);
                console.pause()?;
            }
            9 => {
                let action = kingdom.perform_ruler_action();
                if let Some(delay) = action.delay {
                    console.pace(delay)?;
                }
                println!("{}", action.outcome);
                console.pause()?;
            }
            10 => {
                let outcome = kingdom.trigger_random_event();
                println!("EVENT ({}): {}", outcome.kind(), outcome);
                console.pause()?;
            }
            11 => {
                let filename = console.prompt("Enter save file name (e.g., savegame.txt): ")?;
                if filename.is_empty() {
                    println!("Error: Filename cannot be empty!");
                } else {
                    match kingdom.save(&filename) {
                        Ok(()) => println!("Game saved to {}", filename),
                        Err(e) => println!("Error: could not save game: {}", e),
                    }
                }
                console.pause()?;
            }
            12 => {
                let filename = console.prompt("Enter load file name (e.g., savegame.txt): ")?;
                if filename.is_empty() {
                    println!("Error: Filename cannot be empty!");
                } else {
                    match kingdom.load(&filename) {
                        Ok(()) => println!("Game loaded from {}", filename),
                        Err(e) => println!("Error: could not load game: {}", e),
                    }
                }
                console.pause()?;
            }
            _ => {
                println!("Exiting game...");
                return Ok(());
            }
        }
    }
    Ok(())
}

fn print_main_menu() {
    println!("===== Stronghold: Kingdom Management =====");
    println!("1. Advance Year");
    println!("2. Display Status");
    println!("3. Manage Resources");
    println!("4. Manage Army");
    println!("5. Manage Economy");
    println!("6. Manage Diplomacy");
    println!("7. Manage Bank");
    println!("8. Hold Elections");
    println!("9. Perform Ruler Action");
    println!("10. Trigger Random Event");
    println!("11. Save Game");
    println!("12. Load Game");
    println!("13. Exit");
}

fn advance_year(kingdom: &mut Kingdom) {
    let report = kingdom.advance_year();

    println!("\n===== Year {} =====", report.year);
    for entry in &report.entries {
        println!("  {}", entry.entry);
    }
    println!(
        "Upkeep paid: {} gold (army {}, bureaucracy {})",
        report.upkeep.total(),
        report.upkeep.army,
        report.upkeep.bureaucracy
    );
    println!("Score: {}", report.score);
}

fn resource_menu(console: &mut Console, kingdom: &mut Kingdom) -> Result<()> {
    loop {
        println!("\n===== Resource Management =====");
        println!("1. Buy Resources");
        println!("2. Sell Resources");
        println!("3. View Market");
        println!("4. Back");

        match console.read_int("Enter choice: ", 1, 4)? {
            1 => {
                let kind = console.read_resource()?;
                let amount = console.read_int("Enter amount to buy: ", 1, 1000)? as u32;
                match kingdom.buy_resource(kind, amount) {
                    Ok(cost) => println!("Purchased {} {} for {} gold!", amount, kind, cost),
                    Err(e) => println!("Failed to buy! {}", e),
                }
            }
            2 => {
                let kind = console.read_resource()?;
                let amount = console.read_int("Enter amount to sell: ", 1, 1000)? as u32;
                match kingdom.sell_resource(kind, amount) {
                    Ok(income) => println!("Sold {} {} for {} gold!", amount, kind, income),
                    Err(e) => println!("Failed to sell! {}", e),
                }
            }
            3 => println!("\n{}", kingdom.status_report()),
            _ => return Ok(()),
        }
    }
}

fn army_menu(console: &mut Console, kingdom: &mut Kingdom) -> Result<()> {
    loop {
        println!("\n===== Army Management =====");
        println!("1. Train Army");
        println!("2. Recruit Infantry");
        println!("3. Recruit Cavalry");
        println!("4. Recruit Archers");
        println!("5. Back");

        let unit = match console.read_int("Enter choice: ", 1, 5)? {
            1 => {
                let delay = kingdom.train_army();
                console.pace(delay)?;
                println!(
                    "Training complete! Training level: {}",
                    kingdom.army().training_level()
                );
                continue;
            }
            2 => UnitType::Infantry,
            3 => UnitType::Cavalry,
            4 => UnitType::Archers,
            _ => return Ok(()),
        };

        let text = format!("Enter number of {:?} to recruit: ", unit).to_lowercase();
        let count = console.read_int(&text, 1, i64::from(unit.max_batch()))? as u32;
        match kingdom.recruit(unit, count) {
            Ok(cost) => println!("Recruited {} {:?} for {} gold!", count, unit, cost),
            Err(e) => println!("Failed to recruit! {}", e),
        }
    }
}

fn economy_menu(console: &mut Console, kingdom: &mut Kingdom) -> Result<()> {
    loop {
        println!("\n===== Economy Management =====");
        println!("1. Adjust Peasant Tax Rate");
        println!("2. Adjust Merchant Tax Rate");
        println!("3. Adjust Noble Tax Rate");
        println!("4. Back");

        let (estate, label) = match console.read_int("Enter choice: ", 1, 4)? {
            1 => (Estate::Peasants, "peasant"),
            2 => (Estate::Merchants, "merchant"),
            3 => (Estate::Nobles, "noble"),
            _ => return Ok(()),
        };

        let text = format!("Enter new {} tax rate (0.0-0.5): ", label);
        let rate = console.read_rate(&text, 0.0, 0.5)?;
        match kingdom.set_tax_rate(estate, rate) {
            Ok(()) => println!("{}{} tax rate set to {}!", label[..1].to_uppercase(), &label[1..], rate),
            Err(e) => println!("{}", e),
        }
    }
}

fn diplomacy_menu(console: &mut Console, kingdom: &mut Kingdom) -> Result<()> {
    loop {
        println!("\n===== Diplomacy Management =====");
        println!("1. List Foreign Kingdoms");
        println!("2. Improve Relations");
        println!("3. Declare War");
        println!("4. Sign Peace Treaty");
        println!("5. Form Alliance");
        println!("6. Establish Trade");
        println!("7. Engage in Battle");
        println!("8. Back");

        let choice = console.read_int("Enter choice: ", 1, 8)?;
        if choice == 8 {
            return Ok(());
        }

        println!("\n{}", kingdom.roster_report());
        if choice == 1 {
            console.pause()?;
            continue;
        }

        let name = console.prompt("Enter kingdom name: ")?;
        let message = match choice {
            2 => kingdom
                .improve_relations(&name)
                .map(|cost| format!("Relations with {} improved for {} gold!", name, cost)),
            3 => kingdom
                .declare_war(&name)
                .map(|()| format!("War declared on {}!", name)),
            4 => kingdom
                .sign_peace(&name)
                .map(|cost| format!("Peace signed with {} for {} gold!", name, cost)),
            5 => kingdom
                .form_alliance(&name)
                .map(|()| format!("Alliance formed with {}!", name)),
            6 => kingdom.establish_trade(&name).map(|deal| {
                format!(
                    "Trade established with {}! Received {} food, {} wood, {} iron and {} gold.",
                    name, deal.food, deal.wood, deal.iron, deal.gold
                )
            }),
            _ => kingdom.battle(&name).map(|report| match report.losses {
                None => format!(
                    "Victory! Your forces ({}) crush {} ({})!",
                    report.our_strength, name, report.their_strength
                ),
                Some(losses) => format!(
                    "Defeat! Your army loses {} soldiers against {}.",
                    losses.total(),
                    name
                ),
            }),
        };

        match message {
            Ok(text) => println!("{}", text),
            Err(e) => println!("Failed! {}", e),
        }
        console.pause()?;
    }
}

fn bank_menu(console: &mut Console, kingdom: &mut Kingdom) -> Result<()> {
    loop {
        println!("\n===== Bank Management =====");
        println!("1. Take Loan");
        println!("2. Repay Loan");
        println!("3. View Bank Status");
        println!("4. Back");

        match console.read_int("Enter choice: ", 1, 4)? {
            1 => {
                let max = kingdom.bank().max_loan_amount();
                let amount = console.read_int("Enter loan amount: ", 1, max)?;
                match kingdom.take_loan(amount) {
                    Ok(()) => println!("Loan of {} gold taken!", amount),
                    Err(e) => println!("Failed to take loan! {}", e),
                }
            }
            2 => {
                let debt = kingdom.economy().debt();
                if debt <= 0 {
                    println!("You have no debt to repay.");
                    continue;
                }
                let amount = console.read_int("Enter amount to repay: ", 1, debt)?;
                match kingdom.repay_loan(amount) {
                    Ok(()) => println!("Repaid {} gold of loan!", amount),
                    Err(e) => println!("Failed to repay loan! {}", e),
                }
            }
            3 => println!("\n{}", kingdom.bank_report()),
            _ => return Ok(()),
        }
    }
}
