//! FoodKeeper CLI - keep track of what's in the fridge before it expires.
//!
//! Usage: `foodkeeper <command> [args]`. Run without arguments for help.

use std::io;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use foodkeeper_core::auth::SocialProvider;
use foodkeeper_core::models::{ExpiryStatus, FoodItem, NewFoodItem, EXPIRING_SOON_DAYS};
use foodkeeper_core::{ApiClient, ApiError, Config, Credentials, SessionEvent, SessionEvents};

// ============================================================================
// Constants
// ============================================================================

const USAGE: &str = "\
Usage: foodkeeper <command>

Commands:
  status                          Show login and onboarding state
  login <provider> <token>        Sign in with a kakao/google/apple access token
  import-tokens <access> <refresh>
                                  Store an existing token pair
  foods                           List tracked items, most urgent first
  expiring [days]                 List items expiring within N days
  add <name> <YYYY-MM-DD>         Track a new item
  remove <id>                     Stop tracking an item
  recipes                         Suggest recipes for items expiring soon
  onboarded                       Mark onboarding as completed
  logout                          Sign out and forget stored tokens";

/// Printed once when the session ended during a command
const SESSION_ENDED_NOTICE: &str =
    "Your session has ended. Run `foodkeeper login` to sign in again.";

/// Log file name prefix inside the cache directory
const LOG_FILE_PREFIX: &str = "foodkeeper.log";

/// Initialize the tracing subscriber for logging.
/// Logs go to stderr and to a daily file under the cache directory.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match config.cache_dir() {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir.join("logs"), LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load()?;
    let log_guard = init_tracing(&config);
    info!(api = %config.api_base_url, "FoodKeeper CLI starting");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    let store = config.open_token_store()?;
    let events = SessionEvents::new();
    let mut session_rx = events.subscribe();
    let client = ApiClient::from_config(&config, store, events)?;

    let result = run(&client, command, &args[1..]).await;

    let session_ended = drain_session_events(&mut session_rx);
    if session_ended {
        warn!("Session expired");
        eprintln!("{}", SESSION_ENDED_NOTICE);
    }

    if let Err(e) = result {
        match e.downcast_ref::<ApiError>() {
            Some(api_error) if api_error.is_session_expired() && session_ended => {}
            Some(api_error) => eprintln!("{}", api_error.user_message()),
            None => eprintln!("Error: {:#}", e),
        }
        // exit() skips destructors; flush buffered log lines first
        drop(log_guard);
        std::process::exit(1);
    }
    Ok(())
}

/// Whether the session ended while the command ran. Consumes every
/// pending event so the notice is shown at most once.
fn drain_session_events(rx: &mut broadcast::Receiver<SessionEvent>) -> bool {
    let mut ended = false;
    loop {
        match rx.try_recv() {
            Ok(SessionEvent::Expired) | Err(TryRecvError::Lagged(_)) => ended = true,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return ended,
        }
    }
}

async fn run(client: &ApiClient, command: &str, args: &[String]) -> Result<()> {
    let today = Local::now().date_naive();

    match command {
        "status" => {
            let store = client.store();
            match (store.is_logged_in()?, store.user_id()?) {
                (true, Some(id)) => println!("Signed in as user {}", id),
                (true, None) => println!("Signed in"),
                (false, _) => println!("Not signed in"),
            }
            println!(
                "Onboarding: {}",
                if store.onboarding_completed()? { "done" } else { "pending" }
            );
        }
        "login" => {
            let provider = parse_provider(arg(args, 0, "provider")?)?;
            let login = client
                .login_with_provider(provider, arg(args, 1, "token")?)
                .await?;
            println!("Signed in with {} as user {}", provider, login.user_id);
            if login.is_new_user || !client.store().onboarding_completed()? {
                println!("Welcome! Run `foodkeeper onboarded` once you're set up.");
            }
        }
        "import-tokens" => {
            let credentials = Credentials::new(
                arg(args, 0, "access token")?,
                arg(args, 1, "refresh token")?,
            );
            client.store().save_credentials(&credentials)?;
            println!("Tokens saved");
        }
        "foods" => {
            let foods = client.fetch_foods().await?;
            print_foods(&foods, today);
        }
        "expiring" => {
            let days = match args.first() {
                Some(raw) => raw
                    .parse::<u32>()
                    .with_context(|| format!("Invalid number of days: {}", raw))?,
                None => EXPIRING_SOON_DAYS as u32,
            };
            let foods = client.fetch_expiring_foods(days).await?;
            print_foods(&foods, today);
        }
        "add" => {
            let name = arg(args, 0, "name")?;
            let raw_date = arg(args, 1, "expiry date")?;
            let expiry = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
                .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {}", raw_date))?;
            client.add_food(&NewFoodItem::new(name, expiry)).await?;
            println!("Added {} (expires {})", name, expiry);
        }
        "remove" => {
            let raw_id = arg(args, 0, "id")?;
            let id: i64 = raw_id
                .parse()
                .with_context(|| format!("Invalid id: {}", raw_id))?;
            client.delete_food(id).await?;
            println!("Removed item {}", id);
        }
        "recipes" => {
            let expiring = client.fetch_expiring_foods(EXPIRING_SOON_DAYS as u32).await?;
            if expiring.is_empty() {
                println!("Nothing is about to expire.");
                return Ok(());
            }
            let ids: Vec<i64> = expiring.iter().map(|f| f.id).collect();
            let recipes = client.suggest_recipes(&ids).await?;
            for recipe in recipes {
                println!("{} ({})", recipe.title, recipe.cooking_time_display());
                if !recipe.ingredients.is_empty() {
                    println!("  Ingredients: {}", recipe.ingredients.join(", "));
                }
                for (i, step) in recipe.steps.iter().enumerate() {
                    println!("  {}. {}", i + 1, step);
                }
            }
        }
        "onboarded" => {
            client.store().set_onboarding_completed(true)?;
            println!("Onboarding completed");
        }
        "logout" => {
            client.logout().await?;
            println!("Signed out");
        }
        other => anyhow::bail!("Unknown command: {}\n\n{}", other, USAGE),
    }
    Ok(())
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("Missing argument: <{}>\n\n{}", name, USAGE))
}

fn parse_provider(raw: &str) -> Result<SocialProvider> {
    match raw.to_ascii_lowercase().as_str() {
        "kakao" => Ok(SocialProvider::Kakao),
        "google" => Ok(SocialProvider::Google),
        "apple" => Ok(SocialProvider::Apple),
        other => Err(anyhow::anyhow!("Unknown provider: {}", other)),
    }
}

fn print_foods(foods: &[FoodItem], today: NaiveDate) {
    if foods.is_empty() {
        println!("No items tracked.");
        return;
    }
    for food in foods {
        let marker = match food.expiry_status(today) {
            ExpiryStatus::Expired => "!!",
            ExpiryStatus::ExpiresToday | ExpiryStatus::ExpiringSoon => " !",
            ExpiryStatus::Fresh => "  ",
        };
        println!(
            "{} {:>5}  {:<24} {:>6}  {}",
            marker,
            food.id,
            food.name,
            food.d_day_label(today),
            food.expiry_date
        );
    }
}
