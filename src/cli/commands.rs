use clap::{Parser, Subcommand};
use rusqlite::Connection;
use crate::config::Config;
use crate::db::DbConnection;
use crate::models::{NewOrder, StageTable};
use crate::store::{LoadOutcome, OrderStore};
use crate::tracking::Ticker;
use crate::utils::SystemClock;
use crate::cli::error::{user_error, validate_amount, validate_order_id, parse_product_spec};
use crate::cli::output::{
    format_order_detail, format_order_list_table, format_stage_table, get_terminal_width, is_tty,
    ANSI_CLEAR_SCREEN, EMPTY_STATE_MESSAGE,
};
use std::io::{Read, Write};
use std::ops::ControlFlow;
use anyhow::{Context, Result};

#[derive(Parser)]
#[command(name = "shiptrack")]
#[command(about = "Shipment tracker - simulated order delivery stages with a live progress chart")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Place a new order
    Add {
        /// Product as "Title=Price" or "Title=Price=ImageUrl" (repeatable)
        #[arg(short = 'p', long = "product", required = true)]
        products: Vec<String>,
        /// Order ID (generated when omitted)
        #[arg(long)]
        id: Option<String>,
        /// Order total (defaults to the sum of product prices)
        #[arg(long)]
        total: Option<f64>,
    },
    /// Add orders from a JSON file ("-" reads stdin)
    Import {
        /// Path to a JSON array of orders (or a single order object)
        file: String,
    },
    /// List orders, newest first
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show the stage timeline and progress chart of an order
    Show {
        /// Order ID
        id: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Follow an order's progress live until it is delivered
    Watch {
        /// Order ID
        id: String,
        /// Refresh interval in milliseconds (defaults to tick.interval_ms from rc)
        #[arg(long = "interval-ms")]
        interval_ms: Option<u64>,
        /// Render a single frame and exit
        #[arg(long)]
        once: bool,
    },
    /// Delete an order
    Delete {
        /// Order ID
        id: String,
    },
    /// Remove every order
    Reset {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Show the shipment stage table
    Stages,
}

/// Order store backed by the configured database and the wall clock
pub type CliStore = OrderStore<Connection, SystemClock>;

pub fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and succeed; usage errors are user errors
            let is_usage_error = e.use_stderr();
            e.print()?;
            if is_usage_error {
                std::process::exit(1);
            }
            return Ok(());
        }
    };

    handle_command(cli)
}

fn handle_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Add { products, id, total } => handle_add(products, id, total),
        Commands::Import { file } => handle_import(file),
        Commands::List { json } => handle_list(json),
        Commands::Show { id, json } => handle_show(id, json),
        Commands::Watch { id, interval_ms, once } => handle_watch(id, interval_ms, once),
        Commands::Delete { id } => handle_delete(id),
        Commands::Reset { yes } => handle_reset(yes),
        Commands::Stages => handle_stages(),
    }
}

/// Open the store and bring every order's status up to date
fn open_store() -> Result<CliStore> {
    let conn = DbConnection::connect()
        .context("Failed to connect to database")?;
    let (mut store, outcome) = OrderStore::open(conn, SystemClock, StageTable::default())
        .context("Failed to load orders")?;

    if let LoadOutcome::Recovered { error } = outcome {
        eprintln!("Warning: stored orders were unreadable and have been cleared ({})", error);
    }

    store.recompute_all();
    Ok(store)
}

fn require_order(store: &CliStore, id: &str) {
    if let Err(e) = validate_order_id(id) {
        user_error(&e);
    }
    if store.get(id).is_none() {
        user_error(&format!("Order {} not found", id));
    }
}

fn handle_add(product_specs: Vec<String>, id: Option<String>, total: Option<f64>) -> Result<()> {
    let mut products = Vec::new();
    for spec in &product_specs {
        match parse_product_spec(spec) {
            Ok(product) => products.push(product),
            Err(e) => user_error(&e),
        }
    }

    let mut new_order = NewOrder::new(products);
    if let Some(id) = id {
        if let Err(e) = validate_order_id(&id) {
            user_error(&e);
        }
        new_order.id = Some(id);
    }
    if let Some(total) = total {
        match validate_amount(total, "total") {
            Ok(total) => new_order.total = Some(total),
            Err(e) => user_error(&e),
        }
    }
    let requested_id = new_order.id.clone();

    let mut store = open_store()?;
    let added = store.add(vec![new_order]);

    match (added.first(), requested_id) {
        (Some(added_id), _) => println!("Created order {}", added_id),
        (None, Some(existing)) => println!("Order {} already exists", existing),
        (None, None) => println!("No order created"),
    }
    Ok(())
}

/// Parse import content: a JSON array of orders or a single order object
pub fn parse_import(content: &str) -> Result<Vec<NewOrder>> {
    let value: serde_json::Value = serde_json::from_str(content)
        .context("Invalid JSON")?;
    let orders = if value.is_array() {
        serde_json::from_value::<Vec<NewOrder>>(value)
    } else {
        serde_json::from_value::<NewOrder>(value).map(|order| vec![order])
    };
    orders.context("Invalid order record")
}

fn handle_import(file: String) -> Result<()> {
    let content = if file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        match std::fs::read_to_string(&file) {
            Ok(content) => content,
            Err(e) => user_error(&format!("Cannot read {}: {}", file, e)),
        }
    };

    let new_orders = match parse_import(&content) {
        Ok(orders) => orders,
        Err(e) => user_error(&format!("{:#}", e)),
    };
    for order in &new_orders {
        if let Some(total) = order.total {
            if let Err(e) = validate_amount(total, "total") {
                user_error(&e);
            }
        }
        for product in &order.products {
            if let Err(e) = validate_amount(product.price, "price") {
                user_error(&e);
            }
        }
    }

    let submitted = new_orders.len();
    let mut store = open_store()?;
    let added = store.add(new_orders);

    if added.is_empty() {
        println!("No new orders ({} submitted, all duplicates)", submitted);
    } else {
        println!("Added {} order(s)", added.len());
        for id in &added {
            println!("  {}", id);
        }
    }
    Ok(())
}

fn handle_list(json: bool) -> Result<()> {
    let store = open_store()?;

    if json {
        println!("{}", serde_json::to_string_pretty(store.orders())?);
        return Ok(());
    }

    println!("{}", format_order_list_table(store.orders(), is_tty()));
    if store.is_empty() {
        println!("Add one with: shiptrack add --product \"Title=Price\"");
    }
    Ok(())
}

fn handle_show(id: String, json: bool) -> Result<()> {
    let store = open_store()?;
    require_order(&store, &id);

    let order = store.get(&id).context("Order vanished")?;
    let snapshot = store.snapshot(&id).context("Order vanished")?;

    if json {
        let view = serde_json::json!({
            "order": order,
            "tracking": snapshot,
        });
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!(
            "{}",
            format_order_detail(order, store.stages(), &snapshot, get_terminal_width(), is_tty())
        );
    }
    Ok(())
}

fn handle_watch(id: String, interval_ms: Option<u64>, once: bool) -> Result<()> {
    let config = Config::load()?;
    let mut store = open_store()?;
    require_order(&store, &id);

    let interval_ms = match interval_ms {
        Some(0) => user_error("Interval must be greater than 0"),
        Some(ms) => ms,
        None => config.tick_interval_ms,
    };
    let tty = is_tty();
    let mut last_frame: Option<Vec<u8>> = None;

    Ticker::from_millis(interval_ms)
        .with_reload(true)
        .run(&mut store, |store, changes| {
            for change in changes.iter().filter(|c| c.order_id == id) {
                log::info!("Order {} moved from {} to {}", id, change.from, change.to);
            }

            let (Some(order), Some(snapshot)) = (store.get(&id), store.snapshot(&id)) else {
                println!("Order {} no longer exists", id);
                return Ok(ControlFlow::Break(()));
            };

            // Redraw only when the visible progress changes
            let frame = snapshot.rounded_progress();
            if last_frame.as_ref() != Some(&frame) {
                if tty {
                    print!("{}", ANSI_CLEAR_SCREEN);
                } else if last_frame.is_some() {
                    println!();
                }
                println!(
                    "{}",
                    format_order_detail(order, store.stages(), &snapshot, get_terminal_width(), tty)
                );
                std::io::stdout().flush()?;
                last_frame = Some(frame);
            }

            if once || snapshot.is_terminal() {
                Ok(ControlFlow::Break(()))
            } else {
                Ok(ControlFlow::Continue(()))
            }
        })?;
    Ok(())
}

fn handle_delete(id: String) -> Result<()> {
    let mut store = open_store()?;
    require_order(&store, &id);

    store.delete(&id);
    println!("Order deleted successfully");
    if store.is_empty() {
        println!("{}", EMPTY_STATE_MESSAGE);
    }
    Ok(())
}

fn handle_reset(yes: bool) -> Result<()> {
    let mut store = open_store()?;
    let count = store.len();

    if !yes {
        print!("Delete all {} order(s)? (y/n): ", count);
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();
        if input != "y" && input != "yes" {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.reset();
    println!("Removed {} order(s)", count);
    Ok(())
}

fn handle_stages() -> Result<()> {
    println!("{}", format_stage_table(&StageTable::default()));
    Ok(())
}
