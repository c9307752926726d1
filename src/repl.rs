//! Line-oriented front-end over the chat session and the items API.
//!
//! Bare text is sent as a chat message; everything else is a slash command.

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::ApiClient;
use crate::protocol::ServerEvent;
use crate::session::Session;
use crate::transport::TransportEvent;
use crate::types::{Item, ItemCreate};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Connect,
    Disconnect,
    Join(String),
    Leave,
    Say(String),
    Items,
    Item(i64),
    Add(ItemCreate),
    Update(i64, ItemCreate),
    Delete(i64),
    Stats,
    Health,
    Status,
    Help,
    Quit,
}

/// Parse one input line. `Ok(None)` for blank lines, `Err` carries a usage
/// message for the user.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if !line.starts_with('/') {
        return Ok(Some(Command::Say(line.to_string())));
    }

    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    let parsed = match command {
        "/connect" => Command::Connect,
        "/disconnect" => Command::Disconnect,
        "/join" => match args.first() {
            Some(room) => Command::Join((*room).to_string()),
            None => return Err("usage: /join <room>".to_string()),
        },
        "/leave" => Command::Leave,
        "/items" => Command::Items,
        "/item" => Command::Item(parse_id(&args)?),
        "/add" => Command::Add(parse_item(&args)?),
        "/update" => {
            let id = parse_id(&args)?;
            Command::Update(id, parse_item(&args[1..])?)
        }
        "/delete" => Command::Delete(parse_id(&args)?),
        "/stats" => Command::Stats,
        "/health" => Command::Health,
        "/status" => Command::Status,
        "/help" => Command::Help,
        "/quit" => Command::Quit,
        other => return Err(format!("Unknown command: {}", other)),
    };

    Ok(Some(parsed))
}

fn parse_id(args: &[&str]) -> Result<i64, String> {
    args.first()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| "expected a numeric item id".to_string())
}

fn parse_item(args: &[&str]) -> Result<ItemCreate, String> {
    let name = args
        .first()
        .ok_or_else(|| "usage: <name> <price> [description]".to_string())?;
    let price: f64 = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| "expected a numeric price".to_string())?;
    let description = (args.len() > 2).then(|| args[2..].join(" "));

    Ok(ItemCreate {
        name: (*name).to_string(),
        description,
        price,
    })
}

/// Drive the session and API from stdin until `/quit` or EOF.
pub async fn run(mut session: Session, api: ApiClient) {
    println!("parlor ready, /help for commands");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            event = session.next_event() => {
                print_event(&event);
                session.apply(event).await;
            }

            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        let command = match parse(&line) {
                            Ok(Some(command)) => command,
                            Ok(None) => continue,
                            Err(usage) => {
                                println!("{}", usage);
                                continue;
                            }
                        };
                        if matches!(command, Command::Quit) {
                            break;
                        }
                        dispatch(command, &mut session, &api).await;
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Failed to read input: {}", e);
                        break;
                    }
                }
            }
        }
    }

    session.disconnect();
}

async fn dispatch(command: Command, session: &mut Session, api: &ApiClient) {
    match command {
        Command::Connect => session.connect().await,
        Command::Disconnect => session.disconnect(),
        Command::Join(room) => session.join_room(&room),
        Command::Leave => session.leave_room(),
        Command::Say(text) => session.send_message(&text),

        Command::Items => match api.list_items().await {
            Ok(items) => {
                if items.is_empty() {
                    println!("No items yet");
                }
                for item in &items {
                    print_item(item);
                }
            }
            Err(e) => banner("Failed to load items", e),
        },
        Command::Item(id) => match api.get_item(id).await {
            Ok(item) => print_item(&item),
            Err(e) => banner("Failed to load item", e),
        },
        Command::Add(item) => match api.create_item(&item).await {
            Ok(created) => print_item(&created),
            Err(e) => banner("Failed to create item", e),
        },
        Command::Update(id, item) => match api.update_item(id, &item).await {
            Ok(updated) => print_item(&updated),
            Err(e) => banner("Failed to update item", e),
        },
        Command::Delete(id) => match api.delete_item(id).await {
            Ok(()) => println!("Deleted item {}", id),
            Err(e) => banner("Failed to delete item", e),
        },
        Command::Stats => match api.stats().await {
            Ok(stats) => {
                println!(
                    "{} items, total {:.2}, average {:.2}",
                    stats.total_items, stats.total_value, stats.average_price
                );
            }
            Err(e) => banner("Failed to load stats", e),
        },
        Command::Health => match api.health().await {
            Ok(health) => println!("{} ({})", health.status, health.timestamp),
            Err(e) => banner("Backend unreachable", e),
        },

        Command::Status => {
            let room = session.current_room().unwrap_or("-");
            println!("{:?}, room: {}", session.state(), room);
        }
        Command::Help => print_help(),
        Command::Quit => unreachable!("handled by the loop"),
    }
}

fn print_event(event: &TransportEvent) {
    let now = chrono::Local::now().format("%H:%M:%S");
    match event {
        TransportEvent::Opened => println!("[{}] connected", now),
        TransportEvent::ConnectError(reason) => println!("[{}] connection error: {}", now, reason),
        TransportEvent::Closed => println!("[{}] disconnected", now),
        TransportEvent::Server(ServerEvent::Message { data }) => println!("[{}] {}", now, data),
        TransportEvent::Server(ServerEvent::RoomMessage { data }) => {
            println!("[{}] [room] {}", now, data)
        }
        TransportEvent::Server(ServerEvent::RoomNotification { data }) => {
            println!("[{}] * {}", now, data)
        }
    }
}

fn print_item(item: &Item) {
    let id = item
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let description = item.description.as_deref().unwrap_or("");
    println!("#{} {} ({:.2}) {}", id, item.name, item.price, description);
}

fn banner(message: &str, error: crate::api::ApiError) {
    println!("{}", message);
    tracing::debug!("{}: {}", message, error);
}

fn print_help() {
    println!("chat:  /connect /disconnect /join <room> /leave");
    println!("       bare text sends a message (to the room if one is joined)");
    println!("items: /items /item <id> /add <name> <price> [description]");
    println!("       /update <id> <name> <price> [description] /delete <id>");
    println!("misc:  /stats /health /status /help /quit");
}
