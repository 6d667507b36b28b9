//! CLI command implementations.

use crate::config::{config_path, Config, WAYMARK_DIR};
use colored::Colorize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use waymark_core::{AnchorId, Translation};
use waymark_graph::{host_anchor, resolve_room, AnchorGraph, HostRequest, RoomCode, RoomStore};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Initialize Waymark in a directory.
pub fn init(path: &Path) -> Result<()> {
    let config_file = config_path(path);

    if config_file.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    fs::create_dir_all(path.join(WAYMARK_DIR))?;
    fs::write(&config_file, serde_json::to_string_pretty(&Config::default())?)?;

    println!("{} Initialized Waymark in {}", "✓".green(), path.display());
    println!("  Run {} to start a room", "waymark new-room".cyan());

    Ok(())
}

/// Opens the room store named by the config.
pub fn open_store(config: &Config) -> Result<RoomStore> {
    debug!("Opening room store at {}", config.store.display());
    Ok(RoomStore::open(&config.store)?)
}

fn open_room(store: &RoomStore, room: RoomCode) -> Result<AnchorGraph> {
    let entries = store.load_room(room)?;
    debug!("Room {} has {} published entries", room, entries.len());
    Ok(resolve_room(&entries)?)
}

fn anchor_name(graph: &AnchorGraph, id: AnchorId) -> String {
    graph
        .anchor(id)
        .map(|anchor| anchor.name.clone())
        .unwrap_or_else(|| format!("#{}", id))
}

fn require_name(graph: &AnchorGraph, name: &str) -> Result<AnchorId> {
    graph
        .id_for_name(name)
        .ok_or_else(|| format!("no anchor named \"{}\"", name).into())
}

/// Reserve a new room code.
pub fn new_room(store: &RoomStore) -> Result<()> {
    let room = store.new_room_code()?;
    info!("Reserved room code {}", room);

    println!("{} Room {} created", "✓".green(), room.to_string().cyan());
    Ok(())
}

/// Host a new anchor into a room.
pub fn host(
    store: &RoomStore,
    config: &Config,
    room: RoomCode,
    name: String,
    at: Translation,
    cloud_id: Option<String>,
    connect: Vec<String>,
) -> Result<()> {
    let mut graph = open_room(store, room)?;

    let request = HostRequest {
        name,
        translation: at,
        cloud_anchor_id: cloud_id,
        connect_to: connect,
    };
    let entry = host_anchor(store, room, &mut graph, request, config.weight)?;

    println!(
        "{} Hosted {} as anchor {} in room {}",
        "✓".green(),
        entry.display_name.cyan(),
        entry.index,
        room
    );
    for neighbor in graph.neighbors(entry.index)? {
        println!(
            "  {} {} {}",
            "↔".dimmed(),
            anchor_name(&graph, neighbor.id),
            format!("({})", neighbor.weight).dimmed()
        );
    }

    Ok(())
}

/// List the anchors of a room.
pub fn anchors(store: &RoomStore, room: RoomCode, json: bool) -> Result<()> {
    let graph = open_room(store, room)?;

    if json {
        let anchors: Vec<_> = graph
            .anchors()
            .map(|anchor| {
                serde_json::json!({
                    "id": anchor.id,
                    "name": anchor.name,
                    "cloudAnchorId": anchor.cloud_anchor_id,
                    "translation": anchor.translation,
                    "neighbors": graph.neighbors(anchor.id).unwrap_or_default(),
                })
            })
            .collect();
        let export = serde_json::json!({
            "room": room,
            "stats": graph.stats(),
            "anchors": anchors,
        });
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }

    if graph.is_empty() {
        println!("Room {} has no anchors", room);
        return Ok(());
    }

    println!(
        "Room {}: {} anchors, {} edges\n",
        room,
        graph.len(),
        graph.edge_count()
    );
    for anchor in graph.anchors() {
        println!(
            "  {} {} {}",
            anchor.id.to_string().yellow(),
            anchor.name.cyan(),
            format!("@ {}", anchor.translation).dimmed()
        );
        for neighbor in graph.neighbors(anchor.id).unwrap_or_default() {
            println!(
                "      ↔ {} {}",
                anchor_name(&graph, neighbor.id),
                format!("({})", neighbor.weight).dimmed()
            );
        }
    }

    Ok(())
}

/// Find the shortest route between two anchors.
pub fn route(
    store: &RoomStore,
    room: RoomCode,
    to: &str,
    from: Option<&str>,
    at: Option<Translation>,
    json: bool,
) -> Result<()> {
    let graph = open_room(store, room)?;

    let dest = require_name(&graph, to)?;
    let source = match (from, at) {
        (Some(name), _) => require_name(&graph, name)?,
        (None, Some(position)) => graph
            .nearest_anchor(&position)
            .ok_or_else(|| format!("room {} has no anchors", room))?,
        (None, None) => return Err("either --from or --at is required".into()),
    };

    let path = graph.find_path(source, dest)?;
    let cost = graph.path_cost(&path);

    if json {
        let names: Vec<_> = path.iter().map(|&id| anchor_name(&graph, id)).collect();
        let export = serde_json::json!({
            "from": source,
            "to": dest,
            "path": path,
            "names": names,
            "cost": cost,
        });
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }

    if path.is_empty() {
        println!(
            "{} No route from {} to {}",
            "⚠".yellow(),
            anchor_name(&graph, source).cyan(),
            to.cyan()
        );
        return Ok(());
    }

    let names: Vec<_> = path.iter().map(|&id| anchor_name(&graph, id)).collect();
    println!("{} {}", "✓".green(), names.join(" → ").cyan());
    if let Some(cost) = cost {
        println!(
            "  {} hops, cost {}",
            path.len() - 1,
            cost.to_string().yellow()
        );
    }

    Ok(())
}

/// Show the anchor nearest to a position.
pub fn nearest(store: &RoomStore, room: RoomCode, at: Translation) -> Result<()> {
    let graph = open_room(store, room)?;

    match graph.nearest_anchor(&at) {
        Some(id) => {
            let distance = graph
                .anchor(id)
                .map(|anchor| anchor.translation.distance(&at))
                .unwrap_or_default();
            println!(
                "{} {} {}",
                id.to_string().yellow(),
                anchor_name(&graph, id).cyan(),
                format!("({} away)", distance).dimmed()
            );
        }
        None => println!("Room {} has no anchors", room),
    }

    Ok(())
}

/// Print the room's wire blobs.
pub fn export(store: &RoomStore, room: RoomCode) -> Result<()> {
    let graph = open_room(store, room)?;

    println!("{}", graph.serialize_adjacency()?);
    println!("{}", graph.serialize_transformations()?);
    Ok(())
}

/// Delete every anchor of a room.
pub fn clear(store: &RoomStore, room: RoomCode) -> Result<()> {
    store.clear_room(room)?;
    info!("Cleared room {}", room);

    println!("{} Cleared room {}", "✓".green(), room);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> Config {
        Config {
            store: dir.join("rooms"),
            ..Config::default()
        }
    }

    #[test]
    fn test_init_writes_config() {
        let dir = tempdir().unwrap();
        init(dir.path()).unwrap();

        let loaded = crate::config::load_from(dir.path()).unwrap();
        assert_eq!(loaded, Config::default());
        // Second run is a no-op.
        init(dir.path()).unwrap();
    }

    #[test]
    fn test_host_and_route() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let store = open_store(&config).unwrap();
        let room = store.new_room_code().unwrap();

        host(&store, &config, room, "Lobby".into(), Translation::ZERO, None, vec![]).unwrap();
        host(
            &store,
            &config,
            room,
            "Office".into(),
            Translation::new(2.0, 0.0, 0.0),
            Some("ua-office".into()),
            vec!["Lobby".into()],
        )
        .unwrap();

        route(&store, room, "Office", Some("Lobby"), None, false).unwrap();
        route(&store, room, "Office", None, Some(Translation::ZERO), true).unwrap();
        assert!(route(&store, room, "Office", None, None, false).is_err());
        assert!(route(&store, room, "Nowhere", Some("Lobby"), None, false).is_err());

        let graph = open_room(&store, room).unwrap();
        assert_eq!(graph.find_path(0, 1).unwrap(), vec![0, 1]);

        anchors(&store, room, true).unwrap();
        clear(&store, room).unwrap();
        assert!(open_room(&store, room).unwrap().is_empty());
    }
}
