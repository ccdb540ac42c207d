//! IPC collaborator (spec §6): a Unix domain socket accepting
//! line-delimited `event-name:arg1:arg2:…` messages, each forwarded as
//! `Command::ExternalEvent`. Not part of the core's public contract —
//! this module exists so "accepts ExternalEvent injections" has a
//! concrete producer to exercise end-to-end.

use std::fs;
use std::io::{BufRead, BufReader};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::thread;

use tracing::{debug, error, info, warn};

use crate::channel::HostHandle;

/// Spawn the listener thread. Removes a stale socket file left behind by
/// a previous crashed run before binding, treating leftover state from an
/// unclean shutdown as recoverable rather than fatal.
pub fn spawn(socket_path: &Path, handle: HostHandle) -> std::io::Result<thread::JoinHandle<()>> {
    if socket_path.exists() {
        fs::remove_file(socket_path)?;
    }
    let listener = UnixListener::bind(socket_path)?;
    info!(path = %socket_path.display(), "IPC listener bound");

    Ok(thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let handle = handle.clone();
                    thread::spawn(move || handle_connection(stream, handle));
                }
                Err(e) => error!(error = %e, "IPC listener accept failed"),
            }
        }
    }))
}

fn handle_connection(stream: UnixStream, handle: HostHandle) {
    let reader = BufReader::new(stream);
    for line in reader.lines() {
        let Ok(line) = line else {
            warn!("IPC connection read error, dropping connection");
            return;
        };
        let Some((name, payload)) = parse_event_line(&line) else {
            warn!(line, "malformed IPC line, expected event-name:arg1:arg2:...");
            continue;
        };
        debug!(name, payload, "forwarding external event");
        if let Err(e) = handle.external_event(name, payload) {
            error!(error = %e, "failed to forward external event");
        }
    }
}

fn parse_event_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match line.split_once(':') {
        Some((name, payload)) if !name.is_empty() => Some((name, payload)),
        _ => None,
    }
}
