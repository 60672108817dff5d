//=========================================================================
// Asset Server
//=========================================================================
//
// Resolves asset names to byte buffers on a dedicated thread.
//
// Architecture:
//   AssetClient::read(name)
//        │  LoadRequest { name, respond }
//        ▼
//   [asset thread] ── fs::read(root / name) ──> respond.send(result)
//        │
//   caller blocks on its private response channel
//
// The thread exits once every client has been dropped.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::io;
use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::{debug, warn};

//=== AssetError ==========================================================

/// Asset loading failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// No file with that name below the asset root.
    NotFound(String),

    /// The file exists but could not be read.
    Io { name: String, message: String },

    /// The file is not valid UTF-8 text.
    InvalidUtf8(String),

    /// The asset thread is gone.
    ServerGone,
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "Asset not found: {}", name),
            Self::Io { name, message } => write!(f, "Failed to read asset {}: {}", name, message),
            Self::InvalidUtf8(name) => write!(f, "Asset is not valid UTF-8: {}", name),
            Self::ServerGone => write!(f, "Asset server is not running"),
        }
    }
}

impl std::error::Error for AssetError {}

//=== LoadRequest =========================================================

/// One pending read, answered exactly once on `respond`.
struct LoadRequest {
    name: String,
    respond: Sender<Result<Vec<u8>, AssetError>>,
}

//=== AssetClient =========================================================

/// Cloneable handle used to request assets.
#[derive(Debug, Clone)]
pub struct AssetClient {
    requests: Sender<LoadRequest>,
}

impl AssetClient {
    /// Reads an asset, blocking until the server answers.
    pub fn read(&self, name: &str) -> Result<Vec<u8>, AssetError> {
        let (respond, response) = bounded(1);

        self.requests
            .send(LoadRequest { name: name.to_owned(), respond })
            .map_err(|_| AssetError::ServerGone)?;

        response.recv().map_err(|_| AssetError::ServerGone)?
    }

    /// Reads an asset as UTF-8 text.
    pub fn read_to_string(&self, name: &str) -> Result<String, AssetError> {
        let bytes = self.read(name)?;
        String::from_utf8(bytes).map_err(|_| AssetError::InvalidUtf8(name.to_owned()))
    }
}

//=== AssetServer =========================================================

/// Spawns the asset thread serving files below `root`.
pub fn spawn_asset_server(root: impl Into<PathBuf>) -> io::Result<(AssetClient, thread::JoinHandle<()>)> {
    let root = root.into();
    let (tx, rx) = unbounded::<LoadRequest>();

    let handle = thread::Builder::new()
        .name("boxfall-assets".into())
        .spawn(move || serve(&root, rx))?;

    Ok((AssetClient { requests: tx }, handle))
}

fn serve(root: &Path, requests: Receiver<LoadRequest>) {
    debug!(target: "assets", "Asset server started (root: {})", root.display());

    for request in requests {
        let result = load(root, &request.name);
        if let Err(e) = &result {
            warn!(target: "assets", "{}", e);
        }
        // The requester may have given up; nothing to do then
        let _ = request.respond.send(result);
    }

    debug!(target: "assets", "Asset server stopped");
}

fn load(root: &Path, name: &str) -> Result<Vec<u8>, AssetError> {
    let path = root.join(name);
    std::fs::read(&path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => AssetError::NotFound(name.to_owned()),
        _ => AssetError::Io {
            name: name.to_owned(),
            message: e.to_string(),
        },
    })
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_root(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("boxfall-assets-{}-{}", tag, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn reads_existing_asset() {
        let root = temp_root("read");
        fs::write(root.join("hello.txt"), b"hi there").unwrap();

        let (client, _handle) = spawn_asset_server(&root).unwrap();
        assert_eq!(client.read("hello.txt").unwrap(), b"hi there");
        assert_eq!(client.read_to_string("hello.txt").unwrap(), "hi there");

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn missing_asset_is_not_found() {
        let root = temp_root("missing");
        let (client, _handle) = spawn_asset_server(&root).unwrap();

        assert_eq!(
            client.read("nope.pcm"),
            Err(AssetError::NotFound("nope.pcm".into()))
        );

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let root = temp_root("utf8");
        fs::write(root.join("bin.dat"), [0xff, 0xfe, 0x00]).unwrap();

        let (client, _handle) = spawn_asset_server(&root).unwrap();
        assert_eq!(
            client.read_to_string("bin.dat"),
            Err(AssetError::InvalidUtf8("bin.dat".into()))
        );

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn server_exits_when_clients_dropped() {
        let root = temp_root("exit");
        let (client, handle) = spawn_asset_server(&root).unwrap();
        let clone = client.clone();

        drop(client);
        drop(clone);

        handle.join().expect("Asset thread should exit cleanly");
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn clients_work_from_other_threads() {
        let root = temp_root("threads");
        fs::write(root.join("a.bin"), [1, 2, 3]).unwrap();
        let (client, _handle) = spawn_asset_server(&root).unwrap();

        let worker = {
            let client = client.clone();
            thread::spawn(move || client.read("a.bin"))
        };

        assert_eq!(worker.join().unwrap().unwrap(), vec![1, 2, 3]);
        fs::remove_dir_all(root).ok();
    }
}
