//! Shared fixtures for CLI tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use pricecast_server::{AppState, CsvHistorySource};
use tempfile::TempDir;

pub const COMPILED_CSV: &str = "category,date,value,pct_change
labor,2024-01-01,100.0,
labor,2024-02-01,101.0,1.0
labor,2024-03-01,103.0,2.0
labor,2024-04-01,106.1,3.0
labor,2024-05-01,110.3,4.0
capital,2024-02-01,50.0,0.5
capital,2024-03-01,50.2,0.5
capital,2024-04-01,50.5,0.5
capital,2024-05-01,50.7,0.5
materials,2024-02-01,80.0,2.0
materials,2024-03-01,80.8,1.0
materials,2024-04-01,80.8,0.0
materials,2024-05-01,80.0,-1.0
energy,2024-02-01,90.0,3.0
energy,2024-03-01,92.7,3.0
energy,2024-04-01,95.5,3.0
energy,2024-05-01,98.3,3.0
";

/// Writes the compiled CSV fixture into a fresh temp dir.
pub fn compiled_csv() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("compiled_percentage_changes.csv");
    std::fs::write(&path, COMPILED_CSV).unwrap();
    (dir, path)
}

/// Starts the API on an ephemeral port in a background thread.
pub fn spawn_server(csv: &Path) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    listener.set_nonblocking(true).unwrap();
    let state = AppState::new(CsvHistorySource::new(csv));

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            pricecast_server::serve(listener, state, true).await.unwrap();
        });
    });
    addr
}
