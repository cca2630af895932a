/// MeshEdit Terminal - interactive mesh editor in the terminal
///
/// Usage: meshedit-terminal [config.json]
///
/// Controls:
///   - Mouse: click to pick, move to drive the active transform, release to commit
///   - Tab: toggle Object / Edit mode
///   - G / S / R: grab, scale, rotate   X / Y / Z: lock axis
///   - E / F / M: extrude, fill, merge
///   - 1-6: preset views   Scroll: zoom   P: perspective / orthographic
///   - Shift+Tab: toggle smooth shading
///   - Q/ESC: Quit
///
/// Logs go to `meshedit-terminal.log`; set `RUST_LOG` to change the filter.
use std::fs::File;
use std::io;
use std::sync::Mutex;

use meshedit_core::{EditorConfig, Light, Mesh, Scene};
use meshedit_terminal::TerminalApp;
use nalgebra::Point3;
use tracing::info;

const LOG_FILE: &str = "meshedit-terminal.log";

fn main() -> io::Result<()> {
    // The terminal is owned by the renderer, so logs go to a file
    let log_file = File::create(LOG_FILE)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meshedit_core=info,meshedit_terminal=info".into()),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            let config = EditorConfig::from_json(&json)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
            info!(path, "loaded editor config");
            config
        }
        None => EditorConfig::default(),
    };

    let mut scene = Scene::new();
    scene.add(Mesh::cube(2.0));
    scene.add(Light::new("Light", Point3::new(2.5, 2.0, 1.5)));

    let mut app = TerminalApp::new(scene, config)?;
    app.run()?;

    println!("Thank you for using MeshEdit!");
    Ok(())
}
