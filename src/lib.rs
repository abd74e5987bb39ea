pub mod autosave;
pub mod background;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod export;
pub mod geometry;
pub mod history;
pub mod input;
pub mod logging;
pub mod selection;
pub mod storage;
pub mod transform;
pub mod viewport;
pub use error::{AppError, AppResult};

use editor::{DetachedSurface, EditorSession};
use storage::FileStore;

/// Opens a headless session against the configured autosave and reports what it would restore.
pub fn run() -> AppResult<()> {
    logging::init();
    tracing::info!("starting textplate");

    let config = config::load_editor_config();
    let store = match &config.autosave_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(storage::StorageError::from)?;
            FileStore::with_root(dir.clone())
        }
        None => FileStore::with_default_root()?,
    };
    tracing::debug!(
        root = %store.root().display(),
        key = %config.autosave_key,
        "autosave store ready"
    );

    let mut session = EditorSession::with_config(DetachedSurface, store, &config);
    let Some(report) = session.restore_autosave() else {
        println!("no autosave found");
        return Ok(());
    };

    let viewport = session.viewport();
    println!(
        "autosave: {} layer(s), stage {}x{} at {:.2}x",
        report.layers,
        viewport.stage_size.width,
        viewport.stage_size.height,
        viewport.stage_scale
    );
    for row in session.layer_rows() {
        println!("  {}. {} ({})", row.index, row.label, row.subtitle);
    }
    if report.needs_background() {
        println!("background image must be re-supplied");
    }
    session.close();
    Ok(())
}
