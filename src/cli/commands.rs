//! Subcommand handlers.

use super::args::ConfigAction;
use super::enums::{ScrollArg, SkipKind};
use action_recorder::config::{default_path, Config, DEFAULT_CONFIG};
use action_recorder::event::EventKind;
use action_recorder::replay::ReplayOptions;
use action_recorder::store::RecordingStore;
use action_recorder::Recorder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Build a recorder from config, applying CLI overrides.
pub fn build_recorder(
    config: &Config,
    dir: Option<PathBuf>,
    no_keyboard: bool,
    max_events: Option<usize>,
    scroll: Option<ScrollArg>,
) -> Result<Recorder, String> {
    let mut settings = config.capture_settings().map_err(|e| e.to_string())?;
    if no_keyboard {
        settings.record_keyboard = false;
    }
    if let Some(max) = max_events {
        if max == 0 {
            return Err("--max-events must be greater than 0".to_string());
        }
        settings.max_events = max;
    }
    if let Some(scroll) = scroll {
        settings.scroll_mode = scroll.into();
    }

    let hotkey = config.cancel_hotkey().map_err(|e| e.to_string())?;
    let store = dir
        .or_else(|| config.recordings_dir().map(Path::to_path_buf))
        .map(RecordingStore::new)
        .unwrap_or_else(RecordingStore::with_default_dir);

    Ok(Recorder::new(settings, hotkey, store))
}

/// Record until the stop key or Ctrl+C, then save.
pub fn run_record(recorder: Arc<Recorder>, stop_key: &str, pause_key: &str) -> Result<(), String> {
    let handler_recorder = recorder.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nReceived Ctrl+C, stopping recording...");
        handler_recorder.request_stop();
    })
    .map_err(|e| format!("Failed to set Ctrl+C handler: {}", e))?;

    recorder.start().map_err(|e| e.to_string())?;
    println!(
        "Recording... press '{}' to stop, '{}' to pause/resume.",
        stop_key, pause_key
    );

    let mut was_paused = false;
    while recorder.status().recording {
        let paused = recorder.status().paused;
        if paused != was_paused {
            println!("{}", if paused { "Paused." } else { "Resumed." });
            was_paused = paused;
        }
        thread::sleep(Duration::from_millis(100));
    }

    match recorder.stop().map_err(|e| e.to_string())? {
        Some(id) => println!("Saved recording: {}", id),
        None => println!("No events recorded, nothing saved."),
    }
    Ok(())
}

/// Print recordings with a short summary of each.
pub fn run_list(recorder: &Recorder) -> Result<(), String> {
    let ids = recorder.list().map_err(|e| e.to_string())?;
    if ids.is_empty() {
        println!("No recordings found in {}", recorder.store().dir().display());
        return Ok(());
    }

    println!("Recordings (newest first):");
    for id in ids {
        match recorder.store().load(&id) {
            Ok(rec) => {
                let meta = rec.metadata();
                println!(
                    "  {:<20} {:>6} mouse  {:>6} keyboard  {:>8.2}s",
                    id, meta.total_mouse_events, meta.total_keyboard_events, meta.total_recording_time
                );
            }
            Err(e) => println!("  {:<20} (unreadable: {})", id, e),
        }
    }
    Ok(())
}

pub fn run_replay(
    recorder: Arc<Recorder>,
    id: &str,
    precision: bool,
    loops: u32,
    skip: Vec<SkipKind>,
) -> Result<(), String> {
    let options = ReplayOptions::default()
        .with_precision(precision)
        .with_loops(loops)
        .skipping(skip.into_iter().map(EventKind::from));
    options.validate().map_err(|e| e.to_string())?;

    let handler_recorder = recorder.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nReceived Ctrl+C, stopping replay...");
        handler_recorder.cancel_replay();
    })
    .map_err(|e| format!("Failed to set Ctrl+C handler: {}", e))?;

    let outcome = recorder.replay(id, &options).map_err(|e| e.to_string())?;
    if outcome.is_cancelled() {
        println!(
            "Replay stopped by user after {} of {} passes.",
            outcome.loops_completed, loops
        );
    } else {
        println!("Replay completed successfully.");
    }
    if outcome.events_failed > 0 {
        println!("{} events could not be replayed (see log).", outcome.events_failed);
    }
    Ok(())
}

pub fn run_delete(recorder: &Recorder, ids: &[String]) -> Result<(), String> {
    let mut missing = Vec::new();
    for id in ids {
        if recorder.delete(id).map_err(|e| e.to_string())? {
            println!("Deleted {}", id);
        } else {
            missing.push(id.as_str());
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("Recording not found: {}", missing.join(", ")))
    }
}

pub fn run_export(recorder: &Recorder, ids: &[String], output: Option<&Path>) -> Result<(), String> {
    let document = recorder.export(ids).map_err(|e| e.to_string())?;
    match output {
        Some(path) => {
            std::fs::write(path, document)
                .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
            println!("Exported to {}", path.display());
        }
        None => println!("{}", document),
    }
    Ok(())
}

pub fn run_import(recorder: &Recorder, file: &Path) -> Result<(), String> {
    let document = std::fs::read_to_string(file)
        .map_err(|e| format!("Failed to read '{}': {}", file.display(), e))?;
    let ids = recorder.import(&document).map_err(|e| e.to_string())?;
    println!("Imported {} recordings:", ids.len());
    for id in ids {
        println!("  {}", id);
    }
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, config: &Config, path: Option<&Path>) -> Result<(), String> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_path);
    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            println!();
            let rendered = config
                .to_toml()
                .map_err(|e| format!("Failed to render config: {}", e))?;
            println!("{}", rendered);

            let recordings = config
                .recordings_dir()
                .map(Path::to_path_buf)
                .unwrap_or_else(action_recorder::store::default_dir);
            println!("Recordings: {}", recordings.display());
            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            if config_path.exists() {
                return Err(format!(
                    "Config file already exists: {}\nUse 'action-recorder config show' to view current settings.",
                    config_path.display()
                ));
            }

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Error creating config directory: {}", e))?;
            }
            std::fs::write(&config_path, DEFAULT_CONFIG)
                .map_err(|e| format!("Error writing config file: {}", e))?;

            println!("Created config file: {}", config_path.display());
            Ok(())
        }
    }
}
