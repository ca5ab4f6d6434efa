//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire a `TableRuntime` end to end and run the reference scenario.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `tabletop_cli [config.json]`. Without an argument the default
//! `RuntimeConfig` is used and file logging stays off.

use log::error;
use std::env;
use std::fs;
use std::process::ExitCode;
use tabletop_core::{
    init_logging, AppearancePatch, ObjectPatch, RuntimeConfig, Shape, TableRuntime,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("tabletop_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> Result<RuntimeConfig, Box<dyn std::error::Error>> {
    match env::args().nth(1) {
        Some(path) => Ok(RuntimeConfig::from_json_str(&fs::read_to_string(path)?)?),
        None => Ok(RuntimeConfig::default()),
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir)?;
    }
    let runtime = TableRuntime::new(&config)?;
    runtime.start();
    println!("tabletop_core version={}", tabletop_core::core_version());

    let service = runtime.service();
    service.create_object(
        Shape::Rectangle,
        &ObjectPatch::new()
            .position(50.0, 50.0)
            .size(100.0, 75.0)
            .appearance(AppearancePatch {
                background_color: Some("#FFC0CB".to_string()),
                ..AppearancePatch::default()
            }),
    )?;
    service.create_object(
        Shape::Circle,
        &ObjectPatch::new()
            .position(200.0, 100.0)
            .size(60.0, 60.0)
            .rotation(30.0),
    )?;
    println!(
        "objects={} canvas_objects={} redraws={}",
        service.object_count(),
        runtime.canvas().render_list().len(),
        runtime.canvas().redraw_requests()
    );

    service.clear_all_objects();
    println!(
        "after_clear objects={} canvas_objects={}",
        service.get_all_objects().len(),
        runtime.canvas().render_list().len()
    );

    let probe = service.create_object(Shape::Rectangle, &ObjectPatch::new())?;
    let shrink = ObjectPatch {
        width: Some(-5.0),
        ..ObjectPatch::default()
    };
    let clamped = service.update_object(probe.id, &shrink)?;
    println!("clamped_width={}", clamped.width);
    Ok(())
}
