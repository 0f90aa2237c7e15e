//! =============================================================================
//! Pixel Magnifier - Démonstration
//! Pixel Magnifier - Demo
//! =============================================================================
//!
//! Pilote une session de loupe sans interface : capture une source, rejoue
//! des déplacements du pointeur puis affiche la couleur sélectionnée.
//!
//! Drives one magnifier session headlessly: captures a source, replays
//! pointer moves, then prints the selected color.
//!
//! # Arguments
//! - `--config <fichier.json>`: réglages de la loupe / magnifier settings
//! - `--drag <dx,dy>`: translation depuis l'appui (répétable) / translation since press (repeatable)
//! - `--cancel`: annule au lieu de valider / cancel instead of completing
//! - `--screen`: capture l'écran principal (macOS, Windows) / capture the main screen

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use pixel_magnifier::{
    ActiveRegion, Color, DrawSource, MagnifierConfig, PixelMagnifier, Point, Rect,
    SurfaceProvider,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Pas d'horloge simulé pour les transitions / Simulated clock step for transitions
const FRAME: Duration = Duration::from_millis(16);

// =============================================================================
// ARGUMENTS
// =============================================================================

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    drags: Vec<Point>,
    cancel: bool,
    screen: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--drag" => {
                let value = iter.next().ok_or("--drag needs dx,dy")?;
                args.drags.push(parse_point(&value)?);
            }
            "--cancel" => args.cancel = true,
            "--screen" => args.screen = true,
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(args)
}

fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected dx,dy, got {value}"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("{value}: {e}"))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("{value}: {e}"))?;
    Ok(Point::new(x, y))
}

// =============================================================================
// SOURCES
// =============================================================================

/// Mire synthétique : dégradé rouge / vert avec un carré bleu au centre
/// Synthetic test card: red / green gradient with a blue square in the middle
fn test_card() -> Box<dyn SurfaceProvider> {
    Box::new(DrawSource::new(Rect::new(0.0, 0.0, 64.0, 64.0), 2.0, |canvas| {
        let (w, h) = (canvas.width(), canvas.height());
        for y in 0..h {
            for x in 0..w {
                let color = Color::new(x as f64 / w as f64, y as f64 / h as f64, 0.25);
                canvas.set_pixel(x, y, color);
            }
        }
        canvas.fill_rect(Rect::new(28.0, 28.0, 8.0, 8.0), Color::new(0.0, 0.0, 1.0));
        Ok(())
    }))
}

#[cfg(target_os = "macos")]
fn screen_source() -> Option<Box<dyn SurfaceProvider>> {
    Some(Box::new(pixel_magnifier::capture::macos::ScreenSource::main_display()))
}

#[cfg(target_os = "windows")]
fn screen_source() -> Option<Box<dyn SurfaceProvider>> {
    use pixel_magnifier::capture::windows::ScreenSource;
    Some(Box::new(ScreenSource::new(Rect::new(0.0, 0.0, 1920.0, 1080.0))))
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn screen_source() -> Option<Box<dyn SurfaceProvider>> {
    None
}

// =============================================================================
// POINT D'ENTRÉE
// ENTRY POINT
// =============================================================================

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(message) = run() {
        error!("{message}");
        std::process::exit(2);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => MagnifierConfig::from_path(path).map_err(|e| e.to_string())?,
        None => MagnifierConfig::default(),
    };
    let magnifier = PixelMagnifier::new(config).map_err(|e| e.to_string())?;

    let source = if args.screen {
        screen_source().ok_or("screen capture is not supported on this platform")?
    } else {
        test_card()
    };
    // La région part du coin haut-gauche de la surface
    // The region starts at the top-left corner of the surface
    let size = source.bounds().size;
    let bounds = Rect::new(0.0, 0.0, size.width, size.height);
    let region = ActiveRegion::new(bounds);

    // Couleur sélectionnée, remplie par le callback / Selected color, filled by the callback
    let picked: Rc<Cell<Option<Color>>> = Rc::new(Cell::new(None));
    let sink = Rc::clone(&picked);

    let mut session = magnifier
        .activate(source.as_ref(), region, bounds.center(), move |color| {
            sink.set(Some(color))
        })
        .map_err(|e| e.to_string())?;
    info!(grid = magnifier.config().grid_size(), "magnifier shown");

    for drag in &args.drags {
        session.update_focal(*drag);
        session.tick(FRAME);
        if let Some(color) = session.selected_color() {
            let focal = session.focal_point();
            info!(x = focal.x, y = focal.y, color = %color.hex(), "focal moved");
        }
    }

    if args.cancel {
        session.cancel();
    } else {
        session.complete();
    }
    while !session.is_finished() {
        session.tick(FRAME);
    }

    // Affiche le résultat, ou quitte avec erreur si annulé
    // Display the result, or exit with error if cancelled
    match picked.get() {
        Some(color) => {
            let (r, g, b) = color.to_rgb8();
            println!("RGB({}, {}, {}) | HEX: {}", r, g, b, color.hex());
            Ok(())
        }
        None => std::process::exit(1),
    }
}
