//! arsim demo entry point
//!
//! Usage: `arsim [scene.json]`. Without an argument the built-in demo room is
//! used. Set `RUST_LOG=debug` for per-face extraction details.

use std::process::ExitCode;

use glam::Vec3;

use arsim::sim::{PlaneDetectionMode, Pose, Ray, Trackable};
use arsim::{SceneDescription, Simulation};

fn main() -> ExitCode {
    env_logger::init();
    log::info!("arsim starting...");

    let scene = match std::env::args().nth(1) {
        Some(path) => match SceneDescription::load(&path) {
            Ok(scene) => scene,
            Err(e) => {
                log::error!("Failed to load scene {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => SceneDescription::demo_room(),
    };

    match run(&scene) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Simulation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(scene: &SceneDescription) -> arsim::Result<()> {
    let mut sim = scene.start_simulation()?;

    sim.trigger_plane_detection(PlaneDetectionMode::Horizontal);
    sim.trigger_plane_detection(PlaneDetectionMode::Vertical);

    let planes = sim.consume_plane_updates();
    println!("Detected {} planes:", planes.added.len());
    for plane in &planes.added {
        println!(
            "  {} {:?} center={:?} size={:?}",
            plane.id(),
            plane.alignment(),
            plane.center(),
            plane.size()
        );
    }

    place_anchor_below(&mut sim, Vec3::new(0.0, 2.0, 0.0))?;

    let anchors = sim.consume_anchor_updates();
    for anchor in &anchors.added {
        println!(
            "Anchor {} at {:?} (parent {:?})",
            anchor.id(),
            anchor.pose().position,
            anchor.parent().map(|p| p.to_string())
        );
    }

    Ok(())
}

/// Cast straight down from `origin` and anchor to whatever plane is hit
fn place_anchor_below(sim: &mut Simulation, origin: Vec3) -> arsim::Result<()> {
    let Some(ray) = Ray::new(origin, Vec3::NEG_Y) else {
        return Ok(());
    };

    match sim.raycast(&ray).first() {
        Some(hit) => {
            println!("Hit {} at distance {:.3}", hit.trackable_id, hit.distance);
            let pose = Pose::new(hit.pose.position, glam::Quat::IDENTITY);
            sim.add_anchor(pose, Some(hit.trackable_id))?;
        }
        None => println!("Nothing below {:?}", origin),
    }
    Ok(())
}
