use anyhow::Result;
use clap::Parser;
use rush_core::fixed::Fixed;
use rush_core::logging::{LogConfig, LogLevel};
use rush_core::Machine;
use rush_scroller::{Kind, World};
use std::fs::File;
use std::io::Write;

#[derive(Parser)]
struct Args {
    /// Number of frames to simulate
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Dump save-state to this file as JSON
    #[arg(long, default_value = "state.json")]
    save: String,

    /// Print per-frame sprite table stats
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Suppress all per-frame output (still writes --save)
    #[arg(long, default_value_t = false)]
    quiet: bool,

    /// Engine log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "off")]
    engine_log: String,

    /// Camera X position in pixels
    #[arg(long, default_value_t = 0)]
    camera_x: i16,
}

/// Place the demo stage: a swaying platform, a solid block and a few
/// animated spinners around the player's start position.
fn build_demo_stage(world: &mut World) -> Result<()> {
    world.spawn(Kind::Platform, 0x120, 0xB0)?;
    world.spawn(Kind::Block, 0xA0, 0xD0)?;
    for i in 0..4u8 {
        world.spawn_with_respawn(Kind::Spinner, 0x60 + i as i16 * 0x18, 0x90, 0x10 + i)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Engine-side logging is very chatty at Trace; off unless asked for
    if let Some(level) = LogLevel::from_str(&args.engine_log) {
        LogConfig::global().set_global_level(level);
    } else {
        anyhow::bail!("unknown engine log level: {}", args.engine_log);
    }

    let mut world = World::new();
    build_demo_stage(&mut world)?;
    world.scroll.fg_x = Fixed::from_pixels(args.camera_x);
    log::info!("demo stage ready, running {} frames", args.frames);

    for frame_number in 1..=args.frames {
        let table = world.step_frame()?;
        if args.quiet {
            continue;
        }
        if args.debug {
            println!(
                "Frame {}: {} sprites, {} live actors",
                frame_number,
                table.link_count(),
                world.pool.iter().filter(|o| o.kind != Kind::Null).count()
            );
            let dump_len = std::cmp::min(4, table.link_count() as usize);
            let mut out = String::new();
            for entry in table.entries().take(dump_len) {
                out.push_str(&format!(
                    "({:#06x},{:#06x},{:#06x},{:#06x}) ",
                    entry.y, entry.size_link, entry.tile, entry.x
                ));
            }
            println!("First {} entries: {}", dump_len, out);
        }
    }

    if !args.quiet {
        println!(
            "Simulated {} frames; final frame emitted {} sprites",
            args.frames,
            world.table.link_count()
        );
    }

    let state = world.save_state();
    let mut f = File::create(&args.save)?;
    write!(f, "{}", serde_json::to_string_pretty(&state)?)?;

    Ok(())
}
