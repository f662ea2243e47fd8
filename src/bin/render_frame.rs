//! Renders a backdrop and a rock breaking apart to a series of PNGs.
//!
//! Usage: cargo run --release --bin render_frame -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>   JSON render config (default: built-in defaults)
//!   --seed <SEED>     Seed for the backdrop and the rock (default: 12345)
//!   --out <DIR>       Output directory (default: "frames")
//!   --frames <N>      Number of fracture stages to write (default: 6)
//!   --threads <N>     Shader threads, overrides the config
//!
//! Output: <DIR>/frame_00.png, <DIR>/frame_01.png, ...
//! Frame 0 shows the rock intact; the rest step through the fracture.

use std::path::PathBuf;
use std::time::Instant;

use shatter::core::{DVec2, RenderConfig, Result};
use shatter::math::SeedStream;
use shatter::raster::Canvas;
use shatter::render::{Backdrop, Pulse, RendererRegistry};
use shatter::rock::Rock;

fn main() -> Result<()> {
    shatter::core::logging::init();

    let args: Vec<String> = std::env::args().collect();
    let seed = parse_arg::<i64>(&args, "--seed").unwrap_or(12345);
    let out_dir = PathBuf::from(parse_str_arg(&args, "--out").unwrap_or_else(|| "frames".to_string()));
    let frames = parse_arg::<usize>(&args, "--frames").unwrap_or(6).max(2);

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => {
            log::info!("Loading config from {path}");
            RenderConfig::load(&path)?
        }
        None => RenderConfig::default(),
    };
    if let Some(threads) = parse_arg::<usize>(&args, "--threads") {
        config.thread_count = Some(threads);
    }

    let mut canvas = Canvas::from_config(&config)?;
    log::info!(
        "Canvas {}x{} ({}x{} backing), {} shader threads",
        canvas.width(),
        canvas.height(),
        canvas.buffer().rounded_width(),
        canvas.buffer().rounded_height(),
        canvas.thread_count()
    );

    let registry = RendererRegistry::with_defaults();
    let mut stream = SeedStream::new(seed);
    let mut backdrop = Backdrop::from_params(stream.next_seed(), &config.backdrop)?;
    let center = DVec2::new(canvas.width() as f64 * 0.5, canvas.height() as f64 * 0.5);
    let mut rock = Rock::roll(center, &mut stream, &config.rock, 1.0)?;
    log::info!(
        "Rock: size {:.1}, integrity {:.1}, spin {:.3} rad/s",
        rock.shape.size(),
        rock.shape.integrity(),
        rock.rotation_speed
    );

    // A pulse approaching from below, strong enough to break the rock in one hit.
    let power_level = 4;
    let mut pulse = Pulse::new(
        center + DVec2::new(rock.shape.size() * 0.25, rock.shape.size() * 1.5),
        DVec2::new(0.0, -480.0),
        power_level,
        rock.shape.integrity(),
    );

    std::fs::create_dir_all(&out_dir)?;
    let frame_step = config.rock.fracture_duration / (frames - 1) as f64;
    let start = Instant::now();

    for frame in 0..frames {
        let frame_start = Instant::now();
        registry.render(&backdrop, &mut canvas)?;
        registry.render(&rock, &mut canvas)?;
        if frame == 0 {
            registry.render(&pulse, &mut canvas)?;
        }

        let path = out_dir.join(format!("frame_{frame:02}.png"));
        std::fs::write(&path, canvas.buffer().encode_png()?)?;
        log::info!(
            "Frame {frame}: {:?}, {:.1} ms -> {}",
            rock.shape.state(),
            frame_start.elapsed().as_secs_f64() * 1000.0,
            path.display()
        );

        if frame == 0 {
            // Fly the pulse into the rock.
            while !pulse.strike(&mut rock) && pulse.position.y > center.y - rock.shape.size() {
                pulse.advance(1.0 / 240.0);
            }
        }
        backdrop.advance(frame_step);
        rock.advance(frame_step);
    }

    log::info!("Wrote {frames} frames to {} in {:.2?}", out_dir.display(), start.elapsed());
    Ok(())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    parse_str_arg(args, flag).and_then(|s| s.parse().ok())
}
