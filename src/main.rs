use std::thread;

use anyhow::Result;
use clap::Parser;
use rapture::cli::Cli;
use rapture::core::{KeyPhase, Runtime, ScriptedPlatform};

fn build_runtime(cli: &Cli) -> Result<Runtime> {
    if cli.headless {
        let script = cli.script.clone();
        let close_when_drained = cli.run_for.is_none();
        return Ok(Runtime::with_platform(move || {
            let platform = ScriptedPlatform::new(script);
            if close_when_drained {
                platform.close_when_drained()
            } else {
                platform
            }
        }));
    }

    native_runtime()
}

#[cfg(any(target_os = "linux", target_os = "windows"))]
fn native_runtime() -> Result<Runtime> {
    Ok(Runtime::new())
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
fn native_runtime() -> Result<Runtime> {
    anyhow::bail!("no native window backend on this platform; run with --headless")
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut runtime = build_runtime(&cli)?;

    runtime.on_begin(|| log::info!("window live, polling input"));
    runtime.on_end(|| log::info!("frame loop ended"));
    runtime.on_key(|frame, event| match event.key_phase() {
        Some(KeyPhase::Press) => println!("key press   (frame {}, dt {:.4}s)", frame.number, frame.delta),
        Some(KeyPhase::Release) => println!("key release (frame {}, dt {:.4}s)", frame.number, frame.delta),
        None => {}
    });

    runtime.configure(cli.runtime_config())?;

    match cli.run_for {
        Some(duration) => {
            runtime.begin(false)?;
            thread::sleep(duration);
            runtime.stop();
            runtime.join()?;
        }
        None => runtime.begin(true)?,
    }

    println!("Ran {} frames", runtime.frame_count());
    Ok(())
}
