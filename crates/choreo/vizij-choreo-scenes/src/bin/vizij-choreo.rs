//! Build a bundled choreography and print a summary, or bake it to JSON.
//!
//! Usage: vizij-choreo <scene> [--bake] [--fps <hz>]
//!        vizij-choreo --list

use anyhow::{anyhow, bail, Context, Result};
use log::info;

use vizij_choreo_core::{export_baked_json_string, run_script, BakingConfig};
use vizij_choreo_scenes::{all_scripts, find_script};

struct Args {
    scene: Option<String>,
    list: bool,
    bake: bool,
    fps: Option<f32>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        scene: None,
        list: false,
        bake: false,
        fps: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--list" => args.list = true,
            "--bake" => args.bake = true,
            "--fps" => {
                let v = it.next().ok_or_else(|| anyhow!("--fps needs a value"))?;
                let fps: f32 = v.parse().with_context(|| format!("invalid --fps '{v}'"))?;
                if !fps.is_finite() || fps <= 0.0 {
                    bail!("--fps must be a positive number, got '{v}'");
                }
                args.fps = Some(fps);
            }
            s if s.starts_with("--") => bail!("unknown flag '{s}'"),
            s => {
                if args.scene.replace(s.to_string()).is_some() {
                    bail!("only one scene name may be given");
                }
            }
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = parse_args()?;

    if args.list || args.scene.is_none() {
        for script in all_scripts() {
            println!("{}", script.name());
        }
        return Ok(());
    }

    let name = args.scene.unwrap_or_default();
    let script = find_script(&name).ok_or_else(|| anyhow!("no scene named '{name}'"))?;
    let player = run_script(script.as_ref()).with_context(|| format!("building scene '{name}'"))?;

    if args.bake {
        let mut cfg = BakingConfig::from_config(player.config());
        if let Some(fps) = args.fps {
            cfg.frame_rate = fps;
        }
        let baked = player.bake(&cfg);
        info!("baked {} frames of '{name}'", baked.len());
        println!("{}", export_baked_json_string(&baked)?);
        return Ok(());
    }

    let summary = serde_json::json!({
        "scene": name,
        "nodes": player.graph().len(),
        "commands": player.commands().len(),
        "total_duration": player.total_duration(),
        "camera": player.camera(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
