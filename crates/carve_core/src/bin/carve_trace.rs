// Scripted carving run, printed as JSON lines
// Run with: cargo run --bin carve_trace -- [scenario] [seed] [config.json|yaml]
//
// scenarios: slalom (default), skid, skis, wedge
// seed adds small steering jitter; 0 disables it.

use anyhow::{bail, Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::json;

use carve_core::{
    CarveConfig, CarveEvent, ContactState, Equipment, Rider, RiderInput, TerrainSample,
};

const DT: f32 = 1.0 / 60.0;
const DURATION: f32 = 6.0;

struct Scenario {
    equipment: Equipment,
    speed: f32,
    /// Seconds between edge changes
    period: f32,
    amplitude: f32,
    wedge: f32,
}

fn scenario(name: &str) -> Result<Scenario> {
    Ok(match name {
        "slalom" => {
            Scenario { equipment: Equipment::Snowboard, speed: 15.0, period: 0.8, amplitude: 0.8, wedge: 0.0 }
        }
        "skid" => {
            Scenario { equipment: Equipment::Snowboard, speed: 30.0, period: 1.2, amplitude: 1.0, wedge: 0.0 }
        }
        "skis" => Scenario { equipment: Equipment::Skis, speed: 14.0, period: 0.9, amplitude: 0.7, wedge: 0.0 },
        "wedge" => Scenario { equipment: Equipment::Skis, speed: 6.0, period: 1.5, amplitude: 0.3, wedge: 0.8 },
        other => bail!("unknown scenario '{other}' (slalom, skid, skis, wedge)"),
    })
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let name = args.first().map(String::as_str).unwrap_or("slalom");
    let seed: u64 = match args.get(1) {
        Some(s) => s.parse().with_context(|| format!("invalid seed '{s}'"))?,
        None => 0,
    };
    let config = match args.get(2) {
        Some(path) => CarveConfig::from_path(path).with_context(|| format!("loading {path}"))?,
        None => CarveConfig::from_env_or_default(),
    };

    let scenario = scenario(name)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut rider = Rider::new(scenario.equipment, config);
    let terrain = TerrainSample::default();

    let mut heading = 0.0f32;
    let (mut x, mut z) = (0.0f32, 0.0f32);
    let mut speed = scenario.speed;
    let ticks = (DURATION / DT) as usize;

    for i in 0..ticks {
        let t = i as f32 * DT;
        let jitter = if seed == 0 { 0.0 } else { rng.gen_range(-0.05..0.05) };
        let phase = t * std::f32::consts::PI / scenario.period;
        let input = RiderInput {
            steer: (phase.sin() * scenario.amplitude + jitter).clamp(-1.0, 1.0),
            lean: 0.2,
            switch_stance: false,
            wedge: scenario.wedge,
        };
        let contact = ContactState { is_grounded: true, speed, x, z, heading, normal_y: 0.95 };

        let snapshot = rider.tick(&input, &contact, &terrain, DT);
        heading = snapshot.next_heading;
        // Slope gravity gives back half of what the skid scrubbed.
        speed = (snapshot.speed + 0.5 * snapshot.speed_scrub).max(0.0);
        x += heading.sin() * speed * DT;
        z += heading.cos() * speed * DT;

        if i % 30 == 0 {
            println!("{}", json!({ "kind": "snapshot", "data": snapshot }));
        }
        for event in rider.drain_events() {
            if let CarveEvent::PhaseChange { .. } = event {
                continue;
            }
            println!("{}", json!({ "kind": "event", "data": event }));
        }
    }

    let history = rider.history();
    let summary = json!({
        "kind": "summary",
        "scenario": name,
        "seed": seed,
        "turns": history.total_turns(),
        "perfect": history.perfect_count(),
        "average_perfection": history.average_perfection(),
        "best": history.best().map(|r| r.perfection),
        "chain": rider.chain().chain_count,
        "average_timing": rider.chain().average_timing(),
        "carve_ratio": rider.session().carve_ratio(),
    });
    println!("{summary}");
    Ok(())
}
