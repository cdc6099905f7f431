use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

const FIRST_YEAR: i32 = 1990;
const LAST_YEAR: i32 = 2023;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform in [-1, 1).
    fn jitter(&mut self) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        unit * 2.0 - 1.0
    }
}

/// Compound growth with a little noise, rounded to one decimal.
fn growth_series(rng: &mut SimpleRng, start: f64, rate: f64, noise: f64) -> Vec<f64> {
    let mut value = start;
    (FIRST_YEAR..=LAST_YEAR)
        .map(|_| {
            let out = (value * 10.0).round() / 10.0;
            value *= 1.0 + rate + noise * rng.jitter();
            out
        })
        .collect()
}

fn write_csv(path: &Path, rng: &mut SimpleRng) -> Result<()> {
    let north = growth_series(rng, 120.0, 0.012, 0.01);
    let south = growth_series(rng, 80.0, 0.025, 0.02);

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["year", "north", "south", "census"])?;
    for (i, year) in (FIRST_YEAR..=LAST_YEAR).enumerate() {
        // Census years only every decade.
        let census = if year % 10 == 0 { "true" } else { "false" };
        writer.write_record([
            year.to_string(),
            north[i].to_string(),
            south[i].to_string(),
            census.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = Path::new("samples");
    std::fs::create_dir_all(out_dir).context("creating samples directory")?;
    let out_dir = out_dir.canonicalize().context("resolving samples directory")?;

    let mut rng = SimpleRng::new(42);
    let csv_path = out_dir.join("population.csv");
    write_csv(&csv_path, &mut rng)?;

    let dashboard = json!({
        "base_url": format!("file://{}", out_dir.display()),
        "charts": [
            {
                "el": "population",
                "source": "/population.csv",
                "x": "year",
                "labels": ["north", "south"],
                "title": "Population (thousands)",
            },
            {
                "el": "north",
                "source": "/population.csv",
                "x": "year",
                "y": "north",
                "options": { "responsive": false },
            },
        ],
    });
    let dashboard_path = out_dir.join("dashboard.json");
    std::fs::write(&dashboard_path, serde_json::to_string_pretty(&dashboard)?)
        .with_context(|| format!("writing {}", dashboard_path.display()))?;

    println!(
        "Wrote {} years to {} and dashboard {}",
        LAST_YEAR - FIRST_YEAR + 1,
        csv_path.display(),
        dashboard_path.display()
    );
    Ok(())
}
