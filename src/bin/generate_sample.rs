use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

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

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n.max(1)
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const POSITIONS: [(&str, f64); 5] = [
    ("PG", 188.0),
    ("SG", 196.0),
    ("SF", 201.0),
    ("PF", 206.0),
    ("C", 211.0),
];
const COUNTRIES: [&str; 6] = ["USA", "USA", "USA", "Canada", "France", "Serbia"];
const TEAMS: [&str; 8] = ["BOS", "LAL", "CHI", "MIA", "GSW", "DEN", "TOR", "SAS"];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let seasons: Vec<String> = (2015..2023)
        .map(|y| format!("{y}-{:02}", (y + 1) % 100))
        .collect();
    let players_per_season = 120;

    let output_path = Path::new("data/all_seasons.csv");
    if let Some(dir) = output_path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;

    // leading unnamed index column, as the source export has one
    writer.write_record([
        "",
        "player_name",
        "team_abbreviation",
        "age",
        "player_height",
        "player_weight",
        "college",
        "country",
        "draft_year",
        "draft_round",
        "gp",
        "pts",
        "reb",
        "ast",
        "team_position",
        "season",
    ])?;

    let mut row_id = 0usize;
    for (s, season) in seasons.iter().enumerate() {
        for p in 0..players_per_season {
            let (position, mean_height) = POSITIONS[rng.below(POSITIONS.len())];
            let height = rng.gauss(mean_height + 0.1 * s as f64, 4.0);
            let weight = 0.9 * (height - 100.0) + rng.gauss(0.0, 6.0);
            let age = rng.gauss(26.5, 4.0).clamp(19.0, 40.0).round();
            let gp = (rng.gauss(55.0, 18.0).clamp(1.0, 82.0)).round();
            let pts = rng.gauss(9.0, 6.0).max(0.0);
            let reb = (rng.gauss(2.0, 1.5) + (height - 185.0) * 0.12).max(0.0);
            let ast = (rng.gauss(2.5, 1.5) + (200.0 - height) * 0.08).max(0.0);

            let undrafted = rng.next_f64() < 0.15;
            let draft_year = if undrafted {
                "Undrafted".to_string()
            } else {
                (2015 + s as i64 - (age as i64 - 20).max(0)).to_string()
            };
            let draft_round = if undrafted {
                "Undrafted".to_string()
            } else {
                (1 + rng.below(2)).to_string()
            };
            // a few blank ages, as in the real export
            let age_cell = if rng.next_f64() < 0.01 {
                String::new()
            } else {
                format!("{age:.0}")
            };

            writer.write_record([
                row_id.to_string(),
                format!("Player {:04}", (s * 37 + p) % 600),
                TEAMS[rng.below(TEAMS.len())].to_string(),
                age_cell,
                format!("{height:.2}"),
                format!("{weight:.2}"),
                "None".to_string(),
                COUNTRIES[rng.below(COUNTRIES.len())].to_string(),
                draft_year,
                draft_round,
                format!("{gp:.0}"),
                format!("{pts:.1}"),
                format!("{reb:.1}"),
                format!("{ast:.1}"),
                position.to_string(),
                season.clone(),
            ])?;
            row_id += 1;
        }
    }
    writer.flush()?;

    println!(
        "Wrote {row_id} player-seasons ({} seasons) to {}",
        seasons.len(),
        output_path.display()
    );
    Ok(())
}
