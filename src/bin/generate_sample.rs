use std::path::Path;

use anyhow::{Context, Result};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use recdata::data::format::{from_tabular, RoleSpec};
use recdata::io::read::read_tsv;

/// Write a deterministic synthetic interactions file, then load it back
/// through the library and print a few structural statistics.
fn main() -> Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_interactions.tsv".to_string());

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&path)
        .with_context(|| format!("creating '{path}'"))?;
    writer.write_record(["user_id", "item_id", "rating", "timestamp"])?;

    let mut written = 0usize;
    let mut timestamp: i64 = 1_600_000_000;
    for user in 0..60 {
        let interactions = rng.gen_range(5..30);
        for _ in 0..interactions {
            let item: u32 = rng.gen_range(0..120);
            let rating: u32 = rng.gen_range(1..=5);
            timestamp += rng.gen_range(30..3600);
            writer.write_record([
                user.to_string(),
                item.to_string(),
                rating.to_string(),
                timestamp.to_string(),
            ])?;
            written += 1;
        }
    }
    writer.flush()?;
    println!("Wrote {written} interactions to {path}");

    // round-trip through the loader as a smoke check
    let raw = read_tsv(Path::new(&path), Some(0)).context("reading the file back")?;
    let spec = RoleSpec::new()
        .user("user_id")
        .item("item_id")
        .rating("rating")
        .timestamp("timestamp");
    let mut dataset = from_tabular(&raw, &spec)?;
    println!(
        "{} users × {} items, density {:.5}, gini(users) {:.3}",
        dataset.n_users()?,
        dataset.n_items()?,
        dataset.get_metric("density")?,
        dataset.get_metric("gini_user")?,
    );
    Ok(())
}
