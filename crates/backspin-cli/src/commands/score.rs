use anyhow::{bail, Result};
use backspin_core::score;
use serde_json::json;

use super::review::RatingArgs;

/// Compute a score without storing anything.
pub fn show_score(ratings: RatingArgs, atmosphere: u8, as_json: bool) -> Result<()> {
    let Some(ratings) = ratings.into_ratings()? else {
        bail!("Give all four ratings: --rhymes, --structure, --implementation, --individuality");
    };
    let score = score::compute(&ratings, atmosphere)?;
    if as_json {
        let value = json!({
            "final_score": score.final_score,
            "multiplier": score.multiplier,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Score: {} (atmosphere x{:.4})", score.final_score, score.multiplier);
    }
    Ok(())
}
