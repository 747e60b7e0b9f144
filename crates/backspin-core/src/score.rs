//! Review score formula.
//!
//! A review carries four ratings and an atmosphere slider, each in `1..=10`.
//! The slider maps linearly onto a multiplier in `[1.0000, 1.6072]`:
//!
//! ```text
//! multiplier  = 1.0000 + (atmosphere - 1) * (0.6072 / 9)
//! final_score = round(sum(ratings) * 1.4 * multiplier)
//! ```
//!
//! The multiplier is rounded to four decimal places (the value stored with
//! the review) and the score is derived from that stored value, so the
//! maximum reachable score is exactly 90 and the minimum is 6.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Ratings;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;

/// Weight applied to the rating sum before the atmosphere multiplier.
pub const BASE_WEIGHT: f64 = 1.4;

pub const MIN_MULTIPLIER: f64 = 1.0;
pub const MAX_MULTIPLIER: f64 = 1.6072;

const MULTIPLIER_SCALE: f64 = 10_000.0;

/// Output of [`compute`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub final_score: i64,
    pub multiplier: f64,
}

fn check(field: &'static str, value: u8) -> Result<u8> {
    if (MIN_RATING..=MAX_RATING).contains(&value) {
        Ok(value)
    } else {
        Err(Error::InvalidRating { field, value })
    }
}

/// Map an atmosphere slider value to its stored multiplier.
pub fn atmosphere_multiplier(atmosphere: u8) -> Result<f64> {
    let atmosphere = check("atmosphere", atmosphere)?;
    let step = (MAX_MULTIPLIER - MIN_MULTIPLIER) / f64::from(MAX_RATING - MIN_RATING);
    let raw = MIN_MULTIPLIER + f64::from(atmosphere - MIN_RATING) * step;
    Ok((raw * MULTIPLIER_SCALE).round() / MULTIPLIER_SCALE)
}

/// Compute the final score for a set of ratings and an atmosphere value.
///
/// Fails with [`Error::InvalidRating`] naming the first field outside
/// `1..=10`.
pub fn compute(ratings: &Ratings, atmosphere: u8) -> Result<Score> {
    let mut sum = 0_u32;
    for (field, value) in ratings.fields() {
        sum += u32::from(check(field, value)?);
    }
    let multiplier = atmosphere_multiplier(atmosphere)?;

    // f64::round rounds half away from zero; every operand is positive.
    let final_score = (f64::from(sum) * BASE_WEIGHT * multiplier).round() as i64;

    Ok(Score {
        final_score,
        multiplier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(value: u8) -> Ratings {
        Ratings::new(value, value, value, value)
    }

    #[test]
    fn test_maximum_score_is_ninety() {
        let score = compute(&uniform(10), 10).unwrap();
        assert_eq!(score.final_score, 90);
        assert!((score.multiplier - MAX_MULTIPLIER).abs() < f64::EPSILON);
    }

    #[test]
    fn test_minimum_score_is_six() {
        let score = compute(&uniform(1), 1).unwrap();
        assert_eq!(score.final_score, 6);
        assert!((score.multiplier - MIN_MULTIPLIER).abs() < f64::EPSILON);
    }

    #[test]
    fn test_multiplier_endpoints_and_midpoint() {
        assert!((atmosphere_multiplier(1).unwrap() - 1.0).abs() < f64::EPSILON);
        assert!((atmosphere_multiplier(10).unwrap() - 1.6072).abs() < f64::EPSILON);
        // 1 + 4 * 0.067466... = 1.26986.. -> 1.2699
        assert!((atmosphere_multiplier(5).unwrap() - 1.2699).abs() < 1e-9);
    }

    #[test]
    fn test_known_mid_range_score() {
        // sum 28, atmosphere 5: 28 * 1.4 * 1.2699 = 49.78 -> 50
        let score = compute(&Ratings::new(7, 7, 7, 7), 5).unwrap();
        assert_eq!(score.final_score, 50);
    }

    #[test]
    fn test_all_inputs_stay_in_range() {
        let mut max_seen = 0;
        for a in 1..=10 {
            for b in 1..=10 {
                for c in 1..=10 {
                    for d in 1..=10 {
                        for atmosphere in 1..=10 {
                            let score = compute(&Ratings::new(a, b, c, d), atmosphere).unwrap();
                            assert!(
                                (6..=90).contains(&score.final_score),
                                "{a} {b} {c} {d} {atmosphere} -> {}",
                                score.final_score
                            );
                            max_seen = max_seen.max(score.final_score);
                        }
                    }
                }
            }
        }
        assert_eq!(max_seen, 90);
    }

    #[test]
    fn test_score_monotonic_in_atmosphere() {
        let ratings = Ratings::new(6, 8, 5, 9);
        let scores: Vec<i64> = (1..=10)
            .map(|atmosphere| compute(&ratings, atmosphere).unwrap().final_score)
            .collect();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_out_of_range_rating_names_field() {
        let err = compute(&Ratings::new(5, 11, 5, 5), 5).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidRating {
                field: "structure",
                value: 11
            }
        ));

        let err = compute(&Ratings::new(5, 5, 5, 0), 5).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidRating {
                field: "individuality",
                value: 0
            }
        ));
    }

    #[test]
    fn test_out_of_range_atmosphere() {
        let err = compute(&uniform(5), 0).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidRating {
                field: "atmosphere",
                value: 0
            }
        ));
        assert!(atmosphere_multiplier(11).is_err());
    }
}
