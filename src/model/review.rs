use crate::model::Hotel;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

/// Inclusive bounds of the site's rating scale
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RatingScale {
    pub min: f64,
    pub max: f64,
}

impl RatingScale {
    pub fn contains(&self, rating: f64) -> bool {
        rating.is_finite() && rating >= self.min && rating <= self.max
    }
}

impl Default for RatingScale {
    fn default() -> Self {
        Self { min: 1.0, max: 5.0 }
    }
}

/// A record that failed the output schema's constraints
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("rating {rating} is outside the scale {min}..={max}")]
    RatingOutOfRange { rating: f64, min: f64, max: f64 },
}

/// A review as extracted from a review page, not yet tied to a hotel
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewCandidate {
    pub rating: f64,
    pub text: String,
    pub author: Option<String>,
    pub date: Option<NaiveDate>,
}

impl ReviewCandidate {
    /// Binds the candidate to the hotel it was found under and validates it
    ///
    /// Out-of-range ratings are rejected, never clamped.
    pub fn into_review(self, hotel: &Hotel, scale: &RatingScale) -> Result<Review, ValidationError> {
        if !scale.contains(self.rating) {
            return Err(ValidationError::RatingOutOfRange {
                rating: self.rating,
                min: scale.min,
                max: scale.max,
            });
        }

        Ok(Review {
            hotel_id: hotel.id.clone(),
            hotel_name: hotel.name.clone(),
            rating: self.rating,
            text: self.text,
            author: self.author,
            date: self.date,
        })
    }
}

/// A validated review, ready for the record sink
///
/// Only obtainable through [`ReviewCandidate::into_review`], so every review
/// refers to a hotel that was discovered earlier in the run.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub hotel_id: String,
    pub hotel_name: String,
    pub rating: f64,
    pub text: String,
    pub author: Option<String>,
    pub date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn hotel() -> Hotel {
        Hotel::new(
            Url::parse("https://example.com/h/alpha/").unwrap(),
            "Alpha".to_string(),
            "Sochi".to_string(),
        )
    }

    fn candidate(rating: f64) -> ReviewCandidate {
        ReviewCandidate {
            rating,
            text: "Clean rooms".to_string(),
            author: Some("ivan".to_string()),
            date: NaiveDate::from_ymd_opt(2019, 7, 1),
        }
    }

    #[test]
    fn test_into_review_binds_hotel() {
        let review = candidate(4.5)
            .into_review(&hotel(), &RatingScale::default())
            .unwrap();

        assert_eq!(review.hotel_id, "alpha");
        assert_eq!(review.hotel_name, "Alpha");
        assert_eq!(review.rating, 4.5);
        assert_eq!(review.author.as_deref(), Some("ivan"));
    }

    #[test]
    fn test_scale_bounds_are_inclusive() {
        let scale = RatingScale::default();
        assert!(candidate(1.0).into_review(&hotel(), &scale).is_ok());
        assert!(candidate(5.0).into_review(&hotel(), &scale).is_ok());
    }

    #[test]
    fn test_out_of_range_rejected_not_clamped() {
        let scale = RatingScale::default();

        let err = candidate(7.0).into_review(&hotel(), &scale).unwrap_err();
        assert_eq!(
            err,
            ValidationError::RatingOutOfRange {
                rating: 7.0,
                min: 1.0,
                max: 5.0
            }
        );

        assert!(candidate(0.0).into_review(&hotel(), &scale).is_err());
        assert!(candidate(f64::NAN).into_review(&hotel(), &scale).is_err());
    }
}
