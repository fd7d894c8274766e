//! Time window check
//!
//! A window is `[lower_bound, upper_bound)`; the lower bound is optional.

use super::entities::UniquenessCheckRequest;
use super::errors::UniquenessCheckError;
use shared_types::Timestamp;

/// Check the request's validity window against the evaluation instant.
pub fn check_time_window(
    request: &UniquenessCheckRequest,
    evaluation_timestamp: Timestamp,
) -> Result<(), UniquenessCheckError> {
    if let Some(lower_bound) = request.time_window_lower_bound {
        if evaluation_timestamp < lower_bound {
            return Err(UniquenessCheckError::TimeWindowBeforeLowerBound {
                evaluation_timestamp,
                lower_bound,
            });
        }
    }

    if evaluation_timestamp >= request.time_window_upper_bound {
        return Err(UniquenessCheckError::TimeWindowOutOfBounds {
            evaluation_timestamp,
            lower_bound: request.time_window_lower_bound,
            upper_bound: request.time_window_upper_bound,
        });
    }

    Ok(())
}
