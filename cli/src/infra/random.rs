//! Random proxy base ids.

use rand::Rng;

use crate::application::ports::BaseIdSource;
use crate::domain::launch::BASE_ID_RANGE;

/// Draws base ids from the thread-local generator. Uniqueness across app
/// instances is probabilistic only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngBaseIds;

impl BaseIdSource for ThreadRngBaseIds {
    fn next_base_id(&self) -> u32 {
        rand::rng().random_range(BASE_ID_RANGE)
    }
}
