//! Question selection.
//!
//! Picks which pool questions an attempt presents and in what order. The
//! chosen indices travel to the client so a submission rebuilds the same
//! subset instead of drawing a new one.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::Question;

use super::replay::ReplayTokenError;

/// Maximum number of questions presented per attempt.
pub const DEFAULT_QUESTION_CAP: usize = 10;

/// Ordered original-pool indices chosen for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    indices: Vec<usize>,
}

impl Selection {
    /// Draw `min(pool_len, cap)` distinct indices in random order.
    pub fn draw<R: Rng + ?Sized>(pool_len: usize, cap: usize, rng: &mut R) -> Self {
        let mut indices: Vec<usize> = (0..pool_len).collect();
        indices.shuffle(rng);
        indices.truncate(cap.min(pool_len));
        Self { indices }
    }

    /// Rebuild a selection carried back by a client.
    pub fn from_indices(
        indices: Vec<usize>,
        pool_len: usize,
        cap: usize,
    ) -> Result<Self, ReplayTokenError> {
        if indices.len() > cap {
            return Err(ReplayTokenError::TooManyIndices {
                count: indices.len(),
                cap,
            });
        }

        let mut seen = HashSet::with_capacity(indices.len());
        for &index in &indices {
            if index >= pool_len {
                return Err(ReplayTokenError::IndexOutOfRange { index, pool_len });
            }
            if !seen.insert(index) {
                return Err(ReplayTokenError::DuplicateIndex { index });
            }
        }

        Ok(Self { indices })
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Pool questions in presentation order, with their pool index.
    pub fn pick<'a>(
        &'a self,
        pool: &'a [Question],
    ) -> impl Iterator<Item = (usize, &'a Question)> + 'a {
        self.indices
            .iter()
            .filter_map(move |&index| pool.get(index).map(|q| (index, q)))
    }
}
