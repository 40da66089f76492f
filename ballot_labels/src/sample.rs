use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::*;

/// Works out how many entries to draw from a dataset of `total` entries.
///
/// Without a request, at most `DEFAULT_SAMPLE_SIZE` entries are drawn. A request larger
/// than the dataset is reduced to the size of the dataset.
pub fn resolve_sample_size(requested: Option<usize>, total: usize) -> Result<usize, LabelingErrors> {
    if total == 0 {
        return Err(LabelingErrors::EmptyDataset);
    }
    match requested {
        Some(0) => Err(LabelingErrors::InvalidSampleSize),
        Some(n) if n > total => {
            warn!(
                "resolve_sample_size: requested {} entries but the dataset only has {}, using the full dataset",
                n, total
            );
            Ok(total)
        }
        Some(n) => Ok(n),
        None => Ok(DEFAULT_SAMPLE_SIZE.min(total)),
    }
}

/// Draws `size` distinct entries, uniformly at random.
///
/// The draw only depends on the seed: the same entries, size and seed always return the
/// same sample, in the same order.
pub fn draw_sample(entries: &[Entry], size: usize, seed: u64) -> Result<Vec<Entry>, LabelingErrors> {
    let size = resolve_sample_size(Some(size), entries.len())?;
    let mut rng = StdRng::seed_from_u64(seed);
    let indexes = rand::seq::index::sample(&mut rng, entries.len(), size);
    info!(
        "draw_sample: {:?} entries out of {:?} (seed {})",
        size,
        entries.len(),
        seed
    );
    Ok(indexes.iter().map(|idx| entries[idx].clone()).collect())
}
