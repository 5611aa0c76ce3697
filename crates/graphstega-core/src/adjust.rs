//! Direct adjustment of unmatched vertices.
//!
//! A vertex nothing would trade with gets one of its channel bytes nudged
//! so the vertex reaches its target anyway. Both the in-range and the
//! overflow branch change the byte sum by exactly the required difference
//! modulo `mod_factor`, so adjustment cannot fail; the visual cost is
//! accepted.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::params::Parameters;
use crate::sample::{BYTES_PER_SAMPLE, SampleStore};
use crate::vertex::Vertex;

/// Force `vertex` to its target by mutating one random channel byte of one
/// random owned sample.
pub(crate) fn adjust_vertex(
    vertex: &mut Vertex,
    store: &mut SampleStore,
    params: &Parameters,
    rng: &mut ChaCha8Rng,
) {
    let sample_idx = rng.gen_range(0..vertex.sample_ids.len());
    let channel = rng.gen_range(0..BYTES_PER_SAMPLE);
    let sid = vertex.sample_ids[sample_idx];

    let sample = store.sample(sid);
    let mod_factor = u16::from(params.mod_factor());
    let mask = u16::from(params.mask());
    let diff = ((mod_factor + u16::from(sample.target_mod_value())
        - u16::from(sample.mod_value()))
        & mask) as u8;

    let old = sample.values()[channel];
    // Stepping down by (mod_factor - diff) changes the sum by the same
    // residue as stepping up by diff; channel bytes never wrap.
    let new = if u16::from(old) + u16::from(diff) > 255 {
        old - (params.mod_factor() - diff)
    } else {
        old + diff
    };
    store.set_channel(sid, channel, new);
    vertex.is_valid = false;
    vertex.refresh_value(store);
}
