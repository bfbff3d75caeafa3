//! Capacity limits and the default filter table.
//!
//! The limits bound every buffer the filter owns, so the audio path never
//! allocates and never indexes past its storage.

/// Maximum number of samples accepted by a single `process_block` call.
pub const MAX_INPUT_LEN: usize = 512;

/// Maximum number of filter taps.
pub const MAX_COEFFS_LEN: usize = 512;

/// History storage: retained taps plus one full input block.
pub const HISTORY_LEN: usize = MAX_COEFFS_LEN - 1 + MAX_INPUT_LEN;

/// Depth of the control-to-audio coefficient update queue.
pub const UPDATE_QUEUE_DEPTH: usize = 4;

/// Symmetric linear-phase bandpass centred around 1000 Hz at an 8000 Hz
/// sample rate. Reproduced bit exact; the taps do not sum to unity gain.
#[rustfmt::skip]
pub const DEFAULT_BANDPASS_COEFFS: [f64; 63] = [
    -0.0448093,  0.0322875,  0.0181163,  0.0087615,  0.0056797,
     0.0086685,  0.0148049,  0.0187190,  0.0151019,  0.0027594,
    -0.0132676, -0.0232561, -0.0187804,  0.0006382,  0.0250536,
     0.0387214,  0.0299817,  0.0002609, -0.0345546, -0.0525282,
    -0.0395620,  0.0000246,  0.0440998,  0.0651867,  0.0479110,
     0.0000135, -0.0508558, -0.0736313, -0.0529380, -0.0000709,
     0.0540186,  0.0766746,  0.0540186, -0.0000709, -0.0529380,
    -0.0736313, -0.0508558,  0.0000135,  0.0479110,  0.0651867,
     0.0440998,  0.0000246, -0.0395620, -0.0525282, -0.0345546,
     0.0002609,  0.0299817,  0.0387214,  0.0250536,  0.0006382,
    -0.0187804, -0.0232561, -0.0132676,  0.0027594,  0.0151019,
     0.0187190,  0.0148049,  0.0086685,  0.0056797,  0.0087615,
     0.0181163,  0.0322875, -0.0448093,
];
