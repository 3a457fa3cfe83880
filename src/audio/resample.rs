// Linear-interpolation sample rate conversion
//
// The backend expects 16kHz mono; capture devices deliver whatever rate
// the hardware runs at (typically 44.1kHz or 48kHz). A simple linear
// interpolator is enough for speech recognition input.

/// Convert a mono sample block from `source_rate` to `target_rate`.
///
/// Equal rates return the input unchanged. Otherwise the output length is
/// `round(len / (source_rate / target_rate))` and each output sample is a
/// linear blend of the two nearest input samples. Values are passed
/// through without clamping; an empty input yields an empty output.
pub fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate {
        return samples.to_vec();
    }

    let ratio = source_rate as f64 / target_rate as f64;
    let out_len = (samples.len() as f64 / ratio).round() as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let position = i as f64 * ratio;
        let index = position.floor() as usize;
        let fraction = (position - index as f64) as f32;

        let sample = if index + 1 < samples.len() {
            samples[index] * (1.0 - fraction) + samples[index + 1] * fraction
        } else {
            samples[index]
        };
        out.push(sample);
    }

    out
}
