// Unit tests for the linear-interpolation sample rate converter.

use pitch_assist::resample;

#[test]
fn test_identity_when_rates_match() {
    let input = vec![0.1, -0.5, 0.9, 0.0, 1.5];
    let output = resample(&input, 16000, 16000);

    assert_eq!(output, input, "Equal rates must return the input unchanged");
}

#[test]
fn test_empty_input_yields_empty_output() {
    assert!(resample(&[], 48000, 16000).is_empty());
    assert!(resample(&[], 16000, 16000).is_empty());
    assert!(resample(&[], 8000, 16000).is_empty());
}

#[test]
fn test_output_length_matches_rate_ratio() {
    let cases = [
        (4096usize, 48000u32, 16000u32),
        (2048, 44100, 16000),
        (1000, 22050, 16000),
        (512, 8000, 16000),
    ];

    for (len, src, dst) in cases {
        let input = vec![0.0f32; len];
        let output = resample(&input, src, dst);
        let expected = (len as f64 * dst as f64 / src as f64).round() as usize;

        assert_eq!(
            output.len(),
            expected,
            "len={} src={} dst={}",
            len,
            src,
            dst
        );
    }
}

#[test]
fn test_downsample_by_two_takes_even_samples() {
    // Ratio 2: every output position lands exactly on an input sample.
    let input: Vec<f32> = (0..9).map(|i| i as f32).collect();
    let output = resample(&input, 32000, 16000);

    assert_eq!(output, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
}

#[test]
fn test_upsample_interpolates_midpoints() {
    let input = vec![0.0, 1.0];
    let output = resample(&input, 8000, 16000);

    // Positions 0, 0.5, 1.0, 1.5; the last two fall on/past the final
    // sample and pass it through.
    assert_eq!(output, vec![0.0, 0.5, 1.0, 1.0]);
}

#[test]
fn test_values_are_not_clamped() {
    let input = vec![4.0, -6.0];
    let output = resample(&input, 32000, 16000);

    assert_eq!(output[0], 4.0, "Out-of-range values pass through");
}
