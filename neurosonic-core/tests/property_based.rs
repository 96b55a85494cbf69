use neurosonic_core::protocol::{decode_frame, FRAME_LEN, SAMPLES_PER_FRAME, SCALE_FACTOR};
use neurosonic_core::store::SampleStore;
use neurosonic_core::Channel;
use proptest::prelude::*;

proptest! {
    /// Every frame of at least 20 bytes decodes to exactly 12 samples,
    /// each inside the representable microvolt range.
    #[test]
    fn decode_always_yields_twelve_bounded_samples(
        frame in prop::collection::vec(any::<u8>(), FRAME_LEN..2 * FRAME_LEN)
    ) {
        let samples = decode_frame(&frame).unwrap();
        prop_assert_eq!(samples.len(), SAMPLES_PER_FRAME);
        let max_val = 4095.0 * SCALE_FACTOR;
        for &s in &samples {
            prop_assert!((0.0..=max_val).contains(&s));
        }
    }

    /// Short frames always fail and never panic.
    #[test]
    fn short_frames_always_error(frame in prop::collection::vec(any::<u8>(), 0..FRAME_LEN)) {
        prop_assert!(decode_frame(&frame).is_err());
    }

    /// The header never influences the decoded samples.
    #[test]
    fn decode_ignores_header_bytes(
        payload in prop::collection::vec(any::<u8>(), FRAME_LEN - 2),
        header_a in any::<[u8; 2]>(),
        header_b in any::<[u8; 2]>(),
    ) {
        let mut frame_a = header_a.to_vec();
        frame_a.extend_from_slice(&payload);
        let mut frame_b = header_b.to_vec();
        frame_b.extend_from_slice(&payload);

        prop_assert_eq!(decode_frame(&frame_a).unwrap(), decode_frame(&frame_b).unwrap());
    }

    /// Decoding is a pure function of the frame bytes.
    #[test]
    fn decode_is_deterministic(frame in prop::collection::vec(any::<u8>(), FRAME_LEN)) {
        prop_assert_eq!(decode_frame(&frame).unwrap(), decode_frame(&frame).unwrap());
    }

    /// The ring buffer always equals the suffix of everything appended:
    /// chronological order, capped at capacity, never torn.
    #[test]
    fn ring_window_is_a_suffix_of_the_append_stream(
        batches in prop::collection::vec(
            prop::collection::vec(-1000.0f64..1000.0, 1..40),
            1..30,
        )
    ) {
        // 0.1 s buffer: 26-sample capacity, so wraps are exercised often.
        let store = SampleStore::new(0.1);
        let mut model: Vec<f64> = Vec::new();

        for batch in &batches {
            store.append(Channel::Tp10, batch);
            model.extend_from_slice(batch);
        }

        let expected_len = model.len().min(store.capacity());
        let expected = &model[model.len() - expected_len..];

        prop_assert_eq!(store.sample_count(Channel::Tp10), expected_len);
        prop_assert_eq!(store.last_n(Channel::Tp10, store.capacity()), expected);
    }

    /// Reads shorter than the buffered count return exactly the most
    /// recent samples.
    #[test]
    fn ring_partial_reads_return_most_recent(
        samples in prop::collection::vec(-1000.0f64..1000.0, 1..200),
        take in 1usize..64,
    ) {
        let store = SampleStore::new(0.25);
        store.append(Channel::Af8, &samples);

        let kept = samples.len().min(store.capacity());
        let expected_len = take.min(kept);
        let expected = &samples[samples.len() - expected_len..];

        prop_assert_eq!(store.last_n(Channel::Af8, take), expected);
    }
}
