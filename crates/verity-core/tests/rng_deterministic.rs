use proptest::prelude::*;
use verity_core::{derive_substream_seed, RngHandle};

proptest! {
    #[test]
    fn substreams_replay_identically(master in any::<u64>(), sub in 0u64..64, p in 0.0f64..1.0) {
        let mut first = RngHandle::substream(master, sub);
        let mut second = RngHandle::substream(master, sub);
        for _ in 0..32 {
            prop_assert_eq!(first.chance(p), second.chance(p));
        }
        prop_assert_ne!(derive_substream_seed(master, sub), derive_substream_seed(master, sub + 1));
    }
}

#[test]
fn chance_respects_certain_outcomes() {
    let mut stream = RngHandle::substream(42, 1);
    for _ in 0..64 {
        assert!(!stream.chance(0.0));
        assert!(stream.chance(1.0));
    }
}
