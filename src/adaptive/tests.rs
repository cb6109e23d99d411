use super::*;
use crate::extract::pext_bitloop;
use crate::test_util::random_mask_with_runs;
use crate::util::SplitMix64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

const CONCRETE_MODES: [ExtractMode; 6] = [
    ExtractMode::Hardware,
    ExtractMode::ByteTable,
    ExtractMode::BlockTable,
    ExtractMode::BlockTableUnrolled2,
    ExtractMode::BlockTableUnrolled4,
    ExtractMode::BlockTableUnrolled8,
];

fn seeded_rng() -> StdRng {
    StdRng::from_seed([
        0, 1, 2, 3, 4, 5, 6, 7, 0, 1, 2, 3, 4, 5, 6, 7, 0, 1, 2, 3, 4, 5, 6, 7, 0, 1, 2, 3, 4, 5,
        6, 7,
    ])
}

fn measurement(mode: ExtractMode, nanos: u64, checksum: u64) -> Measurement {
    Measurement {
        mode,
        elapsed: Duration::from_nanos(nanos),
        checksum,
    }
}

/// A small tuner, so the tests stay fast in debug builds.
fn small_tuner() -> Tuner {
    Tuner::default().batch_size(1 << 10)
}

#[test]
fn test_forced_modes() {
    let mut rng = seeded_rng();
    for mode in CONCRETE_MODES {
        if mode == ExtractMode::Hardware && !crate::arch::has_hardware_pext() {
            continue;
        }
        for _ in 0..20 {
            let mask = rng.gen::<u64>() & rng.gen::<u64>();
            let pext = AdaptivePext::with_mode(mask, mode);
            assert_eq!(pext.mode(), mode);
            assert_eq!(pext.mask(), mask);
            assert!(pext.is_usable());
            for _ in 0..100 {
                let value = rng.gen::<u64>();
                assert_eq!(pext.invoke(value), pext_bitloop(value, mask), "{mode}");
                assert_eq!(pext.try_invoke(value), Ok(pext_bitloop(value, mask)));
            }
        }
    }
}

#[test]
fn test_scenarios() {
    for mode in CONCRETE_MODES.into_iter().skip(1) {
        assert_eq!(AdaptivePext::with_mode(0b1010, mode).invoke(0b1101), 0b10);
        assert_eq!(
            AdaptivePext::with_mode(u64::MAX, mode).invoke(0x0123_4567_89AB_CDEF),
            0x0123_4567_89AB_CDEF
        );
        assert_eq!(AdaptivePext::with_mode(0, mode).invoke(u64::MAX), 0);
    }
}

#[test]
fn test_hardware_mode_skips_block_table() {
    let pext = AdaptivePext::with_mode(0xF0F0, ExtractMode::Hardware);
    assert!(pext.block_table().is_empty());
    assert_eq!(pext.mode_name(), "Pext");

    let pext = AdaptivePext::with_mode(0xF0F0, ExtractMode::ByteTable);
    assert_eq!(pext.block_table().len(), 2);
}

#[test]
fn test_hardware_unavailable() {
    let pext = AdaptivePext::with_mode(0xFF, ExtractMode::Hardware);
    if crate::arch::has_hardware_pext() {
        assert_eq!(pext.try_invoke(0x1234), Ok(0x34));
    } else {
        assert!(!pext.is_usable());
        assert_eq!(pext.try_invoke(0x1234), Err(PextError::HardwareUnavailable));
    }
}

#[test]
fn test_hardware_unavailable_panics() {
    if crate::arch::has_hardware_pext() {
        return;
    }
    let pext = AdaptivePext::with_mode(0xFF, ExtractMode::Hardware);
    let result = std::panic::catch_unwind(|| pext.invoke(0x1234));
    assert!(result.is_err());
}

#[test]
fn test_default_instance() {
    let pext = AdaptivePext::default();
    assert!(!pext.is_usable());
    assert_eq!(pext.mode(), ExtractMode::Automatic);
    assert_eq!(pext.try_invoke(0), Err(PextError::UnboundInstance));
}

#[test]
#[should_panic(expected = "default-constructed")]
fn test_default_instance_panics() {
    let _ = AdaptivePext::default().invoke(1);
}

#[test]
fn test_automatic_not_bindable() {
    assert_eq!(
        AdaptivePext::bind(1, ExtractMode::Automatic, BlockTable::new(1)).err(),
        Some(PextError::AutomaticNotBindable)
    );
}

#[test]
fn test_automatic_random_masks() {
    let mut rng = seeded_rng();
    let tuner = small_tuner();
    for i in 0..100 {
        let mask = random_mask_with_runs(&mut rng, i % 33);
        let pext = AdaptivePext::with_tuner(mask, &tuner).unwrap();
        assert_ne!(pext.mode(), ExtractMode::Automatic);
        assert!(Tuner::candidates().contains(&pext.mode()));

        // a fresh batch, different from the tuning input
        for value in SplitMix64::new(i as u64 + 1).take(100) {
            assert_eq!(pext.invoke(value), pext_bitloop(value, mask), "mask = {mask:#x}");
        }
    }
}

#[test]
fn test_measure_agrees() {
    let tuner = small_tuner().rounds(2);
    let mask = 0x00FF_0F0F_3333_5555;
    let measurements = tuner.measure(mask, &BlockTable::new(mask)).unwrap();

    let modes: Vec<ExtractMode> = measurements.iter().map(|m| m.mode).collect();
    assert_eq!(modes, Tuner::candidates());

    let expected = SplitMix64::new(0)
        .take(1 << 10)
        .fold(0u64, |sum, v| sum.wrapping_add(pext_bitloop(v, mask)))
        .wrapping_mul(2);
    for m in &measurements {
        assert_eq!(m.checksum, expected, "{}", m.mode);
    }
}

#[test]
fn test_candidates() {
    let candidates = Tuner::candidates();
    assert!(!candidates.contains(&ExtractMode::Automatic));
    assert_eq!(
        candidates.contains(&ExtractMode::Hardware),
        crate::arch::has_hardware_pext()
    );
    assert_eq!(candidates.last(), Some(&ExtractMode::BlockTableUnrolled8));
    assert!(candidates.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_select_fastest() {
    let measurements = [
        measurement(ExtractMode::ByteTable, 300, 7),
        measurement(ExtractMode::BlockTable, 100, 7),
        measurement(ExtractMode::BlockTableUnrolled2, 200, 7),
    ];
    assert_eq!(select_fastest(&measurements), Ok(ExtractMode::BlockTable));
}

#[test]
fn test_select_fastest_tie() {
    let measurements = [
        measurement(ExtractMode::ByteTable, 300, 0),
        measurement(ExtractMode::BlockTableUnrolled2, 100, 0),
        measurement(ExtractMode::BlockTableUnrolled4, 100, 0),
    ];
    assert_eq!(
        select_fastest(&measurements),
        Ok(ExtractMode::BlockTableUnrolled2)
    );
}

#[test]
fn test_select_fastest_mismatch() {
    // a zero checksum is an ordinary value and must be checked like any other
    let measurements = [
        measurement(ExtractMode::ByteTable, 300, 0),
        measurement(ExtractMode::BlockTable, 100, 0),
        measurement(ExtractMode::BlockTableUnrolled2, 50, 1),
    ];
    assert_eq!(
        select_fastest(&measurements),
        Err(PextError::InconsistentBackends {
            mode: ExtractMode::BlockTableUnrolled2,
            expected: 0,
            actual: 1,
        })
    );
    assert_eq!(select_fastest(&[]), Err(PextError::NoCandidates));
}

#[test]
fn test_mode_names() {
    for mode in ExtractMode::ALL {
        assert_eq!(mode.name().parse::<ExtractMode>(), Ok(mode));
        assert_eq!(mode.to_string(), mode.name());
        assert_eq!(ExtractMode::try_from(u8::from(mode)), Ok(mode));
    }
    assert_eq!("hardware".parse::<ExtractMode>(), Ok(ExtractMode::Hardware));
    assert_eq!("blocktable".parse::<ExtractMode>(), Ok(ExtractMode::BlockTable));
    assert_eq!(
        "Bitloop".parse::<ExtractMode>(),
        Err(PextError::UnknownModeName("Bitloop".to_owned()))
    );
    assert_eq!(ExtractMode::try_from(7), Err(PextError::InvalidMode(7)));
}

#[test]
#[should_panic(expected = "batch size")]
fn test_zero_batch_size() {
    let _ = Tuner::default().batch_size(0);
}

#[test]
fn test_tuner_is_deterministic() {
    let tuner = small_tuner().seed(99);
    assert_eq!(tuner.batch(), tuner.batch());
    assert_ne!(tuner.batch(), small_tuner().batch());
    assert_eq!(tuner.batch().len(), 1 << 10);
}
