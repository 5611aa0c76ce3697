//! Integration test: carriers survive a save/load/extract cycle on disk.
//!
//! Run: cargo test -p graphstega-carrier --test carrier_roundtrip_test

use graphstega_carrier::{AnyCarrier, ImageCarrier, WavCarrier};
use graphstega_core::{Carrier, Engine};
use hound::{SampleFormat, WavSpec, WavWriter};

fn noisy_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 131 + 7) as u8).collect()
}

#[test]
fn png_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("carrier.png");

    let engine = Engine::default();
    let mut carrier = ImageCarrier::from_rgb8(noisy_bytes(64 * 64 * 3), 64, 64).unwrap();
    engine.embed(&mut carrier, b"painted over").unwrap();
    carrier.save(&path).unwrap();

    let reloaded = ImageCarrier::load(&path).unwrap();
    assert_eq!(reloaded.width(), 64);
    assert_eq!(reloaded.bytes(), carrier.bytes(), "PNG must be lossless");
    assert_eq!(engine.extract(&reloaded).unwrap(), b"painted over");
}

#[test]
fn wav_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("carrier.wav");
    let spec = WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 8,
        sample_format: SampleFormat::Int,
    };

    let engine = Engine::default();
    let mut carrier = WavCarrier::from_pcm(spec, noisy_bytes(9000)).unwrap();
    engine.embed(&mut carrier, b"in the noise floor").unwrap();
    carrier.save(&path).unwrap();

    let reloaded = WavCarrier::load(&path).unwrap();
    assert_eq!(reloaded.bytes(), carrier.bytes());
    assert_eq!(engine.extract(&reloaded).unwrap(), b"in the noise floor");
}

#[test]
fn wav_with_16_bit_samples_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.wav");
    let spec = WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&path, spec).unwrap();
    for i in 0..100i16 {
        writer.write_sample(i * 3).unwrap();
    }
    writer.finalize().unwrap();

    assert!(WavCarrier::load(&path).is_err());
}

#[test]
fn any_carrier_dispatches_on_extension() {
    let dir = tempfile::tempdir().unwrap();

    let png_path = dir.path().join("c.png");
    ImageCarrier::from_rgb8(noisy_bytes(16 * 16 * 3), 16, 16)
        .unwrap()
        .save(&png_path)
        .unwrap();
    assert!(matches!(
        AnyCarrier::load(&png_path).unwrap(),
        AnyCarrier::Image(_)
    ));

    let wav_path = dir.path().join("c.WAV");
    let spec = WavSpec {
        channels: 2,
        sample_rate: 44_100,
        bits_per_sample: 8,
        sample_format: SampleFormat::Int,
    };
    WavCarrier::from_pcm(spec, noisy_bytes(600))
        .unwrap()
        .save(&wav_path)
        .unwrap();
    assert!(matches!(
        AnyCarrier::load(&wav_path).unwrap(),
        AnyCarrier::Wav(_)
    ));
}

#[test]
fn any_carrier_roundtrips_through_engine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cover.png");
    ImageCarrier::from_rgb8(noisy_bytes(48 * 48 * 3), 48, 48)
        .unwrap()
        .save(&path)
        .unwrap();

    let engine = Engine::default();
    let mut carrier = AnyCarrier::load(&path).unwrap();
    engine.embed(&mut carrier, b"dispatched").unwrap();
    let out = dir.path().join("stego.png");
    carrier.save(&out).unwrap();

    let reloaded = AnyCarrier::load(&out).unwrap();
    assert_eq!(engine.extract(&reloaded).unwrap(), b"dispatched");
}
