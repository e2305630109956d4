#![no_main]

use libfuzzer_sys::fuzz_target;

use promptaudio::config::ExtensionSet;
use promptaudio::detect::{detect_audio_references, Detector};

fuzz_target!(|data: &str| {
    // Detection is a pure function of its input and must never panic,
    // whatever the text looks like.
    let refs = detect_audio_references(data);

    // Detection must also be deterministic.
    assert_eq!(refs, detect_audio_references(data));

    // No remote reference may ever come out of the scanner.
    for r in &refs {
        let lower = r.raw.to_ascii_lowercase();
        assert!(!lower.starts_with("http://"));
        assert!(!lower.starts_with("https://"));
    }

    // An empty extension set detects nothing.
    let empty = Detector::new(ExtensionSet::new(Vec::<String>::new()));
    assert!(empty.detect(data).is_empty());
});
