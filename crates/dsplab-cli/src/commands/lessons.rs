//! List available lessons.

use dsplab_lessons::LESSON_NAMES;

fn summary(name: &str) -> &'static str {
    match name {
        "noise" => "Add Gaussian noise to a speech-like burst at a target SNR",
        "matched" => "Detect a known pulse in noise by matched filtering",
        "wiener" => "Restore a noisy signal with a Wiener filter",
        "lpc" => "Predict an AR(2) process from its own past",
        "equalizer" => "Invert minimum- and maximum-phase channels",
        "multirate" => "Decimate, interpolate, noble identity, polyphase",
        "phase" => "Linear-phase FIR versus its minimum-phase twin",
        "analytic" => "Envelope detection and single-sideband modulation",
        "fractional" => "Windowed-sinc FIR versus Thiran allpass delay",
        "polezero" => "Place poles and zeros, allpass frequency warping",
        "quantization" => "Uniform quantizer SNR and Lloyd-Max design",
        "clustering" => "LBG vector quantizer on Gaussian blobs",
        _ => "",
    }
}

pub fn run() -> anyhow::Result<()> {
    println!("Available Lessons:");
    println!("==================");
    for name in LESSON_NAMES {
        println!("  {:14} - {}", name, summary(name));
    }
    println!();
    println!("Run one with: dsplab lesson <name> [--set key=value]");
    Ok(())
}
