use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use waveframe::bands::{spawn_analysis, AnalyzerConfig, BandAnalyzer, SharedBands};
use waveframe::beat::{BeatClock, TempoEstimate};
use waveframe::frame::FrameScheduler;
use waveframe::waveform::ShapeParameters;

const SAMPLE_RATE: u32 = 44_100;
const WINDOW_LEN: usize = 2048;
const BPM: f64 = 120.0;
const SECONDS: f64 = 8.0;
const BEATS: usize = 8;

fn main() {
    let samples = click_track(BPM, SECONDS);

    // measure the tempo and start the clock with it
    let mut clock = BeatClock::new();
    let (beat_sender, beat_receiver) = crossbeam_channel::bounded(8);
    clock.add_listener(&beat_sender);
    match clock.estimate_from_samples(&samples, SAMPLE_RATE) {
        TempoEstimate::Measured { bpm, confidence } => {
            println!("measured {:.1} bpm (confidence {:.1})", bpm, confidence)
        }
        TempoEstimate::Fallback { bpm } => println!("fell back to {} bpm", bpm),
    }

    // analysis thread fed at real-time pace so the bands move while
    // the beats tick
    let (window_sender, window_receiver) = crossbeam_channel::unbounded();
    let shared = SharedBands::new();
    let cancel = Arc::new(AtomicBool::new(false));
    let analyzer = BandAnalyzer::new(AnalyzerConfig::default());
    let analysis = spawn_analysis(window_receiver, analyzer, shared.clone(), cancel.clone());

    let windows: Vec<Vec<f32>> = samples
        .chunks(WINDOW_LEN)
        .filter(|w| w.len() == WINDOW_LEN)
        .map(|w| w.to_vec())
        .collect();
    let feeder = thread::spawn(move || {
        let pace = Duration::from_millis((WINDOW_LEN * 1000 / SAMPLE_RATE as usize) as u64);
        for window in windows {
            if window_sender.send(window).is_err() {
                return;
            }
            thread::sleep(pace);
        }
    });

    // one frame per beat, print how far the rings deform
    let mut scheduler = FrameScheduler::new(shared, ShapeParameters::default()).unwrap();
    for beat in 1..=BEATS {
        beat_receiver.recv_timeout(Duration::from_secs(2)).unwrap();
        let frame = scheduler.tick();

        let mut min_radius = f64::MAX;
        let mut max_radius: f64 = 0.0;
        for ring in &frame.layers {
            for vertex in &ring.vertices {
                let radius = (vertex.x * vertex.x + vertex.y * vertex.y).sqrt();
                min_radius = min_radius.min(radius);
                max_radius = max_radius.max(radius);
            }
        }
        println!(
            "beat {}: bands {:.2} / {:.2} / {:.2}, radius {:.1}..{:.1}",
            beat, frame.bands.low, frame.bands.mid, frame.bands.high, min_radius, max_radius
        );
    }

    clock.stop();
    cancel.store(true, Ordering::Relaxed);
    analysis.join().unwrap();
    feeder.join().unwrap();
}

/// a short decaying click on every beat
fn click_track(bpm: f64, seconds: f64) -> Vec<f32> {
    let total = (seconds * f64::from(SAMPLE_RATE)) as usize;
    let period = (60.0 / bpm * f64::from(SAMPLE_RATE)) as usize;
    let mut samples = vec![0.0f32; total];
    let mut at = 0;
    while at + 64 < total {
        for j in 0..64 {
            samples[at + j] = 0.9 * (1.0 - j as f32 / 64.0);
        }
        at += period;
    }
    samples
}
