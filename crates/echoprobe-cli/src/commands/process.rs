//! File-based reverb processing command.

use crate::wav::{StereoAudio, read_stereo, write_stereo};
use anyhow::{Context, bail};
use clap::Args;
use echoprobe_core::RingBuffer;
use echoprobe_reverb::{Location, SceneConfig, SpatialReverb};
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file (mono input is duplicated to both channels)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file (always stereo)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Scene file (TOML) with delay factor, cutoff, bulk parameters and probes
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Frames handed to the segment per block
    #[arg(long, default_value = "512", value_parser = clap::value_parser!(u32).range(1..))]
    block_size: u32,

    /// Pass audio through unprocessed
    #[arg(long)]
    bypass: bool,

    /// Seconds of silence appended so the reverb can ring out
    #[arg(long, default_value = "0")]
    tail: f32,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    if !matches!(args.bit_depth, 16 | 24 | 32) {
        bail!("--bit-depth must be 16, 24 or 32");
    }
    if !args.tail.is_finite() || args.tail < 0.0 {
        bail!("--tail must be a non-negative number of seconds");
    }

    println!("Reading {}...", args.input.display());
    let mut input = read_stereo(&args.input)?;
    println!(
        "  {} frames, {} Hz, {:.2}s",
        input.len(),
        input.sample_rate,
        input.duration_secs()
    );

    let mut reverb = SpatialReverb::new(input.sample_rate)?;
    if let Some(scene_path) = &args.scene {
        let scene = SceneConfig::load(scene_path)?;
        scene
            .apply(&mut reverb)
            .with_context(|| format!("scene {} rejected", scene_path.display()))?;
        println!(
            "Loaded scene: {} ({} probe(s))",
            scene_path.display(),
            scene.probes.len()
        );
    }
    if args.bypass {
        reverb.set_bypass(true);
    }

    let tail_frames = (args.tail * input.sample_rate as f32).round() as usize;
    input.left.resize(input.len() + tail_frames, 0.0);
    input.right.resize(input.right.len() + tail_frames, 0.0);

    let pb = ProgressBar::new(input.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let output = render(&mut reverb, &input, args.block_size as usize, |done| {
        pb.set_position(done as u64);
    })?;
    pb.finish_with_message("done");
    reverb.destroy();

    println!("\nStats:");
    for (label, audio) in [("Input: ", &input), ("Output:", &output)] {
        let (rms, peak) = stats(audio);
        println!(
            "  {label} RMS {:.1} dB, Peak {:.1} dB",
            linear_to_db(rms),
            linear_to_db(peak)
        );
    }

    println!("\nWriting {}...", args.output.display());
    write_stereo(&args.output, &output, args.bit_depth)?;
    println!("Done!");

    Ok(())
}

/// Streams `input` through the segment in host-sized blocks.
fn render(
    reverb: &mut SpatialReverb,
    input: &StereoAudio,
    block_size: usize,
    mut progress: impl FnMut(usize),
) -> anyhow::Result<StereoAudio> {
    let ring = || Arc::new(Mutex::new(RingBuffer::with_capacity(block_size)));
    let (left_in, right_in, left_out, right_out) = (ring(), ring(), ring(), ring());
    reverb.connect_input(Location::Left, left_in.clone())?;
    reverb.connect_input(Location::Right, right_in.clone())?;
    reverb.connect_output(Location::Left, left_out.clone())?;
    reverb.connect_output(Location::Right, right_out.clone())?;
    reverb.start();

    let mut output = StereoAudio {
        left: vec![0.0; input.len()],
        right: vec![0.0; input.len()],
        sample_rate: input.sample_rate,
    };

    let blocks = input
        .left
        .chunks(block_size)
        .zip(input.right.chunks(block_size))
        .zip(
            output
                .left
                .chunks_mut(block_size)
                .zip(output.right.chunks_mut(block_size)),
        );

    let mut done = 0;
    for ((in_l, in_r), (out_l, out_r)) in blocks {
        left_in.lock().push_slice(in_l);
        right_in.lock().push_slice(in_r);

        let mut processed = 0;
        while processed < in_l.len() {
            let n = reverb.mix();
            if n == 0 {
                bail!("segment stalled after {} frames", done + processed);
            }
            processed += n;
        }

        left_out.lock().pop_into(out_l);
        right_out.lock().pop_into(out_r);
        done += in_l.len();
        progress(done);
    }

    tracing::debug!(frames = done, block_size, "render finished");
    Ok(output)
}

fn stats(audio: &StereoAudio) -> (f32, f32) {
    let samples = || audio.left.iter().chain(&audio.right);
    let count = audio.left.len() + audio.right.len();
    if count == 0 {
        return (0.0, 0.0);
    }
    let sum: f32 = samples().map(|s| s * s).sum();
    let peak = samples().map(|s| s.abs()).fold(0.0, f32::max);
    ((sum / count as f32).sqrt(), peak)
}

fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        -120.0
    } else {
        20.0 * linear.log10()
    }
}
