use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, anyhow};
use arv_decode_rs::frame_pipeline::format::descriptor_by_name;
use arv_decode_rs::frame_pipeline::raw::BufferHandle;
use arv_decode_rs::frame_pipeline::synthetic::moving_ramp;
use arv_decode_rs::frame_pipeline::{
    DecoderRegistry, DemosaicBackend, DispatcherConfig, DispatcherMode, FrameDispatcher,
    FrameFeed, FrameNotification, RawFrameView,
};
use arv_decode_rs::frame_pipeline::dispatch::Delivery;
use arv_decode_rs::logger;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "arv-decode")]
#[command(about = "Decode synthetic Bayer camera streams")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the pixel formats with a registered decoder
    Formats,

    /// Drive a synthetic stream through the frame dispatcher
    Stream {
        /// Pixel format name, e.g. BayerRG12Packed
        #[arg(short, long, default_value = "BayerRG12Packed")]
        format: String,

        #[arg(long, default_value = "640")]
        width: u32,

        #[arg(long, default_value = "480")]
        height: u32,

        /// Number of frames the simulated driver delivers
        #[arg(short = 'n', long, default_value = "60")]
        frames: u64,

        /// Simulated frame interval in milliseconds
        #[arg(long, default_value = "10")]
        interval_ms: u64,

        #[arg(short, long, value_enum, default_value_t = BackendArg::Bilinear)]
        backend: BackendArg,

        /// Decode on the driver thread instead of the decode worker
        #[arg(long)]
        inline: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Bilinear,
    Linear,
}

impl From<BackendArg> for DemosaicBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Bilinear => DemosaicBackend::Bilinear,
            BackendArg::Linear => DemosaicBackend::Linear,
        }
    }
}

fn main() -> anyhow::Result<()> {
    logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Formats => list_formats(),
        Commands::Stream {
            format,
            width,
            height,
            frames,
            interval_ms,
            backend,
            inline,
        } => run_stream(&format, width, height, frames, interval_ms, backend.into(), inline),
    }
}

fn list_formats() -> anyhow::Result<()> {
    let registry = DecoderRegistry::with_builtin_decoders();
    for code in registry.formats() {
        let plugin = registry.plugin_id(code).unwrap_or_default();
        println!("{}  {}", code, plugin);
    }
    Ok(())
}

fn run_stream(
    format: &str,
    width: u32,
    height: u32,
    frames: u64,
    interval_ms: u64,
    backend: DemosaicBackend,
    inline: bool,
) -> anyhow::Result<()> {
    let descriptor = descriptor_by_name(format)
        .ok_or_else(|| anyhow!("Unknown pixel format '{}'", format))?;

    info!("Starting synthetic stream: {} {}x{}, backend {:?}", descriptor.name, width, height, backend);

    let registry = Arc::new(DecoderRegistry::with_bayer_family(backend));
    let feed = Arc::new(FrameFeed::new());
    let config = DispatcherConfig::builder()
        .mode(DispatcherMode::Embedded)
        .delivery(if inline { Delivery::Inline } else { Delivery::Worker })
        .build();
    let dispatcher = FrameDispatcher::new(feed.clone(), registry, descriptor.code, config)
        .context("Failed to create frame dispatcher")?;

    let received = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&received);
    dispatcher.add_subscriber(Arc::new(move |frame: &FrameNotification<'_>| {
        counter.fetch_add(1, Ordering::Relaxed);
        if let Some(image) = &frame.decoded {
            let centre = image.pixel(image.width / 2, image.height / 2);
            tracing::debug!(sequence = frame.sequence, "Frame decoded, centre pixel {:?}", centre);
        }
    }));

    if !dispatcher.force_forwarding() {
        warn!("Forwarding could not be forced on");
    }

    // Pre-encode a handful of buffers, reused like a driver's buffer pool.
    let pool: Vec<Vec<u8>> = (0..4)
        .map(|phase| moving_ramp(descriptor, width, height, phase * 16))
        .collect();

    let driver = {
        let feed = Arc::clone(&feed);
        thread::Builder::new()
            .name("driver".to_string())
            .spawn(move || {
                for i in 0..frames {
                    let slot = (i % pool.len() as u64) as usize;
                    let view = RawFrameView::new(&pool[slot], width, height)
                        .with_handle(BufferHandle(slot as u64));
                    feed.deliver(&view);
                    thread::sleep(Duration::from_millis(interval_ms));
                }
            })
            .context("Failed to start driver thread")?
    };

    driver
        .join()
        .map_err(|_| anyhow!("Driver thread panicked"))?;

    // Give the worker a moment to drain its last frame.
    thread::sleep(Duration::from_millis(50));

    let stats = dispatcher.stats();
    info!(
        "Delivered {}, dropped {}, decoded {}, failed {}, received {}",
        stats.delivered,
        stats.dropped,
        stats.decoded,
        stats.decode_failures,
        received.load(Ordering::Relaxed)
    );
    if let Some(avg) = stats.average_decode_time() {
        info!("Average decode time: {:.3}ms", avg.as_secs_f64() * 1000.0);
    }

    Ok(())
}
