//! Utilities for creating `rodio` sinks from files.
//!
//! The helper here encapsulates opening/decoding a file and preparing a
//! paused `Sink` at the requested start position.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
///
/// Returns the sink and the total duration reported by the decoder.
pub(super) fn create_sink_at(
    handle: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>), String> {
    let file = File::open(path).map_err(|e| format!("open: {e}"))?;

    let source = Decoder::new(BufReader::new(file)).map_err(|e| format!("decode: {e}"))?;
    let total = source.total_duration();

    let sink = Sink::connect_new(handle.mixer());
    // `skip_duration` is our fallback seeking primitive; even Duration::ZERO is fine.
    sink.append(source.skip_duration(start_at));
    sink.pause();
    Ok((sink, total))
}
