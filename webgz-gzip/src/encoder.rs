//! Streaming GZIP encoder.
//!
//! A [`GzipEncoder`] is one compression session: the header goes out when
//! the encoder is created, compressed bytes are forwarded to the sink as
//! soon as the deflater produces them, and the CRC-32/size trailer is
//! written on [`close`](GzipEncoder::close). Dropping an open encoder
//! closes it.

use crate::header::GzipHeader;
use log::{debug, warn};
use std::fs::File;
use std::io::{self, BufWriter, Read, Stdout, Write};
use std::path::{Path, PathBuf};
use webgz_core::crc::Crc32;
use webgz_core::error::{Result, WebgzError};
use webgz_core::traits::{CompressionLevel, Compressor, FlushMode, WindowBits};
use webgz_deflate::Deflater;

/// Chunk size used by [`gzip_file`].
pub const CHUNK_SIZE: usize = 4096;

/// Parameters of a compression session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GzipOptions {
    /// Compression level.
    pub level: CompressionLevel,
    /// Deflate window.
    pub window: WindowBits,
    /// Embed the original filename in the header.
    pub embed_filename: bool,
}

impl Default for GzipOptions {
    fn default() -> Self {
        Self {
            level: CompressionLevel::BEST,
            window: WindowBits::default(),
            embed_filename: true,
        }
    }
}

impl GzipOptions {
    /// Validate raw parameters: `level` in `0..=9`, `window_size` in
    /// `[-15, -8]`.
    pub fn from_raw(level: i64, window_size: i32, embed_filename: bool) -> Result<Self> {
        Ok(Self {
            level: CompressionLevel::from_i64(level)?,
            window: WindowBits::from_zlib(window_size)?,
            embed_filename,
        })
    }

    /// Set the compression level.
    pub fn with_level(mut self, level: CompressionLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the deflate window.
    pub fn with_window(mut self, window: WindowBits) -> Self {
        self.window = window;
        self
    }

    /// Enable or disable the filename field.
    pub fn with_filename(mut self, embed: bool) -> Self {
        self.embed_filename = embed;
        self
    }
}

struct Session<W: Write> {
    deflater: Deflater,
    crc: Crc32,
    size: u32,
    sink: W,
    scratch: Vec<u8>,
}

impl<W: Write> Session<W> {
    fn push(&mut self, input: &[u8], flush: FlushMode) -> Result<()> {
        self.deflater.compress(input, &mut self.scratch, flush)?;
        self.sink.write_all(&self.scratch)?;
        self.scratch.clear();
        Ok(())
    }

    fn finish(mut self) -> Result<W> {
        self.push(&[], FlushMode::Finish)?;
        self.sink.write_all(&self.crc.value().to_le_bytes())?;
        self.sink.write_all(&self.size.to_le_bytes())?;
        self.sink.flush()?;
        debug!(
            "gzip trailer: crc={:#010x}, size={}",
            self.crc.value(),
            self.size
        );
        Ok(self.sink)
    }
}

enum SessionState<W: Write> {
    Open(Session<W>),
    Closed,
}

/// Write-only GZIP stream over a sink.
pub struct GzipEncoder<W: Write> {
    state: SessionState<W>,
}

impl GzipEncoder<BufWriter<File>> {
    /// Create `path` (with `.gz` appended when missing) and start a session.
    pub fn create(path: impl AsRef<Path>, options: GzipOptions) -> Result<Self> {
        let path = gz_path(path.as_ref());
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_owned);
        let file = File::create(&path)?;
        Self::new(BufWriter::new(file), name.as_deref(), options)
    }
}

impl GzipEncoder<Stdout> {
    /// Start a session on standard output. No filename is embedded.
    pub fn stdout(options: GzipOptions) -> Result<Self> {
        Self::new(io::stdout(), None, options)
    }
}

impl<W: Write> GzipEncoder<W> {
    /// Start a session on `sink` and write the header.
    ///
    /// `name` is the destination file name; a trailing `.gz` is stripped
    /// before it is embedded.
    pub fn new(mut sink: W, name: Option<&str>, options: GzipOptions) -> Result<Self> {
        let mut header = GzipHeader::new(options.level);
        if options.embed_filename {
            if let Some(name) = name {
                header = header.with_filename(name.strip_suffix(".gz").unwrap_or(name));
            }
        }
        header.write(&mut sink)?;

        debug!(
            "gzip session opened: level {}, window {}",
            options.level, options.window
        );

        Ok(Self {
            state: SessionState::Open(Session {
                deflater: Deflater::new(options.level, options.window),
                crc: Crc32::new(),
                size: 0,
                sink,
                scratch: Vec::new(),
            }),
        })
    }

    fn session(&mut self) -> Result<&mut Session<W>> {
        match &mut self.state {
            SessionState::Open(session) => Ok(session),
            SessionState::Closed => Err(WebgzError::stream_misuse("gzip stream is closed")),
        }
    }

    /// Compress `data` and forward the output to the sink.
    ///
    /// Returns the number of bytes accepted, which is always `data.len()`.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<usize> {
        let session = self.session()?;
        if data.is_empty() {
            return Ok(0);
        }

        session.crc.update(data);
        // ISIZE is the input size modulo 2^32.
        session.size = session.size.wrapping_add(data.len() as u32);
        session.push(data, FlushMode::None)?;
        Ok(data.len())
    }

    /// Compress UTF-8 text.
    pub fn write_str(&mut self, text: &str) -> Result<usize> {
        self.write_bytes(text.as_bytes())
    }

    /// Emit a sync point and flush the sink.
    pub fn flush(&mut self) -> Result<()> {
        let session = self.session()?;
        session.push(&[], FlushMode::Sync)?;
        session.sink.flush()?;
        Ok(())
    }

    /// Write the final block and trailer, then release the sink.
    ///
    /// Closing a closed encoder does nothing.
    pub fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::Open(session) => session.finish().map(drop),
            SessionState::Closed => Ok(()),
        }
    }

    /// Close the stream and return the sink.
    pub fn finish(mut self) -> Result<W> {
        match std::mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::Open(session) => session.finish(),
            SessionState::Closed => Err(WebgzError::stream_misuse("gzip stream is closed")),
        }
    }

    /// Sink of an open stream.
    pub fn get_ref(&self) -> Option<&W> {
        match &self.state {
            SessionState::Open(session) => Some(&session.sink),
            SessionState::Closed => None,
        }
    }

    /// Always false.
    pub fn is_readable(&self) -> bool {
        false
    }

    /// Always false.
    pub fn is_seekable(&self) -> bool {
        false
    }

    /// Whether the stream is still open.
    pub fn is_writable(&self) -> bool {
        matches!(self.state, SessionState::Open(_))
    }
}

impl<W: Write> Write for GzipEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_bytes(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(GzipEncoder::flush(self)?)
    }
}

impl<W: Write> Read for GzipEncoder<W> {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(WebgzError::stream_misuse("gzip encoder is not readable").into())
    }
}

impl<W: Write> Drop for GzipEncoder<W> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("failed to finish gzip stream: {e}");
        }
    }
}

/// `path` with `.gz` appended unless it already ends with it.
pub fn gz_path(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == "gz") {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

/// Compress the file at `input` into `output` in [`CHUNK_SIZE`] pieces.
///
/// Returns the number of bytes read.
pub fn gzip_file(input: impl AsRef<Path>, output: impl AsRef<Path>, options: GzipOptions) -> Result<u64> {
    let mut source = File::open(input.as_ref())?;
    let mut encoder = GzipEncoder::create(output, options)?;
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        encoder.write_bytes(&buf[..n])?;
        total += n as u64;
    }

    encoder.finish()?;
    Ok(total)
}

/// Compress `data` into an in-memory GZIP member without a filename.
pub fn compress(data: &[u8], options: GzipOptions) -> Result<Vec<u8>> {
    let mut encoder = GzipEncoder::new(Vec::new(), None, options)?;
    encoder.write_bytes(data)?;
    encoder.finish()
}
