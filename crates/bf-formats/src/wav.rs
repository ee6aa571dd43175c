//! WAV encoding and decoding for PCM audio.
//!
//! Decoding accepts 8/16-bit PCM, mono or stereo, and always emits
//! frame-major f32 stereo (mono sources are duplicated onto both
//! channels). Encoding writes 16-bit stereo PCM with sample clamping.

use bf_ir::{Frame, StereoBuffer};
use std::io::Write;

/// Error type for format parsing.
#[derive(Debug)]
pub enum FormatError {
    /// Invalid file header or magic bytes
    InvalidHeader,
    /// Unexpected end of file
    UnexpectedEof,
    /// PCM layout this decoder does not handle
    Unsupported(String),
    /// I/O error
    Io(String),
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::InvalidHeader => write!(f, "invalid WAV header"),
            FormatError::UnexpectedEof => write!(f, "unexpected end of file"),
            FormatError::Unsupported(what) => write!(f, "unsupported WAV layout: {}", what),
            FormatError::Io(msg) => write!(f, "i/o error: {}", msg),
        }
    }
}

impl std::error::Error for FormatError {}

impl From<std::io::Error> for FormatError {
    fn from(e: std::io::Error) -> Self {
        FormatError::Io(e.to_string())
    }
}

// --- Writing ---

/// Write a buffer as a 16-bit stereo PCM WAV stream.
pub fn write_wav(
    w: &mut impl Write,
    buffer: &StereoBuffer,
    sample_rate: u32,
) -> std::io::Result<()> {
    let num_channels: u16 = 2;
    let bits_per_sample: u16 = 16;
    let block_align = num_channels * (bits_per_sample / 8);
    let data_size = buffer.len() as u32 * block_align as u32;

    write_riff_header(w, data_size)?;
    write_fmt_chunk(w, num_channels, sample_rate, block_align, bits_per_sample)?;
    write_data_chunk(w, buffer, data_size)
}

/// Encode a buffer into an in-memory WAV file.
pub fn encode_wav(buffer: &StereoBuffer, sample_rate: u32) -> Vec<u8> {
    let mut out = Vec::new();
    write_wav(&mut out, buffer, sample_rate).expect("Vec<u8> write cannot fail");
    out
}

fn write_riff_header(w: &mut impl Write, data_size: u32) -> std::io::Result<()> {
    w.write_all(b"RIFF")?;
    w.write_all(&(36 + data_size).to_le_bytes())?;
    w.write_all(b"WAVE")
}

fn write_fmt_chunk(
    w: &mut impl Write,
    num_channels: u16,
    sample_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
) -> std::io::Result<()> {
    w.write_all(b"fmt ")?;
    w.write_all(&16u32.to_le_bytes())?;
    w.write_all(&1u16.to_le_bytes())?;
    w.write_all(&num_channels.to_le_bytes())?;
    w.write_all(&sample_rate.to_le_bytes())?;
    w.write_all(&(sample_rate * block_align as u32).to_le_bytes())?;
    w.write_all(&block_align.to_le_bytes())?;
    w.write_all(&bits_per_sample.to_le_bytes())
}

fn write_data_chunk(
    w: &mut impl Write,
    buffer: &StereoBuffer,
    data_size: u32,
) -> std::io::Result<()> {
    w.write_all(b"data")?;
    w.write_all(&data_size.to_le_bytes())?;
    for frame in buffer.frames() {
        w.write_all(&sample_to_i16(frame.left).to_le_bytes())?;
        w.write_all(&sample_to_i16(frame.right).to_le_bytes())?;
    }
    Ok(())
}

fn sample_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0).round() as i16
}

// --- Reading ---

/// Decode a WAV file from raw bytes into a frame-major stereo buffer plus
/// its native sample rate.
pub fn decode_wav(data: &[u8]) -> Result<(StereoBuffer, u32), FormatError> {
    let header = parse_header(data)?;
    let buffer = read_pcm_data(data, &header)?;
    Ok((buffer, header.sample_rate))
}

struct WavHeader {
    num_channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
    data_offset: usize,
    data_size: usize,
}

fn parse_header(data: &[u8]) -> Result<WavHeader, FormatError> {
    if data.len() < 44 {
        return Err(FormatError::UnexpectedEof);
    }
    if &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return Err(FormatError::InvalidHeader);
    }

    let mut pos = 12;
    let mut fmt: Option<(u16, u32, u16)> = None;
    let mut data_chunk: Option<(usize, usize)> = None;

    while pos + 8 <= data.len() {
        let chunk_id = &data[pos..pos + 4];
        let chunk_size = read_u32_le(data, pos + 4) as usize;

        if chunk_id == b"fmt " && chunk_size >= 16 {
            let format = read_u16_le(data, pos + 8);
            if format != 1 {
                return Err(FormatError::Unsupported(format!("format tag {}", format)));
            }
            let channels = read_u16_le(data, pos + 10);
            let rate = read_u32_le(data, pos + 12);
            let bits = read_u16_le(data, pos + 22);
            fmt = Some((channels, rate, bits));
        } else if chunk_id == b"data" {
            data_chunk = Some((pos + 8, chunk_size));
        }

        pos += 8 + chunk_size;
        if pos % 2 != 0 {
            pos += 1;
        }
    }

    let (num_channels, sample_rate, bits_per_sample) = fmt.ok_or(FormatError::InvalidHeader)?;
    let (data_offset, data_size) = data_chunk.ok_or(FormatError::InvalidHeader)?;

    if bits_per_sample != 8 && bits_per_sample != 16 {
        return Err(FormatError::Unsupported(format!("{}-bit samples", bits_per_sample)));
    }
    if !(1..=2).contains(&num_channels) {
        return Err(FormatError::Unsupported(format!("{} channels", num_channels)));
    }

    Ok(WavHeader { num_channels, sample_rate, bits_per_sample, data_offset, data_size })
}

fn read_pcm_data(data: &[u8], header: &WavHeader) -> Result<StereoBuffer, FormatError> {
    let end = (header.data_offset + header.data_size).min(data.len());
    let raw = &data[header.data_offset..end];

    let frames = match (header.bits_per_sample, header.num_channels) {
        (8, 1) => raw.iter().map(|&b| Frame::mono(sample_from_u8(b))).collect(),
        (8, 2) => raw
            .chunks_exact(2)
            .map(|c| Frame { left: sample_from_u8(c[0]), right: sample_from_u8(c[1]) })
            .collect(),
        (16, 1) => raw
            .chunks_exact(2)
            .map(|c| Frame::mono(sample_from_i16(i16::from_le_bytes([c[0], c[1]]))))
            .collect(),
        (16, 2) => raw
            .chunks_exact(4)
            .map(|c| Frame {
                left: sample_from_i16(i16::from_le_bytes([c[0], c[1]])),
                right: sample_from_i16(i16::from_le_bytes([c[2], c[3]])),
            })
            .collect(),
        (bits, channels) => {
            return Err(FormatError::Unsupported(format!("{}-bit {}ch", bits, channels)))
        }
    };
    Ok(StereoBuffer::from_frames(frames))
}

/// WAV 8-bit PCM is unsigned with center 128.
fn sample_from_u8(byte: u8) -> f32 {
    (byte as f32 - 128.0) / 128.0
}

fn sample_from_i16(value: i16) -> f32 {
    value as f32 / 32768.0
}

fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}
