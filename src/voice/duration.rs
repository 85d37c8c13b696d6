//! Container-level duration probing for voice-note files.
//!
//! Only headers and a bounded tail window are read; audio data is never
//! decoded. Supported containers:
//!
//! | Container | Source of duration |
//! |-----------|--------------------|
//! | WAV (RIFF) | `data` chunk size / `fmt ` byte rate |
//! | Ogg (Opus, Vorbis) | last page granule position / sample rate |
//! | MP4 / M4A | `moov/mvhd` duration / timescale |
//! | MP3 | Xing/Info frame count, else constant-bitrate estimate |
//!
//! Unknown or malformed containers yield `Ok(None)`; only I/O failures are
//! errors.

use std::io::{self, Read, Seek, SeekFrom};

/// Tail window scanned for the final Ogg page.
const OGG_TAIL_WINDOW: u64 = 64 * 1024;
/// Window scanned for the first MP3 frame after any ID3 tag.
const MP3_SYNC_WINDOW: usize = 16 * 1024;
/// Opus granule positions always count 48 kHz samples.
const OPUS_GRANULE_RATE: u64 = 48_000;

/// Layer III bitrates in kbps, by header index.
const BITRATES_V1: [u32; 15] = [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320];
const BITRATES_V2: [u32; 15] = [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160];

/// Detected container kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Wav,
    Ogg,
    Mp4,
    Mp3,
    Unknown,
}

/// Identifies the container from its leading bytes.
pub fn sniff(header: &[u8]) -> Container {
    if header.len() >= 12 && &header[..4] == b"RIFF" && &header[8..12] == b"WAVE" {
        Container::Wav
    } else if header.starts_with(b"OggS") {
        Container::Ogg
    } else if header.len() >= 8 && &header[4..8] == b"ftyp" {
        Container::Mp4
    } else if header.starts_with(b"ID3")
        || (header.len() >= 2 && header[0] == 0xFF && header[1] & 0xE0 == 0xE0)
    {
        Container::Mp3
    } else {
        Container::Unknown
    }
}

/// Probes the duration of `source` in milliseconds.
pub fn probe_duration_ms<R: Read + Seek>(source: &mut R) -> io::Result<Option<u64>> {
    let len = source.seek(SeekFrom::End(0))?;
    source.seek(SeekFrom::Start(0))?;
    let mut header = [0u8; 12];
    let n = read_up_to(source, &mut header)?;

    let duration = match sniff(&header[..n]) {
        Container::Wav => wav_duration(source)?,
        Container::Ogg => ogg_duration(source, len)?,
        Container::Mp4 => mp4_duration(source, len)?,
        Container::Mp3 => mp3_duration(source, len)?,
        Container::Unknown => None,
    };
    Ok(duration)
}

fn read_up_to<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn le_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn be_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

fn be_u64(b: &[u8]) -> u64 {
    u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

fn wav_duration<R: Read + Seek>(source: &mut R) -> io::Result<Option<u64>> {
    source.seek(SeekFrom::Start(12))?;
    let mut byte_rate: Option<u32> = None;
    let mut chunk = [0u8; 8];

    loop {
        if read_up_to(source, &mut chunk)? < 8 {
            return Ok(None);
        }
        let size = le_u32(&chunk[4..8]);
        match &chunk[..4] {
            b"fmt " => {
                let mut fmt = [0u8; 16];
                if read_up_to(source, &mut fmt)? < 16 {
                    return Ok(None);
                }
                byte_rate = Some(le_u32(&fmt[8..12]));
                // Skip the remainder of the chunk, plus its pad byte.
                let rest = i64::from(size.saturating_sub(16)) + i64::from(size & 1);
                source.seek(SeekFrom::Current(rest))?;
            }
            b"data" => {
                return Ok(byte_rate
                    .filter(|&rate| rate > 0)
                    .map(|rate| u64::from(size) * 1000 / u64::from(rate)));
            }
            _ => {
                source.seek(SeekFrom::Current(i64::from(size) + i64::from(size & 1)))?;
            }
        }
    }
}

/// Sample rate and pre-skip from the first Ogg page's identification header.
fn ogg_stream_info(page: &[u8]) -> Option<(u64, u64)> {
    if page.len() < 27 {
        return None;
    }
    let segments = usize::from(page[26]);
    let payload = page.get(27 + segments..)?;
    if payload.starts_with(b"OpusHead") && payload.len() >= 12 {
        let pre_skip = u64::from(u16::from_le_bytes([payload[10], payload[11]]));
        Some((OPUS_GRANULE_RATE, pre_skip))
    } else if payload.starts_with(b"\x01vorbis") && payload.len() >= 16 {
        let rate = u64::from(le_u32(&payload[12..16]));
        (rate > 0).then_some((rate, 0))
    } else {
        None
    }
}

fn ogg_duration<R: Read + Seek>(source: &mut R, len: u64) -> io::Result<Option<u64>> {
    source.seek(SeekFrom::Start(0))?;
    let mut first = [0u8; 27 + 255 + 64];
    let n = read_up_to(source, &mut first)?;
    let Some((rate, pre_skip)) = ogg_stream_info(&first[..n]) else {
        return Ok(None);
    };

    let window = len.min(OGG_TAIL_WINDOW);
    source.seek(SeekFrom::Start(len - window))?;
    let mut tail = vec![0u8; usize::try_from(window).unwrap_or(usize::MAX)];
    let n = read_up_to(source, &mut tail)?;
    tail.truncate(n);

    // Last page with a real granule position.
    let granule = tail
        .windows(4)
        .enumerate()
        .rev()
        .filter(|(_, w)| *w == b"OggS")
        .filter_map(|(i, _)| tail.get(i + 6..i + 14))
        .map(|g| u64::from_le_bytes([g[0], g[1], g[2], g[3], g[4], g[5], g[6], g[7]]))
        .find(|&g| g != u64::MAX);

    // A granule this large is corrupt, not a real duration.
    Ok(granule
        .and_then(|g| g.saturating_sub(pre_skip).checked_mul(1000))
        .map(|samples_ms| samples_ms / rate))
}

fn mp4_duration<R: Read + Seek>(source: &mut R, len: u64) -> io::Result<Option<u64>> {
    let Some((moov_start, moov_end)) = find_box(source, 0, len, b"moov")? else {
        return Ok(None);
    };
    let Some((mvhd_start, _)) = find_box(source, moov_start, moov_end, b"mvhd")? else {
        return Ok(None);
    };

    source.seek(SeekFrom::Start(mvhd_start))?;
    let mut body = [0u8; 32];
    let n = read_up_to(source, &mut body)?;
    let (timescale, duration) = match (body[0], n) {
        (0, n) if n >= 20 => (u64::from(be_u32(&body[12..16])), u64::from(be_u32(&body[16..20]))),
        (1, n) if n >= 32 => (u64::from(be_u32(&body[20..24])), be_u64(&body[24..32])),
        _ => return Ok(None),
    };
    if timescale == 0 {
        return Ok(None);
    }
    Ok(Some(duration.saturating_mul(1000) / timescale))
}

/// Finds a child box of `kind` in `[start, end)`; returns its body range.
fn find_box<R: Read + Seek>(
    source: &mut R,
    start: u64,
    end: u64,
    kind: &[u8; 4],
) -> io::Result<Option<(u64, u64)>> {
    let mut offset = start;
    let mut header = [0u8; 16];
    while offset + 8 <= end {
        source.seek(SeekFrom::Start(offset))?;
        if read_up_to(source, &mut header[..8])? < 8 {
            return Ok(None);
        }
        let (size, header_len) = match be_u32(&header[..4]) {
            0 => (end - offset, 8),
            1 => {
                if read_up_to(source, &mut header[8..16])? < 8 {
                    return Ok(None);
                }
                (be_u64(&header[8..16]), 16)
            }
            size => (u64::from(size), 8),
        };
        let Some(box_end) = offset.checked_add(size).filter(|&e| e <= end) else {
            return Ok(None);
        };
        if size < header_len {
            return Ok(None);
        }
        if &header[4..8] == kind {
            return Ok(Some((offset + header_len, box_end)));
        }
        offset = box_end;
    }
    Ok(None)
}

/// Parsed MPEG audio frame header (Layer III only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameHeader {
    mpeg1: bool,
    mono: bool,
    bitrate_kbps: u32,
    sample_rate: u32,
}

impl FrameHeader {
    fn parse(b: &[u8]) -> Option<Self> {
        if b.len() < 4 || b[0] != 0xFF || b[1] & 0xE0 != 0xE0 {
            return None;
        }
        let version = (b[1] >> 3) & 0b11;
        let layer = (b[1] >> 1) & 0b11;
        if version == 0b01 || layer != 0b01 {
            return None;
        }
        let mpeg1 = version == 0b11;

        let bitrate_index = usize::from(b[2] >> 4);
        let rate_index = usize::from((b[2] >> 2) & 0b11);
        if bitrate_index == 0 || bitrate_index == 15 || rate_index == 3 {
            return None;
        }

        let base_rate = [44_100, 48_000, 32_000][rate_index];
        let sample_rate = match version {
            0b11 => base_rate,
            0b10 => base_rate / 2,
            _ => base_rate / 4,
        };
        let bitrate_kbps = if mpeg1 {
            BITRATES_V1[bitrate_index]
        } else {
            BITRATES_V2[bitrate_index]
        };

        Some(Self {
            mpeg1,
            mono: b[3] >> 6 == 0b11,
            bitrate_kbps,
            sample_rate,
        })
    }

    fn samples_per_frame(self) -> u64 {
        if self.mpeg1 { 1152 } else { 576 }
    }

    /// Offset of a Xing/Info tag from the frame start.
    fn xing_offset(self) -> usize {
        4 + match (self.mpeg1, self.mono) {
            (true, false) => 32,
            (true, true) | (false, false) => 17,
            (false, true) => 9,
        }
    }
}

fn mp3_duration<R: Read + Seek>(source: &mut R, len: u64) -> io::Result<Option<u64>> {
    source.seek(SeekFrom::Start(0))?;
    let mut id3 = [0u8; 10];
    let mut audio_start = 0u64;
    if read_up_to(source, &mut id3)? == 10 && id3.starts_with(b"ID3") {
        let size = id3[6..10]
            .iter()
            .fold(0u64, |acc, &b| (acc << 7) | u64::from(b & 0x7F));
        let footer = if id3[5] & 0x10 != 0 { 10 } else { 0 };
        audio_start = 10 + size + footer;
    }

    source.seek(SeekFrom::Start(audio_start))?;
    let mut window = vec![0u8; MP3_SYNC_WINDOW];
    let n = read_up_to(source, &mut window)?;
    window.truncate(n);

    let Some((frame_offset, frame)) = (0..window.len().saturating_sub(3))
        .find_map(|i| FrameHeader::parse(&window[i..]).map(|h| (i, h)))
    else {
        return Ok(None);
    };

    let xing = frame_offset + frame.xing_offset();
    if let Some(tag) = window.get(xing..xing + 12) {
        if &tag[..4] == b"Xing" || &tag[..4] == b"Info" {
            let flags = be_u32(&tag[4..8]);
            if flags & 0x1 != 0 {
                let frames = u64::from(be_u32(&tag[8..12]));
                return Ok(Some(
                    frames * frame.samples_per_frame() * 1000 / u64::from(frame.sample_rate),
                ));
            }
        }
    }

    let audio_bytes = len.saturating_sub(audio_start + frame_offset as u64);
    Ok(Some(audio_bytes.saturating_mul(8) / u64::from(frame.bitrate_kbps)))
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn probe(bytes: Vec<u8>) -> Option<u64> {
        probe_duration_ms(&mut Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_sniff() {
        assert_eq!(sniff(&fixtures::wav(0)), Container::Wav);
        assert_eq!(sniff(b"OggS\0\0"), Container::Ogg);
        assert_eq!(sniff(b"\0\0\0\x18ftypM4A "), Container::Mp4);
        assert_eq!(sniff(b"ID3\x04"), Container::Mp3);
        assert_eq!(sniff(b"hello"), Container::Unknown);
    }

    #[test]
    fn test_wav_duration() {
        assert_eq!(probe(fixtures::wav(3)), Some(3_000));
    }

    #[test]
    fn test_opus_duration() {
        assert_eq!(probe(fixtures::opus(4_250)), Some(4_250));
    }

    #[test]
    fn test_opus_oversized_granule_is_unknown() {
        assert_eq!(probe(fixtures::opus_with_granule(u64::MAX - 1)), None);
        assert_eq!(probe(fixtures::opus_with_granule(u64::MAX / 10)), None);
    }

    #[test]
    fn test_m4a_duration() {
        assert_eq!(probe(fixtures::m4a(1_000, 12_500)), Some(12_500));
    }

    #[test]
    fn test_mp3_cbr_estimate() {
        // 100 frames of 1152 samples at 44.1 kHz is about 2.6 s.
        let ms = probe(fixtures::mp3_cbr(100)).unwrap();
        assert!((2_550..=2_700).contains(&ms), "got {ms}");
    }

    #[test]
    fn test_unknown_and_truncated() {
        assert_eq!(probe(b"not audio at all".to_vec()), None);
        assert_eq!(probe(b"RIFF\0\0\0\0WAVE".to_vec()), None);
        assert_eq!(probe(b"OggS".to_vec()), None);
        assert_eq!(probe(Vec::new()), None);
    }
}
