use std::fs::File;
use std::io::{BufReader, Read};
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::path::Path;

use hound::{SampleFormat, WavReader};
use num_complex::Complex64;
use tracing::{debug, warn};

use crate::config::SampleSourceConfig;
use crate::{Error, Result};

/// Sample rate every source must provide.
pub const SAMPLE_RATE: u32 = 48_000;

/// Real samples are fed to the demodulator on both the I and Q inputs.
fn to_complex(v: i16) -> Complex64 {
    let v = f64::from(v);
    Complex64::new(v, v)
}

/// Reads 48 kHz, 16-bit, mono WAV data in buffers of [WavSource::BUFFER_LEN]
/// samples.
///
/// Iteration ends at end of file. A read error also ends it and is logged.
pub struct WavSource<R: Read> {
    reader: WavReader<R>,
    done: bool,
}

impl WavSource<BufReader<File>> {
    /// # Errors
    /// If the file cannot be read as WAV, or is not 48 kHz, 16-bit mono.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(WavReader::open(path)?)
    }
}

impl<R: Read> WavSource<R> {
    pub const BUFFER_LEN: usize = 2048;

    /// # Errors
    /// [Error::Config] if the audio is not 48 kHz, 16-bit integer mono.
    pub fn new(reader: WavReader<R>) -> Result<Self> {
        let spec = reader.spec();
        if spec.channels != 1 || spec.sample_rate != SAMPLE_RATE {
            return Err(Error::Config(format!(
                "wav must be 48k, 1 channel; got {} Hz, {} channels",
                spec.sample_rate, spec.channels
            )));
        }
        if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(Error::Config(format!(
                "wav must be 16-bit integer samples; got {} bit {:?}",
                spec.bits_per_sample, spec.sample_format
            )));
        }
        debug!(duration = reader.duration(), "opened wav source");
        Ok(WavSource {
            reader,
            done: false,
        })
    }
}

impl<R: Read> Iterator for WavSource<R> {
    type Item = Vec<Complex64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut buf = Vec::with_capacity(Self::BUFFER_LEN);
        for sample in self.reader.samples::<i16>().take(Self::BUFFER_LEN) {
            match sample {
                Ok(v) => buf.push(to_complex(v)),
                Err(err) => {
                    warn!("wav read failed, ending samples: {err}");
                    self.done = true;
                    break;
                }
            }
        }
        if buf.is_empty() {
            self.done = true;
            return None;
        }
        Some(buf)
    }
}

/// Receives little-endian `i16` samples over UDP, as sent by gqrx.
///
/// A zero-length datagram or a receive error ends iteration.
pub struct UdpSampleSource {
    socket: UdpSocket,
    buf: Vec<u8>,
    done: bool,
}

impl UdpSampleSource {
    /// Receive buffer size in bytes, 2048 samples.
    pub const BUFFER_LEN: usize = 4096;

    /// # Errors
    /// If the socket cannot be bound.
    pub fn bind(port: u16) -> Result<Self> {
        Self::bind_addr((Ipv4Addr::UNSPECIFIED, port).into())
    }

    /// # Errors
    /// If the socket cannot be bound.
    pub fn bind_addr(addr: SocketAddr) -> Result<Self> {
        Ok(UdpSampleSource {
            socket: UdpSocket::bind(addr)?,
            buf: vec![0u8; Self::BUFFER_LEN],
            done: false,
        })
    }

    /// # Errors
    /// If the local address cannot be determined.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

impl Iterator for UdpSampleSource {
    type Item = Vec<Complex64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let len = match self.socket.recv(&mut self.buf) {
            Ok(len) => len,
            Err(err) => {
                warn!("sample receive failed, ending samples: {err}");
                self.done = true;
                return None;
            }
        };
        // a trailing odd byte is not a whole sample
        let samples: Vec<Complex64> = self.buf[..len]
            .chunks_exact(2)
            .map(|b| to_complex(i16::from_le_bytes([b[0], b[1]])))
            .collect();
        if samples.is_empty() {
            debug!("end of samples");
            self.done = true;
            return None;
        }
        Some(samples)
    }
}

/// Open the sample source described by `config`.
///
/// # Errors
/// If the source cannot be opened.
pub fn open_source(
    config: &SampleSourceConfig,
) -> Result<Box<dyn Iterator<Item = Vec<Complex64>>>> {
    Ok(match config {
        SampleSourceConfig::File(path) => Box::new(WavSource::open(path)?),
        SampleSourceConfig::Udp { port } => Box::new(UdpSampleSource::bind(*port)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    fn write_wav(path: &Path, sample_rate: u32, channels: u16, count: usize) {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for i in 0..count {
            writer.write_sample(i as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn wav_source_buffers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.wav");
        write_wav(&path, SAMPLE_RATE, 1, 5000);

        let buffers: Vec<Vec<Complex64>> = WavSource::open(&path).unwrap().collect();
        let lens: Vec<usize> = buffers.iter().map(Vec::len).collect();
        assert_eq!(lens, vec![2048, 2048, 904]);
        assert_eq!(buffers[0][3], Complex64::new(3.0, 3.0));
        assert_eq!(buffers[2][0], Complex64::new(4096.0, 4096.0));
    }

    #[test]
    fn wav_source_rejects_wrong_format() {
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("rate.wav");
        write_wav(&path, 44_100, 1, 10);
        assert!(matches!(WavSource::open(&path), Err(Error::Config(_))));

        let path = dir.path().join("stereo.wav");
        write_wav(&path, SAMPLE_RATE, 2, 10);
        assert!(matches!(WavSource::open(&path), Err(Error::Config(_))));
    }

    #[test]
    fn open_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.wav");
        write_wav(&path, SAMPLE_RATE, 1, 3000);

        let source = open_source(&SampleSourceConfig::File(path)).unwrap();
        let lens: Vec<usize> = source.map(|b| b.len()).collect();
        assert_eq!(lens, vec![2048, 952]);

        let missing = SampleSourceConfig::File(dir.path().join("missing.wav"));
        assert!(matches!(open_source(&missing), Err(Error::Wav(_))));
    }

    #[test]
    fn open_udp_source() {
        let source = open_source(&SampleSourceConfig::Udp { port: 0 });
        assert!(source.is_ok());
    }

    #[test]
    fn udp_samples() {
        let mut source = UdpSampleSource::bind_addr((Ipv4Addr::LOCALHOST, 0).into()).unwrap();
        let dest = source.local_addr().unwrap();
        let tx = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();

        tx.send_to(&[0x01, 0x00, 0xff, 0xff, 0x07], dest).unwrap();
        tx.send_to(&[], dest).unwrap();

        assert_eq!(
            source.next(),
            Some(vec![Complex64::new(1.0, 1.0), Complex64::new(-1.0, -1.0)])
        );
        assert_eq!(source.next(), None);
        assert_eq!(source.next(), None);
    }
}
