use crate::error::CaptureError;
use chrono::{DateTime, TimeZone, Utc};
use pcap::{Activated, Active, Capture, Offline};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Big enough for a full Ethernet frame plus a VLAN tag.
pub const DEFAULT_SNAPLEN: i32 = 1600;

/// How often a live capture with a stop flag wakes up to look at it.
pub const STOP_POLL_MS: i32 = 250;

/// Link layer of a captured frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkType {
    Ethernet,
    /// Linux cooked capture, what libpcap hands out for the `any` device.
    LinuxSll,
    Other(i32),
}

impl LinkType {
    /// Whether the ARP classifier knows how to find ARP inside this link layer.
    pub fn is_decodable(self) -> bool {
        match self {
            LinkType::Ethernet | LinkType::LinuxSll => true,
            LinkType::Other(_) => false,
        }
    }
}

impl From<pcap::Linktype> for LinkType {
    fn from(linktype: pcap::Linktype) -> Self {
        match linktype.0 {
            1 => LinkType::Ethernet,
            113 => LinkType::LinuxSll,
            other => LinkType::Other(other),
        }
    }
}

/// One captured packet, copied out of the capture buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub data: Vec<u8>,
    pub link_type: LinkType,
    pub timestamp: DateTime<Utc>,
}

impl Frame {
    pub fn new(data: Vec<u8>, link_type: LinkType, timestamp: DateTime<Utc>) -> Self {
        Frame {
            data,
            link_type,
            timestamp,
        }
    }

    pub fn ethernet(data: Vec<u8>, timestamp: DateTime<Utc>) -> Self {
        Frame::new(data, LinkType::Ethernet, timestamp)
    }
}

/// A device libpcap can capture on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub description: Option<String>,
}

/// Lists the devices available for live capture.
pub fn interfaces() -> Result<Vec<Interface>, CaptureError> {
    let devices = pcap::Device::list().map_err(CaptureError::List)?;
    Ok(devices
        .into_iter()
        .map(|device| Interface {
            name: device.name,
            description: device.desc,
        })
        .collect())
}

/// Settings for opening a live capture.
#[derive(Clone, Debug)]
pub struct CaptureConfig {
    device: String,
    snaplen: i32,
    promisc: bool,
    stop: Option<Arc<AtomicBool>>,
}

impl CaptureConfig {
    pub fn new(device: impl Into<String>) -> Self {
        CaptureConfig {
            device: device.into(),
            snaplen: DEFAULT_SNAPLEN,
            promisc: true,
            stop: None,
        }
    }

    pub fn snaplen(mut self, snaplen: i32) -> Self {
        self.snaplen = snaplen;
        self
    }

    pub fn promisc(mut self, promisc: bool) -> Self {
        self.promisc = promisc;
        self
    }

    /// Ends the capture once `stop` is set. Without a stop flag the read blocks until a packet
    /// arrives; with one it wakes every `STOP_POLL_MS` to check the flag.
    pub fn stop_on(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    fn read_timeout(&self) -> i32 {
        if self.stop.is_some() {
            STOP_POLL_MS
        } else {
            0
        }
    }
}

/// A lazy, non-restartable sequence of frames from a pcap handle.
///
/// Iterating yields `Ok(Frame)` for each packet. A read failure is yielded once as `Err` and then the
/// sequence ends; a savefile ends at end of file, and any source ends once its stop flag is set. The
/// handle is closed when the source is dropped, whichever way the consuming loop exits.
pub struct CaptureSource<T: Activated + ?Sized> {
    description: String,
    capture: Capture<T>,
    link_type: LinkType,
    stop: Option<Arc<AtomicBool>>,
    finished: bool,
}

impl CaptureSource<Active> {
    /// Opens `config.device()` for live capture.
    pub fn live(config: &CaptureConfig) -> Result<Self, CaptureError> {
        let open_error = |source| CaptureError::Open {
            device: config.device.clone(),
            source,
        };
        let capture = Capture::from_device(config.device.as_str())
            .map_err(open_error)?
            .promisc(config.promisc)
            .snaplen(config.snaplen)
            .timeout(config.read_timeout())
            // deliver each packet as it arrives instead of waiting for a full kernel buffer
            .immediate_mode(true)
            .open()
            .map_err(open_error)?;

        info!(
            device = config.device.as_str(),
            snaplen = config.snaplen,
            promisc = config.promisc,
            "opened live capture"
        );
        let source = CaptureSource::from_capture(config.device.clone(), capture);
        Ok(match &config.stop {
            Some(stop) => source.stop_on(Arc::clone(stop)),
            None => source,
        })
    }
}

impl CaptureSource<Offline> {
    /// Replays a pcap or pcapng savefile in file order.
    pub fn offline<P: AsRef<Path>>(path: P) -> Result<Self, CaptureError> {
        let description = path.as_ref().display().to_string();
        let capture = Capture::from_file(path.as_ref()).map_err(|source| CaptureError::Open {
            device: description.clone(),
            source,
        })?;

        info!(file = description.as_str(), "opened savefile");
        Ok(CaptureSource::from_capture(description, capture))
    }
}

impl<T: Activated + ?Sized> CaptureSource<T> {
    fn from_capture(description: String, capture: Capture<T>) -> Self {
        let link_type = LinkType::from(capture.get_datalink());
        if !link_type.is_decodable() {
            warn!(
                source = description.as_str(),
                link_type = ?link_type,
                "link type carries no decodable ARP, no devices will be reported"
            );
        }
        CaptureSource {
            description,
            capture,
            link_type,
            stop: None,
            finished: false,
        }
    }

    /// Ends the sequence at the next read once `stop` is set.
    pub fn stop_on(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .map_or(false, |stop| stop.load(Ordering::Relaxed))
    }

    /// The interface name or savefile path this source reads from.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn link_type(&self) -> LinkType {
        self.link_type
    }
}

impl<T: Activated + ?Sized> Iterator for CaptureSource<T> {
    type Item = Result<Frame, CaptureError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            if self.stop_requested() {
                info!(source = self.description.as_str(), "capture stopped");
                self.finished = true;
                return None;
            }
            match self.capture.next_packet() {
                Ok(packet) => {
                    let ts = packet.header.ts;
                    // time_t and suseconds_t are signed, but a capture timestamp never is
                    let timestamp = to_datetime(ts.tv_sec as i64, ts.tv_usec as u32);
                    let data: Vec<u8> = packet.data.into();
                    return Some(Ok(Frame::new(data, self.link_type, timestamp)));
                }
                Err(pcap::Error::TimeoutExpired) => continue,
                Err(pcap::Error::NoMorePackets) => {
                    self.finished = true;
                    return None;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(CaptureError::Read(e)));
                }
            }
        }
    }
}

fn to_datetime(secs: i64, micros: u32) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, micros.saturating_mul(1000))
        .single()
        .unwrap_or_else(Utc::now)
}
