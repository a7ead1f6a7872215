//! Art-Net DMX ingest
//!
//! Listens for Art-Net OpDmx packets (UDP, port 6454) and copies the
//! configured slice of each frame into the zone targets. Only the latest
//! frame matters: frames are applied in place, never queued, so a burst
//! that outpaces the dispatcher just collapses to its last values.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::{info, trace, warn};

use crate::config::DmxConfig;
use crate::context::BridgeContext;
use crate::error::Result;

/// "Art-Net" + null, the fixed packet header.
const ARTNET_ID: &[u8; 8] = b"Art-Net\0";
/// OpDmx opcode (little-endian on the wire).
const OP_DMX: u16 = 0x5000;
/// Header bytes before the channel data.
const ARTNET_HEADER_LEN: usize = 18;

/// One parsed OpDmx frame, borrowing the channel data from the packet.
#[derive(Debug, PartialEq, Eq)]
pub struct DmxFrame<'a> {
    /// Universe (port-address) the frame belongs to.
    pub universe: u16,
    /// Channel values, up to 512 bytes.
    pub data: &'a [u8],
}

/// Parse an Art-Net OpDmx packet. Anything that is not a well-formed
/// OpDmx packet yields `None`; other opcodes (ArtPoll etc.) are not our
/// business.
pub fn parse_artnet_dmx(packet: &[u8]) -> Option<DmxFrame<'_>> {
    if packet.len() < ARTNET_HEADER_LEN || &packet[0..8] != ARTNET_ID {
        return None;
    }
    let opcode = u16::from_le_bytes([packet[8], packet[9]]);
    if opcode != OP_DMX {
        return None;
    }
    let universe = u16::from_le_bytes([packet[14], packet[15]]);
    let length = usize::from(u16::from_be_bytes([packet[16], packet[17]]));
    let data = packet.get(ARTNET_HEADER_LEN..ARTNET_HEADER_LEN + length)?;
    Some(DmxFrame { universe, data })
}

/// Copy one frame's channels into the zone targets and stamp the DMX
/// activity clock.
pub fn apply_frame(ctx: &BridgeContext, cfg: &DmxConfig, data: &[u8]) {
    let channels = data.get(usize::from(cfg.start_address)..).unwrap_or(&[]);
    ctx.light.lock().apply_frame(channels, Instant::now());
}

/// Receive loop; runs as a tokio task until shutdown.
pub async fn run_dmx_ingest(
    ctx: Arc<BridgeContext>,
    cfg: DmxConfig,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let socket = UdpSocket::bind(&cfg.bind_addr).await?;
    info!(
        "listening for Art-Net on {} (universe {})",
        cfg.bind_addr, cfg.universe
    );

    let mut buf = [0u8; 1024];
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            received = socket.recv_from(&mut buf) => match received {
                Ok((len, _peer)) => {
                    let Some(frame) = parse_artnet_dmx(&buf[..len]) else {
                        trace!("ignoring non-OpDmx packet ({len} bytes)");
                        continue;
                    };
                    if frame.universe != cfg.universe {
                        trace!("ignoring frame for universe {}", frame.universe);
                        continue;
                    }
                    apply_frame(&ctx, &cfg, frame.data);
                }
                Err(e) => {
                    warn!("Art-Net receive error: {e}");
                    tokio::time::sleep(Duration::from_millis(250)).await;
                }
            }
        }
    }
    info!("DMX ingest stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build an OpDmx packet the same way a console would.
    fn artnet_packet(universe: u16, channels: &[u8]) -> Vec<u8> {
        let mut packet = vec![0u8; ARTNET_HEADER_LEN + channels.len()];
        packet[0..8].copy_from_slice(ARTNET_ID);
        packet[8..10].copy_from_slice(&OP_DMX.to_le_bytes());
        packet[10..12].copy_from_slice(&14u16.to_be_bytes()); // protocol version
        packet[14..16].copy_from_slice(&universe.to_le_bytes());
        packet[16..18].copy_from_slice(&(channels.len() as u16).to_be_bytes());
        packet[18..].copy_from_slice(channels);
        packet
    }

    #[test]
    fn test_parse_valid_packet() {
        let packet = artnet_packet(3, &[10, 20, 30, 40, 50, 60]);
        let frame = parse_artnet_dmx(&packet).expect("valid OpDmx");
        assert_eq!(frame.universe, 3);
        assert_eq!(frame.data, &[10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_artnet_dmx(b"not artnet").is_none());
        assert!(parse_artnet_dmx(&[]).is_none());

        // Wrong opcode (ArtPoll).
        let mut packet = artnet_packet(0, &[0; 4]);
        packet[8..10].copy_from_slice(&0x2000u16.to_le_bytes());
        assert!(parse_artnet_dmx(&packet).is_none());

        // Length field larger than the packet.
        let mut packet = artnet_packet(0, &[0; 4]);
        packet[16..18].copy_from_slice(&512u16.to_be_bytes());
        assert!(parse_artnet_dmx(&packet).is_none());
    }

    #[test]
    fn test_apply_frame_honors_start_address() {
        let ctx = BridgeContext::new(6);
        let cfg = DmxConfig {
            start_address: 2,
            ..DmxConfig::default()
        };

        apply_frame(&ctx, &cfg, &[0, 0, 11, 22, 33, 44, 55, 66, 99]);

        let light = ctx.light.lock();
        assert_eq!(light.zones().targets(), vec![11, 22, 33, 44, 55, 66]);
        assert!(light.last_dmx().is_some());
    }

    #[test]
    fn test_apply_frame_out_of_range_start() {
        let ctx = BridgeContext::new(6);
        let cfg = DmxConfig {
            start_address: 500,
            ..DmxConfig::default()
        };

        apply_frame(&ctx, &cfg, &[1, 2, 3]);
        assert_eq!(ctx.light.lock().zones().targets(), vec![0; 6]);
    }
}
