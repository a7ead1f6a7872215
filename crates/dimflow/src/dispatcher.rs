//! Write loop, resync scheduler and panel event handling
//!
//! The dispatcher is the only thing that writes zone commands: it diffs
//! the zone targets against what was last sent and pushes the difference
//! through the [`CommandSink`]. A fixed sleep between passes bounds the
//! command rate; the QSE interface does not tolerate being flooded.
//!
//! There is deliberately no per-command retry. A failed write is logged
//! and left to the resync scheduler, which forces a full re-send of every
//! zone on a fixed interval and so heals any dropped command within one
//! interval.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use dimflow_core::codec::{self, PanelEvent};
use dimflow_core::{plan_writes, percent_to_level};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

use crate::context::BridgeContext;
use crate::mqtt::StatePublisher;
use crate::panel::CommandSink;

/// Sleep between dispatcher passes.
const DISPATCH_INTERVAL: Duration = Duration::from_millis(100);
/// Longer sleep while the panel override has control disabled.
const DISABLED_POLL: Duration = Duration::from_millis(500);
/// How often a full resync of all zones is forced.
const RESYNC_INTERVAL: Duration = Duration::from_secs(10);

/// Run one dispatcher pass: snapshot, diff, write. Returns the number of
/// commands sent. Does nothing while control is disabled; in particular a
/// pending resync is left for when control comes back.
pub fn dispatch_pass<S: CommandSink>(ctx: &BridgeContext, sink: &mut S) -> usize {
    if ctx.disabled() {
        return 0;
    }

    let resend_all = ctx.take_resend();
    let plan = {
        let light = ctx.light.lock();
        plan_writes(light.zones(), resend_all)
    };

    let mut sent = 0;
    for write in plan {
        let command = codec::encode_set_zone(write.zone, write.level);
        debug!(zone = write.zone, level = write.level, "sending {}", command.trim_end());
        match sink.send_line(&command) {
            Ok(()) => {
                ctx.light.lock().zones_mut().mark_sent(write.zone, write.level);
                sent += 1;
            }
            Err(e) => {
                // Repaired by the next resync pass.
                warn!(zone = write.zone, "panel write failed: {e}");
            }
        }
    }
    sent
}

/// Blocking dispatcher loop; runs on its own thread until shutdown.
pub fn run_dispatcher<S: CommandSink>(
    ctx: Arc<BridgeContext>,
    mut sink: S,
    shutdown: watch::Receiver<bool>,
) {
    info!("dispatcher started");
    while !*shutdown.borrow() {
        dispatch_pass(&ctx, &mut sink);
        let pause = if ctx.disabled() {
            DISABLED_POLL
        } else {
            DISPATCH_INTERVAL
        };
        thread::sleep(pause);
    }
    info!("dispatcher stopped");
}

/// Resync scheduler: forces a full re-send of all zones every interval.
pub async fn run_resync(ctx: Arc<BridgeContext>, mut shutdown: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval(RESYNC_INTERVAL);
    // The first tick fires immediately and startup already resends.
    interval.tick().await;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                trace!("forcing full zone resync");
                ctx.request_resend();
            }
            _ = shutdown.changed() => break,
        }
    }
}

/// Panel event handler task: consumes decoded lines from the reader
/// thread and applies their state effects.
pub async fn run_panel_events(
    ctx: Arc<BridgeContext>,
    mut events: mpsc::Receiver<PanelEvent>,
    publisher: StatePublisher,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            event = events.recv() => match event {
                Some(event) => handle_panel_event(&ctx, event, &publisher).await,
                None => break,
            }
        }
    }
    info!("panel event handler stopped");
}

async fn handle_panel_event(ctx: &BridgeContext, event: PanelEvent, publisher: &StatePublisher) {
    match event {
        PanelEvent::Button(codec::BUTTON_DISABLE) => {
            info!("panel override: control disabled");
            ctx.set_disabled(true);
        }
        PanelEvent::Button(codec::BUTTON_ENABLE) => {
            info!("panel override: control re-enabled, resyncing all zones");
            ctx.set_disabled(false);
            ctx.request_resend();
        }
        PanelEvent::DeviceReport {
            zone: 1,
            component: codec::COMPONENT_ZONE_LEVEL,
            value,
        } => {
            let level = percent_to_level(value);
            if level == 0 && ctx.disabled() {
                // The panel settled at zero: the manual override is over.
                info!("zone 1 reported dark while disabled, re-enabling control");
                ctx.set_disabled(false);
            }
            let payload = {
                let mut light = ctx.light.lock();
                light.apply_panel_report(level);
                light.take_publish()
            };
            if let Some(payload) = payload {
                publisher.publish(&payload).await;
            }
        }
        PanelEvent::ErrorCode(code) => {
            // Error 6 was already healed by the reader; log the rest.
            warn!("panel reported error {code}");
        }
        PanelEvent::Button(id) => debug!("unmapped panel button {id}"),
        PanelEvent::DeviceReport {
            zone,
            component,
            value,
        } => trace!("unused device report: zone {zone} component {component} value {value}"),
        PanelEvent::Unrecognized(raw) => trace!("unrecognized panel line: {raw}"),
        PanelEvent::Empty => {}
    }
}
