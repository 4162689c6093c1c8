use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::table::{Table, TableError};

/// Poll `table` until it reports a connection or `timeout` elapses.
///
/// The table is checked once before any wait, so an already connected table
/// returns immediately even with a zero timeout.
pub fn wait_for_connection<T: Table + ?Sized>(
    table: &T,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<(), TableError> {
    let deadline = Instant::now() + timeout;
    let mut polls: u32 = 0;
    loop {
        polls += 1;
        if table.is_connected() {
            info!(polls, "connected to table");
            return Ok(());
        }
        let now = Instant::now();
        if now >= deadline {
            warn!(polls, ?timeout, "gave up waiting for table connection");
            return Err(TableError::ConnectTimeout { timeout });
        }
        debug!(polls, "waiting for table connection");
        thread::sleep(poll_interval.min(deadline - now));
    }
}

/// Robot radio address for an FRC team number: `10.TE.AM.2`.
pub fn robot_address(team: u16) -> String {
    format!("10.{}.{}.2", team / 100, team % 100)
}
