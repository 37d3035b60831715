use std::net::SocketAddr;

// ── Booking flow ────────────────────────────────────────────────

/// Counter: booking requests accepted.
pub const BOOKINGS_CREATED_TOTAL: &str = "staycal_bookings_created_total";

/// Counter: booking requests refused. Labels: reason.
pub const BOOKINGS_REJECTED_TOTAL: &str = "staycal_bookings_rejected_total";

/// Counter: manager decisions. Labels: status.
pub const BOOKING_STATUS_CHANGES_TOTAL: &str = "staycal_booking_status_changes_total";

/// Counter: occupancy sets built.
pub const OCCUPANCY_BUILDS_TOTAL: &str = "staycal_occupancy_builds_total";

// ── Store ───────────────────────────────────────────────────────

/// Histogram: collection load latency in seconds. Labels: collection.
pub const STORE_LOAD_DURATION_SECONDS: &str = "staycal_store_load_duration_seconds";

/// Counter: saves refused because the version token moved. Labels: collection.
pub const STORE_VERSION_CONFLICTS_TOTAL: &str = "staycal_store_version_conflicts_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    match metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
    {
        Ok(()) => tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics"),
        Err(e) => tracing::warn!("failed to install Prometheus exporter: {e}"),
    }
}

