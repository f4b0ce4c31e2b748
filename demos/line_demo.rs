//! Thin demonstration binary: configures a line, runs it, and logs the
//! resulting statistics. Not part of the library surface — a stand-in for
//! whatever front-end a host application brings.

use conwip_sim::ProductionLine;
use tracing::info;

fn main() {
    tracing_subscriber::fmt::init();

    let mut line = ProductionLine::with_seed(
        3,
        10,
        &[1.0, 0.8, 1.2],
        &[0.5, 0.5, 0.5],
        0.7,
        1.0,
        Some(42),
    )
    .expect("valid line parameters");

    let stats = line.run(10_000.0, 500.0);

    info!(
        throughput = stats.throughput,
        avg_cycle_time = stats.avg_cycle_time,
        avg_wip = stats.avg_wip,
        total_completed = stats.total_completed,
        "line demo finished"
    );
    for s in &stats.station_stats {
        info!(
            station = s.station_id,
            name = %s.name,
            utilization = s.utilization,
            total_processed = s.total_processed,
            avg_processing_time = s.avg_processing_time,
            "station summary"
        );
    }
}
