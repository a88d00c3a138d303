use ignite_telemetry::DeliveryQueue;

/// Run the `status` command: show queue location and pending count.
pub fn run(config_path: &str) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    println!("Ignite Telemetry Status");
    println!("=======================");

    match config.queue.path {
        Some(path) => {
            let queue = DeliveryQueue::new(&path);
            println!("Queue:   {path}");
            println!("Pending: {} report(s)", queue.pending_count());
        }
        None => {
            println!("Queue:   in-memory (no persistence configured)");
            println!("Pending: 0 report(s)");
        }
    }

    println!(
        "Flush delay: {} ms after submit",
        config.delivery.flush_delay_ms
    );
    println!("Parent origin: {}", config.delivery.parent_origin);
    Ok(())
}
