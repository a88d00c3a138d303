use ignite_telemetry::{DeliveryQueue, TransportDispatcher};

/// Run the `flush` command: deliver queued reports to stdout and clear.
pub fn run(config_path: &str) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    let Some(path) = config.queue.path else {
        println!("Queue is in-memory only; nothing persisted to flush.");
        return Ok(());
    };

    let mut queue = DeliveryQueue::new(&path);
    let pending = queue.pending_count();
    if pending == 0 {
        println!("Queue at {path} is empty.");
        return Ok(());
    }

    let mut dispatcher = TransportDispatcher::new();
    dispatcher.register(Box::new(ignite_telemetry::CallbackSink::new(|payload| {
        match serde_json::to_string(payload) {
            Ok(json) => {
                println!("{json}");
                Ok(())
            }
            Err(e) => Err(ignite_telemetry::TelemetryError::Serialization(e)),
        }
    })));

    queue.flush_all(&dispatcher);
    println!("Flushed {pending} report(s) from {path}.");
    Ok(())
}
