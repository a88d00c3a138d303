use ignite_telemetry::SessionController;
use tracing::info;

/// Run the `demo` command: play through a scripted puzzle session with a
/// stdout host callback and submit the report.
pub fn run(config_path: &str, game_id: &str) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let mut controller = SessionController::new(&config);

    controller.register_host_callback(|payload| {
        // This binary is the host: accept by printing the payload.
        match serde_json::to_string_pretty(payload) {
            Ok(json) => {
                println!("{json}");
                Ok(())
            }
            Err(e) => Err(ignite_telemetry::TelemetryError::Serialization(e)),
        }
    });

    let session_name = format!("session_{}", std::process::id());
    controller.initialize(game_id, &session_name);

    controller.start_level("level_demo");
    controller.add_metric("puzzle_title", "Demo Crossword");
    controller.add_metric("puzzle_size", "5x5");
    controller.add_metric("total_clues", 10);

    controller.record_task(
        "level_demo",
        "check_attempt_1",
        "Check Attempt #1",
        "all_filled",
        "all_filled",
        2000,
        0,
    );
    controller.add_metric("check_attempts", 1);

    controller.record_task(
        "level_demo",
        "final_submission",
        "Final Submission",
        "all_correct",
        "all_correct",
        90_000,
        200,
    );
    controller.add_metric("end_reason", "completed");
    controller.add_metric("accuracy_percent", 100);

    controller.end_level("level_demo", true, 90_000, 200);
    controller.submit();

    info!(pending = controller.pending_reports(), "demo session complete");
    Ok(())
}
