use std::time::Duration;

use network_monitor::{
    Decision, MonitorOptions, MonitoredClient, RequestDescriptor, ResponseDescriptor,
    RetryCoordinator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = MonitorOptions::default()
        .with_max_retries(2)
        .with_retry_delay(Duration::from_millis(200))
        .with_status_codes([500, 502, 503])
        .with_on_retry(|req, res, attempt| {
            println!("retry #{attempt} for {} {} (status {})", req.method, req.url, res.status);
            Ok(())
        })
        .with_on_max_retries_exceeded(|req, _, max| {
            println!("giving up on {} {} after {max} retries", req.method, req.url);
            Ok(())
        });

    // Driving the coordinator by hand, as a custom interception layer would.
    let coordinator = RetryCoordinator::new(options.clone());
    let request = RequestDescriptor::get("/api/orders");
    coordinator.on_request_observed(&request);
    for status in [503, 500, 500] {
        let decision = coordinator.decide(&request, &ResponseDescriptor::status(status));
        if let Decision::Retry { attempt, delay } = decision {
            println!("attempt {attempt}: wait {delay:?} and re-issue");
        } else {
            println!("{decision:?}");
        }
    }

    // Or let the bundled reqwest client enact the decisions.
    let url = std::env::var("MONITOR_URL")?;
    let client = MonitoredClient::new().with_options(options);
    client.begin_test_case();
    let response = client.get(url).await?;
    println!(
        "status {} after {} retries (exhausted: {})",
        response.status, response.retries, response.exhausted
    );

    Ok(())
}
