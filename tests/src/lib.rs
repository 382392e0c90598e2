#[cfg(test)]
mod tests {
    use env_logger::Env;
    use log::info;
    use playground::{RandomOutcomes, Responder, Server, STATUS_CODES};
    use playground_client::{Generator, METHODS};
    use playground_metrics::{
        PlaygroundMetrics, HTTP_REQUESTS_TOTAL, HTTP_RESPONSE_DURATION_SECONDS,
        HTTP_RESPONSE_SIZE_BYTES,
    };
    use rstest::rstest;
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::num::NonZeroUsize;
    use std::sync::{Arc, Once};
    use std::time::Duration;
    use tokio::time::sleep;
    use tokio_util::sync::CancellationToken;

    static ONCE: Once = Once::new();
    fn init_logger() {
        ONCE.call_once(|| {
            env_logger::Builder::from_env(Env::default().default_filter_or("info"))
                .format_timestamp_millis()
                .init();
        });
    }

    /// Responder answering immediately, so runs stay short
    fn start_responder() -> Server {
        let metrics = Arc::new(PlaygroundMetrics::new().unwrap());
        let responder = Arc::new(Responder::new(metrics, Arc::new(RandomOutcomes::new(0))));
        Server::bind(SocketAddr::from(([127, 0, 0, 1], 0)), responder).unwrap()
    }

    async fn get_all_metrics(addr: SocketAddr) -> String {
        let url = format!("http://{}{}", addr, common_env::METRICS_PATH);
        let resp = reqwest::get(url).await.unwrap();
        assert_eq!(resp.status(), 200);
        resp.text().await.unwrap()
    }

    /// Sample lines of a series, e.g. `name{a="b"} 1`, excluding comments
    fn filter_metrics(metrics: &str, name: &str) -> Vec<String> {
        metrics
            .lines()
            .filter(|line| line.starts_with(name) && !line.starts_with('#'))
            .map(String::from)
            .collect()
    }

    fn labels(line: &str) -> HashMap<String, String> {
        let start = line.find('{').expect("sample without labels");
        let end = line.rfind('}').unwrap();
        line[start + 1..end]
            .split(',')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.to_string(), v.trim_matches('"').to_string()))
            .collect()
    }

    fn value(line: &str) -> f64 {
        line.rsplit_once(' ')
            .map(|(_, v)| v.parse::<f64>().unwrap())
            .unwrap()
    }

    fn sum_of(metrics: &str, name: &str) -> f64 {
        filter_metrics(metrics, name).iter().map(|l| value(l)).sum()
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(4)]
    #[tokio::test(flavor = "multi_thread")]
    async fn test_generator_against_responder(#[case] concurrency: usize) {
        init_logger();
        let server = start_responder();
        let addr = server.local_addr();

        let generator = Arc::new(
            Generator::new(NonZeroUsize::new(concurrency).unwrap(), &addr.to_string()).unwrap(),
        );
        let cancel = CancellationToken::new();
        let run = tokio::spawn({
            let generator = generator.clone();
            let cancel = cancel.clone();
            async move { generator.run(cancel).await }
        });
        sleep(Duration::from_millis(300)).await;
        cancel.cancel();
        let summary = run.await.unwrap().unwrap();
        info!("dispatched: {}", summary.dispatched);
        sleep(Duration::from_millis(300)).await;

        let metrics = get_all_metrics(addr).await;
        let total = sum_of(&metrics, &format!("{}{{", HTTP_REQUESTS_TOTAL));
        assert_eq!(total as u64, summary.dispatched);
        let durations = sum_of(&metrics, &format!("{}_count", HTTP_RESPONSE_DURATION_SECONDS));
        assert_eq!(durations as u64, summary.dispatched);
        let sizes = sum_of(&metrics, &format!("{}_count", HTTP_RESPONSE_SIZE_BYTES));
        assert_eq!(sizes as u64, summary.dispatched);

        for name in [
            HTTP_REQUESTS_TOTAL,
            HTTP_RESPONSE_DURATION_SECONDS,
            HTTP_RESPONSE_SIZE_BYTES,
        ] {
            for line in filter_metrics(&metrics, name) {
                let mut labels = labels(&line);
                labels.remove("le");
                let mut keys: Vec<&str> = labels.keys().map(String::as_str).collect();
                keys.sort_unstable();
                assert_eq!(keys, vec!["method", "path", "status"], "{}", line);
                assert_eq!(labels["path"], common_env::RANDO_PATH);
                assert!(METHODS.iter().any(|m| m.as_str() == labels["method"]));
                assert!(STATUS_CODES.iter().any(|s| s.as_str() == labels["status"]));
            }
        }

        server.shutdown(Duration::from_secs(5)).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_method_passthrough() {
        init_logger();
        let server = start_responder();
        let addr = server.local_addr();

        let client = reqwest::Client::new();
        let resp = client
            .request(
                reqwest::Method::PATCH,
                format!("http://{}{}", addr, common_env::RANDO_PATH),
            )
            .send()
            .await
            .unwrap();
        let status = resp.status();
        assert!(resp.bytes().await.unwrap().is_empty());

        let metrics = get_all_metrics(addr).await;
        let lines = filter_metrics(&metrics, &format!("{}{{", HTTP_REQUESTS_TOTAL));
        assert_eq!(lines.len(), 1);
        let labels = labels(&lines[0]);
        assert_eq!(labels["method"], "PATCH");
        assert_eq!(labels["status"], status.as_str());

        server.shutdown(Duration::from_secs(5)).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_response_status_matches_recorded_status() {
        init_logger();
        let server = start_responder();
        let addr = server.local_addr();

        let client = reqwest::Client::new();
        let url = format!("http://{}{}", addr, common_env::RANDO_PATH);
        let mut observed: HashMap<String, u64> = HashMap::new();
        for _ in 0..100 {
            let resp = client.get(&url).send().await.unwrap();
            *observed
                .entry(resp.status().as_str().to_string())
                .or_default() += 1;
        }

        let metrics = get_all_metrics(addr).await;
        let recorded: HashMap<String, u64> =
            filter_metrics(&metrics, &format!("{}{{", HTTP_REQUESTS_TOTAL))
                .iter()
                .map(|line| (labels(line)["status"].clone(), value(line) as u64))
                .collect();
        assert_eq!(observed, recorded);

        server.shutdown(Duration::from_secs(5)).await.unwrap();
    }
}
