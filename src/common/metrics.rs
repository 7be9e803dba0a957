use prometheus::{self, CounterVec, Encoder, Gauge, Histogram, TextEncoder};
use std::env;

use hyper::{
    Body,
    Error,
    Request,
    Response,
    server::Server,
    service::{make_service_fn, service_fn},
    header};

use futures::channel::oneshot::Receiver;

lazy_static! {
    pub static ref MESSAGES_COUNTER: CounterVec = register_counter_vec!(
        "sensor_messages_total",
        "Total number of sensor readings published.",
        &["status"]
    ).unwrap();
    pub static ref PUBLISHES_INFLIGHT: Gauge = register_gauge!(
        "sensor_publishes_in_flight",
        "Number of sensor readings currently being published"
    ).unwrap();
    pub static ref PUBLISH_TIMES_HISTOGRAM: Histogram = register_histogram!(
        "publish_latency_seconds",
        "The publish latencies in seconds"
    ).unwrap();
}

#[derive(Clone, Copy)]
pub struct StatisticsServer;

impl StatisticsServer {
    fn prometheus(_: Request<Body>) -> Response<Body> {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = vec![];
        let builder = Response::builder();

        encoder.encode(&metric_families, &mut buffer).unwrap();

        builder
            .header(header::CONTENT_TYPE, encoder.format_type())
            .body(buffer.into()).unwrap()
    }

    pub async fn handle(rx: Receiver<()>) {
        let port = match env::var("PORT") {
            Ok(val) => val,
            Err(_) => String::from("9090"),
        };

        let addr = format!("0.0.0.0:{}", port).parse().unwrap();

        let make_svc = make_service_fn(|_| async {
            Ok::<_, Error>(service_fn(|req| async {
                Ok::<_, Error>(Self::prometheus(req))
            }))
        });

        let server = Server::bind(&addr)
            .serve(make_svc)
            .with_graceful_shutdown(async {
                rx.await.ok();
            });

        if let Err(error) = server.await {
            error!("Error in statistics server: {:?}", error);
        }
    }
}
