use hyper::{
    Body,
    Method,
    Request,
    Response,
    StatusCode,
    server::Server,
    service::{make_service_fn, service_fn},
};

use futures::channel::oneshot::Receiver;

use std::{net::SocketAddr, sync::Arc};

use crate::kafka::SensorPublisher;
use crate::metrics::*;
use crate::sensor::SensorReading;

/// Logical output channel the trigger endpoint publishes to. The bindings
/// section of the configuration maps it to a concrete topic.
pub const OUTPUT_CHANNEL: &str = "supplier-out-0";

const ACK_BODY: &str = "ok, have fun with v1 payload!";

/// The HTTP surface of the gateway. One route: a POST to `/randomMessage`
/// generates a random sensor reading and hands it to the publisher.
pub struct TriggerServer<P> {
    publisher: Arc<P>,
}

impl<P: SensorPublisher + 'static> TriggerServer<P> {
    pub fn new(publisher: Arc<P>) -> TriggerServer<P> {
        TriggerServer { publisher }
    }

    /// Serve until a shutdown is signalled through `rx`.
    pub async fn run(self, addr: SocketAddr, rx: Receiver<()>) -> Result<(), hyper::Error> {
        let publisher = self.publisher;

        let make_svc = make_service_fn(move |_| {
            let publisher = publisher.clone();

            async move {
                Ok::<_, hyper::Error>(service_fn(move |request| {
                    let publisher = publisher.clone();

                    async move { Ok::<_, hyper::Error>(route(publisher, request).await) }
                }))
            }
        });

        info!("Listening to trigger requests on {}", addr);

        Server::bind(&addr)
            .serve(make_svc)
            .with_graceful_shutdown(async {
                rx.await.ok();
            })
            .await
    }
}

async fn route<P>(publisher: Arc<P>, request: Request<Body>) -> Response<Body>
where
    P: SensorPublisher,
{
    match (request.method(), request.uri().path()) {
        (&Method::POST, "/randomMessage") => random_message(publisher).await,
        (_, "/randomMessage") => empty_response(StatusCode::METHOD_NOT_ALLOWED),
        _ => empty_response(StatusCode::NOT_FOUND),
    }
}

async fn random_message<P>(publisher: Arc<P>) -> Response<Body>
where
    P: SensorPublisher,
{
    let reading = SensorReading::random();

    let timer = PUBLISH_TIMES_HISTOGRAM.start_timer();
    PUBLISHES_INFLIGHT.inc();

    let result = publisher.publish(OUTPUT_CHANNEL, reading.clone()).await;

    timer.observe_duration();
    PUBLISHES_INFLIGHT.dec();

    match result {
        Ok(()) => {
            MESSAGES_COUNTER.with_label_values(&["published"]).inc();

            info!(
                "Published sensor reading";
                "channel" => OUTPUT_CHANNEL,
                "sensor_id" => reading.id.as_str(),
                "acceleration" => reading.acceleration,
                "velocity" => reading.velocity,
                "temperature" => reading.temperature
            );

            Response::new(Body::from(ACK_BODY))
        }
        Err(error) => {
            MESSAGES_COUNTER.with_label_values(&["error"]).inc();

            error!(
                "Failed to publish sensor reading: {:?}", error;
                "channel" => OUTPUT_CHANNEL,
                "sensor_id" => reading.id.as_str()
            );

            text_response(StatusCode::INTERNAL_SERVER_ERROR, "publish failed")
        }
    }
}

fn empty_response(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;

    response
}

fn text_response(status: StatusCode, body: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kafka::{PublishError, PublishFuture};

    use rdkafka::error::KafkaError;
    use rdkafka::types::RDKafkaErrorCode;
    use std::sync::Mutex;

    struct MockPublisher {
        published: Mutex<Vec<(String, SensorReading)>>,
        fail: bool,
    }

    impl MockPublisher {
        fn new(fail: bool) -> MockPublisher {
            MockPublisher {
                published: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    impl SensorPublisher for MockPublisher {
        fn publish(&self, channel: &str, reading: SensorReading) -> PublishFuture {
            if self.fail {
                return Box::pin(async {
                    Err(PublishError::Kafka(KafkaError::MessageProduction(
                        RDKafkaErrorCode::BrokerTransportFailure,
                    )))
                });
            }

            self.published
                .lock()
                .unwrap()
                .push((channel.to_string(), reading));

            Box::pin(async { Ok(()) })
        }
    }

    fn request(method: Method, path: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn trigger_publishes_exactly_one_reading() {
        let publisher = Arc::new(MockPublisher::new(false));

        let response = route(publisher.clone(), request(Method::POST, "/randomMessage")).await;

        assert_eq!(response.status(), StatusCode::OK);

        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert_eq!(&body[..], ACK_BODY.as_bytes());

        let published = publisher.published.lock().unwrap();
        assert_eq!(published.len(), 1);

        let (channel, reading) = &published[0];
        assert_eq!(channel, OUTPUT_CHANNEL);
        assert!(reading.id.ends_with("-v1"));
        assert!(reading.acceleration >= 0.0 && reading.acceleration < 10.0);
        assert!(reading.velocity >= 0.0 && reading.velocity < 100.0);
        assert!(reading.temperature >= 0.0 && reading.temperature < 50.0);
    }

    #[tokio::test]
    async fn publish_failure_maps_to_a_server_error() {
        let publisher = Arc::new(MockPublisher::new(true));

        let response = route(publisher, request(Method::POST, "/randomMessage")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert_ne!(&body[..], ACK_BODY.as_bytes());
    }

    #[tokio::test]
    async fn only_post_triggers_a_message() {
        let publisher = Arc::new(MockPublisher::new(false));

        let response = route(publisher.clone(), request(Method::GET, "/randomMessage")).await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() {
        let publisher = Arc::new(MockPublisher::new(false));

        let response = route(publisher.clone(), request(Method::POST, "/otherMessage")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(publisher.published.lock().unwrap().is_empty());
    }
}
