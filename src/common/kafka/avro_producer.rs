use rdkafka::{config::ClientConfig, producer::{FutureProducer, FutureRecord}};

use crate::kafka::{Config, PublishError, PublishFuture, SensorPublisher};
use crate::kafka::schema_registry::{value_subject, SchemaRegistry};
use crate::sensor::SensorReading;

use apache_avro::{Schema, to_avro_datum, types::Value};
use bytes::{BufMut, BytesMut};
use chrono::offset::Utc;
use std::{collections::HashMap, sync::Arc, time::Duration};

const SENSOR_SCHEMA: &str = include_str!("../../../schemas/sensor.avsc");

/// Confluent wire format marker preceding the schema id.
const MAGIC_BYTE: u8 = 0x00;

struct Route {
    topic: String,
    schema_id: i32,
}

struct Kafka {
    schema: Schema,
    routes: HashMap<String, Route>,
    producer: FutureProducer,
}

pub struct AvroProducer {
    kafka: Arc<Kafka>,
}

impl AvroProducer {
    /// Registers the sensor schema for every configured channel binding and
    /// connects the underlying producer.
    pub async fn new(config: &Config, registry: &SchemaRegistry) -> Result<AvroProducer, PublishError> {
        let schema = Schema::parse_str(SENSOR_SCHEMA)?;
        let mut routes = HashMap::new();

        for (channel, topic) in &config.bindings {
            let schema_id = registry.register(&value_subject(topic), SENSOR_SCHEMA).await?;

            info!(
                "Bound output channel to topic";
                "channel" => channel.as_str(),
                "topic" => topic.as_str(),
                "schema_id" => schema_id
            );

            routes.insert(
                channel.clone(),
                Route {
                    topic: topic.clone(),
                    schema_id,
                },
            );
        }

        let producer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        let kafka = Arc::new(Kafka {
            schema,
            routes,
            producer,
        });

        Ok(AvroProducer { kafka })
    }
}

impl SensorPublisher for AvroProducer {
    fn publish(&self, channel: &str, reading: SensorReading) -> PublishFuture {
        let kafka = self.kafka.clone();
        let channel = channel.to_string();

        Box::pin(async move {
            let route = match kafka.routes.get(&channel) {
                Some(route) => route,
                None => return Err(PublishError::UnknownChannel(channel)),
            };

            let payload = encode(&kafka.schema, route.schema_id, &reading)?;

            let record = FutureRecord::to(&route.topic)
                .payload(&payload)
                .key(reading.id.as_str())
                .timestamp(Utc::now().timestamp_millis());

            kafka
                .producer
                .send(record, Duration::from_millis(1000)) // block for a second if the queue is full
                .await
                .map_err(|(e, _)| PublishError::Kafka(e))?;

            Ok(())
        })
    }
}

impl Clone for AvroProducer {
    fn clone(&self) -> Self {
        AvroProducer {
            kafka: self.kafka.clone(),
        }
    }
}

fn reading_to_value(reading: &SensorReading) -> Value {
    Value::Record(vec![
        ("id".to_string(), Value::String(reading.id.clone())),
        ("acceleration".to_string(), Value::Float(reading.acceleration)),
        ("velocity".to_string(), Value::Float(reading.velocity)),
        ("temperature".to_string(), Value::Float(reading.temperature)),
    ])
}

/// A single Avro datum in the Confluent wire format:
/// [magic_byte(1)][schema_id(4, big-endian)][datum].
fn encode(schema: &Schema, schema_id: i32, reading: &SensorReading) -> Result<Vec<u8>, PublishError> {
    let datum = to_avro_datum(schema, reading_to_value(reading))?;

    let mut buf = BytesMut::with_capacity(5 + datum.len());
    buf.put_u8(MAGIC_BYTE);
    buf.put_i32(schema_id);
    buf.put_slice(&datum);

    Ok(buf.to_vec())
}
