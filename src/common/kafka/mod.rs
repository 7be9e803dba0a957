mod avro_producer;
pub mod schema_registry;

pub use self::avro_producer::AvroProducer;
pub use self::schema_registry::{RegistryError, SchemaRegistry};

use crate::sensor::SensorReading;

use rdkafka::error::KafkaError;

use std::{collections::HashMap, future::Future, pin::Pin};

#[derive(Deserialize, Debug)]
pub struct Config {
    pub brokers: String,
    pub bindings: HashMap<String, String>,
}

pub type PublishFuture = Pin<Box<dyn Future<Output = Result<(), PublishError>> + Send>>;

/// The send abstraction the trigger endpoint hands readings to.
/// `channel` is a logical output channel name, resolved to a concrete
/// topic through the configured bindings.
pub trait SensorPublisher: Send + Sync {
    fn publish(&self, channel: &str, reading: SensorReading) -> PublishFuture;
}

#[derive(Debug)]
pub enum PublishError {
    UnknownChannel(String),
    Encoding(apache_avro::Error),
    Registry(RegistryError),
    Kafka(KafkaError),
}

impl From<apache_avro::Error> for PublishError {
    fn from(e: apache_avro::Error) -> PublishError {
        PublishError::Encoding(e)
    }
}

impl From<RegistryError> for PublishError {
    fn from(e: RegistryError) -> PublishError {
        PublishError::Registry(e)
    }
}

impl From<KafkaError> for PublishError {
    fn from(e: KafkaError) -> PublishError {
        PublishError::Kafka(e)
    }
}
