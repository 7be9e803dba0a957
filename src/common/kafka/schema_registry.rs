use hyper::{
    Body,
    Method,
    Request,
    StatusCode,
    client::{Client, HttpConnector},
    header,
};
use hyper_tls::HttpsConnector;

const REGISTRY_CONTENT_TYPE: &str = "application/vnd.schemaregistry.v1+json";

#[derive(Deserialize, Debug)]
pub struct Config {
    pub url: String,
}

#[derive(Debug)]
pub enum RegistryError {
    Request(http::Error),
    Connection(hyper::Error),
    Status(StatusCode, String),
    Format(serde_json::Error),
}

impl From<http::Error> for RegistryError {
    fn from(e: http::Error) -> RegistryError {
        RegistryError::Request(e)
    }
}

impl From<hyper::Error> for RegistryError {
    fn from(e: hyper::Error) -> RegistryError {
        RegistryError::Connection(e)
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(e: serde_json::Error) -> RegistryError {
        RegistryError::Format(e)
    }
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    schema: &'a str,
}

#[derive(Deserialize)]
struct RegisterResponse {
    id: i32,
}

/// Confluent subject under which a topic's value schema is registered.
pub fn value_subject(topic: &str) -> String {
    format!("{}-value", topic)
}

pub struct SchemaRegistry {
    base_url: String,
    client: Client<HttpsConnector<HttpConnector>>,
}

impl SchemaRegistry {
    pub fn new(config: &Config) -> SchemaRegistry {
        let client = Client::builder().build(HttpsConnector::new());

        SchemaRegistry {
            base_url: config.url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Registers a schema under the subject, returning the registry-assigned
    /// schema id. Registering an already known schema returns the existing id.
    pub async fn register(&self, subject: &str, schema: &str) -> Result<i32, RegistryError> {
        let body = serde_json::to_vec(&RegisterRequest { schema })?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("{}/subjects/{}/versions", self.base_url, subject))
            .header(header::CONTENT_TYPE, REGISTRY_CONTENT_TYPE)
            .body(Body::from(body))?;

        let response = self.client.request(request).await?;
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await?;

        if !status.is_success() {
            return Err(RegistryError::Status(
                status,
                String::from_utf8_lossy(&body).into_owned(),
            ));
        }

        let parsed: RegisterResponse = serde_json::from_slice(&body)?;

        Ok(parsed.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subjects_follow_the_topic_value_convention() {
        assert_eq!(value_subject("sensor-data"), "sensor-data-value");
    }

    #[test]
    fn registration_body_wraps_the_schema_string() {
        let body = serde_json::to_value(&RegisterRequest {
            schema: r#"{"type": "string"}"#,
        })
        .unwrap();

        assert_eq!(body["schema"], r#"{"type": "string"}"#);
    }
}
