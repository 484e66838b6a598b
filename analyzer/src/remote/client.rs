use reqwest::multipart::{Form, Part};
use retinacore::interface::{PredictionResult, RemotePrediction, Upload};
use retinacore::prelude::{RetinaError, RetinaResult};
use std::time::Duration;

/// Posts uploads to a prediction backend and normalizes what comes back.
#[derive(Clone)]
pub struct RemoteClient {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteClient {
    pub fn new(endpoint: &str) -> RetinaResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| RetinaError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends the raw image as multipart field `file`. Non-success statuses
    /// surface as [`RetinaError::Server`]; nothing is retried.
    pub async fn predict(&self, upload: &Upload) -> RetinaResult<PredictionResult> {
        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.name.clone())
            .mime_str(&upload.media_type)
            .map_err(|err| RetinaError::Transport(err.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|err| RetinaError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetinaError::Server {
                status: status.as_u16(),
            });
        }

        let remote = response
            .json::<RemotePrediction>()
            .await
            .map_err(|err| RetinaError::InvalidResponse(err.to_string()))?;
        remote.normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retinacore::interface::Label;
    use warp::{http::StatusCode, Filter};

    fn scan() -> Upload {
        Upload::new("retina_15.jpg", "image/jpeg", vec![1, 2, 3])
    }

    #[tokio::test]
    async fn percentage_responses_are_normalized() {
        let route = warp::path("predict")
            .and(warp::post())
            .and(warp::body::bytes())
            .map(|_body: bytes::Bytes| {
            warp::reply::json(&serde_json::json!({
                "label": "CNV",
                "confidences": {"CNV": 80, "DME": 10, "Drusen": 5, "Normal": 5}
            }))
        });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        let client = RemoteClient::new(&format!("http://{addr}/predict")).unwrap();
        let result = client.predict(&scan()).await.unwrap();
        assert_eq!(result.label, Label::Cnv);
        assert!((result.confidence() - 0.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn error_status_is_reported_with_code() {
        let route = warp::path("predict")
            .and(warp::post())
            .and(warp::body::bytes())
            .map(|_body: bytes::Bytes| {
            warp::reply::with_status("model not loaded", StatusCode::INTERNAL_SERVER_ERROR)
        });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        let client = RemoteClient::new(&format!("http://{addr}/predict")).unwrap();
        let err = client.predict(&scan()).await.unwrap_err();
        assert!(matches!(err, RetinaError::Server { status: 500 }));
        assert_eq!(err.to_string(), "server error (status 500)");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn unreadable_body_is_invalid_response() {
        let route = warp::path("predict")
            .and(warp::post())
            .and(warp::body::bytes())
            .map(|_body: bytes::Bytes| {
                warp::reply::json(&serde_json::json!({"prediction": "NORMAL"}))
            });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        let client = RemoteClient::new(&format!("http://{addr}/predict")).unwrap();
        let err = client.predict(&scan()).await.unwrap_err();
        assert!(matches!(err, RetinaError::InvalidResponse(_)));
    }
}
