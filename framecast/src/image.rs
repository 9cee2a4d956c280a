//! Resolution of the job's input image reference.

use std::path::Path;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::info;

use crate::error::HandlerError;
use crate::retry::retry_fixed;

/// Resolve an image reference (URL, local file path, or inline base64) to
/// raw image bytes.
///
/// Remote fetches are retried with a fixed delay; local and inline inputs
/// fail immediately since retrying cannot help them.
pub async fn fetch_input_image(
    client: &reqwest::Client,
    input: &str,
    attempts: u32,
    delay: Duration,
) -> Result<Vec<u8>, HandlerError> {
    if input.starts_with("http://") || input.starts_with("https://") {
        info!(url = %input, "downloading input image");
        let bytes = retry_fixed(attempts, delay, || async {
            client
                .get(input)
                .send()
                .await?
                .error_for_status()?
                .bytes()
                .await
        })
        .await?;
        return Ok(bytes.to_vec());
    }

    if Path::new(input).is_file() {
        info!(path = %input, "reading input image from disk");
        return Ok(tokio::fs::read(input).await?);
    }

    STANDARD
        .decode(input.trim())
        .map_err(|e| HandlerError::image_input(format!("not a URL, file, or base64 image: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> reqwest::Client {
        reqwest::Client::new()
    }

    #[tokio::test]
    async fn reads_local_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.jpg");
        std::fs::write(&path, b"jpeg-bytes").unwrap();

        let bytes = fetch_input_image(
            &client(),
            path.to_str().unwrap(),
            1,
            Duration::from_millis(1),
        )
        .await
        .unwrap();
        assert_eq!(bytes, b"jpeg-bytes");
    }

    #[tokio::test]
    async fn decodes_inline_base64() {
        let encoded = STANDARD.encode(b"raster");
        let bytes = fetch_input_image(&client(), &encoded, 1, Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(bytes, b"raster");
    }

    #[tokio::test]
    async fn garbage_input_is_rejected() {
        let result =
            fetch_input_image(&client(), "definitely not an image!!", 1, Duration::from_millis(1))
                .await;
        assert!(matches!(result, Err(HandlerError::ImageInput { .. })));
    }

    #[tokio::test]
    async fn unreachable_url_surfaces_network_error() {
        // Port 9 is unassigned locally; all attempts fail fast.
        let result = fetch_input_image(
            &client(),
            "http://127.0.0.1:9/input.jpg",
            2,
            Duration::from_millis(1),
        )
        .await;
        assert!(matches!(result, Err(HandlerError::Network { .. })));
    }
}
