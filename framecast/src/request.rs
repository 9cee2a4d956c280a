//! Decoding of the inbound job request.

use asset_cache::AssetReference;
use serde::{Deserialize, Serialize};

/// A job request as received from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    /// Reference to the input image; encrypted when the handler runs with
    /// encrypted payloads.
    pub image_url: String,
    /// LoRA weight files to provision before submission.
    #[serde(default)]
    pub loras: Vec<AssetReference>,
    pub config: GenerationConfig,
}

/// Generation parameters forwarded opaquely to the backend.
///
/// Field names and defaults mirror the backend's expectations; the handler
/// itself only reads `total_second_length`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_model_type")]
    pub model_type: String,
    pub prompt_text: String,
    #[serde(default)]
    pub n_prompt: String,
    #[serde(default = "default_seed")]
    pub seed: u32,
    #[serde(default = "default_total_second_length")]
    pub total_second_length: u32,
    #[serde(default = "default_latent_window_size")]
    pub latent_window_size: u32,
    #[serde(default = "default_steps")]
    pub steps: u32,
    #[serde(default = "default_cfg")]
    pub cfg: f32,
    #[serde(default = "default_gs")]
    pub gs: f32,
    #[serde(default)]
    pub rs: f32,
    #[serde(default = "default_true")]
    pub use_teacache: bool,
    #[serde(default = "default_steps")]
    pub teacache_num_steps: u32,
    #[serde(default = "default_teacache_rel_l1_thresh")]
    pub teacache_rel_l1_thresh: f32,
    /// Number of sections to blend between prompts.
    #[serde(default = "default_blend_sections")]
    pub blend_sections: u32,
    /// Starting latent when no input image is provided.
    #[serde(default = "default_latent_type")]
    pub latent_type: String,
    #[serde(default = "default_resolution", rename = "resolutionW")]
    pub resolution_w: u32,
    #[serde(default = "default_resolution", rename = "resolutionH")]
    pub resolution_h: u32,
}

fn default_model_type() -> String {
    "Original".to_string()
}

fn default_seed() -> u32 {
    rand::random()
}

fn default_total_second_length() -> u32 {
    5
}

fn default_latent_window_size() -> u32 {
    9
}

fn default_steps() -> u32 {
    25
}

fn default_cfg() -> f32 {
    1.0
}

fn default_gs() -> f32 {
    10.0
}

fn default_true() -> bool {
    true
}

fn default_teacache_rel_l1_thresh() -> f32 {
    0.15
}

fn default_blend_sections() -> u32 {
    4
}

fn default_latent_type() -> String {
    "Black".to_string()
}

fn default_resolution() -> u32 {
    640
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_request_fills_defaults() {
        let request: JobRequest = serde_json::from_str(
            r#"{"image_url":"token","config":{"prompt_text":"a person waves"}}"#,
        )
        .unwrap();
        assert!(request.loras.is_empty());
        let config = request.config;
        assert_eq!(config.model_type, "Original");
        assert_eq!(config.total_second_length, 5);
        assert_eq!(config.latent_window_size, 9);
        assert_eq!(config.steps, 25);
        assert_eq!(config.cfg, 1.0);
        assert_eq!(config.gs, 10.0);
        assert_eq!(config.resolution_w, 640);
        assert!(config.use_teacache);
    }

    #[test]
    fn resolution_uses_wire_field_names() {
        let config: GenerationConfig = serde_json::from_str(
            r#"{"prompt_text":"p","resolutionW":512,"resolutionH":768}"#,
        )
        .unwrap();
        assert_eq!(config.resolution_w, 512);
        assert_eq!(config.resolution_h, 768);

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["resolutionW"], 512);
        assert!(value.get("resolution_w").is_none());
    }

    #[test]
    fn loras_deserialize_with_weights() {
        let request: JobRequest = serde_json::from_str(
            r#"{
                "image_url": "token",
                "loras": [{"name":"style.safetensors","source":"https://civitai.com/api/1","weight":0.7}],
                "config": {"prompt_text":"p"}
            }"#,
        )
        .unwrap();
        assert_eq!(request.loras.len(), 1);
        assert_eq!(request.loras[0].weight(), 0.7);
    }
}
