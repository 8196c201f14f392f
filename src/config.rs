//! Preprocessing profiles and runtime configuration.
//!
//! The per-channel statistics are properties of the encoder's training data, so they
//! live in a static registry keyed by name rather than being derived from images.

/// Side length of the square tensor fed to the vision encoder.
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Default ONNX Runtime intra-op thread count.
pub const DEFAULT_INTRA_THREADS: usize = 4;

/// Name of the profile used when nothing else is requested.
pub const DEFAULT_PROFILE: &str = "clip";

/// Normalization constants and input geometry for one family of vision encoders.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessProfile {
    /// Profile identifier
    pub name: &'static str,
    /// Side length S of the `[1, 3, S, S]` input tensor
    pub input_size: u32,
    /// Per-channel mean (RGB), applied after scaling to [0, 1]
    pub mean: [f32; 3],
    /// Per-channel standard deviation (RGB)
    pub std: [f32; 3],
    /// Whether this is the default profile
    pub is_default: bool,
}

/// Known preprocessing profiles.
pub static PREPROCESS_PROFILES: &[PreprocessProfile] = &[
    // OpenAI CLIP ViT-B/32 and derivatives
    PreprocessProfile {
        name: "clip",
        input_size: DEFAULT_INPUT_SIZE,
        mean: [0.481_454_66, 0.457_827_5, 0.408_210_73],
        std: [0.268_629_54, 0.261_302_58, 0.275_777_11],
        is_default: true,
    },
    PreprocessProfile {
        name: "siglip",
        input_size: DEFAULT_INPUT_SIZE,
        mean: [0.5, 0.5, 0.5],
        std: [0.5, 0.5, 0.5],
        is_default: false,
    },
    // torchvision ImageNet statistics (DINO, ResNet exports)
    PreprocessProfile {
        name: "imagenet",
        input_size: DEFAULT_INPUT_SIZE,
        mean: [0.485, 0.456, 0.406],
        std: [0.229, 0.224, 0.225],
        is_default: false,
    },
];

/// Look up a profile by exact name.
#[must_use]
pub fn find_profile(name: &str) -> Option<&'static PreprocessProfile> {
    PREPROCESS_PROFILES.iter().find(|p| p.name == name)
}

/// Get a profile by name, falling back to the default for unknown names.
#[must_use]
pub fn get_profile(name: &str) -> &'static PreprocessProfile {
    find_profile(name).unwrap_or_else(|| {
        tracing::warn!(profile = name, fallback = DEFAULT_PROFILE, "unknown preprocessing profile");
        default_profile()
    })
}

/// The default preprocessing profile.
#[must_use]
pub fn default_profile() -> &'static PreprocessProfile {
    PREPROCESS_PROFILES
        .iter()
        .find(|p| p.is_default)
        .unwrap_or(&PREPROCESS_PROFILES[0])
}

/// Runtime configuration for one embedding run.
#[derive(Debug, Clone)]
pub struct EmbedConfig {
    /// Preprocessing profile name (see [`PREPROCESS_PROFILES`])
    pub profile: String,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        let profile =
            std::env::var("SPRITEVEC_PROFILE").unwrap_or_else(|_| DEFAULT_PROFILE.to_string());

        let intra_threads = std::env::var("SPRITEVEC_INTRA_THREADS")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_INTRA_THREADS);

        Self {
            profile,
            intra_threads,
        }
    }
}

impl EmbedConfig {
    /// Apply command-line overrides on top of the environment defaults.
    #[must_use]
    pub fn with_overrides(mut self, profile: Option<String>, intra_threads: Option<usize>) -> Self {
        if let Some(profile) = profile {
            self.profile = profile;
        }
        if let Some(threads) = intra_threads.filter(|n| *n > 0) {
            self.intra_threads = threads;
        }
        self
    }

    /// Resolve the configured profile.
    #[must_use]
    pub fn preprocess_profile(&self) -> &'static PreprocessProfile {
        get_profile(&self.profile)
    }
}
