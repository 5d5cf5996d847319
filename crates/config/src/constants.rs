//! Centralized constants for Data Chef
//!
//! Single source of truth for application identity, provider defaults and
//! the user-facing message catalogue.

/// Application identity
pub mod app {
    pub const NAME: &str = "Data Chef";
    pub const DESCRIPTION: &str = "Voice-powered data analysis assistant";
}

/// External service endpoints
pub mod endpoints {
    /// ElevenLabs REST API
    pub const ELEVENLABS_BASE: &str = "https://api.elevenlabs.io/v1";
}

/// Environment variables read directly, outside the `DATA_CHEF__` namespace
pub mod env_vars {
    pub const ELEVENLABS_API_KEY: &str = "ELEVENLABS_API_KEY";
    pub const MOTHER_DUCK_API_KEY: &str = "MOTHER_DUCK_API_KEY";
    pub const MOTHER_DUCK_DATABASE_URL: &str = "MOTHER_DUCK_DATABASE_URL";
    /// Selects `config/{env}.*`
    pub const ENVIRONMENT: &str = "DATA_CHEF_ENV";
}

/// Speech synthesis defaults
pub mod speech {
    pub use data_chef_core::voice_config::{DEFAULT_MODEL_ID, DEFAULT_VOICE_ID};

    /// Maximum characters per synthesis call
    pub const MAX_TEXT_LENGTH: usize = 1000;

    /// Download name for generated audio
    pub const AUDIO_FILENAME: &str = "voice_response.mp3";

    /// Extensions accepted for a caller-chosen download name
    pub const AUDIO_EXTENSIONS: [&str; 1] = [".mp3"];
}

/// Timeouts (in milliseconds)
pub mod timeouts {
    /// TTS synthesis timeout
    pub const TTS_TIMEOUT_MS: u64 = 15_000;

    /// Analysis backend request timeout
    pub const ANALYSIS_TIMEOUT_MS: u64 = 30_000;

    /// Simulated latency of the mock analysis backend
    pub const MOCK_LATENCY_MS: u64 = 1_000;
}

/// User-facing messages
pub mod messages {
    pub const WELCOME: &str = "Welcome to Data Chef! Ask me anything about data analysis.";

    pub const CONNECTION_FAILED: &str = "Failed to connect to service.";
    pub const VOICE_GENERATION_FAILED: &str =
        "Failed to generate voice. Check your API key and credits.";
    pub const DATA_ANALYSIS_FAILED: &str = "Failed to process data analysis request.";

    pub const VOICE_GENERATED: &str = "Voice generated successfully!";
    pub const ANALYSIS_COMPLETED: &str = "Analysis completed!";

    /// Spoken when there is no analysis to read back yet
    pub const VOICE_TEST: &str =
        "🧑‍🍳 Data Chef Response: Ah, April — now that's a dish worth plating! Revenue: 32,000 — a double-stacked layer cake, rich and oh-so-satisfying.";
}

/// Canned payload of the mock analysis backend
pub mod mock_analysis {
    pub const MESSAGE: &str = r#"🧑‍🍳 Data Chef Response

Ah, April — now that's a dish worth plating:

Revenue: 32,000 — a double-stacked layer cake, rich and oh-so-satisfying.
Churn Rate: 0.03 — barely a pinch of bitterness, smooth as a velouté.
Bugs Reported: 3 — just a few crumbs on the table, easily swept away.
Team Mood Score: 8.7 — light and fluffy, like a perfectly risen soufflé.
Coffee Consumed: 130 liters — a gentle stream, not a raging river.

🧠 Insight: April was a chef's kiss! Revenue soared, bugs were nearly banished, and the team's spirits rose higher than a meringue in spring. With less churn and less caffeine, the kitchen ran like a dream.

🍲 Recipe Name: "April Ascension Soufflé with Sweet Revenue Reduction"

👨‍🍳 Chef's Quote: "When the bugs are few and the mood is high, every dish tastes like victory!"

📝 Note: This is a mock response. HyperMode currently connects through Mother Duck database, not direct URL connections. We hope to support URL-based data connections in future versions."#;

    pub const SUMMARY: &str = "Chef-themed data analysis with culinary insights";
    pub const DATA_SOURCE: &str = "Mock Data (HyperMode URL connection not yet supported)";
    pub const QUERY_TYPE: &str = "Data Analysis";

    pub const RECOMMENDATIONS: [&str; 3] = [
        "HyperMode connects through Mother Duck database",
        "URL-based connections planned for future versions",
        "Use ElevenLabs for voice generation of responses",
    ];
}
