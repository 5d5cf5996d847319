//! Speech synthesis for Data Chef
//!
//! `SpeechClient` validates the credential, voice and text of every call
//! before handing it to a [`SpeechProvider`]. Providers:
//! - `ElevenLabsProvider` - ElevenLabs REST API
//! - `MockSpeechProvider` - scripted results for tests

pub mod client;
pub mod elevenlabs;
pub mod mock;

pub use client::SpeechClient;
pub use elevenlabs::{ElevenLabsConfig, ElevenLabsProvider};
pub use mock::{MockSpeechProvider, FAKE_MP3};

pub use data_chef_core::{SpeechError, SpeechProvider, VoiceConfig};
