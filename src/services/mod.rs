pub mod generation;
pub mod patterns;
pub mod profile_tags;
pub mod providers;
pub mod recommendations;
pub mod resolve;
pub mod scoring;
pub mod stage;
pub mod synthesizer;
