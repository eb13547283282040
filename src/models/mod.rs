// Refiner Shield Data Models
// Wire-format types for the detection, refinement, and checkout endpoints.

use serde::{Deserialize, Serialize};

// ============ Segments ============

/// A contiguous span of the analyzed text with its own AI-likeness score.
/// Offsets are UTF-8 byte positions (0-based, end-exclusive) into the text
/// that was handed to the detector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub text: String,
    /// 0.0 to 1.0 (1.0 = most AI-like). 0.0 until scored.
    pub score: f64,
    pub start: usize,
    pub end: usize,
}

// ============ Detection ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectRequest {
    pub text: String,
    #[serde(default = "default_provider")]
    pub api_provider: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Length-weighted mean of segment scores; 0.0 when there are no segments.
    pub overall_score: f64,
    pub segments: Vec<Segment>,
    /// Label of the scoring backend that actually produced the scores.
    pub provider: String,
}

// ============ Refinement ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefineRequest {
    pub text: String,
    #[serde(default = "default_target_score")]
    pub target_score: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

/// Terminal state of a refinement run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RefinementStatus {
    /// Overall score reached the target.
    Converged,
    /// Target not met but no segment exceeded the rewrite threshold.
    Stalled,
    /// Iteration budget spent without converging or stalling.
    Exhausted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinementStep {
    pub iteration: u32,
    pub text: String,
    pub score: f64,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinementResult {
    pub original_text: String,
    pub refined_text: String,
    pub final_score: f64,
    pub iterations_used: u32,
    pub status: RefinementStatus,
    pub history: Vec<RefinementStep>,
}

// ============ Checkout ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    // In a real deployment this comes from an auth token.
    pub user_id: String,
    #[serde(default = "default_success_url")]
    pub success_url: String,
    #[serde(default = "default_cancel_url")]
    pub cancel_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
}

// ============ Default Value Functions ============

fn default_provider() -> String { "local".to_string() }
fn default_target_score() -> f64 { 0.2 }
fn default_max_iterations() -> u32 { 3 }
fn default_success_url() -> String { "http://localhost:3000/success".to_string() }
fn default_cancel_url() -> String { "http://localhost:3000/cancel".to_string() }
