//! Token Estimation and Output Caps
//!
//! Character-based token estimation (4 chars = 1 token) used to size each
//! stage's output allowance relative to its input. The cap keeps completions
//! proportionate: short calls get the floor, long transcripts are bounded by
//! the ceiling.

/// Estimate token count for a string (4 chars = 1 token)
pub fn estimate_tokens(text: &str) -> u32 {
    text.chars().count().div_ceil(4) as u32
}

/// Parameters shaping one stage's output token cap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenCap {
    /// Output allowance relative to estimated input tokens
    pub multiplier: f32,
    /// Minimum cap regardless of input size
    pub floor: u32,
    /// Maximum cap regardless of input size
    pub ceiling: u32,
}

impl TokenCap {
    pub const fn new(multiplier: f32, floor: u32, ceiling: u32) -> Self {
        Self {
            multiplier,
            floor,
            ceiling,
        }
    }

    /// Cap for a given input: `clamp(estimate * multiplier, floor, ceiling)`
    pub fn for_input(&self, input: &str) -> u32 {
        let scaled = (estimate_tokens(input) as f32 * self.multiplier).ceil() as u32;
        scaled.min(self.ceiling).max(self.floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("hi"), 1); // 2 chars = 1 token
        assert_eq!(estimate_tokens("hello"), 2); // 5 chars = 2 tokens
        assert_eq!(estimate_tokens("hello world"), 3); // 11 chars = 3 tokens
    }

    #[test]
    fn test_cap_floor_for_short_input() {
        let cap = TokenCap::new(1.5, 600, 4096);
        assert_eq!(cap.for_input("user: Hi"), 600);
    }

    #[test]
    fn test_cap_ceiling_for_long_input() {
        let cap = TokenCap::new(1.5, 600, 4096);
        let long_input = "x".repeat(40_000); // ~10K tokens, scaled past ceiling
        assert_eq!(cap.for_input(&long_input), 4096);
    }

    #[test]
    fn test_cap_scales_between_bounds() {
        let cap = TokenCap::new(2.0, 100, 10_000);
        let input = "x".repeat(4_000); // 1000 tokens estimated
        assert_eq!(cap.for_input(&input), 2_000);
    }
}
