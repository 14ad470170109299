//! Wei to ether conversion for display.

use alloy::primitives::utils::format_ether;
use alloy::primitives::U256;

/// Render `wei` in ether without trailing zeros: `1`, `0.5`, `0.000000000000000001`.
pub fn wei_to_ether(wei: U256) -> String {
    trim_decimal(format_ether(wei))
}

fn trim_decimal(mut s: String) -> String {
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    s
}
