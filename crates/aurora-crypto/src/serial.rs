use chrono::{DateTime, Utc};
use rand::Rng;

pub const SERIAL_PREFIX: &str = "AUR";

/// Generate a serial ID of the form `AUR-<base36 millis>-<100..=999>`.
///
/// Not unique on its own; the store rejects IDs it has issued before and asks
/// for another.
pub fn generate_serial_id(now: DateTime<Utc>) -> String {
    let suffix: u16 = rand::rng().random_range(100..=999);
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
    format!("{}-{}-{}", SERIAL_PREFIX, to_base36(millis), suffix)
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
