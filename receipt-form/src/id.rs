use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

pub const RECEIPT_ID_PREFIX: &str = "RCP-";

const RANDOM_LEN: usize = 4;

/// Short display id such as `RCP-LXK3Q2A1B7ZQ`: base-36 milliseconds followed
/// by random alphanumerics, all uppercase. Uniqueness is probabilistic.
pub fn generate_receipt_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_LEN)
        .map(char::from)
        .collect();

    format!("{}{}{}", RECEIPT_ID_PREFIX, to_base36(millis), random).to_uppercase()
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn id_has_prefix_and_is_uppercase() {
        let id = generate_receipt_id();
        assert!(id.starts_with(RECEIPT_ID_PREFIX));
        assert_eq!(id, id.to_uppercase());
        assert!(id[RECEIPT_ID_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn successive_ids_differ() {
        let ids: HashSet<String> = (0..100).map(|_| generate_receipt_id()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn base36_encodes_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
