//! API key generation for `wellfin generate-api-key`.

use rand::RngCore;

use crate::cli::KeyEnvironment;

const KEY_BYTES: usize = 32;

/// `<prefix>-<base36 millis>-<64 hex chars>`
pub fn generate_api_key(environment: KeyEnvironment) -> String {
    let mut bytes = [0u8; KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    format!("{}-{}-{}", environment.prefix(), to_base36(millis), hex::encode(bytes))
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

/// `.env` lines that configure a deployment for `key`.
pub fn env_lines(environment: KeyEnvironment, key: &str, api_url: &str) -> Vec<String> {
    vec![
        format!("WELLFIN_API_KEY={key}"),
        format!("WELLFIN_API_URL={api_url}"),
        format!("ENVIRONMENT={}", environment.name()),
        "API_VERSION=v1".to_string(),
    ]
}
